//! Internal helpers for input validation and name normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every write path enforces the same invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Trim a required display name and collapse inner whitespace.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let display = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if display.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(display)
}

/// Comparison key for names: accents stripped, lowercased, punctuation and
/// whitespace runs folded to a single space.
///
/// "Café  Bar" and "cafe bar" share the key `cafe bar`.
pub(crate) fn name_key(display: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in display.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let key = out.trim_end().to_string();
    if key.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "'{display}' has no letters or digits"
        )));
    }
    Ok(key)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn require_positive_amount(amount_minor: i64, label: &str) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be > 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_collapses_whitespace() {
        assert_eq!(
            normalize_required_name("  Daily   spending ", "budget").unwrap(),
            "Daily spending"
        );
        assert!(normalize_required_name("   ", "wallet").is_err());
    }

    #[test]
    fn name_key_folds_accents_and_case() {
        assert_eq!(name_key("Café  Bar").unwrap(), "cafe bar");
        assert_eq!(name_key("CAFE-bar!").unwrap(), "cafe bar");
        assert!(name_key("!!!").is_err());
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(
            normalize_optional_text(Some(" rent ")),
            Some("rent".to_string())
        );
    }
}
