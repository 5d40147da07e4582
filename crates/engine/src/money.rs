use std::{
    fmt,
    ops::Neg,
};

use crate::{EngineError, ResultEngine};

/// Signed money amount represented as **integer cents**.
///
/// Every monetary value in the engine (balances, budget limits, transaction
/// amounts) is stored as minor units to avoid floating-point drift. The
/// value is signed: positive adds to a balance, negative removes from it.
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    #[must_use]
    pub fn saturating_sub(self, rhs: MoneyCents) -> MoneyCents {
        MoneyCents(self.0.saturating_sub(rhs.0))
    }

    /// Sums amounts, failing instead of wrapping when the total does not fit.
    pub fn try_sum<I>(amounts: I) -> ResultEngine<MoneyCents>
    where
        I: IntoIterator<Item = MoneyCents>,
    {
        amounts
            .into_iter()
            .try_fold(MoneyCents::ZERO, |acc, amount| acc.checked_add(amount))
            .ok_or_else(|| EngineError::InvalidAmount("amount total overflows".to_string()))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_cents() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(7).to_string(), "0.07");
        assert_eq!(MoneyCents::new(25_000).to_string(), "250.00");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn try_sum_detects_overflow() {
        let total = MoneyCents::try_sum([MoneyCents::new(100_000), MoneyCents::new(-20_000)]);
        assert_eq!(total.unwrap(), MoneyCents::new(80_000));

        let overflow = MoneyCents::try_sum([MoneyCents::new(i64::MAX), MoneyCents::new(1)]);
        assert!(overflow.is_err());
    }

    #[test]
    fn subtraction_never_wraps() {
        let big = MoneyCents::new(5_000_000_000_000_000_000);
        assert_eq!(big.checked_sub(-big), None);
        assert_eq!((-big).saturating_sub(big), MoneyCents::new(i64::MIN));
        assert_eq!(
            MoneyCents::new(250_00).checked_sub(MoneyCents::new(200_00)),
            Some(MoneyCents::new(50_00))
        );
    }
}
