//! Settings of the `pocketbook` binary.
//!
//! Read from `settings.toml` (optional) and overridden by environment
//! variables prefixed with `POCKETBOOK`, e.g. `POCKETBOOK__SERVER__PORT=8080`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Calendar,
    Anchored,
}

impl From<Alignment> for engine::PeriodAlignment {
    fn from(value: Alignment) -> Self {
        match value {
            Alignment::Calendar => engine::PeriodAlignment::Calendar,
            Alignment::Anchored => engine::PeriodAlignment::Anchored,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Budgets {
    #[serde(default)]
    pub alignment: Alignment,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub budgets: Budgets,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("POCKETBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_apply_to_missing_sections() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
        assert!(matches!(settings.budgets.alignment, Alignment::Calendar));
    }

    #[test]
    fn reads_server_and_alignment() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = { sqlite = "pocketbook.db" }

            [budgets]
            alignment = "anchored"
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "pocketbook.db"));
        assert!(matches!(settings.budgets.alignment, Alignment::Anchored));
    }
}
