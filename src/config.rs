use crate::error::Error;
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log")]
    pub log: String,
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    5000
}

fn default_log() -> String {
    "info".to_owned()
}

impl Config {
    /// Layers the optional settings file, `BOOKING_*` variables,
    /// `DATABASE_URL` and finally `port_override`.
    pub fn load(settings_path: &str, port_override: Option<u16>) -> Result<Config, Error> {
        Config::build(settings_path, port_override, None)
    }

    /// `vars` stands in for the process environment when given.
    fn build(
        settings_path: &str,
        port_override: Option<u16>,
        vars: Option<HashMap<String, String>>,
    ) -> Result<Config, Error> {
        let database_url = match &vars {
            Some(vars) => vars.get("DATABASE_URL").cloned(),
            None => env::var("DATABASE_URL").ok(),
        };
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(settings_path).required(false))
            .add_source(config::Environment::with_prefix("BOOKING").source(vars));
        if let Some(database_url) = database_url {
            builder = builder.set_override("database_url", database_url)?;
        }
        if let Some(port) = port_override {
            builder = builder.set_override("port", i64::from(port))?;
        }
        Ok(builder.build()?.try_deserialize::<Config>()?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[cfg(test)]
    pub fn for_database(database_url: &str) -> Config {
        Config {
            database_url: database_url.to_owned(),
            host: default_host(),
            port: default_port(),
            log: default_log(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn settings_file(contents: &str) -> (TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, contents).unwrap();
        let settings = path.with_extension("").to_str().unwrap().to_owned();
        (dir, settings)
    }

    fn vars(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|&(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        )
    }

    #[test]
    fn settings_file_fills_in_defaults() {
        let (_dir, settings) = settings_file(r#"{"database_url": "booking.db", "port": 8080}"#);

        let config = Config::build(&settings, None, vars(&[])).unwrap();
        assert_eq!(config.database_url, "booking.db");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.log, "info");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn environment_beats_settings_file() {
        let (_dir, settings) = settings_file(r#"{"database_url": "booking.db", "port": 8080}"#);
        let env = vars(&[
            ("BOOKING_PORT", "7000"),
            ("BOOKING_LOG", "debug"),
            ("DATABASE_URL", "sqlite://other.db"),
        ]);

        let config = Config::build(&settings, None, env).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.log, "debug");
        assert_eq!(config.database_url, "sqlite://other.db");
    }

    #[test]
    fn port_override_wins() {
        let (_dir, settings) = settings_file(r#"{"database_url": "booking.db", "port": 8080}"#);
        let env = vars(&[("BOOKING_PORT", "7000")]);

        let config = Config::build(&settings, Some(9000), env).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let (_dir, settings) = settings_file(r#"{"port": 8080}"#);
        assert!(matches!(
            Config::build(&settings, None, vars(&[])),
            Err(Error::Config(_))
        ));
    }
}
