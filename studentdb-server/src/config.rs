use std::path::PathBuf;

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub data_file: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            data_file: PathBuf::from("students.json"),
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `STUDENTDB_DATA_FILE`, `STUDENTDB_HOST`, `STUDENTDB_PORT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ServerConfig::default();
        let port = match lookup("STUDENTDB_PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid STUDENTDB_PORT '{raw}', using {}", defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };

        ServerConfig {
            data_file: lookup("STUDENTDB_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            host: lookup("STUDENTDB_HOST").unwrap_or(defaults.host),
            port,
        }
    }
}
