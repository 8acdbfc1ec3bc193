use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::time::Duration;

static CONFIG: OnceCell<ClientConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub connect_timeout: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub read_timeout: Duration,

    /// Send buffered bodies with a fixed Content-Length
    pub output_streaming: bool,

    pub body_buffer_size: usize,
    pub read_buffer_size: usize,
    pub max_header_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(30),

            output_streaming: true,

            body_buffer_size: 1024,
            read_buffer_size: 4096,
            max_header_size: 8192,
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("Fail to read {}: {err}", path);
                log::warn!("Fall back to default config");
                return ClientConfig::default();
            }
        };

        match toml::from_str::<ClientConfig>(content.as_str()) {
            Ok(client_config) => client_config,
            Err(err) => {
                log::warn!("Fail to deserialize config file {}: {err}", path);
                log::warn!("Fall back to default config");
                ClientConfig::default()
            }
        }
    }
}

/// Installs the process-wide config. Fails, handing `cfg` back, if a config
/// was already installed or read.
pub fn set_config(cfg: ClientConfig) -> Result<(), ClientConfig> {
    CONFIG.set(cfg)
}

/// The process-wide config, defaults if none was installed.
pub fn config() -> &'static ClientConfig {
    CONFIG.get_or_init(ClientConfig::default)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "connect_timeout = 1.5\nread_timeout = 2\noutput_streaming = false\nmax_header_size = 100"
        )
        .unwrap();

        let cfg = ClientConfig::from_file(file.path().to_str().unwrap());
        assert_eq!(cfg.connect_timeout, Duration::from_millis(1500));
        assert_eq!(cfg.read_timeout, Duration::from_secs(2));
        assert!(!cfg.output_streaming);
        assert_eq!(cfg.max_header_size, 100);
        assert_eq!(cfg.body_buffer_size, 1024);
    }

    #[test]
    fn from_file_falls_back_to_default() {
        assert_eq!(
            ClientConfig::from_file("/nonexistent/client.toml"),
            ClientConfig::default()
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "read_timeout = \"soon\"").unwrap();
        assert_eq!(
            ClientConfig::from_file(file.path().to_str().unwrap()),
            ClientConfig::default()
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "read_timeout = -1.0").unwrap();
        assert_eq!(
            ClientConfig::from_file(file.path().to_str().unwrap()),
            ClientConfig::default()
        );
    }
}
