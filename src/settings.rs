use config::{Config, ConfigError, Environment, File};
use serde_derive::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub server_host: Option<String>,
    pub server_id: String,
    pub motd_path: Option<String>,
    pub outbound_queue_len: usize,
    pub inbound_queue_len: usize,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Settings::load(Environment::with_prefix("ICBD"))
    }

    fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 7326)?
            .set_default("server_id", concat!("icbd ", env!("CARGO_PKG_VERSION")))?
            .set_default("outbound_queue_len", 256)?
            .set_default("inbound_queue_len", 1000)?
            .add_source(File::with_name("Settings").required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("outbound_queue_len", self.outbound_queue_len),
            ("inbound_queue_len", self.inbound_queue_len),
        ] {
            if value == 0 {
                return Err(ConfigError::Message(format!("{} must be at least 1", key)));
            }
        }

        Ok(())
    }

    /// Host name announced in the connect banner: `server_host` when set,
    /// otherwise the machine's host name.
    pub fn server_host(&self) -> String {
        self.server_host
            .clone()
            .or_else(|| hostname::get().ok().and_then(|h| h.into_string().ok()))
            .unwrap_or_else(|| "localhost".to_string())
    }
}
