use serde::Deserialize;

/// Server configuration, compiled into the binary from `quecho.toml`.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub server: Server,
    #[serde(default)]
    pub echo: Echo,
    #[serde(default)]
    pub log: Log,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Server {
    pub ip: String,
    pub port: u16,
}

/// Scratch-file round trip settings for the echo endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct Echo {
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: String,
    /// `Content-Type` of echo responses. Defaults to `applicaton/json`, spelled as clients see it today.
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

impl Default for Echo {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            content_type: default_content_type(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_scratch_dir() -> String {
    "./json/".to_string()
}

fn default_content_type() -> String {
    "applicaton/json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load() -> Result<Config, toml::de::Error> {
    let config_content = include_str!("../../quecho.toml");
    from_str(config_content)
}

pub fn from_str(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}
