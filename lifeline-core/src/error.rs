use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("no animation frame or timer scheduler available in this environment")]
    NoScheduler,
}
