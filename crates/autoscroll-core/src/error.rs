use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Unknown event type: {0}")]
    UnknownEvent(String),

    #[error("Unknown scroll direction: {0}")]
    UnknownDirection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
