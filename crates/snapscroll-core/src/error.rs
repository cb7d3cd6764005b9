use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No snap sections matched selector '{0}'")]
    NoSections(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Media controller error: {0}")]
    Media(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
