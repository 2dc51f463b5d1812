use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error loading settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] crate::codec::CodecError),
}
