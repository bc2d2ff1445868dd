use std::path::PathBuf;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot list source directory '{}': {source}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("nothing to do: {0}")]
    NothingToDo(String),

    #[error("cannot read '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not a decodable image: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("decoder panicked on '{}': {message}", path.display())]
    WorkerPanic { path: PathBuf, message: String },

    #[error("conversion failed at frame {index} ('{}')", path.display())]
    Conversion {
        index: usize,
        path: PathBuf,
        #[source]
        cause: Box<ConvertError>,
    },

    #[error("cannot write output '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Index of the first failed frame, when this is a [`ConvertError::Conversion`].
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            Self::Conversion { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
