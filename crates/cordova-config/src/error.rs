//! Error types for loading, parsing and writing `config.xml`.

use std::io;

/// Errors raised while reading or persisting a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigXmlError {
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),

    #[error("config file is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("document has no <widget> root element")]
    MissingRoot,

    #[error("expected <widget> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("unexpected text outside the root element")]
    TextOutsideRoot,
}

impl ConfigXmlError {
    pub(crate) fn malformed(position: usize, message: impl ToString) -> Self {
        ConfigXmlError::Malformed {
            position,
            message: message.to_string(),
        }
    }
}
