use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pixel buffer given to a [`crate::PaletteBuilder`] constructor doesn't describe a valid image.
    #[error("invalid pixel buffer: {reason}")]
    InvalidInput { reason: String },
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }
}
