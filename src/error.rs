use crate::item::ItemKind;
use thiserror::Error;

/// Errors that may be encountered while encoding or decoding.
///
/// Every variant carries the byte offset at which the problem was detected:
/// the input cursor when decoding, the output cursor when encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// the input ran out while a primitive or composite required more bytes
    #[error("unexpected end of input at offset {pos} while expecting {expected}")]
    UnexpectedEndOfInput { pos: u64, expected: &'static str },
    /// structurally readable bytes that violate the format or the item grammar
    #[error("invalid input data at offset {pos}: {msg}")]
    InvalidInputData { pos: u64, msg: String },
    /// a well-formed item that this implementation or the active target cannot handle
    #[error("unsupported at offset {pos}: {msg}")]
    Unsupported { pos: u64, msg: String },
    /// a length or integer exceeds the representable range
    #[error("overflow at offset {pos}: {msg}")]
    Overflow { pos: u64, msg: String },
    /// a decoder found an item kind it does not accept
    #[error("unexpected data item at offset {pos}: expected {expected} but got {actual}")]
    UnexpectedDataItem {
        pos: u64,
        expected: &'static str,
        actual: ItemKind,
    },
}

impl Error {
    pub(crate) fn eof(pos: u64, expected: &'static str) -> Self {
        Error::UnexpectedEndOfInput { pos, expected }
    }

    pub(crate) fn invalid(pos: u64, msg: impl Into<String>) -> Self {
        Error::InvalidInputData {
            pos,
            msg: msg.into(),
        }
    }

    pub(crate) fn unsupported(pos: u64, msg: impl Into<String>) -> Self {
        Error::Unsupported {
            pos,
            msg: msg.into(),
        }
    }

    pub(crate) fn overflow(pos: u64, msg: impl Into<String>) -> Self {
        Error::Overflow {
            pos,
            msg: msg.into(),
        }
    }

    pub(crate) fn mismatch(pos: u64, expected: &'static str, actual: ItemKind) -> Self {
        Error::UnexpectedDataItem {
            pos,
            expected,
            actual,
        }
    }

    /// The byte offset at which this error was raised.
    pub fn pos(&self) -> u64 {
        match self {
            Error::UnexpectedEndOfInput { pos, .. } => *pos,
            Error::InvalidInputData { pos, .. } => *pos,
            Error::Unsupported { pos, .. } => *pos,
            Error::Overflow { pos, .. } => *pos,
            Error::UnexpectedDataItem { pos, .. } => *pos,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
