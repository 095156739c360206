use std::fmt;
use std::io;
use std::result;

use delimited_core::{ConfigError, TokenError};
use thiserror::Error;

use crate::encoding::Encoding;
use crate::record::{Position, Record};

/// A type alias for `Result<T, delimited::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when reading or writing delimited data.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error reported by the underlying stream. It is passed through
    /// unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The stream given to a reader cannot be read, or the stream given to
    /// a writer cannot be written. This is reported at construction, before
    /// any I/O is attempted.
    #[error("stream cannot be {direction}")]
    StreamCapability {
        /// The direction the stream was required to support.
        direction: Direction,
    },
    /// The input could not be tokenized.
    #[error(
        "parse error: record {} (byte {}, line {}): {kind}",
        .pos.record(), .pos.byte(), .pos.line()
    )]
    Malformed {
        /// What went wrong.
        kind: TokenError,
        /// Where the error was found. The byte offset is that of the
        /// offending character, or the length of the input if the input
        /// ended too early.
        pos: Position,
        /// The fields of the record read before the error, ending with the
        /// partial field that was being read. Its position is where the
        /// record started.
        partial: Record,
    },
    /// The input is not valid in the configured encoding.
    #[error(
        "invalid {encoding} input: byte {byte:#04x} at offset {} (line {})",
        .pos.byte(), .pos.line()
    )]
    Decode {
        /// The encoding used to decode the input.
        encoding: Encoding,
        /// The first offending byte.
        byte: u8,
        /// The location of the offending byte.
        pos: Position,
    },
    /// A character cannot be represented in the configured encoding.
    #[error("character {ch:?} cannot be encoded as {encoding}")]
    Encode {
        /// The encoding used to encode the output.
        encoding: Encoding,
        /// The offending character.
        ch: char,
    },
    /// A field needs quotes but the writer's quote style forbids them.
    #[error("field {field:?} requires quotes, but quote style is 'Never'")]
    QuoteRequired {
        /// The offending field.
        field: String,
    },
    /// The options are inconsistent.
    #[error("invalid options: {0}")]
    Config(#[from] ConfigError),
    /// The reader or writer was used after it was closed.
    #[error("stream is closed")]
    Closed,
}

impl Error {
    /// Returns true if this error was reported by the underlying stream.
    pub fn is_io_error(&self) -> bool {
        match *self {
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// The position associated with this error, if any.
    pub fn position(&self) -> Option<&Position> {
        match *self {
            Error::Malformed { ref pos, .. } | Error::Decode { ref pos, .. } => {
                Some(pos)
            }
            _ => None,
        }
    }
}

/// The direction a stream must support.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// The stream must be readable.
    Read,
    /// The stream must be writable.
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Direction::Read => write!(f, "read"),
            Direction::Write => write!(f, "written"),
        }
    }
}
