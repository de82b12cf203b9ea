// error.rs
//
// Copyright (c) 2026  giflet developers
//

use std::fmt;
use std::io;

/// Errors encountered while splitting a GIF stream into frames
#[derive(Debug)]
pub enum DecodeError {
    /// A wrapped I/O error from a source resolver.
    Io(io::Error),
    /// Signature is not `GIF87a` or `GIF89a`.
    NotAGif,
    /// Extension label other than plain text, graphic control, comment or
    /// application.
    UnknownExtension(u8),
    /// Block introducer other than extension (0x21) or image (0x2C) before
    /// the trailer.
    UnknownBlock(u8),
    /// Stream ends inside a block or length-prefixed sub-block.
    UnexpectedEndOfFile,
    /// Well-formed stream with zero image blocks.
    NoFrames,
    /// Failure reported by an upstream source resolver.
    SourceResolution(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::Io(err) => err.fmt(fmt),
            DecodeError::SourceResolution(msg) => msg.fmt(fmt),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            DecodeError::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        DecodeError::Io(e)
    }
}
