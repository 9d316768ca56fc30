// error.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
use std::fmt;
use std::io;
use std::num::TryFromIntError;

/// Errors encountered while decoding or encoding
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error from the reader, before a header was read.
    Io(io::Error),
    /// A wrapped I/O error from the reader, within the GIF body.
    Read(io::Error),
    /// A wrapped I/O error from the writer.
    Write(io::Error),
    /// Integer out of bounds.
    TryFromInt(TryFromIntError),
    /// [Header](block/struct.Header.html) block malformed or missing.
    MalformedHeader,
    /// GIF version not supported (87a or 89a only).
    UnsupportedVersion([u8; 3]),
    /// Invalid [Block](block/enum.Block.html) code (signature).
    InvalidBlockCode,
    /// [Block](block/enum.Block.html)s arranged in invalid sequence.
    InvalidBlockSequence,
    /// [GraphicControl](block/struct.GraphicControl.html) block has invalid
    /// length.
    MalformedGraphicControlExtension,
    /// File ends with incomplete block.
    UnexpectedEndOfFile,
    /// LZW minimum code size out of range.
    InvalidCodeSize,
    /// Compressed LZW data invalid or corrupt
    InvalidLzwData,
    /// Image larger than specified by
    /// [max_image_sz](struct.Decoder.html#method.max_image_sz).
    TooLargeImage,
    /// [ImageData](block/struct.ImageData.html) block is incomplete.
    IncompleteImageData,
    /// No explicit canvas size and no frames to infer one from.
    CanvasUnresolved,
    /// Canvas or frame dimensions cannot be stored in a GIF.
    InvalidRasterDimensions,
}

/// Broad category of an [Error](enum.Error.html)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Stream could not be opened as a GIF
    Open,
    /// GIF body is structurally invalid
    Parse,
    /// Encode attempted with no size information and no frames
    CanvasUnresolved,
    /// Output could not be written
    Write,
}

/// Result type for decoding and encoding
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the category of the error.
    pub fn kind(&self) -> ErrorKind {
        use self::Error::*;
        match self {
            Io(_) | MalformedHeader | UnsupportedVersion(_) => ErrorKind::Open,
            CanvasUnresolved => ErrorKind::CanvasUnresolved,
            Write(_) | TryFromInt(_) | InvalidRasterDimensions => {
                ErrorKind::Write
            }
            Read(_)
            | InvalidBlockCode
            | InvalidBlockSequence
            | MalformedGraphicControlExtension
            | UnexpectedEndOfFile
            | InvalidCodeSize
            | InvalidLzwData
            | TooLargeImage
            | IncompleteImageData => ErrorKind::Parse,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::Read(err) => write!(fmt, "read failed: {}", err),
            Error::Write(err) => write!(fmt, "write failed: {}", err),
            Error::TryFromInt(err) => err.fmt(fmt),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Read(ref err) => Some(err),
            Error::Write(ref err) => Some(err),
            Error::TryFromInt(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<TryFromIntError> for Error {
    fn from(err: TryFromIntError) -> Self {
        Error::TryFromInt(err)
    }
}
