/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::boxed::Box;
use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;

use crate::constants::PSD_IDENTIFIER_BE;

/// PSDDecodeErrors that can occur during PSD decoding
///
/// Every error is fatal, the decoder never hands out a partially
/// assembled document.
pub enum PSDDecodeErrors {
    WrongMagicBytes(u32),
    UnsupportedFileType(u16),
    UnsupportedChannelCount(u16),
    UnsupportedBitDepth(u16),
    UnknownColorMode(u16),
    LargeDimensions(usize, usize),
    /// A plane encoding selector that is neither raw (0) nor RLE (1)
    UnknownCompression(u16),
    /// A run length stream that copies or repeats outside its scanline
    ///
    /// The argument is the scanline being decoded
    CorruptRle(usize),
    /// Plane data whose layout does not fit the image it belongs to,
    /// e.g. a scanline table shorter than the plane or a channel that
    /// runs past its declared length
    MalformedPlane(&'static str),
    /// A section did not start with the signature it must carry
    ///
    /// # Arguments
    /// - 1st argument is the expected signature
    /// - 2nd argument is what was found
    BadSignature([u8; 4], [u8; 4]),
    /// An error that occurred while decoding one channel plane
    Channel {
        /// Channel id as stored in the layer record
        channel: i16,
        /// Stream offset where the channel data starts
        offset:  u64,
        error:   Box<PSDDecodeErrors>
    },
    Generic(&'static str),
    IoErrors(ZByteIoError)
}

impl PSDDecodeErrors {
    /// Returns true if this error comes from malformed plane data
    /// rather than from the underlying stream or an unsupported feature
    pub fn is_format_error(&self) -> bool {
        match self {
            PSDDecodeErrors::UnknownCompression(_)
            | PSDDecodeErrors::CorruptRle(_)
            | PSDDecodeErrors::MalformedPlane(_) => true,
            PSDDecodeErrors::Channel { error, .. } => error.is_format_error(),
            _ => false
        }
    }
}

impl Debug for PSDDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PSDDecodeErrors::Generic(reason) => {
                writeln!(f, "{reason}")
            }
            PSDDecodeErrors::WrongMagicBytes(bytes) => {
                writeln!(
                    f,
                    "Expected {:?} but found  {:?}, not a PSD image",
                    PSD_IDENTIFIER_BE.to_be_bytes(),
                    bytes.to_be_bytes()
                )
            }
            PSDDecodeErrors::UnsupportedFileType(version) => {
                writeln!(
                    f,
                    "Unsupported file version {version:?}, known versions are 1",
                )
            }
            PSDDecodeErrors::UnsupportedChannelCount(channels) => {
                writeln!(f, "Unsupported channel count {channels:?}")
            }
            PSDDecodeErrors::UnsupportedBitDepth(depth) => {
                writeln!(
                    f,
                    "Unsupported bit depth {depth:?}, only 8 bit planes are supported",
                )
            }
            PSDDecodeErrors::UnknownColorMode(mode) => {
                writeln!(f, "Unknown color mode {mode}")
            }
            PSDDecodeErrors::UnknownCompression(method) => {
                writeln!(
                    f,
                    "Unknown compression format {method}, expected 0 (raw) or 1 (RLE)"
                )
            }
            PSDDecodeErrors::CorruptRle(row) => {
                writeln!(f, "Bad RLE data in scanline {row}")
            }
            PSDDecodeErrors::MalformedPlane(reason) => {
                writeln!(f, "Malformed plane: {reason}")
            }
            PSDDecodeErrors::BadSignature(expected, found) => {
                writeln!(
                    f,
                    "Expected signature {:?} but found {:?}",
                    expected, found
                )
            }
            PSDDecodeErrors::Channel {
                channel,
                offset,
                error
            } => {
                write!(f, "Channel {channel} at offset {offset}: {:?}", error)
            }
            PSDDecodeErrors::LargeDimensions(supported, found) => {
                writeln!(
                    f,
                    "Too large dimensions, supported {supported} but found {found}",
                )
            }
            PSDDecodeErrors::IoErrors(e) => {
                writeln!(f, "I/O error :{:?}", e)
            }
        }
    }
}

impl Display for PSDDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PSDDecodeErrors {}

impl From<&'static str> for PSDDecodeErrors {
    fn from(r: &'static str) -> Self {
        Self::Generic(r)
    }
}

impl From<ZByteIoError> for PSDDecodeErrors {
    fn from(r: ZByteIoError) -> Self {
        Self::IoErrors(r)
    }
}
