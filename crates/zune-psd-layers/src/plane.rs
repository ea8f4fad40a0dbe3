/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Channel plane decoding
//!
//! A plane is one channel of one image, a `width*height` array with a byte per pixel.
//! Planes are either stored raw or compressed scanline by scanline with PackBits,
//! where each compressed scanline length is stored up front as a big endian `u16`.
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader};

use crate::constants::CompressionMethod;
use crate::errors::PSDDecodeErrors;

const READ_CHUNK: usize = 4096;

/// Where a plane gets its encoding information from
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaneHeader<'a> {
    /// The plane starts with its own 2 byte encoding selector.
    ///
    /// RLE planes are then followed by `height` scanline lengths unless
    /// `pre_read` already carries them.
    ///
    /// This is how layer channels are stored.
    Own { pre_read: Option<&'a [u16]> },
    /// Encoding was read once for the whole image.
    ///
    /// `None` means raw planes, `Some` holds the scanline lengths of all planes
    /// one after the other, `height` entries per plane.
    ///
    /// This is how the merged image is stored.
    Shared { line_lengths: Option<&'a [u16]> }
}

/// Read `count` big endian scanline lengths
pub fn read_line_lengths<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, count: usize
) -> Result<Vec<u16>, PSDDecodeErrors> {
    let mut lengths = Vec::new();

    for _ in 0..count {
        lengths.push(stream.get_u16_be_err()?);
    }
    Ok(lengths)
}

/// Read `size` bytes from the stream
///
/// The buffer grows with the bytes actually read, so a size field that
/// claims more than the stream holds fails at the end of the stream instead
/// of reserving the claimed amount up front.
pub fn read_bounded<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, size: usize
) -> Result<Vec<u8>, PSDDecodeErrors> {
    let mut out = Vec::new();
    let mut chunk = [0; READ_CHUNK];
    let mut left = size;

    while left > 0 {
        let count = left.min(READ_CHUNK);
        stream.read_exact_bytes(&mut chunk[..count])?;
        out.extend_from_slice(&chunk[..count]);
        left -= count;
    }
    Ok(out)
}

/// Read a single plane of `width*height` bytes
///
/// # Arguments
/// - stream: Stream positioned at the start of the plane data
/// - width, height: Plane dimensions
/// - header: Where encoding information comes from
/// - plane_index: Position of this plane in the image, only used to find
///   the scanline lengths of a [`PlaneHeader::Shared`] image
pub fn read_plane<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, width: usize, height: usize, header: PlaneHeader<'_>,
    plane_index: usize
) -> Result<Vec<u8>, PSDDecodeErrors> {
    match header {
        PlaneHeader::Own { pre_read } => {
            let selector = stream.get_u16_be_err()?;

            match CompressionMethod::from_int(selector) {
                Some(CompressionMethod::NoCompression) => read_raw_plane(stream, width, height),
                Some(CompressionMethod::RLE) => match pre_read {
                    Some(lengths) => read_rle_plane(stream, width, height, lengths),
                    None => {
                        let lengths = read_line_lengths(stream, height)?;
                        read_rle_plane(stream, width, height, &lengths)
                    }
                },
                None => Err(PSDDecodeErrors::UnknownCompression(selector))
            }
        }
        PlaneHeader::Shared {
            line_lengths: Some(lengths)
        } => {
            let start = plane_index * height;
            let lengths = lengths
                .get(start..start + height)
                .ok_or(PSDDecodeErrors::MalformedPlane("Missing scanline lengths for plane"))?;

            read_rle_plane(stream, width, height, lengths)
        }
        PlaneHeader::Shared { line_lengths: None } => read_raw_plane(stream, width, height)
    }
}

fn plane_size(width: usize, height: usize) -> Result<usize, PSDDecodeErrors> {
    width
        .checked_mul(height)
        .ok_or(PSDDecodeErrors::MalformedPlane("Plane dimensions overflow"))
}

fn read_raw_plane<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, width: usize, height: usize
) -> Result<Vec<u8>, PSDDecodeErrors> {
    read_bounded(stream, plane_size(width, height)?)
}

/// Decode `height` PackBits scanlines, each of which must fill exactly one row
///
/// The plane is extended a row at a time so its size follows the
/// scanlines actually present in the stream.
fn read_rle_plane<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, width: usize, height: usize, lengths: &[u16]
) -> Result<Vec<u8>, PSDDecodeErrors> {
    plane_size(width, height)?;

    if lengths.len() < height {
        return Err(PSDDecodeErrors::MalformedPlane(
            "Fewer scanline lengths than rows"
        ));
    }
    let mut plane = Vec::new();
    let mut scanline = Vec::new();
    let mut out = vec![0; width];

    for (row, length) in lengths.iter().take(height).enumerate() {
        scanline.resize(usize::from(*length), 0);
        stream.read_exact_bytes(&mut scanline)?;

        if decode_rle(&scanline, &mut out, row)? != width {
            return Err(PSDDecodeErrors::CorruptRle(row));
        }
        plane.extend_from_slice(&out);
    }
    Ok(plane)
}

/// Decode one PackBits compressed scanline from `src` into `dst`
///
/// Loop until the source is exhausted:
///  - Read the next source byte into n, treating it as signed.
///  - If n is between 0 and 127 inclusive, copy the next n+1 bytes literally.
///  - Else copy the next byte 1-n times (n = -128 repeats 129 times).
///
/// Returns the number of bytes written to `dst`, running past the end
/// of either buffer is an error. Planes additionally require every scanline
/// to fill its row.
pub fn decode_rle(src: &[u8], dst: &mut [u8], row: usize) -> Result<usize, PSDDecodeErrors> {
    let mut sindex = 0;
    let mut dindex = 0;

    while sindex < src.len() {
        let n = src[sindex] as i8;
        sindex += 1;

        if n < 0 {
            let count = (1 - i16::from(n)) as usize;
            let value = *src.get(sindex).ok_or(PSDDecodeErrors::CorruptRle(row))?;
            sindex += 1;

            dst.get_mut(dindex..dindex + count)
                .ok_or(PSDDecodeErrors::CorruptRle(row))?
                .fill(value);
            dindex += count;
        } else {
            let count = n as usize + 1;
            let literal = src
                .get(sindex..sindex + count)
                .ok_or(PSDDecodeErrors::CorruptRle(row))?;

            dst.get_mut(dindex..dindex + count)
                .ok_or(PSDDecodeErrors::CorruptRle(row))?
                .copy_from_slice(literal);
            sindex += count;
            dindex += count;
        }
    }
    Ok(dindex)
}
