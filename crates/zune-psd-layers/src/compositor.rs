/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Packing decoded planes into ARGB pixels
use alloc::vec;
use alloc::vec::Vec;

/// Decoded planes of one image, `None` for channels the image doesn't carry
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChannelPlanes {
    pub red:   Option<Vec<u8>>,
    pub green: Option<Vec<u8>>,
    pub blue:  Option<Vec<u8>>,
    pub alpha: Option<Vec<u8>>
}

/// Pack one pixel into a word, alpha in the top byte followed by red, green and blue
#[inline(always)]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    u32::from_be_bytes([a, r, g, b])
}

/// Scale every alpha byte by `opacity/256`, rounding to the nearest value
pub fn scale_alpha(alpha: &mut [u8], opacity: u8) {
    let opacity = u32::from(opacity);

    for value in alpha.iter_mut() {
        *value = ((u32::from(*value) * opacity + 128) >> 8) as u8;
    }
}

fn plane_or(plane: Option<Vec<u8>>, size: usize, default: u8) -> Vec<u8> {
    match plane {
        Some(mut plane) => {
            plane.resize(size, default);
            plane
        }
        None => vec![default; size]
    }
}

/// Combine planes into `width*height` packed ARGB words
///
/// Missing color planes are treated as zero and a missing alpha plane as fully
/// opaque. When `opacity` is present the decoded alpha plane is scaled by it.
///
/// Returns `None` when either dimension is zero since such an image has
/// no pixels to show.
pub fn composite_planes(
    planes: ChannelPlanes, width: usize, height: usize, opacity: Option<u8>
) -> Option<Vec<u32>> {
    if width == 0 || height == 0 {
        return None;
    }
    let size = width * height;

    let mut alpha = planes.alpha;

    if let (Some(alpha), Some(opacity)) = (alpha.as_mut(), opacity) {
        scale_alpha(alpha, opacity);
    }
    let red = plane_or(planes.red, size, 0);
    let green = plane_or(planes.green, size, 0);
    let blue = plane_or(planes.blue, size, 0);
    let alpha = plane_or(alpha, size, 255);

    let pixels = red
        .iter()
        .zip(green.iter())
        .zip(blue.iter())
        .zip(alpha.iter())
        .map(|(((r, g), b), a)| pack_argb(*a, *r, *g, *b))
        .collect();

    Some(pixels)
}

/// Expand packed ARGB words into interleaved RGBA bytes
pub fn argb_to_rgba(pixels: &[u32]) -> Vec<u8> {
    let mut output = Vec::with_capacity(pixels.len() * 4);

    for pixel in pixels {
        let [a, r, g, b] = pixel.to_be_bytes();
        output.extend_from_slice(&[r, g, b, a]);
    }
    output
}
