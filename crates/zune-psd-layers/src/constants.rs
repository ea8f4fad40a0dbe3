/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

pub const PSD_IDENTIFIER_BE: u32 = 0x38425053;

/// `8BIM`, signature of image resources, blend modes and tagged blocks
pub const SIGNATURE_8BIM: [u8; 4] = *b"8BIM";
/// `8B64`, alternative tagged block signature written by newer versions
pub const SIGNATURE_8B64: [u8; 4] = *b"8B64";

/// Section divider setting
pub const KEY_SECTION_DIVIDER: [u8; 4] = *b"lsct";
/// Nested section divider setting
pub const KEY_NESTED_SECTION_DIVIDER: [u8; 4] = *b"lsdk";
/// Unicode layer name
pub const KEY_UNICODE_NAME: [u8; 4] = *b"luni";

/// Image resource id carrying animation data
pub const RESOURCE_ANIMATION: u16 = 4000;

/// Channel ids as stored in layer records
pub const CHANNEL_RED: i16 = 0;
pub const CHANNEL_GREEN: i16 = 1;
pub const CHANNEL_BLUE: i16 = 2;
pub const CHANNEL_ALPHA: i16 = -1;

/// Largest channel count a document header may declare
pub const MAX_CHANNELS: u16 = 56;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorModes {
    Bitmap = 0,
    Grayscale = 1,
    IndexedColor = 2,
    RGB = 3,
    CYMK = 4,
    MultiChannel = 7,
    DuoTone = 8,
    LabColor = 9
}

impl ColorModes {
    pub fn from_int(int: u16) -> Option<ColorModes> {
        use crate::constants::ColorModes::{
            Bitmap, DuoTone, Grayscale, IndexedColor, LabColor, MultiChannel, CYMK, RGB
        };

        match int {
            0 => Some(Bitmap),
            1 => Some(Grayscale),
            2 => Some(IndexedColor),
            3 => Some(RGB),
            4 => Some(CYMK),
            7 => Some(MultiChannel),
            8 => Some(DuoTone),
            9 => Some(LabColor),
            _ => None
        }
    }

    /// Whether the first channel of an image holds a single gray value
    /// that is shown on all three color components
    pub const fn is_single_tone(self) -> bool {
        matches!(self, ColorModes::Grayscale | ColorModes::DuoTone)
    }

    /// Channel id of the merged image plane at `index`, or `None` when the
    /// plane carries nothing the compositor uses
    pub const fn merged_channel_id(self, index: usize) -> Option<i16> {
        match self {
            ColorModes::Grayscale | ColorModes::DuoTone => match index {
                0 => Some(CHANNEL_RED),
                1 => Some(CHANNEL_ALPHA),
                _ => None
            },
            ColorModes::Bitmap | ColorModes::IndexedColor => match index {
                0 => Some(CHANNEL_RED),
                _ => None
            },
            ColorModes::RGB | ColorModes::CYMK | ColorModes::MultiChannel | ColorModes::LabColor => {
                match index {
                    0 => Some(CHANNEL_RED),
                    1 => Some(CHANNEL_GREEN),
                    2 => Some(CHANNEL_BLUE),
                    3 => Some(CHANNEL_ALPHA),
                    _ => None
                }
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompressionMethod {
    NoCompression = 0,
    RLE = 1
}

impl CompressionMethod {
    pub fn from_int(int: u16) -> Option<CompressionMethod> {
        match int {
            0 => Some(Self::NoCompression),
            1 => Some(Self::RLE),
            _ => None
        }
    }
}
