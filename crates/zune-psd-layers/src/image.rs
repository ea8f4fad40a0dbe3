/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reading all channels of one image and packing them into pixels
use alloc::boxed::Box;
use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader};
use zune_core::log::{trace, warn};

use crate::compositor::{composite_planes, ChannelPlanes};
use crate::constants::{ColorModes, CHANNEL_ALPHA, CHANNEL_BLUE, CHANNEL_GREEN, CHANNEL_RED};
use crate::errors::PSDDecodeErrors;
use crate::layer::ChannelInfo;
use crate::plane::{read_plane, PlaneHeader};

/// What a decoded plane contributes to the pixels
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChannelRole {
    Red,
    Green,
    Blue,
    Alpha,
    /// A single tone shown on red, green and blue
    Gray
}

impl ChannelRole {
    /// Role of channel `id` in an image of `color_mode`, `None` for
    /// channels whose bytes are skipped
    pub const fn from_id(color_mode: ColorModes, id: i16) -> Option<ChannelRole> {
        if color_mode.is_single_tone() {
            return match id {
                CHANNEL_RED => Some(ChannelRole::Gray),
                CHANNEL_ALPHA => Some(ChannelRole::Alpha),
                _ => None
            };
        }
        match id {
            CHANNEL_RED => Some(ChannelRole::Red),
            CHANNEL_GREEN => Some(ChannelRole::Green),
            CHANNEL_BLUE => Some(ChannelRole::Blue),
            CHANNEL_ALPHA => Some(ChannelRole::Alpha),
            _ => None
        }
    }
}

/// Geometry and channel layout of one image
pub struct ImageRequest<'a> {
    pub channels:   &'a [ChannelInfo],
    pub width:      usize,
    pub height:     usize,
    pub color_mode: ColorModes,
    /// Layer opacity applied to decoded alpha, `None` leaves alpha untouched
    pub opacity:    Option<u8>,
    pub header:     PlaneHeader<'a>,
    /// Treat channels running past their declared length as errors
    pub strict:     bool
}

/// Decode every channel of an image and pack the result into ARGB words
///
/// Channels without a role are skipped by their declared length. Channels
/// that use fewer bytes than declared have the rest skipped.
///
/// Returns `Ok(None)` for images without area. An image with area needs at
/// least one color or alpha channel, the pixels are otherwise not backed by
/// any data in the stream.
pub fn read_image<T: ZByteReaderTrait>(
    stream: &mut ZReader<T>, request: &ImageRequest<'_>
) -> Result<Option<Vec<u32>>, PSDDecodeErrors> {
    let has_area = request.width > 0 && request.height > 0;
    let has_planes = request
        .channels
        .iter()
        .any(|info| ChannelRole::from_id(request.color_mode, info.id).is_some());

    if has_area && !has_planes {
        return Err(PSDDecodeErrors::MalformedPlane(
            "Image has area but no color or alpha channel"
        ));
    }
    let mut planes = ChannelPlanes::default();

    for (plane_index, info) in request.channels.iter().enumerate() {
        let start = stream.position()?;

        let role = match ChannelRole::from_id(request.color_mode, info.id) {
            Some(role) => role,
            None => {
                trace!("Skipping channel {} ({} bytes)", info.id, info.length);
                stream.skip(info.length as usize)?;
                continue;
            }
        };
        let plane = read_plane(
            stream,
            request.width,
            request.height,
            request.header,
            plane_index
        )
        .map_err(|error| PSDDecodeErrors::Channel {
            channel: info.id,
            offset:  start,
            error:   Box::new(error)
        })?;

        let consumed = stream.position()? - start;

        if consumed < info.length {
            stream.skip((info.length - consumed) as usize)?;
        } else if consumed > info.length {
            if request.strict {
                return Err(PSDDecodeErrors::Channel {
                    channel: info.id,
                    offset:  start,
                    error:   Box::new(PSDDecodeErrors::MalformedPlane(
                        "Channel data is longer than its declared length"
                    ))
                });
            }
            warn!(
                "Channel {} used {} bytes but declared {}",
                info.id, consumed, info.length
            );
        }

        match role {
            ChannelRole::Red => planes.red = Some(plane),
            ChannelRole::Green => planes.green = Some(plane),
            ChannelRole::Blue => planes.blue = Some(plane),
            ChannelRole::Alpha => planes.alpha = Some(plane),
            ChannelRole::Gray => {
                planes.red = Some(plane.clone());
                planes.green = Some(plane.clone());
                planes.blue = Some(plane);
            }
        }
    }

    Ok(composite_planes(
        planes,
        request.width,
        request.height,
        request.opacity
    ))
}
