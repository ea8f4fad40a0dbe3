/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A layered PSD reader.
//!
//! Walks the sections of a version 1 document (header, color mode data,
//! image resources, layer and mask information, merged image data)
//! and decodes the pixels of every layer plus the merged image.
//!
//! Only 8 bit planes are supported, layer masks are skipped.
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use zune_core::bit_depth::BitDepth;
use zune_core::bytestream::{ZByteReaderTrait, ZReader};
use zune_core::log::trace;
use zune_core::options::DecoderOptions;

use crate::constants::{
    ColorModes, CompressionMethod, KEY_NESTED_SECTION_DIVIDER, KEY_SECTION_DIVIDER,
    KEY_UNICODE_NAME, MAX_CHANNELS, PSD_IDENTIFIER_BE, RESOURCE_ANIMATION, SIGNATURE_8B64,
    SIGNATURE_8BIM
};
use crate::document::{Animation, Document, ParsedDocument, PsdHeader};
use crate::errors::PSDDecodeErrors;
use crate::image::{read_image, ImageRequest};
use crate::layer::{ChannelInfo, Layer, LayerType};
use crate::plane::{read_bounded, read_line_lengths, PlaneHeader};

/// Layer bounds are stored as `i32`, larger images cannot be described
const MAX_DIMENSION: usize = i32::MAX as usize;

/// A Photoshop PSD reader that keeps layers
///
/// The decoder is initialized by calling `new`
/// and either of [`decode_headers`] to decode headers,
/// [`parse`] to read every section without linking layers,
/// or [`decode`] to return the assembled document
///
/// [`decode_headers`]:PSDDocumentDecoder::decode_headers
/// [`parse`]:PSDDocumentDecoder::parse
/// [`decode`]:PSDDocumentDecoder::decode
pub struct PSDDocumentDecoder<T>
where
    T: ZByteReaderTrait
{
    stream:  ZReader<T>,
    options: DecoderOptions,
    header:  Option<PsdHeader>
}

impl<T> PSDDocumentDecoder<T>
where
    T: ZByteReaderTrait
{
    /// Create a new decoder that reads a photoshop encoded file
    /// from `T` and returns a document
    ///
    /// # Arguments
    /// - data: Data source, it has to implement the `ZByteReaderTrait`
    pub fn new(data: T) -> PSDDocumentDecoder<T> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Creates a new decoder with options that influence decoding routines
    ///
    /// # Arguments
    /// - data: Data source
    /// - options: Custom options for the decoder
    pub fn new_with_options(data: T, options: DecoderOptions) -> PSDDocumentDecoder<T> {
        PSDDocumentDecoder {
            stream: ZReader::new(data),
            options,
            header: None
        }
    }

    /// Decode headers from the encoded image
    ///
    /// This confirms whether the image is a photoshop image and extracts
    /// relevant information from the image including width,height and extra information.
    pub fn decode_headers(&mut self) -> Result<(), PSDDecodeErrors> {
        if self.header.is_some() {
            return Ok(());
        }
        // Check identifier
        let magic = self.stream.get_u32_be_err()?;

        if magic != PSD_IDENTIFIER_BE {
            return Err(PSDDecodeErrors::WrongMagicBytes(magic));
        }

        //  file version
        let version = self.stream.get_u16_be_err()?;

        if version != 1 {
            return Err(PSDDecodeErrors::UnsupportedFileType(version));
        }
        // Skip 6 reserved bytes
        self.stream.skip(6)?;
        // Read the number of channels (R, G, B, A, etc).
        let channels = self.stream.get_u16_be_err()?;

        if channels == 0 || channels > MAX_CHANNELS {
            return Err(PSDDecodeErrors::UnsupportedChannelCount(channels));
        }

        let height = self.stream.get_u32_be_err()? as usize;
        let width = self.stream.get_u32_be_err()? as usize;

        self.check_dimensions(width, height)?;

        let depth = self.stream.get_u16_be_err()?;

        if depth != 8 {
            return Err(PSDDecodeErrors::UnsupportedBitDepth(depth));
        }

        let color_mode = self.stream.get_u16_be_err()?;

        let color_mode =
            ColorModes::from_int(color_mode).ok_or(PSDDecodeErrors::UnknownColorMode(color_mode))?;

        trace!("Image width:{}", width);
        trace!("Image height:{}", height);
        trace!("Channels: {}", channels);
        trace!("Color mode: {:?}", color_mode);

        self.header = Some(PsdHeader {
            channels,
            width,
            height,
            depth,
            color_mode
        });

        Ok(())
    }

    /// Read every section of the document
    ///
    /// Layers are returned in storage order without parent links,
    /// see [`decode`](Self::decode) for the assembled document.
    pub fn parse(&mut self) -> Result<ParsedDocument, PSDDecodeErrors> {
        self.decode_headers()?;

        let header = self
            .header
            .ok_or(PSDDecodeErrors::Generic("Header not decoded"))?;

        // skip mode data
        let bytes = self.stream.get_u32_be_err()? as usize;
        self.stream.skip(bytes)?;

        let animation = self.read_image_resources()?;
        let layers = self.read_layer_and_mask_info(&header)?;
        let base_layer = self.read_base_layer(&header)?;

        Ok(ParsedDocument {
            header,
            layers,
            base_layer,
            animation
        })
    }

    /// Decode a PSD file into a document with layers linked
    /// into their folders
    pub fn decode(&mut self) -> Result<Document, PSDDecodeErrors> {
        let parsed = self.parse()?;
        Ok(Document::assemble(parsed))
    }

    fn check_dimensions(&self, width: usize, height: usize) -> Result<(), PSDDecodeErrors> {
        let max_width = self.options.max_width().min(MAX_DIMENSION);
        let max_height = self.options.max_height().min(MAX_DIMENSION);

        if width > max_width {
            return Err(PSDDecodeErrors::LargeDimensions(max_width, width));
        }

        if height > max_height {
            return Err(PSDDecodeErrors::LargeDimensions(max_height, height));
        }
        Ok(())
    }

    fn read_signature(&mut self) -> Result<[u8; 4], PSDDecodeErrors> {
        let mut signature = [0; 4];
        self.stream.read_exact_bytes(&mut signature)?;
        Ok(signature)
    }

    /// Read the image resources section, keeping only animation data
    fn read_image_resources(&mut self) -> Result<Option<Animation>, PSDDecodeErrors> {
        let length = u64::from(self.stream.get_u32_be_err()?);
        let end = self.stream.position()? + length;

        let mut animation = None;

        while self.stream.position()? < end {
            // resources may carry signatures other than 8BIM, they share the layout
            let _signature = self.read_signature()?;
            let id = self.stream.get_u16_be_err()?;

            // pascal string padded to an even size
            let name_length = usize::from(self.stream.read_u8_err()?);
            self.stream.skip((name_length + 1 + 1) / 2 * 2 - 1)?;

            let size = u64::from(self.stream.get_u32_be_err()?);

            if size > length {
                return Err(PSDDecodeErrors::Generic(
                    "Image resource larger than its section"
                ));
            }
            let padded = (size + (size & 1)) as usize;

            if id == RESOURCE_ANIMATION {
                let data = read_bounded(&mut self.stream, size as usize)?;
                self.stream.skip(padded - data.len())?;

                trace!("Animation data: {} bytes", size);
                animation = Some(Animation::new(data));
            } else {
                trace!("Skipping image resource {} ({} bytes)", id, size);
                self.stream.skip(padded)?;
            }
        }
        self.stream.set_position(end as usize)?;

        Ok(animation)
    }

    fn read_layer_and_mask_info(
        &mut self, header: &PsdHeader
    ) -> Result<Option<Vec<Layer>>, PSDDecodeErrors> {
        let length = u64::from(self.stream.get_u32_be_err()?);

        if length == 0 {
            return Ok(None);
        }
        let end = self.stream.position()? + length;

        let info_length = self.stream.get_u32_be_err()?;

        let layers = if info_length == 0 {
            None
        } else {
            // negative counts mark the first alpha channel as merged transparency
            let count = (self.stream.get_u16_be_err()? as i16).unsigned_abs();

            trace!("Layer count: {}", count);

            if count == 0 {
                None
            } else {
                let mut layers = Vec::new();

                for _ in 0..count {
                    layers.push(self.read_layer_record()?);
                }
                self.read_layer_images(header, &mut layers)?;

                Some(layers)
            }
        };
        // global layer mask info and tagged blocks
        self.stream.set_position(end as usize)?;

        Ok(layers)
    }

    fn read_layer_record(&mut self) -> Result<Layer, PSDDecodeErrors> {
        let top = self.stream.get_u32_be_err()? as i32;
        let left = self.stream.get_u32_be_err()? as i32;
        let bottom = self.stream.get_u32_be_err()? as i32;
        let right = self.stream.get_u32_be_err()? as i32;

        let mut layer = Layer::new(LayerType::Normal, top, left, bottom, right);

        self.check_dimensions(layer.width(), layer.height())?;

        let channel_count = self.stream.get_u16_be_err()?;

        if channel_count > MAX_CHANNELS {
            return Err(PSDDecodeErrors::UnsupportedChannelCount(channel_count));
        }
        let mut channels = Vec::with_capacity(usize::from(channel_count));

        for _ in 0..channel_count {
            let id = self.stream.get_u16_be_err()? as i16;
            let length = u64::from(self.stream.get_u32_be_err()?);

            channels.push(ChannelInfo::new(id, length));
        }
        layer.set_channels(channels);

        let signature = self.read_signature()?;

        if signature != SIGNATURE_8BIM {
            return Err(PSDDecodeErrors::BadSignature(SIGNATURE_8BIM, signature));
        }
        layer.set_blend_mode(self.read_signature()?);
        layer.set_opacity(self.stream.read_u8_err()?);
        layer.set_clipping(self.stream.read_u8_err()? != 0);

        let flags = self.stream.read_u8_err()?;
        layer.set_visible(flags & 0b10 == 0);
        // filler
        self.stream.skip(1)?;

        let extra_length = u64::from(self.stream.get_u32_be_err()?);
        let extra_end = self.stream.position()? + extra_length;

        // layer mask data
        let mask_length = self.stream.get_u32_be_err()? as usize;
        self.stream.skip(mask_length)?;

        // blending ranges
        let ranges_length = self.stream.get_u32_be_err()? as usize;
        self.stream.skip(ranges_length)?;

        // pascal string padded to a multiple of 4
        let name_length = usize::from(self.stream.read_u8_err()?);
        let mut name = vec![0; name_length];
        self.stream.read_exact_bytes(&mut name)?;
        self.stream
            .skip((name_length + 1 + 3) / 4 * 4 - (name_length + 1))?;

        layer.set_name(String::from_utf8_lossy(&name).into_owned());

        self.read_additional_info(&mut layer, extra_end)?;
        self.stream.set_position(extra_end as usize)?;

        trace!(
            "Layer {:?} {:?} {}x{} at ({},{})",
            layer.name(),
            layer.layer_type(),
            layer.width(),
            layer.height(),
            layer.left(),
            layer.top()
        );

        Ok(layer)
    }

    /// Read tagged blocks after the layer name up to `end`
    fn read_additional_info(&mut self, layer: &mut Layer, end: u64) -> Result<(), PSDDecodeErrors> {
        // signature, key and length
        while self.stream.position()? + 12 <= end {
            let signature = self.read_signature()?;

            if signature != SIGNATURE_8BIM && signature != SIGNATURE_8B64 {
                break;
            }
            let key = self.read_signature()?;
            let length = u64::from(self.stream.get_u32_be_err()?);
            let data_end = self.stream.position()? + length;

            match key {
                KEY_SECTION_DIVIDER | KEY_NESTED_SECTION_DIVIDER if length >= 4 => {
                    let kind = self.stream.get_u32_be_err()?;
                    layer.set_layer_type(LayerType::from_section_divider(kind));
                }
                KEY_UNICODE_NAME if length >= 4 => {
                    let units = u64::from(self.stream.get_u32_be_err()?);

                    if units * 2 <= length - 4 {
                        let mut name = Vec::new();

                        for _ in 0..units {
                            name.push(self.stream.get_u16_be_err()?);
                        }
                        let name = String::from_utf16_lossy(&name);
                        layer.set_name(String::from(name.trim_end_matches('\0')));
                    }
                }
                _ => {}
            }
            self.stream.set_position(data_end as usize)?;
        }
        Ok(())
    }

    /// Read channel image data of every layer, in record order
    fn read_layer_images(
        &mut self, header: &PsdHeader, layers: &mut [Layer]
    ) -> Result<(), PSDDecodeErrors> {
        for layer in layers.iter_mut() {
            // full opacity would still scale 255 down to 254
            let opacity = (layer.opacity() < 255).then_some(layer.opacity());

            let request = ImageRequest {
                channels: layer.channels(),
                width: layer.width(),
                height: layer.height(),
                color_mode: header.color_mode,
                opacity,
                header: PlaneHeader::Own { pre_read: None },
                strict: self.options.strict_mode()
            };
            let pixels = read_image(&mut self.stream, &request)?;

            layer.set_pixels(pixels);
        }
        Ok(())
    }

    /// Read the merged image, which shares one compression method
    /// and one table of scanline lengths between all planes
    fn read_base_layer(&mut self, header: &PsdHeader) -> Result<Layer, PSDDecodeErrors> {
        let (width, height) = (header.width, header.height);

        let compression = self.stream.get_u16_be_err()?;
        let compression = CompressionMethod::from_int(compression)
            .ok_or(PSDDecodeErrors::UnknownCompression(compression))?;

        let planes = usize::from(header.channels);

        let line_lengths = match compression {
            CompressionMethod::RLE => {
                let count = height
                    .checked_mul(planes)
                    .ok_or(PSDDecodeErrors::MalformedPlane("Plane dimensions overflow"))?;
                Some(read_line_lengths(&mut self.stream, count)?)
            }
            CompressionMethod::NoCompression => None
        };

        // planes after the last used one are never read, the merged image ends the file
        let channels: Vec<ChannelInfo> = (0..planes)
            .map_while(|index| {
                let id = header.color_mode.merged_channel_id(index)?;
                let length = match &line_lengths {
                    Some(lengths) => lengths[index * height..(index + 1) * height]
                        .iter()
                        .map(|x| u64::from(*x))
                        .sum(),
                    None => width.saturating_mul(height) as u64
                };
                Some(ChannelInfo::new(id, length))
            })
            .collect();

        let request = ImageRequest {
            channels: &channels,
            width,
            height,
            color_mode: header.color_mode,
            opacity: None,
            header: PlaneHeader::Shared {
                line_lengths: line_lengths.as_deref()
            },
            strict: self.options.strict_mode()
        };
        let pixels = read_image(&mut self.stream, &request)?;

        let bottom = i32::try_from(height)
            .map_err(|_| PSDDecodeErrors::LargeDimensions(MAX_DIMENSION, height))?;
        let right = i32::try_from(width)
            .map_err(|_| PSDDecodeErrors::LargeDimensions(MAX_DIMENSION, width))?;

        let mut base_layer = Layer::new(LayerType::Normal, 0, 0, bottom, right);
        base_layer.set_channels(channels);
        base_layer.set_pixels(pixels);

        Ok(base_layer)
    }

    /// Get image bit depth or None if the headers haven't been decoded
    pub fn bit_depth(&self) -> Option<BitDepth> {
        self.header.map(|_| BitDepth::Eight)
    }

    /// Get image width and height respectively or None if the
    /// headers haven't been decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header.map(|header| (header.width, header.height))
    }

    /// Get the document color mode or None if the
    /// image header hasn't been decoded
    pub fn color_mode(&self) -> Option<ColorModes> {
        self.header.map(|header| header.color_mode)
    }

    /// Get the number of channels of the merged image or None if the
    /// image header hasn't been decoded
    pub fn channel_count(&self) -> Option<usize> {
        self.header.map(|header| usize::from(header.channels))
    }

    /// Get the decoded header or None if it hasn't been decoded
    pub const fn header(&self) -> Option<&PsdHeader> {
        self.header.as_ref()
    }
}
