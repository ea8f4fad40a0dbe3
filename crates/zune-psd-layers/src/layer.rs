/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
use alloc::vec::Vec;

use crate::compositor::argb_to_rgba;

/// Structural role of a layer record
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LayerType {
    /// A layer with content
    Normal,
    /// Opens a folder, layers below it (up to the matching [`LayerType::Hidden`])
    /// belong to it
    Folder,
    /// Closes the nearest open folder.
    ///
    /// This is the bounding section divider Photoshop writes at the bottom
    /// of every group, not necessarily a layer the user hid.
    Hidden
}

impl LayerType {
    /// Map a section divider setting to a layer type
    pub const fn from_section_divider(kind: u32) -> LayerType {
        match kind {
            1 | 2 => LayerType::Folder,
            3 => LayerType::Hidden,
            _ => LayerType::Normal
        }
    }
}

/// A channel descriptor from a layer record
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelInfo {
    /// 0 red, 1 green, 2 blue, -1 alpha, anything else (masks, spot channels)
    /// is skipped
    pub id:     i16,
    /// Number of bytes the channel occupies in the stream, including
    /// its encoding selector if it has one
    pub length: u64
}

impl ChannelInfo {
    pub const fn new(id: i16, length: u64) -> ChannelInfo {
        ChannelInfo { id, length }
    }
}

/// One entry of the document's layer stack
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layer {
    name:       String,
    top:        i32,
    left:       i32,
    bottom:     i32,
    right:      i32,
    opacity:    u8,
    visible:    bool,
    clipping:   bool,
    blend_mode: [u8; 4],
    layer_type: LayerType,
    channels:   Vec<ChannelInfo>,
    pixels:     Option<Vec<u32>>,
    parent:     Option<usize>
}

impl Layer {
    /// Create a fully opaque, visible layer with normal blending and no pixels
    ///
    /// Bounds are given in document coordinates, `bottom` and `right` exclusive.
    pub fn new(layer_type: LayerType, top: i32, left: i32, bottom: i32, right: i32) -> Layer {
        Layer {
            name: String::new(),
            top,
            left,
            bottom,
            right,
            opacity: 255,
            visible: true,
            clipping: false,
            blend_mode: *b"norm",
            layer_type,
            channels: Vec::new(),
            pixels: None,
            parent: None
        }
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_clipping(&mut self, clipping: bool) {
        self.clipping = clipping;
    }

    pub fn set_blend_mode(&mut self, key: [u8; 4]) {
        self.blend_mode = key;
    }

    pub fn set_layer_type(&mut self, layer_type: LayerType) {
        self.layer_type = layer_type;
    }

    pub fn set_channels(&mut self, channels: Vec<ChannelInfo>) {
        self.channels = channels;
    }

    /// Attach decoded pixels, `width*height` packed ARGB words
    pub fn set_pixels(&mut self, pixels: Option<Vec<u32>>) {
        self.pixels = pixels;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<usize>) {
        self.parent = parent;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn top(&self) -> i32 {
        self.top
    }

    pub const fn left(&self) -> i32 {
        self.left
    }

    pub const fn bottom(&self) -> i32 {
        self.bottom
    }

    pub const fn right(&self) -> i32 {
        self.right
    }

    /// Width of the layer, zero if the bounds are inverted
    pub fn width(&self) -> usize {
        (i64::from(self.right) - i64::from(self.left)).max(0) as usize
    }

    /// Height of the layer, zero if the bounds are inverted
    pub fn height(&self) -> usize {
        (i64::from(self.bottom) - i64::from(self.top)).max(0) as usize
    }

    pub const fn opacity(&self) -> u8 {
        self.opacity
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn is_clipping(&self) -> bool {
        self.clipping
    }

    /// Four character blend mode key, e.g `norm` or `mul `
    pub const fn blend_mode(&self) -> [u8; 4] {
        self.blend_mode
    }

    pub const fn layer_type(&self) -> LayerType {
        self.layer_type
    }

    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    /// Index of the folder containing this layer in the document's layer list
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Packed ARGB pixels, `None` if the layer has no area
    pub fn pixels(&self) -> Option<&[u32]> {
        self.pixels.as_deref()
    }

    /// Pixels as interleaved RGBA bytes
    pub fn rgba8(&self) -> Option<Vec<u8>> {
        self.pixels.as_deref().map(argb_to_rgba)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{Layer, LayerType};

    #[test]
    fn section_divider_kinds() {
        assert_eq!(LayerType::from_section_divider(0), LayerType::Normal);
        assert_eq!(LayerType::from_section_divider(1), LayerType::Folder);
        assert_eq!(LayerType::from_section_divider(2), LayerType::Folder);
        assert_eq!(LayerType::from_section_divider(3), LayerType::Hidden);
        assert_eq!(LayerType::from_section_divider(9), LayerType::Normal);
    }

    #[test]
    fn inverted_bounds_have_no_area() {
        let layer = Layer::new(LayerType::Normal, 10, 10, 5, 20);
        assert_eq!(layer.width(), 10);
        assert_eq!(layer.height(), 0);

        let extreme = Layer::new(LayerType::Normal, i32::MIN, i32::MIN, i32::MAX, 0);
        assert_eq!(extreme.height(), u32::MAX as usize);
        assert_eq!(extreme.width(), 1 << 31);
    }

    #[test]
    fn rgba_view_of_pixels() {
        let mut layer = Layer::new(LayerType::Normal, 0, 0, 1, 1);
        assert!(layer.rgba8().is_none());

        layer.set_pixels(Some(vec![0x80FF_0010]));
        assert_eq!(layer.rgba8().unwrap(), [0xFF, 0x00, 0x10, 0x80]);
    }
}
