/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The decoded document
use alloc::vec::Vec;

use crate::constants::ColorModes;
use crate::layer::Layer;
use crate::tree::{link_layers, TreeReport};

/// Global image attributes from the file header
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PsdHeader {
    pub channels:   u16,
    pub width:      usize,
    pub height:     usize,
    pub depth:      u16,
    pub color_mode: ColorModes
}

/// Animation data, kept as the raw bytes of its image resource
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Animation {
    data: Vec<u8>
}

impl Animation {
    pub fn new(data: Vec<u8>) -> Animation {
        Animation { data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Everything read from a file before layers are linked into a tree
///
/// This is what [`PSDDocumentDecoder::parse`](crate::PSDDocumentDecoder::parse)
/// returns and what [`Document::assemble`] consumes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedDocument {
    pub header:     PsdHeader,
    /// Layers in storage order (bottom to top), `None` if the file has no layer records
    pub layers:     Option<Vec<Layer>>,
    /// The merged image of the whole document
    pub base_layer: Layer,
    pub animation:  Option<Animation>
}

/// A fully decoded layered document
///
/// Created by [`Document::assemble`] or by decoding a file,
/// read only afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Document {
    header:     PsdHeader,
    layers:     Option<Vec<Layer>>,
    base_layer: Layer,
    animation:  Option<Animation>,
    report:     TreeReport
}

impl Document {
    /// Link layers into folders and wrap everything into a document
    ///
    /// An absent or empty layer list is replaced by the base layer.
    pub fn assemble(parsed: ParsedDocument) -> Document {
        let ParsedDocument {
            header,
            layers,
            mut base_layer,
            animation
        } = parsed;

        let mut layers = layers.filter(|layers| !layers.is_empty());

        let report = match layers.as_mut() {
            Some(layers) => link_layers(layers),
            None => link_layers(core::slice::from_mut(&mut base_layer))
        };

        Document {
            header,
            layers,
            base_layer,
            animation,
            report
        }
    }

    /// Decode the document stored in the file at `path`
    #[cfg(feature = "std")]
    pub fn open<P: AsRef<std::path::Path>>(
        path: P, options: zune_core::options::DecoderOptions
    ) -> Result<Document, crate::errors::PSDDecodeErrors> {
        let file = std::fs::File::open(path)
            .map_err(|e| crate::errors::PSDDecodeErrors::IoErrors(e.into()))?;

        crate::PSDDocumentDecoder::new_with_options(std::io::BufReader::new(file), options)
            .decode()
    }

    pub const fn header(&self) -> &PsdHeader {
        &self.header
    }

    pub const fn width(&self) -> usize {
        self.header.width
    }

    pub const fn height(&self) -> usize {
        self.header.height
    }

    pub const fn depth(&self) -> u16 {
        self.header.depth
    }

    pub const fn color_mode(&self) -> ColorModes {
        self.header.color_mode
    }

    pub const fn channel_count(&self) -> u16 {
        self.header.channels
    }

    /// Layers in storage order, bottom to top
    ///
    /// Documents without layer records return the base layer as their only layer.
    pub fn layers(&self) -> &[Layer] {
        match &self.layers {
            Some(layers) => layers,
            None => core::slice::from_ref(&self.base_layer)
        }
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers().get(index)
    }

    /// Whether the file carried its own layer records
    pub const fn has_layer_records(&self) -> bool {
        self.layers.is_some()
    }

    pub const fn base_layer(&self) -> &Layer {
        &self.base_layer
    }

    pub const fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    /// Folder containing the layer at `index`
    pub fn parent(&self, index: usize) -> Option<&Layer> {
        self.layer(index)
            .and_then(Layer::parent)
            .and_then(|parent| self.layer(parent))
    }

    /// Layers directly inside `parent`, or top level layers for `None`,
    /// in storage order
    pub fn children(&self, parent: Option<usize>) -> impl Iterator<Item = (usize, &Layer)> + '_ {
        self.layers()
            .iter()
            .enumerate()
            .filter(move |(_, layer)| layer.parent() == parent)
    }

    /// How well folder markers paired up while linking layers
    pub const fn tree_report(&self) -> TreeReport {
        self.report
    }
}
