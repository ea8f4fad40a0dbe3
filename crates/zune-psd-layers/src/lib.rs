//! A layered PSD decoder
//!
//! This crate reads Photoshop PSD files into a document keeping their layers,
//! the folders those layers are grouped into and the pixels of every layer.
//!
//! ## What is supported
//! - Version 1 (`.psd`) files with 8 bit channels.
//! - Raw and RLE (PackBits) compressed channel planes.
//! - RGB(A) layers, grayscale and duotone layers are shown as gray.
//! - Folder nesting, layer names, bounds, opacity, visibility and blend mode keys.
//!
//! Layer masks are skipped, blending is not performed and layers are not
//! composited into each other, the merged image stored in the file is exposed
//! as the base layer instead.
//!
//! Pixels are packed ARGB words, alpha in the most significant byte.
//!
//! # Example
//! - Reading a psd file
//! ```no_run
//! use zune_psd_layers::errors::PSDDecodeErrors;
//! use zune_psd_layers::PSDDocumentDecoder;
//!
//! fn main() -> Result<(), PSDDecodeErrors> {
//!     use zune_core::bytestream::ZCursor;
//!     let mut decoder = PSDDocumentDecoder::new(ZCursor::new(&[]));
//!     let document = decoder.decode()?;
//!
//!     for (index, layer) in document.layers().iter().enumerate() {
//!         let parent = document.parent(index).map(|folder| folder.name());
//!         println!("{} in {:?}: {}x{}", layer.name(), parent, layer.width(), layer.height());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//! - `std`: Enables `std::error::Error` for errors and [`Document::open`]
//! - `log`: Forwards decoder tracing to the `log` crate
#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;
pub extern crate zune_core;

pub use constants::ColorModes;
pub use decoder::PSDDocumentDecoder;
pub use document::{Animation, Document, ParsedDocument, PsdHeader};
pub use layer::{ChannelInfo, Layer, LayerType};

pub mod compositor;
pub mod constants;
pub mod decoder;
pub mod document;
pub mod errors;
pub mod image;
pub mod layer;
pub mod plane;
pub mod tree;
