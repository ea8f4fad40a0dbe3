/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Folder nesting of the layer list
//!
//! Layers are stored bottom to top, so walking the list from its end sees
//! a folder before its contents, and the divider closing the folder after them.
use alloc::vec;
use alloc::vec::Vec;

use zune_core::log::warn;

use crate::layer::{Layer, LayerType};

/// How well the folder markers of a layer list paired up
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TreeReport {
    /// Closing markers seen while no folder was open, these were ignored
    pub unmatched_closings: usize,
    /// Folders still open after the last layer
    pub unclosed_folders:   usize
}

impl TreeReport {
    /// True if every folder was closed exactly once
    pub const fn is_balanced(&self) -> bool {
        self.unmatched_closings == 0 && self.unclosed_folders == 0
    }
}

/// Parent links for a layer list
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LayerTree {
    /// Parent index per layer, in the order of the input
    pub parents: Vec<Option<usize>>,
    pub report:  TreeReport
}

/// Resolve parents from layer types given in storage (bottom to top) order
///
/// A normal layer or folder belongs to the innermost open folder,
/// a folder then becomes the innermost open folder and a [`LayerType::Hidden`]
/// marker closes it again. Markers closing nothing are counted and skipped.
pub fn resolve_parents(types: &[LayerType]) -> LayerTree {
    let mut parents = vec![None; types.len()];
    let mut open_folders: Vec<usize> = Vec::new();
    let mut report = TreeReport::default();

    for (index, layer_type) in types.iter().enumerate().rev() {
        match layer_type {
            LayerType::Normal => {
                parents[index] = open_folders.last().copied();
            }
            LayerType::Folder => {
                parents[index] = open_folders.last().copied();
                open_folders.push(index);
            }
            LayerType::Hidden => {
                if open_folders.pop().is_none() {
                    warn!("Layer {} closes a folder but none is open", index);
                    report.unmatched_closings += 1;
                }
            }
        }
    }
    if !open_folders.is_empty() {
        warn!("{} folders were never closed", open_folders.len());
    }
    report.unclosed_folders = open_folders.len();

    LayerTree { parents, report }
}

/// Resolve and store parents of `layers`
pub fn link_layers(layers: &mut [Layer]) -> TreeReport {
    let types: Vec<LayerType> = layers.iter().map(Layer::layer_type).collect();
    let tree = resolve_parents(&types);

    for (layer, parent) in layers.iter_mut().zip(tree.parents) {
        layer.set_parent(parent);
    }
    tree.report
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{link_layers, resolve_parents, TreeReport};
    use crate::layer::LayerType::{self, Folder, Hidden, Normal};
    use crate::layer::Layer;

    /// Types listed top to bottom, stored bottom to top
    fn stored(top_down: &[LayerType]) -> Vec<LayerType> {
        top_down.iter().rev().copied().collect()
    }

    #[test]
    fn single_folder() {
        // top to bottom: Normal, Folder, Normal, Normal, Hidden, Normal
        let types = stored(&[Normal, Folder, Normal, Normal, Hidden, Normal]);
        let tree = resolve_parents(&types);

        // storage index of the folder
        let folder = 4;
        assert_eq!(
            tree.parents,
            [None, None, Some(folder), Some(folder), None, None]
        );
        assert!(tree.report.is_balanced());
    }

    #[test]
    fn nested_folders() {
        // top to bottom: Folder A, Folder B, Normal, Hidden(B), Normal, Hidden(A)
        let types = stored(&[Folder, Folder, Normal, Hidden, Normal, Hidden]);
        let tree = resolve_parents(&types);

        let (a, b) = (5, 4);
        assert_eq!(tree.parents[a], None);
        assert_eq!(tree.parents[b], Some(a));
        assert_eq!(tree.parents[3], Some(b));
        assert_eq!(tree.parents[1], Some(a));
        assert!(tree.report.is_balanced());
    }

    #[test]
    fn unpaired_markers_are_reported() {
        let tree = resolve_parents(&stored(&[Hidden, Normal]));
        assert_eq!(tree.parents, [None, None]);
        assert_eq!(
            tree.report,
            TreeReport {
                unmatched_closings: 1,
                unclosed_folders:   0
            }
        );

        let tree = resolve_parents(&stored(&[Folder, Normal]));
        assert_eq!(tree.parents, [Some(1), None]);
        assert_eq!(tree.report.unclosed_folders, 1);
    }

    #[test]
    fn links_are_stored_on_layers() {
        let mut layers: Vec<Layer> = stored(&[Folder, Normal, Hidden])
            .into_iter()
            .map(|kind| Layer::new(kind, 0, 0, 1, 1))
            .collect();

        let report = link_layers(&mut layers);
        assert!(report.is_balanced());
        assert_eq!(layers[1].parent(), Some(2));
        assert_eq!(layers[2].parent(), None);
    }
}
