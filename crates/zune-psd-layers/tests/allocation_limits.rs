/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Size fields in a file must not decide how much memory is reserved
//! before the bytes they describe have been read.
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use zune_core::bytestream::ZCursor;
use zune_psd_layers::errors::PSDDecodeErrors;
use zune_psd_layers::{Document, PSDDocumentDecoder};

struct Tracking;

thread_local! {
    static LARGEST: Cell<usize> = const { Cell::new(0) };
}

fn record(size: usize) {
    let _ = LARGEST.try_with(|largest| {
        if size > largest.get() {
            largest.set(size);
        }
    });
}

unsafe impl GlobalAlloc for Tracking {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(new_size);
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static ALLOCATOR: Tracking = Tracking;

const LIMIT: usize = 1 << 20;

/// Decode `bytes`, returning the result and the largest single allocation
/// made on this thread while decoding
fn decode_tracked(bytes: &[u8]) -> (Result<Document, PSDDecodeErrors>, usize) {
    LARGEST.with(|largest| largest.set(0));
    let result = PSDDocumentDecoder::new(ZCursor::new(bytes)).decode();
    let largest = LARGEST.with(|largest| largest.get());
    (result, largest)
}

/// 1x1 RGB header followed by empty color mode data
fn header() -> Vec<u8> {
    let mut out = b"8BPS".to_vec();
    out.extend_from_slice(&1_u16.to_be_bytes());
    out.extend_from_slice(&[0; 6]);
    out.extend_from_slice(&3_u16.to_be_bytes());
    out.extend_from_slice(&1_u32.to_be_bytes());
    out.extend_from_slice(&1_u32.to_be_bytes());
    out.extend_from_slice(&8_u16.to_be_bytes());
    out.extend_from_slice(&3_u16.to_be_bytes());
    out.extend_from_slice(&0_u32.to_be_bytes());
    out
}

/// Header, no resources and a layer section holding one record whose
/// length fields claim far more than the file holds
fn layer_document(bounds: (i32, i32, i32, i32), channels: &[(i16, u32)], extra: &[u8]) -> Vec<u8> {
    let mut out = header();
    out.extend_from_slice(&0_u32.to_be_bytes());
    // layer and mask info, layer info
    out.extend_from_slice(&u32::MAX.to_be_bytes());
    out.extend_from_slice(&u32::MAX.to_be_bytes());
    out.extend_from_slice(&1_u16.to_be_bytes());

    let (top, left, bottom, right) = bounds;
    for value in [top, left, bottom, right] {
        out.extend_from_slice(&value.to_be_bytes());
    }
    out.extend_from_slice(&(channels.len() as u16).to_be_bytes());
    for (id, length) in channels {
        out.extend_from_slice(&id.to_be_bytes());
        out.extend_from_slice(&length.to_be_bytes());
    }
    out.extend_from_slice(b"8BIMnorm");
    out.extend_from_slice(&[255, 0, 0, 0]);

    let mut data = Vec::new();
    // mask, blending ranges, empty name padded to four bytes
    data.extend_from_slice(&0_u32.to_be_bytes());
    data.extend_from_slice(&0_u32.to_be_bytes());
    data.extend_from_slice(&[0; 4]);
    data.extend_from_slice(extra);

    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&data);
    out
}

#[test]
fn animation_size_is_not_trusted() {
    let mut bytes = header();
    bytes.extend_from_slice(&0xFFFF_FFF0_u32.to_be_bytes());
    bytes.extend_from_slice(b"8BIM");
    bytes.extend_from_slice(&4000_u16.to_be_bytes());
    bytes.extend_from_slice(&[0, 0]);
    bytes.extend_from_slice(&0xF000_0000_u32.to_be_bytes());
    assert_eq!(bytes.len(), 46);

    let (result, largest) = decode_tracked(&bytes);
    assert!(matches!(result, Err(PSDDecodeErrors::IoErrors(_))));
    assert!(largest < LIMIT, "allocated {largest} bytes");
}

#[test]
fn unicode_name_length_is_not_trusted() {
    let mut luni = b"8BIMluni".to_vec();
    luni.extend_from_slice(&u32::MAX.to_be_bytes());
    luni.extend_from_slice(&0x7FFE_0000_u32.to_be_bytes());
    luni.extend_from_slice(&[0, 0x41, 0, 0x42]);

    let mut bytes = layer_document((0, 0, 0, 0), &[], &luni);
    // stretch the record to cover the claimed name
    let extra_at = bytes.len() - (12 + luni.len()) - 4;
    bytes[extra_at..extra_at + 4].copy_from_slice(&u32::MAX.to_be_bytes());

    let (result, largest) = decode_tracked(&bytes);
    assert!(matches!(result, Err(PSDDecodeErrors::IoErrors(_))));
    assert!(largest < LIMIT, "allocated {largest} bytes");
}

#[test]
fn layer_without_channels_does_not_allocate_its_area() {
    let bytes = layer_document((0, 0, 10_000, 10_000), &[], &[]);

    let (result, largest) = decode_tracked(&bytes);
    let err = result.unwrap_err();
    assert!(err.is_format_error());
    assert!(largest < LIMIT, "allocated {largest} bytes");
}

#[test]
fn channel_length_is_not_trusted() {
    let mut bytes = layer_document((0, 0, 10_000, 10_000), &[(0, u32::MAX)], &[]);
    // raw selector and a handful of pixels
    bytes.extend_from_slice(&0_u16.to_be_bytes());
    bytes.extend_from_slice(&[1, 2, 3, 4]);

    let (result, largest) = decode_tracked(&bytes);
    assert!(matches!(result, Err(PSDDecodeErrors::Channel { channel: 0, .. })));
    assert!(largest < LIMIT, "allocated {largest} bytes");
}

#[test]
fn rle_rows_must_be_present_before_the_plane_grows() {
    let mut bytes = layer_document((0, 0, 10_000, 10_000), &[(0, u32::MAX)], &[]);
    bytes.extend_from_slice(&1_u16.to_be_bytes());
    // every row claims 100 bytes, none are there
    for _ in 0..10_000 {
        bytes.extend_from_slice(&100_u16.to_be_bytes());
    }

    let (result, largest) = decode_tracked(&bytes);
    assert!(result.is_err());
    assert!(largest < LIMIT, "allocated {largest} bytes");
}
