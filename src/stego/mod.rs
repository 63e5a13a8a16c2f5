// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! Steganographic embedding and extraction.
//!
//! The codec writes a length-prefixed, CRC-protected bit frame into the
//! flippable modules of a QR symbol, scattered by a prime-step sequence
//! that both sides regenerate from the symbol geometry alone. Extraction
//! regenerates the clean reference symbol from the primary text and reads
//! the frame out of the differences.
//!
//! Everything here is a pure transformation: no I/O, no shared mutable
//! state, no retries. The only observability is the emit-only
//! [`StegoMetadata`] attached to results.

pub mod capacity;
pub mod crc;
pub mod distribute;
pub mod error;
pub mod frame;
mod pipeline;

pub use error::StegoError;
pub use pipeline::{
    capacity, capacity_with_margin, decode_from_matrix, decode_image,
    decode_image_with_options, decode_matrix, decode_matrix_with_options, encode,
    encode_with_options, validate_capacity, validate_capacity_with_margin, Decoded,
    DecodeOptions, Encoded, EncodeOptions, StegoMetadata, METADATA_FORMAT_VERSION,
};
