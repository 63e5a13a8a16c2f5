// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! # qrveil
//!
//! Hide a second text message inside an ordinary QR code.
//!
//! A QR symbol at error-correction level H survives substantial module
//! damage. qrveil spends a small, carefully bounded part of that slack on
//! purpose: it toggles a pseudo-uniformly scattered set of data modules to
//! carry a hidden ("secondary") message alongside the public ("primary")
//! one. Any conforming reader still sees only the primary — the flips look
//! like damage and get repaired silently. A cooperating reader that knows
//! the primary regenerates the clean symbol, diffs it against the scanned
//! one, and reads the secondary out of the flip pattern.
//!
//! The QR machinery itself (encoding, detection, Reed–Solomon) is delegated
//! to the `qrcode` and `rqrr` crates; this crate owns the structural
//! analysis, the wire format, and the embedding/extraction pipelines.
//!
//! Knowing the primary is the only access control. This is steganography,
//! not cryptography — encrypt the secondary first if secrecy matters.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use qrveil::{encode, decode_matrix};
//!
//! let encoded = qrveil::encode("https://example.com", "meet at dawn")?;
//! let rows = encoded.matrix.to_rows();
//! // ... print, transmit, or render `rows` ...
//! let decoded = qrveil::decode_matrix(&rows, "https://example.com")?;
//! assert_eq!(decoded.secondary, "meet at dawn");
//! ```

pub mod qr;
pub mod stego;

pub use qr::{EcLevel, Matrix, ModuleClass, QrError};
pub use stego::{
    capacity, capacity_with_margin, decode_from_matrix, decode_image,
    decode_image_with_options, decode_matrix, decode_matrix_with_options, encode,
    encode_with_options, validate_capacity, validate_capacity_with_margin, Decoded,
    DecodeOptions, Encoded, EncodeOptions, StegoError, StegoMetadata,
};
