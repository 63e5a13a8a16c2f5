// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! QR carrier layer: the module-grid data model, structural analysis of
//! function patterns, and thin wrappers around the external QR engine.
//!
//! This layer knows everything about *where* things live in a QR symbol and
//! nothing about *what* the embedding layer writes there. The `stego` layer
//! builds on the guarantees made here: [`structure::enumerate_flippable`]
//! yields the identical canonical position list on both the encode and the
//! decode side, and [`engine::encode_text`] is deterministic for a given
//! input and EC level.

pub mod engine;
pub mod error;
pub mod matrix;
pub mod structure;

pub use engine::{encode_text, scan_image, Scan};
pub use error::QrError;
pub use matrix::{EcLevel, Matrix, ModuleClass};
pub use structure::{classify, enumerate_flippable, flippable_positions, is_function};
