// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! Error types for the embedding and extraction pipelines.
//!
//! [`StegoError`] covers all failure modes from primary encoding through
//! frame extraction. Every fatal error carries the numbers needed to
//! diagnose it (requested vs. available capacity, expected vs. observed
//! checksum, mismatched sizes). Nothing is retried internally, and
//! encode/decode never partially succeed — an empty secondary is success,
//! not an error.

use std::fmt;

use crate::qr::error::QrError;

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// The external engine could not encode the primary text.
    PrimaryEncode(QrError),
    /// The external engine could not regenerate the reference symbol.
    ReferenceRegen(QrError),
    /// No readable QR symbol was found in the image.
    NoCodeFound,
    /// A caller-supplied module grid is not a valid QR matrix.
    MalformedMatrix,
    /// The symbol has no flippable modules (or too few to hold any frame).
    MatrixTooSmall,
    /// Scanned and regenerated symbols have different sizes.
    SizeMismatch { scanned: usize, reference: usize },
    /// The capacity model leaves no room even for an empty frame.
    InsufficientCapacity { bits: usize },
    /// More bit positions were requested than flippable modules exist.
    CapacityExceeded { need: usize, total: usize },
    /// The framed secondary does not fit the available bit budget.
    PayloadTooLarge { need: usize, max: usize },
    /// Fewer bits than one frame header were presented to the frame parser.
    ShortFrame { bits: usize },
    /// The declared payload length exceeds what the symbol (or the decode
    /// policy) can hold.
    BadLength { declared: usize, max: usize },
    /// CRC-16 of the extracted payload disagrees with the embedded value.
    ChecksumMismatch { expected: u16, got: u16 },
    /// The extracted payload is not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryEncode(e) => write!(f, "primary encoding failed: {e}"),
            Self::ReferenceRegen(e) => write!(f, "reference regeneration failed: {e}"),
            Self::NoCodeFound => write!(f, "no readable QR code found in image"),
            Self::MalformedMatrix => write!(f, "module grid is not a valid QR matrix"),
            Self::MatrixTooSmall => write!(f, "symbol has too few flippable modules"),
            Self::SizeMismatch { scanned, reference } => {
                write!(f, "size mismatch: scanned {scanned}, reference {reference}")
            }
            Self::InsufficientCapacity { bits } => {
                write!(f, "insufficient capacity: {bits} bits available")
            }
            Self::CapacityExceeded { need, total } => {
                write!(f, "capacity exceeded: need {need} positions, have {total}")
            }
            Self::PayloadTooLarge { need, max } => {
                write!(f, "payload too large: needs {need} bits, capacity {max}")
            }
            Self::ShortFrame { bits } => write!(f, "frame too short: {bits} bits"),
            Self::BadLength { declared, max } => {
                write!(f, "bad payload length: declared {declared} bytes, limit {max}")
            }
            Self::ChecksumMismatch { expected, got } => {
                write!(f, "checksum mismatch: expected {expected:#06x}, got {got:#06x}")
            }
            Self::InvalidUtf8 => write!(f, "extracted payload is not valid UTF-8"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PrimaryEncode(e) | Self::ReferenceRegen(e) => Some(e),
            _ => None,
        }
    }
}
