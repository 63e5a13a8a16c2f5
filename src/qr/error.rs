// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! Error types for the QR carrier layer.

use std::fmt;

/// Errors that can occur while producing or scanning a QR symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    /// The QR library rejected the text (too long for version 40, etc.).
    Encode(String),
    /// No QR symbol was detected in the image.
    NoCodeFound,
    /// A symbol was detected but its content could not be decoded.
    Scan(String),
    /// The symbol is not a regular QR code (Micro QR, out-of-range version).
    UnsupportedSymbol,
    /// A caller-supplied module grid is not square or has an impossible side
    /// length (valid sides are 21, 25, …, 177).
    MalformedMatrix,
}

impl fmt::Display for QrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(msg) => write!(f, "QR encoding failed: {msg}"),
            Self::NoCodeFound => write!(f, "no QR code found in image"),
            Self::Scan(msg) => write!(f, "QR scan failed: {msg}"),
            Self::UnsupportedSymbol => write!(f, "not a regular QR symbol (version 1-40)"),
            Self::MalformedMatrix => write!(f, "module grid is not a valid QR matrix"),
        }
    }
}

impl std::error::Error for QrError {}
