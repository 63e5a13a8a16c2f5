// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! Thin wrappers around the external QR machinery.
//!
//! The codec treats QR encoding and scanning as black-box capabilities:
//! [`encode_text`] turns a primary string into a clean module matrix via the
//! `qrcode` crate, and [`scan_image`] locates and reads a symbol in a photo
//! via `rqrr`. All Reed–Solomon, segmentation, and mask-selection logic
//! stays inside those crates.
//!
//! `rqrr` reports the symbol corners but not its sampled module grid, so
//! [`scan_image`] re-samples the modules itself: the three corners adjacent
//! to the finder patterns span an affine frame, each module's grayscale
//! center is looked up in the luma image and thresholded at 128. This
//! tolerates rotation and shear; perspective distortion is handled only as
//! far as the error-correction slack allows.

use image::{DynamicImage, GrayImage};
use qrcode::{Color, QrCode, Version};
use rqrr::PreparedImage;

use super::error::QrError;
use super::matrix::{EcLevel, Matrix};

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// Result of scanning an image: the decoded primary text and the sampled
/// module matrix of the detected symbol.
pub struct Scan {
    /// Text the symbol decodes to for any conforming reader.
    pub primary: String,
    /// Sampled module grid, including any flipped modules the
    /// error-correction machinery silently repaired.
    pub matrix: Matrix,
}

/// Encode text into a clean QR matrix at the requested EC level.
///
/// The `qrcode` crate picks the smallest fitting version and the mask with
/// the best penalty score; both choices are deterministic, so encoding the
/// same text twice yields byte-identical matrices — the property the
/// decoder's reference regeneration relies on.
///
/// # Errors
/// - [`QrError::Encode`] if the text does not fit any QR version.
pub fn encode_text(text: &str, ec_level: EcLevel) -> Result<Matrix, QrError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), ec_level.into())
        .map_err(|e| QrError::Encode(e.to_string()))?;

    let version = match code.version() {
        Version::Normal(v) => v as u8,
        Version::Micro(_) => return Err(QrError::UnsupportedSymbol),
    };
    let size = code.width();
    debug_assert_eq!(size, 17 + 4 * version as usize);

    let modules: Vec<bool> = code.to_colors().iter().map(|&c| c == Color::Dark).collect();
    Ok(Matrix::from_flat(version, ec_level, None, modules))
}

/// Locate and read the first QR symbol in an image.
///
/// # Errors
/// - [`QrError::NoCodeFound`] if no symbol is detected.
/// - [`QrError::Scan`] if a symbol is detected but cannot be decoded.
/// - [`QrError::UnsupportedSymbol`] for out-of-range versions.
pub fn scan_image(img: &DynamicImage) -> Result<Scan, QrError> {
    let luma = img.to_luma8();

    let mut prepared = PreparedImage::prepare(luma.clone());
    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return Err(QrError::NoCodeFound);
    }

    let grid = &grids[0];
    let (meta, primary) = grid
        .decode()
        .map_err(|e| QrError::Scan(format!("{e:?}")))?;

    let version = meta.version.0 as u8;
    if !(1..=40).contains(&version) {
        return Err(QrError::UnsupportedSymbol);
    }

    // Corners are reported in symbol order (top-left, top-right,
    // bottom-right, bottom-left) regardless of image orientation.
    let corners = [grid.bounds[0], grid.bounds[1], grid.bounds[3]];
    let matrix = sample_modules(&luma, corners, version, meta.mask as u8);

    Ok(Scan { primary, matrix })
}

/// Sample a module matrix from the luma image given the top-left, top-right
/// and bottom-left symbol corners.
///
/// The decoder path assumes level H throughout; the scanned symbol's actual
/// format bits are not consulted.
fn sample_modules(
    luma: &GrayImage,
    [tl, tr, bl]: [rqrr::Point; 3],
    version: u8,
    mask: u8,
) -> Matrix {
    let size = 17 + 4 * version as usize;
    let s = size as f64;
    let (tlx, tly) = (tl.x as f64, tl.y as f64);
    let (trx, try_) = (tr.x as f64, tr.y as f64);
    let (blx, bly) = (bl.x as f64, bl.y as f64);

    let mut modules = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let fx = (x as f64 + 0.5) / s;
            let fy = (y as f64 + 0.5) / s;
            let px = tlx + fx * (trx - tlx) + fy * (blx - tlx);
            let py = tly + fx * (try_ - tly) + fy * (bly - tly);
            modules.push(sample_dark(luma, px, py));
        }
    }
    Matrix::from_flat(version, EcLevel::H, Some(mask), modules)
}

/// Threshold the grayscale value nearest to `(px, py)`. Dark < 128.
fn sample_dark(luma: &GrayImage, px: f64, py: f64) -> bool {
    let x = px.round().clamp(0.0, (luma.width() - 1) as f64) as u32;
    let y = py.round().clamp(0.0, (luma.height() - 1) as f64) as u32;
    luma.get_pixel(x, y).0[0] < 128
}
