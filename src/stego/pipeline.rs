// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! Encode / decode pipelines.
//!
//! Encoding embeds a secondary message into the primary's QR symbol:
//! 1. Ask the engine for the clean base symbol.
//! 2. Enumerate flippable positions and derive the bit budget.
//! 3. Frame the secondary (length ‖ payload ‖ CRC-16).
//! 4. Scatter the frame with the prime-step distribution and toggle one
//!    module per '1' bit on a clone of the base.
//!
//! Decoding runs the same derivation backwards: regenerate the reference
//! symbol from the (known or freshly scanned) primary, diff it against the
//! scanned matrix over the canonical positions, read the length field from
//! the first 16 distribution slots, then collect and parse the full frame.
//!
//! Matrix mode takes the primary from the caller; image mode takes it from
//! the scan itself — any conforming reader recovers the primary because the
//! flips stay inside the error-correction slack.

use std::time::{SystemTime, UNIX_EPOCH};

use image::DynamicImage;

use crate::qr::engine;
use crate::qr::matrix::{EcLevel, Matrix};
use crate::qr::structure::{flippable_positions, is_function};
use crate::stego::capacity::{byte_capacity, max_bits, DEFAULT_SAFETY_MARGIN};
use crate::stego::distribute::distribution;
use crate::stego::error::StegoError;
use crate::stego::frame::{self, FRAME_OVERHEAD_BITS};

/// Version tag attached to emitted metadata.
pub const METADATA_FORMAT_VERSION: &str = "1.0";

/// Encoding options.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Error-correction level of the base symbol. The capacity model is
    /// calibrated for `H`; lower levels shrink the real slack without the
    /// model knowing.
    pub ec_level: EcLevel,
    /// Fraction of flippable modules the encoder may toggle, in `(0, 1]`.
    pub safety_margin: f64,
    /// Attach [`StegoMetadata`] to the result.
    pub include_metadata: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::H,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            include_metadata: true,
        }
    }
}

/// Decoding options.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Propagate [`StegoError::ChecksumMismatch`]. When off, a failed CRC
    /// yields an empty secondary instead of an error.
    pub strict_checksum: bool,
    /// Upper bound on the declared payload length, in bytes. Guards the
    /// progressive read against garbage length fields from noisy scans.
    pub max_message_size: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { strict_checksum: true, max_message_size: 100 }
    }
}

/// Emit-only observability data; never persisted, never read back.
#[derive(Debug, Clone, PartialEq)]
pub struct StegoMetadata {
    /// Metadata format tag, currently `"1.0"`.
    pub format_version: &'static str,
    /// Unix timestamp (seconds) of the operation.
    pub created_at: u64,
    /// Modules that were actually toggled (encode) or observed flipped
    /// (decode).
    pub flipped_count: usize,
    /// Flips the encoder refused because the target re-classified as a
    /// function module. Nonzero values indicate an analyzer bug.
    pub skipped_function_flips: usize,
    /// EC level of the base/reference symbol.
    pub ec_level_used: EcLevel,
    /// Flipped modules as a percentage of the full symbol area.
    pub capacity_used_pct: f64,
}

impl StegoMetadata {
    fn new(flipped_count: usize, skipped: usize, ec_level_used: EcLevel, size: usize) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            format_version: METADATA_FORMAT_VERSION,
            created_at,
            flipped_count,
            skipped_function_flips: skipped,
            ec_level_used,
            capacity_used_pct: 100.0 * flipped_count as f64 / (size * size) as f64,
        }
    }
}

/// Result of an encode: the stego matrix and optional metadata.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub matrix: Matrix,
    pub metadata: Option<StegoMetadata>,
}

/// Result of a decode: both payloads and the observed metadata.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub primary: String,
    pub secondary: String,
    pub metadata: StegoMetadata,
}

/// Embed `secondary` into the QR symbol of `primary` with default options
/// (level H, 7% safety margin).
pub fn encode(primary: &str, secondary: &str) -> Result<Encoded, StegoError> {
    encode_with_options(primary, secondary, &EncodeOptions::default())
}

/// Embed `secondary` into the QR symbol of `primary`.
///
/// # Errors
/// - [`StegoError::PrimaryEncode`] if the engine rejects the primary.
/// - [`StegoError::MatrixTooSmall`] if no module is flippable.
/// - [`StegoError::InsufficientCapacity`] if the bit budget cannot hold
///   even an empty frame.
/// - [`StegoError::PayloadTooLarge`] if the secondary exceeds the budget.
pub fn encode_with_options(
    primary: &str,
    secondary: &str,
    opts: &EncodeOptions,
) -> Result<Encoded, StegoError> {
    // 1. Clean base symbol from the engine.
    let base = engine::encode_text(primary, opts.ec_level).map_err(StegoError::PrimaryEncode)?;

    // 2. Canonical flippable positions.
    let flippable = flippable_positions(&base);
    if flippable.is_empty() {
        return Err(StegoError::MatrixTooSmall);
    }

    // 3. Bit budget. Anything at or below the frame overhead holds nothing.
    let budget = max_bits(flippable.len(), opts.safety_margin);
    if budget <= FRAME_OVERHEAD_BITS {
        return Err(StegoError::InsufficientCapacity { bits: budget });
    }

    // 4. Empty secondary: the clean symbol is the result, no flips.
    if secondary.is_empty() {
        let metadata = opts
            .include_metadata
            .then(|| StegoMetadata::new(0, 0, opts.ec_level, base.size()));
        return Ok(Encoded { matrix: base, metadata });
    }

    // 5. Frame the secondary within the budget.
    let bits = frame::encode_frame(secondary, budget)?;

    // 6. Scatter: logical bit -> flippable index.
    let indices = distribution(bits.len(), flippable.len())?;

    // 7. Toggle one module per '1' bit on a clone of the base. The
    //    eligibility re-check is observability only: a hit means the
    //    analyzer and the enumeration disagree, and the flip is skipped
    //    rather than corrupting a function pattern.
    let mut out = base.clone();
    let mut flipped = 0usize;
    let mut skipped = 0usize;
    for (i, &bit) in bits.iter().enumerate() {
        if bit == 0 {
            continue;
        }
        let (x, y) = flippable[indices[i]];
        if is_function(x, y, out.size(), out.version()) {
            skipped += 1;
            continue;
        }
        out.toggle(x, y);
        flipped += 1;
    }

    let metadata = opts
        .include_metadata
        .then(|| StegoMetadata::new(flipped, skipped, opts.ec_level, out.size()));
    Ok(Encoded { matrix: out, metadata })
}

/// Recover the secondary from a scanned module grid, given the primary.
/// Default options (strict checksum, 100-byte length bound).
pub fn decode_matrix(modules: &[Vec<bool>], primary: &str) -> Result<Decoded, StegoError> {
    decode_matrix_with_options(modules, primary, &DecodeOptions::default())
}

/// Recover the secondary from a scanned module grid, given the primary.
pub fn decode_matrix_with_options(
    modules: &[Vec<bool>],
    primary: &str,
    opts: &DecodeOptions,
) -> Result<Decoded, StegoError> {
    let scanned =
        Matrix::from_modules(modules, EcLevel::H).map_err(|_| StegoError::MalformedMatrix)?;
    decode_from_matrix(&scanned, primary, opts)
}

/// Recover the secondary from a scanned [`Matrix`], given the primary.
///
/// # Errors
/// - [`StegoError::ReferenceRegen`] if the engine rejects the primary.
/// - [`StegoError::SizeMismatch`] if scanned and reference sizes differ.
/// - [`StegoError::BadLength`] if the recovered length field is impossible
///   or exceeds `max_message_size`.
/// - [`StegoError::ChecksumMismatch`] on CRC failure with
///   `strict_checksum` on.
pub fn decode_from_matrix(
    scanned: &Matrix,
    primary: &str,
    opts: &DecodeOptions,
) -> Result<Decoded, StegoError> {
    // 1. Reference symbol. The decoder always assumes level H.
    let reference =
        engine::encode_text(primary, EcLevel::H).map_err(StegoError::ReferenceRegen)?;

    // 2. Geometry must agree before any position math.
    if scanned.size() != reference.size() {
        return Err(StegoError::SizeMismatch {
            scanned: scanned.size(),
            reference: reference.size(),
        });
    }

    // 3-4. Diff over the canonical positions.
    let flippable = flippable_positions(&reference);
    let total = flippable.len();
    if total < FRAME_OVERHEAD_BITS {
        return Err(StegoError::MatrixTooSmall);
    }
    let mut flipped = vec![false; total];
    let mut flip_count = 0usize;
    for (i, &(x, y)) in flippable.iter().enumerate() {
        if scanned.get(x, y) != reference.get(x, y) {
            flipped[i] = true;
            flip_count += 1;
        }
    }

    // 5. A clean symbol carries nothing.
    if flip_count == 0 {
        return Ok(Decoded {
            primary: primary.to_owned(),
            secondary: String::new(),
            metadata: StegoMetadata::new(0, 0, EcLevel::H, reference.size()),
        });
    }

    // 6. Progressive read: the first 16 distribution slots hold the length
    //    field; only then is the full frame extent known.
    let head = distribution(16, total)?;
    let declared = head.iter().fold(0usize, |acc, &i| (acc << 1) | flipped[i] as usize);
    let frame_bits = FRAME_OVERHEAD_BITS + 8 * declared;
    if frame_bits > total || declared > opts.max_message_size {
        return Err(StegoError::BadLength {
            declared,
            max: opts.max_message_size.min((total - FRAME_OVERHEAD_BITS) / 8),
        });
    }

    let indices = distribution(frame_bits, total)?;
    let bits: Vec<u8> = indices.iter().map(|&i| flipped[i] as u8).collect();

    // 7. Parse and validate. In lax mode a bad checksum reads as "nothing
    //    embedded" instead of an error.
    let secondary = match frame::decode_frame(&bits) {
        Ok(text) => text,
        Err(StegoError::ChecksumMismatch { .. }) if !opts.strict_checksum => String::new(),
        Err(e) => return Err(e),
    };

    Ok(Decoded {
        primary: primary.to_owned(),
        secondary,
        metadata: StegoMetadata::new(flip_count, 0, EcLevel::H, reference.size()),
    })
}

/// Scan an image, then recover both payloads. Default options.
pub fn decode_image(img: &DynamicImage) -> Result<Decoded, StegoError> {
    decode_image_with_options(img, &DecodeOptions::default())
}

/// Scan an image, then recover both payloads.
///
/// The primary is taken from the scan; the reference symbol is regenerated
/// from it at level H. Any engine-side failure to locate or read a symbol
/// reports as [`StegoError::NoCodeFound`].
pub fn decode_image_with_options(
    img: &DynamicImage,
    opts: &DecodeOptions,
) -> Result<Decoded, StegoError> {
    let scan = engine::scan_image(img).map_err(|_| StegoError::NoCodeFound)?;
    decode_from_matrix(&scan.matrix, &scan.primary, opts)
}

/// Secondary byte capacity of the symbol `primary` encodes to, at the
/// default safety margin.
pub fn capacity(primary: &str) -> Result<usize, StegoError> {
    capacity_with_margin(primary, DEFAULT_SAFETY_MARGIN)
}

/// Secondary byte capacity at an explicit safety margin.
pub fn capacity_with_margin(primary: &str, safety_margin: f64) -> Result<usize, StegoError> {
    let base = engine::encode_text(primary, EcLevel::H).map_err(StegoError::PrimaryEncode)?;
    let flippable = flippable_positions(&base);
    Ok(byte_capacity(max_bits(flippable.len(), safety_margin)))
}

/// Whether `secondary` fits the symbol of `primary` at the default margin.
///
/// Agrees exactly with the encoder: a `true` here guarantees
/// [`encode`] will not report [`StegoError::PayloadTooLarge`].
pub fn validate_capacity(primary: &str, secondary: &str) -> Result<bool, StegoError> {
    validate_capacity_with_margin(primary, secondary, DEFAULT_SAFETY_MARGIN)
}

/// Whether `secondary` fits the symbol of `primary` at an explicit margin.
pub fn validate_capacity_with_margin(
    primary: &str,
    secondary: &str,
    safety_margin: f64,
) -> Result<bool, StegoError> {
    Ok(secondary.len() <= capacity_with_margin(primary, safety_margin)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let enc = EncodeOptions::default();
        assert_eq!(enc.ec_level, EcLevel::H);
        assert!((enc.safety_margin - 0.07).abs() < 1e-12);
        assert!(enc.include_metadata);

        let dec = DecodeOptions::default();
        assert!(dec.strict_checksum);
        assert_eq!(dec.max_message_size, 100);
    }

    #[test]
    fn metadata_percentage() {
        let meta = StegoMetadata::new(33, 0, EcLevel::H, 33);
        assert_eq!(meta.format_version, "1.0");
        assert_eq!(meta.flipped_count, 33);
        // 33 flips in a 33×33 symbol ≈ 3.03%.
        assert!((meta.capacity_used_pct - 100.0 * 33.0 / 1089.0).abs() < 1e-9);
    }

    #[test]
    fn capacity_checks_match_encoder() {
        // Version 1 symbol: header fits, payload does not.
        assert_eq!(capacity("test").unwrap(), 0);
        assert!(!validate_capacity("test", "x").unwrap());
        assert!(validate_capacity("test", "").unwrap());
        assert!(matches!(
            encode("test", "x"),
            Err(StegoError::PayloadTooLarge { .. })
        ));
    }
}
