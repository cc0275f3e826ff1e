//! Structural font transformations behind a capability-probe interface.
//!
//! The resolution pipeline wants to apply two optional steps to the primary
//! font before trial-rendering it:
//!
//! 1. **Decompress** — unpack a WOFF container back into a flat sfnt binary
//!    (table payloads are zlib streams).
//! 2. **Flatten** — turn a variable font into its static default instance by
//!    rebuilding the binary without the variation tables. At the default
//!    axis location all gvar deltas are zero, so dropping the variation
//!    machinery leaves the default outlines intact.
//!
//! Neither step is guaranteed to apply to a given font. [`FontTransform`]
//! models that explicitly: each method returns `None` when the capability is
//! not applicable (plain sfnt needs no decompression; a static font has
//! nothing to flatten), and the caller treats `None` as a no-op. Only a
//! `Some(Err(_))` indicates the step applied and failed.

use read_fonts::{FontRef, TableProvider, types::Tag};
use std::io::Read;
use thiserror::Error;
use write_fonts::FontBuilder;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("unsupported container format: {0}")]
    UnsupportedContainer(&'static str),
    #[error("truncated font data")]
    Truncated,
    #[error("failed to parse font: {0}")]
    Parse(String),
    #[error("failed to inflate table data: {0}")]
    Inflate(#[from] std::io::Error),
}

/// Optional structural transformations over raw font bytes.
///
/// Implementations report, per font, whether a capability applies: `None`
/// means "not applicable, skip" and is never an error state.
pub trait FontTransform {
    /// Unpack a compressed container into a flat sfnt binary.
    fn decompress(&self, data: &[u8]) -> Option<Result<Vec<u8>, TransformError>>;

    /// Rebuild a variable font as a static (default-instance) binary.
    fn flatten(&self, data: &[u8]) -> Option<Result<Vec<u8>, TransformError>>;
}

const WOFF_SIGNATURE: [u8; 4] = *b"wOFF";
const WOFF2_SIGNATURE: [u8; 4] = *b"wOF2";

/// Variation tables removed when flattening. Stripping these from a font at
/// its default instance yields a static font the renderer accepts.
const VARIATION_TABLES: [Tag; 8] = [
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"avar"),
    Tag::new(b"cvar"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
    Tag::new(b"STAT"),
];

/// Production transform over sfnt/WOFF binaries using read-fonts and
/// write-fonts for the table-level work.
pub struct SfntTransform;

impl FontTransform for SfntTransform {
    fn decompress(&self, data: &[u8]) -> Option<Result<Vec<u8>, TransformError>> {
        match data.get(..4) {
            Some(sig) if sig == WOFF_SIGNATURE => Some(decompress_woff(data)),
            // WOFF2 table data is Brotli plus transformed tables; this
            // transform cannot unpack it, and saying so lets the pipeline
            // candidate the raw bytes and let validation decide.
            Some(sig) if sig == WOFF2_SIGNATURE => {
                Some(Err(TransformError::UnsupportedContainer("wOF2")))
            }
            _ => None,
        }
    }

    fn flatten(&self, data: &[u8]) -> Option<Result<Vec<u8>, TransformError>> {
        let font = match FontRef::new(data) {
            Ok(font) => font,
            Err(e) => return Some(Err(TransformError::Parse(e.to_string()))),
        };
        if font.fvar().is_err() {
            // Not a variable font: nothing to flatten.
            return None;
        }
        Some(Ok(strip_variation_tables(&font)))
    }
}

/// Copies every non-variation table into a fresh binary.
fn strip_variation_tables(font: &FontRef) -> Vec<u8> {
    let mut builder = FontBuilder::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if !VARIATION_TABLES.contains(&tag)
            && let Some(data) = font.table_data(tag)
        {
            builder.add_raw(tag, data);
        }
    }
    builder.build()
}

const WOFF_HEADER_LEN: usize = 44;
const WOFF_DIR_ENTRY_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_DIR_ENTRY_LEN: usize = 16;

struct WoffTableEntry {
    tag: [u8; 4],
    offset: usize,
    comp_length: usize,
    orig_length: usize,
    orig_checksum: u32,
}

/// Rebuilds a flat sfnt binary from a WOFF container.
///
/// Tables whose compressed length is shorter than their original length are
/// zlib streams; equal lengths mean the table was stored verbatim. The
/// output directory reuses the original table checksums the container
/// recorded, and table data is 4-byte aligned as sfnt requires.
fn decompress_woff(data: &[u8]) -> Result<Vec<u8>, TransformError> {
    if data.len() < WOFF_HEADER_LEN {
        return Err(TransformError::Truncated);
    }

    let flavor = &data[4..8];
    let num_tables = u16::from_be_bytes([data[12], data[13]]);
    // searchRange/rangeShift are u16 in the sfnt header and overflow at
    // 4096 tables; no genuine font comes anywhere near that.
    if num_tables >= 4096 {
        return Err(TransformError::Parse(format!(
            "implausible table count {num_tables}"
        )));
    }
    let dir_end = WOFF_HEADER_LEN + num_tables as usize * WOFF_DIR_ENTRY_LEN;
    if num_tables == 0 || data.len() < dir_end {
        return Err(TransformError::Truncated);
    }

    let read_u32 = |at: usize| u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

    let mut entries = Vec::with_capacity(num_tables as usize);
    for i in 0..num_tables as usize {
        let at = WOFF_HEADER_LEN + i * WOFF_DIR_ENTRY_LEN;
        let entry = WoffTableEntry {
            tag: [data[at], data[at + 1], data[at + 2], data[at + 3]],
            offset: read_u32(at + 4) as usize,
            comp_length: read_u32(at + 8) as usize,
            orig_length: read_u32(at + 12) as usize,
            orig_checksum: read_u32(at + 16),
        };
        if entry.offset + entry.comp_length > data.len() || entry.comp_length > entry.orig_length {
            return Err(TransformError::Truncated);
        }
        entries.push(entry);
    }
    // sfnt directories must be sorted by tag; WOFF containers usually are
    // already, but the format does not force it.
    entries.sort_by_key(|e| e.tag);

    let mut tables = Vec::with_capacity(entries.len());
    for entry in &entries {
        let raw = &data[entry.offset..entry.offset + entry.comp_length];
        let table = if entry.comp_length < entry.orig_length {
            let mut inflated = Vec::with_capacity(entry.orig_length);
            flate2::read::ZlibDecoder::new(raw).read_to_end(&mut inflated)?;
            if inflated.len() != entry.orig_length {
                return Err(TransformError::Truncated);
            }
            inflated
        } else {
            raw.to_vec()
        };
        tables.push(table);
    }

    // Binary-search fields of the sfnt header, per the OpenType spec.
    let entry_selector = 15 - num_tables.leading_zeros() as u16;
    let search_range = (1u16 << entry_selector) * 16;
    let range_shift = num_tables * 16 - search_range;

    let mut out = Vec::with_capacity(
        SFNT_HEADER_LEN
            + entries.len() * SFNT_DIR_ENTRY_LEN
            + tables.iter().map(|t| t.len() + 3).sum::<usize>(),
    );
    out.extend_from_slice(flavor);
    out.extend_from_slice(&num_tables.to_be_bytes());
    out.extend_from_slice(&search_range.to_be_bytes());
    out.extend_from_slice(&entry_selector.to_be_bytes());
    out.extend_from_slice(&range_shift.to_be_bytes());

    let mut table_offset = SFNT_HEADER_LEN + entries.len() * SFNT_DIR_ENTRY_LEN;
    for (entry, table) in entries.iter().zip(&tables) {
        out.extend_from_slice(&entry.tag);
        out.extend_from_slice(&entry.orig_checksum.to_be_bytes());
        out.extend_from_slice(&(table_offset as u32).to_be_bytes());
        out.extend_from_slice(&(table.len() as u32).to_be_bytes());
        table_offset += table.len().next_multiple_of(4);
    }
    for table in &tables {
        out.extend_from_slice(table);
        // Pad to the next 4-byte boundary
        out.resize(out.len().next_multiple_of(4), 0);
    }

    Ok(out)
}
