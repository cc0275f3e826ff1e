//! The font resolution pipeline.
//!
//! Produces the single byte buffer every OG render uses as its font,
//! preferring the branded primary font but tolerating its structural quirks:
//!
//! ```text
//! read primary ──► decompress? ──► flatten? ──► signature repair
//!                      │  (either step inapplicable → no-op,
//!                      │   either step fails → raw bytes)
//!                      ▼
//!                trial render ──ok──► candidate bytes
//!                      │
//!                    fail (logged) ──► fallback font, raw bytes
//! ```
//!
//! Resolution runs once per process. The result — success or the fatal
//! missing-asset error — is memoized in a [`OnceLock`], so concurrent
//! callers arriving before the first resolution completes block on the same
//! computation instead of re-reading and re-validating. There is no
//! invalidation; a new process re-derives from scratch.
//!
//! Only a missing font file is fatal. Every parse, transform, or validation
//! failure is absorbed here and answered with the fallback font, so
//! font-format quirks never take down site generation.

use crate::font::probe::{RenderProbe, TrialRender};
use crate::font::repair::repair_signature_if_needed;
use crate::font::transform::{FontTransform, SfntTransform};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Errors that escape the pipeline. Clone so the memoized result can be
/// handed to every caller.
#[derive(Error, Debug, Clone)]
pub enum FontError {
    #[error("font asset missing: {path}: {source}")]
    AssetMissing {
        path: PathBuf,
        source: Arc<io::Error>,
    },
}

/// Resolves and memoizes the font bytes used for OG rendering.
pub struct FontResolver {
    primary: PathBuf,
    fallback: PathBuf,
    probe: Box<dyn RenderProbe>,
    resolved: OnceLock<Result<Arc<[u8]>, FontError>>,
}

impl FontResolver {
    pub fn new(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self::with_probe(primary, fallback, Box::new(TrialRender))
    }

    /// Injection point for tests: count trial renders, force rejections.
    pub fn with_probe(
        primary: impl Into<PathBuf>,
        fallback: impl Into<PathBuf>,
        probe: Box<dyn RenderProbe>,
    ) -> Self {
        Self {
            primary: primary.into(),
            fallback: fallback.into(),
            probe,
            resolved: OnceLock::new(),
        }
    }

    /// Returns the resolved font bytes, performing the full pipeline on the
    /// first call and the memoized result afterwards.
    ///
    /// # Errors
    ///
    /// [`FontError::AssetMissing`] when the primary font is unreadable, or
    /// when the primary failed validation and the fallback is unreadable
    /// too. Both are fatal: no image can be produced without a font.
    pub fn resolve(&self) -> Result<Arc<[u8]>, FontError> {
        self.resolved.get_or_init(|| self.resolve_uncached()).clone()
    }

    fn resolve_uncached(&self) -> Result<Arc<[u8]>, FontError> {
        let raw = read_font_file(&self.primary)?;

        let mut candidate = transform_candidate(&SfntTransform, &raw);
        repair_signature_if_needed(&mut candidate);

        match self.probe.validate(&candidate) {
            Ok(()) => Ok(candidate.into()),
            Err(e) => {
                warn!(
                    "primary font {} failed trial render, falling back to {}: {e}",
                    self.primary.display(),
                    self.fallback.display()
                );
                // The fallback is returned exactly as stored: it is bundled
                // as a known-good font and must not be touched.
                let fallback = read_font_file(&self.fallback)?;
                Ok(fallback.into())
            }
        }
    }
}

fn read_font_file(path: &Path) -> Result<Vec<u8>, FontError> {
    fs::read(path).map_err(|e| FontError::AssetMissing {
        path: path.to_path_buf(),
        source: Arc::new(e),
    })
}

/// Applies the optional transform steps, falling back to the untouched
/// input bytes when a step applies but fails. A step that does not apply
/// (`None`) is a no-op.
fn transform_candidate(transform: &impl FontTransform, raw: &[u8]) -> Vec<u8> {
    let mut data = raw.to_vec();

    for (name, result) in [
        ("decompress", transform.decompress(&data)),
        ("flatten", transform.flatten(&data)),
    ] {
        match result {
            None => {}
            Some(Ok(out)) => data = out,
            Some(Err(e)) => {
                debug!("font {name} step failed, candidating original bytes: {e}");
                return raw.to_vec();
            }
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::probe::tests::MockProbe;
    use crate::font::transform::TransformError;
    use read_fonts::{FontRef, TableProvider};
    use std::sync::Arc as StdArc;
    use tempfile::TempDir;

    fn write_fonts_to(
        dir: &TempDir,
        primary: &[u8],
        fallback: &[u8],
    ) -> (PathBuf, PathBuf) {
        let primary_path = dir.path().join("Primary.ttf");
        let fallback_path = dir.path().join("Fallback.ttf");
        fs::write(&primary_path, primary).unwrap();
        fs::write(&fallback_path, fallback).unwrap();
        (primary_path, fallback_path)
    }

    #[test]
    fn missing_primary_is_fatal() {
        let dir = TempDir::new().unwrap();
        let resolver = FontResolver::new(
            dir.path().join("nonexistent.ttf"),
            dir.path().join("also-missing.ttf"),
        );
        let result = resolver.resolve();
        assert!(matches!(result, Err(FontError::AssetMissing { .. })));
    }

    #[test]
    fn missing_fallback_is_fatal_only_after_rejection() {
        let dir = TempDir::new().unwrap();
        let primary_path = dir.path().join("Primary.ttf");
        fs::write(&primary_path, b"garbage that cannot render").unwrap();

        let resolver = FontResolver::with_probe(
            &primary_path,
            dir.path().join("missing-fallback.ttf"),
            Box::new(MockProbe::rejecting()),
        );
        let result = resolver.resolve();
        assert!(matches!(result, Err(FontError::AssetMissing { path, .. })
            if path.file_name().unwrap() == "missing-fallback.ttf"));
    }

    #[test]
    fn corrupted_primary_yields_exact_fallback_bytes() {
        let dir = TempDir::new().unwrap();
        let fallback_bytes = b"fallback font payload, returned verbatim".to_vec();
        let (primary, fallback) =
            write_fonts_to(&dir, b"\x00\x01\x00\x00 corrupted beyond repair", &fallback_bytes);

        // Real trial render: the corrupted primary genuinely fails to parse.
        let resolver = FontResolver::new(&primary, &fallback);
        let resolved = resolver.resolve().unwrap();
        assert_eq!(&resolved[..], &fallback_bytes[..]);
    }

    #[test]
    fn valid_variable_primary_resolves_without_fallback() {
        let dir = TempDir::new().unwrap();
        let (primary, fallback) = write_fonts_to(
            &dir,
            font_test_data::VAZIRMATN_VAR,
            b"fallback should not be used",
        );

        let resolver = FontResolver::new(&primary, &fallback);
        let resolved = resolver.resolve().unwrap();

        assert_ne!(&resolved[..], b"fallback should not be used");
        // The flattened candidate lost its variation tables but still parses.
        let font = FontRef::new(&resolved).unwrap();
        assert!(font.fvar().is_err());
        assert!(font.glyf().is_ok());
    }

    #[test]
    fn resolved_bytes_never_carry_rejected_signature() {
        let dir = TempDir::new().unwrap();
        let (primary, fallback) = write_fonts_to(
            &dir,
            font_test_data::VAZIRMATN_VAR,
            font_test_data::VAZIRMATN_VAR,
        );

        let resolver = FontResolver::new(&primary, &fallback);
        let resolved = resolver.resolve().unwrap();

        let rejected = resolved.len() >= 4
            && resolved[0] == 0x00
            && resolved[1] == 0x01
            && resolved[2] == 0x00
            && resolved[3] != 0x00;
        assert!(!rejected);
    }

    #[test]
    fn repaired_signature_reaches_the_probe() {
        let dir = TempDir::new().unwrap();
        // A primary whose leading bytes match the rejected pattern; the
        // probe must see it rewritten to "true".
        let (primary, fallback) =
            write_fonts_to(&dir, &[0x00, 0x01, 0x00, 0x07, 0x12, 0x34], b"fb");

        let probe = StdArc::new(MockProbe::accepting());
        let resolver = FontResolver::with_probe(&primary, &fallback, Box::new(SharedProbe(probe.clone())));
        let resolved = resolver.resolve().unwrap();

        assert_eq!(&resolved[..4], b"true");
        let seen = probe.seen.lock().unwrap();
        assert_eq!(&seen[0][..4], b"true");
    }

    #[test]
    fn resolve_is_idempotent_and_renders_once() {
        let dir = TempDir::new().unwrap();
        let (primary, fallback) = write_fonts_to(&dir, b"anything", b"fb");

        let probe = StdArc::new(MockProbe::accepting());
        let resolver =
            FontResolver::with_probe(&primary, &fallback, Box::new(SharedProbe(probe.clone())));

        let first = resolver.resolve().unwrap();
        let second = resolver.resolve().unwrap();

        assert_eq!(&first[..], &second[..]);
        // Same memoized allocation, not merely equal bytes
        assert!(StdArc::ptr_eq(&first, &second));
        assert_eq!(probe.call_count(), 1);
    }

    #[test]
    fn concurrent_first_calls_share_one_resolution() {
        let dir = TempDir::new().unwrap();
        let (primary, fallback) = write_fonts_to(&dir, b"concurrent candidate", b"fb");

        let probe = StdArc::new(MockProbe::accepting());
        let resolver = StdArc::new(FontResolver::with_probe(
            &primary,
            &fallback,
            Box::new(SharedProbe(probe.clone())),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                std::thread::spawn(move || resolver.resolve().unwrap())
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for pair in results.windows(2) {
            assert_eq!(&pair[0][..], &pair[1][..]);
        }
        assert_eq!(probe.call_count(), 1);
    }

    #[test]
    fn memoized_error_is_stable() {
        let dir = TempDir::new().unwrap();
        let resolver = FontResolver::new(
            dir.path().join("gone.ttf"),
            dir.path().join("also-gone.ttf"),
        );
        assert!(resolver.resolve().is_err());
        assert!(resolver.resolve().is_err());
    }

    #[test]
    fn transform_failure_candidates_raw_bytes() {
        struct FailingTransform;
        impl FontTransform for FailingTransform {
            fn decompress(&self, _: &[u8]) -> Option<Result<Vec<u8>, TransformError>> {
                Some(Err(TransformError::UnsupportedContainer("wOF2")))
            }
            fn flatten(&self, _: &[u8]) -> Option<Result<Vec<u8>, TransformError>> {
                None
            }
        }

        let raw = b"original woff2 bytes".to_vec();
        let candidate = transform_candidate(&FailingTransform, &raw);
        assert_eq!(candidate, raw);
    }

    #[test]
    fn inapplicable_transforms_are_noops() {
        struct InertTransform;
        impl FontTransform for InertTransform {
            fn decompress(&self, _: &[u8]) -> Option<Result<Vec<u8>, TransformError>> {
                None
            }
            fn flatten(&self, _: &[u8]) -> Option<Result<Vec<u8>, TransformError>> {
                None
            }
        }

        let raw = b"plain static font".to_vec();
        assert_eq!(transform_candidate(&InertTransform, &raw), raw);
    }

    #[test]
    fn applicable_transforms_chain() {
        struct Chain;
        impl FontTransform for Chain {
            fn decompress(&self, data: &[u8]) -> Option<Result<Vec<u8>, TransformError>> {
                let mut out = data.to_vec();
                out.push(b'd');
                Some(Ok(out))
            }
            fn flatten(&self, data: &[u8]) -> Option<Result<Vec<u8>, TransformError>> {
                let mut out = data.to_vec();
                out.push(b'f');
                Some(Ok(out))
            }
        }

        assert_eq!(transform_candidate(&Chain, b"x"), b"xdf".to_vec());
    }

    /// Adapter so tests can keep a handle on a probe that the resolver owns.
    struct SharedProbe(StdArc<MockProbe>);
    impl RenderProbe for SharedProbe {
        fn validate(&self, font_bytes: &[u8]) -> Result<(), crate::font::probe::ProbeError> {
            self.0.validate(font_bytes)
        }
    }
}
