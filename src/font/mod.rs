//! Font loading, repair, and validation for OG rendering.
//!
//! The primary (branded) font ships as a variable font whose binary layout
//! the trial renderer sometimes rejects. This module owns the narrow
//! workflow that turns it into something guaranteed renderable:
//!
//! | Piece | Role |
//! |-------|------|
//! | [`resolver`] | The pipeline: read → transform → repair → validate → fall back, memoized per process |
//! | [`transform`] | Optional structural steps (WOFF unpack, variable-font flatten) behind a capability probe |
//! | [`repair`] | The four-byte signature patch for the rejected `00 01 00 0x` version tag |
//! | [`probe`] | Trial-render validation trait; mockable so tests can count renders |
//!
//! The only artifact exposed outward is the resolved byte buffer, which is
//! always byte-valid for the renderer — a validated transformed font or the
//! untouched fallback, never a half-repaired buffer.

pub mod probe;
pub mod repair;
pub mod resolver;
pub mod transform;

pub use probe::{ProbeError, RenderProbe, TrialRender};
pub use repair::repair_signature_if_needed;
pub use resolver::{FontError, FontResolver};
pub use transform::{FontTransform, SfntTransform, TransformError};
