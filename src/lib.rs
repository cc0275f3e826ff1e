//! # docsmith
//!
//! A static documentation site generator with built-in social preview cards.
//! Your filesystem is the data source: top-level directories are locales,
//! markdown files become pages, and every page gets a pre-rendered 1200×630
//! Open Graph card.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! docsmith processes content through two independent stages; the first
//! produces a JSON index the second consumes:
//!
//! ```text
//! 1. Scan      content/  →  index.json       (filesystem → structured data)
//! 2. Generate  index     →  dist/            (HTML pages + OG card PNGs)
//! ```
//!
//! This separation exists for two reasons:
//!
//! - **Debuggability**: the index is human-readable JSON you can inspect.
//! - **Testability**: generation is a pure function of the index, so unit
//!   tests can exercise templates and card routes without walking a
//!   filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1 — walks the content directory, parses frontmatter, produces the page index |
//! | [`generate`] | Stage 2 — renders HTML with Maud and pre-renders OG cards from the index |
//! | [`font`] | Card font resolution: unpack, flatten, repair, trial-render, fall back |
//! | [`og`] | 1200×630 card composition: gradient, wrapped text blocks, PNG encoding |
//! | [`config`] | `config.toml` loading and validation (site meta, card colors, font paths) |
//! | [`types`] | Shared types serialized between stages (`DocPage`) |
//! | [`output`] | CLI output formatting — information-first display of pipeline results |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system, rather than Handlebars or Tera. Advantages:
//!
//! - **Compile-time checking**: malformed HTML is a build error, not a runtime surprise.
//! - **Type-safe**: template variables are Rust expressions — no stringly-typed lookups.
//! - **XSS-safe by default**: all interpolation is auto-escaped.
//! - **Zero runtime files**: no template directory to ship or get out of sync.
//!
//! ## Pure-Rust Card Rendering (No Headless Browser)
//!
//! OG cards are composited with `fontdue` rasterization and the `image`
//! crate's PNG encoder — both pure Rust. The obvious alternative, rendering
//! an HTML template in a headless browser, adds a hundred-megabyte system
//! dependency for a layout consisting of three text blocks on a gradient.
//! The binary stays fully self-contained: download it and it works.
//!
//! ## Build-Time Card Pre-Rendering
//!
//! Cards are rendered during `build` rather than on demand. The set of card
//! routes is exactly the set of pages, so there is nothing dynamic to serve;
//! the output directory can be dropped on any static file host. Renders are
//! independent of each other and run on the rayon thread pool, all sharing
//! one font resolution.
//!
//! ## Self-Healing Font Resolution
//!
//! Branded fonts arrive as whatever the design team exports: variable fonts,
//! WOFF containers, occasionally binaries with a version tag the rasterizer
//! rejects. Rather than failing the build, [`font`] normalizes the primary
//! font step by step and proves the result usable with a trial render; only
//! if that fails does it substitute the configured fallback font. A build
//! never dies over a bad font file, and never ships an unrenderable one.

pub mod config;
pub mod font;
pub mod generate;
pub mod og;
pub mod output;
pub mod scan;
pub mod types;
