//! CLI output formatting for the pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every page is its semantic identity — locale, slug, title — with
//! filesystem paths shown as secondary context via indented `Source:` lines.
//! This makes the output readable as a content inventory while still letting
//! users trace pages back to specific files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Locale en (3 pages)
//!     /docs/en/ Welcome
//!         Source: en/index.md
//!         Description: Start here.
//!     /docs/en/guides/install/ Install
//!         Source: en/guides/install.md
//! Locale ko (1 page)
//!     /docs/ko/ 시작하기
//!         Source: ko/index.md
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html (redirect to /docs/en/)
//! /docs/en/ → docs/en/index.html
//!     card → og/docs/en/image.png
//!
//! Generated 4 pages, 4 OG images across 2 locales
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::scan::PageIndex;
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

/// Pick the singular or plural form for a count.
fn noun(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format scan stage output showing the discovered page inventory.
pub fn format_scan_output(index: &PageIndex, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for locale in &index.locales {
        let pages: Vec<_> = index.locale_pages(locale).collect();
        lines.push(format!(
            "Locale {} ({} {})",
            locale,
            pages.len(),
            noun(pages.len(), "page", "pages")
        ));

        for page in pages {
            lines.push(format!("{}{} {}", indent(1), page.url(), page.title));
            lines.push(format!("{}Source: {}", indent(2), page.source_path));
            if let Some(desc) = &page.description {
                lines.push(format!(
                    "{}Description: {}",
                    indent(2),
                    truncate_desc(desc.trim(), 60)
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    } else {
        lines.push(format!("{}(defaults, no config.toml)", indent(1)));
    }
    for (label, rel) in [
        ("primary font", &index.config.fonts.primary),
        ("fallback font", &index.config.fonts.fallback),
    ] {
        let marker = if source_root.join(rel).exists() {
            ""
        } else {
            " (missing)"
        };
        lines.push(format!("{}{label}: {rel}{marker}", indent(1)));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(index: &PageIndex, source_root: &Path) {
    for line in format_scan_output(index, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format build stage output showing generated files per page.
pub fn format_build_output(index: &PageIndex) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "Home \u{2192} index.html (redirect to /docs/{}/)",
        index.config.site.default_locale
    ));

    for page in &index.pages {
        let rel = page.url().trim_start_matches('/').to_string();
        lines.push(format!("{} \u{2192} {rel}index.html", page.url()));
        lines.push(format!(
            "{}card \u{2192} og/docs/{}",
            indent(1),
            page.og_segments().join("/")
        ));
    }

    lines.push(String::new());
    let pages = index.pages.len();
    let locales = index.locales.len();
    lines.push(format!(
        "Generated {pages} {}, {pages} OG {} across {locales} {}",
        noun(pages, "page", "pages"),
        noun(pages, "image", "images"),
        noun(locales, "locale", "locales")
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(index: &PageIndex) {
    for line in format_build_output(index) {
        println!("{}", line);
    }
}
