//! Filesystem scanning and page index generation.
//!
//! Stage 1 of the docsmith build pipeline. Walks the content tree to discover
//! documentation pages, producing a structured index that subsequent stages
//! consume.
//!
//! ## Directory Structure
//!
//! docsmith expects a specific content layout:
//!
//! ```text
//! content/                         # Content root
//! ├── config.toml                  # Site configuration (optional)
//! ├── assets/fonts/                # Primary + fallback fonts
//! ├── en/                          # One directory per locale
//! │   ├── index.md                 # → /docs/en/
//! │   ├── getting-started.md       # → /docs/en/getting-started/
//! │   └── guides/
//! │       ├── index.md             # → /docs/en/guides/
//! │       └── install.md           # → /docs/en/guides/install/
//! └── ko/
//!     └── index.md                 # → /docs/ko/
//! ```
//!
//! ## Frontmatter
//!
//! Pages may open with a TOML frontmatter block fenced by `+++`:
//!
//! ```text
//! +++
//! title = "Install"
//! description = "Get up and running in five minutes."
//! +++
//! ```
//!
//! Both keys are optional. The title falls back to the first `# heading`,
//! then to a humanized filename. The description, when present, becomes the
//! page's meta description and the second text block on its OG card.
//!
//! ## Validation
//!
//! The scanner enforces these rules:
//! - At least one locale directory must exist
//! - No two files may map to the same slug (`guides.md` vs `guides/index.md`)
//! - Frontmatter, when present, must be valid TOML

use crate::config::{self, SiteConfig};
use crate::types::DocPage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid frontmatter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Two source files map to /docs/{locale}/{slug}")]
    DuplicateSlug { locale: String, slug: String },
    #[error("No locale directories found under content root")]
    NoLocales,
}

/// Index output from the scan stage.
#[derive(Debug, Serialize)]
pub struct PageIndex {
    /// Locale directory names, sorted
    pub locales: Vec<String>,
    /// All pages, sorted by (locale, segments)
    pub pages: Vec<DocPage>,
    pub config: SiteConfig,
}

impl PageIndex {
    /// Look up a page by locale and slug segments.
    pub fn get(&self, locale: &str, segments: &[String]) -> Option<&DocPage> {
        self.pages
            .iter()
            .find(|p| p.locale == locale && p.segments == segments)
    }

    /// Pages of one locale, in index order (sorted by segments).
    pub fn locale_pages(&self, locale: &str) -> impl Iterator<Item = &DocPage> {
        self.pages.iter().filter(move |p| p.locale == locale)
    }

    /// OG route segments of every page: one entry per page, each ending in
    /// the image filename. These are the routes pre-rendered at build time.
    pub fn og_targets(&self) -> Vec<Vec<String>> {
        self.pages.iter().map(|p| p.og_segments()).collect()
    }
}

/// Frontmatter keys recognized between the `+++` fences.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrontMatter {
    title: Option<String>,
    description: Option<String>,
}

/// Names in the content root that are not locale directories.
const NON_LOCALE_DIRS: &[&str] = &["assets", "dist"];

pub fn scan(root: &Path) -> Result<PageIndex, ScanError> {
    let config = config::load_config(root)?;

    let locales = collect_locales(root)?;
    if locales.is_empty() {
        return Err(ScanError::NoLocales);
    }

    let mut pages = Vec::new();
    let mut seen: HashSet<(String, Vec<String>)> = HashSet::new();

    for locale in &locales {
        let locale_dir = root.join(locale);
        for entry in WalkDir::new(&locale_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file()
                || !path
                    .extension()
                    .map(|e| e.eq_ignore_ascii_case("md"))
                    .unwrap_or(false)
            {
                continue;
            }

            let page = parse_page(root, &locale_dir, locale, path)?;
            let key = (page.locale.clone(), page.segments.clone());
            if !seen.insert(key) {
                return Err(ScanError::DuplicateSlug {
                    locale: page.locale,
                    slug: page.segments.join("/"),
                });
            }
            pages.push(page);
        }
    }

    pages.sort_by(|a, b| (&a.locale, &a.segments).cmp(&(&b.locale, &b.segments)));

    Ok(PageIndex {
        locales,
        pages,
        config,
    })
}

/// Locale directories are every top-level directory that isn't hidden or a
/// reserved name. Sorted so the index is stable across filesystems.
fn collect_locales(root: &Path) -> Result<Vec<String>, ScanError> {
    let mut locales = BTreeSet::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || NON_LOCALE_DIRS.contains(&name.as_str()) {
            continue;
        }
        locales.insert(name);
    }
    Ok(locales.into_iter().collect())
}

fn parse_page(
    root: &Path,
    locale_dir: &Path,
    locale: &str,
    path: &Path,
) -> Result<DocPage, ScanError> {
    let content = fs::read_to_string(path)?;
    let (front, body) = split_frontmatter(&content, path)?;

    let segments = slug_segments(locale_dir, path);

    let title = front
        .title
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| humanize(segments.last().map(String::as_str).unwrap_or(locale)));

    let source_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    Ok(DocPage {
        locale: locale.to_string(),
        segments,
        title,
        description: front.description,
        body: body.to_string(),
        source_path,
    })
}

/// Slug segments relative to the locale directory. `index.md` maps to its
/// parent directory, so `guides/index.md` and `guides.md` share a slug.
fn slug_segments(locale_dir: &Path, path: &Path) -> Vec<String> {
    let rel = path.strip_prefix(locale_dir).unwrap_or(path);
    let mut segments: Vec<String> = rel
        .iter()
        .map(|c| c.to_string_lossy().to_string())
        .collect();

    if let Some(last) = segments.last_mut() {
        if last == "index.md" {
            segments.pop();
        } else if let Some(stem) = last.strip_suffix(".md") {
            *last = stem.to_string();
        }
    }
    segments
}

/// Split an optional `+++`-fenced TOML frontmatter block off the body.
fn split_frontmatter<'a>(content: &'a str, path: &Path) -> Result<(FrontMatter, &'a str), ScanError> {
    let Some(rest) = content.strip_prefix("+++") else {
        return Ok((FrontMatter::default(), content));
    };
    let Some((raw, body)) = rest.split_once("\n+++") else {
        // Opening fence with no closing fence: treat the file as plain body
        return Ok((FrontMatter::default(), content));
    };

    let front: FrontMatter = toml::from_str(raw).map_err(|source| ScanError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((front, body.trim_start_matches('\n')))
}

fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
}

/// "getting-started" → "Getting started"
fn humanize(slug: &str) -> String {
    let spaced = slug.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}
