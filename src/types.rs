//! Shared types used across pipeline stages.
//!
//! These types are serialized to JSON between stages (scan → generate) and
//! must be identical across both modules.

use serde::{Deserialize, Serialize};

/// Filename appended to every OG route; requests carry it, lookups drop it.
pub const OG_IMAGE_FILENAME: &str = "image.png";

/// A documentation page discovered under `content/<locale>/`.
///
/// The slug is the file's path relative to its locale directory, minus the
/// `.md` extension; an `index.md` maps to its parent directory's slug, so
/// `en/guides/index.md` and `en/guides.md` would collide (and scanning
/// rejects that).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocPage {
    /// Locale directory the page lives under (`en`, `ko`, …)
    pub locale: String,
    /// Slug path segments; empty for the locale's docs index page
    pub segments: Vec<String>,
    /// Title from frontmatter, first `# heading`, or humanized filename
    pub title: String,
    /// Optional description from frontmatter; drives the OG card's second
    /// text block and the page's meta description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Markdown body with frontmatter stripped
    pub body: String,
    /// Source path relative to the content root, for display
    pub source_path: String,
}

impl DocPage {
    /// URL of the rendered docs page, e.g. `/docs/en/guides/install/`.
    pub fn url(&self) -> String {
        let mut url = format!("/docs/{}/", self.locale);
        for segment in &self.segments {
            url.push_str(segment);
            url.push('/');
        }
        url
    }

    /// Route segments of this page's OG image, locale first and the
    /// implicit image filename last: `["en", "guides", "image.png"]`.
    pub fn og_segments(&self) -> Vec<String> {
        let mut segments = Vec::with_capacity(self.segments.len() + 2);
        segments.push(self.locale.clone());
        segments.extend(self.segments.iter().cloned());
        segments.push(OG_IMAGE_FILENAME.to_string());
        segments
    }

    /// Site-relative URL of this page's OG image.
    pub fn og_url(&self) -> String {
        format!("/og/docs/{}", self.og_segments().join("/"))
    }
}
