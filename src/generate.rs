//! HTML site generation and OG image pre-rendering.
//!
//! Stage 2 of the docsmith build pipeline. Takes the page index from the scan
//! stage and generates the final static site.
//!
//! ## Generated Output
//!
//! ```text
//! dist/
//! ├── index.html                       # Redirect to the default locale
//! ├── docs/
//! │   └── en/
//! │       ├── index.html               # Locale index page
//! │       └── guides/
//! │           └── install/
//! │               └── index.html
//! └── og/
//!     └── docs/
//!         └── en/
//!             ├── image.png            # 1200×630 social preview cards
//!             └── guides/
//!                 └── install/
//!                     └── image.png
//! ```
//!
//! Every docs page links its own card via an `og:image` meta tag. Cards are
//! pre-rendered at build time with [rayon] since each render is independent;
//! all of them share one font resolution (see [`crate::font::resolver`]).
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping. Markdown
//! bodies are converted with pulldown-cmark.

use crate::config::SiteConfig;
use crate::font::{FontError, FontResolver};
use crate::og::{Card, OgError, OgRenderer};
use crate::scan::PageIndex;
use crate::types::{DocPage, OG_IMAGE_FILENAME};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Font resolution failed: {0}")]
    Font(#[from] FontError),
    #[error("OG render failed: {0}")]
    Og(#[from] OgError),
    #[error("No page for OG route /og/docs/{route}")]
    PageNotFound { route: String },
}

const CSS_STATIC: &str = include_str!("../static/style.css");

pub fn generate(index: &PageIndex, content_root: &Path, output_dir: &Path) -> Result<(), GenerateError> {
    let css = format!("{}\n\n{}", color_css(&index.config), CSS_STATIC);

    fs::create_dir_all(output_dir)?;

    // Root redirect to the default locale's docs index
    let redirect = render_redirect(&index.config);
    fs::write(output_dir.join("index.html"), redirect.into_string())?;
    println!("Generated index.html (redirect)");

    for page in &index.pages {
        let page_html = render_page(index, page, &css);
        let page_dir = output_dir.join(page.url().trim_start_matches('/'));
        fs::create_dir_all(&page_dir)?;
        fs::write(page_dir.join("index.html"), page_html.into_string())?;
    }
    println!("Generated {} docs pages", index.pages.len());

    let renderer = build_og_renderer(index, content_root)?;
    prerender_og_images(index, &renderer, output_dir)?;
    println!("Generated {} OG images", index.pages.len());

    println!("Site generated at {}", output_dir.display());
    Ok(())
}

/// Resolve the site font once and construct the card renderer from it.
///
/// Resolution never fails for a bad primary font (the fallback covers that);
/// it only fails when a configured font file is missing outright.
pub fn build_og_renderer(index: &PageIndex, content_root: &Path) -> Result<OgRenderer, GenerateError> {
    let resolver = FontResolver::new(
        index.config.fonts.primary_path(content_root),
        index.config.fonts.fallback_path(content_root),
    );
    let font_bytes = resolver.resolve()?;
    let renderer = OgRenderer::new(&font_bytes, index.config.colors.card_style())?;
    Ok(renderer)
}

/// Pre-render every page's card under `dist/og/docs/…`.
fn prerender_og_images(
    index: &PageIndex,
    renderer: &OgRenderer,
    output_dir: &Path,
) -> Result<(), GenerateError> {
    index
        .og_targets()
        .par_iter()
        .try_for_each(|segments| -> Result<(), GenerateError> {
            let png = og_response(index, renderer, segments)?;
            let mut path = output_dir.join("og").join("docs");
            for segment in segments {
                path.push(segment);
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, png)?;
            Ok(())
        })
}

/// Serve one OG route: `segments` is the route path under `/og/docs/`, i.e.
/// `["en", "guides", "install", "image.png"]`. The trailing image filename
/// is part of the route, not the page slug, so it is stripped before lookup.
/// Unknown routes (and routes without the image filename) are
/// [`GenerateError::PageNotFound`].
pub fn og_response(
    index: &PageIndex,
    renderer: &OgRenderer,
    segments: &[String],
) -> Result<Vec<u8>, GenerateError> {
    let not_found = || GenerateError::PageNotFound {
        route: segments.join("/"),
    };

    let (filename, page_segments) = segments.split_last().ok_or_else(not_found)?;
    if filename != OG_IMAGE_FILENAME {
        return Err(not_found());
    }
    let (locale, slug) = page_segments.split_first().ok_or_else(not_found)?;
    let page = index.get(locale, slug).ok_or_else(not_found)?;

    let card = Card {
        title: page.title.clone(),
        description: page.description.clone(),
        site: Some(index.config.site.name.clone()),
    };
    Ok(renderer.render_png(&card)?)
}

fn color_css(config: &SiteConfig) -> String {
    format!(
        ":root {{\n    --background: {};\n    --accent: {};\n    --text: {};\n}}",
        config.colors.background, config.colors.accent, config.colors.title,
    )
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure with social metadata.
fn base_document(
    lang: &str,
    title: &str,
    description: Option<&str>,
    og_image: Option<&str>,
    css: &str,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(description) = description {
                    meta name="description" content=(description);
                    meta property="og:description" content=(description);
                }
                meta property="og:title" content=(title);
                @if let Some(og_image) = og_image {
                    meta property="og:image" content=(og_image);
                }
                style { (css) }
            }
            body {
                (content)
            }
        }
    }
}

/// Sidebar listing every page of the current locale.
fn sidebar_nav(index: &PageIndex, current: &DocPage) -> Markup {
    html! {
        nav.sidebar {
            a.site-name href=(format!("/docs/{}/", current.locale)) {
                (index.config.site.name)
            }
            ul {
                @for page in index.locale_pages(&current.locale) {
                    li {
                        a.current[page.segments == current.segments] href=(page.url()) {
                            (page.title)
                        }
                    }
                }
            }
        }
    }
}

/// Renders one docs page.
pub fn render_page(index: &PageIndex, page: &DocPage, css: &str) -> Markup {
    let body_html = markdown_to_html(&page.body);
    let title = format!("{} - {}", page.title, index.config.site.name);

    base_document(
        &page.locale,
        &title,
        page.description.as_deref(),
        Some(&page.og_url()),
        css,
        html! {
            div.layout {
                (sidebar_nav(index, page))
                main {
                    h1 { (page.title) }
                    (PreEscaped(body_html))
                    p.source-note { "Source: " (page.source_path) }
                }
            }
        },
    )
}

/// Root `index.html`: a meta-refresh redirect to the default locale.
pub fn render_redirect(config: &SiteConfig) -> Markup {
    let target = format!("/docs/{}/", config.site.default_locale);
    html! {
        (DOCTYPE)
        html lang=(config.site.default_locale) {
            head {
                meta charset="UTF-8";
                meta http-equiv="refresh" content=(format!("0; url={target}"));
                title { (config.site.name) }
            }
            body {
                p { a href=(target) { (config.site.name) } }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::og::CardStyle;

    fn test_index() -> PageIndex {
        let pages = vec![
            DocPage {
                locale: "en".to_string(),
                segments: vec![],
                title: "Welcome".to_string(),
                description: Some("Start here.".to_string()),
                body: "# Welcome\n\nHello **docs**.".to_string(),
                source_path: "en/index.md".to_string(),
            },
            DocPage {
                locale: "en".to_string(),
                segments: vec!["install".to_string()],
                title: "Install <Fast>".to_string(),
                description: None,
                body: "Run the installer.".to_string(),
                source_path: "en/install.md".to_string(),
            },
        ];
        PageIndex {
            locales: vec!["en".to_string()],
            pages,
            config: SiteConfig::default(),
        }
    }

    fn test_renderer() -> OgRenderer {
        OgRenderer::new(font_test_data::VAZIRMATN_VAR, CardStyle::default()).unwrap()
    }

    #[test]
    fn page_carries_og_image_meta() {
        let index = test_index();
        let html = render_page(&index, &index.pages[0], "").into_string();
        assert!(html.contains(r#"property="og:image" content="/og/docs/en/image.png""#));
    }

    #[test]
    fn page_title_is_escaped() {
        let index = test_index();
        let html = render_page(&index, &index.pages[1], "").into_string();
        assert!(html.contains("Install &lt;Fast&gt;"));
        assert!(!html.contains("Install <Fast>"));
    }

    #[test]
    fn markdown_body_rendered() {
        let index = test_index();
        let html = render_page(&index, &index.pages[0], "").into_string();
        assert!(html.contains("<strong>docs</strong>"));
    }

    #[test]
    fn description_meta_only_when_present() {
        let index = test_index();
        let with = render_page(&index, &index.pages[0], "").into_string();
        let without = render_page(&index, &index.pages[1], "").into_string();
        assert!(with.contains(r#"name="description" content="Start here.""#));
        assert!(!without.contains(r#"name="description""#));
    }

    #[test]
    fn sidebar_marks_current_page() {
        let index = test_index();
        let html = render_page(&index, &index.pages[1], "").into_string();
        assert!(html.contains(r#"class="current" href="/docs/en/install/""#));
        assert!(html.contains(r#"href="/docs/en/""#));
    }

    #[test]
    fn redirect_targets_default_locale() {
        let html = render_redirect(&SiteConfig::default()).into_string();
        assert!(html.contains("url=/docs/en/"));
    }

    #[test]
    fn og_response_renders_known_route() {
        let index = test_index();
        let renderer = test_renderer();

        let segments: Vec<String> = ["en", "install", "image.png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let png = og_response(&index, &renderer, &segments).unwrap();
        // PNG magic
        assert_eq!(&png[..4], b"\x89PNG");
    }

    #[test]
    fn og_response_unknown_page_is_not_found() {
        let index = test_index();
        let renderer = test_renderer();

        let segments: Vec<String> = ["en", "missing", "image.png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(matches!(
            og_response(&index, &renderer, &segments),
            Err(GenerateError::PageNotFound { .. })
        ));
    }

    #[test]
    fn og_response_requires_image_filename() {
        let index = test_index();
        let renderer = test_renderer();

        // The route is the page slug plus the image filename; a bare slug
        // (or a different filename) is not a card route.
        let bare: Vec<String> = ["en", "install"].iter().map(|s| s.to_string()).collect();
        assert!(matches!(
            og_response(&index, &renderer, &bare),
            Err(GenerateError::PageNotFound { .. })
        ));

        let wrong: Vec<String> = ["en", "install", "card.png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(matches!(
            og_response(&index, &renderer, &wrong),
            Err(GenerateError::PageNotFound { .. })
        ));
    }

    #[test]
    fn og_response_empty_route_is_not_found() {
        let index = test_index();
        let renderer = test_renderer();
        assert!(matches!(
            og_response(&index, &renderer, &[]),
            Err(GenerateError::PageNotFound { .. })
        ));
    }
}
