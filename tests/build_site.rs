//! End-to-end build: content tree in, static site out.

use docsmith::{generate, scan};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_content_tree(root: &Path, primary_font: &[u8]) {
    fs::create_dir_all(root.join("assets/fonts")).unwrap();
    fs::create_dir_all(root.join("en/guides")).unwrap();
    fs::create_dir_all(root.join("ko")).unwrap();

    fs::write(
        root.join("config.toml"),
        r#"
[site]
name = "Erdia Docs"

[fonts]
primary = "assets/fonts/primary.ttf"
fallback = "assets/fonts/fallback.ttf"
"#,
    )
    .unwrap();

    fs::write(root.join("assets/fonts/primary.ttf"), primary_font).unwrap();
    fs::write(
        root.join("assets/fonts/fallback.ttf"),
        font_test_data::VAZIRMATN_VAR,
    )
    .unwrap();

    fs::write(
        root.join("en/index.md"),
        "+++\ntitle = \"Welcome\"\ndescription = \"Start here.\"\n+++\n\nIntro.",
    )
    .unwrap();
    fs::write(
        root.join("en/guides/install.md"),
        "# Install\n\nRun the installer.",
    )
    .unwrap();
    fs::write(root.join("ko/index.md"), "# 시작하기\n\n본문.").unwrap();
}

fn build(content: &Path, dist: &Path) {
    let index = scan::scan(content).unwrap();
    generate::generate(&index, content, dist).unwrap();
}

#[test]
fn full_build_produces_pages_and_cards() {
    let content = TempDir::new().unwrap();
    let dist = TempDir::new().unwrap();
    write_content_tree(content.path(), font_test_data::VAZIRMATN_VAR);

    build(content.path(), dist.path());

    // Root redirect
    let root = fs::read_to_string(dist.path().join("index.html")).unwrap();
    assert!(root.contains("url=/docs/en/"));

    // Docs pages in place, wired to their cards
    let install = fs::read_to_string(dist.path().join("docs/en/guides/install/index.html")).unwrap();
    assert!(install.contains("Run the installer."));
    assert!(install.contains("/og/docs/en/guides/install/image.png"));
    assert!(dist.path().join("docs/ko/index.html").exists());

    // Every page has a decodable 1200×630 card
    for rel in [
        "og/docs/en/image.png",
        "og/docs/en/guides/install/image.png",
        "og/docs/ko/image.png",
    ] {
        let png = fs::read(dist.path().join(rel)).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 630));
    }
}

#[test]
fn build_survives_a_broken_primary_font() {
    let content = TempDir::new().unwrap();
    let dist = TempDir::new().unwrap();
    // Primary is garbage; the fallback covers the whole build.
    write_content_tree(content.path(), b"definitely not a font");

    build(content.path(), dist.path());

    let png = fs::read(dist.path().join("og/docs/en/image.png")).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (1200, 630));
}

#[test]
fn build_fails_when_primary_font_file_missing() {
    let content = TempDir::new().unwrap();
    let dist = TempDir::new().unwrap();
    write_content_tree(content.path(), b"junk");
    fs::remove_file(content.path().join("assets/fonts/primary.ttf")).unwrap();

    let index = scan::scan(content.path()).unwrap();
    let result = generate::generate(&index, content.path(), dist.path());
    assert!(matches!(result, Err(generate::GenerateError::Font(_))));
}
