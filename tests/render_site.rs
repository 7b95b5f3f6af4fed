//! End-to-end rendering of a small site through the public API.

use ampgen::config::Site;
use ampgen::csp::hash_source;
use ampgen::render::{self, ErrorKind};
use ampgen::types::Mode;
use image::{Rgb, RgbImage};
use rayon::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const SITE_TOML: &str = r#"
base_url = "https://www.example.org/"
title_suffix = " - Example"
default_desc = "Pages about things."
author_name = "Jo Example"
publisher_name = "Example"

[[nav_items]]
name = "Home"
id = "index"

[[nav_items]]
name = "Trips"
url = "trips.html"
id = "trips"

[[nav_items.children]]
name = "Lake"
url = "lake.html"
id = "lake"
"#;

const INDEX: &str = "```page
title = \"Home\"
id = \"index\"
```

Read about [the lake](lake.html) or [all trips](trips.html#2019).
";

const TRIPS: &str = "```page
title = \"Trips\"
id = \"trips\"
created = \"2019-03-04\"
```

# Spring {#spring/map_marker}

Went *north*.

# Summer {#summer/map_marker/desktop_only}

Went south.
";

const LAKE: &str = "```page
title = \"Lake\"
id = \"lake\"
desc = \"A day at the lake.\"
img_url = \"lake-800.jpg\"
img_width = 800
img_height = 600
```

```image
path = \"lake-*.jpg\"
alt = \"The lake\"
caption = \"Still water\"
```

<only-amp>Swipe for more.</only-amp>
";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn raster(root: &Path, rel: &str, width: u32, height: u32) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, 90, (y * 255 / height) as u8])
    })
    .save(path)
    .unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "site.toml", SITE_TOML);
    write(root, "pages/index.md", INDEX);
    write(root, "pages/trips.md", TRIPS);
    write(root, "pages/lake.md", LAKE);
    write(root, "inline/base.css", "body{margin:0}");
    write(root, "inline/mobile.css", "main{padding:0}");
    write(root, "inline/base.js", "console.log('hi');");
    raster(root, "static/lake-400.jpg", 400, 300);
    raster(root, "static/lake-800.jpg", 800, 600);
    raster(root, "static_gen/lake-400.webp", 400, 300);
    raster(root, "static_gen/lake-800.webp", 800, 600);
    dir
}

fn between<'a>(html: &'a str, start: &str, end: &str) -> &'a str {
    let from = html.find(start).unwrap() + start.len();
    let to = html[from..].find(end).unwrap() + from;
    &html[from..to]
}

#[test]
fn every_page_renders_in_both_modes() {
    let dir = fixture();
    let site = Site::load(dir.path()).unwrap();
    let files = site.page_files().unwrap();
    assert_eq!(files.len(), 3);

    let pages: Vec<(String, Mode, String)> = files
        .par_iter()
        .flat_map_iter(|path| {
            let markdown = std::fs::read(path).unwrap();
            let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
            [Mode::NonAmp, Mode::Amp].map(|mode| {
                let page = render::render(&site, &markdown, mode).unwrap();
                (stem.clone(), mode, page.html)
            })
        })
        .collect();
    assert_eq!(pages.len(), 6);

    for (stem, mode, html) in &pages {
        assert!(html.starts_with("<!DOCTYPE html>"), "{stem} {mode:?}");
        assert!(html.trim_end().ends_with("</html>"), "{stem} {mode:?}");
    }
}

#[test]
fn canonical_page_pins_its_inline_payloads() {
    let dir = fixture();
    let site = Site::load(dir.path()).unwrap();
    let page = render::render(&site, INDEX.as_bytes(), Mode::NonAmp).unwrap();

    let style = between(&page.html, "<style>", "</style>");
    let csp = page.meta.csp_tag.as_deref().unwrap();
    assert!(style.starts_with("body{margin:0}"));
    assert!(style.contains("@media(max-width:640px){main{padding:0}}"));
    assert!(csp.contains(&hash_source(style.as_bytes())));
    assert!(csp.contains(&hash_source(b"console.log('hi');")));
    assert!(csp.contains("default-src 'none'"));
    assert_eq!(page.meta.link_href, "https://www.example.org/index.amp.html");
    assert!(page.html.contains("href=\"lake.html\""));
    assert!(page.html.contains("href=\"trips.html#2019\""));
}

#[test]
fn amp_page_links_stay_in_amp() {
    let dir = fixture();
    let site = Site::load(dir.path()).unwrap();
    let page = render::render(&site, INDEX.as_bytes(), Mode::Amp).unwrap();

    assert!(page.meta.csp_tag.is_none());
    assert_eq!(page.meta.link_rel, "canonical");
    assert_eq!(page.meta.link_href, "https://www.example.org/");
    assert!(page.html.contains("href=\"lake.amp.html\""));
    assert!(page.html.contains("href=\"trips.amp.html#2019\""));
    assert!(page.html.contains("<style amp-custom>"));
}

#[test]
fn boxes_and_markers() {
    let dir = fixture();
    let site = Site::load(dir.path()).unwrap();
    let page = render::render(&site, TRIPS.as_bytes(), Mode::NonAmp).unwrap();

    assert_eq!(page.meta.title, "Trips - Example");
    assert!(page.html.contains("<span class=\"location-label\">A</span> Spring"));
    assert!(page.html.contains("<span class=\"location-label\">B</span> Summer"));
    assert!(page.html.contains("class=\"box desktop-only\" id=\"summer\""));
    assert!(page.html.contains("Went <em>north</em>."));
    assert_eq!(page.meta.structured_data.date_published, "2019-03-04");
}

#[test]
fn image_page_carries_thumbnails_and_structured_data() {
    let dir = fixture();
    let site = Site::load(dir.path()).unwrap();

    let page = render::render(&site, LAKE.as_bytes(), Mode::NonAmp).unwrap();
    assert_eq!(page.meta.description, "A day at the lake.");
    let image = page.meta.structured_data.image.as_ref().unwrap();
    assert_eq!(image.url, "https://www.example.org/lake-800.jpg");
    assert_eq!((image.width, image.height), (800, 600));
    assert!(page.html.contains("data:image/gif;base64,"));
    assert!(page.html.contains("<figcaption>Still water</figcaption>"));
    assert!(page.html.contains("<a href=\"lake-800.jpg\">"));
    assert!(page.html.contains("<!-- AMP-only content \nSwipe for more.\n-->"));

    let amp = render::render(&site, LAKE.as_bytes(), Mode::Amp).unwrap();
    assert!(amp.html.contains("<amp-img"));
    assert!(amp.html.contains("Swipe for more."));
    assert!(!amp.html.contains("AMP-only content"));
}

#[test]
fn missing_asset_fails_the_whole_render() {
    let dir = fixture();
    std::fs::remove_file(dir.path().join("static/lake-800.jpg")).unwrap();
    let site = Site::load(dir.path()).unwrap();

    let err = render::render(&site, LAKE.as_bytes(), Mode::NonAmp).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
}
