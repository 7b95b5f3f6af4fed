//! Shared test utilities: throwaway site directories.
//!
//! ```rust
//! let fx = SiteFixture::new();
//! fx.jpeg("static/photo-400.jpg", 400, 300);
//! fx.page("about", "```page\ntitle = \"About\"\nid = \"about\"\n```\n");
//! let site = fx.site();
//! ```

use crate::config::{CONFIG_FILE, Site};
use image::{Rgb, RgbImage};
use std::path::Path;
use tempfile::TempDir;

pub const BASE_URL: &str = "https://www.example.org/";

const NAV: &str = r#"
[[nav_items]]
name = "Home"
id = "index"

[[nav_items]]
name = "Travel"
url = "travel.html"
id = "travel"

[[nav_items.children]]
name = "Japan"
url = "japan.html"
id = "japan"

[[nav_items]]
name = "About"
url = "about.html"
id = "about"

[[nav_items]]
name = "Code"
url = "https://git.example.org/"
"#;

// =========================================================================
// Fixture site
// =========================================================================

/// A site rooted in a temp directory with a working `site.toml`.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let fx = SiteFixture {
            dir: TempDir::new().unwrap(),
        };
        fx.set_config("");
        fx
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Rewrite `site.toml` with `extra` top-level keys added.
    pub fn set_config(&self, extra: &str) {
        let toml = format!(
            "base_url = \"{BASE_URL}\"\n\
             title_suffix = \" - Example\"\n\
             default_desc = \"Default description.\"\n\
             author_name = \"Jo Example\"\n\
             author_email = \"jo@example.org\"\n\
             publisher_name = \"Example\"\n\
             {extra}\n{NAV}"
        );
        self.write(CONFIG_FILE, &toml);
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Add `pages/<name>.md`.
    pub fn page(&self, name: &str, markdown: &str) {
        self.write(&format!("pages/{name}.md"), markdown);
    }

    /// Write a gradient raster; the format follows the extension.
    pub fn raster(&self, rel: &str, width: u32, height: u32) {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        });
        img.save(&path).unwrap();
    }

    pub fn jpeg(&self, rel: &str, width: u32, height: u32) {
        self.raster(rel, width, height);
    }

    pub fn png(&self, rel: &str, width: u32, height: u32) {
        self.raster(rel, width, height);
    }

    pub fn webp(&self, rel: &str, width: u32, height: u32) {
        self.raster(rel, width, height);
    }

    /// Load the site as it is on disk now.
    pub fn site(&self) -> Site {
        Site::load(self.root()).unwrap()
    }
}

/// Front matter block for a page with `id` and `title`, plus extra TOML lines.
pub fn front_matter(id: &str, title: &str, extra: &str) -> String {
    format!("```page\ntitle = \"{title}\"\nid = \"{id}\"\n{extra}```\n\n")
}
