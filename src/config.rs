//! Site configuration and layout.
//!
//! A site is a directory with a `site.toml` at its root:
//!
//! ```text
//! site/
//! ├── site.toml        # SiteConfig (below)
//! ├── pages/           # one `name.md` per page → name.html + name.amp.html
//! ├── static/          # images and downloads, served from the site root
//! ├── static_gen/      # generated variants (e.g. WebP), also served from the root
//! └── inline/          # CSS/JS inlined into every page
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! base_url = "https://www.example.org/"   # required, absolute, trailing slash
//! title_suffix = " - Example"             # appended to page titles
//! default_desc = "Pages about things."    # meta description fallback
//! nav_text = "Pages"                      # label of the navigation box
//! logo_path = "resources/logo-*.png"      # header logo (optional)
//! logo_path_amp = "resources/logo.png"    # AMP header logo (defaults to logo_path)
//! logo_alt = "Example"
//! author_name = "Jo Example"              # schema.org author
//! author_email = "jo@example.org"
//! publisher_name = "Example"              # schema.org publisher
//! publisher_logo_path = "resources/pub.png"
//! google_analytics_code = ""              # AMP analytics when set
//! mobile_max_width = 640                  # widest viewport treated as mobile
//!
//! [[nav_items]]
//! name = "Home"
//! id = "index"
//!
//! [[nav_items]]
//! name = "Travel"
//! url = "travel.html"
//! id = "travel"
//!
//! [[nav_items.children]]
//! name = "Japan"
//! url = "japan.html"
//! id = "japan"
//! ```
//!
//! Unknown keys are rejected.

use crate::imaging::{ImageBackend, RustBackend};
use crate::naming::{self, INDEX_PAGE};
use crate::types::NavItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const CONFIG_FILE: &str = "site.toml";
pub const PAGE_DIR: &str = "pages";
pub const STATIC_DIR: &str = "static";
pub const STATIC_GEN_DIR: &str = "static_gen";
pub const INLINE_DIR: &str = "inline";
pub const PAGE_EXT: &str = "md";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("static file {0:?} doesn't exist")]
    MissingStatic(String),
    #[error("path {0:?} escapes the site")]
    Escape(String),
    #[error("failed to read logo {path:?}: {source}")]
    Logo {
        path: String,
        source: crate::imaging::BackendError,
    },
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub base_url: String,
    pub title_suffix: String,
    pub default_desc: String,
    pub nav_text: String,
    pub logo_path: String,
    pub logo_path_amp: String,
    pub logo_alt: String,
    pub author_name: String,
    pub author_email: String,
    pub publisher_name: String,
    pub publisher_logo_path: String,
    pub google_analytics_code: String,
    pub mobile_max_width: u32,
    pub nav_items: Vec<NavItem>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            title_suffix: String::new(),
            default_desc: String::new(),
            nav_text: "Pages".to_string(),
            logo_path: String::new(),
            logo_path_amp: String::new(),
            logo_alt: String::new(),
            author_name: String::new(),
            author_email: String::new(),
            publisher_name: String::new(),
            publisher_logo_path: String::new(),
            google_analytics_code: String::new(),
            mobile_max_width: 640,
            nav_items: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !naming::has_scheme(&self.base_url) {
            return Err(ConfigError::Validation(
                "base_url must be an absolute URL".into(),
            ));
        }
        if !self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_url must end with '/'".into(),
            ));
        }
        if self.mobile_max_width == 0 {
            return Err(ConfigError::Validation(
                "mobile_max_width must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Header logo for `amp` pages, falling back to the regular logo.
    pub fn logo_for(&self, amp: bool) -> &str {
        if amp && !self.logo_path_amp.is_empty() {
            &self.logo_path_amp
        } else {
            &self.logo_path
        }
    }
}

/// Publisher logo with its pixel size, as schema.org requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherLogo {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A loaded site: configuration plus everything derived from the site root.
#[derive(Debug, Clone)]
pub struct Site {
    pub config: SiteConfig,
    pub root: PathBuf,
    /// Names of all pages in `pages/` (`about` for `pages/about.md`).
    pub pages: BTreeSet<String>,
    pub publisher_logo: Option<PublisherLogo>,
}

impl Site {
    /// Load `site.toml` from `root`, validate it and scan the page directory.
    pub fn load(root: &Path) -> Result<Site, ConfigError> {
        let content = fs::read_to_string(root.join(CONFIG_FILE))?;
        let config: SiteConfig = toml::from_str(&content)?;
        Site::from_config(config, root)
    }

    /// Build a site from an already-parsed config rooted at `root`.
    pub fn from_config(config: SiteConfig, root: &Path) -> Result<Site, ConfigError> {
        config.validate()?;
        let mut site = Site {
            config,
            root: root.to_path_buf(),
            pages: BTreeSet::new(),
            publisher_logo: None,
        };
        site.pages = site
            .page_files()?
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        site.publisher_logo = site.load_publisher_logo(&RustBackend::new())?;
        Ok(site)
    }

    fn load_publisher_logo(
        &self,
        backend: &impl ImageBackend,
    ) -> Result<Option<PublisherLogo>, ConfigError> {
        let rel = &self.config.publisher_logo_path;
        if rel.is_empty() {
            return Ok(None);
        }
        let path = self.check_static(rel)?;
        let dims = backend.identify(&path).map_err(|source| ConfigError::Logo {
            path: rel.clone(),
            source,
        })?;
        Ok(Some(PublisherLogo {
            url: self.abs_url(rel),
            width: dims.width,
            height: dims.height,
        }))
    }

    pub fn page_dir(&self) -> PathBuf {
        self.root.join(PAGE_DIR)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.root.join(STATIC_DIR)
    }

    pub fn static_gen_dir(&self) -> PathBuf {
        self.root.join(STATIC_GEN_DIR)
    }

    pub fn inline_dir(&self) -> PathBuf {
        self.root.join(INLINE_DIR)
    }

    /// Markdown files in the page directory, sorted by name.
    pub fn page_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let dir = self.page_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ConfigError::Io(e.into()))?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(PAGE_EXT)
            {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    /// Whether `url` is a page this site generates.
    pub fn is_site_page(&self, url: &str) -> bool {
        naming::split_page(url).is_some_and(|p| self.pages.contains(p.base))
    }

    /// Absolute URL for a site-relative path. `index.html` maps to the base URL.
    pub fn abs_url(&self, url: &str) -> String {
        if naming::has_scheme(url) {
            return url.to_string();
        }
        let rel = url.trim_start_matches('/');
        if rel == INDEX_PAGE {
            self.config.base_url.clone()
        } else {
            format!("{}{}", self.config.base_url, rel)
        }
    }

    /// Locate a static asset in `static/`, then `static_gen/`.
    pub fn static_path(&self, rel: &str) -> Result<Option<PathBuf>, ConfigError> {
        let rel = rel.trim_start_matches('/');
        let rel_path = Path::new(rel);
        if rel.is_empty()
            || rel_path
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ConfigError::Escape(rel.to_string()));
        }
        Ok([self.static_dir(), self.static_gen_dir()]
            .into_iter()
            .map(|dir| dir.join(rel_path))
            .find(|p| p.is_file()))
    }

    /// Like [`static_path`](Self::static_path) but a missing file is an error.
    pub fn check_static(&self, rel: &str) -> Result<PathBuf, ConfigError> {
        self.static_path(rel)?
            .ok_or_else(|| ConfigError::MissingStatic(rel.to_string()))
    }

    /// Trimmed contents of `inline/<name>`; a missing file reads as empty.
    pub fn read_inline(&self, name: &str) -> Result<String, ConfigError> {
        match fs::read_to_string(self.inline_dir().join(name)) {
            Ok(s) => Ok(s.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}
