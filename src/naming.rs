//! Page URL naming convention.
//!
//! Every generated page lives at the site root under a lowercase name, in two
//! variants:
//!
//! | Variant | URL |
//! |---|---|
//! | canonical | `about.html`, `about.html#history` |
//! | AMP | `about.amp.html`, `about.amp.html#history` |
//!
//! The index page is `index.html` and is served as the bare base URL.
//! Anything else (images, downloads, `iframes/...`) is a static asset, not a
//! page.

pub const HTML_EXT: &str = ".html";
pub const AMP_EXT: &str = ".amp.html";
pub const INDEX_ID: &str = "index";
pub const INDEX_PAGE: &str = "index.html";

/// A URL that follows the page naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl<'a> {
    /// Page name without extension (`about`).
    pub base: &'a str,
    /// True for `name.amp.html`.
    pub amp: bool,
    /// Fragment including the leading `#`, or empty.
    pub fragment: &'a str,
}

impl PageUrl<'_> {
    /// The canonical variant of this page URL.
    pub fn canonical(&self) -> String {
        format!("{}{HTML_EXT}{}", self.base, self.fragment)
    }

    /// The AMP variant of this page URL.
    pub fn amp(&self) -> String {
        format!("{}{AMP_EXT}{}", self.base, self.fragment)
    }
}

fn is_page_base(base: &str) -> bool {
    !base.is_empty()
        && base
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

/// Split `name.html#frag` / `name.amp.html#frag` into its parts.
///
/// Returns `None` for anything that is not shaped like a page URL.
pub fn split_page(url: &str) -> Option<PageUrl<'_>> {
    let (path, fragment) = match url.find('#') {
        Some(i) if i + 1 < url.len() => (&url[..i], &url[i..]),
        Some(_) => return None,
        None => (url, ""),
    };
    if let Some(base) = path.strip_suffix(AMP_EXT)
        && is_page_base(base)
    {
        return Some(PageUrl {
            base,
            amp: true,
            fragment,
        });
    }
    let base = path.strip_suffix(HTML_EXT)?;
    is_page_base(base).then_some(PageUrl {
        base,
        amp: false,
        fragment,
    })
}

/// Whether `url` names a page (either variant).
pub fn is_page(url: &str) -> bool {
    split_page(url).is_some()
}

/// The AMP variant of a page URL, or `None` if `url` isn't a page.
pub fn amp_page(url: &str) -> Option<String> {
    split_page(url).map(|p| p.amp())
}

/// Whether `url` starts with a URI scheme (`https:`, `mailto:`, ...).
pub fn has_scheme(url: &str) -> bool {
    let Some(colon) = url.find(':') else {
        return false;
    };
    let scheme = &url[..colon];
    let mut bytes = scheme.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}
