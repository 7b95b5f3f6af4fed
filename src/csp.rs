//! Content-Security-Policy accumulation.
//!
//! Sources are collected per directive while a page's inline payloads are
//! decided, then serialized once:
//!
//! ```text
//! default-src 'none'; child-src 'self'; img-src 'self' data:;
//! script-src 'sha256-…' 'unsafe-inline'; style-src 'sha256-…' 'unsafe-inline';
//! frame-src 'self'
//! ```
//!
//! Hashes cover the exact bytes that end up inside the `<script>`/`<style>`
//! elements, so every payload must be final before it is hashed. `child-src`
//! sources are mirrored into `frame-src` for browsers that only know the
//! latter. `'unsafe-inline'` is added next to hashes as a fallback for
//! browsers without hash support; browsers that understand hashes ignore it.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

pub const NONE: &str = "'none'";
pub const SELF: &str = "'self'";
pub const DATA: &str = "data:";
pub const UNSAFE_INLINE: &str = "'unsafe-inline'";
const HASH_PREFIX: &str = "'sha256-";

/// Policy directives in serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Default,
    Child,
    Connect,
    Img,
    Script,
    Style,
    Frame,
}

impl Directive {
    pub const ALL: [Directive; 7] = [
        Directive::Default,
        Directive::Child,
        Directive::Connect,
        Directive::Img,
        Directive::Script,
        Directive::Style,
        Directive::Frame,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Directive::Default => "default-src",
            Directive::Child => "child-src",
            Directive::Connect => "connect-src",
            Directive::Img => "img-src",
            Directive::Script => "script-src",
            Directive::Style => "style-src",
            Directive::Frame => "frame-src",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// `'sha256-<base64>'` source for `content`.
pub fn hash_source(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("{HASH_PREFIX}{}'", STANDARD.encode(digest))
}

/// Accumulates sources for one page.
#[derive(Debug, Clone, Default)]
pub struct CspBuilder {
    sources: [Vec<String>; 7],
}

impl CspBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `source` under `directive`. Duplicates are ignored.
    pub fn add_source(&mut self, directive: Directive, source: impl Into<String>) {
        let source = source.into();
        if directive == Directive::Child {
            self.push(Directive::Frame, source.clone());
        }
        self.push(directive, source);
    }

    /// Allow inline content with exactly these bytes under `directive`.
    /// Returns the hash source that was recorded.
    pub fn add_hash(&mut self, directive: Directive, content: &[u8]) -> String {
        let source = hash_source(content);
        self.add_source(directive, source.clone());
        source
    }

    fn push(&mut self, directive: Directive, source: String) {
        let list = &mut self.sources[directive.index()];
        if !list.contains(&source) {
            list.push(source);
        }
    }

    /// Sources recorded so far for `directive`.
    pub fn sources(&self, directive: Directive) -> &[String] {
        &self.sources[directive.index()]
    }

    /// The policy value.
    pub fn finish(&self) -> String {
        let mut clauses = Vec::new();
        for directive in Directive::ALL {
            let list = self.sources(directive);
            if list.is_empty() {
                continue;
            }
            let mut clause = format!("{} {}", directive.name(), list.join(" "));
            if matches!(directive, Directive::Script | Directive::Style)
                && list.iter().any(|s| s.starts_with(HASH_PREFIX))
            {
                clause.push(' ');
                clause.push_str(UNSAFE_INLINE);
            }
            clauses.push(clause);
        }
        clauses.join("; ")
    }

    /// The policy wrapped in a `<meta http-equiv>` tag.
    pub fn tag(&self) -> String {
        let markup = maud::html! {
            meta http-equiv="Content-Security-Policy" content=(self.finish());
        };
        markup.into_string()
    }
}
