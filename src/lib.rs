//! # ampgen
//!
//! Renders pages written in an extended markdown dialect into two parallel
//! HTML outputs per page: a canonical page carrying a hash-pinned
//! Content-Security-Policy, and an AMP variant.
//!
//! # Rendering a Page
//!
//! ```text
//! site.toml ─▶ Site ──┐
//! pages/x.md ─────────┴─▶ render(site, bytes, mode) ─▶ RenderedPage { html, meta }
//! ```
//!
//! A render is a pure function of the site and the page bytes. Nothing is
//! shared between renders except the read-only [`config::Site`], so the two
//! variants of a page (and all pages of a site) can be rendered in parallel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`render`] | Document renderer: front matter, boxes, reserved blocks, pseudo-elements, page chrome |
//! | [`links`] | Rewrites link targets per output mode and checks they resolve |
//! | [`images`] | Resolves image references (single files, wildcard sets, URLs) into descriptors |
//! | [`imaging`] | Raster backend, dimension calculations, tiny GIF thumbnails |
//! | [`csp`] | Content-Security-Policy builder hashing inline styles and scripts |
//! | [`structured_data`] | schema.org `Article` JSON-LD |
//! | [`pseudo`] | The fixed vocabulary of raw-HTML pseudo-elements |
//! | [`config`] | `site.toml` loading, validation and site directory layout |
//! | [`types`] | Output [`types::Mode`] and the navigation tree |
//! | [`naming`] | `name.html` / `name.amp.html` page URL convention |
//! | [`output`] | CLI output formatting for `ampgen build` |
//!
//! # Design Decisions
//!
//! ## The Head Is Decided First
//!
//! The CSP tag in a canonical page hashes the exact inline style and script
//! bytes that page emits. Those payloads depend only on the front matter and
//! the `inline/` directory, so the renderer reads the front matter, computes
//! the payloads and the policy, and only then walks the body. Nothing in the
//! body can change what the policy covers.
//!
//! ## Event Rewriting Over a Custom Tree
//!
//! Pages are parsed with [pulldown-cmark](https://docs.rs/pulldown-cmark) and
//! rendered by rewriting its event stream: links get new targets, reserved
//! code blocks and pseudo-elements become inline HTML events, and everything
//! else passes through to `push_html`. Markup the renderer builds itself is
//! written with [Maud](https://maud.lambda.xyz/), so interpolated values are
//! escaped by construction.
//!
//! ## Fail Fast, Publish Nothing
//!
//! The first error ends a render and is returned instead of the page. Errors
//! are classified by [`render::ErrorKind`] so callers can tell a broken page
//! from a missing asset.

pub mod config;
pub mod csp;
pub mod images;
pub mod imaging;
pub mod links;
pub mod naming;
pub mod output;
pub mod pseudo;
pub mod render;
pub mod structured_data;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
