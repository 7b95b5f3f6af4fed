//! Link target rewriting for the two output variants.
//!
//! Rules, first match wins:
//!
//! 1. Targets with a scheme (`https:`, `mailto:`) are kept.
//! 2. Fragment-only targets (`#top`) are kept.
//! 3. A trailing `!force_amp` or `!force_nonamp` is stripped and overrides
//!    the mode. Carrying both is an error.
//! 4. Non-page targets must exist as static assets.
//! 5. In non-AMP mode the target is kept.
//! 6. In AMP mode site-rooted targets (`/x`) are rejected, and targets that
//!    aren't pages of this site become absolute so they keep working when the
//!    page is served from an AMP cache.
//! 7. Page targets become their `.amp.html` variant.

use crate::config::{ConfigError, Site};
use crate::naming;
use crate::types::Mode;
use thiserror::Error;

pub const FORCE_AMP: &str = "!force_amp";
pub const FORCE_NONAMP: &str = "!force_nonamp";

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("link {0:?} is forced to both AMP and non-AMP")]
    ContradictoryForce(String),
    #[error("site-rooted link {0:?} is not allowed in AMP pages")]
    SiteRooted(String),
    #[error("broken link {link:?}: {source}")]
    Broken { link: String, source: ConfigError },
}

/// Strip force directives from the end of `target`.
fn strip_force(target: &str) -> Result<(&str, Option<Mode>), LinkError> {
    let mut rest = target;
    let mut forced = None;
    loop {
        let (stripped, mode) = if let Some(s) = rest.strip_suffix(FORCE_AMP) {
            (s, Mode::Amp)
        } else if let Some(s) = rest.strip_suffix(FORCE_NONAMP) {
            (s, Mode::NonAmp)
        } else {
            break;
        };
        match forced {
            Some(prev) if prev != mode => {
                return Err(LinkError::ContradictoryForce(target.to_string()));
            }
            _ => forced = Some(mode),
        }
        rest = stripped;
    }
    Ok((rest, forced))
}

/// Rewrites link targets for pages of one site.
pub struct LinkRewriter<'a> {
    site: &'a Site,
}

impl<'a> LinkRewriter<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Rewrite `target` for a page rendered in `mode`.
    pub fn rewrite(&self, target: &str, mode: Mode) -> Result<String, LinkError> {
        if naming::has_scheme(target) || target.starts_with('#') {
            return Ok(target.to_string());
        }
        let (target, forced) = strip_force(target)?;
        let mode = forced.unwrap_or(mode);

        let page = naming::split_page(target).filter(|_| self.site.is_site_page(target));
        if page.is_none() {
            let asset = target.split(['#', '?']).next().unwrap_or(target);
            self.site
                .check_static(asset)
                .map_err(|source| LinkError::Broken {
                    link: target.to_string(),
                    source,
                })?;
        }

        if mode == Mode::NonAmp {
            return Ok(match (forced, &page) {
                (Some(_), Some(p)) => p.canonical(),
                _ => target.to_string(),
            });
        }
        if target.starts_with('/') {
            return Err(LinkError::SiteRooted(target.to_string()));
        }
        match page {
            Some(p) => Ok(p.amp()),
            None => Ok(self.site.abs_url(target)),
        }
    }
}
