//! Shared types used across the renderer: the output [`Mode`] and the site
//! navigation tree.
//!
//! The navigation tree is loaded once from `site.toml` and never mutated.
//! Each render builds its own [`NavNode`] view carrying the "current page" and
//! "expanded" flags, so annotations from one render cannot leak into another.

use crate::naming::{self, INDEX_ID, INDEX_PAGE};
use serde::{Deserialize, Serialize};

/// Which of the two parallel outputs is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Amp,
    NonAmp,
}

impl Mode {
    pub fn is_amp(self) -> bool {
        self == Mode::Amp
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Amp => "AMP",
            Mode::NonAmp => "non-AMP",
        }
    }
}

/// Navigation tree node from `site.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavItem {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl NavItem {
    /// Depth-first search for the item with `id`.
    pub fn find_id<'a>(items: &'a [NavItem], id: &str) -> Option<&'a NavItem> {
        items.iter().find_map(|item| {
            if item.id == id {
                Some(item)
            } else {
                NavItem::find_id(&item.children, id)
            }
        })
    }

    /// Canonical URL of this item. The index item may leave `url` empty.
    pub fn page_url(&self) -> &str {
        if self.url.is_empty() && self.id == INDEX_ID {
            INDEX_PAGE
        } else {
            &self.url
        }
    }

    /// AMP URL of this item; non-page targets are returned unchanged.
    pub fn amp_url(&self) -> String {
        let url = self.page_url();
        naming::amp_page(url).unwrap_or_else(|| url.to_string())
    }

    /// URL to link to from a page rendered in `mode`.
    pub fn url_for(&self, mode: Mode) -> String {
        match mode {
            Mode::Amp => self.amp_url(),
            Mode::NonAmp => self.page_url().to_string(),
        }
    }

    /// Whether this item or any descendant has `id`.
    fn contains_id(&self, id: &str) -> bool {
        !id.is_empty() && (self.id == id || self.children.iter().any(|c| c.contains_id(id)))
    }
}

/// Per-render view of a [`NavItem`].
#[derive(Debug, Clone, PartialEq)]
pub struct NavNode<'a> {
    pub item: &'a NavItem,
    /// The page being rendered.
    pub current: bool,
    /// On the path to the current page; children are shown.
    pub expanded: bool,
    pub children: Vec<NavNode<'a>>,
}

/// Annotate `items` for a render of the page with `current_id`.
pub fn annotate<'a>(items: &'a [NavItem], current_id: &str) -> Vec<NavNode<'a>> {
    items
        .iter()
        .map(|item| NavNode {
            item,
            current: !item.id.is_empty() && item.id == current_id,
            expanded: item.contains_id(current_id),
            children: annotate(&item.children, current_id),
        })
        .collect()
}
