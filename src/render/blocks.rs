//! Fenced code blocks.
//!
//! The info string picks the renderer:
//!
//! | Info | Body | Output |
//! |---|---|---|
//! | `image` | [`ImageBlock`] TOML | figure around a (linked) image |
//! | `graph` | [`GraphBlock`] TOML | figure around an iframe |
//! | `map` | [`MapBlock`] TOML | map iframe with a placeholder image |
//! | `clear` | ignored | float clearer |
//! | `page` | | only valid as the first block |
//! | anything else | source code | `<pre><code>` without a language class |

use super::context::PageContext;
use super::templates::{self, ImgAttrs};
use super::{RenderError, Renderer};
use crate::images::{ImageOptions, ImageSpec, Layout};
use crate::imaging::ImageBackend;
use crate::types::Mode;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd, html};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub const PAGE_BLOCK: &str = "page";
const MAP_ALT: &str = "[map placeholder]";

/// Figure placement. `desktop_alt` alternates between the two desktop sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureAlign {
    Left,
    Right,
    Center,
    DesktopLeft,
    DesktopRight,
    DesktopAlt,
}

impl FigureAlign {
    /// Concrete alignment given the previous figure's.
    pub fn resolve(self, last: Option<FigureAlign>) -> FigureAlign {
        match self {
            FigureAlign::DesktopAlt if last != Some(FigureAlign::DesktopLeft) => {
                FigureAlign::DesktopLeft
            }
            FigureAlign::DesktopAlt => FigureAlign::DesktopRight,
            other => other,
        }
    }

    pub fn classes(self) -> &'static str {
        match self {
            FigureAlign::Left => "left",
            FigureAlign::Right => "right",
            FigureAlign::Center => "center",
            FigureAlign::DesktopLeft => "desktop-left mobile-center",
            FigureAlign::DesktopRight => "desktop-right mobile-center",
            FigureAlign::DesktopAlt => "",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageBlock {
    pub path: Option<String>,
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt: String,
    pub lazy: bool,
    pub sizes: Option<String>,
    pub align: Option<FigureAlign>,
    pub caption: Option<String>,
    pub class: Option<String>,
    /// Link target; defaults to the largest variant when that isn't shown.
    pub href: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphBlock {
    /// Site-relative iframe page.
    pub href: String,
    /// Passed to the iframe page as its query string.
    #[serde(default)]
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub align: Option<FigureAlign>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapBlock {
    /// Site-relative iframe page.
    pub href: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

fn parse_block<T: DeserializeOwned>(block: &'static str, body: &str) -> Result<T, RenderError> {
    toml::from_str(body).map_err(|source| RenderError::Block { block, source })
}

/// Source code as `<pre><code>`, without a trailing blank line.
pub fn literal_code(body: &str) -> String {
    let events = [
        Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(CowStr::Borrowed("")))),
        Event::Text(CowStr::Borrowed(body)),
        Event::End(TagEnd::CodeBlock),
    ];
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out.replace("&quot;", "\"")
        .replace("\n</code></pre>", "</code></pre>")
}

/// Classes of a figure, updating the alternation state.
fn figure_classes(ctx: &mut PageContext<'_>, align: Option<FigureAlign>, class: Option<&str>) -> String {
    let align = align.map(|a| a.resolve(ctx.last_figure_align));
    ctx.last_figure_align = align;
    [align.map(FigureAlign::classes), class]
        .into_iter()
        .flatten()
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl<'s, B: ImageBackend> Renderer<'s, B> {
    pub(super) fn code_block(
        &self,
        ctx: &mut PageContext<'_>,
        info: &str,
        body: &str,
    ) -> Result<(), RenderError> {
        let html = match info {
            "image" => self.image_block(ctx, parse_block("image", body)?)?,
            "graph" => self.graph_block(ctx, parse_block("graph", body)?)?,
            "map" => self.map_block(ctx, parse_block("map", body)?)?,
            "clear" => templates::clear().into_string(),
            PAGE_BLOCK => return Err(RenderError::MisplacedFrontMatter),
            _ => literal_code(body),
        };
        ctx.push_html(html);
        Ok(())
    }

    /// Iframe pages are absolute in AMP pages, site-rooted otherwise.
    fn iframe_url(&self, href: &str) -> String {
        let rel = href.trim_start_matches('/');
        match self.mode {
            Mode::Amp => format!("{}{rel}", self.site.config.base_url),
            Mode::NonAmp => format!("/{rel}"),
        }
    }

    fn image_block(
        &self,
        ctx: &mut PageContext<'_>,
        block: ImageBlock,
    ) -> Result<String, RenderError> {
        let spec = ImageSpec {
            path: block.path,
            url: block.url,
            width: block.width,
            height: block.height,
            alt: block.alt,
            lazy: block.lazy,
            sizes: block.sizes,
        };
        let desc = self
            .images
            .resolve(&spec, ImageOptions::default(), &mut ctx.thumbs)?;

        let shown = desc.fallback.as_ref().map_or(&desc.src, |fb| &fb.src);
        let href = match block.href {
            Some(href) => Some(href),
            None => (desc.biggest_src != *shown).then(|| desc.biggest_src.clone()),
        };
        let href = href
            .map(|h| self.links.rewrite(&h, self.mode))
            .transpose()?;

        let classes = figure_classes(ctx, block.align, block.class.as_deref());
        let inner = templates::linked(
            href.as_deref(),
            templates::img(&desc, self.mode, ImgAttrs::default()),
        );
        Ok(templates::figure(&classes, block.caption.as_deref(), inner).into_string())
    }

    fn graph_block(
        &self,
        ctx: &mut PageContext<'_>,
        block: GraphBlock,
    ) -> Result<String, RenderError> {
        if !ctx.has_graph {
            return Err(RenderError::Undeclared("graph", "has_graph"));
        }
        if block.width == 0 || block.height == 0 {
            return Err(RenderError::BadBlock {
                block: "graph",
                reason: "width and height must be positive".to_string(),
            });
        }
        let mut src = self.iframe_url(&block.href);
        if !block.name.is_empty() {
            src.push('?');
            src.push_str(&block.name);
        }
        let classes = figure_classes(ctx, block.align, block.class.as_deref());
        let inner = templates::graph(self.mode, &src, block.width, block.height);
        Ok(templates::figure(&classes, block.caption.as_deref(), inner).into_string())
    }

    fn map_block(&self, ctx: &mut PageContext<'_>, block: MapBlock) -> Result<String, RenderError> {
        if !ctx.has_map {
            return Err(RenderError::Undeclared("map", "has_map"));
        }
        let spec = ImageSpec {
            path: block.path,
            url: block.url,
            width: block.width,
            height: block.height,
            alt: MAP_ALT.to_string(),
            ..ImageSpec::default()
        };
        let opts = ImageOptions {
            layout: Layout::Fill,
        };
        let desc = self.images.resolve(&spec, opts, &mut ctx.thumbs)?;
        if !self.mode.is_amp() {
            ctx.thumbs.release_filter(&desc);
        }
        let placeholder = self.mode.is_amp().then(|| {
            let attrs = ImgAttrs {
                placeholder: true,
                ..ImgAttrs::default()
            };
            templates::img(&desc, self.mode, attrs)
        });
        let src = self.iframe_url(&block.href);
        Ok(templates::map(self.mode, &src, desc.width, desc.height, placeholder).into_string())
    }
}
