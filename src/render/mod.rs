//! Document renderer: markdown page in, complete HTML page out.
//!
//! One render is one pass over the pulldown-cmark event stream:
//!
//! ```text
//! bytes ─▶ Parser ─▶ front matter ─▶ head (nav, structured data, payloads, CSP)
//!                 └▶ body events ─▶ dispatch ─▶ rewritten events ─▶ push_html
//!                                      │
//!                    H1 ─▶ boxes     code block ─▶ blocks     raw HTML ─▶ spans
//!                    link ─▶ links   text/code ─▶ spans
//! ```
//!
//! The head is fully determined before the body is walked; the CSP tag in it
//! hashes the inline payloads it will be emitted next to.
//!
//! Rendering stops at the first error. Nothing is returned for a failed
//! render, so callers never see partial HTML.

mod blocks;
mod boxes;
mod context;
mod page;
mod spans;
mod templates;

pub use blocks::FigureAlign;
pub use boxes::{BoxState, HeadingAttrs, HeadingError, map_label};
pub use page::{FrontMatter, PageMeta, Payloads};

use crate::config::{ConfigError, Site};
use crate::images::{ImageError, ImageResolver};
use crate::imaging::{ImageBackend, RustBackend};
use crate::links::{LinkError, LinkRewriter};
use crate::pseudo::TagError;
use crate::types::Mode;
use blocks::PAGE_BLOCK;
use context::PageContext;
use log::debug;
use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd, html,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("page isn't valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("page must start with a \"page\" block")]
    MissingFrontMatter,
    #[error("\"page\" block must be the first block")]
    MisplacedFrontMatter,
    #[error("failed to parse page info: {0}")]
    FrontMatter(#[source] toml::de::Error),
    #[error("failed to parse {block} block: {source}")]
    Block {
        block: &'static str,
        source: toml::de::Error,
    },
    #[error("bad {block} block: {reason}")]
    BadBlock { block: &'static str, reason: String },
    #[error("{0} block needs {1} = true in the page info")]
    Undeclared(&'static str, &'static str),
    #[error("bad heading: {0}")]
    Heading(#[from] HeadingError),
    #[error("bad HTML span {span:?}: {source}")]
    Span { span: String, source: TagError },
    #[error("no page with ID {0:?}")]
    UnknownPage(String),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("bad image: {0}")]
    Image(#[from] ImageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to encode structured data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad classes of render failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The page itself is wrong.
    MalformedInput,
    /// Something the page refers to doesn't exist.
    ResolutionFailure,
    /// An image couldn't be decoded.
    CodecFailure,
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::Link(LinkError::ContradictoryForce(_)) => ErrorKind::MalformedInput,
            RenderError::Link(_) | RenderError::UnknownPage(_) | RenderError::Config(_) => {
                ErrorKind::ResolutionFailure
            }
            RenderError::Image(e) => match e {
                ImageError::Source
                | ImageError::MissingAlt
                | ImageError::UrlDimensions
                | ImageError::Pattern(_) => ErrorKind::MalformedInput,
                ImageError::Thumbnail { .. } => ErrorKind::CodecFailure,
                _ => ErrorKind::ResolutionFailure,
            },
            _ => ErrorKind::MalformedInput,
        }
    }
}

/// A rendered page and the metadata in its head.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    pub meta: PageMeta,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// First word of a fenced block's info string.
fn info_tag(info: &str) -> &str {
    info.split_whitespace().next().unwrap_or_default()
}

/// Text of the code block whose start was just consumed.
fn collect_code<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> String {
    let mut body = String::new();
    for event in events.by_ref() {
        match event {
            Event::Text(text) => body.push_str(&text),
            Event::End(TagEnd::CodeBlock) => break,
            _ => {}
        }
    }
    body
}

/// Renders pages of one site in one mode.
pub struct Renderer<'s, B: ImageBackend> {
    site: &'s Site,
    mode: Mode,
    links: LinkRewriter<'s>,
    images: ImageResolver<'s, B>,
}

impl<'s, B: ImageBackend> Renderer<'s, B> {
    pub fn new(site: &'s Site, backend: &'s B, mode: Mode) -> Self {
        Self {
            site,
            mode,
            links: LinkRewriter::new(site),
            images: ImageResolver::new(site, backend, mode),
        }
    }

    pub fn render(&self, markdown: &[u8]) -> Result<RenderedPage, RenderError> {
        let text = std::str::from_utf8(markdown)?;
        let mut events = Parser::new_ext(text, parser_options());
        let front = match events.next() {
            Some(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))))
                if info_tag(&info) == PAGE_BLOCK =>
            {
                FrontMatter::parse(&collect_code(&mut events))?
            }
            _ => return Err(RenderError::MissingFrontMatter),
        };

        let mut ctx = PageContext::new(self.mode);
        ctx.has_map = front.has_map;
        ctx.has_graph = front.has_graph;
        let head = self.prepare(front, &mut ctx.thumbs)?;

        while let Some(event) = events.next() {
            self.dispatch(&mut ctx, event, &mut events)?;
        }
        if ctx.boxes.finish() {
            ctx.body.push(Event::Html(templates::BOX_END.into()));
        }

        let mut out = templates::page_start(&head);
        html::push_html(&mut out, ctx.body.into_iter());
        out.push_str(&templates::page_end(&head));
        debug!(
            "rendered {} page {:?} ({} bytes)",
            self.mode.name(),
            head.front.id,
            out.len()
        );
        Ok(RenderedPage {
            html: out,
            meta: head.meta,
        })
    }

    fn dispatch<'a>(
        &self,
        ctx: &mut PageContext<'a>,
        event: Event<'a>,
        events: &mut impl Iterator<Item = Event<'a>>,
    ) -> Result<(), RenderError> {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                id,
                ..
            }) => {
                if ctx.boxes.enter_heading(id.as_deref().unwrap_or_default()) {
                    ctx.body.push(Event::Html(templates::BOX_END.into()));
                }
                ctx.title.clear();
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                let mut title = String::new();
                html::push_html(&mut title, ctx.title.drain(..));
                let header = ctx.boxes.exit_heading(title)?;
                ctx.push_html(templates::box_start(&header, self.mode));
            }
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let id = match id {
                    Some(raw) => {
                        let parsed = HeadingAttrs::parse(&raw)?;
                        (!parsed.id.is_empty()).then(|| CowStr::from(parsed.id))
                    }
                    None => None,
                };
                ctx.push(Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }));
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match &kind {
                    CodeBlockKind::Fenced(info) => info_tag(info).to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let body = collect_code(events);
                self.code_block(ctx, &info, &body)?;
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = if link_type == LinkType::Email {
                    dest_url
                } else {
                    self.links.rewrite(&dest_url, self.mode)?.into()
                };
                ctx.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }));
            }
            event @ Event::Start(Tag::Image { .. }) => {
                ctx.image_depth += 1;
                ctx.push(event);
            }
            event @ Event::End(TagEnd::Image) => {
                ctx.image_depth = ctx.image_depth.saturating_sub(1);
                ctx.push(event);
            }
            Event::Text(text) if ctx.image_depth == 0 => ctx.push_html(spans::text(&text)),
            Event::Code(code) if ctx.image_depth == 0 => ctx.push_html(spans::code(&code)),
            Event::InlineHtml(src) => self.pseudo(ctx, &src)?,
            Event::Html(src) => self.html_block(ctx, &src)?,
            other => ctx.push(other),
        }
        Ok(())
    }
}

/// Render `markdown` for `site` in `mode` with the default image backend.
pub fn render(site: &Site, markdown: &[u8], mode: Mode) -> Result<RenderedPage, RenderError> {
    let backend = RustBackend::new();
    Renderer::new(site, &backend, mode).render(markdown)
}
