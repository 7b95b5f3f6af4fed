//! Inline text and pseudo-element substitution.

use super::context::PageContext;
use super::templates::{self, ImgAttrs};
use super::{RenderError, Renderer};
use crate::images::{ImageOptions, Layout};
use crate::imaging::ImageBackend;
use crate::pseudo::{self, Pseudo};
use pulldown_cmark::{CowStr, Event, html};

fn render_one(event: Event<'_>) -> String {
    let mut out = String::new();
    html::push_html(&mut out, std::iter::once(event));
    out
}

/// Escaped text with literal quotes and named em-dashes.
pub fn text(s: &str) -> String {
    render_one(Event::Text(CowStr::Borrowed(s)))
        .replace("&quot;", "\"")
        .replace('\u{2014}', "&mdash;")
}

/// A code span with literal quotes.
pub fn code(s: &str) -> String {
    render_one(Event::Code(CowStr::Borrowed(s))).replace("&quot;", "\"")
}

impl<'s, B: ImageBackend> Renderer<'s, B> {
    /// Replace the pseudo-element tag `src` with its output.
    pub(super) fn pseudo(&self, ctx: &mut PageContext<'_>, src: &str) -> Result<(), RenderError> {
        let src = src.trim();
        let tag = Pseudo::parse(src).map_err(|source| RenderError::Span {
            span: src.to_string(),
            source,
        })?;
        let html = match tag {
            Pseudo::ClearFloats => templates::clear().into_string(),
            Pseudo::CodeUrlStart => "<code class=\"url\">".to_string(),
            Pseudo::CodeUrlEnd => "</code>".to_string(),
            Pseudo::ImgInline(spec) => {
                let opts = ImageOptions {
                    layout: Layout::Fixed,
                };
                let desc = self.images.resolve(&spec, opts, &mut ctx.thumbs)?;
                let attrs = ImgAttrs {
                    class: Some("inline"),
                    ..ImgAttrs::default()
                };
                templates::img(&desc, self.mode, attrs).into_string()
            }
            Pseudo::OnlyStart(mode) if mode != self.mode => {
                format!("<!-- {}-only content \n", mode.name())
            }
            Pseudo::OnlyEnd(mode) if mode != self.mode => "\n-->".to_string(),
            Pseudo::OnlyStart(_) | Pseudo::OnlyEnd(_) => String::new(),
            Pseudo::TextSizeStart(size) => format!("<span class=\"{}\">", size.class()),
            Pseudo::TextSizeEnd => "</span>".to_string(),
        };
        ctx.push_html(html);
        Ok(())
    }

    /// A raw HTML block: pseudo-element lines are substituted, other lines
    /// pass through.
    pub(super) fn html_block(&self, ctx: &mut PageContext<'_>, src: &str) -> Result<(), RenderError> {
        for line in src.split_inclusive('\n') {
            if pseudo::is_pseudo(line.trim()) {
                self.pseudo(ctx, line)?;
                if line.ends_with('\n') {
                    ctx.push_html("\n".to_string());
                }
            } else {
                ctx.push_html(line.to_string());
            }
        }
        Ok(())
    }
}
