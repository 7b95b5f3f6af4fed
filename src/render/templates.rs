//! HTML markup for everything the renderer emits itself.
//!
//! Uses maud for compile-time checked templates. Boxes and the page shell
//! open in one fragment and close in another, so those are assembled as
//! strings around maud-rendered pieces.

use super::boxes::BoxHeader;
use super::page::{PageHead, Payloads};
use crate::images::ImageDescriptor;
use crate::naming::{self, INDEX_PAGE};
use crate::types::{Mode, NavNode};
use maud::{DOCTYPE, Markup, PreEscaped, html};

pub const BOX_END: &str = "</div></div>\n";

const AMP_RUNTIME: &str = "https://cdn.ampproject.org/v0.js";
const AMP_SIDEBAR: &str = "https://cdn.ampproject.org/v0/amp-sidebar-0.1.js";
const AMP_IFRAME: &str = "https://cdn.ampproject.org/v0/amp-iframe-0.1.js";
const AMP_ANALYTICS: &str = "https://cdn.ampproject.org/v0/amp-analytics-0.1.js";

const FOOTER_DATE_FORMAT: &str = "%b %-d, %Y";

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn escape(s: &str) -> String {
    html! { (s) }.into_string()
}

// ============================================================================
// Images
// ============================================================================

/// Extra attributes for an image element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImgAttrs<'a> {
    pub id: Option<&'a str>,
    pub class: Option<&'a str>,
    /// AMP placeholder shown until the parent element loads.
    pub placeholder: bool,
}

pub fn img(d: &ImageDescriptor, mode: Mode, attrs: ImgAttrs<'_>) -> Markup {
    match mode {
        Mode::Amp => amp_img(d, attrs),
        Mode::NonAmp => nonamp_img(d, attrs),
    }
}

/// Blur filter applied to placeholder thumbnails; defined once per page.
fn thumb_filter() -> Markup {
    html! {
        filter id="thumb-filter" {
            feGaussianBlur stdDeviation="12" {}
            feComponentTransfer {
                feFuncA type="discrete" tableValues="1 1" {}
            }
        }
    }
}

fn nonamp_img(d: &ImageDescriptor, attrs: ImgAttrs<'_>) -> Markup {
    let (src, srcset) = match &d.fallback {
        Some(fb) => (fb.src.as_str(), fb.srcset.as_str()),
        None => (d.src.as_str(), d.srcset.as_str()),
    };
    let picture = html! {
        picture {
            @if d.fallback.is_some() {
                source type="image/webp" sizes=[non_empty(&d.sizes)] srcset=(d.srcset);
            }
            img id=[attrs.id] class=[attrs.class] src=(src) sizes=[non_empty(&d.sizes)]
                srcset=[non_empty(srcset)] width=(d.width) height=(d.height) alt=(d.alt)
                loading=[d.lazy.then_some("lazy")];
        }
    };
    match &d.thumb {
        None => picture,
        Some(thumb) => html! {
            span.img-wrapper {
                svg width="100%" height="100%" viewBox={ "0 0 " (d.width) " " (d.height) } {
                    @if d.define_thumb_filter {
                        (thumb_filter())
                    }
                    image href=(thumb) width=(d.width) height=(d.height)
                        filter="url(#thumb-filter)" preserveAspectRatio="none" {}
                }
                (picture)
            }
        },
    }
}

fn amp_img(d: &ImageDescriptor, attrs: ImgAttrs<'_>) -> Markup {
    let layout = d.layout.name();
    html! {
        amp-img id=[attrs.id] class=[attrs.class] placeholder[attrs.placeholder] layout=(layout)
            src=(d.src) sizes=[non_empty(&d.sizes)] srcset=[non_empty(&d.srcset)]
            width=(d.width) height=(d.height) alt=(d.alt) {
            @if let Some(fb) = &d.fallback {
                amp-img fallback layout=(layout) src=(fb.src) sizes=[non_empty(&d.sizes)]
                    srcset=[non_empty(&fb.srcset)] width=(d.width) height=(d.height) alt=(d.alt) {}
            }
            @if let Some(thumb) = &d.thumb {
                amp-img.thumb placeholder layout=(layout) src=(thumb)
                    width=(d.width) height=(d.height) alt=(d.alt) {}
            }
        }
    }
}

// ============================================================================
// Blocks
// ============================================================================

pub fn clear() -> Markup {
    html! { div.clear {} }
}

/// `caption` is raw HTML so authors can put links and emphasis in it.
pub fn figure(classes: &str, caption: Option<&str>, inner: Markup) -> Markup {
    html! {
        figure class=[non_empty(classes)] {
            (inner)
            @if let Some(caption) = caption {
                figcaption { (PreEscaped(caption)) }
            }
        }
    }
}

/// Image optionally linking to `href`.
pub fn linked(href: Option<&str>, inner: Markup) -> Markup {
    html! {
        @if let Some(href) = href {
            a href=(href) { (inner) }
        } @else {
            (inner)
        }
    }
}

pub fn graph(mode: Mode, src: &str, width: u32, height: u32) -> Markup {
    match mode {
        Mode::Amp => html! {
            amp-iframe.graph width=(width) height=(height) layout="responsive" frameborder="0"
                sandbox="allow-scripts" src=(src) {}
        },
        Mode::NonAmp => html! {
            iframe.graph width=(width) height=(height)
                sandbox="allow-same-origin allow-scripts" src=(src) {}
        },
    }
}

pub fn map(mode: Mode, src: &str, width: u32, height: u32, placeholder: Option<Markup>) -> Markup {
    html! {
        div.mapbox {
            @match mode {
                Mode::Amp => {
                    amp-iframe id="map" width=(width) height=(height) layout="responsive"
                        frameborder="0" referrerpolicy="unsafe-url"
                        sandbox="allow-scripts allow-top-navigation" src=(src) {
                        @if let Some(placeholder) = placeholder {
                            (placeholder)
                        }
                    }
                }
                Mode::NonAmp => {
                    iframe id="map" width=(width) height=(height) referrerpolicy="unsafe-url"
                        sandbox="allow-same-origin allow-scripts allow-top-navigation" src=(src) {}
                }
            }
        }
    }
}

// ============================================================================
// Boxes
// ============================================================================

pub fn box_start(header: &BoxHeader, mode: Mode) -> String {
    let a = &header.attrs;
    let mut class = String::from("box");
    if a.narrow {
        class.push_str(" desktop-narrow");
    }
    if a.desktop_only {
        class.push_str(" desktop-only");
    }
    if a.mobile_only {
        class.push_str(" mobile-only");
    }
    let title = html! {
        h1.title {
            @if let Some(label) = &header.map_label {
                span.location-label { (label) } " "
            }
            (PreEscaped(&header.title))
            @if header.map_label.is_some() {
                " (" a.map-link href=[mode.is_amp().then_some("#map")] { "map" } ")"
            }
        }
    };
    let id = if a.id.is_empty() {
        String::new()
    } else {
        format!(" id=\"{}\"", escape(&a.id))
    };
    format!(
        "<div class=\"{class}\"{id}>{}<div class=\"body\">\n",
        title.into_string()
    )
}

// ============================================================================
// Page shell
// ============================================================================

fn nav_item(node: &NavNode<'_>, mode: Mode) -> Markup {
    html! {
        li {
            @if node.current {
                span.selected { (node.item.name) }
            } @else {
                a href=(node.item.url_for(mode)) { (node.item.name) }
            }
            @if node.expanded && !node.children.is_empty() {
                ul {
                    @for child in &node.children {
                        (nav_item(child, mode))
                    }
                }
            }
        }
    }
}

fn nav_box(head: &PageHead<'_>) -> Markup {
    html! {
        div.box.nav-box {
            div.title { (head.config.nav_text) }
            div.body {
                ul class=[head.collapse_nav.then_some("collapsed-mobile")] {
                    @for node in &head.nav {
                        (nav_item(node, head.mode))
                    }
                }
            }
        }
    }
}

fn logo(head: &PageHead<'_>) -> Markup {
    let home = match head.mode {
        Mode::Amp => naming::amp_page(INDEX_PAGE).unwrap_or_default(),
        Mode::NonAmp => INDEX_PAGE.to_string(),
    };
    html! {
        @if let Some(logo) = &head.logo {
            a href=(home) {
                (img(logo, head.mode, ImgAttrs { id: Some("nav-logo"), ..ImgAttrs::default() }))
            }
        }
    }
}

fn analytics(code: &str) -> String {
    serde_json::json!({
        "vars": { "account": code },
        "triggers": {
            "trackPageview": { "on": "visible", "request": "pageview" }
        }
    })
    .to_string()
}

fn head_markup(head: &PageHead<'_>) -> Markup {
    let m = &head.meta;
    let front = &head.front;
    let ga = &head.config.google_analytics_code;
    html! {
        head {
            meta charset="utf-8";
            link rel=(m.link_rel) href=(m.link_href);
            @if let Some(csp) = &m.csp_tag {
                (PreEscaped(csp))
            }
            meta name="viewport" content="width=device-width, initial-scale=1, minimum-scale=1";
            meta name="description" content=(m.description);
            title { (m.title) }
            script type="application/ld+json" { (PreEscaped(&m.json_ld)) }
            @match &m.payloads {
                Payloads::Amp { boilerplate, noscript, custom } => {
                    style amp-boilerplate { (PreEscaped(boilerplate)) }
                    noscript {
                        style amp-boilerplate { (PreEscaped(noscript)) }
                    }
                    style amp-custom { (PreEscaped(custom)) }
                    script async custom-element="amp-sidebar" src=(AMP_SIDEBAR) {}
                    @if front.has_graph || front.has_map {
                        script async custom-element="amp-iframe" src=(AMP_IFRAME) {}
                    }
                    @if !ga.is_empty() {
                        script async custom-element="amp-analytics" src=(AMP_ANALYTICS) {}
                    }
                    script async src=(AMP_RUNTIME) {}
                }
                Payloads::NonAmp { style, scripts } => {
                    style { (PreEscaped(style)) }
                    @for script in scripts {
                        script { (PreEscaped(script)) }
                    }
                }
            }
        }
    }
}

fn header_markup(head: &PageHead<'_>) -> Markup {
    let ga = &head.config.google_analytics_code;
    html! {
        @if head.mode.is_amp() {
            @if !ga.is_empty() {
                amp-analytics type="googleanalytics" {
                    script type="application/json" { (PreEscaped(analytics(ga))) }
                }
            }
            amp-sidebar id="sidebar" layout="nodisplay" side="right" {
                (nav_box(head))
            }
            header id="top" {
                (logo(head))
                div id="menu-button" role="button" tabindex="0" on="tap:sidebar.open" { "Menu" }
            }
        } @else {
            header id="top" {
                nav {
                    (logo(head))
                    (nav_box(head))
                }
            }
        }
    }
}

/// Everything up to and including the opening `<main>`.
pub fn page_start(head: &PageHead<'_>) -> String {
    let (html_open, body_open) = match head.mode {
        Mode::Amp => (
            "<html amp lang=\"en\">",
            "<body data-amp-auto-lightbox-disable>",
        ),
        Mode::NonAmp => ("<html lang=\"en\">", "<body>"),
    };
    let doctype = html! { (DOCTYPE) };
    format!(
        "{}\n{html_open}{}{body_open}{}<main>\n",
        doctype.into_string(),
        head_markup(head).into_string(),
        header_markup(head).into_string(),
    )
}

/// Everything after the closing of the body content.
pub fn page_end(head: &PageHead<'_>) -> String {
    let f = &head.front;
    let back_to_top = !f.hide_back_to_top;
    let (created, modified) = if f.hide_dates {
        (None, None)
    } else {
        (f.created, f.modified)
    };
    let footer = html! {
        @if back_to_top || created.is_some() || modified.is_some() {
            footer {
                @if back_to_top {
                    div.back-to-top { a href="#top" { "Back to top" } }
                }
                @if created.is_some() || modified.is_some() {
                    p.dates {
                        @if let Some(c) = created {
                            @let year = c.format("%Y").to_string();
                            "Page created in " time datetime=(year) { (year) } "."
                        }
                        @if created.is_some() && modified.is_some() {
                            " "
                        }
                        @if let Some(m) = modified {
                            "Last modified "
                            time datetime=(m.format(super::page::DATE_FORMAT).to_string()) {
                                (m.format(FOOTER_DATE_FORMAT).to_string())
                            }
                            "."
                        }
                    }
                }
            }
        }
    };
    format!("</main>{}</body></html>\n", footer.into_string())
}
