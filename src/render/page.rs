//! Front matter and everything fixed before the body is walked.
//!
//! The page head is complete before the first body node is rendered: the
//! CSP tag hashes the exact inline style and script bytes, so those payloads
//! can't change afterwards.
//!
//! Inline payloads, read from `inline/`:
//!
//! | Mode | Styles | Scripts |
//! |---|---|---|
//! | AMP | boilerplate, noscript boilerplate, `base.css` + `mobile.css` + `mobile-amp.css` | none |
//! | non-AMP | `base.css` + `base-nonamp.css` + desktop/mobile media blocks | `base.js`, `map.js` on map pages |

use super::{RenderError, Renderer};
use crate::config::SiteConfig;
use crate::csp::{self, CspBuilder, Directive};
use crate::images::{ImageDescriptor, ImageOptions, ImageSpec, Layout, ThumbnailCache};
use crate::imaging::ImageBackend;
use crate::naming::{self, INDEX_ID, INDEX_PAGE};
use crate::structured_data::{ImageObject, StructuredData};
use crate::types::{Mode, NavItem, NavNode, annotate};
use chrono::NaiveDate;
use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const AMP_BOILERPLATE: &str = "body{-webkit-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-moz-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-ms-animation:-amp-start 8s steps(1,end) 0s 1 normal both;animation:-amp-start 8s steps(1,end) 0s 1 normal both}@-webkit-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-moz-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-ms-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-o-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}";
const AMP_BOILERPLATE_NOSCRIPT: &str =
    "body{-webkit-animation:none;-moz-animation:none;-ms-animation:none;animation:none}";

/// The leading `page` block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrontMatter {
    pub title: String,
    pub id: String,
    #[serde(default)]
    pub desc: String,
    /// Image for structured data: a static path or absolute URL.
    #[serde(default)]
    pub img_url: String,
    #[serde(default)]
    pub img_width: u32,
    #[serde(default)]
    pub img_height: u32,
    #[serde(default, deserialize_with = "date")]
    pub created: Option<NaiveDate>,
    #[serde(default, deserialize_with = "date")]
    pub modified: Option<NaiveDate>,
    #[serde(default)]
    pub hide_title_suffix: bool,
    #[serde(default)]
    pub hide_back_to_top: bool,
    #[serde(default)]
    pub hide_dates: bool,
    #[serde(default)]
    pub has_map: bool,
    #[serde(default)]
    pub has_graph: bool,
}

fn date<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveDate>, D::Error> {
    let s = String::deserialize(de)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT)
        .map(Some)
        .map_err(|e| D::Error::custom(format!("bad date {s:?} (want YYYY-MM-DD): {e}")))
}

impl FrontMatter {
    pub fn parse(src: &str) -> Result<Self, RenderError> {
        toml::from_str(src).map_err(RenderError::FrontMatter)
    }
}

/// Inline styles and scripts, in the order they appear in the head.
#[derive(Debug, Clone, PartialEq)]
pub enum Payloads {
    Amp {
        boilerplate: String,
        noscript: String,
        custom: String,
    },
    NonAmp {
        style: String,
        scripts: Vec<String>,
    },
}

impl Payloads {
    pub fn styles(&self) -> Vec<&str> {
        match self {
            Payloads::Amp {
                boilerplate,
                noscript,
                custom,
            } => vec![boilerplate, noscript, custom],
            Payloads::NonAmp { style, .. } => vec![style],
        }
    }

    pub fn scripts(&self) -> Vec<&str> {
        match self {
            Payloads::Amp { .. } => Vec::new(),
            Payloads::NonAmp { scripts, .. } => scripts.iter().map(String::as_str).collect(),
        }
    }
}

/// Metadata handed to whoever embeds the page.
#[derive(Debug, Clone)]
pub struct PageMeta {
    /// Title including the site suffix.
    pub title: String,
    pub description: String,
    pub structured_data: StructuredData,
    /// `structured_data` as embedded in the page.
    pub json_ld: String,
    /// `canonical` on AMP pages, `amphtml` on the others.
    pub link_rel: &'static str,
    pub link_href: String,
    /// Absent on AMP pages.
    pub csp_tag: Option<String>,
    pub payloads: Payloads,
}

/// Everything the page chrome needs.
pub struct PageHead<'s> {
    pub mode: Mode,
    pub front: FrontMatter,
    pub meta: PageMeta,
    pub config: &'s SiteConfig,
    pub nav: Vec<NavNode<'s>>,
    /// Hide the nav list on phones: the page is a leaf.
    pub collapse_nav: bool,
    pub logo: Option<ImageDescriptor>,
}

/// Non-AMP policy covering exactly `style` and `scripts`.
fn csp_tag(style: &str, scripts: &[String]) -> String {
    let mut policy = CspBuilder::new();
    policy.add_source(Directive::Default, csp::NONE);
    policy.add_source(Directive::Child, csp::SELF);
    policy.add_source(Directive::Img, csp::SELF);
    policy.add_source(Directive::Img, csp::DATA);
    policy.add_hash(Directive::Style, style.as_bytes());
    for script in scripts {
        policy.add_hash(Directive::Script, script.as_bytes());
    }
    policy.tag()
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl<'s, B: ImageBackend> Renderer<'s, B> {
    pub(super) fn prepare(
        &self,
        front: FrontMatter,
        thumbs: &mut ThumbnailCache,
    ) -> Result<PageHead<'s>, RenderError> {
        let site = self.site;
        let config = &site.config;
        let is_index = front.id == INDEX_ID;
        let (page_url, amp_url, has_children) = if is_index {
            let amp = naming::amp_page(INDEX_PAGE).unwrap_or_default();
            (INDEX_PAGE.to_string(), amp, true)
        } else {
            let item = NavItem::find_id(&config.nav_items, &front.id)
                .ok_or_else(|| RenderError::UnknownPage(front.id.clone()))?;
            (
                item.page_url().to_string(),
                item.amp_url(),
                !item.children.is_empty(),
            )
        };

        let canonical = site.abs_url(&page_url);
        let (link_rel, link_href) = match self.mode {
            Mode::Amp => ("canonical", canonical.clone()),
            Mode::NonAmp => ("amphtml", site.abs_url(&amp_url)),
        };

        let structured_data = self.structured_data(&front, canonical)?;
        let json_ld = structured_data.to_json()?;

        let description = if front.desc.is_empty() {
            config.default_desc.clone()
        } else {
            front.desc.clone()
        };
        let mut title = front.title.clone();
        if !front.hide_title_suffix {
            title.push_str(&config.title_suffix);
        }

        let payloads = self.payloads(&front)?;
        let csp_tag = match &payloads {
            Payloads::NonAmp { style, scripts } => Some(csp_tag(style, scripts)),
            Payloads::Amp { .. } => None,
        };
        let logo = self.logo(thumbs)?;
        debug!("prepared {} head for page {:?}", self.mode.name(), front.id);

        Ok(PageHead {
            mode: self.mode,
            nav: annotate(&config.nav_items, &front.id),
            collapse_nav: !has_children,
            front,
            meta: PageMeta {
                title,
                description,
                structured_data,
                json_ld,
                link_rel,
                link_href,
                csp_tag,
                payloads,
            },
            config,
            logo,
        })
    }

    fn structured_data(
        &self,
        front: &FrontMatter,
        url: String,
    ) -> Result<StructuredData, RenderError> {
        let site = self.site;
        let config = &site.config;
        let published = front
            .created
            .or(front.modified)
            .map(format_date)
            .unwrap_or_default();
        let mut sd = StructuredData::article(url, front.title.clone(), published);
        if !front.desc.is_empty() && front.desc != config.default_desc {
            sd.description = Some(front.desc.clone());
        }
        sd.date_modified = front.modified.map(format_date);
        sd.author.name = config.author_name.clone();
        sd.author.email = config.author_email.clone();
        sd.publisher.name = config.publisher_name.clone();
        sd.publisher.url = config.base_url.clone();
        sd.publisher.logo = site
            .publisher_logo
            .as_ref()
            .map(|logo| ImageObject::new(logo.url.clone(), logo.width, logo.height));

        if !front.img_url.is_empty() && front.img_width > 0 && front.img_height > 0 {
            if !naming::has_scheme(&front.img_url) {
                site.check_static(&front.img_url)?;
            }
            sd.image = Some(ImageObject::new(
                site.abs_url(&front.img_url),
                front.img_width,
                front.img_height,
            ));
        }
        Ok(sd)
    }

    fn payloads(&self, front: &FrontMatter) -> Result<Payloads, RenderError> {
        let read = |name: &str| self.site.read_inline(name);
        Ok(match self.mode {
            Mode::Amp => Payloads::Amp {
                boilerplate: AMP_BOILERPLATE.to_string(),
                noscript: AMP_BOILERPLATE_NOSCRIPT.to_string(),
                custom: [read("base.css")?, read("mobile.css")?, read("mobile-amp.css")?].concat(),
            },
            Mode::NonAmp => {
                let max = self.site.config.mobile_max_width;
                let style = format!(
                    "{}{}@media(min-width:{}px){{{}}}@media(max-width:{}px){{{}}}",
                    read("base.css")?,
                    read("base-nonamp.css")?,
                    max.saturating_add(1),
                    read("desktop.css")?,
                    max,
                    read("mobile.css")?,
                );
                let mut scripts = vec![read("base.js")?];
                if front.has_map {
                    scripts.push(read("map.js")?);
                }
                scripts.retain(|s| !s.is_empty());
                Payloads::NonAmp { style, scripts }
            }
        })
    }

    fn logo(&self, thumbs: &mut ThumbnailCache) -> Result<Option<ImageDescriptor>, RenderError> {
        let config = &self.site.config;
        let path = config.logo_for(self.mode.is_amp());
        if path.is_empty() {
            return Ok(None);
        }
        let spec = ImageSpec {
            path: Some(path.to_string()),
            alt: config.logo_alt.clone(),
            ..ImageSpec::default()
        };
        let opts = ImageOptions {
            layout: Layout::Fixed,
        };
        let mut logo = self.images.resolve(&spec, opts, thumbs)?;
        // A second size that isn't the 2x file is the phone-sized logo.
        if !self.mode.is_amp()
            && let [smallest, second, ..] = logo.widths[..]
            && smallest.checked_mul(2) != Some(second)
        {
            logo.sizes = format!(
                "(max-width: {}px) {second}px, {}",
                config.mobile_max_width, logo.sizes
            );
        }
        Ok(Some(logo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::hash_source;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::MockBackend;
    use crate::render::ErrorKind;
    use crate::test_helpers::*;

    fn head(fx: &SiteFixture, mode: Mode, front: &str) -> Result<PageMeta, RenderError> {
        let site = fx.site();
        let backend = MockBackend::new();
        let renderer = Renderer::new(&site, &backend, mode);
        let front = FrontMatter::parse(front)?;
        let head = renderer.prepare(front, &mut ThumbnailCache::default())?;
        Ok(head.meta)
    }

    // =========================================================================
    // Front matter
    // =========================================================================

    #[test]
    fn parses_dates_and_flags() {
        let f = FrontMatter::parse(
            "title = \"T\"\nid = \"t\"\ncreated = \"2019-05-06\"\nhas_map = true\n",
        )
        .unwrap();
        assert_eq!(f.created, NaiveDate::from_ymd_opt(2019, 5, 6));
        assert_eq!(f.modified, None);
        assert!(f.has_map);
    }

    #[test]
    fn rejects_bad_front_matter() {
        for bad in [
            "id = \"t\"\n",
            "title = \"T\"\nid = \"t\"\ncreated = \"May 6\"\n",
            "title = \"T\"\nid = \"t\"\ncolour = \"red\"\n",
        ] {
            let err = FrontMatter::parse(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedInput, "{bad}");
        }
    }

    // =========================================================================
    // Head metadata
    // =========================================================================

    #[test]
    fn index_uses_default_description_and_mode_link_rel() {
        let fx = SiteFixture::new();
        let front = "title = \"Home\"\nid = \"index\"\n";

        let nonamp = head(&fx, Mode::NonAmp, front).unwrap();
        assert_eq!(nonamp.description, "Default description.");
        assert_eq!(nonamp.structured_data.description, None);
        assert_eq!(nonamp.link_rel, "amphtml");
        assert_eq!(nonamp.link_href, format!("{BASE_URL}index.amp.html"));
        assert_eq!(nonamp.title, "Home - Example");

        let amp = head(&fx, Mode::Amp, front).unwrap();
        assert_eq!(amp.link_rel, "canonical");
        assert_eq!(amp.link_href, BASE_URL);
        assert!(amp.csp_tag.is_none());
    }

    #[test]
    fn unknown_page_id_fails() {
        let fx = SiteFixture::new();
        let err = head(&fx, Mode::NonAmp, "title = \"X\"\nid = \"nowhere\"\n").unwrap_err();
        assert!(matches!(err, RenderError::UnknownPage(ref id) if id == "nowhere"));
        assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    }

    #[test]
    fn structured_data_fields() {
        let fx = SiteFixture::new();
        fx.png("static/share.png", 8, 8);
        let meta = head(
            &fx,
            Mode::NonAmp,
            "title = \"About\"\nid = \"about\"\ndesc = \"All about us.\"\n\
             created = \"2020-01-02\"\nmodified = \"2021-03-04\"\n\
             img_url = \"share.png\"\nimg_width = 1200\nimg_height = 630\n\
             hide_title_suffix = true\n",
        )
        .unwrap();
        let sd = &meta.structured_data;
        assert_eq!(sd.main_entity_of_page, format!("{BASE_URL}about.html"));
        assert_eq!(sd.headline, "About");
        assert_eq!(meta.title, "About");
        assert_eq!(sd.description.as_deref(), Some("All about us."));
        assert_eq!(sd.date_published, "2020-01-02");
        assert_eq!(sd.date_modified.as_deref(), Some("2021-03-04"));
        assert_eq!(sd.author.name, "Jo Example");
        let image = sd.image.as_ref().unwrap();
        assert_eq!(image.url, format!("{BASE_URL}share.png"));
        assert_eq!((image.width, image.height), (1200, 630));
    }

    #[test]
    fn structured_data_image_must_exist() {
        let fx = SiteFixture::new();
        let err = head(
            &fx,
            Mode::Amp,
            "title = \"A\"\nid = \"about\"\nimg_url = \"gone.png\"\nimg_width = 1\nimg_height = 1\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionFailure);
    }

    // =========================================================================
    // Payloads and CSP
    // =========================================================================

    #[test]
    fn nonamp_style_combines_inline_files() {
        let fx = SiteFixture::new();
        fx.write("inline/base.css", "body{margin:0}\n");
        fx.write("inline/base-nonamp.css", "p{color:red}");
        fx.write("inline/desktop.css", "main{width:50em}");
        fx.write("inline/mobile.css", "main{width:auto}");
        fx.write("inline/base.js", "  start();\n");
        fx.write("inline/map.js", "initMap();");
        let meta = head(&fx, Mode::NonAmp, "title = \"A\"\nid = \"about\"\n").unwrap();
        assert_eq!(
            meta.payloads.styles(),
            vec![
                "body{margin:0}p{color:red}@media(min-width:641px){main{width:50em}}\
                 @media(max-width:640px){main{width:auto}}"
            ]
        );
        assert_eq!(meta.payloads.scripts(), vec!["start();"]);

        let map = head(&fx, Mode::NonAmp, "title = \"A\"\nid = \"about\"\nhas_map = true\n")
            .unwrap();
        assert_eq!(map.payloads.scripts(), vec!["start();", "initMap();"]);
    }

    #[test]
    fn widest_mobile_breakpoint_does_not_overflow() {
        let fx = SiteFixture::new();
        fx.set_config("mobile_max_width = 4294967295");
        let meta = head(&fx, Mode::NonAmp, "title = \"A\"\nid = \"about\"\n").unwrap();
        assert_eq!(
            meta.payloads.styles(),
            vec!["@media(min-width:4294967295px){}@media(max-width:4294967295px){}"]
        );
    }

    #[test]
    fn logo_uses_second_size_on_phones() {
        let fx = SiteFixture::new();
        fx.set_config("logo_path = \"logo-*.webp\"\nlogo_alt = \"Example\"");
        fx.webp("static/logo-100.webp", 100, 40);
        fx.webp("static/logo-150.webp", 150, 60);
        fx.webp("static/logo-200.webp", 200, 80);
        let site = fx.site();
        let backend = RustBackend::new();

        let nonamp = Renderer::new(&site, &backend, Mode::NonAmp);
        let front = FrontMatter::parse("title = \"A\"\nid = \"about\"\n").unwrap();
        let logo = nonamp
            .prepare(front, &mut ThumbnailCache::default())
            .unwrap()
            .logo
            .unwrap();
        assert_eq!(logo.sizes, "(max-width: 640px) 150px, 100px");

        let amp = Renderer::new(&site, &backend, Mode::Amp);
        let front = FrontMatter::parse("title = \"A\"\nid = \"about\"\n").unwrap();
        let logo = amp
            .prepare(front, &mut ThumbnailCache::default())
            .unwrap()
            .logo
            .unwrap();
        assert_eq!(logo.sizes, "100px");
    }

    #[test]
    fn csp_hashes_exact_payload_bytes() {
        let fx = SiteFixture::new();
        fx.write("inline/base.css", "body{margin:0}");
        fx.write("inline/base.js", "alert('foo');");
        let meta = head(&fx, Mode::NonAmp, "title = \"A\"\nid = \"about\"\n").unwrap();
        let tag = meta.csp_tag.unwrap();
        let style_hash = hash_source(meta.payloads.styles()[0].as_bytes());
        assert!(tag.contains(&format!("style-src {style_hash} 'unsafe-inline'")));
        assert!(tag.contains(
            "script-src 'sha256-WOdSzz11/3cpqOdrm89LBL2UPwEU9EhbDtMy2OciEhs=' 'unsafe-inline'"
        ));
        assert!(tag.contains("default-src 'none'"));
        assert!(tag.contains("frame-src 'self'"));
        assert!(tag.contains("img-src 'self' data:"));
    }

    #[test]
    fn amp_payloads() {
        let fx = SiteFixture::new();
        fx.write("inline/base.css", "a{}");
        fx.write("inline/mobile.css", "b{}");
        fx.write("inline/mobile-amp.css", "c{}");
        let meta = head(&fx, Mode::Amp, "title = \"A\"\nid = \"about\"\n").unwrap();
        let styles = meta.payloads.styles();
        assert_eq!(styles.len(), 3);
        assert!(styles[0].contains("-amp-start"));
        assert_eq!(styles[2], "a{}b{}c{}");
        assert!(meta.payloads.scripts().is_empty());
    }
}
