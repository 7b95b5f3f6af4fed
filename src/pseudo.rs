//! Pseudo-elements: the fixed set of HTML-looking tags authors may write
//! inline.
//!
//! | Tag | Meaning |
//! |---|---|
//! | `<clear-floats>` | stop floating figures from wrapping further content |
//! | `<code-url>…</code-url>` | monospace URL that may break anywhere |
//! | `<img-inline path=… alt=…>` | image inside running text |
//! | `<only-amp>…</only-amp>` | content for the AMP variant only |
//! | `<only-nonamp>…</only-nonamp>` | content for the non-AMP variant only |
//! | `<text-size small>…</text-size>` | smaller text (`small` or `tiny`) |
//!
//! Anything else in a raw HTML span is an error. Attributes are parsed into
//! typed values per tag; unknown or repeated attributes are errors too.

use crate::images::ImageSpec;
use crate::types::Mode;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TagError {
    #[error("malformed tag {0:?}")]
    Syntax(String),
    #[error("unknown element <{0}>")]
    Unknown(String),
    #[error("<{tag}> has unknown attribute {attr:?}")]
    UnknownAttr { tag: &'static str, attr: String },
    #[error("<{tag}> has attribute {attr:?} more than once")]
    DuplicateAttr { tag: &'static str, attr: String },
    #[error("<{tag}> attribute {attr:?} needs a value")]
    MissingValue { tag: &'static str, attr: String },
    #[error("<{tag}> attribute {attr:?} has bad value {value:?}")]
    BadValue {
        tag: &'static str,
        attr: String,
        value: String,
    },
    #[error("<text-size> needs \"small\" or \"tiny\"")]
    MissingSize,
    #[error("</{0}> is not allowed")]
    StrayEnd(&'static str),
}

/// A tag as written: name, end-tag flag and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTag<'a> {
    pub name: &'a str,
    pub closing: bool,
    /// Attributes in source order. Boolean attributes have no value.
    pub attrs: Vec<(&'a str, Option<String>)>,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Tokenize a single tag such as `<img-inline path="a.png" lazy>`.
pub fn parse_tag(src: &str) -> Result<RawTag<'_>, TagError> {
    let syntax = || TagError::Syntax(src.to_string());
    let inner = src
        .trim()
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(syntax)?;
    let inner = inner.strip_suffix('/').unwrap_or(inner);
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let bytes = inner.as_bytes();
    let name_end = bytes
        .iter()
        .position(|&b| !is_name_byte(b))
        .unwrap_or(bytes.len());
    if name_end == 0 {
        return Err(syntax());
    }
    let name = &inner[..name_end];
    let mut attrs = Vec::new();
    let mut i = name_end;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i == bytes.len() {
            break;
        }
        let start = i;
        while i < bytes.len() && is_name_byte(bytes[i]) {
            i += 1;
        }
        if start == i {
            return Err(syntax());
        }
        let attr = &inner[start..i];
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            let value = match bytes.get(i) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    let close = inner[i + 1..]
                        .find(q as char)
                        .ok_or_else(syntax)?;
                    let v = &inner[i + 1..i + 1 + close];
                    i += close + 2;
                    v
                }
                Some(_) => {
                    let v_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    &inner[v_start..i]
                }
                None => return Err(syntax()),
            };
            attrs.push((attr, Some(value.replace(['\r', '\n'], " "))));
        } else if i == bytes.len() || bytes[i].is_ascii_whitespace() {
            attrs.push((attr, None));
        } else {
            return Err(syntax());
        }
    }

    if closing && !attrs.is_empty() {
        return Err(syntax());
    }
    Ok(RawTag {
        name,
        closing,
        attrs,
    })
}

/// Names of all pseudo-elements.
pub const NAMES: [&str; 6] = [
    "clear-floats",
    "code-url",
    "img-inline",
    "only-amp",
    "only-nonamp",
    "text-size",
];

/// Whether `src` is a single tag naming a pseudo-element. Lines of raw HTML
/// blocks that aren't pass through untouched.
pub fn is_pseudo(src: &str) -> bool {
    parse_tag(src).is_ok_and(|raw| NAMES.contains(&raw.name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Tiny,
}

impl TextSize {
    pub fn class(self) -> &'static str {
        match self {
            TextSize::Small => "small",
            TextSize::Tiny => "real-small",
        }
    }
}

/// A recognized pseudo-element tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Pseudo {
    ClearFloats,
    CodeUrlStart,
    CodeUrlEnd,
    ImgInline(ImageSpec),
    /// Start of content shown only in the given mode.
    OnlyStart(Mode),
    OnlyEnd(Mode),
    TextSizeStart(TextSize),
    TextSizeEnd,
}

/// Checks attribute sets against what a tag accepts.
struct Attrs<'a> {
    tag: &'static str,
    attrs: Vec<(&'a str, Option<String>)>,
}

impl<'a> Attrs<'a> {
    fn new(
        tag: &'static str,
        attrs: Vec<(&'a str, Option<String>)>,
        allowed: &[&str],
    ) -> Result<Self, TagError> {
        for (n, (attr, _)) in attrs.iter().enumerate() {
            if !allowed.contains(attr) {
                return Err(TagError::UnknownAttr {
                    tag,
                    attr: attr.to_string(),
                });
            }
            if attrs[..n].iter().any(|(a, _)| a == attr) {
                return Err(TagError::DuplicateAttr {
                    tag,
                    attr: attr.to_string(),
                });
            }
        }
        Ok(Self { tag, attrs })
    }

    fn flag(&self, name: &str) -> bool {
        self.attrs.iter().any(|(a, _)| *a == name)
    }

    fn string(&self, name: &str) -> Result<Option<String>, TagError> {
        match self.attrs.iter().find(|(a, _)| *a == name) {
            None => Ok(None),
            Some((_, Some(v))) => Ok(Some(v.clone())),
            Some((_, None)) => Err(TagError::MissingValue {
                tag: self.tag,
                attr: name.to_string(),
            }),
        }
    }

    fn number(&self, name: &str) -> Result<Option<u32>, TagError> {
        self.string(name)?
            .map(|v| {
                v.parse().map_err(|_| TagError::BadValue {
                    tag: self.tag,
                    attr: name.to_string(),
                    value: v,
                })
            })
            .transpose()
    }
}

fn no_attrs(tag: &'static str, raw: &RawTag<'_>) -> Result<(), TagError> {
    Attrs::new(tag, raw.attrs.clone(), &[]).map(|_| ())
}

impl Pseudo {
    /// Parse `src` (one raw HTML span) into a pseudo-element.
    pub fn parse(src: &str) -> Result<Pseudo, TagError> {
        let raw = parse_tag(src)?;
        let closing = raw.closing;
        match raw.name {
            "clear-floats" => {
                if closing {
                    return Err(TagError::StrayEnd("clear-floats"));
                }
                no_attrs("clear-floats", &raw)?;
                Ok(Pseudo::ClearFloats)
            }
            "code-url" => {
                no_attrs("code-url", &raw)?;
                Ok(if closing {
                    Pseudo::CodeUrlEnd
                } else {
                    Pseudo::CodeUrlStart
                })
            }
            "img-inline" => {
                if closing {
                    return Err(TagError::StrayEnd("img-inline"));
                }
                let a = Attrs::new(
                    "img-inline",
                    raw.attrs,
                    &["path", "url", "width", "height", "alt", "lazy"],
                )?;
                Ok(Pseudo::ImgInline(ImageSpec {
                    path: a.string("path")?,
                    url: a.string("url")?,
                    width: a.number("width")?,
                    height: a.number("height")?,
                    alt: a.string("alt")?.unwrap_or_default(),
                    lazy: a.flag("lazy"),
                    sizes: None,
                }))
            }
            "only-amp" | "only-nonamp" => {
                let mode = if raw.name == "only-amp" {
                    Mode::Amp
                } else {
                    Mode::NonAmp
                };
                no_attrs(
                    if mode.is_amp() { "only-amp" } else { "only-nonamp" },
                    &raw,
                )?;
                Ok(if closing {
                    Pseudo::OnlyEnd(mode)
                } else {
                    Pseudo::OnlyStart(mode)
                })
            }
            "text-size" => {
                let a = Attrs::new("text-size", raw.attrs, &["small", "tiny"])?;
                if closing {
                    return Ok(Pseudo::TextSizeEnd);
                }
                if a.flag("small") {
                    Ok(Pseudo::TextSizeStart(TextSize::Small))
                } else if a.flag("tiny") {
                    Ok(Pseudo::TextSizeStart(TextSize::Tiny))
                } else {
                    Err(TagError::MissingSize)
                }
            }
            other => Err(TagError::Unknown(other.to_string())),
        }
    }
}
