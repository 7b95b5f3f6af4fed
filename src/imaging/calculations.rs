//! Pure calculation functions for responsive image markup.
//!
//! These functions handle srcset strings, width-token matching and sizing
//! rules without touching the filesystem, so they are easy to test.
//!
//! ## Wildcard sets
//!
//! A multi-resolution image is written as a pattern with one `*` standing for
//! the pixel width of each file: `photo-*.jpg` matches `photo-400.jpg` and
//! `photo-800.jpg`. The display width defaults to the 1x file: the smallest
//! width, provided some other file is exactly twice as wide.

/// `url Nw` entries joined with `, `.
pub fn srcset<S: AsRef<str>>(entries: &[(S, u32)]) -> String {
    entries
        .iter()
        .map(|(url, w)| format!("{} {}w", url.as_ref(), w))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Width token of `name` if it is `prefix` + digits + `suffix`.
pub fn match_width(name: &str, prefix: &str, suffix: &str) -> Option<u32> {
    let digits = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Width of the 1x file among ascending `widths`: the smallest, if another
/// width is exactly double it.
pub fn reference_width(widths: &[u32]) -> Option<u32> {
    let (&smallest, rest) = widths.split_first()?;
    rest.iter()
        .any(|&w| smallest.checked_mul(2) == Some(w))
        .then_some(smallest)
}

/// Default `sizes` attribute. Multi-resolution images wider than a phone
/// screen fill the viewport on phones so smaller files get picked there.
pub fn default_sizes(width: u32, multi_res: bool, mobile_max_width: u32) -> String {
    if multi_res && width > mobile_max_width {
        format!("(max-width: {mobile_max_width}px) 100vw, {width}px")
    } else {
        format!("{width}px")
    }
}

/// Replace the extension of the last path segment of `path` with `ext`
/// (which includes the dot). Paths without an extension get `ext` appended.
pub fn with_extension(path: &str, ext: &str) -> String {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) => format!("{}{}", &path[..name_start + dot], ext),
        None => format!("{path}{ext}"),
    }
}

/// Whether `path` ends with `ext` (ASCII case-insensitive, `ext` includes the dot).
pub fn has_extension(path: &str, ext: &str) -> bool {
    path.len() >= ext.len()
        && path.is_char_boundary(path.len() - ext.len())
        && path[path.len() - ext.len()..].eq_ignore_ascii_case(ext)
}
