//! CLI output formatting for `ampgen build`.
//!
//! # Information-First Display
//!
//! Each page leads with its positional index and rendered title; the source
//! file and the per-variant results are indented context lines. A page whose
//! renders all failed has no title and falls back to its file name in
//! parentheses.
//!
//! ```text
//! 001 About - Example
//!     Source: about.md
//!     non-AMP: about.html
//!     AMP: about.amp.html
//! 002 (broken.md)
//!     Source: broken.md
//!     non-AMP: failed (malformed input): bad HTML span "<blink>": ...
//!     AMP: failed (malformed input): bad HTML span "<blink>": ...
//!
//! Rendered 2 pages: 2 files written, 2 failed
//! ```
//!
//! Format functions are pure and return `Vec<String>`; `print_*` wrappers
//! write to stdout.

use crate::render::ErrorKind;
use crate::types::Mode;

/// Result of one variant of one page.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Written to the named output file.
    Written(String),
    /// `kind` is absent for I/O failures outside the renderer.
    Failed {
        kind: Option<ErrorKind>,
        message: String,
    },
}

/// Everything `build` learned about one page file.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReport {
    /// File name under `pages/`.
    pub source: String,
    /// Rendered title of the first successful variant.
    pub title: Option<String>,
    pub variants: Vec<(Mode, Outcome)>,
}

impl PageReport {
    pub fn failures(&self) -> usize {
        self.variants
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Failed { .. }))
            .count()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Titled pages show the title, untitled ones the file name in parens.
fn page_line(index: usize, title: Option<&str>, source: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), source),
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::MalformedInput => "malformed input",
        ErrorKind::ResolutionFailure => "unresolved reference",
        ErrorKind::CodecFailure => "undecodable image",
    }
}

fn outcome_line(mode: Mode, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Written(file) => format!("{}{}: {}", indent(1), mode.name(), file),
        Outcome::Failed {
            kind: Some(kind),
            message,
        } => format!(
            "{}{}: failed ({}): {}",
            indent(1),
            mode.name(),
            kind_label(*kind),
            message
        ),
        Outcome::Failed {
            kind: None,
            message,
        } => format!("{}{}: failed: {}", indent(1), mode.name(), message),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the results of a build, one entry per page plus a summary line.
pub fn format_build_output(reports: &[PageReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, report) in reports.iter().enumerate() {
        lines.push(page_line(i + 1, report.title.as_deref(), &report.source));
        lines.push(format!("{}Source: {}", indent(1), report.source));
        for (mode, outcome) in &report.variants {
            lines.push(outcome_line(*mode, outcome));
        }
    }

    let written: usize = reports
        .iter()
        .map(|r| r.variants.len() - r.failures())
        .sum();
    let failed = failure_count(reports);
    lines.push(String::new());
    let mut summary = format!(
        "Rendered {}: {} written",
        plural(reports.len(), "page"),
        plural(written, "file")
    );
    if failed > 0 {
        summary.push_str(&format!(", {failed} failed"));
    }
    lines.push(summary);
    lines
}

/// Failed variants across all pages.
pub fn failure_count(reports: &[PageReport]) -> usize {
    reports.iter().map(PageReport::failures).sum()
}

/// Print build output to stdout.
pub fn print_build_output(reports: &[PageReport]) {
    for line in format_build_output(reports) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn written(source: &str, title: &str) -> PageReport {
        let stem = source.trim_end_matches(".md");
        PageReport {
            source: source.to_string(),
            title: Some(title.to_string()),
            variants: vec![
                (Mode::NonAmp, Outcome::Written(format!("{stem}.html"))),
                (Mode::Amp, Outcome::Written(format!("{stem}.amp.html"))),
            ],
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn page_line_falls_back_to_source() {
        assert_eq!(page_line(1, Some("About"), "about.md"), "001 About");
        assert_eq!(page_line(2, None, "broken.md"), "002 (broken.md)");
        assert_eq!(page_line(3, Some(""), "empty.md"), "003 (empty.md)");
    }

    #[test]
    fn successful_build() {
        let reports = vec![
            written("about.md", "About - Example"),
            written("index.md", "Home"),
        ];
        let lines = format_build_output(&reports);
        assert_eq!(
            lines,
            vec![
                "001 About - Example",
                "    Source: about.md",
                "    non-AMP: about.html",
                "    AMP: about.amp.html",
                "002 Home",
                "    Source: index.md",
                "    non-AMP: index.html",
                "    AMP: index.amp.html",
                "",
                "Rendered 2 pages: 4 files written",
            ]
        );
        assert_eq!(failure_count(&reports), 0);
    }

    #[test]
    fn failures_are_labelled_by_kind() {
        let report = PageReport {
            source: "broken.md".to_string(),
            title: Some("Broken".to_string()),
            variants: vec![
                (Mode::NonAmp, Outcome::Written("broken.html".to_string())),
                (
                    Mode::Amp,
                    Outcome::Failed {
                        kind: Some(ErrorKind::ResolutionFailure),
                        message: "no static file \"a.png\"".to_string(),
                    },
                ),
            ],
        };
        let lines = format_build_output(std::slice::from_ref(&report));
        assert_eq!(
            lines[3],
            "    AMP: failed (unresolved reference): no static file \"a.png\""
        );
        assert_eq!(lines.last().unwrap(), "Rendered 1 page: 1 file written, 1 failed");
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn io_failure_has_no_kind() {
        let report = PageReport {
            source: "gone.md".to_string(),
            title: None,
            variants: vec![(
                Mode::NonAmp,
                Outcome::Failed {
                    kind: None,
                    message: "permission denied".to_string(),
                },
            )],
        };
        let lines = format_build_output(&[report]);
        assert_eq!(lines[0], "001 (gone.md)");
        assert_eq!(lines[2], "    non-AMP: failed: permission denied");
        assert_eq!(lines.last().unwrap(), "Rendered 1 page: 0 files written, 1 failed");
    }
}
