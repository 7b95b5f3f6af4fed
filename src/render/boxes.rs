//! Level-1 headings become boxes.
//!
//! ```text
//!            H1 enter                 H1 exit
//!  NoBox ───────────────▶ StartingBox ────────▶ InBox
//!                              ▲                  │
//!                              └──── H1 enter ────┘  (closes the open box first)
//! ```
//!
//! While starting a box, everything inside the heading is captured as the box
//! title. The heading id may carry slash-separated flags:
//! `# Hiking {#hiking/narrow/map_marker}`.
//!
//! Boxes never nest: at most one is open at a time.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HeadingError {
    #[error("unknown heading flag {0:?}")]
    UnknownFlag(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxState {
    #[default]
    NoBox,
    StartingBox,
    InBox,
}

/// Parsed `id/flag/flag` heading identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadingAttrs {
    pub id: String,
    pub desktop_only: bool,
    pub mobile_only: bool,
    pub narrow: bool,
    pub map_marker: bool,
}

impl HeadingAttrs {
    pub fn parse(raw: &str) -> Result<Self, HeadingError> {
        let mut parts = raw.split('/');
        let mut attrs = HeadingAttrs {
            id: parts.next().unwrap_or_default().to_string(),
            ..HeadingAttrs::default()
        };
        for flag in parts {
            match flag {
                "desktop_only" => attrs.desktop_only = true,
                "mobile_only" => attrs.mobile_only = true,
                "narrow" => attrs.narrow = true,
                "map_marker" => attrs.map_marker = true,
                other => return Err(HeadingError::UnknownFlag(other.to_string())),
            }
        }
        Ok(attrs)
    }
}

/// Label for the `n`th map marker: `A`…`Z`, then `AA`, `AB`, …
pub fn map_label(n: u32) -> String {
    let mut n = n as u64 + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        label.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Everything needed to emit a box header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxHeader {
    pub attrs: HeadingAttrs,
    /// Rendered HTML of the heading content.
    pub title: String,
    pub map_label: Option<String>,
}

#[derive(Debug, Default)]
pub struct BoxMachine {
    state: BoxState,
    map_markers: u32,
    /// Identifier of the heading being captured.
    pending_id: String,
}

impl BoxMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BoxState {
        self.state
    }

    /// Heading content goes to the title buffer rather than the page.
    pub fn capturing_title(&self) -> bool {
        self.state == BoxState::StartingBox
    }

    pub fn map_markers(&self) -> u32 {
        self.map_markers
    }

    /// A level-1 heading with identifier `raw_id` starts. Returns true if the
    /// open box must be closed first.
    pub fn enter_heading(&mut self, raw_id: &str) -> bool {
        let close = self.state == BoxState::InBox;
        self.state = BoxState::StartingBox;
        self.pending_id = raw_id.to_string();
        close
    }

    /// The heading ends; `title` is its rendered content.
    pub fn exit_heading(&mut self, title: String) -> Result<BoxHeader, HeadingError> {
        let attrs = HeadingAttrs::parse(&std::mem::take(&mut self.pending_id))?;
        let map_label = attrs.map_marker.then(|| {
            let label = map_label(self.map_markers);
            self.map_markers += 1;
            label
        });
        self.state = BoxState::InBox;
        Ok(BoxHeader {
            attrs,
            title,
            map_label,
        })
    }

    /// End of document. Returns true if a box is still open.
    pub fn finish(&mut self) -> bool {
        let close = self.state == BoxState::InBox;
        self.state = BoxState::NoBox;
        close
    }
}
