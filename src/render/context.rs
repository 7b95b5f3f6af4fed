//! Per-render state threaded through every dispatch.

use super::blocks::FigureAlign;
use super::boxes::BoxMachine;
use crate::images::ThumbnailCache;
use crate::types::Mode;
use pulldown_cmark::Event;

/// State of one render of one page in one mode. Never shared between renders.
pub struct PageContext<'a> {
    pub mode: Mode,
    pub boxes: BoxMachine,
    /// Events of the level-1 heading currently being turned into a box title.
    pub title: Vec<Event<'a>>,
    /// Events of the page body.
    pub body: Vec<Event<'a>>,
    pub thumbs: ThumbnailCache,
    /// Alignment of the most recent figure, for `desktop_alt`.
    pub last_figure_align: Option<FigureAlign>,
    /// Nesting depth of markdown images; their text is alt text.
    pub image_depth: usize,
    /// Front matter declared the iframe blocks this page may use.
    pub has_map: bool,
    pub has_graph: bool,
}

impl<'a> PageContext<'a> {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            boxes: BoxMachine::new(),
            title: Vec::new(),
            body: Vec::new(),
            thumbs: ThumbnailCache::default(),
            last_figure_align: None,
            image_depth: 0,
            has_map: false,
            has_graph: false,
        }
    }

    /// Where output goes right now: the box title while one is being captured.
    pub fn sink(&mut self) -> &mut Vec<Event<'a>> {
        if self.boxes.capturing_title() {
            &mut self.title
        } else {
            &mut self.body
        }
    }

    /// Emit literal HTML.
    pub fn push_html(&mut self, html: String) {
        self.sink().push(Event::InlineHtml(html.into()));
    }

    pub fn push(&mut self, event: Event<'a>) {
        self.sink().push(event);
    }
}
