//! Line-oriented [`ScreenView`] for terminals.

use std::io::Write;

use tracing::warn;

use super::{MenuItem, ScreenView};
use crate::provider::ConversationView;

/// Renders screen changes as text lines to any writer.
#[derive(Debug)]
pub struct ConsoleView<W> {
    out: W,
    toolbar: Vec<MenuItem>,
    finished: bool,
}

impl<W: Write> ConsoleView<W> {
    /// Render to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            toolbar: Vec::new(),
            finished: false,
        }
    }

    /// Toolbar items added so far.
    pub fn toolbar(&self) -> &[MenuItem] {
        &self.toolbar
    }

    /// Whether [`ScreenView::finish`] was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            warn!(error = %e, "failed to write to console");
        }
    }
}

impl<W: Write> ScreenView for ConsoleView<W> {
    fn show_conversation(&mut self, view: ConversationView) {
        let mode = if view.params.read_only {
            "read-only"
        } else {
            "interactive"
        };
        self.line(&format!("[screen] conversation view {} ({mode})", view.tag));
    }

    fn add_menu_item(&mut self, item: MenuItem) {
        self.line(&format!("[toolbar] + {}", item.label()));
        self.toolbar.push(item);
    }

    fn finish(&mut self) {
        self.finished = true;
        self.line("[screen] finished");
    }
}
