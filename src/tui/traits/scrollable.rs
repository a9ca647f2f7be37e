//! Scroll and selection behavior shared by panels
//!
//! Panels own a [`ScrollState`] and expose it; the default methods do the
//! rest.

use crate::tui::scroll::ScrollState;

pub trait Scrollable {
    fn scroll_state_mut(&mut self) -> &mut ScrollState;

    fn scroll_up(&mut self) {
        self.scroll_state_mut().scroll_up();
    }

    fn scroll_down(&mut self) {
        self.scroll_state_mut().scroll_down();
    }

    fn scroll_to_top(&mut self) {
        self.scroll_state_mut().scroll_to_top();
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_state_mut().scroll_to_bottom();
    }

    fn page_up(&mut self) {
        self.scroll_state_mut().page_up();
    }

    fn page_down(&mut self) {
        self.scroll_state_mut().page_down();
    }
}

/// A scrollable panel with a cursor over its items
pub trait Selectable: Scrollable {
    fn selected_index(&self) -> Option<usize>;

    /// Move the cursor (implementations clamp to valid items)
    fn select(&mut self, index: usize);

    fn item_count(&self) -> usize;

    fn select_next(&mut self) {
        match self.selected_index() {
            Some(current) if current + 1 < self.item_count() => self.select(current + 1),
            Some(_) => {}
            None if self.item_count() > 0 => self.select(0),
            None => {}
        }
    }

    fn select_previous(&mut self) {
        match self.selected_index() {
            Some(current) if current > 0 => self.select(current - 1),
            Some(_) => {}
            None if self.item_count() > 0 => self.select(self.item_count() - 1),
            None => {}
        }
    }
}
