// Scroll state and focus for TUI panels
//
// Each panel owns its scroll state; App only routes input to the focused
// panel. Lesson text is read top-down, so the content panel scrolls manually
// while the logs panel follows new entries until the reader scrolls up.

/// Scroll state for a single panel
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Line/item index at the top of the viewport
    offset: usize,

    /// Total number of lines/items
    total: usize,

    /// Lines/items visible in the viewport
    viewport: usize,

    /// Keep the view pinned to the bottom as content grows
    ///
    /// Scrolling up disables it; reaching the bottom re-enables it.
    pub auto_follow: bool,

    /// Whether reaching the bottom turns `auto_follow` back on
    followable: bool,
}

impl ScrollState {
    /// Scroll state that follows new content
    pub fn new() -> Self {
        Self {
            offset: 0,
            total: 0,
            viewport: 0,
            auto_follow: true,
            followable: true,
        }
    }

    /// Scroll state that stays where the reader put it
    pub fn manual() -> Self {
        Self {
            auto_follow: false,
            followable: false,
            ..Self::new()
        }
    }

    /// Update content and viewport sizes (every frame)
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        if self.auto_follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
            self.auto_follow = false;
        }
    }

    pub fn scroll_down(&mut self) {
        // Before the first frame sizes are unknown; render clamps
        if self.total == 0 || self.offset < self.max_offset() {
            self.offset += 1;
        }
        if self.total > 0 && self.offset >= self.max_offset() && self.followable {
            self.auto_follow = true;
        }
    }

    pub fn page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.page());
        self.auto_follow = false;
    }

    pub fn page_down(&mut self) {
        self.offset = (self.offset + self.page()).min(self.max_offset());
        if self.offset >= self.max_offset() && self.followable {
            self.auto_follow = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        if self.followable {
            self.auto_follow = true;
        }
    }

    /// Back to the top for a new document
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Move the viewport just enough to show `index`
    pub fn ensure_visible(&mut self, index: usize) {
        if index < self.offset {
            self.offset = index;
        } else if self.viewport > 0 && index >= self.offset + self.viewport {
            self.offset = index + 1 - self.viewport;
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Visible range as (start, end)
    pub fn visible_range(&self) -> (usize, usize) {
        let start = self.offset.min(self.total);
        let end = (self.offset + self.viewport).min(self.total);
        (start, end)
    }

    pub fn needs_scrollbar(&self) -> bool {
        self.total > self.viewport
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    fn page(&self) -> usize {
        self.viewport.saturating_sub(1).max(1)
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Panels that can hold keyboard focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusablePanel {
    /// Chapter/lesson tree (default focus)
    #[default]
    Sidebar,
    /// Rendered lesson
    Content,
    /// System logs (only while shown)
    Logs,
}

impl FocusablePanel {
    /// Next panel in Tab order
    pub fn next(self, logs_visible: bool) -> Self {
        match self {
            Self::Sidebar => Self::Content,
            Self::Content if logs_visible => Self::Logs,
            Self::Content | Self::Logs => Self::Sidebar,
        }
    }

    /// Previous panel in Tab order
    pub fn prev(self, logs_visible: bool) -> Self {
        match self {
            Self::Sidebar if logs_visible => Self::Logs,
            Self::Sidebar => Self::Content,
            Self::Content => Self::Sidebar,
            Self::Logs => Self::Content,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sidebar => "Lessons",
            Self::Content => "Lesson",
            Self::Logs => "Logs",
        }
    }
}
