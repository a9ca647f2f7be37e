// Components module - the panels of the reader screen
//
// - Address bar: current deep link, back/forward, typed navigation
// - Sidebar: chapters and lessons
// - Content panel: the rendered lesson with its fade
// - Logs panel: captured system logs (toggleable)
// - Status bar: focus and key hints
// - Toast: short-lived feedback overlay

pub mod address_bar;
pub mod content_panel;
pub mod logs_panel;
pub mod scrollbar;
pub mod sidebar;
pub mod status_bar;
pub mod toast;

pub use address_bar::{AddressEditor, EditOutcome};
pub use content_panel::ContentPanel;
pub use logs_panel::LogsPanel;
pub use sidebar::SidebarPanel;
pub use toast::Toast;
