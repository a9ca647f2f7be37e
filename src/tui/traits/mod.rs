//! Capability traits for TUI panels
//!
//! App does not know how each panel scrolls or reacts to keys; panels declare
//! it through these traits and App routes input to whichever one is focused.
//!
//! - [`Interactive`] - panels that handle keyboard input
//! - [`Scrollable`] - panels with more content than fits their viewport
//! - [`Selectable`] - scrollable panels with a cursor over items

mod interactive;
mod scrollable;

pub use interactive::{Handled, Interactive, ScrollKeys};
pub use scrollable::{Scrollable, Selectable};
