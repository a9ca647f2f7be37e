//! Tutorial browser core
//!
//! Everything that decides which lesson is current and what the content pane
//! shows lives here, independent of the terminal UI:
//!
//! - `model` - chapter/lesson tree and lesson bodies
//! - `structure` / `content` - repositories over the [`crate::api::Backend`]
//! - `address` - `/output/{id}[/{lessonPath}]` routes and history
//! - `navigation` - the selection state machine
//! - `transition` - fade between the previous and next lesson

pub mod address;
pub mod content;
pub mod inflight;
pub mod model;
pub mod navigation;
pub mod structure;
pub mod transition;

pub use address::Route;
pub use content::ContentRepository;
pub use navigation::{ContentState, Effect, NavigationController, SelectionOrigin, StructureState};
pub use structure::StructureRepository;
pub use transition::{FadeTiming, PaneView, TransitionPhase};
