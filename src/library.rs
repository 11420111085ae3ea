//! Music catalog: the `Track` model and directory scanning.
//!
//! The catalog is loaded once at startup and shared read-only with the
//! playback core.

mod artwork;
mod display;
mod model;
mod scan;

pub use model::Track;
pub use scan::scan;
pub(crate) use display::track_text;
