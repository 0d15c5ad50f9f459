//! # LitterScope Viewer
//!
//! The interaction core of the litter map: a [`SelectionController`] that
//! turns region and date choices into render requests, and a [`Compositor`]
//! that turns a render request into map layers and a viewport.
//!
//! ```text
//! RegionSelected ─▶ controller ─▶ RegionChanged, DateChanged, RenderRequest
//!                                                          │
//!                    MapSurface ◀── Composition ◀── compositor
//! ```
//!
//! [`Viewer`] wires both to a [`MapSurface`] for callers that process one
//! event at a time.

pub mod compositor;
pub mod controller;
pub mod layer;
pub mod surface;
pub mod viewer;

pub use compositor::{Composition, Compositor, CompositorOptions, ImageryStatus, RenderOutcome};
pub use controller::{
    Notification, RenderRequest, Selection, SelectionController, Transition, ViewerEvent,
};
pub use layer::{Layer, VisParams};
pub use surface::{CenterTarget, MapState, MapSurface, Viewport};
pub use viewer::{Viewer, ViewerUpdate};
