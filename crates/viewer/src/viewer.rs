//! Controller, compositor and map surface wired together.

use std::sync::Arc;

use litterscope_core::{ImageryService, MaskSource, RegionCatalog, Result};

use crate::compositor::{Compositor, RenderOutcome};
use crate::controller::{Notification, SelectionController, Transition, ViewerEvent};
use crate::surface::MapSurface;

/// What one event did.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerUpdate {
    pub notifications: Vec<Notification>,
    pub outcome: RenderOutcome,
}

/// Processes events one at a time: each accepted event is rendered to the
/// surface before the next is handled.
pub struct Viewer<I, M, S> {
    controller: SelectionController,
    compositor: Compositor<I, M>,
    surface: S,
}

impl<I, M, S> Viewer<I, M, S>
where
    I: ImageryService,
    M: MaskSource,
    S: MapSurface,
{
    pub fn new(catalog: Arc<RegionCatalog>, compositor: Compositor<I, M>, surface: S) -> Self {
        Self {
            controller: SelectionController::new(catalog),
            compositor,
            surface,
        }
    }

    /// Select the first region and render its default date.
    pub async fn start(&mut self) -> Result<ViewerUpdate> {
        let transition = self.controller.initialize()?;
        self.run(transition).await
    }

    /// Apply a user event. Rejected events leave selection and map as they
    /// were; an accepted event whose render fails leaves an empty map with a
    /// notice.
    pub async fn handle(&mut self, event: ViewerEvent) -> Result<ViewerUpdate> {
        let transition = self.controller.dispatch(event)?;
        self.run(transition).await
    }

    async fn run(&mut self, transition: Transition) -> Result<ViewerUpdate> {
        let outcome = self
            .compositor
            .render(&transition.render, &mut self.surface)
            .await;
        self.controller.complete(transition.render.generation);
        let outcome = outcome?;
        Ok(ViewerUpdate {
            notifications: transition.notifications,
            outcome,
        })
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn compositor(&self) -> &Compositor<I, M> {
        &self.compositor
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
