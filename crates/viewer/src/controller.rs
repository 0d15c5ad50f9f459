//! Region and date selection.
//!
//! The controller owns the current selection. Picking a region is a two-step
//! transition: the region's dates, story and default date are taken over,
//! then the default date is selected as if the user had picked it. Every
//! successful date selection issues exactly one [`RenderRequest`]; issuing a
//! new one cancels the previous request.
//!
//! Invalid events (unknown region, date outside the region, date before any
//! region) are rejected with a typed error and change nothing.

use std::sync::Arc;

use chrono::NaiveDate;
use litterscope_core::{Anchor, DateWindow, Error, MaskRef, Region, RegionCatalog, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// User interactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    RegionSelected(String),
    DateSelected(NaiveDate),
}

/// Changes the UI reflects, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Date options and story replaced
    RegionChanged {
        region: String,
        dates: Vec<NaiveDate>,
        story: String,
    },
    DateChanged {
        region: String,
        date: NaiveDate,
        window: DateWindow,
    },
}

/// Current region and date; both unset until initialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub region: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Everything the compositor needs to draw one selection.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Increases by one with every request the controller issues
    pub generation: u64,
    pub region: String,
    pub date: NaiveDate,
    pub mask: MaskRef,
    pub window: DateWindow,
    pub anchor: Anchor,
    /// Cancelled once a newer request is issued
    pub cancel: CancellationToken,
}

impl RenderRequest {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Result of one accepted event.
#[derive(Debug, Clone)]
pub struct Transition {
    pub notifications: Vec<Notification>,
    pub render: RenderRequest,
}

/// Mask and window for `date` in `region`, checked before anything changes.
struct DatePlan {
    mask: MaskRef,
    window: DateWindow,
}

fn plan_date(region: &Region, date: NaiveDate) -> Result<DatePlan> {
    let mask = region.mask_for(date)?.clone();
    let window = DateWindow::around(date)?;
    Ok(DatePlan { mask, window })
}

pub struct SelectionController {
    catalog: Arc<RegionCatalog>,
    selection: Selection,
    date_options: Vec<NaiveDate>,
    story: String,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl SelectionController {
    pub fn new(catalog: Arc<RegionCatalog>) -> Self {
        Self {
            catalog,
            selection: Selection::default(),
            date_options: Vec::new(),
            story: String::new(),
            generation: 0,
            in_flight: None,
        }
    }

    /// Select the first region of the catalogue, cascading into its
    /// default date.
    pub fn initialize(&mut self) -> Result<Transition> {
        let first = self.catalog.first().name.clone();
        self.select_region(&first)
    }

    pub fn dispatch(&mut self, event: ViewerEvent) -> Result<Transition> {
        match event {
            ViewerEvent::RegionSelected(name) => self.select_region(&name),
            ViewerEvent::DateSelected(date) => self.select_date(date),
        }
    }

    pub fn select_region(&mut self, name: &str) -> Result<Transition> {
        let catalog = Arc::clone(&self.catalog);
        let region = catalog.get(name)?;
        let plan = plan_date(region, region.default_date)?;

        debug!(region = %region.name, dates = region.dates.len(), "region selected");
        self.selection.region = Some(region.name.clone());
        self.date_options = region.dates.clone();
        self.story = region.story.clone();

        let region_changed = Notification::RegionChanged {
            region: region.name.clone(),
            dates: region.dates.clone(),
            story: region.story.clone(),
        };
        let mut transition = self.apply_date(region, region.default_date, plan);
        transition.notifications.insert(0, region_changed);
        Ok(transition)
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<Transition> {
        let catalog = Arc::clone(&self.catalog);
        let name = self
            .selection
            .region
            .as_deref()
            .ok_or(Error::NoRegionSelected)?;
        let region = catalog.get(name)?;
        if !region.has_date(date) {
            return Err(Error::DateNotInRegion {
                region: region.name.clone(),
                date,
            });
        }
        let plan = plan_date(region, date)?;
        Ok(self.apply_date(region, date, plan))
    }

    fn apply_date(&mut self, region: &Region, date: NaiveDate, plan: DatePlan) -> Transition {
        self.selection.date = Some(date);

        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        self.generation += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());

        debug!(
            region = %region.name,
            %date,
            window = %plan.window,
            generation = self.generation,
            "date selected"
        );

        Transition {
            notifications: vec![Notification::DateChanged {
                region: region.name.clone(),
                date,
                window: plan.window,
            }],
            render: RenderRequest {
                generation: self.generation,
                region: region.name.clone(),
                date,
                mask: plan.mask,
                window: plan.window,
                anchor: region.anchor,
                cancel,
            },
        }
    }

    /// Mark a request as finished. Returns whether it was the latest one.
    pub fn complete(&mut self, generation: u64) -> bool {
        let current = self.is_current(generation);
        if current {
            self.in_flight = None;
        }
        current
    }

    /// Whether `generation` is the most recently issued request.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn date_options(&self) -> &[NaiveDate] {
        &self.date_options
    }

    pub fn story(&self) -> &str {
        &self.story
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The region currently selected, if any.
    pub fn current_region(&self) -> Option<&Region> {
        self.selection
            .region
            .as_deref()
            .and_then(|name| self.catalog.get(name).ok())
    }
}
