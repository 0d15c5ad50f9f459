//! Shared fixtures for viewer integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use litterscope_core::{
    Error, GeoTransform, ImageryService, MemoryMaskStore, Raster, RegionCatalog, Result, Scene,
    SceneCollection, SceneQuery, parse_date,
};
use tokio::sync::Semaphore;

pub fn date(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

pub fn catalog() -> Arc<RegionCatalog> {
    Arc::new(RegionCatalog::builtin().unwrap())
}

/// A 20x20 mask with intensities 0..=237 laid out left to right.
pub fn mask_at(west: f64, north: f64) -> Raster {
    let (rows, cols) = (20, 20);
    let values = (0..rows * cols)
        .map(|i| ((i % cols) as f64 / (cols - 1) as f64 * 237.0).round())
        .collect();
    Raster::from_vec(values, rows, cols)
        .unwrap()
        .with_transform(GeoTransform::new(west, north, 0.005, -0.005))
}

/// Masks for every date of the built-in catalogue.
pub fn masks() -> MemoryMaskStore {
    let mut store = MemoryMaskStore::new();
    for id in ["durban190419", "durban190425", "durban190429"] {
        store.insert(id, mask_at(31.03, -29.80));
    }
    for id in [
        "baltic190609",
        "baltic190610",
        "baltic190626",
        "baltic190629",
        "baltic200713",
    ] {
        store.insert(id, mask_at(11.78, 54.33));
    }
    store
}

/// Imagery service that records every query and answers with a fixed
/// number of scenes, or a fixed failure.
#[derive(Default)]
pub struct RecordingImagery {
    pub queries: Mutex<Vec<SceneQuery>>,
    pub scenes: usize,
    pub failure: Option<String>,
}

impl RecordingImagery {
    pub fn with_scenes(scenes: usize) -> Self {
        Self {
            scenes,
            ..Self::default()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<SceneQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl ImageryService for RecordingImagery {
    fn search(&self, query: &SceneQuery) -> impl Future<Output = Result<SceneCollection>> + Send {
        self.queries.lock().unwrap().push(query.clone());
        let result = match &self.failure {
            Some(reason) => Err(Error::Imagery(reason.clone())),
            None => Ok(SceneCollection::new(
                query.bands.clone(),
                (0..self.scenes)
                    .map(|i| Scene {
                        id: format!("S2_{i}"),
                        acquired: query.window.start,
                        bbox: Some(query.aoi.bbox()),
                        assets: BTreeMap::new(),
                    })
                    .collect(),
            )),
        };
        async move { result }
    }
}

/// Imagery service whose searches wait for a semaphore permit.
pub struct GatedImagery {
    pub gate: Arc<Semaphore>,
}

impl ImageryService for GatedImagery {
    fn search(&self, query: &SceneQuery) -> impl Future<Output = Result<SceneCollection>> + Send {
        let gate = Arc::clone(&self.gate);
        let bands = query.bands.clone();
        async move {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| Error::Other(e.to_string()))?;
            Ok(SceneCollection::empty(bands))
        }
    }
}
