//! Geographic primitives: points, bounding boxes and areas of interest.
//!
//! All coordinates are WGS-84 degrees, longitude first.

use crate::error::{Error, Result};
use geo::{Area, BoundingRect, Centroid, Contains};
use geo_types::{Coord, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A longitude/latitude pair. Serialized as `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for LonLat {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(p: LonLat) -> Self {
        [p.lon, p.lat]
    }
}

impl From<LonLat> for Point<f64> {
    fn from(p: LonLat) -> Self {
        Point::new(p.lon, p.lat)
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// From a `(min_x, min_y, max_x, max_y)` tuple as returned by
    /// `Raster::bounds`.
    pub fn from_bounds((west, south, east, north): (f64, f64, f64, f64)) -> Self {
        Self::new(west, south, east, north)
    }

    /// Whether two boxes overlap (touching edges count).
    pub fn intersects(&self, other: &BBox) -> bool {
        self.west <= other.east
            && other.west <= self.east
            && self.south <= other.north
            && other.south <= self.north
    }

    /// `[west, south, east, north]`, the STAC `bbox` order
    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.west, self.south),
                (self.east, self.south),
                (self.east, self.north),
                (self.west, self.north),
                (self.west, self.south),
            ]),
            vec![],
        )
    }

    pub fn center(&self) -> LonLat {
        LonLat::new(
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }
}

/// Area of interest: the footprint polygon of a litter mask.
///
/// Interior rings are dropped; the AOI is the outer boundary only.
#[derive(Debug, Clone, PartialEq)]
pub struct Aoi {
    polygon: Polygon<f64>,
    bbox: BBox,
}

impl Aoi {
    /// Build an AOI from a mask footprint.
    ///
    /// Fails when the exterior ring has fewer than three distinct vertices or
    /// encloses no area.
    pub fn from_footprint(footprint: &Polygon<f64>) -> Result<Self> {
        let ring: Vec<Coord<f64>> = footprint.exterior().coords().copied().collect();

        let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
        for c in &ring {
            if !distinct.contains(c) {
                distinct.push(*c);
            }
        }
        if distinct.len() < 3 {
            return Err(Error::DegenerateGeometry(format!(
                "footprint has {} distinct vertices",
                distinct.len()
            )));
        }

        let polygon = Polygon::new(LineString::from(ring), vec![]);
        if polygon.unsigned_area() == 0.0 {
            return Err(Error::DegenerateGeometry(
                "footprint encloses no area".to_string(),
            ));
        }

        let rect = polygon
            .bounding_rect()
            .ok_or_else(|| Error::DegenerateGeometry("footprint has no extent".to_string()))?;
        let bbox = BBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);

        Ok(Self { polygon, bbox })
    }

    pub fn from_bbox(bbox: BBox) -> Result<Self> {
        Self::from_footprint(&bbox.to_polygon())
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    /// Centroid of the footprint, or the bbox center when the centroid is
    /// undefined.
    pub fn center(&self) -> LonLat {
        self.polygon
            .centroid()
            .map(|p| LonLat::new(p.x(), p.y()))
            .unwrap_or_else(|| self.bbox.center())
    }

    /// Whether a point lies strictly inside the footprint.
    pub fn contains(&self, point: LonLat) -> bool {
        self.polygon.contains(&Point::from(point))
    }
}
