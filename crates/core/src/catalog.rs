//! The static region catalogue.
//!
//! Each region lists the dates for which a litter mask exists, the mask for
//! each date (same order), a short story, the date selected by default and
//! where the map should centre. The catalogue is loaded once and never
//! mutated afterwards.

use crate::dates::parse_date;
use crate::error::{Error, Result};
use crate::geometry::LonLat;
use crate::mask::MaskRef;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Where the viewport goes once a region's layers are shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    /// Centre on a fixed point
    Point(LonLat),
    /// Centre on the footprint of the displayed mask
    DeriveFromMask,
}

impl From<Option<LonLat>> for Anchor {
    fn from(point: Option<LonLat>) -> Self {
        point.map_or(Anchor::DeriveFromMask, Anchor::Point)
    }
}

/// One browsable region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub masks: Vec<MaskRef>,
    pub story: String,
    pub default_date: NaiveDate,
    pub anchor: Anchor,
}

impl Region {
    pub fn has_date(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Mask at the same index as `date` in the date list
    pub fn mask_for(&self, date: NaiveDate) -> Result<&MaskRef> {
        self.dates
            .iter()
            .position(|d| *d == date)
            .and_then(|i| self.masks.get(i))
            .ok_or_else(|| Error::DateNotInRegion {
                region: self.name.clone(),
                date,
            })
    }

    /// Check the per-region invariants.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidCatalog(format!("{}: {msg}", self.name)));

        if self.name.trim().is_empty() {
            return Err(Error::InvalidCatalog("region name is empty".to_string()));
        }
        if self.dates.is_empty() {
            return invalid("no dates".to_string());
        }
        if self.dates.len() != self.masks.len() {
            return invalid(format!(
                "{} dates but {} masks",
                self.dates.len(),
                self.masks.len()
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.dates.iter().find(|d| !seen.insert(**d)) {
            return invalid(format!("date {dup} listed twice"));
        }
        if !self.has_date(self.default_date) {
            return invalid(format!(
                "default date {} is not one of its dates",
                self.default_date
            ));
        }
        Ok(())
    }
}

/// Serialized form of a region, keyed by name in the catalogue file.
///
/// ```json
/// "Durban": {
///   "dates": ["2019-04-19", "2019-04-24"],
///   "masks": ["durban190419", "durban190425"],
///   "story": "Flood event ...",
///   "default_date": "2019-04-24",
///   "anchor": [31.08, -29.86]
/// }
/// ```
///
/// `anchor: null` (or no anchor) centres on the mask footprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSpec {
    pub dates: Vec<String>,
    pub masks: Vec<MaskRef>,
    #[serde(default)]
    pub story: String,
    pub default_date: String,
    #[serde(default)]
    pub anchor: Option<LonLat>,
}

impl RegionSpec {
    fn into_region(self, name: String) -> Result<Region> {
        let dates = self
            .dates
            .iter()
            .map(|d| parse_date(d))
            .collect::<Result<Vec<_>>>()?;
        let region = Region {
            name,
            dates,
            masks: self.masks,
            story: self.story,
            default_date: parse_date(&self.default_date)?,
            anchor: self.anchor.into(),
        };
        region.validate()?;
        Ok(region)
    }
}

impl From<&Region> for RegionSpec {
    fn from(region: &Region) -> Self {
        Self {
            dates: region.dates.iter().map(|d| d.to_string()).collect(),
            masks: region.masks.clone(),
            story: region.story.clone(),
            default_date: region.default_date.to_string(),
            anchor: match region.anchor {
                Anchor::Point(p) => Some(p),
                Anchor::DeriveFromMask => None,
            },
        }
    }
}

/// Ordered, validated set of regions.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Validate and wrap a list of regions, keeping their order.
    pub fn new(regions: Vec<Region>) -> Result<Self> {
        if regions.is_empty() {
            return Err(Error::InvalidCatalog("catalogue has no regions".to_string()));
        }
        let mut names = HashSet::new();
        for region in &regions {
            region.validate()?;
            if !names.insert(region.name.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "region '{}' defined twice",
                    region.name
                )));
            }
        }
        Ok(Self { regions })
    }

    /// The regions shipped with the application
    pub fn builtin() -> Result<Self> {
        Self::from_json(include_str!("../data/regions.json"))
    }

    /// Parse a catalogue file. Regions keep the order of the JSON keys.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let regions = map
            .into_iter()
            .map(|(name, value)| {
                let spec: RegionSpec = serde_json::from_value(value)
                    .map_err(|e| Error::InvalidCatalog(format!("{name}: {e}")))?;
                spec.into_region(name)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(regions)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Serialize back to the catalogue file format
    pub fn to_json(&self) -> Result<String> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .regions
            .iter()
            .map(|r| Ok((r.name.clone(), serde_json::to_value(RegionSpec::from(r))?)))
            .collect::<Result<_>>()?;
        Ok(serde_json::to_string_pretty(&map)?)
    }

    pub fn get(&self, name: &str) -> Result<&Region> {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::UnknownRegion(name.to_string()))
    }

    /// First region in catalogue order; selected on start-up.
    pub fn first(&self) -> &Region {
        &self.regions[0]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn builtin_catalogue_keeps_file_order() {
        let catalog = RegionCatalog::builtin().unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["Durban", "Baltic sea"]);
        assert_eq!(catalog.first().name, "Durban");
    }

    #[test]
    fn builtin_anchors_are_exact() {
        let catalog = RegionCatalog::builtin().unwrap();
        assert_eq!(
            catalog.get("Durban").unwrap().anchor,
            Anchor::Point(LonLat::new(31.078424502408225, -29.855263513511353))
        );
        assert_eq!(
            catalog.get("Baltic sea").unwrap().anchor,
            Anchor::Point(LonLat::new(11.835695130768501, 54.2792381124053))
        );
    }

    #[test]
    fn durban_entry() {
        let catalog = RegionCatalog::builtin().unwrap();
        let durban = catalog.get("Durban").unwrap();
        assert_eq!(
            durban.dates,
            vec![date("2019-04-19"), date("2019-04-24"), date("2019-04-29")]
        );
        assert_eq!(durban.default_date, date("2019-04-24"));
        assert_eq!(
            durban.anchor,
            Anchor::Point(LonLat::new(31.078424502408225, -29.855263513511353))
        );
        assert_eq!(
            durban.mask_for(date("2019-04-24")).unwrap().as_str(),
            "durban190425"
        );
    }

    #[test]
    fn baltic_dates_are_not_resorted() {
        let catalog = RegionCatalog::builtin().unwrap();
        let baltic = catalog.get("Baltic sea").unwrap();
        assert_eq!(baltic.dates.len(), 5);
        assert_eq!(baltic.masks.len(), 5);
        assert_eq!(baltic.story, "");
        assert_eq!(baltic.default_date, date("2019-06-10"));
    }

    #[test]
    fn unknown_region_is_typed() {
        let catalog = RegionCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.get("Atlantis"),
            Err(Error::UnknownRegion(name)) if name == "Atlantis"
        ));
    }

    #[test]
    fn null_anchor_derives_from_mask() {
        let json = r#"{
            "Zeta": {"dates": ["2021-01-02"], "masks": ["z"], "default_date": "2021-01-02", "anchor": null},
            "Alpha": {"dates": ["2021-01-03"], "masks": ["a"], "default_date": "2021-01-03"}
        }"#;
        let catalog = RegionCatalog::from_json(json).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["Zeta", "Alpha"]);
        assert!(catalog.iter().all(|r| r.anchor == Anchor::DeriveFromMask));
    }

    #[test]
    fn invalid_catalogues_are_rejected() {
        let mismatched = r#"{"X": {"dates": ["2021-01-02", "2021-01-03"], "masks": ["a"], "default_date": "2021-01-02"}}"#;
        let bad_default = r#"{"X": {"dates": ["2021-01-02"], "masks": ["a"], "default_date": "2021-01-05"}}"#;
        let duplicate_date = r#"{"X": {"dates": ["2021-01-02", "2021-01-02"], "masks": ["a", "b"], "default_date": "2021-01-02"}}"#;
        let bad_date = r#"{"X": {"dates": ["2021-02-30"], "masks": ["a"], "default_date": "2021-02-30"}}"#;

        for json in [mismatched, bad_default, duplicate_date] {
            assert!(matches!(
                RegionCatalog::from_json(json),
                Err(Error::InvalidCatalog(_))
            ));
        }
        assert!(matches!(
            RegionCatalog::from_json(bad_date),
            Err(Error::InvalidDate { .. })
        ));
        assert!(RegionCatalog::from_json("{}").is_err());
    }

    #[test]
    fn to_json_reloads_identically() {
        let catalog = RegionCatalog::builtin().unwrap();
        let reloaded = RegionCatalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(reloaded, catalog);
    }
}
