//! # LitterScope Cloud
//!
//! Satellite imagery lookup over STAC (SpatioTemporal Asset Catalog) APIs.
//!
//! [`StacClient`] speaks STAC Item Search with pagination and retries;
//! [`StacImagery`] builds on it to implement the core
//! [`ImageryService`](litterscope_core::ImageryService) seam: scenes that
//! intersect an area of interest inside a date window, with the requested
//! bands resolved to asset hrefs.

pub mod error;
pub mod imagery;
pub mod stac_client;
pub mod stac_models;

pub use error::{CloudError, Result};
pub use imagery::{StacImagery, StacImageryOptions};
pub use stac_client::{StacCatalog, StacClient, StacClientOptions};
pub use stac_models::{StacItem, StacItemCollection, StacSearchParams};
