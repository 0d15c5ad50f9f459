//! Live STAC searches.
//!
//! Marked `#[ignore]` because they need network access.
//! Run with: `cargo test -p litterscope-cloud -- --ignored`

use litterscope_cloud::{StacCatalog, StacClient, StacClientOptions, StacImagery, StacImageryOptions};
use litterscope_cloud::stac_models::StacSearchParams;
use litterscope_core::{Aoi, BBox, DateWindow, ImageryService, SceneQuery, parse_date};

fn durban_query(date: &str) -> SceneQuery {
    SceneQuery {
        collection: "sentinel-2-l2a".to_string(),
        aoi: Aoi::from_bbox(BBox::new(31.0, -29.95, 31.15, -29.80)).unwrap(),
        window: DateWindow::around(parse_date(date).unwrap()).unwrap(),
        bands: vec!["B04".into(), "B03".into(), "B02".into()],
    }
}

/// The Durban flood window on Earth Search.
#[tokio::test]
#[ignore]
async fn earth_search_durban_window() {
    let imagery = StacImagery::new(
        StacCatalog::EarthSearch,
        StacClientOptions::default(),
        StacImageryOptions::default(),
    )
    .expect("failed to create client");

    let query = durban_query("2019-04-24");
    let scenes = imagery.search(&query).await.expect("search failed");

    println!("Found {} scenes", scenes.len());
    for scene in &scenes.scenes {
        println!("  {} {}", scene.id, scene.acquired);
        assert!(query.window.contains(scene.acquired));
        assert_eq!(scene.assets.len(), 3);
    }
}

/// Same search on Planetary Computer, where assets are keyed by band.
#[tokio::test]
#[ignore]
async fn planetary_computer_durban_window() {
    let imagery = StacImagery::new(
        StacCatalog::PlanetaryComputer,
        StacClientOptions::default(),
        StacImageryOptions::default(),
    )
    .expect("failed to create client");

    let scenes = imagery
        .search(&durban_query("2019-04-24"))
        .await
        .expect("search failed");
    for scene in &scenes.scenes {
        assert!(scene.assets.contains_key("B04"));
    }
}

/// Pagination stops at `max_items`.
#[tokio::test]
#[ignore]
async fn paginated_search_respects_max_items() {
    let options = StacClientOptions {
        max_items: 15,
        ..StacClientOptions::default()
    };
    let client = StacClient::new(StacCatalog::EarthSearch, options).expect("failed to create client");

    let params = StacSearchParams::new()
        .bbox(BBox::new(11.70, 54.20, 11.97, 54.36))
        .datetime("2019-06-01T00:00:00Z/2020-07-31T23:59:59Z")
        .collection("sentinel-2-l2a")
        .limit(5);

    let items = client.search_all(&params).await.expect("search_all failed");

    println!("Fetched {} items across pages", items.len());
    assert!(items.len() > 5, "should have fetched more than one page");
    assert!(items.len() <= 15, "should respect max_items");
}
