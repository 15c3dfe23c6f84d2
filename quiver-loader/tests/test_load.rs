use std::fs;

use quiver_loader::dsv::{load_csv, try_load_csv, CsvOptions};
use quiver_loader::error::LoadError;
use quiver_loader::json::load_json;
use quiver_loader::topojson::load_topology;
use tempfile::tempdir;

#[tokio::test]
async fn loads_weather_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weather.json");
    fs::write(
        &path,
        r#"[{"date": "2018-01-01", "currently": {"humidity": 0.81, "apparentTemperature": 41.5}}]"#,
    )
    .unwrap();

    let data = load_json(&path).await.unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].number("currently.humidity"), Some(0.81));
    // JSON strings are not auto-typed
    assert_eq!(data[0].text("date"), Some("2018-01-01"));
}

#[tokio::test]
async fn stacked_bar_rows_get_totals() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("population.csv");
    fs::write(&path, "name,<10,10-19\nAL,598478,638789\nAK,106741,99926\n").unwrap();

    let options = CsvOptions::default().with_row(|record, _, columns| {
        let total: f64 = columns.iter().filter_map(|c| record.number(c)).sum();
        Some(record.with("total", total))
    });
    let data = load_csv(&path, &options).await.unwrap();
    assert_eq!(data.columns(), &["name", "<10", "10-19"].map(String::from));
    assert_eq!(data[0].number("total"), Some(1_237_267.0));
    assert_eq!(data[1].text("name"), Some("AK"));
}

#[tokio::test]
async fn missing_files_yield_none() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.csv");
    assert!(load_csv(&missing, &CsvOptions::default()).await.is_none());
    assert!(load_json(&missing).await.is_none());
    assert!(load_topology(&missing).await.is_none());
    assert!(matches!(
        try_load_csv(&missing, &CsvOptions::default()).await,
        Err(LoadError::Io { .. })
    ));
}

#[tokio::test]
async fn loads_world_topology() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("world.json");
    fs::write(
        &path,
        r#"{"type": "Topology", "arcs": [[[0, 0], [10, 0], [10, 10], [0, 0]]],
            "objects": {"countries": {"type": "GeometryCollection", "geometries": [
                {"type": "Polygon", "id": "1", "properties": {"name": "Triangle"}, "arcs": [[0]]}
            ]}}}"#,
    )
    .unwrap();
    let topology = load_topology(&path).await.unwrap();
    let features = topology.features("countries").unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0].name(), Some("Triangle"));
}
