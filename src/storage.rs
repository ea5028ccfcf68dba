use std::fs;
use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::catalog::Catalog;

const BUNDLED_CATALOG: &str = include_str!("../data/events.json");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse JSON catalog: {0}")]
    JsonDecode(#[from] serde_json::Error),
    #[error("failed to parse TOML catalog: {0}")]
    TomlDecode(#[from] toml::de::Error),
}

/// Loads a catalog file. `.toml` files are read as TOML, anything else as JSON.
pub fn load_catalog(path: &Path) -> Result<Catalog, StorageError> {
    let raw = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("toml"));

    let catalog: Catalog = if is_toml {
        toml::from_str(&raw)?
    } else {
        serde_json::from_str(&raw)?
    };

    info!(
        "loaded {} categories from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

pub fn bundled_catalog() -> Result<Catalog, StorageError> {
    let catalog: Catalog = serde_json::from_str(BUNDLED_CATALOG)?;
    debug!("using bundled catalog with {} categories", catalog.len());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::{StorageError, bundled_catalog, load_catalog};

    const JSON_CATALOG: &str = r#"{
        "ml": {
            "title": "Machine Learning Track",
            "events": [{
                "name": "Model Mayhem",
                "start_time": "10:30 AM",
                "start_date": "28 March",
                "description": "Train under pressure",
                "mode": "Hybrid",
                "duration": "6 hours",
                "rules": [],
                "poc": []
            }]
        }
    }"#;

    const TOML_CATALOG: &str = r#"
[foss]
title = "Free and Open Source"

[[foss.events]]
name = "Patch Party"
start_time = "2:00 PM"
start_date = "27-28 March"
description = "Land your first upstream patch"
mode = "Offline"
duration = "Two days"
rules = ["Bring a laptop"]

[[foss.events.poc]]
name = "Ravi"
phone = "98765"
"#;

    #[test]
    fn loads_json_catalog() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("events.json");
        fs::write(&path, JSON_CATALOG).expect("write catalog");

        let catalog = load_catalog(&path).expect("load should succeed");
        let category = catalog.lookup("ML").expect("category");
        assert_eq!(category.events[0].name, "Model Mayhem");
    }

    #[test]
    fn loads_toml_catalog_by_extension() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("events.toml");
        fs::write(&path, TOML_CATALOG).expect("write catalog");

        let catalog = load_catalog(&path).expect("load should succeed");
        let event = &catalog.lookup("foss").expect("category").events[0];
        assert_eq!(event.start_date, "27-28 March");
        assert_eq!(event.points_of_contact[0].name, "Ravi");
    }

    #[test]
    fn reports_missing_file_and_bad_json() {
        let dir = TempDir::new().expect("temp dir");
        let missing = load_catalog(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(StorageError::Io(_))));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"ml\": { \"title\": 3 } }").expect("write catalog");
        assert!(matches!(load_catalog(&path), Err(StorageError::JsonDecode(_))));
    }

    #[test]
    fn bundled_events_all_parse() {
        let catalog = bundled_catalog().expect("bundled catalog");
        assert!(!catalog.is_empty());
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for (key, category) in catalog.iter() {
            assert!(!category.events.is_empty(), "{key} has no events");
            for event in &category.events {
                assert!(!event.name.is_empty());
                assert!(event.interval(now).is_valid(), "{key}/{}", event.name);
            }
        }
    }
}
