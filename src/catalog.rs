use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::schedule::{TimeInterval, parse_schedule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfContact {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub start_time: String,
    pub start_date: String,
    pub description: String,
    pub mode: String,
    pub duration: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default, rename = "poc")]
    pub points_of_contact: Vec<PointOfContact>,
}

impl EventRecord {
    /// Interval in the calendar year of `now`; the record itself carries no year.
    pub fn interval(&self, now: NaiveDateTime) -> TimeInterval {
        parse_schedule(&self.start_date, &self.start_time, now.year())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub events: Vec<EventRecord>,
}

/// Read-only index of categories keyed by lowercase identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Category>")]
pub struct Catalog {
    categories: BTreeMap<String, Category>,
}

impl From<BTreeMap<String, Category>> for Catalog {
    fn from(categories: BTreeMap<String, Category>) -> Self {
        Self::new(categories)
    }
}

impl Catalog {
    /// Keys are lowercased; when two keys differ only in case the later one wins.
    pub fn new(categories: impl IntoIterator<Item = (String, Category)>) -> Self {
        let mut index = BTreeMap::new();
        for (key, category) in categories {
            let lowered = key.to_lowercase();
            if let Some(replaced) = index.insert(lowered.clone(), category) {
                warn!(
                    "category key {key} collides with an earlier key as {lowered}; dropping \"{}\"",
                    replaced.title
                );
            }
        }
        Self { categories: index }
    }

    pub fn lookup(&self, key: &str) -> Option<&Category> {
        self.categories.get(&key.to_lowercase())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories
            .iter()
            .map(|(key, category)| (key.as_str(), category))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Key `offset` positions away from `key` in tab order, wrapping at both ends.
    pub fn neighbour_key(&self, key: &str, offset: isize) -> Option<&str> {
        let keys = self.keys().collect::<Vec<_>>();
        if keys.is_empty() {
            return None;
        }

        let key = key.to_lowercase();
        let Some(position) = keys.iter().position(|candidate| *candidate == key) else {
            return keys.first().copied();
        };
        let len = keys.len() as isize;
        let next = (position as isize + offset).rem_euclid(len) as usize;
        keys.get(next).copied()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::{Catalog, Category, EventRecord, PointOfContact};
    use crate::schedule::{EventPhase, EventStatus, evaluate, phase};

    pub(crate) fn event(name: &str, start_date: &str, start_time: &str) -> EventRecord {
        EventRecord {
            name: name.to_string(),
            start_time: start_time.to_string(),
            start_date: start_date.to_string(),
            description: format!("{name} description"),
            mode: "Offline".to_string(),
            duration: "2 hours".to_string(),
            rules: vec!["Teams of up to 3".to_string()],
            points_of_contact: vec![PointOfContact {
                name: "Asha".to_string(),
                phone: "+91 90000 00000".to_string(),
            }],
        }
    }

    pub(crate) fn sample_catalog() -> Catalog {
        let mut categories = BTreeMap::new();
        categories.insert(
            "foss".to_string(),
            Category {
                title: "Free and Open Source".to_string(),
                events: vec![
                    event("Git Gud", "27 March", "9:00 AM"),
                    event("Hackathon", "27-28 March", "9:00 PM"),
                ],
            },
        );
        categories.insert(
            "ML".to_string(),
            Category {
                title: "Machine Learning Track".to_string(),
                events: vec![event("Kaggle Sprint", "29 March", "11:00 AM")],
            },
        );
        Catalog::new(categories)
    }

    #[test]
    fn lookup_ignores_key_case() {
        let catalog = sample_catalog();
        let upper = catalog.lookup("FOSS").expect("category");
        let lower = catalog.lookup("foss").expect("category");
        assert_eq!(upper, lower);
        assert_eq!(upper.title, "Free and Open Source");
    }

    #[test]
    fn stored_keys_are_lowercased() {
        let catalog = sample_catalog();
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["foss", "ml"]);
        assert!(catalog.lookup("ml").is_some());
        assert!(catalog.lookup("Ml").is_some());
    }

    #[test]
    fn keys_differing_only_in_case_collapse_to_the_later_one() {
        let category = |title: &str| Category {
            title: title.to_string(),
            events: Vec::new(),
        };
        let catalog = Catalog::new(vec![
            ("FOSS".to_string(), category("Shouted")),
            ("foss".to_string(), category("Free and Open Source")),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.lookup("Foss").map(|category| category.title.as_str()),
            Some("Free and Open Source")
        );
    }

    #[test]
    fn unknown_key_is_not_found() {
        let catalog = sample_catalog();
        assert!(catalog.lookup("nonexistent").is_none());
        assert!(Catalog::default().lookup("foss").is_none());
    }

    #[test]
    fn neighbour_key_wraps() {
        let catalog = sample_catalog();
        assert_eq!(catalog.neighbour_key("foss", 1), Some("ml"));
        assert_eq!(catalog.neighbour_key("ml", 1), Some("foss"));
        assert_eq!(catalog.neighbour_key("foss", -1), Some("ml"));
        assert_eq!(catalog.neighbour_key("missing", 1), Some("foss"));
        assert_eq!(Catalog::default().neighbour_key("foss", 1), None);
    }

    #[test]
    fn deserializes_original_field_names() {
        let raw = r#"{
            "FOSS": {
                "title": "Free and Open Source",
                "events": [{
                    "name": "Git Gud",
                    "start_time": "9:00 AM",
                    "start_date": "27 March",
                    "description": "Version control workshop",
                    "mode": "Offline",
                    "duration": "3 hours",
                    "rules": ["Bring a laptop"],
                    "poc": [{ "name": "Asha", "phone": "12345" }]
                }]
            }
        }"#;
        let catalog: Catalog = serde_json::from_str(raw).expect("catalog should parse");
        let category = catalog.lookup("foss").expect("category");
        assert_eq!(category.events[0].points_of_contact[0].phone, "12345");
        assert_eq!(category.events[0].rules, vec!["Bring a laptop".to_string()]);
    }

    #[test]
    fn record_interval_uses_year_of_now() {
        let record = event("Hackathon", "27-28 March", "9:00 PM");
        let now = NaiveDate::from_ymd_opt(2027, 3, 28)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let interval = record.interval(now);
        assert_eq!(evaluate(&interval, now), EventStatus::Live);
        assert_eq!(phase(&interval, now), EventPhase::Live);
        assert_eq!(
            interval.start,
            NaiveDate::from_ymd_opt(2027, 3, 27).unwrap().and_hms_opt(21, 0, 0)
        );
    }
}
