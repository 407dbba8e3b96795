// ============================================================
// EQUIPMENT DOMAIN TYPES
// ============================================================
// Records, summaries, and history entries for the ingestion
// pipeline. No I/O, no async.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Maximum number of history entries retained by any store.
pub const HISTORY_CAP: usize = 5;

/// Columns every upload must provide, in canonical spelling.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Equipment Name",
    "Type",
    "Flowrate",
    "Pressure",
    "Temperature",
];

/// Suffix applied to filenames stored through the offline fallback.
pub const OFFLINE_TAG: &str = " (offline)";

/// One equipment sensor reading row.
///
/// Wire field names are exact and case-sensitive; columns beyond the
/// required five are preserved in `extra` and flattened into the JSON
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    #[serde(rename = "Equipment Name")]
    pub name: String,

    #[serde(rename = "Type")]
    pub equipment_type: String,

    #[serde(rename = "Flowrate")]
    pub flowrate: f64,

    #[serde(rename = "Pressure")]
    pub pressure: f64,

    #[serde(rename = "Temperature")]
    pub temperature: f64,

    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl EquipmentRecord {
    /// Derived presentation label: never stored, computed against a
    /// caller-supplied pressure threshold.
    pub fn status(&self, pressure_threshold: f64) -> &'static str {
        if self.pressure > pressure_threshold {
            "CRITICAL"
        } else {
            "STABLE"
        }
    }
}

/// Aggregate statistics over a set of records.
///
/// Averages are rounded to 2 decimal places with round-half-to-even,
/// and are `0.0` for an empty record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_count: usize,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: BTreeMap<String, usize>,
}

impl Summary {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            avg_flowrate: 0.0,
            avg_pressure: 0.0,
            avg_temperature: 0.0,
            type_distribution: BTreeMap::new(),
        }
    }
}

/// One completed ingestion event. Immutable once created; owned by the
/// history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "data")]
    pub records: Vec<EquipmentRecord>,
    pub summary: Summary,
}

impl HistoryEntry {
    pub fn new(filename: impl Into<String>, records: Vec<EquipmentRecord>, summary: Summary) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            timestamp: Utc::now(),
            records,
            summary,
        }
    }

    /// Rebuild this entry with the offline filename tag so consumers can
    /// tell locally-held uploads from durably persisted ones.
    pub fn tagged_offline(mut self) -> Self {
        if !self.filename.ends_with(OFFLINE_TAG) {
            self.filename.push_str(OFFLINE_TAG);
        }
        self
    }
}

/// Sample dataset used by demos and tests.
pub fn sample_csv() -> &'static str {
    "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
     Centrifugal Pump A,Pump,450.5,12.4,85.0\n\
     Heat Exchanger X1,Heat Exchanger,1200.0,4.5,145.2\n\
     Storage Tank T101,Tank,0.0,1.2,25.0\n\
     Reactor R-202,Reactor,850.0,45.0,210.5\n\
     Control Valve V-01,Valve,320.4,15.8,40.0\n\
     Distillation Column D1,Column,2500.0,2.5,180.0\n\
     Centrifugal Pump B,Pump,480.2,13.1,88.5\n\
     Reactor R-203,Reactor,890.0,42.5,215.0\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pressure: f64) -> EquipmentRecord {
        EquipmentRecord {
            name: "Pump1".to_string(),
            equipment_type: "Pump".to_string(),
            flowrate: 100.0,
            pressure,
            temperature: 30.0,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_status_threshold() {
        assert_eq!(record(50.0).status(40.0), "CRITICAL");
        assert_eq!(record(50.0).status(50.0), "STABLE");
        assert_eq!(record(10.0).status(40.0), "STABLE");
    }

    #[test]
    fn test_record_wire_field_names() {
        let json = serde_json::to_value(record(50.0)).unwrap();
        assert_eq!(json["Equipment Name"], "Pump1");
        assert_eq!(json["Type"], "Pump");
        assert_eq!(json["Flowrate"], 100.0);
        assert_eq!(json["Pressure"], 50.0);
        assert_eq!(json["Temperature"], 30.0);
    }

    #[test]
    fn test_extra_columns_flatten() {
        let mut rec = record(50.0);
        rec.extra.insert("Manufacturer".to_string(), "Acme".to_string());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["Manufacturer"], "Acme");

        let back: EquipmentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_offline_tag_applied_once() {
        let entry = HistoryEntry::new("x.csv", Vec::new(), Summary::empty());
        let tagged = entry.tagged_offline();
        assert_eq!(tagged.filename, "x.csv (offline)");
        let tagged_again = tagged.tagged_offline();
        assert_eq!(tagged_again.filename, "x.csv (offline)");
    }

    #[test]
    fn test_summary_wire_field_names() {
        let json = serde_json::to_value(Summary::empty()).unwrap();
        assert!(json.get("totalCount").is_some());
        assert!(json.get("avgFlowrate").is_some());
        assert!(json.get("typeDistribution").is_some());
    }
}
