// ============================================================
// SUMMARIZER USE CASE
// ============================================================
// Reduce a record set into aggregate statistics

use std::collections::BTreeMap;

use crate::domain::equipment::{EquipmentRecord, Summary};

/// Compute aggregate statistics over a record set.
///
/// Pure and deterministic. Averages use round-half-to-even to 2 decimal
/// places, pinned explicitly rather than left to a runtime default, and
/// an empty record set yields all-zero averages.
pub fn summarize(records: &[EquipmentRecord]) -> Summary {
    if records.is_empty() {
        return Summary::empty();
    }

    let count = records.len() as f64;
    let mut flowrate_sum = 0.0;
    let mut pressure_sum = 0.0;
    let mut temperature_sum = 0.0;
    let mut type_distribution: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        flowrate_sum += record.flowrate;
        pressure_sum += record.pressure;
        temperature_sum += record.temperature;
        *type_distribution
            .entry(record.equipment_type.clone())
            .or_insert(0) += 1;
    }

    Summary {
        total_count: records.len(),
        avg_flowrate: round2(flowrate_sum / count),
        avg_pressure: round2(pressure_sum / count),
        avg_temperature: round2(temperature_sum / count),
        type_distribution,
    }
}

/// Round to 2 decimal places, ties to even (banker's rounding).
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
