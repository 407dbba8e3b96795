// ============================================================
// CSV PARSER
// ============================================================
// Parse raw upload bytes into validated equipment records

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;

use crate::domain::equipment::{EquipmentRecord, REQUIRED_COLUMNS};
use crate::domain::error::{AppError, Result};

/// CSV parser for equipment uploads.
///
/// Header matching is case- and order-insensitive; validation is
/// all-or-nothing, so the first bad cell rejects the whole record set.
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
        }
    }
}

/// Header positions of the required columns, resolved once per parse.
struct ColumnLayout {
    name: usize,
    equipment_type: usize,
    flowrate: usize,
    pressure: usize,
    temperature: usize,
    /// (header index, original header text) for columns beyond the five.
    extra: Vec<(usize, String)>,
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse raw file content. The first line is the header; a
    /// header-only file yields an empty record set.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<EquipmentRecord>> {
        // Uploads are not guaranteed to be clean UTF-8; decode lossily.
        let content = String::from_utf8_lossy(bytes);

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let layout = Self::resolve_columns(&headers)?;

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = index + 1;
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", row, e))
            })?;
            records.push(Self::parse_row(row, &layout, &record)?);
        }

        Ok(records)
    }

    /// Match required columns against the header, case-insensitively.
    fn resolve_columns(headers: &StringRecord) -> Result<ColumnLayout> {
        let mut positions = [None; REQUIRED_COLUMNS.len()];
        let mut extra = Vec::new();

        for (idx, header) in headers.iter().enumerate() {
            let matched = REQUIRED_COLUMNS
                .iter()
                .position(|required| required.eq_ignore_ascii_case(header));
            match matched {
                Some(slot) if positions[slot].is_none() => positions[slot] = Some(idx),
                _ => extra.push((idx, header.to_string())),
            }
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&positions)
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingColumns(missing));
        }

        Ok(ColumnLayout {
            name: positions[0].unwrap_or(0),
            equipment_type: positions[1].unwrap_or(0),
            flowrate: positions[2].unwrap_or(0),
            pressure: positions[3].unwrap_or(0),
            temperature: positions[4].unwrap_or(0),
            extra,
        })
    }

    /// Parse a single data row into a record
    fn parse_row(row: usize, layout: &ColumnLayout, record: &StringRecord) -> Result<EquipmentRecord> {
        let name = record.get(layout.name).unwrap_or("").to_string();
        let equipment_type = record.get(layout.equipment_type).unwrap_or("").to_string();

        let flowrate = Self::parse_float(row, "Flowrate", record.get(layout.flowrate))?;
        let pressure = Self::parse_float(row, "Pressure", record.get(layout.pressure))?;
        let temperature = Self::parse_float(row, "Temperature", record.get(layout.temperature))?;

        let mut extra = BTreeMap::new();
        for (idx, header) in &layout.extra {
            if let Some(value) = record.get(*idx) {
                extra.insert(header.clone(), value.to_string());
            }
        }

        Ok(EquipmentRecord {
            name,
            equipment_type,
            flowrate,
            pressure,
            temperature,
            extra,
        })
    }

    /// Numeric cells must parse as floats; no silent coercion to 0/NaN.
    fn parse_float(row: usize, column: &str, raw: Option<&str>) -> Result<f64> {
        let raw = raw.unwrap_or("");
        raw.parse::<f64>().map_err(|_| AppError::MalformedRow {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CSV: &str =
        "Equipment Name,Type,Flowrate,Pressure,Temperature\nPump1,Pump,100,50,30\nValve1,Valve,0,10,20\n";

    #[test]
    fn test_parse_valid_csv() {
        let records = CsvParser::new().parse(VALID_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Pump1");
        assert_eq!(records[0].equipment_type, "Pump");
        assert_eq!(records[0].flowrate, 100.0);
        assert_eq!(records[1].pressure, 10.0);
        assert!(records[0].extra.is_empty());
    }

    #[test]
    fn test_header_only_is_valid() {
        let records = CsvParser::new()
            .parse(b"Equipment Name,Type,Flowrate,Pressure,Temperature\n")
            .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_pressure_column() {
        let err = CsvParser::new()
            .parse(b"Equipment Name,Type,Flowrate,Temperature\nPump1,Pump,100,30\n")
            .unwrap_err();
        assert_eq!(err, AppError::MissingColumns(vec!["Pressure".to_string()]));
    }

    #[test]
    fn test_missing_all_columns() {
        let err = CsvParser::new().parse(b"a,b,c\n1,2,3\n").unwrap_err();
        match err {
            AppError::MissingColumns(missing) => assert_eq!(missing.len(), 5),
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_flowrate_cell() {
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\nPump1,Pump,100,50,30\nValve1,Valve,abc,10,20\n";
        let err = CsvParser::new().parse(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            AppError::MalformedRow {
                row: 2,
                column: "Flowrate".to_string(),
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_headers_case_and_order_insensitive() {
        let csv = "temperature,PRESSURE,flowrate,type,equipment name\n30,50,100,Pump,Pump1\n";
        let records = CsvParser::new().parse(csv.as_bytes()).unwrap();
        assert_eq!(records[0].name, "Pump1");
        assert_eq!(records[0].temperature, 30.0);
        assert_eq!(records[0].pressure, 50.0);
    }

    #[test]
    fn test_extra_columns_preserved() {
        let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature,Location\nPump1,Pump,100,50,30,Unit 4\n";
        let records = CsvParser::new().parse(csv.as_bytes()).unwrap();
        assert_eq!(records[0].extra.get("Location").map(String::as_str), Some("Unit 4"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        let csv = "Equipment Name , Type , Flowrate , Pressure , Temperature\n Pump1 , Pump , 100 , 50 , 30 \n";
        let records = CsvParser::new().parse(csv.as_bytes()).unwrap();
        assert_eq!(records[0].name, "Pump1");
        assert_eq!(records[0].flowrate, 100.0);
    }

    #[test]
    fn test_custom_delimiter() {
        let csv = "Equipment Name;Type;Flowrate;Pressure;Temperature\nPump1;Pump;100;50;30\n";
        let records = CsvParser::new().with_delimiter(b';').parse(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_sample_dataset_parses() {
        let records = CsvParser::new()
            .parse(crate::domain::equipment::sample_csv().as_bytes())
            .unwrap();
        assert_eq!(records.len(), 8);
    }
}
