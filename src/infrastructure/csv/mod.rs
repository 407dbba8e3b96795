// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Parsing and validation of equipment CSV uploads

mod csv_parser;

pub use csv_parser::CsvParser;
