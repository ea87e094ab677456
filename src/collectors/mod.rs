//! Row sources for the pipeline.
//!
//! A run starts from a list of topic rows. The production source reads a
//! Google Sheets range; tests use [`StaticRowSource`].

pub mod spreadsheet;

pub use spreadsheet::{
    parse_values, sample_rows, RowSource, SpreadsheetCollector, StaticRowSource, SHEETS_API_BASE,
};
