//! SDE to legacy CSV conversion
//!
//! Reads the JSON Lines static data export and rebuilds the flat tables of
//! the older CSV dump (`invTypes`, `industryActivity`, `invNames`, ...)
//! with the same headers, column order and value encoding.

pub mod convert;
pub mod driver;
pub mod error;
pub mod models;
pub mod sink;
pub mod source;
pub mod table;

pub use convert::ConvertOptions;
pub use driver::{convert, convert_all, convert_one, Converter, Registry, Report, TableSummary};
pub use error::{ConvertError, Result};
pub use sink::{CsvSink, SqliteSink, TableSink};
pub use source::SdeSource;
pub use table::{Cell, Table};
