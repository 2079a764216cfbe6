//! Per-table conversions from SDE records to legacy rows
//!
//! Every function here is a pure mapping from loaded records to one
//! `Table`; reading inputs and writing outputs is the driver's job.

pub mod industry;
pub mod inventory;
pub mod meta;
pub mod names;
pub mod reference;

/// Settings shared by all conversions
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Language code used to resolve localized names and descriptions
    pub language: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}
