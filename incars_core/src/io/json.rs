//! Module providing JSON IO for the input tables
//!
//! A table is stored as a JSON array of records, one object per row, with the column names
//! as keys.
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Read a JSON array of records into a table
///
/// # Examples
/// ```no_run
/// use incars_core::data::reaction::ReactionRecord;
/// use incars_core::io::json::read_records;
/// let reactions: Vec<ReactionRecord> = read_records("reactions.json").unwrap();
/// ```
pub fn read_records<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>, JsonError> {
    let data = match fs::read_to_string(path.as_ref()) {
        Ok(data) => data,
        Err(err) => {
            return Err(JsonError::UnableToRead(format!(
                "{}: {:?}",
                path.as_ref().display(),
                err
            )))
        }
    };
    parse_records(&data)
}

/// Parse a JSON array of records from a string
pub fn parse_records<T: DeserializeOwned>(data: &str) -> Result<Vec<T>, JsonError> {
    match serde_json::from_str::<Vec<T>>(data) {
        Ok(records) => Ok(records),
        Err(err) => Err(JsonError::UnableToParse(format!("{:?}", err))),
    }
}

/// Write a table as a JSON array of records
pub fn write_records<T: Serialize, P: AsRef<Path>>(records: &[T], path: P) -> Result<(), JsonError> {
    let data = serde_json::to_string_pretty(records)?;
    fs::write(path, data)?;
    Ok(())
}

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
