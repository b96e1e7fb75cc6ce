//! Typed dataset records parsed from input lines

use chrono::NaiveDateTime;
use thiserror::Error;

/// Minimum number of whitespace-separated fields a dataset line must carry:
/// id, owner, secret, date taken, time taken.
const MIN_FIELDS: usize = 5;

/// One unit of work: a photo reference extracted from a dataset line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    pub line_no: usize,
    pub id: String,
    pub owner: String,
    pub taken: NaiveDateTime,
}

/// Why a dataset line could not be turned into a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected at least 5 whitespace-separated fields, found {0}")]
    FieldCount(usize),
    #[error("invalid taken timestamp {0:?}: {1}")]
    Timestamp(String, chrono::format::ParseError),
}

impl DatasetRecord {
    /// Parse one dataset line. Field positions are fixed; the time field may
    /// carry a trailing fractional second.
    pub fn parse(line_no: usize, line: &str) -> Result<Self, RecordError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::FieldCount(fields.len()));
        }

        let stamp = format!("{} {}", fields[3], fields[4]);
        let taken = NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S%.f")
            .map_err(|e| RecordError::Timestamp(stamp.clone(), e))?;

        Ok(Self {
            line_no,
            id: fields[0].to_string(),
            owner: fields[1].to_string(),
            taken,
        })
    }

    /// First token of a line, used to label failures for unparseable records.
    pub fn probable_id(line: &str) -> Option<String> {
        line.split_whitespace().next().map(str::to_string)
    }
}
