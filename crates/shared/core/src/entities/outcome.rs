use serde::{Deserialize, Serialize};

use super::{Record, ResultAccumulator};

/// Final result of one logical request, handed to its completion handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The venue acknowledged the call; nothing else to report
    Ack,
    /// Single-item reply (stock info, deposit detail, login result)
    Record(Record),
    /// Multi-item reply that fits in one page (holdings, condition list)
    Rows(Vec<Record>),
    /// Merged pages of a paged fetch
    Series(ResultAccumulator),
}

impl Outcome {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Outcome::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[Record]> {
        match self {
            Outcome::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&ResultAccumulator> {
        match self {
            Outcome::Series(series) => Some(series),
            _ => None,
        }
    }
}
