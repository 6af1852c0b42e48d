use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CorrelationToken, Record, RequestName};

/// Key of a paged result: the fetch name plus the entity it is about
/// (typically an instrument code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub name: RequestName,
    pub entity: String,
}

impl SeriesKey {
    pub fn new(name: impl Into<RequestName>, entity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.entity)
    }
}

/// Column-oriented merge of every page of one logical fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultAccumulator {
    /// Field order as declared by the fetch
    fields: Vec<String>,
    /// Field name to values, in venue order across pages
    columns: BTreeMap<String, Vec<String>>,
    /// Items accumulated so far
    count: usize,
    /// Pages merged so far
    pages: usize,
    complete: bool,
    /// Submission whose first page started this series
    #[serde(default)]
    origin: Option<CorrelationToken>,
}

impl ResultAccumulator {
    /// Fresh accumulator collecting the given fields
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let columns = fields.iter().map(|f| (f.clone(), Vec::new())).collect();
        Self {
            fields,
            columns,
            count: 0,
            pages: 0,
            complete: false,
            origin: None,
        }
    }

    /// Tie the series to the submission that started it
    pub fn started_by(mut self, origin: CorrelationToken) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn origin(&self) -> Option<CorrelationToken> {
        self.origin
    }

    /// True when pages of `origin`'s fetch belong here
    pub fn is_from(&self, origin: CorrelationToken) -> bool {
        self.origin == Some(origin)
    }

    /// Append one item. Fields the record lacks are stored as empty strings so
    /// every column keeps the same length.
    pub fn append(&mut self, record: &Record) {
        for field in &self.fields {
            let value = record.get(field).unwrap_or_default().to_string();
            self.columns.entry(field.clone()).or_default().push(value);
        }
        self.count += 1;
    }

    /// Count one more merged page
    pub fn page_merged(&mut self) {
        self.pages += 1;
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn column(&self, field: &str) -> Option<&[String]> {
        self.columns.get(field).map(Vec::as_slice)
    }

    /// Rebuild item `index` as a record
    pub fn row(&self, index: usize) -> Option<Record> {
        if index >= self.count {
            return None;
        }
        Some(
            self.fields
                .iter()
                .map(|f| {
                    let value = self
                        .columns
                        .get(f)
                        .and_then(|c| c.get(index))
                        .cloned()
                        .unwrap_or_default();
                    (f.clone(), value)
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> Vec<Record> {
        (0..self.count).filter_map(|i| self.row(i)).collect()
    }
}
