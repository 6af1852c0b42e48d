use serde::{Deserialize, Serialize};

use super::fields;
use crate::entities::{Record, ResultAccumulator};
use crate::error::{RecordError, RecordResult};
use crate::values::{Price, Quantity, SeriesTime, parse_price, parse_series_time};

/// One chart bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: SeriesTime,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Quantity,
}

impl Candle {
    /// Field list a chart fetch collects, in venue order
    pub const FIELDS: [&'static str; 6] = [
        fields::TIME,
        fields::OPEN,
        fields::HIGH,
        fields::LOW,
        fields::CLOSE,
        fields::VOLUME,
    ];

    /// Convert a merged chart series, skipping rows whose time cannot be parsed
    pub fn from_series(series: &ResultAccumulator) -> Vec<Candle> {
        series
            .rows()
            .iter()
            .filter_map(|row| Candle::try_from(row).ok())
            .collect()
    }
}

impl TryFrom<&Record> for Candle {
    type Error = RecordError;

    fn try_from(record: &Record) -> RecordResult<Self> {
        let raw_time = record.require(fields::TIME)?;
        let time = parse_series_time(raw_time).ok_or_else(|| RecordError::InvalidField {
            field: fields::TIME.to_string(),
            value: raw_time.to_string(),
        })?;

        let price = |field: &str| parse_price(record.get(field).unwrap_or_default());

        Ok(Self {
            time,
            open: price(fields::OPEN),
            high: price(fields::HIGH),
            low: price(fields::LOW),
            close: price(fields::CLOSE),
            volume: record.int(fields::VOLUME, 0),
        })
    }
}
