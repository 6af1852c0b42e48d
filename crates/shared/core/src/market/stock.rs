use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fields;
use crate::entities::Record;
use crate::error::{RecordError, RecordResult};
use crate::values::{Price, Quantity, parse_price, safe_cast};

/// Basic quote snapshot for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockInfo {
    pub code: String,
    pub name: String,
    pub price: Price,
    /// Percent change from the previous close, signed
    pub change_rate: Decimal,
    pub volume: Quantity,
}

impl TryFrom<&Record> for StockInfo {
    type Error = RecordError;

    fn try_from(record: &Record) -> RecordResult<Self> {
        Ok(Self {
            code: record.require(fields::CODE)?.to_string(),
            name: record.text(fields::NAME),
            price: parse_price(record.get(fields::PRICE).unwrap_or_default()),
            change_rate: safe_cast(
                record
                    .get(fields::CHANGE_RATE)
                    .unwrap_or_default()
                    .trim_start_matches('+'),
                Decimal::ZERO,
            ),
            volume: record.int(fields::VOLUME, 0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stock_info_from_record() {
        let record = Record::new()
            .with(fields::CODE, "005930")
            .with(fields::NAME, "Samsung Electronics")
            .with(fields::PRICE, "-71000")
            .with(fields::CHANGE_RATE, "-1.25")
            .with(fields::VOLUME, "1234567");

        let info = StockInfo::try_from(&record).unwrap();
        assert_eq!(info.price, dec!(71000));
        assert_eq!(info.change_rate, dec!(-1.25));
        assert_eq!(info.volume, 1234567);
    }

    #[test]
    fn test_stock_info_requires_code() {
        let record = Record::new().with(fields::NAME, "x");
        assert_eq!(
            StockInfo::try_from(&record),
            Err(RecordError::MissingField(fields::CODE.to_string()))
        );
    }
}
