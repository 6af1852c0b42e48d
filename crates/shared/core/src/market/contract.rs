use serde::{Deserialize, Serialize};

use super::{fields, normalize_code};
use crate::entities::Record;
use crate::error::RecordResult;
use crate::values::{Price, Quantity, parse_price};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractSide {
    Buy,
    Sell,
}

/// Order acceptance or execution notice pushed by the venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub account: String,
    pub order_no: String,
    pub code: String,
    pub name: String,
    pub status: String,
    pub side: ContractSide,
    pub order_quantity: Quantity,
    pub order_price: Price,
    pub unfilled_quantity: Quantity,
    pub fill_price: Price,
    pub fill_quantity: Quantity,
    pub reject_reason: Option<String>,
}

impl Contract {
    /// Fully executed, nothing left working
    pub fn is_filled(&self) -> bool {
        self.fill_quantity > 0 && self.unfilled_quantity == 0
    }
}

impl TryFrom<&Record> for Contract {
    type Error = crate::error::RecordError;

    fn try_from(record: &Record) -> RecordResult<Self> {
        let kind = record.text(fields::ORDER_KIND).to_ascii_lowercase();
        let side = if kind.contains("buy") {
            ContractSide::Buy
        } else {
            ContractSide::Sell
        };
        let price = |field: &str| parse_price(record.get(field).unwrap_or_default());

        Ok(Self {
            account: record.text(fields::ACCOUNT),
            order_no: record.text(fields::ORDER_NO),
            code: normalize_code(record.require(fields::CODE)?).to_string(),
            name: record.text(fields::NAME),
            status: record.text(fields::ORDER_STATUS),
            side,
            order_quantity: record.int(fields::ORDER_QUANTITY, 0),
            order_price: price(fields::ORDER_PRICE),
            unfilled_quantity: record.int(fields::UNFILLED_QUANTITY, 0),
            fill_price: price(fields::FILL_PRICE),
            fill_quantity: record.int(fields::FILL_QUANTITY, 0),
            reject_reason: record
                .get(fields::REJECT_REASON)
                .filter(|r| !r.is_empty() && *r != "0")
                .map(str::to_string),
        })
    }
}
