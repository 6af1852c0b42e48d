use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BUY_FEE_RATE, SELL_FEE_RATE, fields, normalize_code};
use crate::entities::Record;
use crate::error::RecordResult;
use crate::values::{Price, Quantity, parse_price};

/// One position held in the account, as last reported by the venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub code: String,
    pub name: String,
    pub price: Price,
    /// Purchase price per share
    pub purchase_price: Price,
    pub quantity: Quantity,
    pub orderable_quantity: Quantity,
}

impl Holding {
    /// Placeholder for a code bought but not yet reported by a balance notice
    pub fn pending(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            price: Decimal::ZERO,
            purchase_price: Decimal::ZERO,
            quantity: 0,
            orderable_quantity: 0,
        }
    }

    /// Row of an account profit reply
    pub fn from_profit_record(record: &Record) -> RecordResult<Self> {
        let quantity = record.int(fields::QUANTITY, 0);
        Ok(Self {
            code: normalize_code(record.require(fields::CODE)?).to_string(),
            name: record.text(fields::NAME),
            price: parse_price(record.get(fields::PRICE).unwrap_or_default()),
            purchase_price: parse_price(record.get(fields::PURCHASE_PRICE).unwrap_or_default()),
            quantity,
            orderable_quantity: record.int(fields::ORDERABLE_QUANTITY, quantity),
        })
    }

    /// Balance push notification
    pub fn from_balance_record(record: &Record) -> RecordResult<Self> {
        Ok(Self {
            code: normalize_code(record.require(fields::CODE)?).to_string(),
            name: record.text(fields::NAME),
            price: parse_price(record.get(fields::PRICE).unwrap_or_default()),
            purchase_price: parse_price(record.get(fields::PURCHASE_PRICE).unwrap_or_default()),
            quantity: record.int(fields::QUANTITY, 0),
            orderable_quantity: record.int(fields::ORDERABLE_QUANTITY, 0),
        })
    }

    /// Gross unrealised profit
    pub fn profit(&self) -> Decimal {
        (self.price - self.purchase_price) * Decimal::from(self.quantity)
    }

    /// Unrealised profit after buy commission and sell commission plus tax
    pub fn net_profit(&self) -> Decimal {
        let quantity = Decimal::from(self.quantity);
        let proceeds = self.price * quantity * (Decimal::ONE - SELL_FEE_RATE);
        let cost = self.purchase_price * quantity * (Decimal::ONE + BUY_FEE_RATE);
        proceeds - cost
    }

    /// True until a balance notice fills in the position
    pub fn is_pending(&self) -> bool {
        self.quantity == 0 && self.name.is_empty()
    }
}
