use serde::{Deserialize, Serialize};

use super::BUY_CEILING_PER_STOCK;
use crate::values::{Price, Quantity};

/// Order intent, encoded as the venue's numeric order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    NewBuy,
    NewSell,
    CancelBuy,
    CancelSell,
    AmendBuy,
    AmendSell,
}

impl OrderKind {
    pub fn code(&self) -> u8 {
        match self {
            OrderKind::NewBuy => 1,
            OrderKind::NewSell => 2,
            OrderKind::CancelBuy => 3,
            OrderKind::CancelSell => 4,
            OrderKind::AmendBuy => 5,
            OrderKind::AmendSell => 6,
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(
            self,
            OrderKind::NewBuy | OrderKind::CancelBuy | OrderKind::AmendBuy
        )
    }

    /// Cancels and amends must name the order they act on
    pub fn needs_original(&self) -> bool {
        !matches!(self, OrderKind::NewBuy | OrderKind::NewSell)
    }
}

/// Pricing rule of an order (the venue's two-digit quote type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceKind {
    #[default]
    Limit,
    Market,
    ConditionalLimit,
    BestLimit,
    PriorityLimit,
    LimitIoc,
    MarketIoc,
    BestIoc,
    LimitFok,
    MarketFok,
    BestFok,
    PreMarketClose,
    AfterHoursSingle,
    PostMarketClose,
}

impl PriceKind {
    pub fn code(&self) -> &'static str {
        match self {
            PriceKind::Limit => "00",
            PriceKind::Market => "03",
            PriceKind::ConditionalLimit => "05",
            PriceKind::BestLimit => "06",
            PriceKind::PriorityLimit => "07",
            PriceKind::LimitIoc => "10",
            PriceKind::MarketIoc => "13",
            PriceKind::BestIoc => "16",
            PriceKind::LimitFok => "20",
            PriceKind::MarketFok => "23",
            PriceKind::BestFok => "26",
            PriceKind::PreMarketClose => "61",
            PriceKind::AfterHoursSingle => "62",
            PriceKind::PostMarketClose => "81",
        }
    }

    /// Market-type orders are sent with price 0
    pub fn is_priced(&self) -> bool {
        !matches!(
            self,
            PriceKind::Market | PriceKind::MarketIoc | PriceKind::MarketFok
        )
    }
}

/// Everything needed to place, cancel or amend one order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub account: String,
    pub code: String,
    pub kind: OrderKind,
    pub quantity: Quantity,
    pub price: Price,
    #[serde(default)]
    pub price_kind: PriceKind,
    /// Required for cancels and amends
    #[serde(default)]
    pub original_order_no: Option<String>,
}

impl OrderTicket {
    pub fn limit_buy(account: &str, code: &str, quantity: Quantity, price: Price) -> Self {
        Self {
            account: account.to_string(),
            code: code.to_string(),
            kind: OrderKind::NewBuy,
            quantity,
            price,
            price_kind: PriceKind::Limit,
            original_order_no: None,
        }
    }

    pub fn market_sell(account: &str, code: &str, quantity: Quantity) -> Self {
        Self {
            account: account.to_string(),
            code: code.to_string(),
            kind: OrderKind::NewSell,
            quantity,
            price: Price::ZERO,
            price_kind: PriceKind::Market,
            original_order_no: None,
        }
    }

    /// Order value at the ticket price
    pub fn notional(&self) -> Price {
        self.price * Price::from(self.quantity)
    }

    /// Validate the ticket based on kind and pricing requirements
    ///
    /// Priced new buys must stay within [`BUY_CEILING_PER_STOCK`].
    pub fn validate(&self) -> bool {
        if self.quantity <= 0 || self.code.is_empty() || self.account.is_empty() {
            return false;
        }
        if self.price_kind.is_priced() && self.price <= Price::ZERO {
            return false;
        }
        if self.kind == OrderKind::NewBuy && self.notional() > Price::from(BUY_CEILING_PER_STOCK) {
            return false;
        }
        !self.kind.needs_original() || self.original_order_no.is_some()
    }
}
