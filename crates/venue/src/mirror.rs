//! Best-effort local copy of account state
//!
//! Fed by push notifications (execution, balance, condition membership) and by
//! completions of account queries. Eventually consistent with the venue only.

use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use relay_core::market::{fields, normalize_code};
use relay_core::{Contract, ContractSide, Holding, OrderTicket, Outcome, Record, StockInfo};
use relay_engine::{Broker, Completion};
use relay_ports::{PageReader, Push};
use std::sync::Arc;

use crate::requests::names;
use crate::topics;

const EXECUTION_FIELDS: [&str; 12] = [
    fields::ACCOUNT,
    fields::ORDER_NO,
    fields::CODE,
    fields::NAME,
    fields::ORDER_STATUS,
    fields::ORDER_KIND,
    fields::ORDER_QUANTITY,
    fields::ORDER_PRICE,
    fields::UNFILLED_QUANTITY,
    fields::FILL_PRICE,
    fields::FILL_QUANTITY,
    fields::REJECT_REASON,
];

const BALANCE_FIELDS: [&str; 6] = [
    fields::CODE,
    fields::NAME,
    fields::PRICE,
    fields::PURCHASE_PRICE,
    fields::QUANTITY,
    fields::ORDERABLE_QUANTITY,
];

const CONDITION_FIELDS: [&str; 4] = [
    fields::CODE,
    fields::EVENT,
    fields::CONDITION_NAME,
    fields::CONDITION_INDEX,
];

#[derive(Debug, Default)]
pub struct AccountMirror {
    holdings: DashMap<String, Holding>,
    /// Codes with an order sent but no execution notice yet
    ordered: DashSet<String>,
    /// Codes to watch, from condition searches
    monitored: DashSet<String>,
    stocks: DashMap<String, StockInfo>,
    orderable_cash: RwLock<Option<i64>>,
}

impl AccountMirror {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Subscribe to the broker's push topics
    pub fn attach(self: &Arc<Self>, broker: &Broker) {
        for topic in [topics::EXECUTION, topics::BALANCE, topics::CONDITION, topics::REAL] {
            let mirror = self.clone();
            broker.on_push(topic, move |push| mirror.on_push(push));
        }
    }

    pub fn on_push(&self, push: &Push) {
        let page = push.page.as_ref();
        for index in 0..page.len() {
            match push.topic.as_str() {
                topics::EXECUTION => self.apply_execution(&page.record(index, &EXECUTION_FIELDS)),
                topics::BALANCE => self.apply_balance(&page.record(index, &BALANCE_FIELDS)),
                topics::CONDITION => {
                    self.apply_condition_event(&page.record(index, &CONDITION_FIELDS))
                }
                topics::REAL => {
                    let record = page.record(index, &[fields::CODE, fields::REAL_TYPE, fields::REAL_DATA]);
                    log::debug!(
                        "Real {} {}: {}",
                        record.text(fields::CODE),
                        record.text(fields::REAL_TYPE),
                        record.text(fields::REAL_DATA)
                    );
                }
                other => log::debug!("Ignoring push topic {other}"),
            }
        }
    }

    /// Order accepted or filled
    pub fn apply_execution(&self, record: &Record) {
        let contract = match Contract::try_from(record) {
            Ok(contract) => contract,
            Err(err) => {
                log::warn!("Unreadable execution notice: {err}");
                return;
            }
        };
        log::debug!(
            "Execution {} {:?} {}: {} filled, {} open",
            contract.order_no,
            contract.side,
            contract.code,
            contract.fill_quantity,
            contract.unfilled_quantity
        );

        self.ordered.remove(&contract.code);
        match contract.side {
            ContractSide::Buy => {
                // Details arrive with the next balance notice
                self.holdings
                    .entry(contract.code.clone())
                    .or_insert_with(|| Holding::pending(contract.code.clone()));
            }
            ContractSide::Sell => {
                self.holdings.remove(&contract.code);
            }
        }
    }

    pub fn apply_balance(&self, record: &Record) {
        match Holding::from_balance_record(record) {
            Ok(holding) => {
                log::debug!("Balance {}: {} @ {}", holding.code, holding.quantity, holding.price);
                self.holdings.insert(holding.code.clone(), holding);
            }
            Err(err) => log::warn!("Unreadable balance notice: {err}"),
        }
    }

    /// `I` adds a code to the monitor set, `D` removes it
    pub fn apply_condition_event(&self, record: &Record) {
        let code = normalize_code(record.get(fields::CODE).unwrap_or_default()).to_string();
        if code.is_empty() {
            return;
        }
        match record.get(fields::EVENT) {
            Some("I") => {
                self.monitored.insert(code);
            }
            Some("D") => {
                self.monitored.remove(&code);
            }
            other => log::warn!("Unknown condition event {other:?} for {code}"),
        }
    }

    /// Fold a completed account or search query into the mirror
    pub fn apply(&self, completion: &Completion) {
        let Some(outcome) = completion.outcome() else {
            return;
        };
        match (completion.name.as_str(), outcome) {
            (names::STOCK_INFO, Outcome::Record(record)) => {
                if let Ok(info) = StockInfo::try_from(record) {
                    self.stocks.insert(info.code.clone(), info);
                }
            }
            (names::ACCOUNT_PROFIT, Outcome::Rows(rows)) => {
                for row in rows {
                    if let Ok(holding) = Holding::from_profit_record(row) {
                        self.holdings.insert(holding.code.clone(), holding);
                    }
                }
            }
            (names::DEPOSIT_DETAIL, Outcome::Record(record)) => {
                *self.orderable_cash.write() = Some(record.int(fields::ORDERABLE_CASH, 0));
            }
            (names::SEND_CONDITION, Outcome::Rows(rows)) => {
                for row in rows {
                    if let Some(code) = row.get(fields::CODE) {
                        self.monitored.insert(normalize_code(code).to_string());
                    }
                }
            }
            _ => {}
        }
    }

    /// Remember an order until its execution notice arrives
    pub fn record_order(&self, ticket: &OrderTicket) {
        self.ordered.insert(ticket.code.clone());
    }

    pub fn is_ordered(&self, code: &str) -> bool {
        self.ordered.contains(code)
    }

    pub fn holding(&self, code: &str) -> Option<Holding> {
        self.holdings.get(code).map(|entry| entry.value().clone())
    }

    /// Holdings sorted by code
    pub fn holdings(&self) -> Vec<Holding> {
        let mut holdings: Vec<Holding> =
            self.holdings.iter().map(|entry| entry.value().clone()).collect();
        holdings.sort_by(|a, b| a.code.cmp(&b.code));
        holdings
    }

    pub fn monitored(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.monitored.iter().map(|code| code.clone()).collect();
        codes.sort();
        codes
    }

    pub fn ordered(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.ordered.iter().map(|code| code.clone()).collect();
        codes.sort();
        codes
    }

    pub fn stock(&self, code: &str) -> Option<StockInfo> {
        self.stocks.get(code).map(|entry| entry.value().clone())
    }

    pub fn orderable_cash(&self) -> Option<i64> {
        *self.orderable_cash.read()
    }
}
