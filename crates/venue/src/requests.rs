//! Request catalogue
//!
//! One builder per venue operation. Each returns a [`Submission`] carrying the
//! request name replies are correlated by and the decoder for its reply.

use relay_core::market::fields;
use relay_core::{Candle, OrderTicket};
use relay_engine::{SeriesSpec, Submission};
use relay_ports::{VenueCall, VenueError, VenueResult};

use crate::decoders;

/// Request names
pub mod names {
    pub const CONNECT: &str = "connect";
    pub const STOCK_INFO: &str = "stock_info";
    pub const MINUTE_CHART: &str = "minute_chart";
    pub const ACCOUNT_PROFIT: &str = "account_profit";
    pub const DEPOSIT_DETAIL: &str = "deposit_detail";
    pub const LOAD_CONDITIONS: &str = "load_conditions";
    pub const SEND_CONDITION: &str = "send_condition";
    pub const SEND_ORDER: &str = "send_order";
}

/// Native actions
pub mod actions {
    pub const CONNECT: &str = "CommConnect";
    pub const STOCK_INFO: &str = "opt10001";
    pub const MINUTE_CHART: &str = "opt10080";
    pub const ACCOUNT_PROFIT: &str = "opt10085";
    pub const DEPOSIT_DETAIL: &str = "opw00001";
    pub const LOAD_CONDITIONS: &str = "GetConditionLoad";
    pub const SEND_CONDITION: &str = "SendCondition";
    pub const SEND_ORDER: &str = "SendOrder";
}

/// Screen numbers group replies on the venue side
pub mod screens {
    pub const STOCK_INFO_PREFIX: &str = "B";
    pub const MINUTE_CHART_PREFIX: &str = "C";
    pub const ACCOUNT_PROFIT: &str = "AP";
    pub const DEPOSIT_DETAIL: &str = "AB";
    pub const CONDITION_SEARCH: &str = "S";
    pub const ORDER: &str = "O";
}

/// Minute chart tick ranges the venue accepts
pub const CHART_TICKS: [u32; 8] = [1, 3, 5, 10, 15, 30, 45, 60];

/// Input keys
pub const INPUT_CODE: &str = "code";
pub const INPUT_TICK: &str = "tick";
pub const INPUT_ADJUSTED: &str = "adjusted";
pub const INPUT_ACCOUNT: &str = "account";

pub fn connect() -> Submission {
    Submission::decoded(VenueCall::new(names::CONNECT, actions::CONNECT), decoders::login)
}

pub fn stock_info(code: &str) -> Submission {
    let call = VenueCall::new(names::STOCK_INFO, actions::STOCK_INFO)
        .screen(format!("{}{code}", screens::STOCK_INFO_PREFIX))
        .input(INPUT_CODE, code);
    Submission::decoded(call, decoders::stock_info).with_entity(code)
}

/// Paged minute candles, newest first
///
/// `tick` outside [`CHART_TICKS`] is rejected.
pub fn minute_chart(code: &str, tick: u32, adjusted: bool) -> VenueResult<Submission> {
    if !CHART_TICKS.contains(&tick) {
        return Err(VenueError::InvalidCall(format!("unsupported tick range {tick}")));
    }
    let call = VenueCall::new(names::MINUTE_CHART, actions::MINUTE_CHART)
        .screen(format!("{}{code}", screens::MINUTE_CHART_PREFIX))
        .input(INPUT_CODE, code)
        .input(INPUT_TICK, tick)
        .input(INPUT_ADJUSTED, if adjusted { 1 } else { 0 });
    Ok(Submission::series(call, code, SeriesSpec::new(fields::TIME, Candle::FIELDS)))
}

pub fn account_profit(account: &str) -> Submission {
    let call = VenueCall::new(names::ACCOUNT_PROFIT, actions::ACCOUNT_PROFIT)
        .screen(screens::ACCOUNT_PROFIT)
        .input(INPUT_ACCOUNT, account);
    Submission::decoded(call, decoders::account_profit).with_entity(account)
}

pub fn deposit_detail(account: &str) -> Submission {
    let call = VenueCall::new(names::DEPOSIT_DETAIL, actions::DEPOSIT_DETAIL)
        .screen(screens::DEPOSIT_DETAIL)
        .input(INPUT_ACCOUNT, account);
    Submission::decoded(call, decoders::deposit_detail).with_entity(account)
}

/// Condition list; the first condition is searched in real time once it arrives
pub fn load_conditions() -> Submission {
    let call = VenueCall::new(names::LOAD_CONDITIONS, actions::LOAD_CONDITIONS);
    Submission::decoded(call, decoders::condition_list)
}

/// Real-time condition search
pub fn send_condition(name: &str, index: u32) -> Submission {
    let call = VenueCall::new(names::SEND_CONDITION, actions::SEND_CONDITION)
        .screen(screens::CONDITION_SEARCH)
        .arg(screens::CONDITION_SEARCH)
        .arg(name)
        .arg(index)
        // 1: keep pushing membership changes
        .arg(1);
    Submission::decoded(call, decoders::condition_codes).with_entity(name)
}

pub fn send_order(ticket: &OrderTicket) -> VenueResult<Submission> {
    if !ticket.validate() {
        return Err(VenueError::InvalidCall(format!(
            "invalid {:?} ticket for {}",
            ticket.kind, ticket.code
        )));
    }
    let call = VenueCall::new(names::SEND_ORDER, actions::SEND_ORDER)
        .screen(screens::ORDER)
        .arg(names::SEND_ORDER)
        .arg(screens::ORDER)
        .arg(&ticket.account)
        .arg(ticket.kind.code())
        .arg(&ticket.code)
        .arg(ticket.quantity)
        .arg(ticket.price)
        .arg(ticket.price_kind.code())
        .arg(ticket.original_order_no.as_deref().unwrap_or_default());
    Ok(Submission::decoded(call, decoders::order_ack).with_entity(ticket.code.as_str()))
}
