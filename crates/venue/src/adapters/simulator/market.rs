use chrono::{Duration, NaiveDateTime};
use relay_core::market::fields;
use relay_core::{Page, Record};
use relay_ports::{VenueCall, VenueError};
use std::collections::HashMap;

use crate::requests::{INPUT_CODE, actions};
use crate::topics;

/// What the simulated venue does with one call
#[derive(Debug, Clone)]
pub enum Response {
    /// Reply after the venue latency
    Reply { more: bool, page: Page },
    /// Accept the call and never answer
    Drop,
    /// Refuse the call
    Fail(VenueError),
}

impl Response {
    pub fn page(page: Page) -> Self {
        Response::Reply { more: false, page }
    }

    pub fn record(record: Record) -> Self {
        Self::page(Page::single(record))
    }
}

/// Venue-side state the simulator answers from
#[derive(Debug, Clone)]
pub struct Market {
    login_code: i64,
    stocks: HashMap<String, Record>,
    /// Chart rows per code, newest first
    charts: HashMap<String, Vec<Record>>,
    /// Next chart row to serve per code
    cursors: HashMap<String, usize>,
    page_size: usize,
    holdings: Vec<Record>,
    orderable_cash: i64,
    conditions: Vec<(u32, String)>,
    condition_codes: HashMap<String, Vec<String>>,
    next_order_no: u64,
}

impl Default for Market {
    fn default() -> Self {
        Self {
            login_code: 0,
            stocks: HashMap::new(),
            charts: HashMap::new(),
            cursors: HashMap::new(),
            page_size: 900,
            holdings: Vec::new(),
            orderable_cash: 0,
            conditions: Vec::new(),
            condition_codes: HashMap::new(),
            next_order_no: 1,
        }
    }
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small market for dry runs: two stocks with a day of minute bars,
    /// one holding and one saved condition
    pub fn sample(chart_end: NaiveDateTime) -> Self {
        Market::new()
            .with_stock("005930", "Samsung Electronics", 70_000)
            .with_stock("000660", "SK hynix", 120_000)
            .with_chart("005930", minute_bars(chart_end, 1_200, 70_000))
            .with_chart("000660", minute_bars(chart_end, 1_200, 120_000))
            .with_holding(
                Record::new()
                    .with(fields::CODE, "A000660")
                    .with(fields::NAME, "SK hynix")
                    .with(fields::PRICE, "+121000")
                    .with(fields::PURCHASE_PRICE, "118000")
                    .with(fields::QUANTITY, "4"),
            )
            .with_cash(2_500_000)
            .with_condition(0, "momentum", ["005930", "035420"])
    }

    /// Login result code, 0 for success
    pub fn with_login_code(mut self, code: i64) -> Self {
        self.login_code = code;
        self
    }

    pub fn with_stock(mut self, code: &str, name: &str, price: i64) -> Self {
        let record = Record::new()
            .with(fields::CODE, code)
            .with(fields::NAME, name)
            .with(fields::PRICE, format!("+{price}"))
            .with(fields::CHANGE_RATE, "+0.50")
            .with(fields::VOLUME, "1000");
        self.stocks.insert(code.to_string(), record);
        self
    }

    /// Chart rows for `code`, newest first
    pub fn with_chart(mut self, code: &str, rows: Vec<Record>) -> Self {
        self.charts.insert(code.to_string(), rows);
        self
    }

    /// Rows per chart page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_holding(mut self, record: Record) -> Self {
        self.holdings.push(record);
        self
    }

    pub fn with_cash(mut self, orderable_cash: i64) -> Self {
        self.orderable_cash = orderable_cash;
        self
    }

    pub fn with_condition<I, S>(mut self, index: u32, name: &str, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.push((index, name.to_string()));
        self.condition_codes
            .insert(name.to_string(), codes.into_iter().map(Into::into).collect());
        self
    }

    /// Answer one call; the second value holds pushes to send after the reply
    pub fn respond(&mut self, call: &VenueCall) -> (Response, Vec<(&'static str, Page)>) {
        let code = call.input_value(INPUT_CODE).unwrap_or_default().to_string();
        let response = match call.action.as_str() {
            actions::CONNECT => {
                Response::record(Record::new().with(fields::ERR_CODE, self.login_code.to_string()))
            }
            actions::STOCK_INFO => match self.stocks.get(&code) {
                Some(record) => Response::record(record.clone()),
                None => Response::page(Page::empty()),
            },
            actions::MINUTE_CHART => self.chart_page(&code, call.continuation),
            actions::ACCOUNT_PROFIT => Response::page(Page::new(self.holdings.clone())),
            actions::DEPOSIT_DETAIL => Response::record(
                Record::new().with(fields::ORDERABLE_CASH, format!("{:015}", self.orderable_cash)),
            ),
            actions::LOAD_CONDITIONS => {
                let list: String = self
                    .conditions
                    .iter()
                    .map(|(index, name)| format!("{index}^{name};"))
                    .collect();
                Response::record(Record::new().with(fields::CONDITIONS, list))
            }
            actions::SEND_CONDITION => {
                let name = call.args.get(1).cloned().unwrap_or_default();
                let codes: String = self
                    .condition_codes
                    .get(&name)
                    .map(|codes| codes.iter().map(|code| format!("{code};")).collect())
                    .unwrap_or_default();
                Response::record(Record::new().with(fields::CODES, codes))
            }
            actions::SEND_ORDER => return self.place_order(call),
            other => Response::Fail(VenueError::InvalidCall(format!("unknown action {other}"))),
        };
        (response, Vec::new())
    }

    fn chart_page(&mut self, code: &str, continuation: bool) -> Response {
        let Some(rows) = self.charts.get(code) else {
            return Response::page(Page::empty());
        };
        let cursor = self.cursors.entry(code.to_string()).or_insert(0);
        if !continuation {
            *cursor = 0;
        }
        let start = (*cursor).min(rows.len());
        let end = (start + self.page_size).min(rows.len());
        *cursor = end;
        Response::Reply {
            more: end < rows.len(),
            page: Page::new(rows[start..end].to_vec()),
        }
    }

    /// Accept and immediately fill an order
    fn place_order(&mut self, call: &VenueCall) -> (Response, Vec<(&'static str, Page)>) {
        let arg = |index: usize| call.args.get(index).map(String::as_str).unwrap_or_default();
        let (account, kind, code, quantity, price) = (arg(2), arg(3), arg(4), arg(5), arg(6));
        let order_no = format!("{:07}", self.next_order_no);
        self.next_order_no += 1;

        // Odd order types are buys
        let is_buy = kind.parse::<u8>().map(|kind| kind % 2 == 1).unwrap_or(false);
        let execution = Record::new()
            .with(fields::ACCOUNT, account)
            .with(fields::ORDER_NO, order_no.as_str())
            .with(fields::CODE, format!("A{code}"))
            .with(fields::ORDER_STATUS, "filled")
            .with(fields::ORDER_KIND, if is_buy { "+buy" } else { "-sell" })
            .with(fields::ORDER_QUANTITY, quantity)
            .with(fields::ORDER_PRICE, price)
            .with(fields::UNFILLED_QUANTITY, "0")
            .with(fields::FILL_PRICE, price)
            .with(fields::FILL_QUANTITY, quantity);

        let mut pushes = vec![(topics::EXECUTION, Page::single(execution))];
        if is_buy {
            let name = self
                .stocks
                .get(code)
                .map(|stock| stock.text(fields::NAME))
                .unwrap_or_default();
            let balance = Record::new()
                .with(fields::CODE, format!("A{code}"))
                .with(fields::NAME, name)
                .with(fields::PRICE, price)
                .with(fields::PURCHASE_PRICE, price)
                .with(fields::QUANTITY, quantity)
                .with(fields::ORDERABLE_QUANTITY, quantity);
            pushes.push((topics::BALANCE, Page::single(balance)));
        }

        let reply = Record::new()
            .with(fields::ORDER_NO, order_no)
            .with(fields::CODE, code);
        (Response::record(reply), pushes)
    }
}

/// `count` one-minute bars ending at `end`, newest first
pub fn minute_bars(end: NaiveDateTime, count: usize, base_price: i64) -> Vec<Record> {
    (0..count)
        .map(|index| {
            let time = end - Duration::minutes(index as i64);
            let price = base_price + (index as i64 % 20) * 100;
            Record::new()
                .with(fields::TIME, time.format("%Y%m%d%H%M%S").to_string())
                .with(fields::OPEN, format!("+{price}"))
                .with(fields::HIGH, format!("+{}", price + 100))
                .with(fields::LOW, format!("-{}", price - 100))
                .with(fields::CLOSE, format!("+{price}"))
                .with(fields::VOLUME, "100")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests;
    use chrono::NaiveDate;
    use relay_core::SeriesTime;
    use relay_core::values::parse_series_time;
    use rust_decimal_macros::dec;

    fn row_time(row: &Record) -> Option<SeriesTime> {
        row.get(fields::TIME).and_then(parse_series_time)
    }

    fn end() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 2)
            .and_then(|date| date.and_hms_opt(15, 30, 0))
            .unwrap()
    }

    fn reply(response: Response) -> (bool, Page) {
        match response {
            Response::Reply { more, page } => (more, page),
            other => panic!("expected a reply, got {other:?}"),
        }
    }

    #[test]
    fn test_chart_pages_follow_continuation() {
        let mut market = Market::new()
            .with_chart("005930", minute_bars(end(), 25, 100))
            .with_page_size(10);
        let call = requests::minute_chart("005930", 1, true).unwrap().call;

        let (more, first) = reply(market.respond(&call).0);
        assert!(more);
        assert_eq!(first.len(), 10);
        assert_eq!(row_time(&first.rows()[0]), Some(20230102153000));

        let (_, second) = reply(market.respond(&call.next_page()).0);
        assert_eq!(row_time(&second.rows()[0]), Some(20230102152000));

        let (more, third) = reply(market.respond(&call.next_page()).0);
        assert!(!more);
        assert_eq!(third.len(), 5);

        // A fresh call starts over
        let (_, again) = reply(market.respond(&call).0);
        assert_eq!(row_time(&again.rows()[0]), Some(20230102153000));
    }

    #[test]
    fn test_buy_order_pushes_execution_and_balance() {
        let mut market = Market::new().with_stock("005930", "Samsung Electronics", 70_000);
        let ticket = relay_core::OrderTicket::limit_buy("acc", "005930", 3, dec!(70000));
        let call = requests::send_order(&ticket).unwrap().call;

        let (response, pushes) = market.respond(&call);
        let (_, page) = reply(response);
        assert_eq!(page.rows()[0].get(fields::ORDER_NO), Some("0000001"));

        let sent: Vec<&str> = pushes.iter().map(|(topic, _)| *topic).collect();
        assert_eq!(sent, vec![topics::EXECUTION, topics::BALANCE]);
        assert_eq!(pushes[1].1.rows()[0].get(fields::NAME), Some("Samsung Electronics"));
    }

    #[test]
    fn test_sell_order_pushes_execution_only() {
        let mut market = Market::new();
        let ticket = relay_core::OrderTicket::market_sell("acc", "005930", 3);
        let (_, pushes) = market.respond(&requests::send_order(&ticket).unwrap().call);
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].1.rows()[0].get(fields::ORDER_KIND), Some("-sell"));
    }

    #[test]
    fn test_condition_list_format() {
        let mut market = Market::new()
            .with_condition(0, "momentum", ["005930"])
            .with_condition(4, "breakout", Vec::<String>::new());
        let (_, page) = reply(market.respond(&requests::load_conditions().call).0);
        assert_eq!(
            page.rows()[0].get(fields::CONDITIONS),
            Some("0^momentum;4^breakout;")
        );

        let (_, page) = reply(market.respond(&requests::send_condition("momentum", 0).call).0);
        assert_eq!(page.rows()[0].get(fields::CODES), Some("005930;"));
    }
}
