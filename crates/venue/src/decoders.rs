//! Reply decoders for the request catalogue

use relay_core::market::fields;
use relay_core::values::safe_cast;
use relay_core::{Holding, Outcome, Record, StockInfo};
use relay_engine::{Decoded, Result};
use relay_ports::{PageReader, Reply};

use crate::error::DecodeError;
use crate::requests;

const STOCK_INFO_FIELDS: [&str; 5] = [
    fields::CODE,
    fields::NAME,
    fields::PRICE,
    fields::CHANGE_RATE,
    fields::VOLUME,
];

const PROFIT_FIELDS: [&str; 5] = [
    fields::CODE,
    fields::NAME,
    fields::PRICE,
    fields::PURCHASE_PRICE,
    fields::QUANTITY,
];

/// One entry of the saved condition list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEntry {
    pub index: u32,
    pub name: String,
}

fn first_record(reply: &Reply, fields: &[&str]) -> std::result::Result<Record, DecodeError> {
    if reply.page.is_empty() {
        return Err(DecodeError::EmptyReply(reply.name.to_string()));
    }
    Ok(reply.page.record(0, fields))
}

/// Login result: `err_code` 0 is success
pub fn login(reply: &Reply) -> Result<Decoded> {
    let record = first_record(reply, &[fields::ERR_CODE])?;
    let code = record.int(fields::ERR_CODE, -1);
    let reason = match code {
        0 => {
            log::info!("Logged in");
            return Ok(Decoded::new(Outcome::Record(record)));
        }
        100 => "user info exchange failed",
        101 => "server connect failed",
        102 => "version check failed",
        _ => "unknown error",
    };
    Err(DecodeError::LoginFailed { code, reason }.into())
}

pub fn stock_info(reply: &Reply) -> Result<Decoded> {
    let record = first_record(reply, &STOCK_INFO_FIELDS)?;
    let info = StockInfo::try_from(&record)?;
    log::debug!("Stock info {}: {} @ {}", info.code, info.name, info.price);
    Ok(Decoded::new(Outcome::Record(record)))
}

/// Holdings with their unrealised profit
pub fn account_profit(reply: &Reply) -> Result<Decoded> {
    let page = reply.page.as_ref();
    let mut rows = Vec::with_capacity(page.len());
    for index in 0..page.len() {
        let mut record = page.record(index, &PROFIT_FIELDS);
        let holding = Holding::from_profit_record(&record)?;
        record.insert(fields::CODE, holding.code.clone());
        record.insert("profit", holding.profit().to_string());
        rows.push(record);
    }
    log::debug!("Account profit: {} holding(s)", rows.len());
    Ok(Decoded::new(Outcome::Rows(rows)))
}

pub fn deposit_detail(reply: &Reply) -> Result<Decoded> {
    let mut record = first_record(reply, &[fields::ORDERABLE_CASH])?;
    let cash: i64 = safe_cast(record.text(fields::ORDERABLE_CASH).as_str(), 0);
    record.insert(fields::ORDERABLE_CASH, cash.to_string());
    log::debug!("Orderable cash: {cash}");
    Ok(Decoded::new(Outcome::Record(record)))
}

/// Parse `idx^name;idx^name;...`, skipping malformed entries
pub fn parse_condition_list(raw: &str) -> Vec<ConditionEntry> {
    raw.split(';')
        .filter_map(|entry| {
            let (index, name) = entry.trim().split_once('^')?;
            let index = index.trim().parse().ok()?;
            let name = name.trim();
            (!name.is_empty()).then(|| ConditionEntry {
                index,
                name: name.to_string(),
            })
        })
        .collect()
}

/// Condition list; chains a real-time search on the first condition
pub fn condition_list(reply: &Reply) -> Result<Decoded> {
    let record = first_record(reply, &[fields::CONDITIONS])?;
    let conditions = parse_condition_list(&record.text(fields::CONDITIONS));

    let rows = conditions
        .iter()
        .map(|condition| {
            Record::new()
                .with(fields::CONDITION_INDEX, condition.index.to_string())
                .with(fields::CONDITION_NAME, condition.name.clone())
        })
        .collect();
    let mut decoded = Decoded::new(Outcome::Rows(rows));

    match conditions.first() {
        Some(first) => {
            log::info!("{} condition(s); searching {}", conditions.len(), first.name);
            decoded = decoded.with_follow_up(requests::send_condition(&first.name, first.index));
        }
        None => log::warn!("No saved conditions"),
    }
    Ok(decoded)
}

/// Split a `a;b;c;` code list
pub fn parse_code_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

/// Codes currently matching a condition
pub fn condition_codes(reply: &Reply) -> Result<Decoded> {
    let record = first_record(reply, &[fields::CODES])?;
    let rows: Vec<Record> = parse_code_list(&record.text(fields::CODES))
        .into_iter()
        .map(|code| Record::new().with(fields::CODE, code))
        .collect();
    log::debug!("Condition search matched {} code(s)", rows.len());
    Ok(Decoded::new(Outcome::Rows(rows)))
}

/// Order accepted; carries the order number when the venue assigned one
pub fn order_ack(reply: &Reply) -> Result<Decoded> {
    if reply.page.is_empty() {
        return Ok(Decoded::new(Outcome::Ack));
    }
    let record = reply.page.record(0, &[fields::ORDER_NO, fields::CODE]);
    Ok(Decoded::new(Outcome::Record(record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::Page;
    use std::sync::Arc;

    fn reply(name: &str, page: Page) -> Reply {
        Reply {
            name: name.into(),
            more: false,
            page: Arc::new(page),
            message: None,
        }
    }

    #[test]
    fn test_login_codes() {
        let ok = reply("connect", Page::single(Record::new().with(fields::ERR_CODE, "0")));
        assert!(login(&ok).is_ok());

        let failed = reply("connect", Page::single(Record::new().with(fields::ERR_CODE, "101")));
        let err = login(&failed).unwrap_err();
        assert!(err.to_string().contains("server connect failed"));
    }

    #[test]
    fn test_stock_info_requires_code() {
        let page = Page::single(
            Record::new()
                .with(fields::CODE, "005930")
                .with(fields::NAME, "Samsung Electronics")
                .with(fields::PRICE, "-70000"),
        );
        let decoded = stock_info(&reply("stock_info", page)).unwrap();
        let record = decoded.outcome.as_record().unwrap();
        assert_eq!(record.get(fields::NAME), Some("Samsung Electronics"));

        let missing = reply("stock_info", Page::single(Record::new().with(fields::NAME, "x")));
        assert!(stock_info(&missing).is_err());
        assert!(stock_info(&reply("stock_info", Page::empty())).is_err());
    }

    #[test]
    fn test_account_profit_rows() {
        let page = Page::new(vec![
            Record::new()
                .with(fields::CODE, "A005930")
                .with(fields::PRICE, "+72000")
                .with(fields::PURCHASE_PRICE, "70000")
                .with(fields::QUANTITY, "10"),
        ]);
        let decoded = account_profit(&reply("account_profit", page)).unwrap();
        let rows = decoded.outcome.as_rows().unwrap();
        assert_eq!(rows[0].get(fields::CODE), Some("005930"));
        assert_eq!(rows[0].get("profit"), Some("20000"));
    }

    #[test]
    fn test_deposit_detail_defaults_to_zero() {
        let page = Page::single(Record::new().with(fields::ORDERABLE_CASH, "garbage"));
        let decoded = deposit_detail(&reply("deposit_detail", page)).unwrap();
        assert_eq!(
            decoded.outcome.as_record().unwrap().get(fields::ORDERABLE_CASH),
            Some("0")
        );
    }

    #[test]
    fn test_parse_condition_list() {
        let parsed = parse_condition_list("001^momentum;002^value;bad;x^y;");
        assert_eq!(
            parsed,
            vec![
                ConditionEntry { index: 1, name: "momentum".into() },
                ConditionEntry { index: 2, name: "value".into() },
            ]
        );
        assert!(parse_condition_list("").is_empty());
    }

    #[test]
    fn test_condition_list_chains_first_search() {
        let page = Page::single(Record::new().with(fields::CONDITIONS, "3^breakout;4^dip;"));
        let decoded = condition_list(&reply("load_conditions", page)).unwrap();

        assert_eq!(decoded.outcome.as_rows().map(<[Record]>::len), Some(2));
        assert_eq!(decoded.follow_ups.len(), 1);
        let follow_up = &decoded.follow_ups[0];
        assert_eq!(follow_up.name().as_str(), requests::names::SEND_CONDITION);
        assert_eq!(follow_up.call.args, vec!["S", "breakout", "3", "1"]);

        let empty = Page::single(Record::new().with(fields::CONDITIONS, ""));
        let decoded = condition_list(&reply("load_conditions", empty)).unwrap();
        assert!(decoded.follow_ups.is_empty());
    }

    #[test]
    fn test_condition_codes() {
        let page = Page::single(Record::new().with(fields::CODES, "005930;000660;;"));
        let decoded = condition_codes(&reply("send_condition", page)).unwrap();
        assert_eq!(decoded.outcome.as_rows().unwrap().len(), 2);
        assert_eq!(parse_code_list(" a ; b ;"), vec!["a", "b"]);
    }
}
