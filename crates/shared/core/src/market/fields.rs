// Common
pub const CODE: &str = "code";
pub const NAME: &str = "name";
pub const PRICE: &str = "price";
pub const VOLUME: &str = "volume";

// Stock info
pub const CHANGE_RATE: &str = "change_rate";

// Chart rows
pub const TIME: &str = "time";
pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";

// Account
pub const PURCHASE_PRICE: &str = "purchase_price";
pub const TOTAL_PURCHASE: &str = "total_purchase";
pub const QUANTITY: &str = "quantity";
pub const ORDERABLE_QUANTITY: &str = "orderable_quantity";
pub const ORDERABLE_CASH: &str = "orderable_cash";

// Login
pub const ERR_CODE: &str = "err_code";

// Condition search
pub const CONDITIONS: &str = "conditions";
pub const CODES: &str = "codes";
pub const EVENT: &str = "event";
pub const CONDITION_NAME: &str = "condition_name";
pub const CONDITION_INDEX: &str = "condition_index";

// Execution notices
pub const ACCOUNT: &str = "account";
pub const ORDER_NO: &str = "order_no";
pub const ORIGINAL_ORDER_NO: &str = "original_order_no";
pub const ORDER_STATUS: &str = "order_status";
pub const ORDER_KIND: &str = "order_kind";
pub const ORDER_QUANTITY: &str = "order_quantity";
pub const ORDER_PRICE: &str = "order_price";
pub const UNFILLED_QUANTITY: &str = "unfilled_quantity";
pub const FILL_PRICE: &str = "fill_price";
pub const FILL_QUANTITY: &str = "fill_quantity";
pub const REJECT_REASON: &str = "reject_reason";

// Real-time data
pub const REAL_TYPE: &str = "real_type";
pub const REAL_DATA: &str = "real_data";
