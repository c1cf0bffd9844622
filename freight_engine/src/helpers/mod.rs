mod order_code;

pub use order_code::{generate_order_code, MAX_ORDER_CODE_ATTEMPTS};
