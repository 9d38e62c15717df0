pub const SCALE_1E18: u128 = 1_000_000_000_000_000_000u128;
pub const INITIAL_EXCHANGE_RATE: u128 = SCALE_1E18; // 1 share = 1 unit of underlying
pub const INITIAL_BORROW_INDEX: u128 = SCALE_1E18;
