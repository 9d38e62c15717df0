use soroban_sdk::{contractevent, Address};

/// A new market was registered for an underlying asset.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketCreated {
    #[topic]
    pub asset: Address,
    pub collateral_factor: u128,
    pub liquidation_threshold: u128,
}

/// Risk parameters of an existing market were replaced.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewRiskParams {
    #[topic]
    pub asset: Address,
    pub collateral_factor: u128,
    pub liquidation_threshold: u128,
}

/// Borrowing was switched on or off for a market.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewBorrowEnabled {
    #[topic]
    pub asset: Address,
    pub enabled: bool,
}

/// An interest model was installed for a market.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewRateModel {
    #[topic]
    pub asset: Address,
    #[topic]
    pub model: Address,
}

/// An account opted a market's collateral into its borrowing power.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketEntered {
    #[topic]
    pub account: Address,
    #[topic]
    pub asset: Address,
}

/// An account removed a market from its membership set.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarketExited {
    #[topic]
    pub account: Address,
    #[topic]
    pub asset: Address,
}

/// Underlying came in and shares were minted.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SupplyEvent {
    #[topic]
    pub supplier: Address,
    #[topic]
    pub asset: Address,
    pub amount: u128,
    pub shares_minted: u128,
}

/// Shares were burned and underlying paid out.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    #[topic]
    pub supplier: Address,
    #[topic]
    pub asset: Address,
    pub shares_burned: u128,
    pub amount: u128,
}

/// Debt was opened against the pool.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BorrowEvent {
    #[topic]
    pub borrower: Address,
    #[topic]
    pub asset: Address,
    pub amount: u128,
    pub account_borrows: u128,
    pub total_borrows: u128,
}

/// Debt was repaid; `amount` is the clamped effective repayment.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepayEvent {
    #[topic]
    pub borrower: Address,
    #[topic]
    pub asset: Address,
    pub amount: u128,
    pub account_borrows: u128,
    pub total_borrows: u128,
}

/// The borrow index advanced for a market.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccrueInterest {
    #[topic]
    pub asset: Address,
    pub interest_accumulated: u128,
    pub borrow_index: u128,
    pub total_borrows: u128,
}

/// Administrator identity was rotated.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewAdmin {
    #[topic]
    pub admin: Address,
}

/// Price oracle address was rotated.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewOracle {
    #[topic]
    pub oracle: Address,
}

/// The global circuit breaker was set.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Paused {
    #[topic]
    pub admin: Address,
}

/// The global circuit breaker was cleared.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Unpaused {
    #[topic]
    pub admin: Address,
}
