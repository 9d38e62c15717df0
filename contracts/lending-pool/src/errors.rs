use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Operation on an asset with no market.
    UnsupportedMarket = 1,
    /// Duplicate market creation for an underlying.
    MarketExists = 2,
    /// Malformed risk parameters.
    InvalidParameters = 3,
    /// Amount is zero, or too small to mint a share or free any underlying.
    InvalidAmount = 4,
    /// Pool lacks cash, share balance is short, or the withdraw/exit
    /// would leave the account with a shortfall.
    InsufficientLiquidity = 5,
    /// Risk engine rejected the borrow, or the market is not borrow-enabled.
    BorrowNotAllowed = 6,
    /// Market exit attempted with open debt in that market.
    NonZeroBorrow = 7,
    /// Non-admin caller on an admin-only entry point.
    NotAuthorized = 8,
    /// Asset-moving call while the circuit breaker is set.
    SystemPaused = 9,
    /// No quote for an asset the computation needs.
    PriceUnavailable = 10,
    /// Checked fixed-point arithmetic overflowed or divided by zero.
    MathOverflow = 11,
}
