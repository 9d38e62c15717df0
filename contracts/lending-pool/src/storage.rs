use soroban_sdk::{contracttype, Address, Env, String, Vec};

use crate::constants::{INITIAL_EXCHANGE_RATE, SCALE_1E18};
use crate::errors::Error;
use crate::helpers::mul_div;

// Storage key types for the contract
#[contracttype]
pub enum DataKey {
    Admin,                            // Address
    Oracle,                           // Address
    Paused,                           // bool
    MarketList,                       // Vec<Address>, insertion order, append-only
    Market(Address),                  // Market per underlying asset
    ShareBalance(Address, Address),   // (asset, account) -> u128
    BorrowPosition(Address, Address), // (asset, account) -> BorrowSnapshot
    EnteredMarkets(Address),          // account -> Vec<Address>
}

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Market {
    pub underlying: Address,
    pub name: String,
    pub symbol: String,
    pub collateral_factor: u128,     // scaled 1e18, < 1e18
    pub liquidation_threshold: u128, // scaled 1e18, >= collateral_factor
    pub borrow_enabled: bool,
    pub total_underlying: u128, // cash currently held by the pool
    pub total_shares: u128,
    pub total_borrows: u128,
    pub borrow_index: u128, // scaled 1e18
    pub last_accrual: u64,
    pub rate_model: Option<Address>,
}

impl Market {
    /// Underlying per share, scaled 1e18. A market with no shares, or one
    /// whose cash is fully lent out, has nothing to price against and
    /// quotes the fixed initial rate; a live market never quotes zero.
    pub fn exchange_rate(&self) -> Result<u128, Error> {
        if self.total_shares == 0 || self.total_underlying == 0 {
            return Ok(INITIAL_EXCHANGE_RATE);
        }
        mul_div(self.total_underlying, SCALE_1E18, self.total_shares)
    }

    /// Live debt for a snapshot at this market's stored index.
    pub fn borrow_balance(&self, snapshot: &BorrowSnapshot) -> Result<u128, Error> {
        if snapshot.principal == 0 {
            return Ok(0);
        }
        mul_div(snapshot.principal, self.borrow_index, snapshot.interest_index)
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BorrowSnapshot {
    pub principal: u128,
    pub interest_index: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountSnapshot {
    pub share_balance: u128,
    pub borrow_balance: u128,
    pub exchange_rate: u128,
}

pub fn read_admin(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::Admin)
        .expect("not initialized")
}

pub fn write_admin(env: &Env, admin: &Address) {
    env.storage().persistent().set(&DataKey::Admin, admin);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().persistent().has(&DataKey::Admin)
}

pub fn read_oracle(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::Oracle)
        .expect("not initialized")
}

pub fn write_oracle(env: &Env, oracle: &Address) {
    env.storage().persistent().set(&DataKey::Oracle, oracle);
}

pub fn read_paused(env: &Env) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn write_paused(env: &Env, paused: bool) {
    env.storage().persistent().set(&DataKey::Paused, &paused);
}

pub fn read_market_list(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::MarketList)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn push_market_list(env: &Env, asset: &Address) {
    let mut list = read_market_list(env);
    list.push_back(asset.clone());
    env.storage().persistent().set(&DataKey::MarketList, &list);
}

pub fn has_market(env: &Env, asset: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Market(asset.clone()))
}

pub fn read_market(env: &Env, asset: &Address) -> Option<Market> {
    env.storage()
        .persistent()
        .get(&DataKey::Market(asset.clone()))
}

pub fn must_read_market(env: &Env, asset: &Address) -> Result<Market, Error> {
    read_market(env, asset).ok_or(Error::UnsupportedMarket)
}

pub fn write_market(env: &Env, market: &Market) {
    env.storage()
        .persistent()
        .set(&DataKey::Market(market.underlying.clone()), market);
}

pub fn read_share_balance(env: &Env, asset: &Address, account: &Address) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::ShareBalance(asset.clone(), account.clone()))
        .unwrap_or(0)
}

pub fn write_share_balance(env: &Env, asset: &Address, account: &Address, balance: u128) {
    env.storage().persistent().set(
        &DataKey::ShareBalance(asset.clone(), account.clone()),
        &balance,
    );
}

pub fn read_borrow_position(
    env: &Env,
    asset: &Address,
    account: &Address,
) -> Option<BorrowSnapshot> {
    env.storage()
        .persistent()
        .get(&DataKey::BorrowPosition(asset.clone(), account.clone()))
}

pub fn write_borrow_position(
    env: &Env,
    asset: &Address,
    account: &Address,
    snapshot: &BorrowSnapshot,
) {
    env.storage().persistent().set(
        &DataKey::BorrowPosition(asset.clone(), account.clone()),
        snapshot,
    );
}

pub fn read_entered(env: &Env, account: &Address) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::EnteredMarkets(account.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn write_entered(env: &Env, account: &Address, markets: &Vec<Address>) {
    env.storage()
        .persistent()
        .set(&DataKey::EnteredMarkets(account.clone()), markets);
}

pub fn bump_core_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    if persistent.has(&DataKey::Admin) {
        persistent.extend_ttl(&DataKey::Admin, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    if persistent.has(&DataKey::Oracle) {
        persistent.extend_ttl(&DataKey::Oracle, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    if persistent.has(&DataKey::Paused) {
        persistent.extend_ttl(&DataKey::Paused, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    if persistent.has(&DataKey::MarketList) {
        persistent.extend_ttl(&DataKey::MarketList, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn bump_market_ttl(env: &Env, asset: &Address) {
    let persistent = env.storage().persistent();
    let key = DataKey::Market(asset.clone());
    if persistent.has(&key) {
        persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn bump_position_ttl(env: &Env, asset: &Address, account: &Address) {
    let persistent = env.storage().persistent();
    let shares = DataKey::ShareBalance(asset.clone(), account.clone());
    if persistent.has(&shares) {
        persistent.extend_ttl(&shares, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    let borrows = DataKey::BorrowPosition(asset.clone(), account.clone());
    if persistent.has(&borrows) {
        persistent.extend_ttl(&borrows, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn bump_membership_ttl(env: &Env, account: &Address) {
    let persistent = env.storage().persistent();
    let key = DataKey::EnteredMarkets(account.clone());
    if persistent.has(&key) {
        persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
