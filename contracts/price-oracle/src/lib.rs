#![no_std]
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env,
};

pub const SCALE_1E18: u128 = 1_000_000_000_000_000_000u128;

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

#[contracttype]
pub enum DataKey {
    Admin,          // Address
    Price(Address), // u128 price scaled 1e18, keyed by asset
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    NotAuthorized = 1,
    InvalidPrice = 2,
    PriceUnavailable = 3,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceUpdated {
    #[topic]
    pub asset: Address,
    pub price: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewAdmin {
    #[topic]
    pub admin: Address,
}

/// Single-source price store: one positive price per asset in the common
/// accounting unit, last write wins, no staleness tracking.
#[contract]
pub struct PriceOracle;

#[contractimpl]
impl PriceOracle {
    pub fn initialize(env: Env, admin: Address) {
        if env.storage().persistent().has(&DataKey::Admin) {
            panic!("already initialized");
        }
        admin.require_auth();
        env.storage().persistent().set(&DataKey::Admin, &admin);
        bump_core_ttl(&env);
    }

    /// Set the quote for an asset. A zero price would let debt be valued
    /// at nothing, so it is rejected at this boundary.
    pub fn set_price(env: Env, caller: Address, asset: Address, price: u128) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        if price == 0 {
            return Err(Error::InvalidPrice);
        }
        env.storage()
            .persistent()
            .set(&DataKey::Price(asset.clone()), &price);
        bump_price_ttl(&env, &asset);
        PriceUpdated { asset, price }.publish(&env);
        Ok(())
    }

    /// Strict read: fails when the asset was never quoted.
    pub fn get_price(env: Env, asset: Address) -> Result<u128, Error> {
        bump_price_ttl(&env, &asset);
        env.storage()
            .persistent()
            .get(&DataKey::Price(asset))
            .ok_or(Error::PriceUnavailable)
    }

    /// Soft read for callers that map absence to their own error kind.
    pub fn price(env: Env, asset: Address) -> Option<u128> {
        bump_price_ttl(&env, &asset);
        env.storage().persistent().get(&DataKey::Price(asset))
    }

    pub fn set_admin(env: Env, caller: Address, new_admin: Address) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        env.storage().persistent().set(&DataKey::Admin, &new_admin);
        bump_core_ttl(&env);
        NewAdmin { admin: new_admin }.publish(&env);
        Ok(())
    }

    pub fn get_admin(env: Env) -> Address {
        env.storage()
            .persistent()
            .get(&DataKey::Admin)
            .expect("oracle not initialized")
    }
}

fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let stored: Address = env
        .storage()
        .persistent()
        .get(&DataKey::Admin)
        .expect("oracle not initialized");
    bump_core_ttl(env);
    if stored != *caller {
        return Err(Error::NotAuthorized);
    }
    caller.require_auth();
    Ok(())
}

fn bump_core_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    if persistent.has(&DataKey::Admin) {
        persistent.extend_ttl(&DataKey::Admin, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

fn bump_price_ttl(env: &Env, asset: &Address) {
    let persistent = env.storage().persistent();
    let key = DataKey::Price(asset.clone());
    if persistent.has(&key) {
        persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

mod test;
