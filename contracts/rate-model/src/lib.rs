#![no_std]
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env,
};

pub const SCALE_1E18: u128 = 1_000_000_000_000_000_000u128;
pub const SECONDS_PER_YEAR: u128 = 365 * 24 * 60 * 60;
pub const MAX_ANNUAL_RATE: u128 = 10 * SCALE_1E18; // 1000% per year cap

const TTL_THRESHOLD: u32 = 100_000;
const TTL_EXTEND_TO: u32 = 200_000;

#[contracttype]
pub enum DataKey {
    Admin,  // Address
    Params, // RateParams
}

/// Curve parameters. Rates are annual, scaled 1e18 (5% = 5 * 1e16);
/// `kink` is the utilization point where the jump slope takes over.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateParams {
    pub base_rate: u128,
    pub slope: u128,
    pub jump: u128,
    pub kink: u128,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    NotAuthorized = 1,
    InvalidParameters = 2,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewRateParams {
    pub base_rate: u128,
    pub slope: u128,
    pub jump: u128,
    pub kink: u128,
}

#[contract]
pub struct RateModel;

#[contractimpl]
impl RateModel {
    pub fn initialize(
        env: Env,
        admin: Address,
        base_rate: u128,
        slope: u128,
        jump: u128,
        kink: u128,
    ) {
        if env.storage().persistent().has(&DataKey::Admin) {
            panic!("already initialized");
        }
        admin.require_auth();
        let params = RateParams {
            base_rate,
            slope,
            jump,
            kink,
        };
        if !params_valid(&params) {
            panic!("invalid rate params");
        }
        env.storage().persistent().set(&DataKey::Admin, &admin);
        env.storage().persistent().set(&DataKey::Params, &params);
        bump_ttl(&env);
        NewRateParams {
            base_rate,
            slope,
            jump,
            kink,
        }
        .publish(&env);
    }

    /// Replace the curve parameters. Admin only.
    pub fn set_params(
        env: Env,
        caller: Address,
        base_rate: u128,
        slope: u128,
        jump: u128,
        kink: u128,
    ) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        let params = RateParams {
            base_rate,
            slope,
            jump,
            kink,
        };
        if !params_valid(&params) {
            return Err(Error::InvalidParameters);
        }
        env.storage().persistent().set(&DataKey::Params, &params);
        bump_ttl(&env);
        NewRateParams {
            base_rate,
            slope,
            jump,
            kink,
        }
        .publish(&env);
        Ok(())
    }

    pub fn get_params(env: Env) -> RateParams {
        bump_ttl(&env);
        env.storage()
            .persistent()
            .get(&DataKey::Params)
            .expect("model not initialized")
    }

    pub fn get_admin(env: Env) -> Address {
        env.storage()
            .persistent()
            .get(&DataKey::Admin)
            .expect("model not initialized")
    }

    /// Per-second borrow rate scaled 1e18 for the given pool balances.
    pub fn borrow_rate(env: Env, cash: u128, borrows: u128) -> u128 {
        let params: RateParams = env
            .storage()
            .persistent()
            .get(&DataKey::Params)
            .expect("model not initialized");
        bump_ttl(&env);
        let util = utilization(cash, borrows);
        // params_valid caps every rate at 10e18 and util tops out at 1e18,
        // so these products stay far inside u128.
        let annual = if util <= params.kink {
            params.base_rate + util * params.slope / SCALE_1E18
        } else {
            let at_kink = params.base_rate + params.kink * params.slope / SCALE_1E18;
            let excess = util - params.kink;
            at_kink + excess * params.jump / SCALE_1E18
        };
        annual / SECONDS_PER_YEAR
    }
}

fn utilization(cash: u128, borrows: u128) -> u128 {
    if borrows == 0 {
        return 0;
    }
    let (mut b, mut c) = (borrows, cash);
    // Fold both sides down together when the pool is too large for the
    // scaled product. The ratio keeps ~96 bits, far finer than the curve
    // resolves, and full or symmetric pools stay exact at any size.
    while b > u128::MAX / SCALE_1E18 || c > u128::MAX - b {
        b >>= 32;
        c >>= 32;
    }
    if b == 0 {
        return 0;
    }
    b * SCALE_1E18 / (b + c)
}

fn params_valid(p: &RateParams) -> bool {
    p.kink <= SCALE_1E18
        && p.base_rate <= MAX_ANNUAL_RATE
        && p.slope <= MAX_ANNUAL_RATE
        && p.jump <= MAX_ANNUAL_RATE
}

fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let stored: Address = env
        .storage()
        .persistent()
        .get(&DataKey::Admin)
        .expect("model not initialized");
    bump_ttl(env);
    if stored != *caller {
        return Err(Error::NotAuthorized);
    }
    caller.require_auth();
    Ok(())
}

fn bump_ttl(env: &Env) {
    let persistent = env.storage().persistent();
    if persistent.has(&DataKey::Admin) {
        persistent.extend_ttl(&DataKey::Admin, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    if persistent.has(&DataKey::Params) {
        persistent.extend_ttl(&DataKey::Params, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
