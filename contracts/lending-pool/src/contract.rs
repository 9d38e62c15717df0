use soroban_sdk::{contract, contractimpl, token, Address, Env, String, Vec};

use crate::constants::*;
use crate::errors::Error;
use crate::events::*;
use crate::helpers::*;
use crate::risk;
use crate::storage::*;

#[soroban_sdk::contractclient(name = "RateModelClient")]
pub trait RateSource {
    fn borrow_rate(env: Env, cash: u128, borrows: u128) -> u128;
}

#[contract]
pub struct LendingPool;

#[contractimpl]
impl LendingPool {
    pub fn initialize(env: Env, admin: Address, oracle: Address) {
        if is_initialized(&env) {
            panic!("already initialized");
        }
        admin.require_auth();
        write_admin(&env, &admin);
        write_oracle(&env, &oracle);
        write_paused(&env, false);
        bump_core_ttl(&env);
    }

    pub fn set_admin(env: Env, caller: Address, new_admin: Address) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        write_admin(&env, &new_admin);
        NewAdmin { admin: new_admin }.publish(&env);
        Ok(())
    }

    pub fn set_oracle(env: Env, caller: Address, oracle: Address) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        write_oracle(&env, &oracle);
        NewOracle { oracle }.publish(&env);
        Ok(())
    }

    /// Register a market for an underlying asset. Borrowing starts
    /// disabled; enabling it is a separate admin step so a new market is
    /// never borrowable before its parameters have been reviewed.
    pub fn create_market(
        env: Env,
        caller: Address,
        underlying: Address,
        name: String,
        symbol: String,
        collateral_factor: u128,
        liquidation_threshold: u128,
    ) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        if has_market(&env, &underlying) {
            return Err(Error::MarketExists);
        }
        validate_risk_params(collateral_factor, liquidation_threshold)?;
        let market = Market {
            underlying: underlying.clone(),
            name,
            symbol,
            collateral_factor,
            liquidation_threshold,
            borrow_enabled: false,
            total_underlying: 0,
            total_shares: 0,
            total_borrows: 0,
            borrow_index: INITIAL_BORROW_INDEX,
            last_accrual: env.ledger().timestamp(),
            rate_model: None,
        };
        write_market(&env, &market);
        push_market_list(&env, &underlying);
        bump_market_ttl(&env, &underlying);
        MarketCreated {
            asset: underlying,
            collateral_factor,
            liquidation_threshold,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_borrow_enabled(
        env: Env,
        caller: Address,
        asset: Address,
        enabled: bool,
    ) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        let mut market = must_read_market(&env, &asset)?;
        market.borrow_enabled = enabled;
        write_market(&env, &market);
        bump_market_ttl(&env, &asset);
        NewBorrowEnabled { asset, enabled }.publish(&env);
        Ok(())
    }

    pub fn set_risk_params(
        env: Env,
        caller: Address,
        asset: Address,
        collateral_factor: u128,
        liquidation_threshold: u128,
    ) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        let mut market = must_read_market(&env, &asset)?;
        validate_risk_params(collateral_factor, liquidation_threshold)?;
        market.collateral_factor = collateral_factor;
        market.liquidation_threshold = liquidation_threshold;
        write_market(&env, &market);
        bump_market_ttl(&env, &asset);
        NewRiskParams {
            asset,
            collateral_factor,
            liquidation_threshold,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_rate_model(
        env: Env,
        caller: Address,
        asset: Address,
        model: Address,
    ) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        let mut market = must_read_market(&env, &asset)?;
        // Settle the index at the old rate before the new curve takes over.
        accrue(&env, &mut market)?;
        market.rate_model = Some(model.clone());
        write_market(&env, &market);
        bump_market_ttl(&env, &asset);
        NewRateModel { asset, model }.publish(&env);
        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        write_paused(&env, true);
        Paused { admin: caller }.publish(&env);
        Ok(())
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), Error> {
        require_admin(&env, &caller)?;
        write_paused(&env, false);
        Unpaused { admin: caller }.publish(&env);
        Ok(())
    }

    /// Deposit underlying, minting shares at the exchange rate observed
    /// before this deposit's cash lands. Returns the shares minted.
    pub fn supply(env: Env, from: Address, asset: Address, amount: u128) -> Result<u128, Error> {
        from.require_auth();
        require_not_paused(&env)?;
        let mut market = must_read_market(&env, &asset)?;
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        accrue(&env, &mut market)?;
        let rate = market.exchange_rate()?;
        let shares = mul_div(amount, SCALE_1E18, rate)?;
        // A deposit too small to mint a share would otherwise be absorbed
        // by the pool with nothing credited back.
        if shares == 0 {
            return Err(Error::InvalidAmount);
        }
        token::Client::new(&env, &asset).transfer(
            &from,
            &env.current_contract_address(),
            &to_i128(amount)?,
        );
        market.total_underlying = checked_add(market.total_underlying, amount)?;
        market.total_shares = checked_add(market.total_shares, shares)?;
        write_market(&env, &market);
        let balance = read_share_balance(&env, &asset, &from);
        write_share_balance(&env, &asset, &from, checked_add(balance, shares)?);
        bump_market_ttl(&env, &asset);
        bump_position_ttl(&env, &asset, &from);
        SupplyEvent {
            supplier: from,
            asset,
            amount,
            shares_minted: shares,
        }
        .publish(&env);
        Ok(shares)
    }

    /// Burn shares for underlying. Collateral that is entered and backing
    /// debt can only leave while the account stays solvent. Returns the
    /// underlying paid out.
    pub fn withdraw(
        env: Env,
        from: Address,
        asset: Address,
        share_amount: u128,
    ) -> Result<u128, Error> {
        from.require_auth();
        require_not_paused(&env)?;
        let mut market = must_read_market(&env, &asset)?;
        if share_amount == 0 {
            return Err(Error::InvalidAmount);
        }
        accrue(&env, &mut market)?;
        let balance = read_share_balance(&env, &asset, &from);
        if share_amount > balance {
            return Err(Error::InsufficientLiquidity);
        }
        let rate = market.exchange_rate()?;
        let underlying_out = mul_div(share_amount, rate, SCALE_1E18)?;
        // Burning shares that free no underlying is a loss for the caller.
        if underlying_out == 0 {
            return Err(Error::InvalidAmount);
        }
        if underlying_out > market.total_underlying {
            return Err(Error::InsufficientLiquidity);
        }
        if read_entered(&env, &from).contains(&asset) {
            let (_, shortfall) =
                risk::hypothetical_liquidity(&env, &from, Some(&asset), share_amount, 0)?;
            if shortfall > 0 {
                return Err(Error::InsufficientLiquidity);
            }
        }
        market.total_shares = checked_sub(market.total_shares, share_amount)?;
        market.total_underlying = checked_sub(market.total_underlying, underlying_out)?;
        write_market(&env, &market);
        write_share_balance(&env, &asset, &from, balance - share_amount);
        token::Client::new(&env, &asset).transfer(
            &env.current_contract_address(),
            &from,
            &to_i128(underlying_out)?,
        );
        bump_market_ttl(&env, &asset);
        bump_position_ttl(&env, &asset, &from);
        WithdrawEvent {
            supplier: from,
            asset,
            shares_burned: share_amount,
            amount: underlying_out,
        }
        .publish(&env);
        Ok(underlying_out)
    }

    /// Open debt against entered collateral. The risk check runs against
    /// the account's state before the new debt, simulating the borrow on
    /// top of it.
    pub fn borrow(env: Env, from: Address, asset: Address, amount: u128) -> Result<(), Error> {
        from.require_auth();
        require_not_paused(&env)?;
        let mut market = must_read_market(&env, &asset)?;
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        accrue(&env, &mut market)?;
        if !market.borrow_enabled {
            return Err(Error::BorrowNotAllowed);
        }
        if amount > market.total_underlying {
            return Err(Error::InsufficientLiquidity);
        }
        let (_, shortfall) = risk::hypothetical_liquidity(&env, &from, Some(&asset), 0, amount)?;
        if shortfall > 0 {
            return Err(Error::BorrowNotAllowed);
        }
        let debt = match read_borrow_position(&env, &asset, &from) {
            Some(snapshot) => market.borrow_balance(&snapshot)?,
            None => 0,
        };
        let account_borrows = checked_add(debt, amount)?;
        write_borrow_position(
            &env,
            &asset,
            &from,
            &BorrowSnapshot {
                principal: account_borrows,
                interest_index: market.borrow_index,
            },
        );
        market.total_borrows = checked_add(market.total_borrows, amount)?;
        market.total_underlying = checked_sub(market.total_underlying, amount)?;
        write_market(&env, &market);
        token::Client::new(&env, &asset).transfer(
            &env.current_contract_address(),
            &from,
            &to_i128(amount)?,
        );
        bump_market_ttl(&env, &asset);
        bump_position_ttl(&env, &asset, &from);
        BorrowEvent {
            borrower: from,
            asset,
            amount,
            account_borrows,
            total_borrows: market.total_borrows,
        }
        .publish(&env);
        Ok(())
    }

    /// Pay down debt. The effective repayment is clamped to the amount
    /// owed; an account with no debt pays nothing. Returns the amount
    /// actually pulled.
    pub fn repay(env: Env, from: Address, asset: Address, amount: u128) -> Result<u128, Error> {
        from.require_auth();
        require_not_paused(&env)?;
        let mut market = must_read_market(&env, &asset)?;
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        accrue(&env, &mut market)?;
        let debt = match read_borrow_position(&env, &asset, &from) {
            Some(snapshot) => market.borrow_balance(&snapshot)?,
            None => 0,
        };
        if debt == 0 {
            return Ok(0);
        }
        let effective = if amount > debt { debt } else { amount };
        token::Client::new(&env, &asset).transfer(
            &from,
            &env.current_contract_address(),
            &to_i128(effective)?,
        );
        let account_borrows = debt - effective;
        write_borrow_position(
            &env,
            &asset,
            &from,
            &BorrowSnapshot {
                principal: account_borrows,
                interest_index: market.borrow_index,
            },
        );
        // Per-account floor rounding can leave the aggregate a unit ahead.
        market.total_borrows = market.total_borrows.saturating_sub(effective);
        market.total_underlying = checked_add(market.total_underlying, effective)?;
        write_market(&env, &market);
        bump_market_ttl(&env, &asset);
        bump_position_ttl(&env, &asset, &from);
        RepayEvent {
            borrower: from,
            asset,
            amount: effective,
            account_borrows,
            total_borrows: market.total_borrows,
        }
        .publish(&env);
        Ok(effective)
    }

    /// Opt markets into the account's borrowing power. Re-entering is a
    /// silent no-op; an unknown asset fails the whole call.
    pub fn enter_markets(env: Env, from: Address, assets: Vec<Address>) -> Result<(), Error> {
        from.require_auth();
        let mut entered = read_entered(&env, &from);
        for asset in assets.iter() {
            if !has_market(&env, &asset) {
                return Err(Error::UnsupportedMarket);
            }
            if !entered.contains(&asset) {
                entered.push_back(asset.clone());
                MarketEntered {
                    account: from.clone(),
                    asset,
                }
                .publish(&env);
            }
        }
        write_entered(&env, &from, &entered);
        bump_membership_ttl(&env, &from);
        Ok(())
    }

    /// Remove a market from the membership set. Open debt in the market
    /// blocks the exit, as does collateral still backing debt elsewhere.
    pub fn exit_market(env: Env, from: Address, asset: Address) -> Result<(), Error> {
        from.require_auth();
        let market = must_read_market(&env, &asset)?;
        let entered = read_entered(&env, &from);
        if !entered.contains(&asset) {
            return Ok(());
        }
        let debt = match read_borrow_position(&env, &asset, &from) {
            Some(snapshot) => market.borrow_balance(&snapshot)?,
            None => 0,
        };
        if debt > 0 {
            return Err(Error::NonZeroBorrow);
        }
        let shares = read_share_balance(&env, &asset, &from);
        if shares > 0 {
            let (_, shortfall) =
                risk::hypothetical_liquidity(&env, &from, Some(&asset), shares, 0)?;
            if shortfall > 0 {
                return Err(Error::InsufficientLiquidity);
            }
        }
        let mut remaining = Vec::new(&env);
        for entry in entered.iter() {
            if entry != asset {
                remaining.push_back(entry);
            }
        }
        write_entered(&env, &from, &remaining);
        bump_membership_ttl(&env, &from);
        MarketExited {
            account: from,
            asset,
        }
        .publish(&env);
        Ok(())
    }

    /// Advance one market's borrow index. Permissionless and available
    /// while paused; pausing freezes flows, not time.
    pub fn accrue_interest(env: Env, asset: Address) -> Result<(), Error> {
        let mut market = must_read_market(&env, &asset)?;
        accrue(&env, &mut market)?;
        bump_market_ttl(&env, &asset);
        Ok(())
    }

    /// Position summary for one account and asset. An asset with no
    /// market reports all zeros, including a zero exchange rate; a live
    /// market's exchange rate is always strictly positive.
    pub fn account_snapshot(env: Env, account: Address, asset: Address) -> AccountSnapshot {
        let Some(market) = read_market(&env, &asset) else {
            return AccountSnapshot {
                share_balance: 0,
                borrow_balance: 0,
                exchange_rate: 0,
            };
        };
        let borrow_balance = match read_borrow_position(&env, &asset, &account) {
            Some(snapshot) => expect_math(market.borrow_balance(&snapshot)),
            None => 0,
        };
        AccountSnapshot {
            share_balance: read_share_balance(&env, &asset, &account),
            borrow_balance,
            exchange_rate: expect_math(market.exchange_rate()),
        }
    }

    /// Aggregate (liquidity, shortfall) over all markets. Exactly one of
    /// the pair is nonzero, or both are zero at perfect balance.
    pub fn get_account_liquidity(env: Env, account: Address) -> Result<(u128, u128), Error> {
        risk::account_liquidity(&env, &account)
    }

    /// Pure predicate: would the risk engine let this borrow through?
    pub fn borrow_allowed(
        env: Env,
        asset: Address,
        account: Address,
        amount: u128,
    ) -> Result<bool, Error> {
        let market = must_read_market(&env, &asset)?;
        if !market.borrow_enabled {
            return Ok(false);
        }
        let (_, shortfall) = risk::hypothetical_liquidity(&env, &account, Some(&asset), 0, amount)?;
        Ok(shortfall == 0)
    }

    /// Pure predicate: would withdrawing these shares keep the account
    /// solvent? A market the account has not entered is always free to
    /// withdraw from.
    pub fn withdraw_allowed(
        env: Env,
        asset: Address,
        account: Address,
        share_amount: u128,
    ) -> Result<bool, Error> {
        must_read_market(&env, &asset)?;
        if !read_entered(&env, &account).contains(&asset) {
            return Ok(true);
        }
        let (_, shortfall) =
            risk::hypothetical_liquidity(&env, &account, Some(&asset), share_amount, 0)?;
        Ok(shortfall == 0)
    }

    /// Debt at the last stored index; zero for an unknown market or an
    /// account that never borrowed.
    pub fn borrow_balance_stored(env: Env, account: Address, asset: Address) -> u128 {
        let Some(market) = read_market(&env, &asset) else {
            return 0;
        };
        match read_borrow_position(&env, &asset, &account) {
            Some(snapshot) => expect_math(market.borrow_balance(&snapshot)),
            None => 0,
        }
    }

    /// Accrual-inclusive debt: projects the index to the current ledger
    /// time without mutating anything.
    pub fn borrow_balance_current(
        env: Env,
        account: Address,
        asset: Address,
    ) -> Result<u128, Error> {
        let Some(market) = read_market(&env, &asset) else {
            return Ok(0);
        };
        let Some(snapshot) = read_borrow_position(&env, &asset, &account) else {
            return Ok(0);
        };
        if snapshot.principal == 0 {
            return Ok(0);
        }
        let (index, _) = projected_index(&env, &market)?;
        mul_div(snapshot.principal, index, snapshot.interest_index)
    }

    pub fn has_market(env: Env, asset: Address) -> bool {
        read_market(&env, &asset).is_some()
    }

    pub fn get_market(env: Env, asset: Address) -> Option<Market> {
        read_market(&env, &asset)
    }

    /// Registered markets in creation order.
    pub fn get_all_markets(env: Env) -> Vec<Address> {
        read_market_list(&env)
    }

    pub fn get_entered_markets(env: Env, account: Address) -> Vec<Address> {
        read_entered(&env, &account)
    }

    pub fn get_exchange_rate(env: Env, asset: Address) -> Result<u128, Error> {
        let market = must_read_market(&env, &asset)?;
        market.exchange_rate()
    }

    pub fn is_borrow_enabled(env: Env, asset: Address) -> bool {
        read_market(&env, &asset).map_or(false, |market| market.borrow_enabled)
    }

    pub fn is_paused(env: Env) -> bool {
        read_paused(&env)
    }

    pub fn get_admin(env: Env) -> Address {
        read_admin(&env)
    }

    pub fn get_oracle(env: Env) -> Address {
        read_oracle(&env)
    }
}

fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let admin = read_admin(env);
    bump_core_ttl(env);
    if admin != *caller {
        return Err(Error::NotAuthorized);
    }
    caller.require_auth();
    Ok(())
}

fn require_not_paused(env: &Env) -> Result<(), Error> {
    if read_paused(env) {
        return Err(Error::SystemPaused);
    }
    Ok(())
}

fn validate_risk_params(collateral_factor: u128, liquidation_threshold: u128) -> Result<(), Error> {
    if collateral_factor >= SCALE_1E18 || liquidation_threshold >= SCALE_1E18 {
        return Err(Error::InvalidParameters);
    }
    if liquidation_threshold < collateral_factor {
        return Err(Error::InvalidParameters);
    }
    Ok(())
}

/// Index and interest the market would carry if accrued now. Reads the
/// rate model but writes nothing.
fn projected_index(env: &Env, market: &Market) -> Result<(u128, u128), Error> {
    let now = env.ledger().timestamp();
    let dt = now.saturating_sub(market.last_accrual);
    if dt == 0 {
        return Ok((market.borrow_index, 0));
    }
    let rate = match &market.rate_model {
        Some(model) => RateModelClient::new(env, model)
            .borrow_rate(&market.total_underlying, &market.total_borrows),
        None => 0,
    };
    if rate == 0 {
        return Ok((market.borrow_index, 0));
    }
    let factor = rate.checked_mul(dt as u128).ok_or(Error::MathOverflow)?;
    let interest = mul_div(market.total_borrows, factor, SCALE_1E18)?;
    let growth = mul_div(market.borrow_index, factor, SCALE_1E18)?;
    let index = checked_add(market.borrow_index, growth)?;
    Ok((index, interest))
}

/// Accrual step: advance the index, fold interest into total borrows,
/// and persist the market. Emits only when something moved.
fn accrue(env: &Env, market: &mut Market) -> Result<(), Error> {
    let now = env.ledger().timestamp();
    if now == market.last_accrual {
        return Ok(());
    }
    let (index, interest) = projected_index(env, market)?;
    let moved = index != market.borrow_index || interest != 0;
    market.borrow_index = index;
    market.total_borrows = checked_add(market.total_borrows, interest)?;
    market.last_accrual = now;
    write_market(env, market);
    if moved {
        AccrueInterest {
            asset: market.underlying.clone(),
            interest_accumulated: interest,
            borrow_index: index,
            total_borrows: market.total_borrows,
        }
        .publish(env);
    }
    Ok(())
}
