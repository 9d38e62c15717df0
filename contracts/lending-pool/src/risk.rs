use soroban_sdk::{Address, Env};

use crate::constants::SCALE_1E18;
use crate::errors::Error;
use crate::helpers::{checked_add, mul_div};
use crate::storage::{
    must_read_market, read_borrow_position, read_entered, read_market_list, read_oracle,
    read_share_balance, Market,
};

#[soroban_sdk::contractclient(name = "PriceFeedClient")]
pub trait PriceFeed {
    fn price(env: Env, asset: Address) -> Option<u128>;
}

/// Current (liquidity, shortfall) for an account across every market.
pub fn account_liquidity(env: &Env, account: &Address) -> Result<(u128, u128), Error> {
    hypothetical_liquidity(env, account, None, 0, 0)
}

/// (liquidity, shortfall) as if `redeem_shares` of `modify` were withdrawn
/// and `borrow_amount` of its underlying borrowed, without touching state.
///
/// Collateral counts only for entered markets and is weighted by the
/// collateral factor; debt counts in every market at full price. Both
/// hypothetical effects are added to the debt side (the redeem effect
/// collateral-weighted, the borrow effect at full price) so the final
/// subtraction cannot underflow.
pub fn hypothetical_liquidity(
    env: &Env,
    account: &Address,
    modify: Option<&Address>,
    redeem_shares: u128,
    borrow_amount: u128,
) -> Result<(u128, u128), Error> {
    let oracle = read_oracle(env);
    let feed = PriceFeedClient::new(env, &oracle);
    let entered = read_entered(env, account);

    let mut collateral: u128 = 0;
    let mut debt: u128 = 0;
    for asset in read_market_list(env).iter() {
        let market = must_read_market(env, &asset)?;
        let shares = read_share_balance(env, &asset, account);
        let debt_balance = match read_borrow_position(env, &asset, account) {
            Some(snapshot) => market.borrow_balance(&snapshot)?,
            None => 0,
        };
        let modifying = modify == Some(&asset);
        let is_entered = entered.contains(&asset);
        // Un-entered shares back nothing. Skip before the price lookup so
        // a missing quote only fails accounts that need the asset valued.
        let counts_collateral = is_entered && shares > 0;
        if !counts_collateral && debt_balance == 0 && !modifying {
            continue;
        }
        let price = feed.price(&asset).ok_or(Error::PriceUnavailable)?;
        if counts_collateral {
            collateral = checked_add(collateral, collateral_value(&market, shares, price)?)?;
        }
        if debt_balance > 0 {
            debt = checked_add(debt, mul_div(debt_balance, price, SCALE_1E18)?)?;
        }
        if modifying {
            if is_entered && redeem_shares > 0 {
                debt = checked_add(debt, collateral_value(&market, redeem_shares, price)?)?;
            }
            if borrow_amount > 0 {
                debt = checked_add(debt, mul_div(borrow_amount, price, SCALE_1E18)?)?;
            }
        }
    }

    if collateral >= debt {
        Ok((collateral - debt, 0))
    } else {
        Ok((0, debt - collateral))
    }
}

/// Collateral-factor-weighted value of `shares` in `market` at `price`.
fn collateral_value(market: &Market, shares: u128, price: u128) -> Result<u128, Error> {
    let underlying = mul_div(shares, market.exchange_rate()?, SCALE_1E18)?;
    let value = mul_div(underlying, price, SCALE_1E18)?;
    mul_div(value, market.collateral_factor, SCALE_1E18)
}
