#![cfg(test)]
use super::*;
use soroban_sdk::{testutils::Address as _, Address, Env};

fn setup(env: &Env) -> (Address, PriceOracleClient<'_>) {
    env.mock_all_auths();
    let admin = Address::generate(env);
    let id = env.register(PriceOracle, ());
    let client = PriceOracleClient::new(env, &id);
    client.initialize(&admin);
    (admin, client)
}

#[test]
fn set_and_get_price() {
    let env = Env::default();
    let (admin, client) = setup(&env);
    let asset = Address::generate(&env);

    client.set_price(&admin, &asset, &SCALE_1E18);
    assert_eq!(client.get_price(&asset), SCALE_1E18);
    assert_eq!(client.price(&asset), Some(SCALE_1E18));

    // Last write wins.
    client.set_price(&admin, &asset, &(2 * SCALE_1E18));
    assert_eq!(client.get_price(&asset), 2 * SCALE_1E18);
}

#[test]
fn unset_asset_is_unavailable() {
    let env = Env::default();
    let (_, client) = setup(&env);
    let asset = Address::generate(&env);

    assert_eq!(client.try_get_price(&asset), Err(Ok(Error::PriceUnavailable)));
    assert_eq!(client.price(&asset), None);
}

#[test]
fn zero_price_is_rejected() {
    let env = Env::default();
    let (admin, client) = setup(&env);
    let asset = Address::generate(&env);

    let res = client.try_set_price(&admin, &asset, &0u128);
    assert_eq!(res, Err(Ok(Error::InvalidPrice)));
    assert_eq!(client.price(&asset), None);
}

#[test]
fn set_price_requires_admin() {
    let env = Env::default();
    let (_, client) = setup(&env);
    let rando = Address::generate(&env);
    let asset = Address::generate(&env);

    let res = client.try_set_price(&rando, &asset, &SCALE_1E18);
    assert_eq!(res, Err(Ok(Error::NotAuthorized)));
}

#[test]
fn admin_rotation() {
    let env = Env::default();
    let (admin, client) = setup(&env);
    let next = Address::generate(&env);
    let asset = Address::generate(&env);

    client.set_admin(&admin, &next);
    assert_eq!(client.get_admin(), next);

    // Old admin loses the privilege, new admin gains it.
    let res = client.try_set_price(&admin, &asset, &SCALE_1E18);
    assert_eq!(res, Err(Ok(Error::NotAuthorized)));
    client.set_price(&next, &asset, &SCALE_1E18);
    assert_eq!(client.get_price(&asset), SCALE_1E18);
}

#[test]
#[should_panic(expected = "already initialized")]
fn reinitialize_panics() {
    let env = Env::default();
    let (admin, client) = setup(&env);
    client.initialize(&admin);
}
