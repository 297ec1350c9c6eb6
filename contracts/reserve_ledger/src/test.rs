#![cfg(test)]

use super::*;
use crate::valuation::tests::FlatCalculator;
use protocol_token::{ProtocolToken, ProtocolTokenClient};
use soroban_sdk::{testutils::Address as _, token, Address, Env};

const SCALE: i128 = 10_000_000;

struct TestContext<'a> {
    env: Env,
    ledger: ReserveLedgerClient<'a>,
    token: ProtocolTokenClient<'a>,
    stable: Address,
    depositor: Address,
}

fn setup_test<'a>() -> TestContext<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let governor = Address::generate(&env);
    let depositor = Address::generate(&env);

    let token_id = env.register_contract(None, ProtocolToken);
    let token = ProtocolTokenClient::new(&env, &token_id);
    token.initialize(&admin, &7);

    let ledger_id = env.register_contract(None, ReserveLedger);
    let ledger = ReserveLedgerClient::new(&env, &ledger_id);
    ledger.initialize(&governor, &token_id);
    token.add_operator(&ledger_id);

    // Stablecoin reserve asset with 7 decimals, same as the protocol token
    let stable = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    token::StellarAssetClient::new(&env, &stable).mint(&depositor, &(1_000_000 * SCALE));

    ledger.enable(&Role::ReserveToken, &stable, &None);
    ledger.enable(&Role::ReserveDepositor, &depositor, &None);

    TestContext {
        env,
        ledger,
        token,
        stable,
        depositor,
    }
}

#[test]
fn test_double_initialize() {
    let ctx = setup_test();
    let governor = Address::generate(&ctx.env);

    let result = ctx.ledger.try_initialize(&governor, &ctx.token.address);
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_deposit_with_profit() {
    let ctx = setup_test();

    assert_eq!(ctx.ledger.token_value(&ctx.stable, &(1000 * SCALE)), 1000 * SCALE);

    let payout = ctx
        .ledger
        .deposit(&ctx.depositor, &ctx.stable, &(1000 * SCALE), &(900 * SCALE));

    assert_eq!(payout, 900 * SCALE);
    assert_eq!(ctx.token.balance(&ctx.depositor), 900 * SCALE);
    assert_eq!(ctx.token.total_supply(), 900 * SCALE);
    assert_eq!(ctx.ledger.total_reserves(), 1000 * SCALE);
    // the 100 of profit is reserves without supply behind it
    assert_eq!(ctx.ledger.excess_reserves(), 100 * SCALE);

    let stable = token::Client::new(&ctx.env, &ctx.stable);
    assert_eq!(stable.balance(&ctx.ledger.address), 1000 * SCALE);
}

#[test]
fn test_declared_value_above_appraisal_rejected() {
    let ctx = setup_test();

    let result = ctx
        .ledger
        .try_deposit(&ctx.depositor, &ctx.stable, &(1000 * SCALE), &(1001 * SCALE));
    assert_eq!(result, Err(Ok(Error::InvalidParameters)));

    assert_eq!(ctx.ledger.total_reserves(), 0);
    assert_eq!(ctx.token.total_supply(), 0);
}

#[test]
fn test_deposit_requires_enabled_asset_and_role() {
    let ctx = setup_test();

    let outsider = Address::generate(&ctx.env);
    token::StellarAssetClient::new(&ctx.env, &ctx.stable).mint(&outsider, &(10 * SCALE));
    let result = ctx
        .ledger
        .try_deposit(&outsider, &ctx.stable, &(10 * SCALE), &0);
    assert_eq!(result, Err(Ok(Error::PermissionDenied)));

    ctx.ledger.disable(&Role::ReserveToken, &ctx.stable);
    assert_eq!(ctx.ledger.valuation_of(&ctx.stable), None);

    let result = ctx
        .ledger
        .try_deposit(&ctx.depositor, &ctx.stable, &(10 * SCALE), &0);
    assert_eq!(result, Err(Ok(Error::PermissionDenied)));
}

#[test]
fn test_enable_is_idempotent() {
    let ctx = setup_test();

    ctx.ledger.enable(&Role::ReserveToken, &ctx.stable, &None);
    ctx.ledger.enable(&Role::ReserveToken, &ctx.stable, &None);

    assert!(ctx.ledger.is_permitted(&Role::ReserveToken, &ctx.stable));
    assert_eq!(
        ctx.ledger.valuation_of(&ctx.stable),
        Some(Valuation::Normalize(7, 7))
    );

    ctx.ledger.disable(&Role::ReserveDepositor, &ctx.depositor);
    ctx.ledger.disable(&Role::ReserveDepositor, &ctx.depositor);
    assert!(!ctx.ledger.is_permitted(&Role::ReserveDepositor, &ctx.depositor));
}

#[test]
fn test_solvency_over_deposit_sequence() {
    let ctx = setup_test();

    let deposits = [
        (1000 * SCALE, 1000 * SCALE),
        (250 * SCALE, 0),
        (333 * SCALE, 300 * SCALE),
        (5 * SCALE, 5 * SCALE),
    ];

    let mut appraised = 0;
    let mut minted = 0;
    for (amount, declared) in deposits {
        let value = ctx.ledger.token_value(&ctx.stable, &amount);
        let supply_before = ctx.token.total_supply();

        let payout = ctx
            .ledger
            .deposit(&ctx.depositor, &ctx.stable, &amount, &declared);

        assert!(payout <= declared && declared <= value);
        assert_eq!(ctx.token.total_supply() - supply_before, declared);

        appraised += value;
        minted += payout;
    }

    assert_eq!(ctx.ledger.total_reserves(), appraised);
    assert_eq!(ctx.token.total_supply(), minted);
    assert_eq!(ctx.ledger.excess_reserves(), appraised - minted);
}

#[test]
fn test_liquidity_token_requires_calculator() {
    let ctx = setup_test();

    let pair = ctx
        .env
        .register_stellar_asset_contract_v2(Address::generate(&ctx.env))
        .address();
    token::StellarAssetClient::new(&ctx.env, &pair).mint(&ctx.depositor, &(100 * SCALE));

    let result = ctx.ledger.try_enable(&Role::LiquidityToken, &pair, &None);
    assert_eq!(result, Err(Ok(Error::InvalidParameters)));

    let calculator = ctx.env.register_contract(None, FlatCalculator);
    ctx.ledger
        .enable(&Role::LiquidityToken, &pair, &Some(calculator.clone()));

    // Reserve depositor role does not cover liquidity deposits
    let result = ctx
        .ledger
        .try_deposit(&ctx.depositor, &pair, &(100 * SCALE), &0);
    assert_eq!(result, Err(Ok(Error::PermissionDenied)));

    ctx.ledger
        .enable(&Role::LiquidityDepositor, &ctx.depositor, &None);

    // all value as profit: protocol-owned liquidity
    let payout = ctx
        .ledger
        .deposit(&ctx.depositor, &pair, &(100 * SCALE), &0);
    assert_eq!(payout, 0);
    assert_eq!(ctx.ledger.total_reserves(), 250 * SCALE);
    assert_eq!(ctx.token.total_supply(), 0);
}

#[test]
fn test_mint_rewards_bounded_by_excess() {
    let ctx = setup_test();
    let manager = Address::generate(&ctx.env);
    let staker = Address::generate(&ctx.env);

    ctx.ledger
        .deposit(&ctx.depositor, &ctx.stable, &(1000 * SCALE), &(900 * SCALE));

    let result = ctx.ledger.try_mint_rewards(&manager, &staker, &SCALE);
    assert_eq!(result, Err(Ok(Error::PermissionDenied)));

    ctx.ledger.enable(&Role::RewardManager, &manager, &None);

    ctx.ledger.mint_rewards(&manager, &staker, &(60 * SCALE));
    assert_eq!(ctx.token.balance(&staker), 60 * SCALE);
    assert_eq!(ctx.ledger.excess_reserves(), 40 * SCALE);

    let result = ctx.ledger.try_mint_rewards(&manager, &staker, &(41 * SCALE));
    assert_eq!(result, Err(Ok(Error::InsufficientReserves)));
}

#[test]
fn test_withdraw_burns_appraised_value() {
    let ctx = setup_test();
    let spender = Address::generate(&ctx.env);

    ctx.ledger
        .deposit(&ctx.depositor, &ctx.stable, &(1000 * SCALE), &(900 * SCALE));
    ctx.token
        .transfer(&ctx.depositor, &spender, &(300 * SCALE));

    let result = ctx
        .ledger
        .try_withdraw(&spender, &ctx.stable, &(100 * SCALE));
    assert_eq!(result, Err(Ok(Error::PermissionDenied)));

    ctx.ledger.enable(&Role::ReserveSpender, &spender, &None);
    let value = ctx.ledger.withdraw(&spender, &ctx.stable, &(100 * SCALE));

    assert_eq!(value, 100 * SCALE);
    assert_eq!(ctx.token.balance(&spender), 200 * SCALE);
    assert_eq!(ctx.token.total_supply(), 800 * SCALE);
    assert_eq!(ctx.ledger.total_reserves(), 900 * SCALE);
    assert_eq!(ctx.ledger.excess_reserves(), 100 * SCALE);

    let stable = token::Client::new(&ctx.env, &ctx.stable);
    assert_eq!(stable.balance(&spender), 100 * SCALE);
}

#[test]
fn test_debt_round_trip() {
    let ctx = setup_test();
    let debtor = Address::generate(&ctx.env);

    // 200 of profit gives 200 of excess reserves
    ctx.ledger
        .deposit(&ctx.depositor, &ctx.stable, &(1000 * SCALE), &(800 * SCALE));

    ctx.ledger.enable(&Role::ReserveDebtor, &debtor, &None);
    let result = ctx.ledger.try_incur_debt(&debtor, &ctx.stable, &(50 * SCALE));
    assert_eq!(result, Err(Ok(Error::InsufficientReserves)));

    ctx.ledger.set_debt_limit(&debtor, &(150 * SCALE));
    ctx.ledger.incur_debt(&debtor, &ctx.stable, &(150 * SCALE));

    assert_eq!(ctx.ledger.debt_of(&debtor), 150 * SCALE);
    assert_eq!(ctx.ledger.total_debt(), 150 * SCALE);
    assert_eq!(ctx.ledger.total_reserves(), 850 * SCALE);

    let result = ctx.ledger.try_incur_debt(&debtor, &ctx.stable, &SCALE);
    assert_eq!(result, Err(Ok(Error::InsufficientReserves)));

    let result = ctx.ledger.try_repay_debt(&debtor, &ctx.stable, &(151 * SCALE));
    assert_eq!(result, Err(Ok(Error::InvalidParameters)));

    ctx.ledger.repay_debt(&debtor, &ctx.stable, &(100 * SCALE));
    assert_eq!(ctx.ledger.debt_of(&debtor), 50 * SCALE);
    assert_eq!(ctx.ledger.total_debt(), 50 * SCALE);
    assert_eq!(ctx.ledger.total_reserves(), 950 * SCALE);
    assert_eq!(ctx.token.total_supply(), 800 * SCALE);
}
