//! Tests for the reference delegation adapter

use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::Address;
use odra::casper_types::U256;
use crate::token::{AssetToken, AssetTokenInitArgs, AssetTokenHostRef};
use super::delegation_adapter::{DelegationAdapter, DelegationAdapterInitArgs};
use super::delegation_adapter::DelegationAdapterHostRef;
use super::errors::AdapterError;

const UNLOCK_DELAY: u64 = 60_000;

struct Ctx {
    env: HostEnv,
    asset: AssetTokenHostRef,
    adapter: DelegationAdapterHostRef,
    vault: Address,
    trustee: Address,
    target: Address,
}

fn setup() -> Ctx {
    let env = odra_test::env();
    let mut asset = AssetToken::deploy(
        &env,
        AssetTokenInitArgs {
            name: String::from("Wrapped Restaked ETH"),
            symbol: String::from("wrETH"),
        },
    );

    let vault = env.get_account(5);
    let trustee = env.get_account(6);
    let target = env.get_account(7);

    let adapter = DelegationAdapter::deploy(
        &env,
        DelegationAdapterInitArgs {
            vault,
            trustee,
            asset_token: asset.address().clone(),
            unlock_delay: UNLOCK_DELAY,
        },
    );

    // Seed the adapter with the assets the vault would have transferred in.
    asset.mint(adapter.address().clone(), U256::from(1_000_000u64));

    Ctx {
        env,
        asset,
        adapter,
        vault,
        trustee,
        target,
    }
}

#[test]
fn test_delegate_undelegate_claim_round_trip() {
    let mut ctx = setup();
    let amount = U256::from(500_000u64);

    ctx.env.set_caller(ctx.vault);
    ctx.adapter.delegate(ctx.target, amount);
    assert_eq!(ctx.adapter.get_deposited(), amount);
    assert_eq!(ctx.adapter.get_delegated_to(ctx.target), amount);

    let actual = ctx.adapter.undelegate(ctx.target, amount);
    assert_eq!(actual, amount);
    assert_eq!(ctx.adapter.get_deposited(), U256::zero());
    assert!(ctx.adapter.get_pending_withdrawal(ctx.target).is_some());

    // Too early
    assert_eq!(
        ctx.adapter.try_claim(ctx.target),
        Err(AdapterError::WithdrawalNotUnlocked.into())
    );

    ctx.env.advance_block_time(UNLOCK_DELAY);
    let claimed = ctx.adapter.claim(ctx.target);
    assert_eq!(claimed, amount);
    assert_eq!(ctx.asset.balance_of(ctx.vault), amount);
    assert!(ctx.adapter.get_pending_withdrawal(ctx.target).is_none());

    // Ticket is gone; a second claim cannot double-credit
    assert_eq!(
        ctx.adapter.try_claim(ctx.target),
        Err(AdapterError::NothingToClaim.into())
    );
}

#[test]
fn test_single_outstanding_ticket_per_target() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.vault);
    ctx.adapter.delegate(ctx.target, U256::from(1000u64));
    ctx.adapter.undelegate(ctx.target, U256::from(400u64));

    assert_eq!(
        ctx.adapter.try_undelegate(ctx.target, U256::from(100u64)),
        Err(AdapterError::PendingWithdrawalExists.into())
    );
}

#[test]
fn test_undelegate_more_than_delegated() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.vault);
    ctx.adapter.delegate(ctx.target, U256::from(1000u64));
    assert_eq!(
        ctx.adapter.try_undelegate(ctx.target, U256::from(1001u64)),
        Err(AdapterError::InsufficientDelegated.into())
    );
}

#[test]
fn test_only_vault_or_trustee() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.env.get_account(1));
    assert_eq!(
        ctx.adapter.try_delegate(ctx.target, U256::from(1u64)),
        Err(AdapterError::NotVaultOrTrusteeManager.into())
    );

    // The trustee may drive the adapter too
    ctx.env.set_caller(ctx.trustee);
    ctx.adapter.delegate(ctx.target, U256::from(1u64));
    assert_eq!(ctx.adapter.get_deposited(), U256::from(1u64));
}

#[test]
fn test_emergency_path_is_separate() {
    let mut ctx = setup();
    let amount = U256::from(10_000u64);

    ctx.env.set_caller(ctx.vault);
    ctx.adapter.delegate(ctx.target, amount);
    ctx.adapter.emergency_undelegate(ctx.target, amount);

    // The normal claim path must not see the emergency ticket
    ctx.env.advance_block_time(UNLOCK_DELAY);
    assert_eq!(
        ctx.adapter.try_claim(ctx.target),
        Err(AdapterError::OnlyEmergencyClaimAllowed.into())
    );

    let claimed = ctx.adapter.emergency_claim(ctx.target);
    assert_eq!(claimed, amount);
    assert_eq!(ctx.asset.balance_of(ctx.vault), amount);
}

#[test]
fn test_slash_reduces_principal() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.vault);
    ctx.adapter.delegate(ctx.target, U256::from(1000u64));

    ctx.env.set_caller(ctx.trustee);
    ctx.adapter.report_slash(ctx.target, U256::from(100u64));

    assert_eq!(ctx.adapter.get_deposited(), U256::from(900u64));
    assert_eq!(ctx.adapter.get_delegated_to(ctx.target), U256::from(900u64));
}

#[test]
fn test_slash_hits_in_flight_ticket() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.vault);
    ctx.adapter.delegate(ctx.target, U256::from(1000u64));
    ctx.adapter.undelegate(ctx.target, U256::from(1000u64));

    // Everything is in flight; the slash must come out of the ticket
    ctx.env.set_caller(ctx.trustee);
    ctx.adapter.report_slash(ctx.target, U256::from(100u64));

    ctx.env.set_caller(ctx.vault);
    ctx.env.advance_block_time(UNLOCK_DELAY);
    let claimed = ctx.adapter.claim(ctx.target);
    assert_eq!(claimed, U256::from(900u64));
}

#[test]
fn test_slash_beyond_book_rejected() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.vault);
    ctx.adapter.delegate(ctx.target, U256::from(1000u64));

    ctx.env.set_caller(ctx.trustee);
    assert_eq!(
        ctx.adapter.try_report_slash(ctx.target, U256::from(2000u64)),
        Err(AdapterError::SlashExceedsDelegated.into())
    );
}

#[test]
fn test_pause_blocks_delegation() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.trustee);
    ctx.adapter.pause();
    assert!(ctx.adapter.is_paused());

    ctx.env.set_caller(ctx.vault);
    assert_eq!(
        ctx.adapter.try_delegate(ctx.target, U256::from(1u64)),
        Err(AdapterError::AdapterPaused.into())
    );

    ctx.env.set_caller(ctx.trustee);
    ctx.adapter.unpause();

    ctx.env.set_caller(ctx.vault);
    ctx.adapter.delegate(ctx.target, U256::from(1u64));
}
