//! Tests for the withdrawal queue state machine

use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::Address;
use odra::casper_types::U256;
use crate::token::{AssetToken, AssetTokenInitArgs, AssetTokenHostRef};
use super::withdrawal_queue::{WithdrawalQueue, WithdrawalQueueInitArgs, WithdrawalQueueHostRef};
use super::withdrawal_queue::EpochState;
use super::errors::QueueError;

struct Ctx {
    env: HostEnv,
    asset: AssetTokenHostRef,
    queue: WithdrawalQueueHostRef,
    vault: Address,
    adapter: Address,
    target: Address,
}

fn setup_with_legacy(receivers: Vec<Address>, amounts: Vec<U256>) -> Ctx {
    let env = odra_test::env();
    let asset = AssetToken::deploy(
        &env,
        AssetTokenInitArgs {
            name: String::from("Wrapped Restaked ETH"),
            symbol: String::from("wrETH"),
        },
    );

    let vault = env.get_account(5);
    let adapter = env.get_account(6);
    let target = env.get_account(7);

    let queue = WithdrawalQueue::deploy(
        &env,
        WithdrawalQueueInitArgs {
            vault,
            asset_token: asset.address().clone(),
            legacy_receivers: receivers,
            legacy_amounts: amounts,
        },
    );

    Ctx {
        env,
        asset,
        queue,
        vault,
        adapter,
        target,
    }
}

fn setup() -> Ctx {
    setup_with_legacy(vec![], vec![])
}

/// Simulates the asset transfer the vault performs before settling amounts
/// into the queue.
fn fund_queue(ctx: &mut Ctx, amount: U256) {
    ctx.env.set_caller(ctx.env.get_account(0));
    let queue_address = ctx.queue.address().clone();
    ctx.asset.mint(queue_address, amount);
    ctx.env.set_caller(ctx.vault);
}

#[test]
fn test_request_accumulates_in_open_epoch() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    ctx.queue.request(alice, U256::from(100u64), U256::from(100u64));
    ctx.queue.request(alice, U256::from(50u64), U256::from(50u64));

    let epoch = ctx.queue.get_epoch_info(0).unwrap();
    assert!(matches!(epoch.state, EpochState::Open));
    assert_eq!(epoch.requested_amount, U256::from(150u64));
    assert_eq!(epoch.requested_shares, U256::from(150u64));
    assert_eq!(ctx.queue.get_total_requested_pending(), U256::from(150u64));
    assert_eq!(ctx.queue.get_pending_withdrawals_of(alice).len(), 2);
}

#[test]
fn test_request_gating() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    assert_eq!(
        ctx.queue.try_request(alice, U256::zero(), U256::zero()),
        Err(QueueError::ValueZero.into())
    );

    ctx.env.set_caller(alice);
    assert_eq!(
        ctx.queue.try_request(alice, U256::from(1u64), U256::from(1u64)),
        Err(QueueError::OnlyVaultAllowed.into())
    );
}

#[test]
fn test_undelegate_fixes_epoch_and_opens_next() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    ctx.queue.request(alice, U256::from(100u64), U256::from(100u64));
    ctx.queue.undelegate(
        0,
        vec![ctx.adapter],
        vec![ctx.target],
        vec![U256::from(100u64)],
        U256::zero(),
    );

    let epoch = ctx.queue.get_epoch_info(0).unwrap();
    assert!(matches!(epoch.state, EpochState::Undelegating));
    assert_eq!(epoch.obligations_total, 1);
    assert_eq!(ctx.queue.get_current_epoch(), 1);

    // New requests land in the next epoch while this one settles
    ctx.queue.request(alice, U256::from(30u64), U256::from(30u64));
    let entries = ctx.queue.get_pending_withdrawals_of(alice);
    assert_eq!(entries[1].epoch, 1);
}

#[test]
fn test_undelegate_requires_current_epoch() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.vault);
    assert_eq!(
        ctx.queue.try_undelegate(7, vec![], vec![], vec![], U256::zero()),
        Err(QueueError::EpochMismatch.into())
    );
}

#[test]
fn test_claim_unknown_adapter_rejected() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    ctx.queue.request(alice, U256::from(100u64), U256::from(100u64));

    // Claims are not recorded while the epoch is still open
    assert_eq!(
        ctx.queue
            .try_record_claim(0, ctx.adapter, ctx.target, U256::from(100u64)),
        Err(QueueError::EpochNotUndelegating.into())
    );

    ctx.queue.undelegate(
        0,
        vec![ctx.adapter],
        vec![ctx.target],
        vec![U256::from(100u64)],
        U256::zero(),
    );

    let stranger = ctx.env.get_account(8);
    assert_eq!(
        ctx.queue
            .try_record_claim(0, stranger, ctx.target, U256::from(100u64)),
        Err(QueueError::ClaimUnknownAdapter.into())
    );
}

#[test]
fn test_claim_is_idempotency_latched() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    ctx.queue.request(alice, U256::from(100u64), U256::from(100u64));
    ctx.queue.undelegate(
        0,
        vec![ctx.adapter],
        vec![ctx.target],
        vec![U256::from(100u64)],
        U256::zero(),
    );

    fund_queue(&mut ctx, U256::from(100u64));
    ctx.queue
        .record_claim(0, ctx.adapter, ctx.target, U256::from(100u64));

    assert_eq!(
        ctx.queue
            .try_record_claim(0, ctx.adapter, ctx.target, U256::from(100u64)),
        Err(QueueError::ClaimAlreadyProcessed.into())
    );
}

#[test]
fn test_full_cycle_redeem() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    ctx.queue.request(alice, U256::from(100u64), U256::from(100u64));
    ctx.queue.undelegate(
        0,
        vec![ctx.adapter],
        vec![ctx.target],
        vec![U256::from(100u64)],
        U256::zero(),
    );

    assert!(!ctx.queue.has_redeemable(alice));

    fund_queue(&mut ctx, U256::from(100u64));
    ctx.queue
        .record_claim(0, ctx.adapter, ctx.target, U256::from(100u64));

    let epoch = ctx.queue.get_epoch_info(0).unwrap();
    assert!(matches!(epoch.state, EpochState::Claimable));
    assert_eq!(epoch.settled_amount, U256::from(100u64));
    assert!(ctx.queue.has_redeemable(alice));
    assert_eq!(ctx.queue.get_redeemable_amount(alice), U256::from(100u64));

    let paid = ctx.queue.redeem(alice);
    assert_eq!(paid, U256::from(100u64));
    assert_eq!(ctx.asset.balance_of(alice), U256::from(100u64));
    assert_eq!(ctx.queue.get_redeem_reserve(), U256::zero());
    assert!(ctx.queue.get_pending_withdrawals_of(alice).is_empty());
}

#[test]
fn test_in_flight_slash_is_socialized_pro_rata() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);
    let bob = ctx.env.get_account(2);

    ctx.env.set_caller(ctx.vault);
    ctx.queue.request(alice, U256::from(300u64), U256::from(300u64));
    ctx.queue.request(bob, U256::from(100u64), U256::from(100u64));
    ctx.queue.undelegate(
        0,
        vec![ctx.adapter],
        vec![ctx.target],
        vec![U256::from(400u64)],
        U256::zero(),
    );

    // 10% slashed while in transit: only 360 comes back
    fund_queue(&mut ctx, U256::from(360u64));
    ctx.queue
        .record_claim(0, ctx.adapter, ctx.target, U256::from(360u64));

    assert_eq!(ctx.queue.redeem(alice), U256::from(270u64));
    assert_eq!(ctx.queue.redeem(bob), U256::from(90u64));
    assert_eq!(ctx.queue.get_redeem_reserve(), U256::zero());
}

#[test]
fn test_over_delivery_returns_excess_to_vault() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    ctx.queue.request(alice, U256::from(100u64), U256::from(100u64));
    ctx.queue.undelegate(
        0,
        vec![ctx.adapter],
        vec![ctx.target],
        vec![U256::from(100u64)],
        U256::zero(),
    );

    // Rounding in the external protocol returned a little extra
    fund_queue(&mut ctx, U256::from(105u64));
    ctx.queue
        .record_claim(0, ctx.adapter, ctx.target, U256::from(105u64));

    let epoch = ctx.queue.get_epoch_info(0).unwrap();
    assert_eq!(epoch.settled_amount, U256::from(100u64));
    assert_eq!(ctx.asset.balance_of(ctx.vault), U256::from(5u64));
    assert_eq!(ctx.queue.redeem(alice), U256::from(100u64));
}

#[test]
fn test_empty_undelegate_advances_and_settles() {
    let mut ctx = setup();

    ctx.env.set_caller(ctx.vault);
    ctx.queue.undelegate(0, vec![], vec![], vec![], U256::zero());

    let epoch = ctx.queue.get_epoch_info(0).unwrap();
    assert!(matches!(epoch.state, EpochState::Claimable));
    assert_eq!(epoch.settled_amount, U256::zero());
    assert_eq!(ctx.queue.get_current_epoch(), 1);
    assert!(matches!(
        ctx.queue.get_epoch_info(1).unwrap().state,
        EpochState::Open
    ));
}

#[test]
fn test_same_receiver_two_epochs_fifo() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    ctx.queue.request(alice, U256::from(100u64), U256::from(100u64));
    ctx.queue.undelegate(
        0,
        vec![ctx.adapter],
        vec![ctx.target],
        vec![U256::from(100u64)],
        U256::zero(),
    );
    ctx.queue.request(alice, U256::from(40u64), U256::from(40u64));
    ctx.queue.undelegate(
        1,
        vec![ctx.adapter],
        vec![ctx.target],
        vec![U256::from(40u64)],
        U256::zero(),
    );

    fund_queue(&mut ctx, U256::from(140u64));
    ctx.queue
        .record_claim(0, ctx.adapter, ctx.target, U256::from(100u64));
    ctx.queue
        .record_claim(1, ctx.adapter, ctx.target, U256::from(40u64));

    // One entry per call, earliest epoch first
    assert_eq!(ctx.queue.redeem(alice), U256::from(100u64));
    assert_eq!(ctx.queue.get_pending_withdrawals_of(alice).len(), 1);
    assert_eq!(ctx.queue.redeem(alice), U256::from(40u64));
    assert!(ctx.queue.get_pending_withdrawals_of(alice).is_empty());
}

#[test]
fn test_redeem_with_nothing_settled_reverts() {
    let mut ctx = setup();
    let alice = ctx.env.get_account(1);

    ctx.env.set_caller(ctx.vault);
    assert!(!ctx.queue.has_redeemable(alice));
    assert_eq!(
        ctx.queue.try_redeem(alice),
        Err(QueueError::IsNotAbleToRedeem.into())
    );
}

#[test]
fn test_legacy_migration_entries_are_independent() {
    let env = odra_test::env();
    let alice = env.get_account(1);
    let bob = env.get_account(2);

    let asset = AssetToken::deploy(
        &env,
        AssetTokenInitArgs {
            name: String::from("Wrapped Restaked ETH"),
            symbol: String::from("wrETH"),
        },
    );
    let vault = env.get_account(5);

    // Duplicate receiver on purpose: each entry stays its own FIFO record
    let queue = WithdrawalQueue::deploy(
        &env,
        WithdrawalQueueInitArgs {
            vault,
            asset_token: asset.address().clone(),
            legacy_receivers: vec![alice, bob, alice],
            legacy_amounts: vec![U256::from(10u64), U256::from(20u64), U256::from(30u64)],
        },
    );
    let mut ctx = Ctx {
        env,
        asset,
        queue,
        vault,
        adapter: vault,
        target: vault,
    };

    assert_eq!(ctx.queue.get_pending_withdrawals_of(alice).len(), 2);
    assert_eq!(ctx.queue.get_total_requested_pending(), U256::from(60u64));

    // Settle epoch 0 entirely from vault-covered funds
    fund_queue(&mut ctx, U256::from(60u64));
    ctx.queue
        .undelegate(0, vec![], vec![], vec![], U256::from(60u64));

    assert_eq!(ctx.queue.redeem(alice), U256::from(10u64));
    assert_eq!(ctx.queue.redeem(alice), U256::from(30u64));
    assert_eq!(ctx.queue.redeem(bob), U256::from(20u64));
}
