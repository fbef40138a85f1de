//! End-to-end runs of the payout service against a nullable node:
//! config → assembly → queue → forge/sign → injection → report.

use std::sync::Arc;
use std::time::Duration;

use bakepay_crypto::{base58, blake2b_256, prefix};
use bakepay_node::{BakepayConfig, BakepayNode, NodeError};
use bakepay_nullables::{Call, NullNode};
use bakepay_payout::{PayoutError, Submission};
use bakepay_rpc::RpcError;
use bakepay_types::{FrozenRewards, Mutez};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SECRET: &str = "edsk2iznZUCwZBGHuGLcEK3ax3PfCZjNEhtmqqzChsoYRx3mJNB266";
const DELEGATE: &str = "tz1SUgyRB8T5jXgXAwS33pgRHAKrafyg87Yc";
const ALICE: &str = "tz1Qr9uevaimfiPS6X1otehsKrwvZjX7bsyL";
const BOB: &str = "tz2J8kpqrRxWLk4T9sxkThvJrLmV5rSzWvLH";
const CAROL: &str = "tz3heyJNgEyu7skyGBJTKxFNCPwVRjuhk9KT";

fn config(extra: &str) -> BakepayConfig {
    let toml = format!(
        r#"
host_node = "http://127.0.0.1:8732"
delegate = "{DELEGATE}"
wallet_secret = "{SECRET}"

[payout]
baker_fee = 0.05
{extra}
"#
    );
    BakepayConfig::from_toml_str(&toml).expect("valid config")
}

/// Staking balance 100,000 tez, 800 tez rewards, three delegators.
fn chain() -> Arc<NullNode> {
    let node = Arc::new(NullNode::new());
    node.set_frozen_rewards(FrozenRewards {
        deposits: Mutez::from(5_000_000_000u64),
        fees: Mutez::from(1_000u64),
        rewards: Mutez::from(800_000_000u64),
    });
    node.set_staking_balance(100_000_000_000u64);
    node.set_delegators([CAROL, ALICE, BOB]);
    node.set_balance(ALICE, 10_000_000_000u64);
    node.set_balance(BOB, 5_000_000_000u64);
    node.set_balance(CAROL, 1_000u64);
    node.set_counter(100);
    node
}

fn service(node: &Arc<NullNode>, extra: &str) -> BakepayNode {
    BakepayNode::with_rpc(config(extra), node.clone()).expect("service builds")
}

// ---------------------------------------------------------------------------
// 1. One cycle, assembled and paid
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cycle_is_assembled_and_injected() {
    let node = chain();
    let mut service = service(&node, "");
    let mut reports = service.take_reports().unwrap();
    service.spawn_worker();

    let payout = service.assembler().assemble(42).await.unwrap();
    let alice = payout.delegation_earnings.iter().find(|e| e.delegator == ALICE).unwrap();
    assert_eq!(alice.gross_rewards, Mutez::from(80_000_000u64));
    assert_eq!(alice.fee, Mutez::from(4_000_000u64));
    assert_eq!(alice.net_rewards, Mutez::from(76_000_000u64));

    let done = service.queue().enqueue_and_wait(payout).unwrap();
    let report = done.await.unwrap();
    assert_eq!(report.cycle, 42);

    // CAROL's 8 mutez are paid since there is no minimum.
    let Ok(Submission::Injected { operation_hash, transfers, total_amount }) = &report.outcome
    else {
        panic!("expected injection, got {:?}", report.outcome);
    };
    assert_eq!(*transfers, 3);
    assert_eq!(*total_amount, Mutez::from(76_000_000u64 + 38_000_000 + 8));

    let injected = node.injections();
    assert_eq!(injected.len(), 1);
    let expected_hash = base58::encode_check(&prefix::OPERATION_HASH, &blake2b_256(&injected[0]));
    assert_eq!(operation_hash, &expected_hash);
    assert_eq!(reports.recv().await.unwrap(), report);

    service.shutdown().await.unwrap();
}

// ---------------------------------------------------------------------------
// 2. Filtering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn minimum_and_blacklist_leave_nothing_to_pay() {
    let node = chain();
    let mut service = service(
        &node,
        &format!("minimum_payment = 50000000\nblacklist = [\"{ALICE}\"]"),
    );
    service.spawn_worker();

    let payout = service.assembler().assemble(7).await.unwrap();
    let report = service.queue().enqueue_and_wait(payout).unwrap().await.unwrap();
    assert_eq!(report.outcome, Ok(Submission::NothingToPay));
    assert_eq!(node.call_count(Call::Counter), 0);
    assert_eq!(node.call_count(Call::Inject), 0);

    service.shutdown().await.unwrap();
}

// ---------------------------------------------------------------------------
// 3. Failures are reported, not retried
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_injection_reports_submission_error() {
    let node = chain();
    node.fail(Call::Inject, RpcError::Rejected("branch refused".into()));
    let mut service = service(&node, "");
    service.spawn_worker();

    let payout = service.assembler().assemble(3).await.unwrap();
    let report = service.queue().enqueue_and_wait(payout).unwrap().await.unwrap();
    assert_eq!(
        report.outcome,
        Err(PayoutError::Submission(RpcError::Rejected("branch refused".into())))
    );
    assert_eq!(node.call_count(Call::Inject), 1);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn counter_lookup_failure_skips_injection() {
    let node = chain();
    node.fail(
        Call::Counter,
        RpcError::Status {
            path: "/counter".into(),
            status: 404,
            body: "unknown contract".into(),
        },
    );
    let mut service = service(&node, "");
    service.spawn_worker();

    let payout = service.assembler().assemble(3).await.unwrap();
    let report = service.queue().enqueue_and_wait(payout).unwrap().await.unwrap();
    let err = report.outcome.unwrap_err();
    assert!(matches!(err, PayoutError::Lookup(ref f) if f.operation == "counter"));
    assert_eq!(node.call_count(Call::Inject), 0);

    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn skip_failed_policy_pays_the_rest() {
    let node = chain();
    node.fail_balance_of(BOB);
    let service = service(&node, "failure_policy = \"skip_failed\"");

    let payout = service.assembler().assemble(9).await.unwrap();
    let delegators: Vec<_> =
        payout.delegation_earnings.iter().map(|e| e.delegator.as_str()).collect();
    assert_eq!(delegators, [ALICE, CAROL]);
}

// ---------------------------------------------------------------------------
// 4. Ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn queue_is_fifo_across_items() {
    let node = chain();
    let mut service = service(&node, "");
    let mut reports = service.take_reports().unwrap();

    let assembler = service.assembler();
    for cycle in [12, 10, 11] {
        service.queue().enqueue(assembler.assemble(cycle).await.unwrap()).unwrap();
    }
    service.spawn_worker();

    let mut cycles = Vec::new();
    for _ in 0..3 {
        cycles.push(reports.recv().await.unwrap().cycle);
    }
    assert_eq!(cycles, [12, 10, 11]);
    assert_eq!(node.injections().len(), 3);

    service.shutdown().await.unwrap();
}

// ---------------------------------------------------------------------------
// 5. Watcher driving the whole pipeline
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn watcher_pays_each_new_cycle_once() {
    let node = chain();
    node.script_head_cycles([5, 5, 6, 6, 7]);
    let mut service = service(&node, "");
    let mut reports = service.take_reports().unwrap();
    service.start();

    let first = reports.recv().await.unwrap();
    let second = reports.recv().await.unwrap();
    // Cycles 6 and 7 starting pay out the cycles that just ended.
    assert_eq!((first.cycle, second.cycle), (5, 6));
    assert!(first.is_success() && second.is_success());

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(reports.try_recv().is_err());
    service.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_wallet_secret_is_config_error() {
    let mut config = config("");
    config.wallet_secret = None;
    if std::env::var(bakepay_node::WALLET_SECRET_ENV).is_ok() {
        return;
    }
    let err = BakepayNode::with_rpc(config, chain()).err();
    assert!(matches!(err, Some(NodeError::Config(_))));
}
