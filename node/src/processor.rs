//! Turns one payout into one injected batch operation.

use std::sync::Arc;
use std::time::Duration;

use bakepay_crypto::Wallet;
use bakepay_forge::forge;
use bakepay_payout::{bounded, PayoutError, PayoutFilter, Subject, Submission};
use bakepay_rpc::{NodeRpc, RpcError};
use bakepay_types::{OperationParams, Payout};

pub struct PayoutProcessor {
    rpc: Arc<dyn NodeRpc>,
    wallet: Wallet,
    filter: PayoutFilter,
    params: OperationParams,
    call_timeout: Duration,
}

impl PayoutProcessor {
    pub fn new(
        rpc: Arc<dyn NodeRpc>,
        wallet: Wallet,
        filter: PayoutFilter,
        params: OperationParams,
        call_timeout: Duration,
    ) -> Self {
        Self {
            rpc,
            wallet,
            filter,
            params,
            call_timeout,
        }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Filter, forge, sign and submit `payout`.
    ///
    /// Head and counter are read fresh for every payout. Any failure is returned
    /// as is and nothing is retried.
    pub async fn process(&self, payout: &Payout) -> Result<Submission, PayoutError> {
        let cycle = payout.cycle;
        let (payable, excluded) = self.filter.apply(payout);
        for (delegator, reason) in &excluded {
            tracing::debug!(cycle, delegator = %delegator, %reason, "excluded from payout");
        }
        if payable.is_empty() {
            tracing::info!(cycle, excluded = excluded.len(), "nothing to pay");
            return Ok(Submission::NothingToPay);
        }

        let source = self.wallet.address().to_base58();
        let head = bounded(self.call_timeout, "head", Subject::Head, self.rpc.head()).await?;
        let counter = bounded(
            self.call_timeout,
            "counter",
            Subject::Wallet(source.clone()),
            self.rpc.counter(&source, &head.hash),
        )
        .await?;

        let forged = forge(&payable, &head.hash, &source, counter, &self.params)?;
        let signed = self.wallet.sign_operation(&forged.bytes).map_err(|e| {
            let e = PayoutError::from(e);
            if let PayoutError::SignatureSelfCheckFailed { curve } = &e {
                tracing::error!(cycle, %curve, "signature self-check failed, refusing to submit");
            }
            e
        })?;

        let injection = self.rpc.inject_operation(&signed.bytes);
        let returned = match tokio::time::timeout(self.call_timeout, injection).await {
            Ok(Ok(hash)) => hash,
            Ok(Err(e)) => return Err(PayoutError::Submission(e)),
            Err(_) => return Err(PayoutError::Submission(RpcError::Timeout(self.call_timeout))),
        };
        if returned != signed.operation_hash {
            tracing::warn!(
                cycle,
                node = %returned,
                computed = %signed.operation_hash,
                "node returned a different operation hash"
            );
        }

        let total_amount = forged.total_amount();
        tracing::info!(
            cycle,
            operation = %returned,
            transfers = forged.contents.len(),
            total = %total_amount.to_tez_string(),
            "payout injected"
        );
        Ok(Submission::Injected {
            operation_hash: returned,
            transfers: forged.contents.len(),
            total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakepay_crypto::{Curve, SecretKey};
    use bakepay_nullables::{Call, NullNode};
    use bakepay_types::{DelegationEarning, DelegationEarnings, Mutez};

    const SECRET: &str = "edsk2iznZUCwZBGHuGLcEK3ax3PfCZjNEhtmqqzChsoYRx3mJNB266";
    const DELEGATE: &str = "tz1SUgyRB8T5jXgXAwS33pgRHAKrafyg87Yc";

    fn earning(delegator: &str, net: u64) -> DelegationEarning {
        DelegationEarning {
            delegator: delegator.to_string(),
            fee: Mutez::zero(),
            gross_rewards: Mutez::from(net),
            net_rewards: Mutez::from(net),
            share: 0.0,
        }
    }

    fn payout(earnings: Vec<DelegationEarning>) -> Payout {
        Payout {
            delegation_earnings: DelegationEarnings::new(earnings),
            cycle: 100,
            frozen_balance: Mutez::from(10_000_000u64),
            staking_balance: Mutez::from(10_000_000_000u64),
            delegate: DELEGATE.to_string(),
        }
    }

    fn processor(node: &Arc<NullNode>, minimum: u64) -> PayoutProcessor {
        PayoutProcessor::new(
            node.clone(),
            Wallet::from_secret_key(SECRET).unwrap(),
            PayoutFilter::new(DELEGATE, minimum, Vec::<String>::new()),
            OperationParams::default(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn injects_filtered_batch() {
        let node = Arc::new(NullNode::new());
        node.set_counter(41);
        let p = payout(vec![
            earning("tz2J8kpqrRxWLk4T9sxkThvJrLmV5rSzWvLH", 2_000),
            earning("tz3heyJNgEyu7skyGBJTKxFNCPwVRjuhk9KT", 10),
            earning(DELEGATE, 5_000),
        ]);
        let submission = processor(&node, 100).process(&p).await.unwrap();

        let Submission::Injected { operation_hash, transfers, total_amount } = submission else {
            panic!("expected injection");
        };
        assert_eq!(transfers, 1);
        assert_eq!(total_amount, Mutez::from(2_000u64));
        assert!(operation_hash.starts_with('o'));
        assert_eq!(node.injections().len(), 1);
    }

    #[tokio::test]
    async fn nothing_to_pay_skips_node() {
        let node = Arc::new(NullNode::new());
        let p = payout(vec![earning("tz2J8kpqrRxWLk4T9sxkThvJrLmV5rSzWvLH", 1)]);
        assert_eq!(processor(&node, 100).process(&p).await.unwrap(), Submission::NothingToPay);
        assert!(node.calls().is_empty());
    }

    #[tokio::test]
    async fn counter_failure_stops_before_injection() {
        let node = Arc::new(NullNode::new());
        node.fail(Call::Counter, RpcError::Rejected("no counter".into()));
        let p = payout(vec![earning("tz2J8kpqrRxWLk4T9sxkThvJrLmV5rSzWvLH", 1_000)]);
        let processor = processor(&node, 0);
        let source = processor.wallet().address().to_base58();
        let err = processor.process(&p).await.unwrap_err();
        assert!(matches!(err, PayoutError::Lookup(ref f) if f.subject == Subject::Wallet(source)));
        assert_eq!(node.call_count(Call::Inject), 0);
    }

    #[tokio::test]
    async fn failed_self_check_never_injects() {
        let node = Arc::new(NullNode::new());
        let secret = SecretKey::from_base58(SECRET).unwrap();
        let other = SecretKey::from_bytes(Curve::Ed25519, [9u8; 32]).unwrap();
        let processor = PayoutProcessor::new(
            node.clone(),
            Wallet::with_mismatched_key(secret, &other).unwrap(),
            PayoutFilter::new(DELEGATE, 0, Vec::<String>::new()),
            OperationParams::default(),
            Duration::from_secs(5),
        );
        let p = payout(vec![earning("tz2J8kpqrRxWLk4T9sxkThvJrLmV5rSzWvLH", 1_000)]);
        let err = processor.process(&p).await.unwrap_err();
        assert_eq!(err, PayoutError::SignatureSelfCheckFailed { curve: Curve::Ed25519 });
        assert_eq!(node.call_count(Call::Counter), 1);
        assert_eq!(node.call_count(Call::Inject), 0);
        assert!(node.injections().is_empty());
    }

    #[tokio::test]
    async fn rejection_is_submission_error() {
        let node = Arc::new(NullNode::new());
        node.fail(Call::Inject, RpcError::Rejected("counter_in_the_past".into()));
        let p = payout(vec![earning("tz2J8kpqrRxWLk4T9sxkThvJrLmV5rSzWvLH", 1_000)]);
        let err = processor(&node, 0).process(&p).await.unwrap_err();
        assert_eq!(err, PayoutError::Submission(RpcError::Rejected("counter_in_the_past".into())));
    }

    #[tokio::test]
    async fn malformed_delegator_is_encoding_error() {
        let node = Arc::new(NullNode::new());
        let p = payout(vec![earning("tz1broken", 1_000)]);
        let err = processor(&node, 0).process(&p).await.unwrap_err();
        assert!(matches!(err, PayoutError::Encoding(_)));
        assert_eq!(node.call_count(Call::Inject), 0);
    }

    #[tokio::test]
    async fn hash_mismatch_still_reports_node_hash() {
        let node = Arc::new(NullNode::new());
        node.return_operation_hash("ooNodeSaysSomethingElse");
        let p = payout(vec![earning("tz2J8kpqrRxWLk4T9sxkThvJrLmV5rSzWvLH", 1_000)]);
        let submission = processor(&node, 0).process(&p).await.unwrap();
        assert!(matches!(
            submission,
            Submission::Injected { ref operation_hash, .. }
                if operation_hash == "ooNodeSaysSomethingElse"
        ));
    }
}
