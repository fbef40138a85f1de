use bakepay_types::{Mutez, OperationParams, Payout};

use crate::address::{decode_branch, encode_destination, encode_source};
use crate::zarith;
use crate::ForgeError;

/// Operation tag of a manager transaction (protocol 005 and later).
pub const TRANSACTION_TAG: u8 = 0x6c;

const BRANCH_LEN: usize = 32;
const SOURCE_LEN: usize = 21;
const DESTINATION_LEN: usize = 22;

/// One transfer of a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub source: String,
    pub destination: String,
    pub amount: Mutez,
    pub fee: u64,
    pub counter: u64,
    pub gas_limit: u64,
    pub storage_limit: u64,
}

impl Transaction {
    /// Length of [`encode`](Self::encode)'s output.
    pub fn encoded_len(&self) -> usize {
        1 + SOURCE_LEN
            + zarith::encoded_len(self.fee)
            + zarith::encoded_len(self.counter)
            + zarith::encoded_len(self.gas_limit)
            + zarith::encoded_len(self.storage_limit)
            + zarith::natural_len(self.amount.as_biguint())
            + DESTINATION_LEN
            + 1
    }

    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), ForgeError> {
        let source = encode_source(&self.source)?;
        let destination = encode_destination(&self.destination)?;

        out.push(TRANSACTION_TAG);
        out.extend_from_slice(&source);
        zarith::write_u64(out, self.fee);
        zarith::write_u64(out, self.counter);
        zarith::write_u64(out, self.gas_limit);
        zarith::write_u64(out, self.storage_limit);
        zarith::write_natural(out, self.amount.as_biguint());
        out.extend_from_slice(&destination);
        // No parameters.
        out.push(0x00);
        Ok(())
    }
}

/// A forged, unsigned batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForgedOperation {
    pub branch: String,
    pub contents: Vec<Transaction>,
    /// `branch ‖ tx₁ ‖ … ‖ txₙ`.
    pub bytes: Vec<u8>,
}

impl ForgedOperation {
    pub fn hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn total_amount(&self) -> Mutez {
        self.contents.iter().map(|tx| &tx.amount).sum()
    }
}

/// Forge one transfer per earning of `payout`, in payout order.
///
/// The i-th transfer (0-based) uses counter `starting_counter + i + 1`.
pub fn forge(
    payout: &Payout,
    branch: &str,
    source: &str,
    starting_counter: u64,
    params: &OperationParams,
) -> Result<ForgedOperation, ForgeError> {
    if payout.is_empty() {
        return Err(ForgeError::Encoding(format!(
            "cycle {} has no transfers to forge",
            payout.cycle
        )));
    }

    let branch_bytes = decode_branch(branch)?;

    let mut contents = Vec::with_capacity(payout.delegation_earnings.len());
    let mut counter = starting_counter;
    for earning in payout.delegation_earnings.iter() {
        counter = counter
            .checked_add(1)
            .ok_or(ForgeError::CounterOverflow { counter })?;
        contents.push(Transaction {
            source: source.to_string(),
            destination: earning.delegator.clone(),
            amount: earning.net_rewards.clone(),
            fee: params.fee,
            counter,
            gas_limit: params.gas_limit,
            storage_limit: params.storage_limit,
        });
    }

    let len = BRANCH_LEN + contents.iter().map(Transaction::encoded_len).sum::<usize>();
    let mut bytes = Vec::with_capacity(len);
    bytes.extend_from_slice(&branch_bytes);
    for tx in &contents {
        tx.encode(&mut bytes)?;
    }
    debug_assert_eq!(bytes.len(), len);

    Ok(ForgedOperation {
        branch: branch.to_string(),
        contents,
        bytes,
    })
}
