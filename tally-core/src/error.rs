//! Lookup failures and transaction rejections.

use std::fmt;

use crate::{Value, transaction::Input};

/// Resolving a hash or an input against a ledger failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError<H> {
    /// No transaction in the ledger has this hash.
    #[error("hash not found: {0}")]
    HashNotFound(H),

    /// More than one transaction in the ledger has this hash.
    #[error("{count} transactions share the hash {hash}")]
    AmbiguousHash { hash: H, count: usize },

    /// The transaction exists but has no output at this index.
    #[error("output index {index} is out of range for {hash}, which has {outputs} outputs")]
    IndexOutOfRange { hash: H, index: u32, outputs: usize },
}

/// Why a transaction is not acceptable on top of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError<H> {
    /// The input does not resolve to any output recorded in the ledger.
    #[error("input {0} does not reference a recorded output")]
    InvalidOutput(Input<H>),

    /// Spent value plus fresh value differs from output value plus fee.
    #[error("value is not preserved: {total_input} in (with fresh), {total_output} out (with fee)")]
    InvalidBalance { total_input: Value, total_output: Value },

    /// The referenced output was already spent.
    #[error("input {0} was already spent")]
    DoubleSpend(Input<H>),
}

/// Abort on a lookup that the caller established must succeed.
///
/// Reaching this is a bug in the caller or the model, never a property of the
/// data.
#[track_caller]
pub(crate) fn invariant_violation<H: fmt::Display>(err: LookupError<H>) -> ! {
    panic!("ledger invariant violated: {err}")
}
