/*!
An idealized UTXO ledger.

Transactions mint fresh value, spend earlier outputs and pay fees. A [`Ledger`]
records them newest-first and derives the unspent-output set, per-address
balances and whole-ledger validity from that history alone. Every operation is
pure: appending builds a new ledger that shares storage with the old one, so
earlier views stay usable.

# Key Components

- [`HashStrategy`]: how a transaction is identified by the inputs that spend it
  ([`Identity`], [`GivenHash`] or [`Digest`]).
- [`Transaction`], [`Input`], [`Output`], [`Address`]: the value-transfer model.
- [`Utxo`]: a map from inputs to the outputs they would spend.
- [`Ledger`]: the append-only, newest-first history.
- [`Chain`] and [`Block`]: oldest-first block sequences, converted with
  [`Chain::to_ledger`].

# Preconditions

Callers must keep hashes unique within a ledger (relevant for [`GivenHash`],
where the tag is caller-assigned) and keep value sums within `u64`. Neither is
checked.
*/

pub mod chain;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod order;
pub mod transaction;
pub mod utxo;

pub use chain::{Block, Chain};
pub use error::{LookupError, TransactionError};
pub use hash::{Digest, GivenHash, HashStrategy, Identity};
pub use ledger::{Ledger, Query};
pub use order::{NewestFirst, OldestFirst};
pub use transaction::{Address, Input, Output, Transaction};
pub use utxo::Utxo;

/// A monetary amount. There are no fractional units.
pub type Value = u64;

/// The net effect of a history on an address.
///
/// Regular addresses never go negative on a valid ledger, but `Genesis` does:
/// it is the source of every freshly minted unit.
pub type Balance = i128;

/// Sum `values` as a signed balance.
pub(crate) fn signed_total(values: impl IntoIterator<Item = Value>) -> Balance {
    values.into_iter().map(Balance::from).sum()
}
