/*!
Simulation around the tally ledger model.

[`ChainGenerator`] builds seeded chains whose transactions are all acceptable.
[`cross_check`] replays a chain through a [`Wallet`] and the model side by
side, reporting every point where they disagree.
*/

pub mod check;
pub mod config;
pub mod generator;
pub mod wallet;

pub use check::{Mismatch, cross_check};
pub use config::{ConfigError, SimConfig};
pub use generator::{ChainGenerator, Simulation};
pub use wallet::{InMemoryWallet, Wallet};

use tally_core::{GivenHash, Transaction};

/// Simulated addresses are plain numbers.
pub type Account = u32;

/// Transactions as the generator produces them, identified by tag.
pub type SimTransaction = Transaction<GivenHash, Account>;
