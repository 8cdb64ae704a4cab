//! Seeded generation of valid chains.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tally_core::{Block, Chain, GivenHash, Input, Ledger, Output, Transaction, Utxo, Value};
use tracing::{debug, info};

use crate::{Account, SimConfig, SimTransaction, config::ConfigError};

/// Most inputs a generated transaction spends.
const MAX_INPUTS: usize = 3;

/// A bootstrap transaction and the chain built on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub bootstrap: SimTransaction,
    pub chain: Chain<GivenHash, Account>,
}

impl Simulation {
    /// The ledger the chain describes.
    pub fn ledger(&self) -> Ledger<GivenHash, Account> {
        self.chain.to_ledger(self.bootstrap.clone())
    }

    /// Total fees paid across the whole chain.
    pub fn total_fees(&self) -> Value {
        self.chain.transactions().map(|tx| tx.fee).sum()
    }
}

/// Builds chains whose every transaction is acceptable.
///
/// Transactions spend outputs that are unspent at the time they are built,
/// so conservation and the absence of double spends hold by construction.
/// Tags increase strictly from 0, keeping `GivenHash` unique.
pub struct ChainGenerator {
    config: SimConfig,
    rng: StdRng,
    next_tag: i64,
}

impl ChainGenerator {
    /// Create a generator, rejecting configurations it cannot run.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            next_tag: 0,
        })
    }

    /// Generate the bootstrap transaction and every block.
    pub fn generate(mut self) -> Simulation {
        let bootstrap: SimTransaction = Transaction::new(
            self.config.initial_supply,
            [],
            vec![Output::new(0, self.config.initial_supply)],
            0,
            self.take_tag(),
        );
        let mut unspent = bootstrap.created_utxo();
        let mut chain = Chain::new();

        for height in 1..=self.config.blocks {
            let mut block = Block::new();
            for _ in 0..self.config.txs_per_block {
                let Some(tx) = self.next_transaction(&unspent) else {
                    break;
                };
                unspent = tx.created_utxo().union(&unspent.remove_inputs(tx.spent_outputs()));
                block.push(tx);
            }
            debug!(height, transactions = block.len(), unspent = unspent.len(), "generated block");
            chain.push(block);
        }

        info!(
            seed = self.config.seed,
            blocks = self.config.blocks,
            transactions = chain.transactions().count(),
            "generated chain"
        );
        Simulation { bootstrap, chain }
    }

    /// Build one transaction spending from `unspent`, or `None` if nothing is
    /// left to spend.
    fn next_transaction(&mut self, unspent: &Utxo<GivenHash, Account>) -> Option<SimTransaction> {
        let candidates: Vec<(&Input<GivenHash>, &Output<Account>)> = unspent.iter().collect();
        if candidates.is_empty() {
            return None;
        }

        let count = self.rng.gen_range(1..=candidates.len().min(MAX_INPUTS));
        let chosen: Vec<_> = candidates
            .choose_multiple(&mut self.rng, count)
            .collect();
        let inputs: BTreeSet<Input<GivenHash>> =
            chosen.iter().map(|(input, _)| (*input).clone()).collect();
        let total: Value = chosen.iter().map(|(_, output)| output.value).sum();

        let fee = self.rng.gen_range(0..=self.config.max_fee.min(total));
        let outputs = self.split(total - fee);
        Some(Transaction::new(0, inputs, outputs, fee, self.take_tag()))
    }

    /// Split `value` into between one and `max_outputs` outputs paid to random
    /// addresses.
    fn split(&mut self, value: Value) -> Vec<Output<Account>> {
        let parts = self.rng.gen_range(1..=self.config.max_outputs);
        let mut cuts: Vec<Value> = (1..parts).map(|_| self.rng.gen_range(0..=value)).collect();
        cuts.push(0);
        cuts.push(value);
        cuts.sort_unstable();

        cuts.windows(2)
            .map(|pair| {
                let addr = self.rng.gen_range(0..self.config.addresses as Account);
                Output::new(addr, pair[1] - pair[0])
            })
            .collect()
    }

    fn take_tag(&mut self) -> i64 {
        let tag = self.next_tag;
        self.next_tag += 1;
        tag
    }
}
