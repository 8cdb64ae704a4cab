//! Cross-checking a wallet against the ledger model.

use std::iter;

use tally_core::{Address, Balance, Block, Chain, HashStrategy, Ledger, Query, Transaction};
use tracing::{info, warn};

use crate::wallet::Wallet;

/// A point where the wallet and the model disagree.
///
/// `height` 0 is the bootstrap transaction; block `n` of the chain is height
/// `n + 1`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    /// The model would not have accepted this transaction.
    #[error("block {height}: transaction {tag} is not acceptable to the model")]
    Unacceptable { height: usize, tag: i64 },

    /// The wallet refused the block.
    #[error("block {height}: wallet rejected the block: {reason}")]
    Rejected { height: usize, reason: String },

    /// The wallet's balance differs from the model's.
    #[error("block {height}: wallet balance {wallet} differs from model balance {model}")]
    Balance {
        height: usize,
        wallet: Balance,
        model: Balance,
    },

    /// The wallet's unspent outputs differ from the model's.
    #[error("block {height}: wallet tracks {wallet} unspent outputs, model tracks {model}")]
    Utxo {
        height: usize,
        wallet: usize,
        model: usize,
    },
}

/// Replay `bootstrap` and `chain` through `wallet` and the model, comparing
/// the owned addresses' balance and unspent outputs after every block.
///
/// Both sides apply a block as a unit, so a block the model cannot accept
/// leaves the model ledger as it was.
///
/// Returns every disagreement found; an empty result means the wallet matched
/// the model throughout.
pub fn cross_check<H, A, W>(
    wallet: &mut W,
    owned: &Query<A>,
    bootstrap: &Transaction<H, A>,
    chain: &Chain<H, A>,
) -> Vec<Mismatch>
where
    H: HashStrategy<A>,
    A: Clone + Ord,
    W: Wallet<H, A>,
{
    let bootstrap_block = Block::from(vec![bootstrap.clone()]);
    let blocks = iter::once(&bootstrap_block).chain(chain.blocks.iter());

    let mut ledger = Ledger::empty();
    let mut mismatches = Vec::new();
    for (height, block) in blocks.enumerate() {
        // The model only ever holds valid ledgers: a block with an
        // unacceptable transaction is reported and left out as a whole.
        let mut extended = ledger.clone();
        let mut acceptable = true;
        for tx in &block.transactions {
            if tx.is_acceptable(&extended) {
                extended = extended.append(tx.clone());
            } else {
                acceptable = false;
                mismatches.push(Mismatch::Unacceptable {
                    height,
                    tag: tx.tag,
                });
            }
        }
        if acceptable {
            ledger = extended;
        }

        if let Err(err) = wallet.apply_block(block) {
            mismatches.push(Mismatch::Rejected {
                height,
                reason: err.to_string(),
            });
        }

        let model_balance: Balance = owned
            .addresses()
            .iter()
            .map(|addr| ledger.balance(&Address::Regular(addr.clone())))
            .sum();
        let wallet_balance = Balance::from(wallet.balance());
        if wallet_balance != model_balance {
            mismatches.push(Mismatch::Balance {
                height,
                wallet: wallet_balance,
                model: model_balance,
            });
        }

        let model_utxo = ledger.utxo().query(owned);
        let wallet_utxo = wallet.utxo();
        if wallet_utxo != model_utxo {
            mismatches.push(Mismatch::Utxo {
                height,
                wallet: wallet_utxo.len(),
                model: model_utxo.len(),
            });
        }
    }

    for mismatch in &mismatches {
        warn!(%mismatch, "wallet disagrees with the model");
    }
    info!(
        blocks = chain.blocks.len(),
        transactions = ledger.len(),
        mismatches = mismatches.len(),
        "cross-check finished"
    );
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{Account, SimConfig, generator::ChainGenerator, wallet::InMemoryWallet};
    use tally_core::{GivenHash, Input, Output, TransactionError, Utxo, Value};

    /// Forgets to mark inputs as spent.
    struct ForgetfulWallet {
        inner: Utxo<GivenHash, Account>,
        owned: Query<Account>,
    }

    impl Wallet<GivenHash, Account> for ForgetfulWallet {
        fn apply_block(
            &mut self,
            block: &Block<GivenHash, Account>,
        ) -> Result<(), TransactionError<GivenHash>> {
            for tx in &block.transactions {
                self.inner = self.inner.union(&tx.created_utxo());
            }
            Ok(())
        }

        fn balance(&self) -> Value {
            self.utxo().balance()
        }

        fn utxo(&self) -> Utxo<GivenHash, Account> {
            self.inner.query(&self.owned)
        }
    }

    fn everyone(addresses: usize) -> Query<Account> {
        (0..addresses as Account).collect()
    }

    #[test]
    fn in_memory_wallet_matches_generated_chains() {
        for seed in 0..4 {
            let config = SimConfig {
                seed,
                blocks: 5,
                ..SimConfig::default()
            };
            let owned = everyone(config.addresses);
            let sim = ChainGenerator::new(config).unwrap().generate();
            let mut wallet = InMemoryWallet::new(owned.clone());
            let mismatches = cross_check(&mut wallet, &owned, &sim.bootstrap, &sim.chain);
            assert_eq!(mismatches, vec![], "seed {seed}");
        }
    }

    #[test]
    fn forgetful_wallet_is_caught() {
        let owned = everyone(1);
        let bootstrap = Transaction::new(100, [], vec![Output::new(0, 100)], 0, 0);
        let chain = Chain::from(vec![Block::from(vec![Transaction::new(
            0,
            [Input::new(GivenHash(0), 0)],
            vec![Output::new(0, 90)],
            10,
            1,
        )])]);
        let mut wallet = ForgetfulWallet {
            inner: Utxo::empty(),
            owned: owned.clone(),
        };

        let mismatches = cross_check(&mut wallet, &owned, &bootstrap, &chain);
        assert_eq!(
            mismatches,
            vec![
                Mismatch::Balance {
                    height: 1,
                    wallet: 190,
                    model: 90,
                },
                Mismatch::Utxo {
                    height: 1,
                    wallet: 2,
                    model: 1,
                },
            ]
        );
    }

    #[test]
    fn double_spends_are_reported_by_both_sides() {
        let owned = everyone(2);
        let bootstrap = Transaction::new(100, [], vec![Output::new(0, 100)], 0, 0);
        let spend = |addr: Account, tag| {
            let inputs = [Input::new(GivenHash(0), 0)];
            Transaction::new(0, inputs, vec![Output::new(addr, 100)], 0, tag)
        };
        let chain = Chain::from(vec![
            Block::from(vec![spend(0, 1)]),
            Block::from(vec![spend(1, 2)]),
        ]);
        let mut wallet = InMemoryWallet::new(owned.clone());

        let mismatches = cross_check(&mut wallet, &owned, &bootstrap, &chain);
        assert_eq!(mismatches.len(), 2, "{mismatches:?}");
        assert_eq!(mismatches[0], Mismatch::Unacceptable { height: 2, tag: 2 });
        assert!(matches!(mismatches[1], Mismatch::Rejected { height: 2, .. }));
    }

    #[test]
    fn dangling_inputs_are_reported_not_fatal() {
        let owned = everyone(1);
        let bootstrap = Transaction::new(100, [], vec![Output::new(0, 100)], 0, 0);
        let dangling = Transaction::new(
            0,
            [Input::new(GivenHash(42), 0)],
            vec![Output::new(0, 10)],
            0,
            1,
        );
        let chain = Chain::from(vec![Block::from(vec![dangling])]);
        let mut wallet = InMemoryWallet::new(owned.clone());

        let mismatches = cross_check(&mut wallet, &owned, &bootstrap, &chain);
        assert_eq!(mismatches.len(), 2, "{mismatches:?}");
        assert_eq!(mismatches[0], Mismatch::Unacceptable { height: 1, tag: 1 });
        assert!(matches!(mismatches[1], Mismatch::Rejected { height: 1, .. }));
    }

    #[test]
    fn the_model_drops_a_block_with_any_unacceptable_transaction() {
        let owned = everyone(2);
        let bootstrap = Transaction::new(100, [], vec![Output::new(0, 100)], 0, 0);
        let good = Transaction::new(
            0,
            [Input::new(GivenHash(0), 0)],
            vec![Output::new(1, 100)],
            0,
            1,
        );
        let dangling = Transaction::new(
            0,
            [Input::new(GivenHash(9), 0)],
            vec![Output::new(1, 5)],
            0,
            2,
        );
        let chain = Chain::from(vec![Block::from(vec![good, dangling])]);
        let mut wallet = InMemoryWallet::new(owned.clone());

        let mismatches = cross_check(&mut wallet, &owned, &bootstrap, &chain);
        assert_eq!(mismatches[0], Mismatch::Unacceptable { height: 1, tag: 2 });
        assert!(
            !mismatches
                .iter()
                .any(|m| matches!(m, Mismatch::Balance { .. } | Mismatch::Utxo { .. }))
        );
        assert_eq!(wallet.balance(), 100);
    }
}
