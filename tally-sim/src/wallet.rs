use std::collections::BTreeMap;

use tally_core::{
    Block, HashStrategy, Input, Output, Query, Transaction, TransactionError, Utxo, Value,
};
use tracing::debug;

/// The production side of a cross-check: something that consumes blocks and
/// reports what a set of owned addresses can spend.
pub trait Wallet<H, A> {
    /// Applies a block to the wallet's state.
    fn apply_block(&mut self, block: &Block<H, A>) -> Result<(), TransactionError<H>>;

    /// Total unspent value held by the owned addresses.
    fn balance(&self) -> Value;

    /// The unspent outputs held by the owned addresses.
    fn utxo(&self) -> Utxo<H, A>;
}

#[derive(Debug, Clone)]
struct UtxoEntry<A> {
    spent: bool,
    output: Output<A>,
}

/// An incremental wallet that updates its output index in place.
///
/// Unlike the ledger model it never replays history: each transaction marks
/// its inputs spent and records its outputs. It indexes every output so that
/// double spends are caught, but answers balance and UTXO queries for its
/// owned addresses only.
pub struct InMemoryWallet<H, A> {
    owned: Query<A>,
    utxo_set: BTreeMap<Input<H>, UtxoEntry<A>>,
    height: usize,
}

impl<H, A> InMemoryWallet<H, A>
where
    H: HashStrategy<A>,
    A: Clone + Ord,
{
    pub fn new(owned: Query<A>) -> Self {
        InMemoryWallet {
            owned,
            utxo_set: BTreeMap::new(),
            height: 0,
        }
    }

    /// Number of blocks applied so far.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Applies one transaction: checks it, then spends its inputs and records
    /// its outputs. A rejected transaction leaves the wallet unchanged.
    pub fn apply_transaction(
        &mut self,
        tx: &Transaction<H, A>,
    ) -> Result<(), TransactionError<H>> {
        let mut total_input = tx.fresh;
        for input in &tx.inputs {
            match self.utxo_set.get(input) {
                Some(entry) if entry.spent => {
                    return Err(TransactionError::DoubleSpend(input.clone()));
                }
                Some(entry) => total_input += entry.output.value,
                None => return Err(TransactionError::InvalidOutput(input.clone())),
            }
        }
        let total_output = tx.total_output() + tx.fee;
        if total_input != total_output {
            return Err(TransactionError::InvalidBalance {
                total_input,
                total_output,
            });
        }

        for input in &tx.inputs {
            if let Some(entry) = self.utxo_set.get_mut(input) {
                entry.spent = true;
            }
        }
        // Add new UTXOs
        let tx_id = tx.hash();
        for (i, output) in tx.outputs.iter().enumerate() {
            self.utxo_set.insert(
                Input::new(tx_id.clone(), i as u32),
                UtxoEntry {
                    spent: false,
                    output: output.clone(),
                },
            );
        }
        Ok(())
    }

    /// Fetches an unspent output by the input that would spend it.
    pub fn get_utxo(&self, input: &Input<H>) -> Option<&Output<A>> {
        self.utxo_set
            .get(input)
            .filter(|entry| !entry.spent)
            .map(|entry| &entry.output)
    }

    /// Checks if an output is spent or unknown.
    pub fn is_utxo_spent(&self, input: &Input<H>) -> bool {
        self.get_utxo(input).is_none()
    }

    fn owned_unspent(&self) -> impl Iterator<Item = (&Input<H>, &Output<A>)> {
        self.utxo_set
            .iter()
            .filter(|(_, entry)| !entry.spent && self.owned.matches(&entry.output.addr))
            .map(|(input, entry)| (input, &entry.output))
    }
}

impl<H, A> Wallet<H, A> for InMemoryWallet<H, A>
where
    H: HashStrategy<A>,
    A: Clone + Ord,
{
    /// Applies every transaction of `block` or none of them.
    fn apply_block(&mut self, block: &Block<H, A>) -> Result<(), TransactionError<H>> {
        let snapshot = self.utxo_set.clone();
        for tx in &block.transactions {
            if let Err(err) = self.apply_transaction(tx) {
                self.utxo_set = snapshot;
                return Err(err);
            }
        }
        self.height += 1;
        debug!(height = self.height, transactions = block.len(), "applied block");
        Ok(())
    }

    fn balance(&self) -> Value {
        self.owned_unspent().map(|(_, output)| output.value).sum()
    }

    fn utxo(&self) -> Utxo<H, A> {
        self.owned_unspent()
            .map(|(input, output)| (input.clone(), output.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tally_core::GivenHash;

    type Tx = Transaction<GivenHash, u32>;

    fn genesis() -> Tx {
        Transaction::new(100, [], vec![Output::new(0, 60), Output::new(1, 40)], 0, 0)
    }

    fn spend(index: u32, outputs: Vec<Output<u32>>, fee: Value, tag: i64) -> Tx {
        Transaction::new(0, [Input::new(GivenHash(0), index)], outputs, fee, tag)
    }

    fn wallet_of(addresses: &[u32]) -> InMemoryWallet<GivenHash, u32> {
        InMemoryWallet::new(addresses.iter().copied().collect())
    }

    #[test]
    fn tracks_owned_outputs_only() {
        let mut wallet = wallet_of(&[0]);
        wallet.apply_block(&Block::from(vec![genesis()])).unwrap();
        assert_eq!(wallet.balance(), 60);
        assert_eq!(wallet.utxo().len(), 1);
        assert_eq!(wallet.height(), 1);
        assert_eq!(wallet.get_utxo(&Input::new(GivenHash(0), 1)), Some(&Output::new(1, 40)));
    }

    #[test]
    fn spending_moves_value() {
        let mut wallet = wallet_of(&[0, 2]);
        wallet.apply_block(&Block::from(vec![genesis()])).unwrap();
        wallet
            .apply_block(&Block::from(vec![spend(0, vec![Output::new(2, 55)], 5, 1)]))
            .unwrap();
        assert_eq!(wallet.balance(), 55);
        assert!(wallet.is_utxo_spent(&Input::new(GivenHash(0), 0)));
        assert_eq!(wallet.get_utxo(&Input::new(GivenHash(1), 0)), Some(&Output::new(2, 55)));
    }

    #[test]
    fn rejects_double_spends() {
        let mut wallet = wallet_of(&[0]);
        wallet.apply_block(&Block::from(vec![genesis()])).unwrap();
        let first = spend(0, vec![Output::new(0, 60)], 0, 1);
        let second = spend(0, vec![Output::new(0, 60)], 0, 2);
        match wallet.apply_block(&Block::from(vec![first, second])) {
            Err(TransactionError::DoubleSpend(input)) => {
                assert_eq!(input, Input::new(GivenHash(0), 0))
            }
            other => panic!("Expected DoubleSpend error, got: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_outputs() {
        let mut wallet = wallet_of(&[0]);
        match wallet.apply_transaction(&spend(0, vec![], 0, 1)) {
            Err(TransactionError::InvalidOutput(_)) => {}
            other => panic!("Expected InvalidOutput error, got: {:?}", other),
        }
    }

    #[test]
    fn rejected_transactions_leave_state_untouched() {
        let mut wallet = wallet_of(&[0]);
        wallet.apply_transaction(&genesis()).unwrap();
        let unbalanced = spend(0, vec![Output::new(0, 70)], 0, 1);
        match wallet.apply_transaction(&unbalanced) {
            Err(TransactionError::InvalidBalance {
                total_input: 60,
                total_output: 70,
            }) => {}
            other => panic!("Expected InvalidBalance error, got: {:?}", other),
        }
        assert_eq!(wallet.balance(), 60);
        assert!(!wallet.is_utxo_spent(&Input::new(GivenHash(0), 0)));
    }

    #[test]
    fn rejected_blocks_are_not_partially_applied() {
        let mut wallet = wallet_of(&[0, 1]);
        wallet.apply_block(&Block::from(vec![genesis()])).unwrap();
        let good = spend(0, vec![Output::new(1, 60)], 0, 1);
        let dangling = Transaction::new(0, [Input::new(GivenHash(9), 0)], vec![], 0, 2);

        match wallet.apply_block(&Block::from(vec![good, dangling])) {
            Err(TransactionError::InvalidOutput(input)) => {
                assert_eq!(input, Input::new(GivenHash(9), 0))
            }
            other => panic!("Expected InvalidOutput error, got: {:?}", other),
        }
        assert_eq!(wallet.height(), 1);
        assert_eq!(wallet.balance(), 100);
        assert!(!wallet.is_utxo_spent(&Input::new(GivenHash(0), 0)));
        assert_eq!(wallet.get_utxo(&Input::new(GivenHash(1), 0)), None);
    }
}
