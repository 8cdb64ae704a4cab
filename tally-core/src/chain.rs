/*!
Blocks and chains.

A [`Chain`] is a sequence of [`Block`]s, each a sequence of transactions, all
kept oldest-first: the opposite of a [`Ledger`]. [`Chain::to_ledger`] is the
only way from one to the other.

# Usage

```
use tally_core::{Block, Chain, GivenHash, Input, Output, Transaction};

let bootstrap = Transaction::new(100, [], vec![Output::new("x", 100)], 0, 0);
let mut block = Block::new();
block.push(Transaction::new(0, [Input::new(GivenHash(0), 0)], vec![Output::new("y", 100)], 0, 1));
let mut chain = Chain::new();
chain.push(block);

let ledger = chain.to_ledger(bootstrap);
assert!(ledger.is_valid());
assert_eq!(ledger.newest().map(|tx| tx.tag), Some(1));
```
*/

use crate::{
    ledger::Ledger,
    order::{NewestFirst, OldestFirst},
    transaction::Transaction,
};

/// An ordered group of transactions, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<H, A> {
    pub transactions: OldestFirst<Transaction<H, A>>,
}

/// An ordered sequence of blocks, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain<H, A> {
    pub blocks: OldestFirst<Block<H, A>>,
}

impl<H, A> Block<H, A> {
    /// Create an empty `Block`.
    pub fn new() -> Self {
        Self {
            transactions: OldestFirst::default(),
        }
    }

    /// Add `transaction` after every transaction already in the block.
    pub fn push(&mut self, transaction: Transaction<H, A>) {
        self.transactions.push(transaction);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl<H, A> Default for Block<H, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, A> From<Vec<Transaction<H, A>>> for Block<H, A> {
    fn from(transactions: Vec<Transaction<H, A>>) -> Self {
        Self {
            transactions: OldestFirst::new(transactions),
        }
    }
}

impl<H, A> Chain<H, A> {
    /// Create an empty `Chain`.
    pub fn new() -> Self {
        Self {
            blocks: OldestFirst::default(),
        }
    }

    /// Add `block` as the most recent block.
    pub fn push(&mut self, block: Block<H, A>) {
        self.blocks.push(block);
    }

    /// Every transaction in the chain, oldest first.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction<H, A>> {
        self.blocks
            .iter()
            .flat_map(|block| block.transactions.iter())
    }

    /// Convert to a ledger whose oldest transaction is `bootstrap`.
    ///
    /// `bootstrap` conventionally mints the chain's initial supply.
    pub fn to_ledger(&self, bootstrap: Transaction<H, A>) -> Ledger<H, A>
    where
        H: Clone,
        A: Clone,
    {
        self.clone().into_ledger(bootstrap)
    }

    /// Like [`to_ledger`](Chain::to_ledger), consuming the chain.
    pub fn into_ledger(self, bootstrap: Transaction<H, A>) -> Ledger<H, A> {
        let oldest_first: OldestFirst<Transaction<H, A>> = std::iter::once(bootstrap)
            .chain(
                self.blocks
                    .into_iter()
                    .flat_map(|block| block.transactions.into_iter()),
            )
            .collect();
        let newest_first: NewestFirst<Transaction<H, A>> = oldest_first.into_newest_first();
        Ledger::empty().append_many(newest_first)
    }
}

impl<H, A> Default for Chain<H, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, A> From<Vec<Block<H, A>>> for Chain<H, A> {
    fn from(blocks: Vec<Block<H, A>>) -> Self {
        Self {
            blocks: OldestFirst::new(blocks),
        }
    }
}
