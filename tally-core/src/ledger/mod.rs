mod iter;
mod query;

use std::{collections::BTreeSet, fmt, sync::Arc};

pub use iter::{Iter, Tails};
pub use query::Query;

use crate::{
    Balance,
    error::{LookupError, invariant_violation},
    hash::HashStrategy,
    order::{NewestFirst, OldestFirst},
    transaction::{Address, Input, Transaction},
    utxo::Utxo,
};

/// The history of transactions, newest first.
///
/// A ledger is a persistent list: [`append`](Ledger::append) and `clone` are
/// O(1), and the ledger before any transaction shares storage with the ledger
/// after it. Ledgers are only built by appending, which keeps the order
/// invariant intact.
pub struct Ledger<H, A> {
    newest: Option<Arc<Node<H, A>>>,
    len: usize,
}

struct Node<H, A> {
    transaction: Transaction<H, A>,
    /// Everything strictly older than `transaction`.
    older: Ledger<H, A>,
}

impl<H, A> Ledger<H, A> {
    pub fn empty() -> Self {
        Self {
            newest: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.newest.is_none()
    }

    /// The most recently appended transaction.
    pub fn newest(&self) -> Option<&Transaction<H, A>> {
        self.newest.as_deref().map(|node| &node.transaction)
    }

    /// Iterate transactions from the newest to the oldest.
    pub fn iter(&self) -> Iter<'_, H, A> {
        Iter::new(self)
    }

    /// Pair each transaction, newest to oldest, with the ledger of the
    /// transactions strictly older than it.
    ///
    /// Every per-transaction check is evaluated against exactly that ledger.
    pub fn tails(&self) -> Tails<'_, H, A> {
        Tails::new(self)
    }

    /// The transactions from the oldest to the newest.
    pub fn oldest_first(&self) -> OldestFirst<&Transaction<H, A>> {
        self.newest_first().into_oldest_first()
    }

    /// The transactions from the newest to the oldest.
    pub fn newest_first(&self) -> NewestFirst<&Transaction<H, A>> {
        self.iter().collect()
    }

    /// Returns a new ledger with `transaction` as its newest entry.
    pub fn append(&self, transaction: Transaction<H, A>) -> Self {
        Self {
            newest: Some(Arc::new(Node {
                transaction,
                older: self.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Returns a new ledger with `batch` ahead of every existing transaction.
    pub fn append_many(&self, batch: NewestFirst<Transaction<H, A>>) -> Self {
        batch
            .into_oldest_first()
            .into_iter()
            .fold(self.clone(), |ledger, transaction| ledger.append(transaction))
    }

    pub fn singleton(transaction: Transaction<H, A>) -> Self {
        Self::empty().append(transaction)
    }
}

impl<H: HashStrategy<A>, A> Ledger<H, A> {
    /// Find the single transaction hashing to `hash`.
    pub fn find_hash(&self, hash: &H) -> Result<&Transaction<H, A>, LookupError<H>> {
        let mut matches = self.iter().filter(|transaction| transaction.hash() == *hash);
        let first = matches.next();
        let rest = matches.count();
        match first {
            None => Err(LookupError::HashNotFound(hash.clone())),
            Some(transaction) if rest == 0 => Ok(transaction),
            Some(_) => Err(LookupError::AmbiguousHash {
                hash: hash.clone(),
                count: rest + 1,
            }),
        }
    }

    /// Find the transaction hashing to `hash`, which the caller knows is
    /// recorded exactly once.
    ///
    /// # Panics
    ///
    /// Panics with a `ledger invariant violated` message otherwise.
    #[track_caller]
    pub fn find_hash_strict(&self, hash: &H) -> &Transaction<H, A> {
        self.find_hash(hash).unwrap_or_else(|err| invariant_violation(err))
    }

    /// The inputs that can currently be spent.
    ///
    /// Folds from the oldest transaction: each step drops what the transaction
    /// spends, then adds what it creates. Always equal to `utxo().domain()`.
    pub fn unspent_outputs(&self) -> BTreeSet<Input<H>>
    where
        A: Clone,
    {
        self.oldest_first()
            .into_iter()
            .fold(BTreeSet::new(), |mut unspent, transaction| {
                unspent.retain(|input| !transaction.spent_outputs().contains(input));
                unspent.extend(transaction.created_utxo().domain());
                unspent
            })
    }

    /// The current unspent-output set, folded from the oldest transaction.
    pub fn utxo(&self) -> Utxo<H, A>
    where
        A: Clone,
    {
        self.oldest_first()
            .into_iter()
            .fold(Utxo::empty(), |utxo, transaction| {
                transaction
                    .created_utxo()
                    .union(&utxo.remove_inputs(transaction.spent_outputs()))
            })
    }

    /// The net effect of the whole history on `address`.
    pub fn balance(&self, address: &Address<A>) -> Balance
    where
        A: PartialEq,
    {
        self.tails()
            .map(|(transaction, older)| transaction.balance_effect(address, older))
            .sum()
    }

    /// Whether every transaction was acceptable when it was appended.
    pub fn is_valid(&self) -> bool
    where
        A: Clone,
    {
        self.tails()
            .all(|(transaction, older)| transaction.is_acceptable(older))
    }
}

impl<H, A> Clone for Ledger<H, A> {
    fn clone(&self) -> Self {
        Self {
            newest: self.newest.clone(),
            len: self.len,
        }
    }
}

impl<H, A> Default for Ledger<H, A> {
    fn default() -> Self {
        Self::empty()
    }
}

// Unlink iteratively so dropping a long ledger cannot overflow the stack.
impl<H, A> Drop for Ledger<H, A> {
    fn drop(&mut self) {
        let mut next = self.newest.take();
        while let Some(node) = next {
            next = match Arc::try_unwrap(node) {
                Ok(mut node) => node.older.newest.take(),
                Err(_) => None,
            };
        }
    }
}

impl<H: PartialEq, A: PartialEq> PartialEq for Ledger<H, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<H: Eq, A: Eq> Eq for Ledger<H, A> {}

impl<H: fmt::Debug, A: fmt::Debug> fmt::Debug for Ledger<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<H: fmt::Display, A: fmt::Display> fmt::Display for Ledger<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for transaction in self.iter() {
            writeln!(f, "{transaction}")?;
        }
        Ok(())
    }
}

impl<'a, H, A> IntoIterator for &'a Ledger<H, A> {
    type Item = &'a Transaction<H, A>;
    type IntoIter = Iter<'a, H, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
