use super::{Ledger, Node};
use crate::transaction::Transaction;

/// Iterator over a ledger from the newest transaction to the oldest.
pub struct Iter<'a, H, A> {
    next: Option<&'a Node<H, A>>,
    remaining: usize,
}

/// Iterator over `(transaction, ledger strictly older than it)` pairs, from the
/// newest transaction to the oldest.
pub struct Tails<'a, H, A> {
    next: Option<&'a Node<H, A>>,
    remaining: usize,
}

impl<'a, H, A> Iter<'a, H, A> {
    pub(super) fn new(ledger: &'a Ledger<H, A>) -> Self {
        Self {
            next: ledger.newest.as_deref(),
            remaining: ledger.len,
        }
    }
}

impl<'a, H, A> Tails<'a, H, A> {
    pub(super) fn new(ledger: &'a Ledger<H, A>) -> Self {
        Self {
            next: ledger.newest.as_deref(),
            remaining: ledger.len,
        }
    }
}

impl<'a, H, A> Iterator for Iter<'a, H, A> {
    type Item = &'a Transaction<H, A>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.older.newest.as_deref();
            self.remaining -= 1;
            &node.transaction
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, H, A> ExactSizeIterator for Iter<'a, H, A> {}

impl<'a, H, A> Iterator for Tails<'a, H, A> {
    type Item = (&'a Transaction<H, A>, &'a Ledger<H, A>);

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.older.newest.as_deref();
            self.remaining -= 1;
            (&node.transaction, &node.older)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, H, A> ExactSizeIterator for Tails<'a, H, A> {}
