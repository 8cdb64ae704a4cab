use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;

/// A set of addresses to select unspent outputs by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Ord"))]
pub struct Query<A> {
    /// Addresses whose outputs the query selects.
    pub addresses: BTreeSet<A>,
}

impl<A: Ord> Query<A> {
    pub fn new() -> Query<A> {
        Self {
            addresses: BTreeSet::new(),
        }
    }
    pub fn with_address(mut self, address: A) -> Self {
        self.addresses.insert(address);
        self
    }
    pub fn addresses(&self) -> &BTreeSet<A> {
        &self.addresses
    }
    pub fn matches(&self, address: &A) -> bool {
        self.addresses.contains(address)
    }
}

impl<A: Ord> Default for Query<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Ord> FromIterator<A> for Query<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}
