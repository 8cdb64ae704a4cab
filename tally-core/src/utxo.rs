//! The unspent-output set.
//!
//! Every operation builds a new set; none modifies its receiver.

use std::{
    collections::{BTreeMap, BTreeSet, btree_map},
    fmt,
};

use crate::{
    Value,
    ledger::Query,
    transaction::{Input, Output},
};

/// A map from the inputs that would spend outputs to those outputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Utxo<H, A> {
    entries: BTreeMap<Input<H>, Output<A>>,
}

impl<H, A> Utxo<H, A> {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in input order.
    pub fn iter(&self) -> btree_map::Iter<'_, Input<H>, Output<A>> {
        self.entries.iter()
    }

    /// Total value of every output in the set.
    pub fn balance(&self) -> Value {
        self.entries.values().map(|output| output.value).sum()
    }
}

impl<H: Ord + Clone, A: Clone> Utxo<H, A> {
    /// Build a set from `entries`. On duplicate inputs the later entry wins.
    pub fn from_entries(entries: impl IntoIterator<Item = (Input<H>, Output<A>)>) -> Self {
        entries.into_iter().collect()
    }

    pub fn get(&self, input: &Input<H>) -> Option<&Output<A>> {
        self.entries.get(input)
    }

    pub fn contains(&self, input: &Input<H>) -> bool {
        self.entries.contains_key(input)
    }

    /// The inputs that can currently be spent.
    pub fn domain(&self) -> BTreeSet<Input<H>> {
        self.entries.keys().cloned().collect()
    }

    /// The outputs that can currently be spent, in input order.
    pub fn range(&self) -> Vec<Output<A>> {
        self.entries.values().cloned().collect()
    }

    /// Combine two sets, keeping `self`'s entry when both have the same input.
    ///
    /// Overlap indicates a modeling error upstream; it is not reported.
    pub fn union(&self, other: &Self) -> Self {
        let mut entries = other.entries.clone();
        entries.extend(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { entries }
    }

    /// Keep only outputs whose address satisfies `predicate`.
    pub fn restrict_to_address(&self, predicate: impl Fn(&A) -> bool) -> Self {
        self.filter(|_, output| predicate(&output.addr))
    }

    /// Keep only outputs paid to an address in `query`.
    pub fn query(&self, query: &Query<A>) -> Self
    where
        A: Ord,
    {
        self.restrict_to_address(|addr| query.matches(addr))
    }

    /// Keep only the entries whose input is in `inputs`.
    pub fn restrict_to_inputs(&self, inputs: &BTreeSet<Input<H>>) -> Self {
        self.filter(|input, _| inputs.contains(input))
    }

    /// Drop the entries whose input is in `inputs`.
    pub fn remove_inputs(&self, inputs: &BTreeSet<Input<H>>) -> Self {
        self.filter(|input, _| !inputs.contains(input))
    }

    fn filter(&self, keep: impl Fn(&Input<H>, &Output<A>) -> bool) -> Self {
        self.entries
            .iter()
            .filter(|(input, output)| keep(input, output))
            .map(|(input, output)| (input.clone(), output.clone()))
            .collect()
    }
}

impl<H, A> Default for Utxo<H, A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H: Ord, A> FromIterator<(Input<H>, Output<A>)> for Utxo<H, A> {
    fn from_iter<I: IntoIterator<Item = (Input<H>, Output<A>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<H, A> IntoIterator for Utxo<H, A> {
    type Item = (Input<H>, Output<A>);
    type IntoIter = btree_map::IntoIter<Input<H>, Output<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, H, A> IntoIterator for &'a Utxo<H, A> {
    type Item = (&'a Input<H>, &'a Output<A>);
    type IntoIter = btree_map::Iter<'a, Input<H>, Output<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<H: fmt::Display, A: fmt::Display> fmt::Display for Utxo<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (input, output)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{input} => {output}")?;
        }
        f.write_str("}")
    }
}
