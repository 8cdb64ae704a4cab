use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    Balance, Value,
    error::{LookupError, TransactionError, invariant_violation},
    hash::HashStrategy,
    ledger::Ledger,
    signed_total,
    utxo::Utxo,
};

/// Where value comes from or goes to, for balance accounting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Address<A> {
    /// The source of freshly minted value.
    Genesis,
    /// The sink of fees.
    Treasury,
    /// An ordinary wallet address.
    Regular(A),
}

/// A transaction output: `value` paid to `addr`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Output<A> {
    pub addr: A,
    pub value: Value,
}

/// A reference to the `index`-th output of the transaction hashing to
/// `transaction`.
///
/// Only meaningful relative to a ledger that contains that transaction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Input<H> {
    pub transaction: H,
    pub index: u32,
}

/// A transfer of value.
///
/// `fresh` is minted from [`Address::Genesis`], `fee` is paid to
/// [`Address::Treasury`]. Inputs form a set; outputs are ordered because
/// inputs address them by index. `tag` is caller-assigned and only matters to
/// the [`GivenHash`](crate::GivenHash) strategy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(bound(
    serialize = "H: Serialize, A: Serialize",
    deserialize = "H: Deserialize<'de> + Ord, A: Deserialize<'de>"
))]
pub struct Transaction<H, A> {
    pub fresh: Value,
    pub inputs: BTreeSet<Input<H>>,
    pub outputs: Vec<Output<A>>,
    pub fee: Value,
    pub tag: i64,
}

impl<A: PartialEq> Address<A> {
    /// Whether an output paid to `addr` is paid to this address.
    ///
    /// Outputs only ever pay regular addresses.
    pub fn matches(&self, addr: &A) -> bool {
        matches!(self, Address::Regular(own) if own == addr)
    }
}

impl<A: fmt::Display> fmt::Display for Address<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Genesis => f.write_str("genesis"),
            Address::Treasury => f.write_str("treasury"),
            Address::Regular(addr) => write!(f, "{addr}"),
        }
    }
}

impl<A> Output<A> {
    pub fn new(addr: A, value: Value) -> Self {
        Self { addr, value }
    }
}

impl<A: fmt::Display> fmt::Display for Output<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.value)
    }
}

impl<H> Input<H> {
    pub fn new(transaction: H, index: u32) -> Self {
        Self { transaction, index }
    }

    /// Find the transaction this input spends from.
    pub fn spent_transaction<'l, A>(
        &self,
        ledger: &'l Ledger<H, A>,
    ) -> Result<&'l Transaction<H, A>, LookupError<H>>
    where
        H: HashStrategy<A>,
    {
        ledger.find_hash(&self.transaction)
    }

    /// Find the output this input spends.
    pub fn spent_output<'l, A>(
        &self,
        ledger: &'l Ledger<H, A>,
    ) -> Result<&'l Output<A>, LookupError<H>>
    where
        H: HashStrategy<A>,
    {
        let transaction = self.spent_transaction(ledger)?;
        transaction
            .outputs
            .get(self.index as usize)
            .ok_or_else(|| LookupError::IndexOutOfRange {
                hash: self.transaction.clone(),
                index: self.index,
                outputs: transaction.outputs.len(),
            })
    }

    /// The output this input spends, or `None` if it does not resolve.
    pub fn resolve<'l, A>(&self, ledger: &'l Ledger<H, A>) -> Option<&'l Output<A>>
    where
        H: HashStrategy<A>,
    {
        self.spent_output(ledger).ok()
    }

    /// The output this input spends, for callers that already know it resolves.
    ///
    /// # Panics
    ///
    /// Panics with a `ledger invariant violated` message if it does not.
    #[track_caller]
    pub fn spent_output_strict<'l, A>(&self, ledger: &'l Ledger<H, A>) -> &'l Output<A>
    where
        H: HashStrategy<A>,
    {
        self.spent_output(ledger).unwrap_or_else(|err| invariant_violation(err))
    }
}

impl<H: fmt::Display> fmt::Display for Input<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.transaction, self.index)
    }
}

impl<H: Ord, A> Transaction<H, A> {
    /// Creates a new transaction. Duplicate inputs collapse.
    pub fn new(
        fresh: Value,
        inputs: impl IntoIterator<Item = Input<H>>,
        outputs: Vec<Output<A>>,
        fee: Value,
        tag: i64,
    ) -> Self {
        Self {
            fresh,
            inputs: inputs.into_iter().collect(),
            outputs,
            fee,
            tag,
        }
    }
}

impl<H, A> Transaction<H, A> {
    /// The inputs this transaction consumes.
    pub fn spent_outputs(&self) -> &BTreeSet<Input<H>> {
        &self.inputs
    }

    /// Sum of all output values, excluding the fee.
    pub fn total_output(&self) -> Value {
        self.outputs.iter().map(|output| output.value).sum()
    }
}

impl<H: HashStrategy<A>, A> Transaction<H, A> {
    /// The hash of this transaction under `H`.
    pub fn hash(&self) -> H {
        H::hash(self)
    }

    /// The outputs this transaction creates, keyed by the inputs that would
    /// spend them.
    pub fn created_utxo(&self) -> Utxo<H, A>
    where
        A: Clone,
    {
        let hash = self.hash();
        self.outputs
            .iter()
            .enumerate()
            .map(|(index, output)| (Input::new(hash.clone(), index as u32), output.clone()))
            .collect()
    }

    /// Verifies the transaction against `ledger`, the transactions strictly
    /// older than it.
    ///
    /// Checks, in order: every input resolves, value is preserved, and every
    /// input is still unspent. Reports the first failure.
    pub fn verify(&self, ledger: &Ledger<H, A>) -> Result<(), TransactionError<H>>
    where
        A: Clone,
    {
        if let Some(dangling) = self
            .inputs
            .iter()
            .find(|input| input.resolve(ledger).is_none())
        {
            return Err(TransactionError::InvalidOutput(dangling.clone()));
        }

        // Every input resolves past this point.
        let spent: Value = self
            .inputs
            .iter()
            .map(|input| input.spent_output_strict(ledger).value)
            .sum();
        let total_input = spent + self.fresh;
        let total_output = self.total_output() + self.fee;
        if total_input != total_output {
            return Err(TransactionError::InvalidBalance {
                total_input,
                total_output,
            });
        }

        let unspent = ledger.unspent_outputs();
        if let Some(spent) = self.inputs.iter().find(|input| !unspent.contains(input)) {
            return Err(TransactionError::DoubleSpend(spent.clone()));
        }
        Ok(())
    }

    /// Whether this transaction may be appended to `ledger`.
    pub fn is_acceptable(&self, ledger: &Ledger<H, A>) -> bool
    where
        A: Clone,
    {
        self.verify(ledger).is_ok()
    }

    /// How much this transaction changes the balance of `address`, given the
    /// transactions strictly older than it.
    ///
    /// Received value counts outputs paid to `address` (plus the fee for the
    /// treasury); spent value counts resolved inputs paid to `address` (plus
    /// fresh value for genesis).
    ///
    /// # Panics
    ///
    /// Every input must resolve in `ledger`, which holds for any valid ledger.
    pub fn balance_effect(&self, address: &Address<A>, ledger: &Ledger<H, A>) -> Balance
    where
        A: PartialEq,
    {
        let received = signed_total(
            self.outputs
                .iter()
                .filter(|output| address.matches(&output.addr))
                .map(|output| output.value),
        );
        let spent = signed_total(
            self.inputs
                .iter()
                .map(|input| input.spent_output_strict(ledger))
                .filter(|output| address.matches(&output.addr))
                .map(|output| output.value),
        );
        let fee = match address {
            Address::Treasury => Balance::from(self.fee),
            _ => 0,
        };
        let fresh = match address {
            Address::Genesis => Balance::from(self.fresh),
            _ => 0,
        };
        received + fee - spent - fresh
    }
}

impl<H: fmt::Display, A: fmt::Display> fmt::Display for Transaction<H, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx {} (fresh {}, fee {}) [", self.tag, self.fresh, self.fee)?;
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{input}")?;
        }
        f.write_str("] -> [")?;
        for (i, output) in self.outputs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{output}")?;
        }
        f.write_str("]")
    }
}
