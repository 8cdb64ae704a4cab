/*!
Pluggable transaction identifiers.

An [`Input`](crate::Input) names the transaction it spends from by that
transaction's hash. What a "hash" is depends on the strategy:

- [`Identity`]: the transaction itself. Comparing two inputs compares the full
  referenced transactions, and transitively everything they reference, so this
  is only suitable for small ledgers.
- [`GivenHash`]: the transaction's externally assigned `tag`. Comparisons are
  cheap, but the caller must keep tags unique within a ledger.
- [`Digest`]: a BLAKE2s digest of the transaction's content.
*/

use std::{fmt, hash::Hasher, sync::Arc};

use blake2::{Blake2s256, Digest as _};
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Maps a transaction to the identifier inputs use to reference it.
///
/// `hash` must be deterministic: equal transactions hash equally, every time.
pub trait HashStrategy<A>: Clone + Ord + fmt::Debug + fmt::Display + Sized {
    /// Identify `transaction`.
    fn hash(transaction: &Transaction<Self, A>) -> Self;
}

/// Uses the transaction itself as its hash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity<A>(Arc<Transaction<Identity<A>, A>>);

impl<A> Identity<A> {
    /// The transaction this hash stands for.
    pub fn transaction(&self) -> &Transaction<Identity<A>, A> {
        &self.0
    }
}

impl<A> HashStrategy<A> for Identity<A>
where
    A: Clone + Ord + fmt::Debug + fmt::Display,
{
    fn hash(transaction: &Transaction<Self, A>) -> Self {
        Identity(Arc::new(transaction.clone()))
    }
}

impl<A: fmt::Display> fmt::Display for Identity<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uses the caller-assigned `tag` of a transaction as its hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GivenHash(pub i64);

impl<A> HashStrategy<A> for GivenHash {
    fn hash(transaction: &Transaction<Self, A>) -> Self {
        GivenHash(transaction.tag)
    }
}

impl fmt::Display for GivenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A 32-byte BLAKE2s digest over the content of a transaction.
///
/// Covers `fresh`, every input (in set order), every output (in order), `fee`
/// and `tag`, fed through the address type's `std::hash::Hash` impl.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Digest(pub [u8; 32]);

/// Adapts a BLAKE2s state to `std::hash::Hasher` so derived `Hash` impls can
/// feed it.
struct DigestWriter(Blake2s256);

impl Hasher for DigestWriter {
    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finish(&self) -> u64 {
        let digest = self.0.clone().finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix)
    }
}

impl<A: std::hash::Hash> HashStrategy<A> for Digest {
    fn hash(transaction: &Transaction<Self, A>) -> Self {
        let mut writer = DigestWriter(Blake2s256::new());
        std::hash::Hash::hash(transaction, &mut writer);
        Digest(writer.0.finalize().into())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Digest").field(&hex::encode(self.0)).finish()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transaction::{Input, Output};

    fn minting<H: Ord>(tag: i64) -> Transaction<H, &'static str> {
        Transaction::new(100, [], vec![Output::new("alice", 100)], 0, tag)
    }

    #[test]
    fn given_hash_is_the_tag() {
        let tx = minting::<GivenHash>(7);
        assert_eq!(tx.hash(), GivenHash(7));
        assert_eq!(tx.hash().to_string(), "#7");
    }

    #[test]
    fn given_hash_ignores_content() {
        let a = minting::<GivenHash>(3);
        let b: Transaction<GivenHash, _> =
            Transaction::new(5, [], vec![Output::new("bob", 5)], 0, 3);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn identity_hash_wraps_the_transaction() {
        let tx = minting::<Identity<&'static str>>(0);
        let hash = tx.hash();
        assert_eq!(hash.transaction(), &tx);
        assert_eq!(hash, tx.hash());
    }

    #[test]
    fn identity_hash_distinguishes_structure() {
        let a = minting::<Identity<&'static str>>(0);
        let b = minting::<Identity<&'static str>>(1);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn digest_is_deterministic() {
        let a = minting::<Digest>(0);
        let b = minting::<Digest>(0);
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash().to_string().len(), 64);
    }

    #[test]
    fn digest_covers_every_field() {
        let base = minting::<Digest>(0);
        let mut fee = base.clone();
        fee.fee = 1;
        let mut tag = base.clone();
        tag.tag = 1;
        let mut output = base.clone();
        output.outputs[0].addr = "bob";
        let mut input = base.clone();
        input.inputs.insert(Input::new(Digest([1; 32]), 0));

        for changed in [fee, tag, output, input] {
            assert_ne!(base.hash(), changed.hash());
        }
    }

    #[test]
    fn digest_debug_is_hex() {
        let digest = Digest([0xab; 32]);
        assert_eq!(format!("{digest:?}"), format!("Digest(\"{}\")", "ab".repeat(32)));
    }
}
