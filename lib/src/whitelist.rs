//! Whitelist membership and Merkle proof generation
//!
//! The whitelisted addresses are committed to a keccak256 Merkle tree with
//! sorted pair hashing, the convention the collection contract verifies
//! proofs against. Leaves are the keccak hash of the raw address bytes and
//! are sorted, so the root is independent of configuration order. An odd
//! node at the end of a layer is carried up unhashed.

use std::collections::HashSet;

use alloy::primitives::{keccak256, Address, B256};

/// Membership oracle over a pre-committed address set.
///
/// Membership checks are pure local lookups; proof generation walks the
/// precomputed tree layers.
#[derive(Debug, Clone)]
pub struct Whitelist {
    members: HashSet<Address>,
    layers: Vec<Vec<B256>>,
}

impl Whitelist {
    /// Commit `addresses` to a Merkle tree. Duplicates collapse to one leaf.
    pub fn new(addresses: &[Address]) -> Self {
        let members: HashSet<Address> = addresses.iter().copied().collect();
        let mut leaves: Vec<B256> = members
            .iter()
            .map(|address| keccak256(address.as_slice()))
            .collect();
        leaves.sort();

        Self {
            members,
            layers: build_layers(leaves),
        }
    }

    /// Number of committed addresses.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The Merkle root, or `None` for an empty whitelist.
    pub fn root(&self) -> Option<B256> {
        self.layers.last().and_then(|layer| layer.first()).copied()
    }

    /// Whether `address` is committed to the tree.
    pub fn contains(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    /// Membership proof for `address`, bottom-up sibling hashes.
    ///
    /// `None` when the address is not in the whitelist. A single-member tree
    /// yields an empty proof; its leaf is the root.
    pub fn proof_for(&self, address: &Address) -> Option<Vec<B256>> {
        if !self.members.contains(address) {
            return None;
        }

        let leaf = keccak256(address.as_slice());
        let mut index = self.layers.first()?.iter().position(|l| *l == leaf)?;
        let mut proof = Vec::new();

        for layer in self.layers.iter().take(self.layers.len().saturating_sub(1)) {
            let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };
            if let Some(hash) = layer.get(sibling) {
                proof.push(*hash);
            }
            index /= 2;
        }

        Some(proof)
    }

    /// Serializable form of the proof: 0x-prefixed hashes joined with
    /// commas, or the empty string for a non-member.
    pub fn raw_proof_for(&self, address: &Address) -> String {
        match self.proof_for(address) {
            Some(proof) => proof
                .iter()
                .map(|hash| format!("0x{}", hex::encode(hash)))
                .collect::<Vec<_>>()
                .join(","),
            None => String::new(),
        }
    }
}

/// Hash a sorted pair of nodes.
fn hash_pair(a: B256, b: B256) -> B256 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(low.as_slice());
    buf[32..].copy_from_slice(high.as_slice());
    keccak256(buf)
}

/// Build every tree layer from the leaf layer up to the root.
fn build_layers(leaves: Vec<B256>) -> Vec<Vec<B256>> {
    let mut layers = vec![leaves];
    loop {
        let next = {
            let current = match layers.last() {
                Some(layer) if layer.len() > 1 => layer,
                _ => break,
            };
            let mut next = Vec::with_capacity((current.len() + 1) / 2);
            for pair in current.chunks(2) {
                match pair {
                    [left, right] => next.push(hash_pair(*left, *right)),
                    [lone] => next.push(*lone),
                    _ => {}
                }
            }
            next
        };
        layers.push(next);
    }
    layers
}
