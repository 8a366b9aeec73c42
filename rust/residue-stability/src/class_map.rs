//! Symbolic stepping of a whole residue class through the Collatz map.
//!
//! Instead of sampling members, the class {mk + r} is advanced as a single
//! object. Three cases arise:
//!
//! - r even, m even: every member is even, the class halves deterministically;
//! - r even, m odd: member parity depends on k, so the class bifurcates into
//!   the two subclasses r (mod 2m) and r+m (mod 2m);
//! - r odd: every member is odd, the class lifts to 3r+1 (mod 3m).
//!
//! The ratio of deterministic merges to bifurcations over a breadth-first
//! expansion is a purely structural stability measure, independent of any
//! sampled trajectory.

use collatz_core::CollatzError;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::collections::VecDeque;

/// A residue class at some depth of the symbolic expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    pub modulus: BigUint,
    pub residue: BigUint,
    pub layer: u32,
}

/// Outcome of symbolically advancing a class by one Collatz step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassStep {
    /// The whole class moves to one successor class.
    Merge(ClassNode),
    /// Parity is ambiguous; the class splits into two refined subclasses.
    Split(ClassNode, ClassNode),
}

impl ClassNode {
    pub fn new(modulus: BigUint, residue: BigUint) -> Self {
        Self {
            modulus,
            residue,
            layer: 0,
        }
    }

    /// Entry into the 4-2-1 loop: residue 1 with even modulus.
    pub fn is_terminal(&self) -> bool {
        self.residue.is_one() && self.modulus.is_even()
    }

    /// Advance the class one symbolic Collatz step.
    pub fn step(&self) -> ClassStep {
        let next_layer = self.layer + 1;
        if self.residue.is_even() {
            if self.modulus.is_even() {
                ClassStep::Merge(ClassNode {
                    modulus: &self.modulus >> 1u32,
                    residue: &self.residue >> 1u32,
                    layer: next_layer,
                })
            } else {
                let doubled = &self.modulus << 1u32;
                ClassStep::Split(
                    ClassNode {
                        modulus: doubled.clone(),
                        residue: self.residue.clone(),
                        layer: next_layer,
                    },
                    ClassNode {
                        modulus: doubled,
                        residue: &self.residue + &self.modulus,
                        layer: next_layer,
                    },
                )
            }
        } else {
            ClassStep::Merge(ClassNode {
                modulus: &self.modulus * 3u32,
                residue: &self.residue * 3u32 + 1u32,
                layer: next_layer,
            })
        }
    }
}

/// Merges-to-splits ratio over a breadth-first expansion of the class,
/// capped at `node_limit` expanded nodes.
///
/// A split-free expansion reports the sentinel 50.0 (perfect stability).
pub fn class_stability_ratio(
    modulus: &BigUint,
    residue: &BigUint,
    node_limit: usize,
) -> Result<f64, CollatzError> {
    if modulus.is_zero() {
        return Err(CollatzError::InvalidInput("modulus must be >= 1".into()));
    }
    if residue >= modulus {
        return Err(CollatzError::InvalidInput(format!(
            "residue {} is out of range for modulus {}",
            residue, modulus
        )));
    }

    let mut queue = VecDeque::from([ClassNode::new(modulus.clone(), residue.clone())]);
    let mut merges = 0u64;
    let mut splits = 0u64;
    let mut nodes = 0usize;

    while let Some(node) = queue.pop_front() {
        if nodes >= node_limit {
            break;
        }
        nodes += 1;
        if node.is_terminal() {
            continue;
        }
        match node.step() {
            ClassStep::Merge(next) => {
                merges += 1;
                queue.push_back(next);
            }
            ClassStep::Split(a, b) => {
                splits += 1;
                queue.push_back(a);
                queue.push_back(b);
            }
        }
    }

    if splits == 0 {
        Ok(50.0)
    } else {
        Ok(merges as f64 / splits as f64)
    }
}
