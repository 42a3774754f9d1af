//! Identity stamp generation.
//!
//! Synthesizers take a `&mut dyn StampGenerator` instead of calling a
//! global source, so tests can predict every stamp they place.
use crate::sexpr::Node;
use std::fmt;
use uuid::Uuid;

/// Opaque unique token, printed as a bare symbol: `(tstamp <token>)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stamp(String);

impl Stamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_node(&self) -> Node {
        Node::symbol(self.0.clone())
    }

    /// `(tstamp <token>)`
    pub fn to_tstamp(&self) -> Node {
        Node::tagged("tstamp", [self.to_node()])
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait StampGenerator {
    fn next_stamp(&mut self) -> Stamp;
}

/// Random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidStamps;

impl StampGenerator for UuidStamps {
    fn next_stamp(&mut self) -> Stamp {
        Stamp(Uuid::new_v4().to_string())
    }
}

/// UUID-shaped tokens from a counter, starting at 1.
#[derive(Debug, Default)]
pub struct SequentialStamps {
    issued: u128,
}

impl SequentialStamps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> u128 {
        self.issued
    }
}

impl StampGenerator for SequentialStamps {
    fn next_stamp(&mut self) -> Stamp {
        self.issued += 1;
        Stamp(Uuid::from_u128(self.issued).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_is_deterministic() {
        let mut stamps = SequentialStamps::new();
        assert_eq!(
            stamps.next_stamp().as_str(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            stamps.next_stamp().as_str(),
            "00000000-0000-0000-0000-000000000002"
        );
        assert_eq!(stamps.issued(), 2);
    }

    #[test]
    fn test_uuid_stamps_are_unique() {
        let mut stamps = UuidStamps;
        let seen: HashSet<Stamp> = (0..100).map(|_| stamps.next_stamp()).collect();
        assert_eq!(seen.len(), 100);
    }

    #[test]
    fn test_tstamp_node_is_symbol() {
        let stamp = SequentialStamps::new().next_stamp();
        let node = stamp.to_tstamp();
        assert_eq!(node.tag(), Some("tstamp"));
        assert_eq!(node.args()[0], Node::symbol(stamp.as_str()));
    }
}
