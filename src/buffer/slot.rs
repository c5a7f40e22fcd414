//! # Slot payloads and buffer snapshots.
//!
//! A slot is one fixed-position storage cell in a bounded buffer. At any
//! instant it is either empty or holds exactly one complete [`Item`]; no
//! partial write is ever observable. Buffers model a slot as `Option<Item>`
//! (or `Option<ItemKind>` where only the tag matters) and guard all mutation
//! with their exclusion section, so the types here are plain data.
//!
//! [`Snapshot`] is a consistent copy of every slot plus the filled count,
//! taken under the same exclusion section that guards mutation. It renders
//! in the `[A][ ][B]` form front ends display.

use std::fmt;

/// Category tag for the addressable (dual-resource) discipline.
///
/// Producer/consumer actors come in pairs of two kinds; a consumer only
/// drains slots holding its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Orange,
    Apple,
}

impl ItemKind {
    /// Returns a short lowercase name for logs and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Orange => "orange",
            ItemKind::Apple => "apple",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload stored in a filled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    /// Single alphabetic symbol, used by the FIFO discipline.
    Symbol(char),
    /// Tagged item, used by the addressable discipline.
    Tagged(ItemKind),
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Symbol(c) => write!(f, "{c}"),
            Item::Tagged(kind) => f.write_str(kind.as_str()),
        }
    }
}

/// Consistent copy of a buffer's visible state.
///
/// Captured inside the exclusion section, so `filled` always equals the
/// number of `Some` entries in `slots` and no half-applied operation can
/// appear in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// One entry per slot, in index order.
    pub slots: Vec<Option<Item>>,
    /// Number of filled slots.
    pub filled: usize,
}

impl Snapshot {
    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.capacity()
    }

    /// Returns true if any slot currently holds the given symbol.
    pub fn contains_symbol(&self, symbol: char) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, Some(Item::Symbol(c)) if *c == symbol))
    }
}

impl fmt::Display for Snapshot {
    /// Renders every slot as `[x]`, empty slots as `[ ]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.slots {
            match slot {
                Some(Item::Symbol(c)) => write!(f, "[{c}]")?,
                Some(Item::Tagged(kind)) => write!(f, "[{kind}]")?,
                None => f.write_str("[ ]")?,
            }
        }
        Ok(())
    }
}
