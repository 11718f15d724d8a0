//! Core identifier types used across the Tessera ledger
//!
//! Numeric identifiers are plain newtypes over `u64` so they serialize as
//! integers for indexers. Principals are UUIDs, either supplied by the
//! ownership registry or derived deterministically from a label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Number of fragment slots composing one item.
pub const FRAGMENTS_PER_ITEM: u8 = 4;

fn derived_uuid(label: &[u8]) -> Uuid {
    let digest = blake3::hash(label);
    let mut uuid_bytes = [0u8; 16];
    uuid_bytes.copy_from_slice(&digest.as_bytes()[..16]);
    Uuid::from_bytes(uuid_bytes)
}

/// Item identifier
///
/// Identifies a composite item made of [`FRAGMENTS_PER_ITEM`] fragments. Item
/// ids are supplied at construction and are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Create a new item id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Fragment unit identifier
///
/// Allocated from a single global counter starting at 1 and never reused,
/// including after the unit is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u64);

impl UnitId {
    /// Create a new unit id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Get the next id in sequence
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Derived (fused) unit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FusionId(pub u64);

impl FusionId {
    /// Create a new fusion id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Get the next id in sequence
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for FusionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fusion-{}", self.0)
    }
}

impl From<u64> for FusionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Fragment slot within an item, always in `1..=FRAGMENTS_PER_ITEM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Slot(u8);

impl Slot {
    /// First slot of every item
    pub const FIRST: Slot = Slot(1);
    /// Last slot of every item
    pub const LAST: Slot = Slot(FRAGMENTS_PER_ITEM);

    /// Create a slot, returning `None` outside `1..=FRAGMENTS_PER_ITEM`
    pub fn new(slot: u8) -> Option<Self> {
        (1..=FRAGMENTS_PER_ITEM).contains(&slot).then_some(Self(slot))
    }

    /// Get the inner value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Zero-based position, for indexing slot arrays
    pub fn index(&self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Iterate every slot in order
    pub fn all() -> impl Iterator<Item = Slot> {
        (1..=FRAGMENTS_PER_ITEM).map(Slot)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Slot::new(value).ok_or_else(|| format!("slot {value} outside 1..={FRAGMENTS_PER_ITEM}"))
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

/// Principal identifier
///
/// An account as known to the external ownership registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Derive a stable principal from a human-readable label
    pub fn from_label(label: &str) -> Self {
        let mut input = b"tessera-principal:".to_vec();
        input.extend_from_slice(label.as_bytes());
        Self(derived_uuid(&input))
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "principal-{}", self.0)
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("principal-").unwrap_or(s);
        Ok(Self(Uuid::parse_str(raw)?))
    }
}

impl From<Uuid> for PrincipalId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Asset reference handed to the ownership registry
///
/// Fragment units and fused units share one registry but live in separate id
/// spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AssetId {
    /// A fragment unit
    Fragment(UnitId),
    /// A derived unit minted by fusion
    Fused(FusionId),
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Fragment(unit) => write!(f, "{unit}"),
            AssetId::Fused(fusion) => write!(f, "{fusion}"),
        }
    }
}

impl From<UnitId> for AssetId {
    fn from(unit: UnitId) -> Self {
        AssetId::Fragment(unit)
    }
}

impl From<FusionId> for AssetId {
    fn from(fusion: FusionId) -> Self {
        AssetId::Fused(fusion)
    }
}
