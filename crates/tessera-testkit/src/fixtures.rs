//! Principals and item sets used across tests
use tessera_core::{ItemId, PrincipalId};

/// Principal derived from a readable label
pub fn principal(label: &str) -> PrincipalId {
    PrincipalId::from_label(label)
}

pub fn alice() -> PrincipalId {
    principal("alice")
}

pub fn bob() -> PrincipalId {
    principal("bob")
}

pub fn carol() -> PrincipalId {
    principal("carol")
}

/// Item ids `1..=count`
pub fn item_range(count: u64) -> Vec<ItemId> {
    (1..=count).map(ItemId::new).collect()
}
