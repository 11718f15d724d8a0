//! In-memory ownership registry
//!
//! A minimal stand-in for the external registry: it tracks one owner per
//! asset, refuses to mint an id twice (including ids already destroyed) and
//! lets the current owner transfer. Approvals and balances beyond a simple
//! count are out of its scope.

use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use tessera_core::effects::{OwnershipEffects, OwnershipError};
use tessera_core::{AssetId, PrincipalId};
use tracing::debug;

#[derive(Debug, Default)]
struct Registry {
    owners: BTreeMap<AssetId, PrincipalId>,
    destroyed: BTreeSet<AssetId>,
}

/// Ownership registry held in memory
#[derive(Debug, Default)]
pub struct InMemoryOwnershipHandler {
    inner: RwLock<Registry>,
}

impl InMemoryOwnershipHandler {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `asset` from `from` to `to`. Only the current owner may transfer.
    pub fn transfer(
        &self,
        from: PrincipalId,
        to: PrincipalId,
        asset: AssetId,
    ) -> Result<(), OwnershipError> {
        let mut registry = self.inner.write();
        let owner = registry
            .owners
            .get_mut(&asset)
            .ok_or(OwnershipError::UnknownAsset { asset })?;
        if *owner != from {
            return Err(OwnershipError::NotOwner {
                caller: from,
                asset,
            });
        }
        *owner = to;
        debug!(%asset, %from, %to, "asset transferred");
        Ok(())
    }

    /// Assets currently held by `owner`
    pub fn assets_of(&self, owner: PrincipalId) -> Vec<AssetId> {
        self.inner
            .read()
            .owners
            .iter()
            .filter(|(_, holder)| **holder == owner)
            .map(|(asset, _)| *asset)
            .collect()
    }

    /// Number of assets currently held by `owner`
    pub fn balance_of(&self, owner: PrincipalId) -> usize {
        self.inner
            .read()
            .owners
            .values()
            .filter(|holder| **holder == owner)
            .count()
    }

    /// Whether `asset` was minted and later destroyed
    pub fn is_destroyed(&self, asset: AssetId) -> bool {
        self.inner.read().destroyed.contains(&asset)
    }

    /// Number of live assets
    pub fn len(&self) -> usize {
        self.inner.read().owners.len()
    }

    /// Whether no live assets exist
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OwnershipEffects for InMemoryOwnershipHandler {
    fn owner_of(&self, asset: AssetId) -> Result<PrincipalId, OwnershipError> {
        self.inner
            .read()
            .owners
            .get(&asset)
            .copied()
            .ok_or(OwnershipError::UnknownAsset { asset })
    }

    fn mint_to(&self, owner: PrincipalId, asset: AssetId) -> Result<(), OwnershipError> {
        let mut registry = self.inner.write();
        if registry.owners.contains_key(&asset) || registry.destroyed.contains(&asset) {
            return Err(OwnershipError::AlreadyMinted { asset });
        }
        registry.owners.insert(asset, owner);
        debug!(%asset, %owner, "asset minted");
        Ok(())
    }

    fn destroy(&self, asset: AssetId) -> Result<(), OwnershipError> {
        self.destroy_all(&[asset])
    }

    fn destroy_all(&self, assets: &[AssetId]) -> Result<(), OwnershipError> {
        let mut registry = self.inner.write();
        if let Some(missing) = assets.iter().find(|a| !registry.owners.contains_key(*a)) {
            return Err(OwnershipError::UnknownAsset { asset: *missing });
        }
        for asset in assets {
            registry.owners.remove(asset);
            registry.destroyed.insert(*asset);
        }
        debug!(count = assets.len(), "assets destroyed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tessera_core::{FusionId, UnitId};

    fn unit(id: u64) -> AssetId {
        AssetId::Fragment(UnitId::new(id))
    }

    #[test]
    fn mint_then_owner_of() {
        let registry = InMemoryOwnershipHandler::new();
        let alice = PrincipalId::from_label("alice");
        registry.mint_to(alice, unit(1)).unwrap();
        assert_eq!(registry.owner_of(unit(1)), Ok(alice));
        assert_eq!(
            registry.owner_of(unit(2)),
            Err(OwnershipError::UnknownAsset { asset: unit(2) })
        );
    }

    #[test]
    fn ids_cannot_be_minted_twice_even_after_destroy() {
        let registry = InMemoryOwnershipHandler::new();
        let alice = PrincipalId::from_label("alice");
        registry.mint_to(alice, unit(1)).unwrap();
        assert!(registry.mint_to(alice, unit(1)).is_err());

        registry.destroy(unit(1)).unwrap();
        assert!(registry.is_destroyed(unit(1)));
        assert_eq!(
            registry.mint_to(alice, unit(1)),
            Err(OwnershipError::AlreadyMinted { asset: unit(1) })
        );
    }

    #[test]
    fn fragment_and_fused_ids_do_not_collide() {
        let registry = InMemoryOwnershipHandler::new();
        let alice = PrincipalId::from_label("alice");
        registry.mint_to(alice, unit(1)).unwrap();
        registry
            .mint_to(alice, AssetId::Fused(FusionId::new(1)))
            .unwrap();
        assert_eq!(registry.balance_of(alice), 2);
    }

    #[test]
    fn destroy_all_is_all_or_nothing() {
        let registry = InMemoryOwnershipHandler::new();
        let alice = PrincipalId::from_label("alice");
        registry.mint_to(alice, unit(1)).unwrap();
        registry.mint_to(alice, unit(2)).unwrap();

        let err = registry.destroy_all(&[unit(1), unit(3), unit(2)]).unwrap_err();
        assert_eq!(err, OwnershipError::UnknownAsset { asset: unit(3) });
        assert_eq!(registry.len(), 2);

        registry.destroy_all(&[unit(1), unit(2)]).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn only_owner_can_transfer() {
        let registry = InMemoryOwnershipHandler::new();
        let alice = PrincipalId::from_label("alice");
        let bob = PrincipalId::from_label("bob");
        registry.mint_to(alice, unit(1)).unwrap();

        assert_eq!(
            registry.transfer(bob, alice, unit(1)),
            Err(OwnershipError::NotOwner {
                caller: bob,
                asset: unit(1)
            })
        );
        registry.transfer(alice, bob, unit(1)).unwrap();
        assert_eq!(registry.owner_of(unit(1)), Ok(bob));
        assert_eq!(registry.assets_of(bob), vec![unit(1)]);
        assert!(registry.assets_of(alice).is_empty());
    }
}
