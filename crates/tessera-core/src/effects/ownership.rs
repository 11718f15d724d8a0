//! Ownership registry interface
//!
//! # Effect Classification
//!
//! - **Category**: Collaborator Effect
//! - **Implementation**: external registry; `tessera-effects` ships an
//!   in-memory handler
//! - **Usage**: retirement reads `owner_of`, issuance and fusion call
//!   `mint_to`, retirement calls `destroy`
//!
//! The ledger allocates every asset id itself and never asks the registry to
//! mint an id twice. How transfers are authorized is the registry's business.

use crate::identifiers::{AssetId, PrincipalId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error type for ownership registry calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum OwnershipError {
    #[error("Unknown or destroyed asset: {asset}")]
    UnknownAsset { asset: AssetId },
    #[error("Asset already minted: {asset}")]
    AlreadyMinted { asset: AssetId },
    #[error("{caller} does not own {asset}")]
    NotOwner { caller: PrincipalId, asset: AssetId },
    #[error("Registry rejected the call: {reason}")]
    Rejected { reason: String },
}

/// External ledger of fragment and fused unit ownership.
pub trait OwnershipEffects: Send + Sync {
    /// Current owner of `asset`. Fails for assets never minted or destroyed.
    fn owner_of(&self, asset: AssetId) -> Result<PrincipalId, OwnershipError>;

    /// Mint a new asset to `owner`.
    fn mint_to(&self, owner: PrincipalId, asset: AssetId) -> Result<(), OwnershipError>;

    /// Destroy an existing asset.
    fn destroy(&self, asset: AssetId) -> Result<(), OwnershipError>;

    /// Destroy a batch of assets.
    ///
    /// Handlers that can should check every asset before destroying any of
    /// them; the default destroys in order and stops at the first failure.
    fn destroy_all(&self, assets: &[AssetId]) -> Result<(), OwnershipError> {
        for asset in assets {
            self.destroy(*asset)?;
        }
        Ok(())
    }
}

impl<T: OwnershipEffects + ?Sized> OwnershipEffects for Arc<T> {
    fn owner_of(&self, asset: AssetId) -> Result<PrincipalId, OwnershipError> {
        (**self).owner_of(asset)
    }

    fn mint_to(&self, owner: PrincipalId, asset: AssetId) -> Result<(), OwnershipError> {
        (**self).mint_to(owner, asset)
    }

    fn destroy(&self, asset: AssetId) -> Result<(), OwnershipError> {
        (**self).destroy(asset)
    }

    fn destroy_all(&self, assets: &[AssetId]) -> Result<(), OwnershipError> {
        (**self).destroy_all(assets)
    }
}
