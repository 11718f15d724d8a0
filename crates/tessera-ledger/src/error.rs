//! Error types for the ledger
//!
//! Every variant is raised before any state is committed, with the single
//! exception of `InvariantViolation`, which signals that the ledger found its
//! own bookkeeping inconsistent.

use crate::circulation::CirculationError;
use crate::guard::Operation;
use tessera_core::effects::{EntropyError, OwnershipError, TimeError};
use tessera_core::{FusionId, ItemId, PrincipalId, Slot, TesseraError, UnitId};
use thiserror::Error;

/// Broad category of a [`LedgerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Supply ran out by design; not a correctness failure
    ResourceExhausted,
    /// A precondition or authorization check failed
    Validation,
    /// The ledger's own bookkeeping is inconsistent
    Invariant,
    /// An entropy, ownership or time handler failed
    Collaborator,
    /// A mutating operation was attempted while another was in flight
    Reentrancy,
    /// The ledger could not be constructed
    Configuration,
}

/// Ledger error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Circulation is empty
    #[error("No items available for fragment issuance")]
    NoItemsAvailable,

    /// Every derived unit the ledger may mint has been minted
    #[error("Transformation cap of {cap} reached")]
    TransformationCapReached { cap: u64 },

    /// No fragment of the item has been issued
    #[error("{item} has no issued fragments")]
    NonexistentItem { item: ItemId },

    /// The item still has unissued slots
    #[error("{item} is incomplete: {minted} fragments issued")]
    IncompleteSet { item: ItemId, minted: u8 },

    /// Some fragment of the item is held by someone other than the caller
    #[error("{caller} does not own {unit} in {slot} of {item}")]
    NotOwnerOfAll {
        item: ItemId,
        caller: PrincipalId,
        slot: Slot,
        unit: UnitId,
    },

    /// The item has no retirement fact
    #[error("{item} has not been retired")]
    SetNotRetired { item: ItemId },

    /// The item was retired by someone else
    #[error("{item} was retired by {retiree}, not {caller}")]
    NotRetiree {
        item: ItemId,
        caller: PrincipalId,
        retiree: PrincipalId,
    },

    /// The item already produced a derived unit
    #[error("{item} was already transformed into {fusion}")]
    AlreadyTransformed { item: ItemId, fusion: FusionId },

    /// The caller already retired this item
    #[error("{caller} already retired {item}")]
    AlreadyRetired { item: ItemId, caller: PrincipalId },

    /// The item has not been transformed (strict transformation query)
    #[error("{item} has not been transformed")]
    NotTransformed { item: ItemId },

    /// The item id is not part of this ledger
    #[error("{item} is not configured in this ledger")]
    UnknownItem { item: ItemId },

    /// Bookkeeping inconsistency; never expected through the public API
    #[error("Invariant violation: {message}")]
    InvariantViolation { message: String },

    /// A mutating operation was started while another one was in flight
    #[error("Reentrant {attempted} rejected while {active} is in progress")]
    Reentrancy {
        active: Operation,
        attempted: Operation,
    },

    /// Construction with no item ids
    #[error("A ledger needs at least one item id")]
    EmptyItemSet,

    /// Item ids must be positive
    #[error("Item ids must be positive")]
    InvalidItemId,

    /// Item id supplied twice at construction
    #[error("Duplicate item id {item}")]
    DuplicateItem { item: ItemId },

    /// Fusion cap outside `1..=item count`
    #[error("Fusion cap {cap} must be between 1 and the item count {items}")]
    InvalidFusionCap { cap: u64, items: u64 },

    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] TesseraError),

    /// Entropy handler failed
    #[error("Entropy source failed: {0}")]
    Entropy(#[from] EntropyError),

    /// Ownership registry failed or rejected a call
    #[error("Ownership registry failed: {0}")]
    Ownership(#[from] OwnershipError),

    /// Time handler failed
    #[error("Time source failed: {0}")]
    Time(#[from] TimeError),
}

impl LedgerError {
    /// Create an invariant violation
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Category of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NoItemsAvailable | Self::TransformationCapReached { .. } => {
                ErrorClass::ResourceExhausted
            }
            Self::NonexistentItem { .. }
            | Self::IncompleteSet { .. }
            | Self::NotOwnerOfAll { .. }
            | Self::SetNotRetired { .. }
            | Self::NotRetiree { .. }
            | Self::AlreadyTransformed { .. }
            | Self::AlreadyRetired { .. }
            | Self::NotTransformed { .. }
            | Self::UnknownItem { .. } => ErrorClass::Validation,
            Self::InvariantViolation { .. } => ErrorClass::Invariant,
            Self::Reentrancy { .. } => ErrorClass::Reentrancy,
            Self::Entropy(_) | Self::Ownership(_) | Self::Time(_) => ErrorClass::Collaborator,
            Self::EmptyItemSet
            | Self::InvalidItemId
            | Self::DuplicateItem { .. }
            | Self::InvalidFusionCap { .. }
            | Self::Config(_) => ErrorClass::Configuration,
        }
    }

    /// Whether this error means supply is exhausted rather than a bug
    pub fn is_exhausted(&self) -> bool {
        self.class() == ErrorClass::ResourceExhausted
    }
}

impl From<CirculationError> for LedgerError {
    fn from(err: CirculationError) -> Self {
        Self::invariant(err.to_string())
    }
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
