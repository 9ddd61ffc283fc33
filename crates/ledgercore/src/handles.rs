//! # Handle Registry
//!
//! Liveness tracking for the opaque resource handles the native layer hands
//! out. Operations consult the registry before dispatch so a stale handle fails
//! fast with `InvalidState` instead of reaching native code.
//!
//! The registry never owns the resources. Releasing a wallet does not release
//! handles derived from it, and dropping the registry releases nothing.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::Error;
use crate::error::Result;

/// The native layer's "no such handle" sentinel.
pub const INVALID_HANDLE: i32 = 0;

/// The family a native handle belongs to. Ids are only unique within a kind.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum HandleKind {
    Pool,
    Wallet,
    Connection,
    Credential,
    CredentialDef,
    Schema,
    Proof,
    WalletSearch,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pool => "pool",
            Self::Wallet => "wallet",
            Self::Connection => "connection",
            Self::Credential => "credential",
            Self::CredentialDef => "credential-def",
            Self::Schema => "schema",
            Self::Proof => "proof",
            Self::WalletSearch => "wallet-search",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum HandleState {
    Open,
    Released,
}

/// A native handle id tagged with its kind.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ResourceHandle {
    pub id: i32,
    pub kind: HandleKind,
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.kind, self.id)
    }
}

/// Concurrent map of every handle seen, live or released.
///
/// Released entries are kept as tombstones so a second release is reported
/// rather than silently accepted. They are only dropped by `purge_released`,
/// which `ClientContext::shutdown` calls; long-lived owners that churn
/// through handles should call it themselves.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    handles: DashMap<(HandleKind, i32), HandleState>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a handle produced by a create/open/deserialize operation.
    pub fn track(&self, id: i32, kind: HandleKind) -> Result<ResourceHandle> {
        if id == INVALID_HANDLE {
            return Err(Error::invalid_state(format!("native layer returned the invalid {} handle", kind)));
        }

        let handle = ResourceHandle { id, kind };
        match self.handles.entry((kind, id)) {
            Entry::Occupied(mut entry) => {
                if *entry.get() == HandleState::Open {
                    return Err(Error::invalid_state(format!("{} is already open", handle)));
                }
                // the native layer recycled a released id
                entry.insert(HandleState::Open);
            }
            Entry::Vacant(entry) => {
                entry.insert(HandleState::Open);
            }
        }

        tracing::debug!(%handle, "tracking handle");
        Ok(handle)
    }

    /// Fails with `InvalidState` unless the handle is tracked and open.
    pub fn check_live(&self, handle: &ResourceHandle) -> Result<()> {
        match self.state(handle) {
            Some(HandleState::Open) => Ok(()),
            Some(HandleState::Released) => Err(Error::invalid_state(format!("{} was released", handle))),
            None => Err(Error::invalid_state(format!("{} is not a known handle", handle))),
        }
    }

    /// Marks the handle released. Only the first call succeeds.
    pub fn release(&self, handle: &ResourceHandle) -> Result<()> {
        let Some(mut state) = self.handles.get_mut(&(handle.kind, handle.id)) else {
            return Err(Error::invalid_state(format!("{} is not a known handle", handle)));
        };

        if *state == HandleState::Released {
            tracing::warn!(%handle, "double release");
            return Err(Error::invalid_state(format!("{} was already released", handle)));
        }

        *state = HandleState::Released;
        tracing::debug!(%handle, "released handle");
        Ok(())
    }

    pub fn state(&self, handle: &ResourceHandle) -> Option<HandleState> {
        self.handles.get(&(handle.kind, handle.id)).map(|entry| *entry.value())
    }

    pub fn live_count(&self) -> usize {
        self.handles.iter().filter(|entry| *entry.value() == HandleState::Open).count()
    }

    /// Open handles of one kind, in no particular order.
    pub fn live_handles(&self, kind: HandleKind) -> Vec<ResourceHandle> {
        self.handles
            .iter()
            .filter(|entry| entry.key().0 == kind && *entry.value() == HandleState::Open)
            .map(|entry| ResourceHandle { id: entry.key().1, kind })
            .collect()
    }

    /// Forgets released tombstones. Afterwards a double release of a purged
    /// handle reports "not a known handle" instead of "already released".
    pub fn purge_released(&self) -> usize {
        let before = self.handles.len();
        self.handles.retain(|_, state| *state == HandleState::Open);
        before - self.handles.len()
    }
}
