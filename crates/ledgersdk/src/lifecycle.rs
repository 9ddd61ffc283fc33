//! # Lifecycle State Machines
//!
//! Connections, credential issuance and proof exchanges each move through a
//! linear sequence of stages. The local stage of every live object is kept
//! in a `StageTable` attached to the client context, so facades built on the
//! same context agree on it.
//!
//! ## Rules
//!
//! - Stages only move forward. An operation invoked out of order fails with
//!   `InvalidState` before anything is dispatched.
//! - The native layer reports progress as a numeric code from `update_state`.
//!   A report that maps to an earlier stage is rejected; an equal one is a
//!   no-op.
//! - Terminal stages accept no further moves, except where a stage declares
//!   it may follow one (a revocation after acceptance).

use std::fmt::Debug;

use dashmap::DashMap;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use ledgercore::Error;
use ledgercore::HandleRegistry;
use ledgercore::HandleState;
use ledgercore::ResourceHandle;
use ledgercore::Result;

pub trait Lifecycle: Copy + Eq + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Position in the linear order. Later stages rank higher.
    fn rank(&self) -> u8;

    fn is_terminal(&self) -> bool;

    /// Whether this stage may replace the terminal stage `finished`.
    fn may_follow(&self, _finished: &Self) -> bool {
        false
    }

    /// Maps a native `update_state` code, given the stage in force, if it
    /// names a stage.
    fn from_native(code: i64, current: &Self) -> Option<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Initiated,
    Invited,
    Responded,
    Complete,
}

impl Lifecycle for ConnectionState {
    fn rank(&self) -> u8 {
        match self {
            Self::Initiated => 0,
            Self::Invited => 1,
            Self::Responded => 2,
            Self::Complete => 3,
        }
    }

    fn is_terminal(&self) -> bool {
        *self == Self::Complete
    }

    fn from_native(code: i64, _current: &Self) -> Option<Self> {
        match code {
            1 => Some(Self::Initiated),
            2 => Some(Self::Invited),
            3 => Some(Self::Responded),
            4 => Some(Self::Complete),
            _ => None,
        }
    }
}

/// Why an issuance ended without the credential being accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Rejected,
    Expired,
    Errored,
    Cancelled,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rejected => "rejected",
            Self::Expired => "expired",
            Self::Errored => "errored",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceState {
    Initialized,
    OfferSent,
    RequestReceived,
    /// Local only: the credential went out, acceptance not yet reported.
    Issued,
    Accepted,
    Revoked,
    Terminated { reason: TerminationReason },
}

impl Lifecycle for IssuanceState {
    fn rank(&self) -> u8 {
        match self {
            Self::Initialized => 0,
            Self::OfferSent => 1,
            Self::RequestReceived => 2,
            Self::Issued => 3,
            Self::Accepted => 4,
            Self::Revoked => 5,
            Self::Terminated { .. } => 6,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Revoked | Self::Terminated { .. })
    }

    fn may_follow(&self, finished: &Self) -> bool {
        *self == Self::Revoked && *finished == Self::Accepted
    }

    // 5 (unfulfilled) is never reported for issuer credentials.
    fn from_native(code: i64, _current: &Self) -> Option<Self> {
        match code {
            1 => Some(Self::Initialized),
            2 => Some(Self::OfferSent),
            3 => Some(Self::RequestReceived),
            4 => Some(Self::Accepted),
            6 => Some(Self::Terminated { reason: TerminationReason::Expired }),
            7 => Some(Self::Revoked),
            9 => Some(Self::Terminated { reason: TerminationReason::Rejected }),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofState {
    Initialized,
    RequestSent,
    Generated,
    Sent,
    Verified { valid: bool },
}

impl Lifecycle for ProofState {
    fn rank(&self) -> u8 {
        match self {
            Self::Initialized => 0,
            Self::RequestSent => 1,
            Self::Generated => 2,
            Self::Sent => 3,
            Self::Verified { .. } => 4,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// The native layer reports 3 when a proof arrived it could not check
    /// and 4 when it arrived and checked. Both are `Sent` locally; the
    /// verdict comes from `get_proof`, so a verified proof stays verified.
    fn from_native(code: i64, current: &Self) -> Option<Self> {
        match (code, current) {
            (3 | 4, Self::Verified { .. }) => Some(*current),
            (1, _) => Some(Self::Initialized),
            (2, _) => Some(Self::RequestSent),
            (3 | 4, _) => Some(Self::Sent),
            _ => None,
        }
    }
}

/// The local stage of every live object of one lifecycle type.
#[derive(Debug)]
pub struct StageTable<S> {
    stages: DashMap<i32, S>,
}

impl<S> Default for StageTable<S> {
    fn default() -> Self {
        Self { stages: DashMap::new() }
    }
}

impl<S: Lifecycle> StageTable<S> {
    pub fn set(&self, handle: ResourceHandle, stage: S) {
        tracing::trace!(%handle, ?stage, "stage set");
        self.stages.insert(handle.id, stage);
    }

    pub fn get(&self, handle: ResourceHandle) -> Result<S> {
        self.stages
            .get(&handle.id)
            .map(|entry| *entry.value())
            .ok_or_else(|| Error::invalid_state(format!("{} has no lifecycle stage", handle)))
    }

    /// Returns the current stage if `allowed` accepts it.
    pub fn require(&self, handle: ResourceHandle, operation: &str, allowed: impl Fn(&S) -> bool) -> Result<S> {
        let stage = self.get(handle)?;
        if !allowed(&stage) {
            return Err(Error::invalid_state(format!(
                "{} is not allowed on {} in stage {:?}",
                operation, handle, stage
            )));
        }
        Ok(stage)
    }

    /// Moves to `next` if that is not a step backwards. Returns the stage in
    /// force afterwards.
    pub fn advance(&self, handle: ResourceHandle, next: S) -> Result<S> {
        let Some(mut current) = self.stages.get_mut(&handle.id) else {
            return Err(Error::invalid_state(format!("{} has no lifecycle stage", handle)));
        };

        if *current == next {
            return Ok(next);
        }
        if current.is_terminal() && !next.may_follow(&*current) {
            return Err(Error::invalid_state(format!(
                "{} is finished ({:?}); cannot move to {:?}",
                handle, *current, next
            )));
        }
        if next.rank() < current.rank() {
            return Err(Error::invalid_state(format!(
                "{} cannot move back from {:?} to {:?}",
                handle, *current, next
            )));
        }

        tracing::debug!(%handle, from = ?*current, to = ?next, "stage advanced");
        *current = next;
        Ok(next)
    }

    /// Maps a native `update_state` code and advances to it.
    pub fn advance_native(&self, handle: ResourceHandle, code: i64) -> Result<S> {
        let current = self.get(handle)?;
        let next = S::from_native(code, &current)
            .ok_or_else(|| Error::invalid_state(format!("{} reported unknown state code {}", handle, code)))?;
        self.advance(handle, next)
    }

    pub fn remove(&self, handle: ResourceHandle) -> Option<S> {
        self.stages.remove(&handle.id).map(|(_, stage)| stage)
    }

    /// Drops the stage of `handle` once the registry shows it released.
    pub fn forget_released(&self, handle: ResourceHandle, registry: &HandleRegistry) {
        if registry.state(&handle) == Some(HandleState::Released) {
            self.remove(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
