//! # Pending Command Table
//!
//! Correlates command ids handed to the native layer with the callers waiting
//! on them. Completions arrive on native-owned threads while new commands are
//! being registered, so the table is a concurrent map and every entry is
//! removed on first access: a second completion for the same id finds nothing
//! and becomes a logged no-op.

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::oneshot;

use crate::error::Error;
use crate::error::Result;
use crate::value::NativeValue;
use crate::value::ValueType;
use crate::value::check_shape;

/// Correlation token for one in-flight native command.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CommandId(pub i32);

impl CommandId {
    /// The native layer's reserved "no command" id.
    pub const INVALID: CommandId = CommandId(0);
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cmd-{}", self.0)
    }
}

/// What happened to a completion routed through the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The waiting caller received the result.
    Delivered,
    /// The entry existed but its caller had already stopped listening.
    Abandoned,
    /// No entry: a duplicate completion, or one for an id removed by a timeout.
    Unknown,
}

pub type Slot = oneshot::Receiver<Result<Vec<NativeValue>>>;

/// Write-once result slot for a dispatched command.
struct PendingCommand {
    shape: &'static [ValueType],
    tx: oneshot::Sender<Result<Vec<NativeValue>>>,
    created_at: Instant,
}

#[derive(Debug, Default)]
pub struct PendingCommandTable {
    pending: DashMap<CommandId, PendingCommand>,
    next_id: AtomicU32,
}

impl std::fmt::Debug for PendingCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCommand")
            .field("shape", &self.shape)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl PendingCommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id and an unresolved slot expecting `shape`.
    ///
    /// Ids are positive and never collide with an entry still in the table,
    /// including after the counter wraps.
    pub fn register(&self, shape: &'static [ValueType]) -> (CommandId, Slot) {
        let (tx, rx) = oneshot::channel();
        let pending = PendingCommand {
            shape,
            tx,
            created_at: Instant::now(),
        };

        loop {
            let raw = self.next_id.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
            let id = CommandId((raw & 0x7fff_ffff) as i32);
            if id == CommandId::INVALID {
                continue;
            }

            match self.pending.entry(id) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(entry) => {
                    entry.insert(pending);
                    tracing::trace!(%id, "registered command");
                    return (id, rx);
                }
            }
        }
    }

    /// Completes `id` successfully. Values that do not fit the registered
    /// shape fail the command with `InvalidState` instead.
    pub fn resolve(&self, id: CommandId, values: Vec<NativeValue>) -> Outcome {
        let Some((_, pending)) = self.pending.remove(&id) else {
            tracing::warn!(%id, "resolve for unknown command; duplicate or late completion");
            return Outcome::Unknown;
        };

        let result = match check_shape(pending.shape, &values) {
            Ok(()) => Ok(values),
            Err(e) => {
                tracing::error!(%id, error = %e, "completion does not match expected shape");
                Err(e)
            }
        };

        Self::deliver(id, pending, result)
    }

    /// Completes `id` with a failure.
    pub fn fail(&self, id: CommandId, error: Error) -> Outcome {
        let Some((_, pending)) = self.pending.remove(&id) else {
            tracing::warn!(%id, error = %error, "fail for unknown command; duplicate or late completion");
            return Outcome::Unknown;
        };

        Self::deliver(id, pending, Err(error))
    }

    fn deliver(id: CommandId, pending: PendingCommand, result: Result<Vec<NativeValue>>) -> Outcome {
        let elapsed = pending.created_at.elapsed();
        match pending.tx.send(result) {
            Ok(()) => {
                tracing::debug!(%id, ?elapsed, "command completed");
                Outcome::Delivered
            }
            Err(_) => {
                tracing::debug!(%id, ?elapsed, "command completed after its caller went away");
                Outcome::Abandoned
            }
        }
    }

    /// Removes an entry without completing it. The caller has given up; the
    /// native operation keeps running and its completion will be `Unknown`.
    pub fn abandon(&self, id: CommandId) -> bool {
        let removed = self.pending.remove(&id).is_some();
        if removed {
            tracing::debug!(%id, "abandoned command");
        }
        removed
    }

    /// Fails every outstanding command with a copy of `error`.
    pub fn drain_with(&self, error: &Error) -> usize {
        let keys: Vec<CommandId> = self.pending.iter().map(|e| *e.key()).collect();
        keys.into_iter()
            .filter(|id| self.fail(*id, error.clone()) != Outcome::Unknown)
            .count()
    }

    pub fn contains(&self, id: CommandId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Age of the longest-waiting command, if any.
    pub fn oldest_age(&self) -> Option<Duration> {
        self.pending.iter().map(|e| e.value().created_at.elapsed()).max()
    }
}
