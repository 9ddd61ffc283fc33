//! # Async Invoker
//!
//! The single path every native command takes: register a pending entry,
//! dispatch with its id, and hand the caller a future bound to the entry.
//!
//! ## Philosophy
//!
//! - **Never wait on nothing**: if the native layer rejects a call
//!   synchronously, the entry is removed and the returned future is already
//!   failed. No caller ever waits for a completion that cannot arrive.
//! - **Thread-agnostic completion**: the `Completer` handed to the native layer
//!   can be called from any thread. The value crosses back through a oneshot
//!   channel, so the caller observes it on its own task.
//! - **No retraction**: dropping a future does not cancel the native command.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use crate::command::CommandId;
use crate::command::Outcome;
use crate::command::PendingCommandTable;
use crate::command::Slot;
use crate::error::Error;
use crate::error::ErrorSource;
use crate::error::Result;
use crate::error::codes;
use crate::value::FromValues;
use crate::value::NativeValue;

/// The completion callback given to the native layer with every dispatch.
#[derive(Clone)]
pub struct Completer {
    table: Arc<PendingCommandTable>,
    source: Arc<dyn ErrorSource>,
    collect_backtrace: bool,
}

impl Completer {
    /// Reports the outcome of command `id`. A non-zero `code` is classified
    /// on the calling thread, where the native error detail still lives.
    pub fn complete(&self, id: CommandId, code: i32, values: Vec<NativeValue>) -> Outcome {
        if code == codes::SUCCESS {
            self.table.resolve(id, values)
        } else {
            self.table.fail(id, self.capture(code))
        }
    }

    pub fn fail(&self, id: CommandId, error: Error) -> Outcome {
        self.table.fail(id, error)
    }

    fn capture(&self, code: i32) -> Error {
        let error = Error::capture(code, self.source.as_ref());
        if self.collect_backtrace { error } else { error.without_backtrace() }
    }
}

impl std::fmt::Debug for Completer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("collect_backtrace", &self.collect_backtrace)
            .finish()
    }
}

enum FutureState<T> {
    Ready(Option<Result<T>>),
    Waiting(Slot),
}

/// A command's eventual result, typed by the expected completion shape.
pub struct CommandFuture<T> {
    id: CommandId,
    state: FutureState<T>,
}

// `T` is only ever moved out of an `Option`, never pinned in place.
impl<T> Unpin for CommandFuture<T> {}

impl<T> CommandFuture<T> {
    fn waiting(id: CommandId, slot: Slot) -> Self {
        Self { id, state: FutureState::Waiting(slot) }
    }

    fn failed(id: CommandId, error: Error) -> Self {
        Self { id, state: FutureState::Ready(Some(Err(error))) }
    }

    pub fn command_id(&self) -> CommandId {
        self.id
    }

    /// True when the result is known without waiting, e.g. a synchronous
    /// dispatch rejection.
    pub fn is_settled(&self) -> bool {
        matches!(self.state, FutureState::Ready(_))
    }
}

impl<T: FromValues> Future for CommandFuture<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let id = this.id;
        let result = match &mut this.state {
            FutureState::Ready(result) => {
                return Poll::Ready(result.take().unwrap_or_else(|| {
                    Err(Error::invalid_state(format!("{} polled after completion", id)))
                }));
            }
            FutureState::Waiting(slot) => match Pin::new(slot).poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(Ok(values))) => T::from_values(values),
                Poll::Ready(Ok(Err(e))) => Err(e),
                Poll::Ready(Err(_)) => Err(Error::invalid_state(format!(
                    "{} was dropped without a completion",
                    id
                ))),
            },
        };

        this.state = FutureState::Ready(None);
        Poll::Ready(result)
    }
}

/// Issues native commands against one pending table.
#[derive(Clone, Debug)]
pub struct AsyncInvoker {
    table: Arc<PendingCommandTable>,
    completer: Completer,
}

impl AsyncInvoker {
    pub fn new(table: Arc<PendingCommandTable>, source: Arc<dyn ErrorSource>) -> Self {
        let completer = Completer {
            table: table.clone(),
            source,
            collect_backtrace: true,
        };
        Self { table, completer }
    }

    pub fn collect_backtrace(mut self, collect: bool) -> Self {
        self.completer.collect_backtrace = collect;
        self
    }

    pub fn completer(&self) -> Completer {
        self.completer.clone()
    }

    pub fn table(&self) -> &Arc<PendingCommandTable> {
        &self.table
    }

    /// Registers a command expecting `T`, then runs `dispatch` with its id.
    ///
    /// `dispatch` performs the native call and returns its synchronous status.
    /// It must not block waiting for the completion.
    pub fn invoke<T, F>(&self, dispatch: F) -> CommandFuture<T>
    where
        T: FromValues,
        F: FnOnce(CommandId, Completer) -> i32,
    {
        let (id, slot) = self.table.register(T::SHAPE);
        let status = dispatch(id, self.completer.clone());

        if status != codes::SUCCESS {
            let error = self.completer.capture(status);
            if !self.table.abandon(id) {
                tracing::warn!(%id, code = status, "native layer completed a command it also rejected");
            }
            tracing::debug!(%id, code = status, "dispatch rejected");
            return CommandFuture::failed(id, error);
        }

        CommandFuture::waiting(id, slot)
    }

    /// Classifies the status of a native call that completes synchronously.
    pub fn invoke_sync(&self, status: i32) -> Result<()> {
        if status == codes::SUCCESS {
            Ok(())
        } else {
            Err(self.completer.capture(status))
        }
    }
}
