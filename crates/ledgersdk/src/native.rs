//! The native library boundary.
//!
//! Everything the facades know about the wrapped library goes through this
//! trait: asynchronous dispatch by function name, synchronous calls for the
//! few functions that complete inline, and the per-thread error detail.

use std::sync::Arc;

use ledgercore::CommandId;
use ledgercore::Completer;
use ledgercore::ErrorSource;
use ledgercore::NativeArg;

/// A native ledger/wallet/credential library.
///
/// `dispatch` must return promptly. Its return value is the synchronous
/// status: non-zero means the command was rejected and no completion will
/// follow. On zero, the library calls `completer.complete(command, ..)`
/// exactly once, later, from any thread.
pub trait Native: ErrorSource {
    fn dispatch(&self, command: CommandId, function: &'static str, args: &[NativeArg], completer: Completer) -> i32;

    /// Calls a function that completes before returning.
    fn call_sync(&self, function: &'static str, args: &[NativeArg]) -> i32;
}

/// Reads error detail through a shared `Native`.
pub(crate) struct NativeErrorSource(pub Arc<dyn Native>);

impl ErrorSource for NativeErrorSource {
    fn current_error(&self) -> Option<String> {
        self.0.current_error()
    }
}
