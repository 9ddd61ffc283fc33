//! An in-process stand-in for the native library.
//!
//! Handlers are registered per native function name and decide how each call
//! behaves: rejected at dispatch, completed, failed with detail, never
//! completed, or completed twice. Completions run on freshly spawned threads,
//! and failure detail is published in a thread-local that is read back
//! through `current_error`, so errors are observed on the thread that
//! reported them.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;
use std::time::Duration;

use dashmap::DashMap;

use ledgercore::CommandId;
use ledgercore::Completer;
use ledgercore::ErrorSource;
use ledgercore::NativeArg;
use ledgercore::NativeValue;
use ledgercore::error::codes;

use crate::native::Native;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(message: &str) {
    let detail = serde_json::json!({ "message": message, "backtrace": "mock-native" });
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(detail.to_string()));
}

/// How a mocked function responds to one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockReply {
    /// Reject at dispatch with this status. No completion follows.
    Reject(i32),
    /// Complete successfully with these values.
    Complete(Vec<NativeValue>),
    /// Complete successfully with a freshly allocated handle id.
    NewHandle,
    /// Complete with a failure code, publishing `message` as detail.
    Fail { code: i32, message: String },
    /// Accept the command and never complete it.
    Silent,
    /// Complete successfully, then complete the same command again.
    Twice(Vec<NativeValue>),
}

impl MockReply {
    pub fn ok() -> Self {
        Self::Complete(Vec::new())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Complete(vec![NativeValue::Str(s.into())])
    }

    pub fn fail(code: i32, message: impl Into<String>) -> Self {
        Self::Fail { code, message: message.into() }
    }
}

type Handler = Arc<dyn Fn(&[NativeArg]) -> MockReply + Send + Sync>;

pub struct MockNative {
    handlers: DashMap<&'static str, Handler>,
    sync_status: DashMap<&'static str, i32>,
    calls: DashMap<&'static str, usize>,
    next_handle: AtomicI32,
    delay: Duration,
}

impl MockNative {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            sync_status: DashMap::new(),
            calls: DashMap::new(),
            next_handle: AtomicI32::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Delays every completion by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answers every call to `function` with `reply`.
    pub fn reply(&self, function: &'static str, reply: MockReply) -> &Self {
        self.on(function, move |_| reply.clone())
    }

    /// Answers calls to `function` by running `handler` on the arguments.
    pub fn on(&self, function: &'static str, handler: impl Fn(&[NativeArg]) -> MockReply + Send + Sync + 'static) -> &Self {
        self.handlers.insert(function, Arc::new(handler));
        self
    }

    /// Sets the status a synchronous `function` returns. Unset functions
    /// succeed.
    pub fn sync_status(&self, function: &'static str, status: i32) -> &Self {
        self.sync_status.insert(function, status);
        self
    }

    /// How many times `function` reached the native layer.
    pub fn calls(&self, function: &str) -> usize {
        self.calls.get(function).map(|count| *count).unwrap_or(0)
    }

    fn record(&self, function: &'static str) {
        *self.calls.entry(function).or_insert(0) += 1;
    }

    fn allocate_handle(&self) -> i32 {
        self.next_handle.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for MockNative {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSource for MockNative {
    fn current_error(&self) -> Option<String> {
        LAST_ERROR.with(|e| e.borrow().clone())
    }
}

impl Native for MockNative {
    fn dispatch(&self, command: CommandId, function: &'static str, args: &[NativeArg], completer: Completer) -> i32 {
        self.record(function);

        let Some(handler) = self.handlers.get(function).map(|h| h.value().clone()) else {
            set_last_error(&format!("no mock handler for {}", function));
            return codes::INVALID_STATE;
        };

        let reply = match handler(args) {
            MockReply::Reject(code) => {
                set_last_error(&format!("{} rejected at dispatch", function));
                return code;
            }
            MockReply::NewHandle => MockReply::Complete(vec![NativeValue::Handle(self.allocate_handle())]),
            other => other,
        };

        let delay = self.delay;
        std::thread::spawn(move || {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            match reply {
                MockReply::Complete(values) => {
                    completer.complete(command, codes::SUCCESS, values);
                }
                MockReply::Fail { code, message } => {
                    set_last_error(&message);
                    completer.complete(command, code, Vec::new());
                }
                MockReply::Twice(values) => {
                    completer.complete(command, codes::SUCCESS, values.clone());
                    completer.complete(command, codes::SUCCESS, values);
                }
                MockReply::Silent | MockReply::Reject(_) | MockReply::NewHandle => {}
            }
        });

        codes::SUCCESS
    }

    fn call_sync(&self, function: &'static str, _args: &[NativeArg]) -> i32 {
        self.record(function);

        let status = self.sync_status.get(function).map(|s| *s).unwrap_or(codes::SUCCESS);
        if status != codes::SUCCESS {
            set_last_error(&format!("{} failed", function));
        }
        status
    }
}
