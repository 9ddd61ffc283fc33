//! # ledgercore
//!
//! The coordination layer between callers and an asynchronous native
//! ledger/wallet/credential library: command correlation, error
//! classification, and handle liveness.
//!
//! ## Architecture
//!
//! - `error`: native status codes to a closed `ErrorKind` taxonomy.
//! - `command`: the pending table correlating command ids with waiters.
//! - `invoker`: the single dispatch path, producing `CommandFuture`s.
//! - `handles`: liveness of opaque native handles.
//! - `context`: the explicit owner of both tables, plus configuration.

pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod handles;
pub mod invoker;
pub mod logging;
pub mod value;

pub use command::CommandId;
pub use command::Outcome;
pub use command::PendingCommandTable;
pub use config::Config;
pub use context::ClientContext;
pub use context::ContextBuilder;
pub use error::Error;
pub use error::ErrorKind;
pub use error::ErrorSource;
pub use error::Result;
pub use error::classify;
pub use handles::HandleKind;
pub use handles::HandleRegistry;
pub use handles::HandleState;
pub use handles::ResourceHandle;
pub use invoker::AsyncInvoker;
pub use invoker::CommandFuture;
pub use invoker::Completer;
pub use value::FromValues;
pub use value::NativeArg;
pub use value::NativeValue;
pub use value::RawHandle;
pub use value::ValueType;
