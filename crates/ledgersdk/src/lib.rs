//! # ledgersdk
//!
//! Typed, asynchronous facades over a native ledger/wallet/credential
//! library, built on `ledgercore`.
//!
//! ## Architecture
//!
//! - `native`: the boundary trait the wrapped library is reached through.
//! - `operation`: declarative descriptors for every native function, and
//!   the local argument validation run before dispatch.
//! - `facade`: the one generic validate → invoke → wait path.
//! - `lifecycle`: forward-only stage machines for connections, issuance and
//!   proofs.
//! - `envelope`: serialized objects carrying their local stage.
//! - `scope`: release-on-exit for call sites that want it.
//! - One module per domain facade, and `mock` for an in-process native
//!   layer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ledgersdk::Client;
//! use ledgersdk::mock::MockNative;
//!
//! # async fn run() -> ledgercore::Result<()> {
//! let client = Client::new(Arc::new(MockNative::new()));
//! let wallet = client.wallet();
//! let (did, verkey) = wallet
//!     .with_open(r#"{"id":"alice"}"#, r#"{"key":"k"}"#, |handle| {
//!         let dids = client.did();
//!         async move { dids.create_and_store(handle, "{}").await }
//!     })
//!     .await?;
//! println!("{} {}", did, verkey);
//! # Ok(())
//! # }
//! ```

pub mod anoncreds;
pub mod cache;
pub mod client;
pub mod connection;
pub mod credential;
pub mod credential_def;
pub mod crypto;
pub mod did;
pub mod envelope;
pub mod facade;
pub mod handles;
pub mod ledger;
pub mod lifecycle;
pub mod mock;
pub mod native;
pub mod operation;
pub mod pairwise;
pub mod pool;
pub mod proof;
pub mod record;
pub mod schema;
pub mod scope;
pub mod wallet;

pub use client::Client;
pub use facade::Facade;
pub use handles::ConnectionHandle;
pub use handles::CredentialDefHandle;
pub use handles::CredentialHandle;
pub use handles::PoolHandle;
pub use handles::ProofHandle;
pub use handles::SchemaHandle;
pub use handles::SearchHandle;
pub use handles::WalletHandle;
pub use lifecycle::ConnectionState;
pub use lifecycle::IssuanceState;
pub use lifecycle::ProofState;
pub use lifecycle::TerminationReason;
pub use native::Native;
pub use operation::Operation;
pub use operation::Param;
pub use scope::Release;
pub use scope::scoped;

#[cfg(test)]
mod tests;
