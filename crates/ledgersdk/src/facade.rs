//! # Facade Engine
//!
//! The one generic path shared by every domain facade:
//! validate → invoke → bounded wait. Domain facades only declare operations
//! and decide which results become tracked handles.
//!
//! ## Handle bookkeeping
//!
//! - **Acquire**: create/open/deserialize results are tracked in the registry
//!   before the caller sees them.
//! - **Release**: the registry entry is released first. The native release is
//!   dispatched only if that succeeded, so a double release never reaches the
//!   native layer.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use ledgercore::AsyncInvoker;
use ledgercore::ClientContext;
use ledgercore::FromValues;
use ledgercore::HandleKind;
use ledgercore::HandleRegistry;
use ledgercore::NativeArg;
use ledgercore::RawHandle;
use ledgercore::ResourceHandle;
use ledgercore::Result;

use crate::envelope;
use crate::native::Native;
use crate::native::NativeErrorSource;
use crate::operation::Operation;

#[derive(Clone)]
pub struct Facade {
    ctx: Arc<ClientContext>,
    native: Arc<dyn Native>,
    invoker: AsyncInvoker,
}

impl Facade {
    pub fn new(ctx: Arc<ClientContext>, native: Arc<dyn Native>) -> Self {
        let invoker = ctx.invoker(Arc::new(NativeErrorSource(native.clone())));
        Self { ctx, native, invoker }
    }

    pub fn context(&self) -> &Arc<ClientContext> {
        &self.ctx
    }

    pub fn handles(&self) -> &HandleRegistry {
        self.ctx.handles()
    }

    pub fn native(&self) -> &Arc<dyn Native> {
        &self.native
    }

    /// Runs `op` and waits for its typed result.
    pub async fn call<T: FromValues>(&self, op: &Operation, args: Vec<NativeArg>) -> Result<T> {
        self.ctx.ensure_running()?;
        op.validate(&args, self.ctx.handles())?;
        self.dispatch(op, args).await
    }

    /// Runs an operation whose result is a fresh native handle, and tracks it.
    pub async fn acquire(&self, op: &Operation, args: Vec<NativeArg>, kind: HandleKind) -> Result<ResourceHandle> {
        let RawHandle(id) = self.call(op, args).await?;
        self.track(op, id, kind)
    }

    /// Like `acquire`, for operations that return a handle plus a string.
    pub async fn acquire_with(&self, op: &Operation, args: Vec<NativeArg>, kind: HandleKind) -> Result<(ResourceHandle, String)> {
        let (RawHandle(id), extra) = self.call::<(RawHandle, String)>(op, args).await?;
        Ok((self.track(op, id, kind)?, extra))
    }

    // The native object exists once `op` completed; if tracking fails it
    // can no longer be reached through this client.
    fn track(&self, op: &Operation, id: i32, kind: HandleKind) -> Result<ResourceHandle> {
        self.ctx.handles().track(id, kind).inspect_err(|err| {
            tracing::warn!(function = op.name, raw_id = id, %kind, %err, "native handle not tracked; it leaks");
        })
    }

    /// Releases `handle` locally, then runs the asynchronous native release.
    ///
    /// `args` must include `handle`; it is validated while still live.
    pub async fn release(&self, op: &Operation, handle: ResourceHandle, args: Vec<NativeArg>) -> Result<()> {
        self.ctx.ensure_running()?;
        op.validate(&args, self.ctx.handles())?;
        self.ctx.handles().release(&handle)?;
        self.dispatch::<()>(op, args).await
    }

    /// Releases `handle` locally, then runs a synchronous native release.
    pub fn release_sync(&self, op: &Operation, handle: ResourceHandle) -> Result<()> {
        let args = vec![NativeArg::Handle(handle)];
        op.validate(&args, self.ctx.handles())?;
        self.ctx.handles().release(&handle)?;

        let status = self.native.call_sync(op.name, &args);
        self.invoker.invoke_sync(status)
    }

    /// Runs a synchronous native call that does not touch a handle.
    pub fn call_sync(&self, op: &Operation, args: Vec<NativeArg>) -> Result<()> {
        op.validate(&args, self.ctx.handles())?;
        let status = self.native.call_sync(op.name, &args);
        self.invoker.invoke_sync(status)
    }

    /// Serializes a native object into an envelope carrying `state`.
    pub async fn serialize<S: Serialize + Sync>(&self, op: &Operation, handle: ResourceHandle, state: Option<&S>) -> Result<String> {
        let data: String = self.call(op, vec![NativeArg::Handle(handle)]).await?;
        envelope::seal(handle.kind, state, &data)
    }

    /// Recreates a native object from an envelope and tracks the new handle.
    pub async fn deserialize<S: DeserializeOwned + Send>(&self, op: &Operation, kind: HandleKind, json: &str) -> Result<(ResourceHandle, Option<S>)> {
        let (state, data) = envelope::open(kind, json)?;
        let handle = self.acquire(op, vec![NativeArg::Str(data)], kind).await?;
        Ok((handle, state))
    }

    async fn dispatch<T: FromValues>(&self, op: &Operation, args: Vec<NativeArg>) -> Result<T> {
        let name = op.name;
        let future = self.invoker.invoke::<T, _>(|id, completer| {
            tracing::debug!(%id, function = name, "dispatching");
            self.native.dispatch(id, name, &args, completer)
        });
        self.ctx.wait(future).await
    }
}

impl std::fmt::Debug for Facade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Facade").field("ctx", &self.ctx).finish()
    }
}
