//! Ledger pool configurations and connections.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::PoolHandle;
use crate::operation::Operation;
use crate::operation::Param;
use crate::scope;
use crate::scope::Release;

const SET_PROTOCOL_VERSION: Operation = Operation::new("indy_set_protocol_version", &[Param::Int("protocol_version")]);
const CREATE_CONFIG: Operation = Operation::new(
    "indy_create_pool_ledger_config",
    &[Param::Text("config_name"), Param::OptText("config")],
);
const DELETE_CONFIG: Operation = Operation::new("indy_delete_pool_ledger_config", &[Param::Text("config_name")]);
const LIST: Operation = Operation::new("indy_list_pools", &[]);
const OPEN: Operation = Operation::new(
    "indy_open_pool_ledger",
    &[Param::Text("config_name"), Param::OptText("config")],
);
const REFRESH: Operation = Operation::new("indy_refresh_pool_ledger", &[Param::Handle("pool_handle", HandleKind::Pool)]);
const CLOSE: Operation = Operation::new("indy_close_pool_ledger", &[Param::Handle("pool_handle", HandleKind::Pool)]);

#[derive(Clone, Debug)]
pub struct PoolFacade {
    facade: Facade,
}

impl PoolFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    pub async fn set_protocol_version(&self, version: u32) -> Result<()> {
        self.facade.call(&SET_PROTOCOL_VERSION, vec![version.into()]).await
    }

    pub async fn create_config(&self, name: &str, config: Option<&str>) -> Result<()> {
        self.facade.call(&CREATE_CONFIG, vec![name.into(), config.into()]).await
    }

    pub async fn delete_config(&self, name: &str) -> Result<()> {
        self.facade.call(&DELETE_CONFIG, vec![name.into()]).await
    }

    /// JSON list of the configured pools.
    pub async fn list(&self) -> Result<String> {
        self.facade.call(&LIST, Vec::new()).await
    }

    pub async fn open(&self, name: &str, config: Option<&str>) -> Result<PoolHandle> {
        let handle = self
            .facade
            .acquire(&OPEN, vec![name.into(), config.into()], HandleKind::Pool)
            .await?;
        PoolHandle::try_from_resource(handle)
    }

    pub async fn refresh(&self, pool: PoolHandle) -> Result<()> {
        self.facade.call(&REFRESH, vec![pool.into()]).await
    }

    pub async fn close(&self, pool: PoolHandle) -> Result<()> {
        self.facade.release(&CLOSE, pool.resource(), vec![pool.into()]).await
    }

    /// Opens a pool, runs `body`, and closes the pool however `body` ended.
    pub async fn with_open<F, Fut, T>(&self, name: &str, config: Option<&str>, body: F) -> Result<T>
    where
        F: FnOnce(PoolHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let pool = self.open(name, config).await?;
        scope::scoped(self, pool, body).await
    }
}

#[async_trait::async_trait]
impl Release<PoolHandle> for PoolFacade {
    async fn release(&self, handle: PoolHandle) -> Result<()> {
        self.close(handle).await
    }
}
