//! Ledger lookups through the wallet cache.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::PoolHandle;
use crate::handles::WalletHandle;
use crate::operation::Operation;
use crate::operation::Param;

const POOL: Param = Param::Handle("pool_handle", HandleKind::Pool);
const WALLET: Param = Param::Handle("wallet_handle", HandleKind::Wallet);

const GET_SCHEMA: Operation = Operation::new(
    "indy_get_schema",
    &[POOL, WALLET, Param::Text("submitter_did"), Param::Text("id"), Param::Json("options_json")],
);
const GET_CRED_DEF: Operation = Operation::new(
    "indy_get_cred_def",
    &[POOL, WALLET, Param::Text("submitter_did"), Param::Text("id"), Param::Json("options_json")],
);
const PURGE_SCHEMA_CACHE: Operation = Operation::new("indy_purge_schema_cache", &[WALLET, Param::Json("options_json")]);
const PURGE_CRED_DEF_CACHE: Operation = Operation::new("indy_purge_cred_def_cache", &[WALLET, Param::Json("options_json")]);

#[derive(Clone, Debug)]
pub struct CacheFacade {
    facade: Facade,
}

impl CacheFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    /// Reads a schema from the cache, falling back to the ledger as
    /// `options` allow.
    pub async fn get_schema(&self, pool: PoolHandle, wallet: WalletHandle, submitter_did: &str, id: &str, options: &str) -> Result<String> {
        self.facade
            .call(
                &GET_SCHEMA,
                vec![pool.into(), wallet.into(), submitter_did.into(), id.into(), options.into()],
            )
            .await
    }

    pub async fn get_cred_def(&self, pool: PoolHandle, wallet: WalletHandle, submitter_did: &str, id: &str, options: &str) -> Result<String> {
        self.facade
            .call(
                &GET_CRED_DEF,
                vec![pool.into(), wallet.into(), submitter_did.into(), id.into(), options.into()],
            )
            .await
    }

    pub async fn purge_schema_cache(&self, wallet: WalletHandle, options: &str) -> Result<()> {
        self.facade.call(&PURGE_SCHEMA_CACHE, vec![wallet.into(), options.into()]).await
    }

    pub async fn purge_cred_def_cache(&self, wallet: WalletHandle, options: &str) -> Result<()> {
        self.facade.call(&PURGE_CRED_DEF_CACHE, vec![wallet.into(), options.into()]).await
    }
}
