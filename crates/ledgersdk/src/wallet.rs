//! Wallet lifecycle: create, open, close, delete, export and import.
//!
//! Config and credential arguments are JSON documents passed through as-is.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::WalletHandle;
use crate::operation::Operation;
use crate::operation::Param;
use crate::scope;
use crate::scope::Release;

const WALLET: Param = Param::Handle("wallet_handle", HandleKind::Wallet);

const CREATE: Operation = Operation::new("indy_create_wallet", &[Param::Json("config"), Param::Json("credentials")]);
const OPEN: Operation = Operation::new("indy_open_wallet", &[Param::Json("config"), Param::Json("credentials")]);
const CLOSE: Operation = Operation::new("indy_close_wallet", &[WALLET]);
const DELETE: Operation = Operation::new("indy_delete_wallet", &[Param::Json("config"), Param::Json("credentials")]);
const EXPORT: Operation = Operation::new("indy_export_wallet", &[WALLET, Param::Json("export_config")]);
const IMPORT: Operation = Operation::new(
    "indy_import_wallet",
    &[Param::Json("config"), Param::Json("credentials"), Param::Json("import_config")],
);
const GENERATE_KEY: Operation = Operation::new("indy_generate_wallet_key", &[Param::OptText("config")]);

#[derive(Clone, Debug)]
pub struct WalletFacade {
    facade: Facade,
}

impl WalletFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    pub async fn create(&self, config: &str, credentials: &str) -> Result<()> {
        self.facade.call(&CREATE, vec![config.into(), credentials.into()]).await
    }

    pub async fn open(&self, config: &str, credentials: &str) -> Result<WalletHandle> {
        let handle = self
            .facade
            .acquire(&OPEN, vec![config.into(), credentials.into()], HandleKind::Wallet)
            .await?;
        WalletHandle::try_from_resource(handle)
    }

    /// Closes the wallet. Searches opened on it stay open.
    pub async fn close(&self, wallet: WalletHandle) -> Result<()> {
        self.facade.release(&CLOSE, wallet.resource(), vec![wallet.into()]).await
    }

    pub async fn delete(&self, config: &str, credentials: &str) -> Result<()> {
        self.facade.call(&DELETE, vec![config.into(), credentials.into()]).await
    }

    pub async fn export(&self, wallet: WalletHandle, export_config: &str) -> Result<()> {
        self.facade.call(&EXPORT, vec![wallet.into(), export_config.into()]).await
    }

    pub async fn import(&self, config: &str, credentials: &str, import_config: &str) -> Result<()> {
        self.facade
            .call(&IMPORT, vec![config.into(), credentials.into(), import_config.into()])
            .await
    }

    /// Derives a raw wallet key, optionally from a seed given in `config`.
    pub async fn generate_key(&self, config: Option<&str>) -> Result<String> {
        self.facade.call(&GENERATE_KEY, vec![config.into()]).await
    }

    /// Opens a wallet, runs `body`, and closes the wallet however `body`
    /// ended.
    pub async fn with_open<F, Fut, T>(&self, config: &str, credentials: &str, body: F) -> Result<T>
    where
        F: FnOnce(WalletHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let wallet = self.open(config, credentials).await?;
        scope::scoped(self, wallet, body).await
    }
}

#[async_trait::async_trait]
impl Release<WalletHandle> for WalletFacade {
    async fn release(&self, handle: WalletHandle) -> Result<()> {
        self.close(handle).await
    }
}
