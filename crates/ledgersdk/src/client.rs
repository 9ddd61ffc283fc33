//! The entry point: one context, one native library, all the facades.

use std::sync::Arc;

use ledgercore::ClientContext;
use ledgercore::Result;

use crate::anoncreds::AnoncredsFacade;
use crate::cache::CacheFacade;
use crate::connection::ConnectionFacade;
use crate::credential::CredentialFacade;
use crate::credential_def::CredentialDefFacade;
use crate::crypto::CryptoFacade;
use crate::did::DidFacade;
use crate::facade::Facade;
use crate::ledger::LedgerFacade;
use crate::native::Native;
use crate::operation::Operation;
use crate::operation::Param;
use crate::pairwise::PairwiseFacade;
use crate::pool::PoolFacade;
use crate::proof::ProofFacade;
use crate::record::WalletRecordFacade;
use crate::schema::SchemaFacade;
use crate::wallet::WalletFacade;

const SET_RUNTIME_CONFIG: Operation = Operation::new("indy_set_runtime_config", &[Param::Json("config")]);

/// A client bound to one `ClientContext`.
///
/// Cheap to clone. Every facade handed out shares the context's pending
/// table, handle registry and lifecycle stages.
#[derive(Clone, Debug)]
pub struct Client {
    facade: Facade,
}

impl Client {
    /// A client over a fresh context with the default configuration.
    pub fn new(native: Arc<dyn Native>) -> Self {
        Self::with_context(Arc::new(ClientContext::new()), native)
    }

    pub fn with_context(ctx: Arc<ClientContext>, native: Arc<dyn Native>) -> Self {
        Self {
            facade: Facade::new(ctx, native),
        }
    }

    pub fn context(&self) -> &Arc<ClientContext> {
        self.facade.context()
    }

    /// Passes the context's runtime settings (thread pool size, backtrace
    /// collection) to the native layer.
    pub fn apply_runtime_config(&self) -> Result<()> {
        let config = self.context().config().runtime_config_json();
        tracing::info!(%config, "applying native runtime config");
        self.facade.call_sync(&SET_RUNTIME_CONFIG, vec![config.into()])
    }

    /// Fails every command still in flight. See `ClientContext::shutdown`.
    pub fn shutdown(&self) -> usize {
        self.context().shutdown()
    }

    pub fn pool(&self) -> PoolFacade {
        PoolFacade::new(self.facade.clone())
    }

    pub fn wallet(&self) -> WalletFacade {
        WalletFacade::new(self.facade.clone())
    }

    pub fn records(&self) -> WalletRecordFacade {
        WalletRecordFacade::new(self.facade.clone())
    }

    pub fn did(&self) -> DidFacade {
        DidFacade::new(self.facade.clone())
    }

    pub fn crypto(&self) -> CryptoFacade {
        CryptoFacade::new(self.facade.clone())
    }

    pub fn ledger(&self) -> LedgerFacade {
        LedgerFacade::new(self.facade.clone())
    }

    pub fn anoncreds(&self) -> AnoncredsFacade {
        AnoncredsFacade::new(self.facade.clone())
    }

    pub fn cache(&self) -> CacheFacade {
        CacheFacade::new(self.facade.clone())
    }

    pub fn pairwise(&self) -> PairwiseFacade {
        PairwiseFacade::new(self.facade.clone())
    }

    pub fn connection(&self) -> ConnectionFacade {
        ConnectionFacade::new(self.facade.clone())
    }

    pub fn credential(&self) -> CredentialFacade {
        CredentialFacade::new(self.facade.clone())
    }

    pub fn proof(&self) -> ProofFacade {
        ProofFacade::new(self.facade.clone())
    }

    pub fn schema(&self) -> SchemaFacade {
        SchemaFacade::new(self.facade.clone())
    }

    pub fn credential_def(&self) -> CredentialDefFacade {
        CredentialDefFacade::new(self.facade.clone())
    }
}
