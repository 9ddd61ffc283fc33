//! Pairwise relationships between a local DID and a remote one.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::WalletHandle;
use crate::operation::Operation;
use crate::operation::Param;

const WALLET: Param = Param::Handle("wallet_handle", HandleKind::Wallet);
const THEIR_DID: Param = Param::Text("their_did");

const EXISTS: Operation = Operation::new("indy_is_pairwise_exists", &[WALLET, THEIR_DID]);
const CREATE: Operation = Operation::new(
    "indy_create_pairwise",
    &[WALLET, THEIR_DID, Param::Text("my_did"), Param::OptText("metadata")],
);
const LIST: Operation = Operation::new("indy_list_pairwise", &[WALLET]);
const GET: Operation = Operation::new("indy_get_pairwise", &[WALLET, THEIR_DID]);
const SET_METADATA: Operation = Operation::new("indy_set_pairwise_metadata", &[WALLET, THEIR_DID, Param::OptText("metadata")]);

#[derive(Clone, Debug)]
pub struct PairwiseFacade {
    facade: Facade,
}

impl PairwiseFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    pub async fn exists(&self, wallet: WalletHandle, their_did: &str) -> Result<bool> {
        self.facade.call(&EXISTS, vec![wallet.into(), their_did.into()]).await
    }

    pub async fn create(&self, wallet: WalletHandle, their_did: &str, my_did: &str, metadata: Option<&str>) -> Result<()> {
        self.facade
            .call(&CREATE, vec![wallet.into(), their_did.into(), my_did.into(), metadata.into()])
            .await
    }

    pub async fn list(&self, wallet: WalletHandle) -> Result<String> {
        self.facade.call(&LIST, vec![wallet.into()]).await
    }

    pub async fn get(&self, wallet: WalletHandle, their_did: &str) -> Result<String> {
        self.facade.call(&GET, vec![wallet.into(), their_did.into()]).await
    }

    /// Replaces the metadata. `None` clears it.
    pub async fn set_metadata(&self, wallet: WalletHandle, their_did: &str, metadata: Option<&str>) -> Result<()> {
        self.facade
            .call(&SET_METADATA, vec![wallet.into(), their_did.into(), metadata.into()])
            .await
    }
}
