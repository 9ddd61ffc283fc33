//! DIDs and their keys.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::PoolHandle;
use crate::handles::WalletHandle;
use crate::operation::Operation;
use crate::operation::Param;

const WALLET: Param = Param::Handle("wallet_handle", HandleKind::Wallet);
const DID: Param = Param::Text("did");

const CREATE_AND_STORE: Operation = Operation::new("indy_create_and_store_my_did", &[WALLET, Param::Json("did_json")]);
const REPLACE_KEYS_START: Operation = Operation::new("indy_replace_keys_start", &[WALLET, DID, Param::Json("key_json")]);
const REPLACE_KEYS_APPLY: Operation = Operation::new("indy_replace_keys_apply", &[WALLET, DID]);
const STORE_THEIR: Operation = Operation::new("indy_store_their_did", &[WALLET, Param::Json("identity_json")]);
const KEY_FOR_DID: Operation = Operation::new(
    "indy_key_for_did",
    &[Param::Handle("pool_handle", HandleKind::Pool), WALLET, DID],
);
const KEY_FOR_LOCAL_DID: Operation = Operation::new("indy_key_for_local_did", &[WALLET, DID]);
const SET_METADATA: Operation = Operation::new("indy_set_did_metadata", &[WALLET, DID, Param::Text("metadata")]);
const GET_METADATA: Operation = Operation::new("indy_get_did_metadata", &[WALLET, DID]);
const GET_WITH_META: Operation = Operation::new("indy_get_my_did_with_meta", &[WALLET, DID]);
const LIST_WITH_META: Operation = Operation::new("indy_list_my_dids_with_meta", &[WALLET]);
const ABBREVIATE_VERKEY: Operation = Operation::new("indy_abbreviate_verkey", &[DID, Param::Text("full_verkey")]);

#[derive(Clone, Debug)]
pub struct DidFacade {
    facade: Facade,
}

impl DidFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    /// Creates a DID in the wallet. Returns `(did, verkey)`.
    pub async fn create_and_store(&self, wallet: WalletHandle, did_info: &str) -> Result<(String, String)> {
        self.facade.call(&CREATE_AND_STORE, vec![wallet.into(), did_info.into()]).await
    }

    /// Generates a new key for `did` without applying it. Returns the
    /// new verkey.
    pub async fn replace_keys_start(&self, wallet: WalletHandle, did: &str, key_info: &str) -> Result<String> {
        self.facade
            .call(&REPLACE_KEYS_START, vec![wallet.into(), did.into(), key_info.into()])
            .await
    }

    pub async fn replace_keys_apply(&self, wallet: WalletHandle, did: &str) -> Result<()> {
        self.facade.call(&REPLACE_KEYS_APPLY, vec![wallet.into(), did.into()]).await
    }

    pub async fn store_their(&self, wallet: WalletHandle, identity: &str) -> Result<()> {
        self.facade.call(&STORE_THEIR, vec![wallet.into(), identity.into()]).await
    }

    /// The verkey for `did`, resolved through the ledger when the wallet
    /// does not know it.
    pub async fn key_for_did(&self, pool: PoolHandle, wallet: WalletHandle, did: &str) -> Result<String> {
        self.facade
            .call(&KEY_FOR_DID, vec![pool.into(), wallet.into(), did.into()])
            .await
    }

    pub async fn key_for_local_did(&self, wallet: WalletHandle, did: &str) -> Result<String> {
        self.facade.call(&KEY_FOR_LOCAL_DID, vec![wallet.into(), did.into()]).await
    }

    pub async fn set_metadata(&self, wallet: WalletHandle, did: &str, metadata: &str) -> Result<()> {
        self.facade
            .call(&SET_METADATA, vec![wallet.into(), did.into(), metadata.into()])
            .await
    }

    pub async fn get_metadata(&self, wallet: WalletHandle, did: &str) -> Result<String> {
        self.facade.call(&GET_METADATA, vec![wallet.into(), did.into()]).await
    }

    pub async fn get_with_meta(&self, wallet: WalletHandle, did: &str) -> Result<String> {
        self.facade.call(&GET_WITH_META, vec![wallet.into(), did.into()]).await
    }

    pub async fn list_with_meta(&self, wallet: WalletHandle) -> Result<String> {
        self.facade.call(&LIST_WITH_META, vec![wallet.into()]).await
    }

    pub async fn abbreviate_verkey(&self, did: &str, full_verkey: &str) -> Result<String> {
        self.facade.call(&ABBREVIATE_VERKEY, vec![did.into(), full_verkey.into()]).await
    }
}
