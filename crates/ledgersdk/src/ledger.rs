//! Ledger request building, signing and submission.
//!
//! Requests and responses are opaque JSON; building and parsing happen in the
//! native layer.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::PoolHandle;
use crate::handles::WalletHandle;
use crate::operation::Operation;
use crate::operation::Param;

const POOL: Param = Param::Handle("pool_handle", HandleKind::Pool);
const WALLET: Param = Param::Handle("wallet_handle", HandleKind::Wallet);
const SUBMITTER: Param = Param::Text("submitter_did");
const OPT_SUBMITTER: Param = Param::OptText("submitter_did");
const REQUEST: Param = Param::Json("request_json");

const SIGN_REQUEST: Operation = Operation::new("indy_sign_request", &[WALLET, SUBMITTER, REQUEST]);
const MULTI_SIGN_REQUEST: Operation = Operation::new("indy_multi_sign_request", &[WALLET, SUBMITTER, REQUEST]);
const SIGN_AND_SUBMIT_REQUEST: Operation = Operation::new("indy_sign_and_submit_request", &[POOL, WALLET, SUBMITTER, REQUEST]);
const SUBMIT_REQUEST: Operation = Operation::new("indy_submit_request", &[POOL, REQUEST]);
const BUILD_NYM_REQUEST: Operation = Operation::new(
    "indy_build_nym_request",
    &[
        SUBMITTER,
        Param::Text("target_did"),
        Param::OptText("verkey"),
        Param::OptText("alias"),
        Param::OptText("role"),
    ],
);
const BUILD_GET_NYM_REQUEST: Operation = Operation::new("indy_build_get_nym_request", &[OPT_SUBMITTER, Param::Text("target_did")]);
const BUILD_SCHEMA_REQUEST: Operation = Operation::new("indy_build_schema_request", &[SUBMITTER, Param::Json("data")]);
const BUILD_GET_SCHEMA_REQUEST: Operation = Operation::new("indy_build_get_schema_request", &[OPT_SUBMITTER, Param::Text("id")]);
const PARSE_GET_SCHEMA_RESPONSE: Operation = Operation::new("indy_parse_get_schema_response", &[Param::Json("get_schema_response")]);
const BUILD_CRED_DEF_REQUEST: Operation = Operation::new("indy_build_cred_def_request", &[SUBMITTER, Param::Json("data")]);
const BUILD_GET_CRED_DEF_REQUEST: Operation = Operation::new("indy_build_get_cred_def_request", &[OPT_SUBMITTER, Param::Text("id")]);
const PARSE_GET_CRED_DEF_RESPONSE: Operation = Operation::new(
    "indy_parse_get_cred_def_response",
    &[Param::Json("get_cred_def_response")],
);

#[derive(Clone, Debug)]
pub struct LedgerFacade {
    facade: Facade,
}

impl LedgerFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    pub async fn sign_request(&self, wallet: WalletHandle, submitter_did: &str, request: &str) -> Result<String> {
        self.facade
            .call(&SIGN_REQUEST, vec![wallet.into(), submitter_did.into(), request.into()])
            .await
    }

    /// Adds a signature to a request that may already carry others.
    pub async fn multi_sign_request(&self, wallet: WalletHandle, submitter_did: &str, request: &str) -> Result<String> {
        self.facade
            .call(&MULTI_SIGN_REQUEST, vec![wallet.into(), submitter_did.into(), request.into()])
            .await
    }

    pub async fn sign_and_submit_request(
        &self,
        pool: PoolHandle,
        wallet: WalletHandle,
        submitter_did: &str,
        request: &str,
    ) -> Result<String> {
        self.facade
            .call(
                &SIGN_AND_SUBMIT_REQUEST,
                vec![pool.into(), wallet.into(), submitter_did.into(), request.into()],
            )
            .await
    }

    pub async fn submit_request(&self, pool: PoolHandle, request: &str) -> Result<String> {
        self.facade.call(&SUBMIT_REQUEST, vec![pool.into(), request.into()]).await
    }

    pub async fn build_nym_request(
        &self,
        submitter_did: &str,
        target_did: &str,
        verkey: Option<&str>,
        alias: Option<&str>,
        role: Option<&str>,
    ) -> Result<String> {
        self.facade
            .call(
                &BUILD_NYM_REQUEST,
                vec![submitter_did.into(), target_did.into(), verkey.into(), alias.into(), role.into()],
            )
            .await
    }

    pub async fn build_get_nym_request(&self, submitter_did: Option<&str>, target_did: &str) -> Result<String> {
        self.facade
            .call(&BUILD_GET_NYM_REQUEST, vec![submitter_did.into(), target_did.into()])
            .await
    }

    pub async fn build_schema_request(&self, submitter_did: &str, data: &str) -> Result<String> {
        self.facade
            .call(&BUILD_SCHEMA_REQUEST, vec![submitter_did.into(), data.into()])
            .await
    }

    pub async fn build_get_schema_request(&self, submitter_did: Option<&str>, id: &str) -> Result<String> {
        self.facade
            .call(&BUILD_GET_SCHEMA_REQUEST, vec![submitter_did.into(), id.into()])
            .await
    }

    /// Returns `(schema_id, schema_json)`.
    pub async fn parse_get_schema_response(&self, response: &str) -> Result<(String, String)> {
        self.facade.call(&PARSE_GET_SCHEMA_RESPONSE, vec![response.into()]).await
    }

    pub async fn build_cred_def_request(&self, submitter_did: &str, data: &str) -> Result<String> {
        self.facade
            .call(&BUILD_CRED_DEF_REQUEST, vec![submitter_did.into(), data.into()])
            .await
    }

    pub async fn build_get_cred_def_request(&self, submitter_did: Option<&str>, id: &str) -> Result<String> {
        self.facade
            .call(&BUILD_GET_CRED_DEF_REQUEST, vec![submitter_did.into(), id.into()])
            .await
    }

    /// Returns `(cred_def_id, cred_def_json)`.
    pub async fn parse_get_cred_def_response(&self, response: &str) -> Result<(String, String)> {
        self.facade.call(&PARSE_GET_CRED_DEF_RESPONSE, vec![response.into()]).await
    }
}
