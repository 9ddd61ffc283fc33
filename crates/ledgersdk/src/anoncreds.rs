//! Anonymous credentials: issuer, prover and verifier primitives.
//!
//! All cryptography happens in the native layer. These calls only carry
//! JSON documents across and type the results.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::WalletHandle;
use crate::operation::Operation;
use crate::operation::Param;

const WALLET: Param = Param::Handle("wallet_handle", HandleKind::Wallet);

const ISSUER_CREATE_SCHEMA: Operation = Operation::new(
    "indy_issuer_create_schema",
    &[
        Param::Text("issuer_did"),
        Param::Text("name"),
        Param::Text("version"),
        Param::Json("attrs"),
    ],
);
const ISSUER_CREATE_AND_STORE_CREDENTIAL_DEF: Operation = Operation::new(
    "indy_issuer_create_and_store_credential_def",
    &[
        WALLET,
        Param::Text("issuer_did"),
        Param::Json("schema_json"),
        Param::Text("tag"),
        Param::OptText("signature_type"),
        Param::Json("config_json"),
    ],
);
const ISSUER_CREATE_CREDENTIAL_OFFER: Operation = Operation::new(
    "indy_issuer_create_credential_offer",
    &[WALLET, Param::Text("cred_def_id")],
);
const ISSUER_CREATE_CREDENTIAL: Operation = Operation::new(
    "indy_issuer_create_credential",
    &[
        WALLET,
        Param::Json("cred_offer_json"),
        Param::Json("cred_req_json"),
        Param::Json("cred_values_json"),
        Param::OptText("rev_reg_id"),
        Param::Int("blob_storage_reader_handle"),
    ],
);
const PROVER_CREATE_MASTER_SECRET: Operation = Operation::new(
    "indy_prover_create_master_secret",
    &[WALLET, Param::OptText("master_secret_id")],
);
const PROVER_CREATE_CREDENTIAL_REQ: Operation = Operation::new(
    "indy_prover_create_credential_req",
    &[
        WALLET,
        Param::Text("prover_did"),
        Param::Json("cred_offer_json"),
        Param::Json("cred_def_json"),
        Param::Text("master_secret_id"),
    ],
);
const PROVER_STORE_CREDENTIAL: Operation = Operation::new(
    "indy_prover_store_credential",
    &[
        WALLET,
        Param::OptText("cred_id"),
        Param::Json("cred_req_metadata_json"),
        Param::Json("cred_json"),
        Param::Json("cred_def_json"),
        Param::OptText("rev_reg_def_json"),
    ],
);
const PROVER_GET_CREDENTIALS_FOR_PROOF_REQ: Operation = Operation::new(
    "indy_prover_get_credentials_for_proof_req",
    &[WALLET, Param::Json("proof_request_json")],
);
const PROVER_CREATE_PROOF: Operation = Operation::new(
    "indy_prover_create_proof",
    &[
        WALLET,
        Param::Json("proof_req_json"),
        Param::Json("requested_credentials_json"),
        Param::Text("master_secret_id"),
        Param::Json("schemas_json"),
        Param::Json("credential_defs_json"),
        Param::Json("rev_states_json"),
    ],
);
const VERIFIER_VERIFY_PROOF: Operation = Operation::new(
    "indy_verifier_verify_proof",
    &[
        Param::Json("proof_request_json"),
        Param::Json("proof_json"),
        Param::Json("schemas_json"),
        Param::Json("credential_defs_json"),
        Param::Json("rev_reg_defs_json"),
        Param::Json("rev_regs_json"),
    ],
);

/// A freshly issued credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedCredential {
    pub credential: String,
    pub revocation_id: Option<String>,
    pub revocation_registry_delta: Option<String>,
}

/// The inputs `prover_create_proof` needs besides the wallet.
#[derive(Clone, Copy, Debug)]
pub struct ProofInputs<'a> {
    pub proof_request: &'a str,
    pub requested_credentials: &'a str,
    pub master_secret_id: &'a str,
    pub schemas: &'a str,
    pub credential_defs: &'a str,
    pub revocation_states: &'a str,
}

/// The inputs `verifier_verify_proof` checks a proof against.
#[derive(Clone, Copy, Debug)]
pub struct VerificationInputs<'a> {
    pub proof_request: &'a str,
    pub proof: &'a str,
    pub schemas: &'a str,
    pub credential_defs: &'a str,
    pub revocation_registry_defs: &'a str,
    pub revocation_registries: &'a str,
}

#[derive(Clone, Debug)]
pub struct AnoncredsFacade {
    facade: Facade,
}

impl AnoncredsFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    /// Returns `(schema_id, schema_json)`.
    pub async fn issuer_create_schema(&self, issuer_did: &str, name: &str, version: &str, attrs: &str) -> Result<(String, String)> {
        self.facade
            .call(
                &ISSUER_CREATE_SCHEMA,
                vec![issuer_did.into(), name.into(), version.into(), attrs.into()],
            )
            .await
    }

    /// Returns `(cred_def_id, cred_def_json)`.
    pub async fn issuer_create_and_store_credential_def(
        &self,
        wallet: WalletHandle,
        issuer_did: &str,
        schema: &str,
        tag: &str,
        signature_type: Option<&str>,
        config: &str,
    ) -> Result<(String, String)> {
        self.facade
            .call(
                &ISSUER_CREATE_AND_STORE_CREDENTIAL_DEF,
                vec![
                    wallet.into(),
                    issuer_did.into(),
                    schema.into(),
                    tag.into(),
                    signature_type.into(),
                    config.into(),
                ],
            )
            .await
    }

    pub async fn issuer_create_credential_offer(&self, wallet: WalletHandle, cred_def_id: &str) -> Result<String> {
        self.facade
            .call(&ISSUER_CREATE_CREDENTIAL_OFFER, vec![wallet.into(), cred_def_id.into()])
            .await
    }

    /// `blob_storage_reader` is only consulted when `rev_reg_id` is set.
    pub async fn issuer_create_credential(
        &self,
        wallet: WalletHandle,
        offer: &str,
        request: &str,
        values: &str,
        rev_reg_id: Option<&str>,
        blob_storage_reader: i64,
    ) -> Result<IssuedCredential> {
        let (credential, revocation_id, revocation_registry_delta) = self
            .facade
            .call::<(String, Option<String>, Option<String>)>(
                &ISSUER_CREATE_CREDENTIAL,
                vec![
                    wallet.into(),
                    offer.into(),
                    request.into(),
                    values.into(),
                    rev_reg_id.into(),
                    blob_storage_reader.into(),
                ],
            )
            .await?;

        Ok(IssuedCredential {
            credential,
            revocation_id,
            revocation_registry_delta,
        })
    }

    /// Returns the id of the stored master secret.
    pub async fn prover_create_master_secret(&self, wallet: WalletHandle, id: Option<&str>) -> Result<String> {
        self.facade
            .call(&PROVER_CREATE_MASTER_SECRET, vec![wallet.into(), id.into()])
            .await
    }

    /// Returns `(cred_req_json, cred_req_metadata_json)`.
    pub async fn prover_create_credential_req(
        &self,
        wallet: WalletHandle,
        prover_did: &str,
        offer: &str,
        cred_def: &str,
        master_secret_id: &str,
    ) -> Result<(String, String)> {
        self.facade
            .call(
                &PROVER_CREATE_CREDENTIAL_REQ,
                vec![
                    wallet.into(),
                    prover_did.into(),
                    offer.into(),
                    cred_def.into(),
                    master_secret_id.into(),
                ],
            )
            .await
    }

    /// Returns the id the credential was stored under.
    pub async fn prover_store_credential(
        &self,
        wallet: WalletHandle,
        cred_id: Option<&str>,
        request_metadata: &str,
        credential: &str,
        cred_def: &str,
        rev_reg_def: Option<&str>,
    ) -> Result<String> {
        self.facade
            .call(
                &PROVER_STORE_CREDENTIAL,
                vec![
                    wallet.into(),
                    cred_id.into(),
                    request_metadata.into(),
                    credential.into(),
                    cred_def.into(),
                    rev_reg_def.into(),
                ],
            )
            .await
    }

    pub async fn prover_get_credentials_for_proof_req(&self, wallet: WalletHandle, proof_request: &str) -> Result<String> {
        self.facade
            .call(&PROVER_GET_CREDENTIALS_FOR_PROOF_REQ, vec![wallet.into(), proof_request.into()])
            .await
    }

    pub async fn prover_create_proof(&self, wallet: WalletHandle, inputs: ProofInputs<'_>) -> Result<String> {
        self.facade
            .call(
                &PROVER_CREATE_PROOF,
                vec![
                    wallet.into(),
                    inputs.proof_request.into(),
                    inputs.requested_credentials.into(),
                    inputs.master_secret_id.into(),
                    inputs.schemas.into(),
                    inputs.credential_defs.into(),
                    inputs.revocation_states.into(),
                ],
            )
            .await
    }

    pub async fn verifier_verify_proof(&self, inputs: VerificationInputs<'_>) -> Result<bool> {
        self.facade
            .call(
                &VERIFIER_VERIFY_PROOF,
                vec![
                    inputs.proof_request.into(),
                    inputs.proof.into(),
                    inputs.schemas.into(),
                    inputs.credential_defs.into(),
                    inputs.revocation_registry_defs.into(),
                    inputs.revocation_registries.into(),
                ],
            )
            .await
    }
}
