//! Credential issuance, issuer side.
//!
//! `Initialized → OfferSent → RequestReceived → Issued → Accepted`, then
//! `Revoked` if the issuer revokes it, or `Terminated` from any stage before
//! acceptance. Offers and credentials can only
//! be sent over a completed connection.

use std::sync::Arc;

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::ConnectionHandle;
use crate::handles::CredentialDefHandle;
use crate::handles::CredentialHandle;
use crate::lifecycle::ConnectionState;
use crate::lifecycle::IssuanceState;
use crate::lifecycle::Lifecycle;
use crate::lifecycle::StageTable;
use crate::lifecycle::TerminationReason;
use crate::operation::Operation;
use crate::operation::Param;
use crate::scope::Release;

const CREDENTIAL: Param = Param::Handle("credential_handle", HandleKind::Credential);
const CONNECTION: Param = Param::Handle("connection_handle", HandleKind::Connection);

const CREATE: Operation = Operation::new(
    "vcx_issuer_create_credential",
    &[
        Param::Text("source_id"),
        Param::Handle("cred_def_handle", HandleKind::CredentialDef),
        Param::Text("issuer_did"),
        Param::Json("credential_data"),
        Param::Text("credential_name"),
        Param::Text("price"),
    ],
);
const SEND_OFFER: Operation = Operation::new("vcx_issuer_send_credential_offer", &[CREDENTIAL, CONNECTION]);
const UPDATE_STATE: Operation = Operation::new("vcx_issuer_credential_update_state", &[CREDENTIAL]);
const SEND_CREDENTIAL: Operation = Operation::new("vcx_issuer_send_credential", &[CREDENTIAL, CONNECTION]);
const TERMINATE: Operation = Operation::new("vcx_issuer_terminate_credential", &[CREDENTIAL, Param::Text("reason")]);
const REVOKE: Operation = Operation::new("vcx_issuer_revoke_credential", &[CREDENTIAL]);
const SERIALIZE: Operation = Operation::new("vcx_issuer_credential_serialize", &[CREDENTIAL]);
const DESERIALIZE: Operation = Operation::new("vcx_issuer_credential_deserialize", &[Param::Text("credential_data")]);
const RELEASE: Operation = Operation::new("vcx_issuer_credential_release", &[CREDENTIAL]);

/// The credential being offered.
#[derive(Clone, Copy, Debug)]
pub struct CredentialOffer<'a> {
    pub source_id: &'a str,
    pub cred_def: CredentialDefHandle,
    pub issuer_did: &'a str,
    pub attributes: &'a str,
    pub name: &'a str,
    pub price: &'a str,
}

#[derive(Clone, Debug)]
pub struct CredentialFacade {
    facade: Facade,
    stages: Arc<StageTable<IssuanceState>>,
    connections: Arc<StageTable<ConnectionState>>,
}

impl CredentialFacade {
    pub fn new(facade: Facade) -> Self {
        let stages = facade.context().extension::<StageTable<IssuanceState>>();
        let connections = facade.context().extension::<StageTable<ConnectionState>>();
        Self {
            facade,
            stages,
            connections,
        }
    }

    pub async fn create(&self, offer: CredentialOffer<'_>) -> Result<CredentialHandle> {
        let args = vec![
            offer.source_id.into(),
            offer.cred_def.into(),
            offer.issuer_did.into(),
            offer.attributes.into(),
            offer.name.into(),
            offer.price.into(),
        ];
        let handle = self.facade.acquire(&CREATE, args, HandleKind::Credential).await?;
        self.stages.set(handle, IssuanceState::Initialized);
        CredentialHandle::try_from_resource(handle)
    }

    pub async fn send_offer(&self, credential: CredentialHandle, connection: ConnectionHandle) -> Result<()> {
        self.stages.require(credential.resource(), "send_offer", |s| *s == IssuanceState::Initialized)?;
        self.require_connected(connection, "send_offer")?;

        self.facade
            .call::<()>(&SEND_OFFER, vec![credential.into(), connection.into()])
            .await?;
        self.stages.advance(credential.resource(), IssuanceState::OfferSent)?;
        Ok(())
    }

    pub async fn update_state(&self, credential: CredentialHandle) -> Result<IssuanceState> {
        self.stages.require(credential.resource(), "update_state", |s| {
            s.rank() >= IssuanceState::OfferSent.rank()
        })?;

        let code: i64 = self.facade.call(&UPDATE_STATE, vec![credential.into()]).await?;
        self.stages.advance_native(credential.resource(), code)
    }

    pub fn state(&self, credential: CredentialHandle) -> Result<IssuanceState> {
        self.facade.handles().check_live(&credential.resource())?;
        self.stages.get(credential.resource())
    }

    pub async fn send_credential(&self, credential: CredentialHandle, connection: ConnectionHandle) -> Result<()> {
        self.stages.require(credential.resource(), "send_credential", |s| {
            *s == IssuanceState::RequestReceived
        })?;
        self.require_connected(connection, "send_credential")?;

        self.facade
            .call::<()>(&SEND_CREDENTIAL, vec![credential.into(), connection.into()])
            .await?;
        self.stages.advance(credential.resource(), IssuanceState::Issued)?;
        Ok(())
    }

    /// Ends the issuance early.
    pub async fn terminate(&self, credential: CredentialHandle, reason: TerminationReason) -> Result<()> {
        self.stages.require(credential.resource(), "terminate", |s| !s.is_terminal())?;

        self.facade
            .call::<()>(&TERMINATE, vec![credential.into(), reason.to_string().into()])
            .await?;
        self.stages.advance(credential.resource(), IssuanceState::Terminated { reason })?;
        Ok(())
    }

    /// Revokes an issued credential.
    pub async fn revoke(&self, credential: CredentialHandle) -> Result<()> {
        self.stages.require(credential.resource(), "revoke", |s| {
            matches!(s, IssuanceState::Issued | IssuanceState::Accepted)
        })?;
        self.facade.call::<()>(&REVOKE, vec![credential.into()]).await?;
        self.stages.advance(credential.resource(), IssuanceState::Revoked)?;
        Ok(())
    }

    pub async fn serialize(&self, credential: CredentialHandle) -> Result<String> {
        let stage = self.stages.get(credential.resource())?;
        self.facade.serialize(&SERIALIZE, credential.resource(), Some(&stage)).await
    }

    pub async fn deserialize(&self, data: &str) -> Result<CredentialHandle> {
        let (handle, stage) = self
            .facade
            .deserialize::<IssuanceState>(&DESERIALIZE, HandleKind::Credential, data)
            .await?;
        self.stages.set(handle, stage.unwrap_or(IssuanceState::Initialized));
        CredentialHandle::try_from_resource(handle)
    }

    pub fn release(&self, credential: CredentialHandle) -> Result<()> {
        let result = self.facade.release_sync(&RELEASE, credential.resource());
        self.stages.forget_released(credential.resource(), self.facade.handles());
        result
    }

    fn require_connected(&self, connection: ConnectionHandle, operation: &str) -> Result<()> {
        self.connections
            .require(connection.resource(), operation, |s| *s == ConnectionState::Complete)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Release<CredentialHandle> for CredentialFacade {
    async fn release(&self, handle: CredentialHandle) -> Result<()> {
        CredentialFacade::release(self, handle)
    }
}
