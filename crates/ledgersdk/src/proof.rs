//! Proof requests, verifier side.
//!
//! `Initialized → RequestSent → Generated → Sent → Verified`. The outcome of
//! verification is carried in the final stage. `Generated` happens on the
//! prover's side; the native layer only reports the proof once it arrives,
//! which moves straight to `Sent`.

use std::sync::Arc;

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::ConnectionHandle;
use crate::handles::ProofHandle;
use crate::lifecycle::ConnectionState;
use crate::lifecycle::Lifecycle;
use crate::lifecycle::ProofState;
use crate::lifecycle::StageTable;
use crate::operation::Operation;
use crate::operation::Param;
use crate::scope::Release;

const PROOF: Param = Param::Handle("proof_handle", HandleKind::Proof);
const CONNECTION: Param = Param::Handle("connection_handle", HandleKind::Connection);

const CREATE: Operation = Operation::new(
    "vcx_proof_create",
    &[
        Param::Text("source_id"),
        Param::Json("requested_attrs"),
        Param::Json("requested_predicates"),
        Param::Json("revocation_interval"),
        Param::Text("name"),
    ],
);
const SEND_REQUEST: Operation = Operation::new("vcx_proof_send_request", &[PROOF, CONNECTION]);
const UPDATE_STATE: Operation = Operation::new("vcx_proof_update_state", &[PROOF]);
const GET_PROOF: Operation = Operation::new("vcx_get_proof", &[PROOF, CONNECTION]);
const SERIALIZE: Operation = Operation::new("vcx_proof_serialize", &[PROOF]);
const DESERIALIZE: Operation = Operation::new("vcx_proof_deserialize", &[Param::Text("proof_data")]);
const RELEASE: Operation = Operation::new("vcx_proof_release", &[PROOF]);

/// The native code `vcx_get_proof` reports for a proof that verified.
const PROOF_VALIDATED: i64 = 1;

/// What was asked of the prover.
#[derive(Clone, Copy, Debug)]
pub struct ProofRequest<'a> {
    pub source_id: &'a str,
    pub requested_attrs: &'a str,
    pub requested_predicates: &'a str,
    pub revocation_interval: &'a str,
    pub name: &'a str,
}

/// A received proof and whether it verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofOutcome {
    pub valid: bool,
    pub proof: String,
}

#[derive(Clone, Debug)]
pub struct ProofFacade {
    facade: Facade,
    stages: Arc<StageTable<ProofState>>,
    connections: Arc<StageTable<ConnectionState>>,
}

impl ProofFacade {
    pub fn new(facade: Facade) -> Self {
        let stages = facade.context().extension::<StageTable<ProofState>>();
        let connections = facade.context().extension::<StageTable<ConnectionState>>();
        Self {
            facade,
            stages,
            connections,
        }
    }

    pub async fn create(&self, request: ProofRequest<'_>) -> Result<ProofHandle> {
        let args = vec![
            request.source_id.into(),
            request.requested_attrs.into(),
            request.requested_predicates.into(),
            request.revocation_interval.into(),
            request.name.into(),
        ];
        let handle = self.facade.acquire(&CREATE, args, HandleKind::Proof).await?;
        self.stages.set(handle, ProofState::Initialized);
        ProofHandle::try_from_resource(handle)
    }

    pub async fn send_request(&self, proof: ProofHandle, connection: ConnectionHandle) -> Result<()> {
        self.stages.require(proof.resource(), "send_request", |s| *s == ProofState::Initialized)?;
        self.connections
            .require(connection.resource(), "send_request", |s| *s == ConnectionState::Complete)?;

        self.facade
            .call::<()>(&SEND_REQUEST, vec![proof.into(), connection.into()])
            .await?;
        self.stages.advance(proof.resource(), ProofState::RequestSent)?;
        Ok(())
    }

    pub async fn update_state(&self, proof: ProofHandle) -> Result<ProofState> {
        self.stages.require(proof.resource(), "update_state", |s| {
            s.rank() >= ProofState::RequestSent.rank()
        })?;

        let code: i64 = self.facade.call(&UPDATE_STATE, vec![proof.into()]).await?;
        self.stages.advance_native(proof.resource(), code)
    }

    pub fn state(&self, proof: ProofHandle) -> Result<ProofState> {
        self.facade.handles().check_live(&proof.resource())?;
        self.stages.get(proof.resource())
    }

    /// Fetches the proof the prover sent and records whether it verified.
    /// Can be repeated once verified.
    pub async fn get_proof(&self, proof: ProofHandle, connection: ConnectionHandle) -> Result<ProofOutcome> {
        self.stages.require(proof.resource(), "get_proof", |s| {
            matches!(s, ProofState::Sent | ProofState::Verified { .. })
        })?;

        let (code, body) = self
            .facade
            .call::<(i64, String)>(&GET_PROOF, vec![proof.into(), connection.into()])
            .await?;
        let valid = code == PROOF_VALIDATED;
        self.stages.advance(proof.resource(), ProofState::Verified { valid })?;

        Ok(ProofOutcome { valid, proof: body })
    }

    pub async fn serialize(&self, proof: ProofHandle) -> Result<String> {
        let stage = self.stages.get(proof.resource())?;
        self.facade.serialize(&SERIALIZE, proof.resource(), Some(&stage)).await
    }

    pub async fn deserialize(&self, data: &str) -> Result<ProofHandle> {
        let (handle, stage) = self
            .facade
            .deserialize::<ProofState>(&DESERIALIZE, HandleKind::Proof, data)
            .await?;
        self.stages.set(handle, stage.unwrap_or(ProofState::Initialized));
        ProofHandle::try_from_resource(handle)
    }

    pub fn release(&self, proof: ProofHandle) -> Result<()> {
        let result = self.facade.release_sync(&RELEASE, proof.resource());
        self.stages.forget_released(proof.resource(), self.facade.handles());
        result
    }
}

#[async_trait::async_trait]
impl Release<ProofHandle> for ProofFacade {
    async fn release(&self, handle: ProofHandle) -> Result<()> {
        ProofFacade::release(self, handle)
    }
}
