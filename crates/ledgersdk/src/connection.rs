//! Agent-to-agent connections.
//!
//! A connection moves `Initiated → Invited → Responded → Complete`. Both
//! sides start in `Initiated`; `connect` publishes or accepts the invitation,
//! and `update_state` follows the counterparty from there.

use std::sync::Arc;

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::ConnectionHandle;
use crate::lifecycle::ConnectionState;
use crate::lifecycle::Lifecycle;
use crate::lifecycle::StageTable;
use crate::operation::Operation;
use crate::operation::Param;
use crate::scope::Release;

const CONNECTION: Param = Param::Handle("connection_handle", HandleKind::Connection);

const CREATE: Operation = Operation::new("vcx_connection_create", &[Param::Text("source_id")]);
const CREATE_WITH_INVITE: Operation = Operation::new(
    "vcx_connection_create_with_invite",
    &[Param::Text("source_id"), Param::Json("invite_details")],
);
const CONNECT: Operation = Operation::new("vcx_connection_connect", &[CONNECTION, Param::OptText("connection_options")]);
const UPDATE_STATE: Operation = Operation::new("vcx_connection_update_state", &[CONNECTION]);
const INVITE_DETAILS: Operation = Operation::new("vcx_connection_invite_details", &[CONNECTION, Param::Flag("abbreviated")]);
const SEND_MESSAGE: Operation = Operation::new(
    "vcx_connection_send_message",
    &[CONNECTION, Param::Text("msg"), Param::Json("send_msg_options")],
);
const SERIALIZE: Operation = Operation::new("vcx_connection_serialize", &[CONNECTION]);
const DESERIALIZE: Operation = Operation::new("vcx_connection_deserialize", &[Param::Text("connection_data")]);
const DELETE: Operation = Operation::new("vcx_connection_delete_connection", &[CONNECTION]);
const RELEASE: Operation = Operation::new("vcx_connection_release", &[CONNECTION]);

#[derive(Clone, Debug)]
pub struct ConnectionFacade {
    facade: Facade,
    stages: Arc<StageTable<ConnectionState>>,
}

impl ConnectionFacade {
    pub fn new(facade: Facade) -> Self {
        let stages = facade.context().extension::<StageTable<ConnectionState>>();
        Self { facade, stages }
    }

    pub async fn create(&self, source_id: &str) -> Result<ConnectionHandle> {
        let handle = self
            .facade
            .acquire(&CREATE, vec![source_id.into()], HandleKind::Connection)
            .await?;
        self.stages.set(handle, ConnectionState::Initiated);
        ConnectionHandle::try_from_resource(handle)
    }

    /// Creates the invitee side from an invitation received out of band.
    pub async fn create_with_invite(&self, source_id: &str, invite_details: &str) -> Result<ConnectionHandle> {
        let handle = self
            .facade
            .acquire(
                &CREATE_WITH_INVITE,
                vec![source_id.into(), invite_details.into()],
                HandleKind::Connection,
            )
            .await?;
        self.stages.set(handle, ConnectionState::Initiated);
        ConnectionHandle::try_from_resource(handle)
    }

    /// Starts the exchange. Returns the invitation details.
    pub async fn connect(&self, connection: ConnectionHandle, options: Option<&str>) -> Result<String> {
        self.stages.require(connection.resource(), "connect", |s| *s == ConnectionState::Initiated)?;

        let details = self.facade.call(&CONNECT, vec![connection.into(), options.into()]).await?;
        self.stages.advance(connection.resource(), ConnectionState::Invited)?;
        Ok(details)
    }

    /// Polls the native layer for progress and moves the local stage to
    /// match.
    pub async fn update_state(&self, connection: ConnectionHandle) -> Result<ConnectionState> {
        self.stages.require(connection.resource(), "update_state", |s| {
            s.rank() >= ConnectionState::Invited.rank()
        })?;

        let code: i64 = self.facade.call(&UPDATE_STATE, vec![connection.into()]).await?;
        self.stages.advance_native(connection.resource(), code)
    }

    pub fn state(&self, connection: ConnectionHandle) -> Result<ConnectionState> {
        self.facade.handles().check_live(&connection.resource())?;
        self.stages.get(connection.resource())
    }

    pub async fn invite_details(&self, connection: ConnectionHandle, abbreviated: bool) -> Result<String> {
        self.stages.require(connection.resource(), "invite_details", |s| {
            s.rank() >= ConnectionState::Invited.rank()
        })?;
        self.facade
            .call(&INVITE_DETAILS, vec![connection.into(), abbreviated.into()])
            .await
    }

    /// Sends `msg` over a completed connection. Returns the message id.
    pub async fn send_message(&self, connection: ConnectionHandle, msg: &str, options: &str) -> Result<String> {
        self.stages.require(connection.resource(), "send_message", |s| *s == ConnectionState::Complete)?;
        self.facade
            .call(&SEND_MESSAGE, vec![connection.into(), msg.into(), options.into()])
            .await
    }

    pub async fn serialize(&self, connection: ConnectionHandle) -> Result<String> {
        let stage = self.stages.get(connection.resource())?;
        self.facade.serialize(&SERIALIZE, connection.resource(), Some(&stage)).await
    }

    /// Restores a connection, including its local stage.
    pub async fn deserialize(&self, data: &str) -> Result<ConnectionHandle> {
        let (handle, stage) = self
            .facade
            .deserialize::<ConnectionState>(&DESERIALIZE, HandleKind::Connection, data)
            .await?;
        self.stages.set(handle, stage.unwrap_or(ConnectionState::Initiated));
        ConnectionHandle::try_from_resource(handle)
    }

    /// Deletes the connection at the agency, then releases it.
    pub async fn delete(&self, connection: ConnectionHandle) -> Result<()> {
        let result = self
            .facade
            .release(&DELETE, connection.resource(), vec![connection.into()])
            .await;
        self.stages.forget_released(connection.resource(), self.facade.handles());
        result
    }

    pub fn release(&self, connection: ConnectionHandle) -> Result<()> {
        let result = self.facade.release_sync(&RELEASE, connection.resource());
        self.stages.forget_released(connection.resource(), self.facade.handles());
        result
    }
}

#[async_trait::async_trait]
impl Release<ConnectionHandle> for ConnectionFacade {
    async fn release(&self, handle: ConnectionHandle) -> Result<()> {
        ConnectionFacade::release(self, handle)
    }
}
