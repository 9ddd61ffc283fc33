//! Credential definitions.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::CredentialDefHandle;
use crate::operation::Operation;
use crate::operation::Param;
use crate::scope::Release;

const CRED_DEF: Param = Param::Handle("cred_def_handle", HandleKind::CredentialDef);

const CREATE: Operation = Operation::new(
    "vcx_credentialdef_create",
    &[
        Param::Text("source_id"),
        Param::Text("credentialdef_name"),
        Param::Text("schema_id"),
        Param::Text("issuer_did"),
        Param::Text("tag"),
        Param::Json("config"),
        Param::Int("payment_handle"),
    ],
);
const CRED_DEF_ID: Operation = Operation::new("vcx_credentialdef_get_cred_def_id", &[CRED_DEF]);
const SERIALIZE: Operation = Operation::new("vcx_credentialdef_serialize", &[CRED_DEF]);
const DESERIALIZE: Operation = Operation::new("vcx_credentialdef_deserialize", &[Param::Text("credentialdef_data")]);
const RELEASE: Operation = Operation::new("vcx_credentialdef_release", &[CRED_DEF]);

/// A credential definition to publish.
#[derive(Clone, Copy, Debug)]
pub struct CredentialDefSpec<'a> {
    pub source_id: &'a str,
    pub name: &'a str,
    pub schema_id: &'a str,
    pub issuer_did: &'a str,
    pub tag: &'a str,
    pub config: &'a str,
}

#[derive(Clone, Debug)]
pub struct CredentialDefFacade {
    facade: Facade,
}

impl CredentialDefFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    pub async fn create(&self, def: CredentialDefSpec<'_>, payment_handle: i64) -> Result<CredentialDefHandle> {
        let args = vec![
            def.source_id.into(),
            def.name.into(),
            def.schema_id.into(),
            def.issuer_did.into(),
            def.tag.into(),
            def.config.into(),
            payment_handle.into(),
        ];
        let handle = self.facade.acquire(&CREATE, args, HandleKind::CredentialDef).await?;
        CredentialDefHandle::try_from_resource(handle)
    }

    pub async fn cred_def_id(&self, cred_def: CredentialDefHandle) -> Result<String> {
        self.facade.call(&CRED_DEF_ID, vec![cred_def.into()]).await
    }

    pub async fn serialize(&self, cred_def: CredentialDefHandle) -> Result<String> {
        self.facade.serialize::<()>(&SERIALIZE, cred_def.resource(), None).await
    }

    pub async fn deserialize(&self, data: &str) -> Result<CredentialDefHandle> {
        let (handle, _) = self
            .facade
            .deserialize::<()>(&DESERIALIZE, HandleKind::CredentialDef, data)
            .await?;
        CredentialDefHandle::try_from_resource(handle)
    }

    pub fn release(&self, cred_def: CredentialDefHandle) -> Result<()> {
        self.facade.release_sync(&RELEASE, cred_def.resource())
    }
}

#[async_trait::async_trait]
impl Release<CredentialDefHandle> for CredentialDefFacade {
    async fn release(&self, handle: CredentialDefHandle) -> Result<()> {
        CredentialDefFacade::release(self, handle)
    }
}
