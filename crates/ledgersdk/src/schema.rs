//! Schemas published on, or looked up from, the ledger.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::SchemaHandle;
use crate::operation::Operation;
use crate::operation::Param;
use crate::scope::Release;

const SCHEMA: Param = Param::Handle("schema_handle", HandleKind::Schema);

const CREATE: Operation = Operation::new(
    "vcx_schema_create",
    &[
        Param::Text("source_id"),
        Param::Text("schema_name"),
        Param::Text("version"),
        Param::Json("schema_data"),
        Param::Int("payment_handle"),
    ],
);
const LOOKUP: Operation = Operation::new("vcx_schema_get_attributes", &[Param::Text("source_id"), Param::Text("schema_id")]);
const SCHEMA_ID: Operation = Operation::new("vcx_schema_get_schema_id", &[SCHEMA]);
const SERIALIZE: Operation = Operation::new("vcx_schema_serialize", &[SCHEMA]);
const DESERIALIZE: Operation = Operation::new("vcx_schema_deserialize", &[Param::Text("schema_data")]);
const RELEASE: Operation = Operation::new("vcx_schema_release", &[SCHEMA]);

/// A schema to publish.
#[derive(Clone, Copy, Debug)]
pub struct SchemaDefinition<'a> {
    pub source_id: &'a str,
    pub name: &'a str,
    pub version: &'a str,
    pub attributes: &'a str,
}

#[derive(Clone, Debug)]
pub struct SchemaFacade {
    facade: Facade,
}

impl SchemaFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    /// Publishes a schema, paying from `payment_handle`.
    pub async fn create(&self, schema: SchemaDefinition<'_>, payment_handle: i64) -> Result<SchemaHandle> {
        let args = vec![
            schema.source_id.into(),
            schema.name.into(),
            schema.version.into(),
            schema.attributes.into(),
            payment_handle.into(),
        ];
        let handle = self.facade.acquire(&CREATE, args, HandleKind::Schema).await?;
        SchemaHandle::try_from_resource(handle)
    }

    /// Loads an existing ledger schema. Returns its handle and attributes.
    pub async fn lookup(&self, source_id: &str, schema_id: &str) -> Result<(SchemaHandle, String)> {
        let (handle, attributes) = self
            .facade
            .acquire_with(&LOOKUP, vec![source_id.into(), schema_id.into()], HandleKind::Schema)
            .await?;
        Ok((SchemaHandle::try_from_resource(handle)?, attributes))
    }

    pub async fn schema_id(&self, schema: SchemaHandle) -> Result<String> {
        self.facade.call(&SCHEMA_ID, vec![schema.into()]).await
    }

    pub async fn serialize(&self, schema: SchemaHandle) -> Result<String> {
        self.facade.serialize::<()>(&SERIALIZE, schema.resource(), None).await
    }

    pub async fn deserialize(&self, data: &str) -> Result<SchemaHandle> {
        let (handle, _) = self
            .facade
            .deserialize::<()>(&DESERIALIZE, HandleKind::Schema, data)
            .await?;
        SchemaHandle::try_from_resource(handle)
    }

    pub fn release(&self, schema: SchemaHandle) -> Result<()> {
        self.facade.release_sync(&RELEASE, schema.resource())
    }
}

#[async_trait::async_trait]
impl Release<SchemaHandle> for SchemaFacade {
    async fn release(&self, handle: SchemaHandle) -> Result<()> {
        SchemaFacade::release(self, handle)
    }
}
