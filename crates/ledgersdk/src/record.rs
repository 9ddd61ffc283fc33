//! Non-secret wallet records and record searches.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::SearchHandle;
use crate::handles::WalletHandle;
use crate::operation::Operation;
use crate::operation::Param;
use crate::scope::Release;

const WALLET: Param = Param::Handle("wallet_handle", HandleKind::Wallet);
const TYPE: Param = Param::Text("type");
const ID: Param = Param::Text("id");

const ADD: Operation = Operation::new(
    "indy_add_wallet_record",
    &[WALLET, TYPE, ID, Param::Text("value"), Param::OptText("tags_json")],
);
const UPDATE_VALUE: Operation = Operation::new("indy_update_wallet_record_value", &[WALLET, TYPE, ID, Param::Text("value")]);
const UPDATE_TAGS: Operation = Operation::new("indy_update_wallet_record_tags", &[WALLET, TYPE, ID, Param::Json("tags_json")]);
const ADD_TAGS: Operation = Operation::new("indy_add_wallet_record_tags", &[WALLET, TYPE, ID, Param::Json("tags_json")]);
const DELETE_TAGS: Operation = Operation::new("indy_delete_wallet_record_tags", &[WALLET, TYPE, ID, Param::Json("tag_names_json")]);
const DELETE: Operation = Operation::new("indy_delete_wallet_record", &[WALLET, TYPE, ID]);
const GET: Operation = Operation::new("indy_get_wallet_record", &[WALLET, TYPE, ID, Param::Json("options_json")]);
const OPEN_SEARCH: Operation = Operation::new(
    "indy_open_wallet_search",
    &[WALLET, TYPE, Param::Json("query_json"), Param::Json("options_json")],
);
const FETCH_NEXT: Operation = Operation::new(
    "indy_fetch_wallet_search_next_records",
    &[WALLET, Param::Handle("search_handle", HandleKind::WalletSearch), Param::Int("count")],
);
const CLOSE_SEARCH: Operation = Operation::new(
    "indy_close_wallet_search",
    &[Param::Handle("search_handle", HandleKind::WalletSearch)],
);

#[derive(Clone, Debug)]
pub struct WalletRecordFacade {
    facade: Facade,
}

impl WalletRecordFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    pub async fn add(&self, wallet: WalletHandle, kind: &str, id: &str, value: &str, tags: Option<&str>) -> Result<()> {
        self.facade
            .call(&ADD, vec![wallet.into(), kind.into(), id.into(), value.into(), tags.into()])
            .await
    }

    pub async fn update_value(&self, wallet: WalletHandle, kind: &str, id: &str, value: &str) -> Result<()> {
        self.facade
            .call(&UPDATE_VALUE, vec![wallet.into(), kind.into(), id.into(), value.into()])
            .await
    }

    /// Replaces all tags of a record.
    pub async fn update_tags(&self, wallet: WalletHandle, kind: &str, id: &str, tags: &str) -> Result<()> {
        self.facade
            .call(&UPDATE_TAGS, vec![wallet.into(), kind.into(), id.into(), tags.into()])
            .await
    }

    pub async fn add_tags(&self, wallet: WalletHandle, kind: &str, id: &str, tags: &str) -> Result<()> {
        self.facade
            .call(&ADD_TAGS, vec![wallet.into(), kind.into(), id.into(), tags.into()])
            .await
    }

    pub async fn delete_tags(&self, wallet: WalletHandle, kind: &str, id: &str, tag_names: &str) -> Result<()> {
        self.facade
            .call(&DELETE_TAGS, vec![wallet.into(), kind.into(), id.into(), tag_names.into()])
            .await
    }

    pub async fn delete(&self, wallet: WalletHandle, kind: &str, id: &str) -> Result<()> {
        self.facade.call(&DELETE, vec![wallet.into(), kind.into(), id.into()]).await
    }

    /// The record as JSON, shaped by `options`.
    pub async fn get(&self, wallet: WalletHandle, kind: &str, id: &str, options: &str) -> Result<String> {
        self.facade
            .call(&GET, vec![wallet.into(), kind.into(), id.into(), options.into()])
            .await
    }

    pub async fn open_search(&self, wallet: WalletHandle, kind: &str, query: &str, options: &str) -> Result<SearchHandle> {
        let handle = self
            .facade
            .acquire(
                &OPEN_SEARCH,
                vec![wallet.into(), kind.into(), query.into(), options.into()],
                HandleKind::WalletSearch,
            )
            .await?;
        SearchHandle::try_from_resource(handle)
    }

    /// The next batch of at most `count` records.
    pub async fn fetch_next(&self, wallet: WalletHandle, search: SearchHandle, count: u32) -> Result<String> {
        self.facade
            .call(&FETCH_NEXT, vec![wallet.into(), search.into(), count.into()])
            .await
    }

    pub async fn close_search(&self, search: SearchHandle) -> Result<()> {
        self.facade.release(&CLOSE_SEARCH, search.resource(), vec![search.into()]).await
    }
}

#[async_trait::async_trait]
impl Release<SearchHandle> for WalletRecordFacade {
    async fn release(&self, handle: SearchHandle) -> Result<()> {
        self.close_search(handle).await
    }
}
