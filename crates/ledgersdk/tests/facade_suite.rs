use std::sync::Arc;
use std::time::Duration;

use ledgercore::ClientContext;
use ledgercore::ErrorKind;
use ledgercore::HandleKind;
use ledgercore::HandleState;
use ledgercore::NativeArg;
use ledgercore::NativeValue;
use ledgercore::error::CryptoErrorKind;
use ledgercore::error::PoolErrorKind;
use ledgercore::error::WalletErrorKind;
use ledgercore::error::codes;

use ledgersdk::Client;
use ledgersdk::anoncreds::ProofInputs;
use ledgersdk::anoncreds::VerificationInputs;
use ledgersdk::mock::MockNative;
use ledgersdk::mock::MockReply;

const CONFIG: &str = r#"{"id":"alice"}"#;
const CREDENTIALS: &str = r#"{"key":"secret"}"#;

fn client() -> (Client, Arc<MockNative>) {
    let mock = Arc::new(MockNative::new());
    mock.reply("indy_open_wallet", MockReply::NewHandle)
        .reply("indy_close_wallet", MockReply::ok())
        .reply("indy_open_pool_ledger", MockReply::NewHandle)
        .reply("indy_close_pool_ledger", MockReply::ok());
    (Client::new(mock.clone()), mock)
}

// --- Test 1: Open, use and close a wallet ---

#[tokio::test]
async fn test_wallet_roundtrip() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_get_wallet_record", MockReply::text(r#"{"id":"r1","value":"v"}"#));

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    assert_eq!(client.context().handles().state(&wallet.resource()), Some(HandleState::Open));

    let record = client.records().get(wallet, "note", "r1", "{}").await?;
    assert!(record.contains("r1"));

    client.wallet().close(wallet).await?;
    assert_eq!(client.context().handles().state(&wallet.resource()), Some(HandleState::Released));
    assert!(client.context().commands().is_empty());
    Ok(())
}

// --- Test 2: Stale handles fail before dispatch ---

#[tokio::test]
async fn test_use_after_close_is_invalid_state() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_get_wallet_record", MockReply::text("{}"));

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    client.wallet().close(wallet).await?;

    let err = client.records().get(wallet, "note", "r1", "{}").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(err.code(), codes::INVALID_STATE);
    assert_eq!(mock.calls("indy_get_wallet_record"), 0);
    Ok(())
}

#[tokio::test]
async fn test_double_close_reaches_native_once() -> anyhow::Result<()> {
    let (client, mock) = client();

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    client.wallet().close(wallet).await?;

    let err = client.wallet().close(wallet).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(mock.calls("indy_close_wallet"), 1);
    Ok(())
}

// --- Test 3: Synchronous rejection ---

#[tokio::test]
async fn test_dispatch_rejection_leaves_nothing_behind() {
    let (client, mock) = client();
    mock.reply("indy_open_wallet", MockReply::Reject(codes::WALLET_NOT_FOUND));

    let err = client.wallet().open(CONFIG, CREDENTIALS).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Wallet(WalletErrorKind::NotFound));
    assert_eq!(err.code(), codes::WALLET_NOT_FOUND);
    assert!(err.message().contains("rejected at dispatch"));

    assert!(client.context().commands().is_empty());
    assert_eq!(client.context().handles().live_count(), 0);
}

// --- Test 4: Native failures carry their detail ---

#[tokio::test]
async fn test_completion_failure_is_classified_with_detail() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply(
        "indy_get_wallet_record",
        MockReply::fail(codes::WALLET_ITEM_NOT_FOUND, "no record r9"),
    );

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    let err = client.records().get(wallet, "note", "r9", "{}").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Wallet(WalletErrorKind::ItemNotFound));
    assert_eq!(err.message(), "no record r9");
    assert_eq!(err.backtrace(), Some("mock-native"));
    assert_eq!(err.describe().native_code, codes::WALLET_ITEM_NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_backtraces_can_be_switched_off() -> anyhow::Result<()> {
    let mock = Arc::new(MockNative::new());
    mock.reply("indy_list_pools", MockReply::fail(codes::IO_ERROR, "disk gone"));
    let ctx = Arc::new(ClientContext::builder().collect_backtrace(false).build());
    let client = Client::with_context(ctx, mock.clone());

    let err = client.pool().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.message(), "disk gone");
    assert_eq!(err.backtrace(), None);
    Ok(())
}

// --- Test 5: Blank parameters never reach native code ---

#[tokio::test]
async fn test_blank_parameter_is_positional() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_add_wallet_record", MockReply::ok());

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    let err = client
        .records()
        .add(wallet, "note", " ", "value", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(3) });
    assert_eq!(err.code(), 102);
    assert_eq!(mock.calls("indy_add_wallet_record"), 0);

    let err = client.wallet().create("", CREDENTIALS).await.unwrap_err();
    assert_eq!(err.code(), 100);
    Ok(())
}

// --- Test 6: Independent operations on one wallet ---

#[tokio::test]
async fn test_concurrent_calls_on_one_wallet() -> anyhow::Result<()> {
    let mock = Arc::new(MockNative::new().with_delay(Duration::from_millis(5)));
    mock.reply("indy_open_wallet", MockReply::NewHandle);
    mock.on("indy_get_wallet_record", |args| {
        let id = args[2].as_str().unwrap_or_default().to_string();
        MockReply::text(format!("value-of-{}", id))
    });
    let client = Client::new(mock.clone());
    let records = client.records();

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    let (a, b, c) = tokio::join!(
        records.get(wallet, "note", "a", "{}"),
        records.get(wallet, "note", "b", "{}"),
        records.get(wallet, "note", "c", "{}"),
    );

    assert_eq!(a?, "value-of-a");
    assert_eq!(b?, "value-of-b");
    assert_eq!(c?, "value-of-c");
    assert_eq!(mock.calls("indy_get_wallet_record"), 3);
    Ok(())
}

// --- Test 7: Derived handles are independent ---

#[tokio::test]
async fn test_search_outlives_wallet_close() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_open_wallet_search", MockReply::NewHandle)
        .reply("indy_fetch_wallet_search_next_records", MockReply::text(r#"{"records":[]}"#))
        .reply("indy_close_wallet_search", MockReply::ok());

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    let search = client.records().open_search(wallet, "note", "{}", "{}").await?;
    assert_eq!(search.resource().kind, HandleKind::WalletSearch);

    let batch = client.records().fetch_next(wallet, search, 10).await?;
    assert!(batch.contains("records"));

    client.wallet().close(wallet).await?;
    assert_eq!(client.context().handles().state(&search.resource()), Some(HandleState::Open));

    // the wallet argument is now stale
    let err = client.records().fetch_next(wallet, search, 10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    client.records().close_search(search).await?;
    assert_eq!(client.context().handles().live_count(), 0);
    Ok(())
}

// --- Test 8: Scoped acquisition ---

#[tokio::test]
async fn test_with_open_closes_after_success() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply(
        "indy_create_and_store_my_did",
        MockReply::Complete(vec![NativeValue::Str("did:1".into()), NativeValue::Str("verkey".into())]),
    );

    let dids = client.did();
    let (did, verkey) = client
        .wallet()
        .with_open(CONFIG, CREDENTIALS, |wallet| async move { dids.create_and_store(wallet, "{}").await })
        .await?;

    assert_eq!(did, "did:1");
    assert_eq!(verkey, "verkey");
    assert_eq!(mock.calls("indy_close_wallet"), 1);
    assert_eq!(client.context().handles().live_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_with_open_closes_after_failure() {
    let (client, mock) = client();
    mock.reply("indy_submit_request", MockReply::fail(codes::LEDGER_NO_CONSENSUS, "no consensus"));

    let ledger = client.ledger();
    let err = client
        .pool()
        .with_open("sandbox", None, |pool| async move {
            ledger.submit_request(pool, r#"{"op":"1"}"#).await
        })
        .await
        .unwrap_err();

    assert_eq!(err.message(), "no consensus");
    assert_eq!(mock.calls("indy_close_pool_ledger"), 1);
    assert_eq!(client.context().handles().live_count(), 0);
}

#[tokio::test]
async fn test_body_error_wins_over_release_error() {
    let (client, mock) = client();
    mock.reply("indy_close_pool_ledger", MockReply::fail(codes::POOL_TERMINATED, "already gone"));

    let err = client
        .pool()
        .with_open("sandbox", None, |_pool| async move {
            Err::<(), _>(ledgercore::Error::invalid_state("body failed"))
        })
        .await
        .unwrap_err();
    assert_eq!(err.message(), "body failed");

    let err = client
        .pool()
        .with_open("sandbox", None, |_pool| async move { Ok(()) })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Pool(PoolErrorKind::Terminated));
}

// --- Test 9: Bounded waits ---

#[tokio::test]
async fn test_silent_native_times_out() {
    let mock = Arc::new(MockNative::new());
    mock.reply("indy_list_pools", MockReply::Silent);
    let ctx = Arc::new(
        ClientContext::builder()
            .command_timeout(Duration::from_millis(50))
            .build(),
    );
    let client = Client::with_context(ctx, mock.clone());

    let err = client.pool().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.code(), codes::COMMAND_TIMEOUT);
    assert!(client.context().commands().is_empty());
}

// --- Test 10: Malformed and duplicate completions ---

#[tokio::test]
async fn test_wrong_completion_shape_is_invalid_state() {
    let (client, mock) = client();
    mock.reply("indy_list_pools", MockReply::Complete(vec![NativeValue::Int(3)]));

    let err = client.pool().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_duplicate_completion_is_ignored() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_list_pools", MockReply::Twice(vec![NativeValue::Str("[]".into())]));

    assert_eq!(client.pool().list().await?, "[]");
    assert_eq!(client.pool().list().await?, "[]");
    assert!(client.context().commands().is_empty());
    Ok(())
}

// --- Test 11: Shutdown ---

#[tokio::test]
async fn test_shutdown_fails_pending_and_new_calls() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_list_pools", MockReply::Silent);

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;

    let pools = client.pool();
    let waiting = tokio::spawn(async move { pools.list().await });
    while client.context().commands().is_empty() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    assert_eq!(client.shutdown(), 1);
    let err = waiting.await?.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = client.pool().list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // the core releases nothing on its own
    assert_eq!(client.context().handles().state(&wallet.resource()), Some(HandleState::Open));
    Ok(())
}

// --- Test 12: Runtime configuration and protocol version ---

#[tokio::test]
async fn test_runtime_config_is_passed_through() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.on("indy_set_protocol_version", |args| match args[0] {
        NativeArg::Int(2) => MockReply::ok(),
        _ => MockReply::fail(codes::POOL_INCOMPATIBLE_PROTOCOL, "unsupported"),
    });

    client.apply_runtime_config()?;
    assert_eq!(mock.calls("indy_set_runtime_config"), 1);

    client.pool().set_protocol_version(2).await?;
    let err = client.pool().set_protocol_version(1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Pool(PoolErrorKind::IncompatibleProtocol));

    mock.sync_status("indy_set_runtime_config", codes::INVALID_PARAM_1);
    let err = client.apply_runtime_config().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(1) });
    Ok(())
}

// --- Test 13: Keys, signatures and encryption ---

fn reversed(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

#[tokio::test]
async fn test_crypto_carries_bytes_both_ways() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_create_key", MockReply::text("VerKey1"))
        .reply("indy_set_key_metadata", MockReply::ok())
        .reply("indy_get_key_metadata", MockReply::text("signing key"))
        .on("indy_crypto_sign", |args| match &args[2] {
            NativeArg::Bytes(message) => MockReply::Complete(vec![NativeValue::Bytes(reversed(message))]),
            _ => MockReply::Reject(codes::INVALID_STRUCTURE),
        })
        .on("indy_crypto_verify", |args| match (&args[1], &args[2]) {
            (NativeArg::Bytes(message), NativeArg::Bytes(signature)) => {
                MockReply::Complete(vec![NativeValue::Bool(*signature == reversed(message))])
            }
            _ => MockReply::Reject(codes::INVALID_STRUCTURE),
        })
        .reply("indy_crypto_auth_crypt", MockReply::Complete(vec![NativeValue::Bytes(vec![1, 2, 3])]))
        .reply(
            "indy_crypto_auth_decrypt",
            MockReply::Complete(vec![NativeValue::Str("SenderVk".into()), NativeValue::Bytes(b"hello".to_vec())]),
        )
        .reply("indy_crypto_anon_crypt", MockReply::Complete(vec![NativeValue::Bytes(vec![9, 9])]))
        .reply("indy_crypto_anon_decrypt", MockReply::Complete(vec![NativeValue::Bytes(b"hello".to_vec())]))
        .reply("indy_pack_message", MockReply::Complete(vec![NativeValue::Bytes(b"jwe".to_vec())]))
        .reply(
            "indy_unpack_message",
            MockReply::Complete(vec![NativeValue::Bytes(br#"{"message":"hello"}"#.to_vec())]),
        );

    let crypto = client.crypto();
    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;

    let verkey = crypto.create_key(wallet, "{}").await?;
    assert_eq!(verkey, "VerKey1");
    crypto.set_key_metadata(wallet, &verkey, "signing key").await?;
    assert_eq!(crypto.get_key_metadata(wallet, &verkey).await?, "signing key");

    let signature = crypto.sign(wallet, &verkey, b"message").await?;
    assert_eq!(signature, b"egassem".to_vec());
    assert!(crypto.verify(&verkey, b"message", &signature).await?);
    assert!(!crypto.verify(&verkey, b"message", b"forged").await?);

    assert_eq!(crypto.auth_crypt(wallet, &verkey, "TheirVk", b"hello").await?, vec![1, 2, 3]);
    let (sender, message) = crypto.auth_decrypt(wallet, &verkey, &[1, 2, 3]).await?;
    assert_eq!(sender, "SenderVk");
    assert_eq!(message, b"hello".to_vec());

    assert_eq!(crypto.anon_crypt("TheirVk", b"hello").await?, vec![9, 9]);
    assert_eq!(crypto.anon_decrypt(wallet, &verkey, &[9, 9]).await?, b"hello".to_vec());

    let jwe = crypto.pack_message(wallet, b"hello", r#"["TheirVk"]"#, None).await?;
    let unpacked = crypto.unpack_message(wallet, &jwe).await?;
    assert!(String::from_utf8(unpacked)?.contains("hello"));
    assert!(client.context().commands().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_crypto_rejections() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_crypto_sign", MockReply::Complete(vec![NativeValue::Bytes(vec![1])]))
        .reply("indy_crypto_anon_crypt", MockReply::fail(codes::UNKNOWN_CRYPTO_TYPE, "unknown crypto type"))
        .reply("indy_create_key", MockReply::text("VerKey1"));

    let crypto = client.crypto();
    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;

    let err = crypto.sign(wallet, "VerKey1", b"").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(3) });
    assert_eq!(mock.calls("indy_crypto_sign"), 0);

    let err = crypto.anon_crypt("VerKey1", b"hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Crypto(CryptoErrorKind::UnknownKeyFormat));
    assert_eq!(err.code(), codes::UNKNOWN_CRYPTO_TYPE);

    client.wallet().close(wallet).await?;
    let err = crypto.create_key(wallet, "{}").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(mock.calls("indy_create_key"), 0);
    Ok(())
}

// --- Test 14: Anonymous credentials ---

#[tokio::test]
async fn test_anoncreds_result_shapes() -> anyhow::Result<()> {
    let (client, mock) = client();
    let pair = |a: &str, b: &str| MockReply::Complete(vec![NativeValue::Str(a.into()), NativeValue::Str(b.into())]);
    mock.reply("indy_issuer_create_schema", pair("schema:1", r#"{"id":"schema:1"}"#))
        .reply("indy_issuer_create_and_store_credential_def", pair("creddef:1", r#"{"id":"creddef:1"}"#))
        .reply("indy_issuer_create_credential_offer", MockReply::text(r#"{"nonce":"1"}"#))
        .reply(
            "indy_issuer_create_credential",
            MockReply::Complete(vec![
                NativeValue::Str(r#"{"values":{}}"#.into()),
                NativeValue::OptStr(Some("7".into())),
                NativeValue::OptStr(None),
            ]),
        )
        .reply("indy_prover_create_master_secret", MockReply::text("ms1"))
        .reply("indy_prover_create_credential_req", pair(r#"{"req":1}"#, r#"{"meta":1}"#))
        .reply("indy_prover_store_credential", MockReply::text("cred-1"))
        .reply("indy_prover_get_credentials_for_proof_req", MockReply::text(r#"{"attrs":{}}"#))
        .reply("indy_prover_create_proof", MockReply::text(r#"{"proof":{}}"#))
        .reply("indy_verifier_verify_proof", MockReply::Complete(vec![NativeValue::Bool(true)]));

    let anoncreds = client.anoncreds();
    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;

    let (schema_id, schema) = anoncreds.issuer_create_schema("did:issuer", "degree", "1.0", r#"["name"]"#).await?;
    assert_eq!(schema_id, "schema:1");
    let (cred_def_id, cred_def) = anoncreds
        .issuer_create_and_store_credential_def(wallet, "did:issuer", &schema, "tag1", None, "{}")
        .await?;
    assert_eq!(cred_def_id, "creddef:1");

    let offer = anoncreds.issuer_create_credential_offer(wallet, &cred_def_id).await?;
    let master_secret = anoncreds.prover_create_master_secret(wallet, Some("ms1")).await?;
    let (request, metadata) = anoncreds
        .prover_create_credential_req(wallet, "did:prover", &offer, &cred_def, &master_secret)
        .await?;

    let issued = anoncreds
        .issuer_create_credential(wallet, &offer, &request, r#"{"name":"alice"}"#, Some("revreg:1"), 0)
        .await?;
    assert_eq!(issued.revocation_id.as_deref(), Some("7"));
    assert_eq!(issued.revocation_registry_delta, None);

    let stored = anoncreds
        .prover_store_credential(wallet, None, &metadata, &issued.credential, &cred_def, None)
        .await?;
    assert_eq!(stored, "cred-1");

    let request_json = r#"{"name":"check"}"#;
    let available = anoncreds.prover_get_credentials_for_proof_req(wallet, request_json).await?;
    let proof = anoncreds
        .prover_create_proof(
            wallet,
            ProofInputs {
                proof_request: request_json,
                requested_credentials: &available,
                master_secret_id: &master_secret,
                schemas: "{}",
                credential_defs: "{}",
                revocation_states: "{}",
            },
        )
        .await?;

    let valid = anoncreds
        .verifier_verify_proof(VerificationInputs {
            proof_request: request_json,
            proof: &proof,
            schemas: "{}",
            credential_defs: "{}",
            revocation_registry_defs: "{}",
            revocation_registries: "{}",
        })
        .await?;
    assert!(valid);

    let err = anoncreds.issuer_create_schema("did:issuer", " ", "1.0", "[]").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(2) });
    assert_eq!(mock.calls("indy_issuer_create_schema"), 1);
    Ok(())
}

// --- Test 15: Cache and pairwise ---

#[tokio::test]
async fn test_cache_and_pairwise() -> anyhow::Result<()> {
    let (client, mock) = client();
    mock.reply("indy_get_schema", MockReply::text(r#"{"id":"schema:1"}"#))
        .reply("indy_get_cred_def", MockReply::text(r#"{"id":"creddef:1"}"#))
        .reply("indy_purge_schema_cache", MockReply::ok())
        .reply("indy_purge_cred_def_cache", MockReply::ok())
        .reply("indy_is_pairwise_exists", MockReply::Complete(vec![NativeValue::Bool(false)]))
        .reply("indy_create_pairwise", MockReply::ok())
        .reply("indy_list_pairwise", MockReply::text(r#"["did:bob"]"#))
        .reply("indy_get_pairwise", MockReply::text(r#"{"my_did":"did:alice"}"#))
        .reply("indy_set_pairwise_metadata", MockReply::ok());

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    let pool = client.pool().open("sandbox", None).await?;

    let cache = client.cache();
    assert!(cache.get_schema(pool, wallet, "did:alice", "schema:1", "{}").await?.contains("schema:1"));
    assert!(cache.get_cred_def(pool, wallet, "did:alice", "creddef:1", "{}").await?.contains("creddef:1"));
    cache.purge_schema_cache(wallet, r#"{"maxAge":0}"#).await?;
    cache.purge_cred_def_cache(wallet, r#"{"maxAge":0}"#).await?;

    let pairwise = client.pairwise();
    assert!(!pairwise.exists(wallet, "did:bob").await?);
    pairwise.create(wallet, "did:bob", "did:alice", Some("friend")).await?;
    mock.reply("indy_is_pairwise_exists", MockReply::Complete(vec![NativeValue::Bool(true)]));
    assert!(pairwise.exists(wallet, "did:bob").await?);
    assert!(pairwise.list(wallet).await?.contains("did:bob"));
    assert!(pairwise.get(wallet, "did:bob").await?.contains("did:alice"));
    pairwise.set_metadata(wallet, "did:bob", None).await?;

    let err = pairwise.create(wallet, "did:bob", "", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(3) });
    assert_eq!(mock.calls("indy_create_pairwise"), 1);

    client.pool().close(pool).await?;
    let err = cache.get_schema(pool, wallet, "did:alice", "schema:1", "{}").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(mock.calls("indy_get_schema"), 1);
    Ok(())
}

// --- Test 16: Record values and tags ---

#[tokio::test]
async fn test_record_values_and_tags() -> anyhow::Result<()> {
    let (client, mock) = client();
    let functions = [
        "indy_add_wallet_record",
        "indy_update_wallet_record_value",
        "indy_update_wallet_record_tags",
        "indy_add_wallet_record_tags",
        "indy_delete_wallet_record_tags",
        "indy_delete_wallet_record",
    ];
    for function in functions {
        mock.reply(function, MockReply::ok());
    }

    let records = client.records();
    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;

    records.add(wallet, "note", "r1", "v1", Some(r#"{"a":"1"}"#)).await?;
    records.update_value(wallet, "note", "r1", "v2").await?;
    records.update_tags(wallet, "note", "r1", r#"{"a":"2"}"#).await?;
    records.add_tags(wallet, "note", "r1", r#"{"b":"3"}"#).await?;
    records.delete_tags(wallet, "note", "r1", r#"["a"]"#).await?;
    records.delete(wallet, "note", "r1").await?;
    for function in functions {
        assert_eq!(mock.calls(function), 1, "{}", function);
    }

    let err = records.add_tags(wallet, "note", "r1", "  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(4) });
    assert_eq!(mock.calls("indy_add_wallet_record_tags"), 1);

    mock.reply(
        "indy_delete_wallet_record",
        MockReply::fail(codes::WALLET_ITEM_NOT_FOUND, "no such record"),
    );
    let err = records.delete(wallet, "note", "r1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Wallet(WalletErrorKind::ItemNotFound));
    Ok(())
}

// --- Test 17: DIDs and ledger requests ---

#[tokio::test]
async fn test_did_and_ledger_requests() -> anyhow::Result<()> {
    let (client, mock) = client();
    let texts = [
        "indy_replace_keys_start",
        "indy_key_for_did",
        "indy_key_for_local_did",
        "indy_get_did_metadata",
        "indy_get_my_did_with_meta",
        "indy_list_my_dids_with_meta",
        "indy_abbreviate_verkey",
        "indy_sign_request",
        "indy_multi_sign_request",
        "indy_sign_and_submit_request",
        "indy_submit_request",
        "indy_build_nym_request",
        "indy_build_get_nym_request",
        "indy_build_schema_request",
        "indy_build_get_schema_request",
        "indy_build_cred_def_request",
        "indy_build_get_cred_def_request",
    ];
    for function in texts {
        mock.reply(function, MockReply::text(format!(r#"{{"from":"{}"}}"#, function)));
    }
    let parsed = MockReply::Complete(vec![NativeValue::Str("id:1".into()), NativeValue::Str(r#"{"id":"id:1"}"#.into())]);
    mock.reply("indy_replace_keys_apply", MockReply::ok())
        .reply("indy_store_their_did", MockReply::ok())
        .reply("indy_set_did_metadata", MockReply::ok())
        .reply("indy_parse_get_schema_response", parsed.clone())
        .reply("indy_parse_get_cred_def_response", parsed);

    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    let pool = client.pool().open("sandbox", None).await?;

    let did = client.did();
    assert!(did.replace_keys_start(wallet, "did:alice", "{}").await?.contains("replace_keys_start"));
    did.replace_keys_apply(wallet, "did:alice").await?;
    did.store_their(wallet, r#"{"did":"did:bob"}"#).await?;
    assert!(did.key_for_did(pool, wallet, "did:bob").await?.contains("indy_key_for_did"));
    assert!(did.key_for_local_did(wallet, "did:alice").await?.contains("key_for_local_did"));
    did.set_metadata(wallet, "did:alice", "meta").await?;
    assert!(did.get_metadata(wallet, "did:alice").await?.contains("get_did_metadata"));
    assert!(did.get_with_meta(wallet, "did:alice").await?.contains("with_meta"));
    assert!(did.list_with_meta(wallet).await?.contains("list_my_dids"));
    assert!(did.abbreviate_verkey("did:alice", "FullVerkey").await?.contains("abbreviate"));

    let ledger = client.ledger();
    let request = ledger.build_nym_request("did:alice", "did:bob", Some("VerKey1"), None, None).await?;
    assert!(request.contains("build_nym_request"));
    ledger.build_get_nym_request(None, "did:bob").await?;
    ledger.build_schema_request("did:alice", r#"{"name":"degree"}"#).await?;
    ledger.build_get_schema_request(None, "schema:1").await?;
    ledger.build_cred_def_request("did:alice", r#"{"tag":"1"}"#).await?;
    ledger.build_get_cred_def_request(Some("did:alice"), "creddef:1").await?;

    let signed = ledger.sign_request(wallet, "did:alice", &request).await?;
    let signed = ledger.multi_sign_request(wallet, "did:alice", &signed).await?;
    ledger.submit_request(pool, &signed).await?;
    let response = ledger.sign_and_submit_request(pool, wallet, "did:alice", &request).await?;

    let (schema_id, schema) = ledger.parse_get_schema_response(&response).await?;
    assert_eq!(schema_id, "id:1");
    assert!(schema.contains("id:1"));
    let (cred_def_id, _) = ledger.parse_get_cred_def_response(&response).await?;
    assert_eq!(cred_def_id, "id:1");

    let err = did.abbreviate_verkey("did:alice", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(2) });

    client.pool().close(pool).await?;
    let err = ledger.submit_request(pool, &signed).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(mock.calls("indy_submit_request"), 1);
    Ok(())
}

// --- Test 18: Handles the registry cannot track ---

#[tokio::test]
async fn test_untrackable_handles_are_rejected() -> anyhow::Result<()> {
    let (client, mock) = client();

    mock.reply("indy_open_wallet", MockReply::Complete(vec![NativeValue::Handle(0)]));
    let err = client.wallet().open(CONFIG, CREDENTIALS).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    mock.reply("indy_open_wallet", MockReply::Complete(vec![NativeValue::Handle(7)]));
    let wallet = client.wallet().open(CONFIG, CREDENTIALS).await?;
    assert_eq!(wallet.id(), 7);

    // the native layer handed out an id that is still open
    let err = client.wallet().open(CONFIG, CREDENTIALS).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(client.context().handles().live_count(), 1);
    assert!(client.context().commands().is_empty());
    Ok(())
}
