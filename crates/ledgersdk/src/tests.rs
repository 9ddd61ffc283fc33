use ledgercore::ErrorKind;
use ledgercore::HandleKind;
use ledgercore::HandleRegistry;
use ledgercore::NativeArg;
use ledgercore::ResourceHandle;

use crate::envelope;
use crate::handles::PoolHandle;
use crate::handles::WalletHandle;
use crate::lifecycle::ConnectionState;
use crate::lifecycle::IssuanceState;
use crate::lifecycle::Lifecycle;
use crate::lifecycle::ProofState;
use crate::lifecycle::StageTable;
use crate::lifecycle::TerminationReason;
use crate::operation::Operation;
use crate::operation::Param;

const ADD_RECORD: Operation = Operation::new(
    "add_record",
    &[
        Param::Handle("wallet_handle", HandleKind::Wallet),
        Param::Text("type"),
        Param::Text("id"),
        Param::Json("value"),
        Param::OptText("tags"),
    ],
);

fn open_wallet(registry: &HandleRegistry, id: i32) -> ResourceHandle {
    registry.track(id, HandleKind::Wallet).unwrap()
}

fn record_args(wallet: ResourceHandle, kind: &str, tags: Option<&str>) -> Vec<NativeArg> {
    vec![wallet.into(), kind.into(), "id-1".into(), "{}".into(), tags.into()]
}

// --- Test 1: Operation validation ---

#[test]
fn test_valid_arguments_pass() {
    let registry = HandleRegistry::new();
    let wallet = open_wallet(&registry, 3);

    ADD_RECORD.validate(&record_args(wallet, "note", None), &registry).unwrap();
    ADD_RECORD
        .validate(&record_args(wallet, "note", Some(r#"{"a":"b"}"#)), &registry)
        .unwrap();
}

#[test]
fn test_blank_text_reports_its_position() {
    let registry = HandleRegistry::new();
    let wallet = open_wallet(&registry, 3);

    let err = ADD_RECORD.validate(&record_args(wallet, "   ", None), &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(2) });
    assert_eq!(err.code(), 101);
    assert!(err.message().contains("type"));
}

#[test]
fn test_blank_optional_text_is_rejected() {
    let registry = HandleRegistry::new();
    let wallet = open_wallet(&registry, 3);

    let err = ADD_RECORD.validate(&record_args(wallet, "note", Some("")), &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(5) });
    assert_eq!(err.code(), 104);
}

#[test]
fn test_wrong_handle_kind_is_a_bad_parameter() {
    let registry = HandleRegistry::new();
    let pool = registry.track(3, HandleKind::Pool).unwrap();

    let err = ADD_RECORD.validate(&record_args(pool, "note", None), &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(1) });
    assert_eq!(err.code(), 100);
}

#[test]
fn test_released_handle_is_invalid_state() {
    let registry = HandleRegistry::new();
    let wallet = open_wallet(&registry, 3);
    registry.release(&wallet).unwrap();

    let err = ADD_RECORD.validate(&record_args(wallet, "note", None), &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(err.code(), 112);
}

#[test]
fn test_argument_count_and_type_mismatches() {
    let registry = HandleRegistry::new();
    let wallet = open_wallet(&registry, 3);

    let err = ADD_RECORD.validate(&[wallet.into()], &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: None });

    let mut args = record_args(wallet, "note", None);
    args[2] = NativeArg::Int(7);
    let err = ADD_RECORD.validate(&args, &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(3) });
}

// --- Test 2: Typed handles ---

#[test]
fn test_typed_handle_checks_kind() {
    let wallet = ResourceHandle { id: 9, kind: HandleKind::Wallet };

    let typed = WalletHandle::try_from_resource(wallet).unwrap();
    assert_eq!(typed.id(), 9);
    assert_eq!(typed.to_string(), "wallet-9");
    assert_eq!(NativeArg::from(typed), NativeArg::Handle(wallet));

    let err = PoolHandle::try_from_resource(wallet).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

// --- Test 3: Stage tables ---

fn connection(id: i32) -> ResourceHandle {
    ResourceHandle { id, kind: HandleKind::Connection }
}

#[test]
fn test_stages_move_forward_only() {
    let stages = StageTable::<ConnectionState>::default();
    let handle = connection(1);
    stages.set(handle, ConnectionState::Initiated);

    assert_eq!(stages.advance(handle, ConnectionState::Responded).unwrap(), ConnectionState::Responded);
    // equal is a no-op
    assert_eq!(stages.advance(handle, ConnectionState::Responded).unwrap(), ConnectionState::Responded);

    let err = stages.advance(handle, ConnectionState::Invited).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(stages.get(handle).unwrap(), ConnectionState::Responded);
}

#[test]
fn test_terminal_stage_accepts_no_moves() {
    let stages = StageTable::<IssuanceState>::default();
    let handle = ResourceHandle { id: 4, kind: HandleKind::Credential };
    stages.set(handle, IssuanceState::Accepted);

    let rejected = IssuanceState::Terminated { reason: TerminationReason::Rejected };
    assert!(stages.advance(handle, rejected).is_err());
    assert_eq!(stages.get(handle).unwrap(), IssuanceState::Accepted);

    // revocation is the one move out of acceptance
    assert_eq!(stages.advance(handle, IssuanceState::Revoked).unwrap(), IssuanceState::Revoked);
    assert!(stages.advance(handle, IssuanceState::Accepted).is_err());

    let other = ResourceHandle { id: 5, kind: HandleKind::Credential };
    stages.set(other, rejected);
    assert!(stages.advance(other, IssuanceState::Revoked).is_err());
}

#[test]
fn test_termination_from_any_open_stage() {
    let stages = StageTable::<IssuanceState>::default();
    let handle = ResourceHandle { id: 4, kind: HandleKind::Credential };
    stages.set(handle, IssuanceState::OfferSent);

    let expired = IssuanceState::Terminated { reason: TerminationReason::Expired };
    assert_eq!(stages.advance(handle, expired).unwrap(), expired);
    assert!(stages.get(handle).unwrap().is_terminal());
}

#[test]
fn test_native_codes_map_to_stages() {
    let connecting = ConnectionState::Initiated;
    assert_eq!(ConnectionState::from_native(4, &connecting), Some(ConnectionState::Complete));
    assert_eq!(ConnectionState::from_native(0, &connecting), None);

    let issuing = IssuanceState::Issued;
    assert_eq!(IssuanceState::from_native(4, &issuing), Some(IssuanceState::Accepted));
    assert_eq!(IssuanceState::from_native(7, &issuing), Some(IssuanceState::Revoked));
    assert_eq!(IssuanceState::from_native(5, &issuing), None);
    assert_eq!(
        IssuanceState::from_native(9, &issuing),
        Some(IssuanceState::Terminated { reason: TerminationReason::Rejected })
    );
    assert_eq!(
        IssuanceState::from_native(6, &issuing),
        Some(IssuanceState::Terminated { reason: TerminationReason::Expired })
    );

    let verified = ProofState::Verified { valid: false };
    assert_eq!(ProofState::from_native(4, &ProofState::RequestSent), Some(ProofState::Sent));
    assert_eq!(ProofState::from_native(4, &verified), Some(verified));
    assert_eq!(ProofState::from_native(6, &ProofState::RequestSent), None);

    let stages = StageTable::<ProofState>::default();
    let handle = ResourceHandle { id: 2, kind: HandleKind::Proof };
    stages.set(handle, ProofState::RequestSent);
    assert_eq!(stages.advance_native(handle, 3).unwrap(), ProofState::Sent);
    assert_eq!(stages.advance_native(handle, 42).unwrap_err().kind(), ErrorKind::InvalidState);
}

#[test]
fn test_require_and_missing_stage() {
    let stages = StageTable::<ProofState>::default();
    let handle = ResourceHandle { id: 2, kind: HandleKind::Proof };

    assert_eq!(stages.get(handle).unwrap_err().kind(), ErrorKind::InvalidState);

    stages.set(handle, ProofState::Initialized);
    let err = stages
        .require(handle, "get_proof", |s| *s == ProofState::Sent)
        .unwrap_err();
    assert!(err.message().contains("get_proof"));

    let registry = HandleRegistry::new();
    let tracked = registry.track(2, HandleKind::Proof).unwrap();
    stages.forget_released(tracked, &registry);
    assert_eq!(stages.len(), 1);

    registry.release(&tracked).unwrap();
    stages.forget_released(tracked, &registry);
    assert!(stages.is_empty());
}

// --- Test 4: Serialization envelope ---

#[test]
fn test_envelope_carries_state_and_data() {
    let state = IssuanceState::Terminated { reason: TerminationReason::Cancelled };
    let sealed = envelope::seal(HandleKind::Credential, Some(&state), r#"{"source_id":"c1","n":3}"#).unwrap();

    let value: serde_json::Value = serde_json::from_str(&sealed).unwrap();
    assert_eq!(value["version"], "1.0");
    assert_eq!(value["kind"], "credential");
    assert_eq!(value["data"]["n"], 3);

    let (restored, data) = envelope::open::<IssuanceState>(HandleKind::Credential, &sealed).unwrap();
    assert_eq!(restored, Some(state));
    let data: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(data["source_id"], "c1");
}

#[test]
fn test_envelope_keeps_non_json_data_verbatim() {
    let sealed = envelope::seal::<()>(HandleKind::Schema, None, "opaque blob").unwrap();
    let (state, data) = envelope::open::<()>(HandleKind::Schema, &sealed).unwrap();
    assert_eq!(state, None);
    assert_eq!(data, "opaque blob");
}

#[test]
fn test_envelope_rejects_wrong_kind_and_version() {
    let sealed = envelope::seal(HandleKind::Connection, Some(&ConnectionState::Complete), "{}").unwrap();

    let err = envelope::open::<ConnectionState>(HandleKind::Proof, &sealed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(1) });

    let future = sealed.replace("\"1.0\"", "\"9.9\"");
    let err = envelope::open::<ConnectionState>(HandleKind::Connection, &future).unwrap_err();
    assert!(err.message().contains("9.9"));

    let err = envelope::open::<ConnectionState>(HandleKind::Connection, "not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter { index: Some(1) });
}
