//! # Error Taxonomy
//!
//! Maps the native library's numeric status codes onto a closed set of error
//! kinds, and carries the diagnostic detail captured when the failure surfaced.
//!
//! ## Philosophy
//!
//! - **Total**: every `i32` classifies to some kind. Codes we do not model
//!   become `Unknown` and keep the raw value for support and debugging.
//! - **Eager**: the native layer keeps its error detail in thread-local state
//!   that the next call on that thread overwrites. Detail is read at the moment
//!   of classification, on the thread that observed the failure.

use serde::Deserialize;
use serde::Serialize;

/// Raw status codes of the native library.
pub mod codes {
    pub const SUCCESS: i32 = 0;

    /// `CommonInvalidParam1`. Parameters 1 through 12 are `100..=111`.
    pub const INVALID_PARAM_1: i32 = 100;
    pub const INVALID_STATE: i32 = 112;
    pub const INVALID_STRUCTURE: i32 = 113;
    pub const IO_ERROR: i32 = 114;
    /// `CommonInvalidParam13`. Parameters 13 through 27 are `115..=129`.
    pub const INVALID_PARAM_13: i32 = 115;

    pub const WALLET_INVALID_HANDLE: i32 = 200;
    pub const WALLET_UNKNOWN_TYPE: i32 = 201;
    pub const WALLET_TYPE_ALREADY_REGISTERED: i32 = 202;
    pub const WALLET_ALREADY_EXISTS: i32 = 203;
    pub const WALLET_NOT_FOUND: i32 = 204;
    pub const WALLET_INCOMPATIBLE_POOL: i32 = 205;
    pub const WALLET_ALREADY_OPENED: i32 = 206;
    pub const WALLET_ACCESS_FAILED: i32 = 207;
    pub const WALLET_INPUT: i32 = 208;
    pub const WALLET_DECODING: i32 = 209;
    pub const WALLET_STORAGE: i32 = 210;
    pub const WALLET_ENCRYPTION: i32 = 211;
    pub const WALLET_ITEM_NOT_FOUND: i32 = 212;
    pub const WALLET_ITEM_ALREADY_EXISTS: i32 = 213;
    pub const WALLET_QUERY: i32 = 214;

    pub const POOL_NOT_CREATED: i32 = 300;
    pub const POOL_INVALID_HANDLE: i32 = 301;
    pub const POOL_TERMINATED: i32 = 302;
    pub const LEDGER_NO_CONSENSUS: i32 = 303;
    pub const LEDGER_INVALID_TRANSACTION: i32 = 304;
    pub const LEDGER_SECURITY: i32 = 305;
    pub const POOL_CONFIG_ALREADY_EXISTS: i32 = 306;
    pub const POOL_TIMEOUT: i32 = 307;
    pub const POOL_INCOMPATIBLE_PROTOCOL: i32 = 308;
    pub const LEDGER_NOT_FOUND: i32 = 309;

    pub const ANONCREDS_REVOCATION_REGISTRY_FULL: i32 = 400;
    pub const ANONCREDS_INVALID_USER_REVOC_ID: i32 = 401;
    pub const ANONCREDS_MASTER_SECRET_DUPLICATE: i32 = 404;
    pub const ANONCREDS_PROOF_REJECTED: i32 = 405;
    pub const ANONCREDS_CREDENTIAL_REVOKED: i32 = 406;
    pub const ANONCREDS_CRED_DEF_ALREADY_EXISTS: i32 = 407;

    pub const UNKNOWN_CRYPTO_TYPE: i32 = 500;
    pub const DID_ALREADY_EXISTS: i32 = 600;
    pub const TRANSACTION_NOT_ALLOWED: i32 = 706;

    /// Waiting for a completion callback timed out on the caller's side.
    pub const COMMAND_TIMEOUT: i32 = 1038;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalletErrorKind {
    InvalidHandle,
    UnknownType,
    TypeAlreadyRegistered,
    AlreadyExists,
    NotFound,
    IncompatiblePool,
    AlreadyOpen,
    AccessFailed,
    Input,
    Decoding,
    Storage,
    Encryption,
    ItemNotFound,
    ItemAlreadyExists,
    Query,
    DidAlreadyExists,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolErrorKind {
    NotCreated,
    InvalidHandle,
    Terminated,
    ConfigAlreadyExists,
    Timeout,
    IncompatibleProtocol,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerErrorKind {
    NoConsensus,
    InvalidTransaction,
    SecurityDenied,
    NotFound,
    TransactionNotAllowed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialErrorKind {
    RevocationRegistryFull,
    InvalidUserRevocId,
    DuplicateMasterSecret,
    ProofRejected,
    Revoked,
    CredDefAlreadyExists,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CryptoErrorKind {
    UnknownKeyFormat,
}

/// Category of a failure, as seen by callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input. `index` is the 1-based parameter position when known.
    InvalidParameter { index: Option<u32> },
    /// Stale or invalid handle, or an operation invoked out of order.
    InvalidState,
    Io,
    Wallet(WalletErrorKind),
    Pool(PoolErrorKind),
    Ledger(LedgerErrorKind),
    Credential(CredentialErrorKind),
    Crypto(CryptoErrorKind),
    /// The caller stopped waiting for a completion.
    Timeout,
    /// A code outside the modelled taxonomy.
    Unknown(i32),
}

use self::codes::*;

const TABLE: &[(i32, ErrorKind)] = &[
    (INVALID_STATE, ErrorKind::InvalidState),
    (INVALID_STRUCTURE, ErrorKind::InvalidParameter { index: None }),
    (IO_ERROR, ErrorKind::Io),
    (WALLET_INVALID_HANDLE, ErrorKind::Wallet(WalletErrorKind::InvalidHandle)),
    (WALLET_UNKNOWN_TYPE, ErrorKind::Wallet(WalletErrorKind::UnknownType)),
    (WALLET_TYPE_ALREADY_REGISTERED, ErrorKind::Wallet(WalletErrorKind::TypeAlreadyRegistered)),
    (WALLET_ALREADY_EXISTS, ErrorKind::Wallet(WalletErrorKind::AlreadyExists)),
    (WALLET_NOT_FOUND, ErrorKind::Wallet(WalletErrorKind::NotFound)),
    (WALLET_INCOMPATIBLE_POOL, ErrorKind::Wallet(WalletErrorKind::IncompatiblePool)),
    (WALLET_ALREADY_OPENED, ErrorKind::Wallet(WalletErrorKind::AlreadyOpen)),
    (WALLET_ACCESS_FAILED, ErrorKind::Wallet(WalletErrorKind::AccessFailed)),
    (WALLET_INPUT, ErrorKind::Wallet(WalletErrorKind::Input)),
    (WALLET_DECODING, ErrorKind::Wallet(WalletErrorKind::Decoding)),
    (WALLET_STORAGE, ErrorKind::Wallet(WalletErrorKind::Storage)),
    (WALLET_ENCRYPTION, ErrorKind::Wallet(WalletErrorKind::Encryption)),
    (WALLET_ITEM_NOT_FOUND, ErrorKind::Wallet(WalletErrorKind::ItemNotFound)),
    (WALLET_ITEM_ALREADY_EXISTS, ErrorKind::Wallet(WalletErrorKind::ItemAlreadyExists)),
    (WALLET_QUERY, ErrorKind::Wallet(WalletErrorKind::Query)),
    (DID_ALREADY_EXISTS, ErrorKind::Wallet(WalletErrorKind::DidAlreadyExists)),
    (POOL_NOT_CREATED, ErrorKind::Pool(PoolErrorKind::NotCreated)),
    (POOL_INVALID_HANDLE, ErrorKind::Pool(PoolErrorKind::InvalidHandle)),
    (POOL_TERMINATED, ErrorKind::Pool(PoolErrorKind::Terminated)),
    (POOL_CONFIG_ALREADY_EXISTS, ErrorKind::Pool(PoolErrorKind::ConfigAlreadyExists)),
    (POOL_TIMEOUT, ErrorKind::Pool(PoolErrorKind::Timeout)),
    (POOL_INCOMPATIBLE_PROTOCOL, ErrorKind::Pool(PoolErrorKind::IncompatibleProtocol)),
    (LEDGER_NO_CONSENSUS, ErrorKind::Ledger(LedgerErrorKind::NoConsensus)),
    (LEDGER_INVALID_TRANSACTION, ErrorKind::Ledger(LedgerErrorKind::InvalidTransaction)),
    (LEDGER_SECURITY, ErrorKind::Ledger(LedgerErrorKind::SecurityDenied)),
    (LEDGER_NOT_FOUND, ErrorKind::Ledger(LedgerErrorKind::NotFound)),
    (TRANSACTION_NOT_ALLOWED, ErrorKind::Ledger(LedgerErrorKind::TransactionNotAllowed)),
    (ANONCREDS_REVOCATION_REGISTRY_FULL, ErrorKind::Credential(CredentialErrorKind::RevocationRegistryFull)),
    (ANONCREDS_INVALID_USER_REVOC_ID, ErrorKind::Credential(CredentialErrorKind::InvalidUserRevocId)),
    (ANONCREDS_MASTER_SECRET_DUPLICATE, ErrorKind::Credential(CredentialErrorKind::DuplicateMasterSecret)),
    (ANONCREDS_PROOF_REJECTED, ErrorKind::Credential(CredentialErrorKind::ProofRejected)),
    (ANONCREDS_CREDENTIAL_REVOKED, ErrorKind::Credential(CredentialErrorKind::Revoked)),
    (ANONCREDS_CRED_DEF_ALREADY_EXISTS, ErrorKind::Credential(CredentialErrorKind::CredDefAlreadyExists)),
    (UNKNOWN_CRYPTO_TYPE, ErrorKind::Crypto(CryptoErrorKind::UnknownKeyFormat)),
    (COMMAND_TIMEOUT, ErrorKind::Timeout),
];

/// Classifies a native status code. Never fails.
///
/// `SUCCESS` is not an error; callers branch on it before classifying. If it
/// does reach here it comes back as `Unknown(0)`.
pub fn classify(code: i32) -> ErrorKind {
    match code {
        100..=111 => ErrorKind::InvalidParameter { index: Some((code - INVALID_PARAM_1 + 1) as u32) },
        115..=129 => ErrorKind::InvalidParameter { index: Some((code - INVALID_PARAM_13 + 13) as u32) },
        _ => TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
            .unwrap_or(ErrorKind::Unknown(code)),
    }
}

impl ErrorKind {
    /// The canonical native code for this kind.
    pub fn native_code(&self) -> i32 {
        match *self {
            ErrorKind::InvalidParameter { index: Some(i @ 1..=12) } => INVALID_PARAM_1 + i as i32 - 1,
            ErrorKind::InvalidParameter { index: Some(i @ 13..=27) } => INVALID_PARAM_13 + i as i32 - 13,
            ErrorKind::InvalidParameter { .. } => INVALID_STRUCTURE,
            ErrorKind::Unknown(code) => code,
            kind => TABLE
                .iter()
                .find(|(_, k)| *k == kind)
                .map(|(c, _)| *c)
                .unwrap_or(INVALID_STATE),
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter { index: Some(i) } => write!(f, "Invalid parameter {}", i),
            Self::InvalidParameter { index: None } => write!(f, "Invalid structure"),
            Self::InvalidState => write!(f, "Invalid state"),
            Self::Io => write!(f, "IO error"),
            Self::Wallet(k) => write!(f, "Wallet error: {:?}", k),
            Self::Pool(k) => write!(f, "Pool error: {:?}", k),
            Self::Ledger(k) => write!(f, "Ledger error: {:?}", k),
            Self::Credential(k) => write!(f, "Credential error: {:?}", k),
            Self::Crypto(k) => write!(f, "Crypto error: {:?}", k),
            Self::Timeout => write!(f, "Timed out waiting for completion"),
            Self::Unknown(code) => write!(f, "Unknown error code {}", code),
        }
    }
}

/// Anything that can report the native layer's detail for the most recent
/// failure on the calling thread, as a JSON object
/// `{"message": "...", "backtrace": "..."}`.
pub trait ErrorSource: Send + Sync {
    fn current_error(&self) -> Option<String>;
}

/// An error source that never has detail to offer.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDetail;

impl ErrorSource for NoDetail {
    fn current_error(&self) -> Option<String> {
        None
    }
}

#[derive(Deserialize)]
struct NativeDetail {
    message: String,
    backtrace: Option<String>,
}

/// Flattened view of an error for reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    pub native_code: i32,
    pub backtrace: Option<String>,
}

/// A classified failure: kind, original native code, and whatever detail
/// was available when it was observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    code: i32,
    message: String,
    backtrace: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.native_code(),
            message: message.into(),
            backtrace: None,
        }
    }

    /// Classifies `code` without consulting any native detail.
    pub fn from_code(code: i32) -> Self {
        let kind = classify(code);
        Self {
            kind,
            code,
            message: kind.to_string(),
            backtrace: None,
        }
    }

    /// Classifies `code` and reads the native detail right away.
    ///
    /// Must be called on the thread that observed the failure.
    pub fn capture(code: i32, source: &dyn ErrorSource) -> Self {
        let mut error = Self::from_code(code);
        let Some(json) = source.current_error() else { return error };

        match serde_json::from_str::<NativeDetail>(&json) {
            Ok(detail) => {
                error.message = detail.message;
                error.backtrace = detail.backtrace;
            }
            Err(e) => {
                tracing::debug!(code, error = %e, "unparseable native error detail");
            }
        }
        error
    }

    pub fn invalid_param(index: u32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameter { index: Some(index) }, message)
    }

    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameter { index: None }, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn without_backtrace(mut self) -> Self {
        self.backtrace = None;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backtrace(&self) -> Option<&str> {
        self.backtrace.as_deref()
    }

    pub fn describe(&self) -> ErrorDetails {
        ErrorDetails {
            message: self.message.clone(),
            native_code: self.code,
            backtrace: self.backtrace.clone(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {}): {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_structure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
