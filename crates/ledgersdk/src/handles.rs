//! Typed handles.
//!
//! Each wraps a `ResourceHandle` of one fixed kind, so a wallet handle cannot
//! be passed where a pool handle is expected. They are plain `Copy` values:
//! holding one does not keep the native resource alive.

use ledgercore::Error;
use ledgercore::HandleKind;
use ledgercore::NativeArg;
use ledgercore::ResourceHandle;
use ledgercore::Result;

macro_rules! typed_handle {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
        pub struct $name(ResourceHandle);

        impl $name {
            pub const KIND: HandleKind = $kind;

            /// Wraps a tracked handle, checking its kind.
            pub fn try_from_resource(handle: ResourceHandle) -> Result<Self> {
                if handle.kind != Self::KIND {
                    return Err(Error::invalid_state(format!(
                        "{} is not a {} handle",
                        handle,
                        Self::KIND
                    )));
                }
                Ok(Self(handle))
            }

            pub fn id(&self) -> i32 {
                self.0.id
            }

            pub fn resource(&self) -> ResourceHandle {
                self.0
            }
        }

        impl From<$name> for NativeArg {
            fn from(handle: $name) -> Self {
                NativeArg::Handle(handle.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

typed_handle!(
    /// An open connection to a ledger pool.
    PoolHandle => HandleKind::Pool
);
typed_handle!(
    /// An open wallet.
    WalletHandle => HandleKind::Wallet
);
typed_handle!(
    /// A wallet record search. Closing its wallet does not close it.
    SearchHandle => HandleKind::WalletSearch
);
typed_handle!(ConnectionHandle => HandleKind::Connection);
typed_handle!(CredentialHandle => HandleKind::Credential);
typed_handle!(CredentialDefHandle => HandleKind::CredentialDef);
typed_handle!(SchemaHandle => HandleKind::Schema);
typed_handle!(ProofHandle => HandleKind::Proof);
