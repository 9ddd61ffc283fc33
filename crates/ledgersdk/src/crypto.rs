//! Wallet keys, signatures and message encryption.
//!
//! Messages, signatures and ciphertexts cross the boundary as raw bytes; an
//! empty buffer is rejected like a blank string.

use ledgercore::HandleKind;
use ledgercore::Result;

use crate::facade::Facade;
use crate::handles::WalletHandle;
use crate::operation::Operation;
use crate::operation::Param;

const WALLET: Param = Param::Handle("wallet_handle", HandleKind::Wallet);
const VERKEY: Param = Param::Text("verkey");

const CREATE_KEY: Operation = Operation::new("indy_create_key", &[WALLET, Param::Json("key_json")]);
const SET_KEY_METADATA: Operation = Operation::new("indy_set_key_metadata", &[WALLET, VERKEY, Param::Text("metadata")]);
const GET_KEY_METADATA: Operation = Operation::new("indy_get_key_metadata", &[WALLET, VERKEY]);
const SIGN: Operation = Operation::new(
    "indy_crypto_sign",
    &[WALLET, Param::Text("signer_vk"), Param::Bytes("message")],
);
const VERIFY: Operation = Operation::new(
    "indy_crypto_verify",
    &[Param::Text("signer_vk"), Param::Bytes("message"), Param::Bytes("signature")],
);
const AUTH_CRYPT: Operation = Operation::new(
    "indy_crypto_auth_crypt",
    &[WALLET, Param::Text("sender_vk"), Param::Text("recipient_vk"), Param::Bytes("message")],
);
const AUTH_DECRYPT: Operation = Operation::new(
    "indy_crypto_auth_decrypt",
    &[WALLET, Param::Text("recipient_vk"), Param::Bytes("encrypted_message")],
);
const ANON_CRYPT: Operation = Operation::new(
    "indy_crypto_anon_crypt",
    &[Param::Text("recipient_vk"), Param::Bytes("message")],
);
const ANON_DECRYPT: Operation = Operation::new(
    "indy_crypto_anon_decrypt",
    &[WALLET, Param::Text("recipient_vk"), Param::Bytes("encrypted_message")],
);
const PACK_MESSAGE: Operation = Operation::new(
    "indy_pack_message",
    &[WALLET, Param::Bytes("message"), Param::Json("receiver_keys"), Param::OptText("sender_vk")],
);
const UNPACK_MESSAGE: Operation = Operation::new("indy_unpack_message", &[WALLET, Param::Bytes("jwe")]);

#[derive(Clone, Debug)]
pub struct CryptoFacade {
    facade: Facade,
}

impl CryptoFacade {
    pub fn new(facade: Facade) -> Self {
        Self { facade }
    }

    /// Creates a key pair in the wallet. Returns the verkey.
    pub async fn create_key(&self, wallet: WalletHandle, key_info: &str) -> Result<String> {
        self.facade.call(&CREATE_KEY, vec![wallet.into(), key_info.into()]).await
    }

    pub async fn set_key_metadata(&self, wallet: WalletHandle, verkey: &str, metadata: &str) -> Result<()> {
        self.facade
            .call(&SET_KEY_METADATA, vec![wallet.into(), verkey.into(), metadata.into()])
            .await
    }

    pub async fn get_key_metadata(&self, wallet: WalletHandle, verkey: &str) -> Result<String> {
        self.facade.call(&GET_KEY_METADATA, vec![wallet.into(), verkey.into()]).await
    }

    pub async fn sign(&self, wallet: WalletHandle, signer_vk: &str, message: &[u8]) -> Result<Vec<u8>> {
        self.facade
            .call(&SIGN, vec![wallet.into(), signer_vk.into(), message.into()])
            .await
    }

    /// Checks `signature` over `message`. A well-formed but wrong signature
    /// is `Ok(false)`, not an error.
    pub async fn verify(&self, signer_vk: &str, message: &[u8], signature: &[u8]) -> Result<bool> {
        self.facade
            .call(&VERIFY, vec![signer_vk.into(), message.into(), signature.into()])
            .await
    }

    pub async fn auth_crypt(&self, wallet: WalletHandle, sender_vk: &str, recipient_vk: &str, message: &[u8]) -> Result<Vec<u8>> {
        let args = vec![wallet.into(), sender_vk.into(), recipient_vk.into(), message.into()];
        self.facade.call(&AUTH_CRYPT, args).await
    }

    /// Decrypts an authenticated message. Returns `(sender_vk, message)`.
    pub async fn auth_decrypt(&self, wallet: WalletHandle, recipient_vk: &str, encrypted: &[u8]) -> Result<(String, Vec<u8>)> {
        self.facade
            .call(&AUTH_DECRYPT, vec![wallet.into(), recipient_vk.into(), encrypted.into()])
            .await
    }

    pub async fn anon_crypt(&self, recipient_vk: &str, message: &[u8]) -> Result<Vec<u8>> {
        self.facade.call(&ANON_CRYPT, vec![recipient_vk.into(), message.into()]).await
    }

    pub async fn anon_decrypt(&self, wallet: WalletHandle, recipient_vk: &str, encrypted: &[u8]) -> Result<Vec<u8>> {
        self.facade
            .call(&ANON_DECRYPT, vec![wallet.into(), recipient_vk.into(), encrypted.into()])
            .await
    }

    /// Packs `message` for `receiver_keys` (a JSON array of verkeys).
    /// Without `sender_vk` the message is packed anonymously.
    pub async fn pack_message(&self, wallet: WalletHandle, message: &[u8], receiver_keys: &str, sender_vk: Option<&str>) -> Result<Vec<u8>> {
        let args = vec![wallet.into(), message.into(), receiver_keys.into(), sender_vk.into()];
        self.facade.call(&PACK_MESSAGE, args).await
    }

    /// Returns the unpacked JSON document (`message`, `recipient_verkey`,
    /// `sender_verkey`) as bytes.
    pub async fn unpack_message(&self, wallet: WalletHandle, jwe: &[u8]) -> Result<Vec<u8>> {
        self.facade.call(&UNPACK_MESSAGE, vec![wallet.into(), jwe.into()]).await
    }
}
