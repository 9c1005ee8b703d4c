//! Decryption of sealed envelopes with the fixture private key

#![allow(dead_code)]

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Oaep, RsaPrivateKey};
use sha2::Sha256;

pub const KEY_PEM: &str = include_str!("../fixtures/key.pem");

const NONCE_SIZE: usize = 12;

/// Open an envelope sealed for `label`, or `None` if it does not decrypt
pub fn open_envelope(envelope_b64: &str, label: &str) -> Option<String> {
    let key = RsaPrivateKey::from_pkcs8_pem(KEY_PEM).expect("fixture key parses");
    let envelope = BASE64.decode(envelope_b64).ok()?;

    let wrapped_len = u16::from_be_bytes([*envelope.first()?, *envelope.get(1)?]) as usize;
    let wrapped = envelope.get(2..2 + wrapped_len)?;
    let nonce = envelope.get(2 + wrapped_len..2 + wrapped_len + NONCE_SIZE)?;
    let ciphertext = envelope.get(2 + wrapped_len + NONCE_SIZE..)?;

    let padding = if label.is_empty() {
        Oaep::new::<Sha256>()
    } else {
        Oaep::new_with_label::<Sha256, _>(label)
    };
    let session_key = key.decrypt(padding, wrapped).ok()?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&session_key));
    let plaintext = cipher.decrypt(Nonce::from_slice(nonce), ciphertext).ok()?;
    String::from_utf8(plaintext).ok()
}
