//! Random value generation for `generated` rotation

use crate::security::SecureString;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{Rng, RngCore};
use sealwright_core::types::{GeneratorKind, GeneratorSpec};
use sealwright_core::{Error, Result};
use zeroize::Zeroizing;

/// Password alphabet; URL-safe so values can be embedded in connection strings
const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.~";

/// Produce a fresh value for a generator specification
///
/// `length` counts characters for `password` and `hex`, and random bytes for
/// `base64`. It is ignored for `uuid`.
pub fn generate(spec: &GeneratorSpec) -> Result<SecureString> {
    let length = spec.length();
    if length == 0 {
        return Err(Error::validation(
            "rotation.generator.length",
            "must be greater than zero",
        ));
    }

    let mut rng = rand::rng();
    let value = match spec.generator_kind()? {
        GeneratorKind::Password => (0..length)
            .map(|_| PASSWORD_CHARSET[rng.random_range(0..PASSWORD_CHARSET.len())] as char)
            .collect(),
        GeneratorKind::Hex => {
            let mut bytes = Zeroizing::new(vec![0u8; length.div_ceil(2)]);
            rng.fill_bytes(bytes.as_mut_slice());
            let mut encoded = hex::encode(bytes.as_slice());
            encoded.truncate(length);
            encoded
        }
        GeneratorKind::Base64 => {
            let mut bytes = Zeroizing::new(vec![0u8; length]);
            rng.fill_bytes(bytes.as_mut_slice());
            BASE64.encode(bytes.as_slice())
        }
        GeneratorKind::Uuid => uuid::Uuid::new_v4().to_string(),
    };

    Ok(SecureString::new(value))
}
