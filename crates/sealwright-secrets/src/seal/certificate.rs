//! Sealing certificate parsing and introspection

use chrono::{DateTime, Utc};
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use sealwright_core::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use x509_cert::der::{Decode, Encode};
use x509_cert::time::Time;
use x509_cert::Certificate;

const PEM_LABEL: &str = "CERTIFICATE";

/// Public certificate of the decrypting controller
#[derive(Debug, Clone)]
pub struct SealingCertificate {
    public_key: RsaPublicKey,
    fingerprint: String,
    subject: String,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl SealingCertificate {
    /// Parse a PEM-encoded RSA certificate
    pub fn from_pem(pem: &str) -> Result<Self> {
        let (label, der) = x509_cert::der::pem::decode_vec(pem.as_bytes())
            .map_err(|e| Error::crypto(format!("invalid PEM certificate: {e}")))?;
        if label != PEM_LABEL {
            return Err(Error::crypto(format!(
                "expected a {PEM_LABEL} PEM block, found {label}"
            )));
        }

        let cert = Certificate::from_der(&der)
            .map_err(|e| Error::crypto(format!("invalid X.509 certificate: {e}")))?;
        let tbs = &cert.tbs_certificate;

        let spki = tbs
            .subject_public_key_info
            .to_der()
            .map_err(|e| Error::crypto(format!("invalid subject public key: {e}")))?;
        let public_key = RsaPublicKey::from_public_key_der(&spki)
            .map_err(|e| Error::crypto(format!("certificate key is not RSA: {e}")))?;

        Ok(Self {
            public_key,
            fingerprint: hex::encode(Sha256::digest(&der)),
            subject: tbs.subject.to_string(),
            not_before: to_utc(&tbs.validity.not_before)?,
            not_after: to_utc(&tbs.validity.not_after)?,
        })
    }

    /// Load a certificate file
    pub fn load(path: &Path) -> Result<Self> {
        let pem = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(format!("certificate {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_pem(&pem)
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Lowercase hex SHA-256 of the DER encoding
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime<Utc> {
        self.not_after
    }

    /// Whole days until `notAfter`; negative once expired
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.not_after - now).num_days()
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }
}

fn to_utc(time: &Time) -> Result<DateTime<Utc>> {
    let since_epoch = time.to_unix_duration();
    i64::try_from(since_epoch.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| Error::crypto("certificate validity is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rsa::traits::PublicKeyParts;
    use sealwright_core::ErrorKind;

    const CERT: &str = include_str!("../../tests/fixtures/cert.pem");
    const KEY: &str = include_str!("../../tests/fixtures/key.pem");

    #[test]
    fn test_parse_fixture() {
        let cert = SealingCertificate::from_pem(CERT).unwrap();
        assert_eq!(
            cert.fingerprint(),
            "93fa217a806861d9c309793ac4cccb3aaf42bee248c9ddaac43792ffd510318c"
        );
        assert!(cert.subject().contains("CN=sealed-secret"));
        assert_eq!(cert.public_key().size(), 256);
        assert_eq!(
            cert.not_before(),
            Utc.with_ymd_and_hms(2026, 10, 19, 15, 11, 14).unwrap()
        );
        assert_eq!(
            cert.not_after(),
            Utc.with_ymd_and_hms(2036, 10, 16, 15, 11, 14).unwrap()
        );
    }

    #[test]
    fn test_validity_window() {
        let cert = SealingCertificate::from_pem(CERT).unwrap();
        let inside = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2040, 1, 1, 0, 0, 0).unwrap();

        assert!(cert.is_valid_at(inside));
        assert!(!cert.is_valid_at(before));
        assert!(!cert.is_valid_at(after));

        let ten_days_left = cert.not_after() - chrono::Duration::days(10);
        assert_eq!(cert.days_until_expiry(ten_days_left), 10);
        assert!(cert.days_until_expiry(after) < 0);
    }

    #[test]
    fn test_rejects_non_certificate_pem() {
        let err = SealingCertificate::from_pem(KEY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
        let err = SealingCertificate::from_pem("not pem").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SealingCertificate::load(&dir.path().join("cert.pem")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
