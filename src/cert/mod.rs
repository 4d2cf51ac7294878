pub mod extensions;
pub mod params;

use der::{Encode, EncodePem};
use x509_cert::certificate::CertificateInner;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::error::{Error, Result};

/// Signature algorithms this core understands.
///
/// Issuance always signs SHA-256 with RSA; the other digests exist so that
/// externally produced CA certificates can still be verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha256WithRsa,
    Sha384WithRsa,
    Sha512WithRsa,
}

impl SignatureAlgorithm {
    /// Maps a signature algorithm OID to a supported algorithm, or `None`
    /// for anything outside the RSA family.
    pub fn from_oid(oid: const_oid::ObjectIdentifier) -> Option<Self> {
        match oid {
            const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION => Some(Self::Sha256WithRsa),
            const_oid::db::rfc5912::SHA_384_WITH_RSA_ENCRYPTION => Some(Self::Sha384WithRsa),
            const_oid::db::rfc5912::SHA_512_WITH_RSA_ENCRYPTION => Some(Self::Sha512WithRsa),
            _ => None,
        }
    }
}

impl From<SignatureAlgorithm> for AlgorithmIdentifierOwned {
    fn from(value: SignatureAlgorithm) -> Self {
        let oid = match value {
            SignatureAlgorithm::Sha256WithRsa => const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha384WithRsa => const_oid::db::rfc5912::SHA_384_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha512WithRsa => const_oid::db::rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
        };
        // RSA signature algorithm identifiers carry an explicit NULL parameter.
        AlgorithmIdentifierOwned {
            oid,
            parameters: Some(der::Any::from(der::AnyRef::NULL)),
        }
    }
}

/// A signed X.509 certificate produced by this core.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encode the certificate as DER bytes.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| Error::Encoding(e.to_string()))
    }

    /// Encode the certificate as a PEM string.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| Error::Encoding(e.to_string()))
    }
}
