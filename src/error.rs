use thiserror::Error;

/// Errors surfaced by the issuance core.
///
/// Every variant is propagated to the caller unmodified; nothing here is
/// retried or silently substituted with a default. Unexpected failures from
/// the underlying crypto libraries are wrapped exactly once as
/// [`Error::Encoding`] or [`Error::Signing`].
#[derive(Debug, Error)]
pub enum Error {
    /// No certificate PEM was supplied at all.
    #[error("no certificate was provided")]
    MissingCertificate,

    /// A certificate block was found but its contents could not be parsed.
    #[error("the certificate could not be read: {0}")]
    UnreadableCertificate(String),

    /// The input parsed as PEM but contained no certificate.
    #[error("the provided input does not contain a certificate")]
    MalformedCertificate,

    /// The named CA exists but has no private key, so it cannot sign.
    /// Typically the CA is externally managed and only its certificate was
    /// imported.
    #[error(
        "the certificate authority `{0}` does not have a private key and cannot sign certificates"
    )]
    CaMissingPrivateKey(String),

    /// A private key PEM was not a recognized key-pair encoding.
    #[error("the private key is not in a supported key pair format")]
    UnsupportedKeyFormat,

    /// A distinguished name with no populated attributes.
    #[error("at least one distinguished name attribute must be set")]
    InvalidDistinguishedName,

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("failed to encode certificate data: {0}")]
    Encoding(String),

    #[error("certificate signing failed: {0}")]
    Signing(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<rsa::Error> for Error {
    fn from(err: rsa::Error) -> Self {
        Error::Signing(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
