//! # certsmith — certificate authority & issuance core
//!
//! certsmith is the certificate engine of a secret-management service: it
//! generates RSA key pairs, builds and signs X.509 certificates (self-signed
//! or CA-signed), manages a CA's active and transitional signing versions
//! during key rotation, and introspects previously issued certificates so
//! they can be regenerated with their original parameters.
//!
//! Everything is built on the RustCrypto stack (`x509-cert`, `der`, `rsa`);
//! all key and certificate material crosses the API boundary as PEM text.
//!
//! ## Issuing a self-signed certificate
//!
//! ```rust,no_run
//! use certsmith::{
//!     cert::params::{CertificateGenerationParameters, DistinguishedName},
//!     clock::SystemClock,
//!     key::{KeyPairGenerator, OsKeyPairGenerator},
//!     signer::CertificateSigner,
//! };
//!
//! # fn main() -> Result<(), certsmith::error::Error> {
//! let key_pair = OsKeyPairGenerator::default().generate_key_pair(2048)?;
//!
//! let params = CertificateGenerationParameters::builder()
//!     .subject(
//!         DistinguishedName::builder()
//!             .common_name("example.com".to_string())
//!             .organization("Example Corp".to_string())
//!             .build(),
//!     )
//!     .duration_days(365)
//!     .self_signed(true)
//!     .build();
//!
//! let signer = CertificateSigner::new(SystemClock);
//! let certificate = signer.sign_self_signed(&params, &key_pair)?;
//! println!("{}", certificate.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Issuing through the engine
//!
//! The [`engine::CertificateIssuanceEngine`] adds the full issuance policy:
//! key generation, minimum-duration enforcement, and selection of the CA
//! version that signs (active, or transitional mid-rotation).
//!
//! ```rust,no_run
//! use certsmith::{
//!     authority::{CaVersion, CertificateAuthorityService},
//!     cert::params::{CertificateGenerationParameters, DistinguishedName, DurationPolicy},
//!     engine::CertificateIssuanceEngine,
//!     error::Result,
//! };
//!
//! struct InMemoryAuthority {
//!     root: CaVersion,
//! }
//!
//! impl CertificateAuthorityService for InMemoryAuthority {
//!     fn find_active_version(&self, _ca_name: &str) -> Result<CaVersion> {
//!         Ok(self.root.clone())
//!     }
//!
//!     fn find_transitional_version(&self, _ca_name: &str) -> Result<Option<CaVersion>> {
//!         Ok(None)
//!     }
//! }
//!
//! # fn load_root() -> CaVersion { unimplemented!() }
//! # fn main() -> Result<()> {
//! let engine = CertificateIssuanceEngine::new(
//!     InMemoryAuthority { root: load_root() },
//!     DurationPolicy {
//!         ca_minimum_days: 3650,
//!         leaf_minimum_days: 365,
//!     },
//! );
//!
//! let request = CertificateGenerationParameters::builder()
//!     .subject(
//!         DistinguishedName::builder()
//!             .common_name("internal.example".to_string())
//!             .build(),
//!     )
//!     .ca_name("/root-ca".to_string())
//!     .build();
//!
//! let credential = engine.issue(&request)?;
//! println!("{}", credential.certificate);
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading an existing certificate
//!
//! ```rust,no_run
//! use certsmith::cert::params::CertificateGenerationParameters;
//! use certsmith::reader::CertificateReader;
//!
//! # fn main() -> Result<(), certsmith::error::Error> {
//! let pem = std::fs::read_to_string("leaf.pem").expect("read certificate");
//! let reader = CertificateReader::from_pem(&pem)?;
//!
//! println!("common name: {:?}", reader.common_name());
//! println!("expires: {}", reader.not_after());
//! println!("key usage: {:?}", reader.key_usage_tokens()?);
//!
//! // Rebuild the generation request for regeneration; SANs and usages are
//! // carried over exactly as issued.
//! let params = CertificateGenerationParameters::from_certificate(
//!     &reader,
//!     Some("/root-ca".to_string()),
//! )?;
//! # let _ = params;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module organization
//!
//! - [`key`]: RSA key pair generation, PEM import/export, signing
//! - [`serial`]: random certificate serial numbers
//! - [`clock`]: injectable time source
//! - [`cert`]: certificate values, extension codecs, generation parameters
//! - [`reader`]: parsed view over an existing PEM certificate
//! - [`signer`]: certificate construction and signing
//! - [`authority`]: CA version lookup and transitional-trust selection
//! - [`engine`]: end-to-end issuance
//! - [`error`]: crate-wide error taxonomy

pub mod authority;
pub mod cert;
pub mod clock;
pub mod engine;
pub mod error;
pub mod key;
pub mod reader;
pub mod serial;
pub mod signer;
mod tbs_certificate;
