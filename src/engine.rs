use tracing::debug;

use crate::authority::{resolve_signing_material, CertificateAuthorityService};
use crate::cert::params::{
    CertificateGenerationParameters, DurationPolicy, FlooredParameters,
};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::key::{KeyPairGenerator, OsKeyPairGenerator, RsaKeyPair};
use crate::reader::CertificateReader;
use crate::signer::CertificateSigner;

/// The result of one issuance: a fully formed certificate credential.
///
/// Either every field is valid or nothing was issued; there is no
/// half-issued state.
#[derive(Debug, Clone)]
pub struct CertificateCredentialValue {
    /// The CA chain PEM. Equals `certificate` for self-signed certs.
    pub ca: String,
    /// The leaf certificate PEM.
    pub certificate: String,
    /// The leaf private key PEM.
    pub private_key: String,
    /// Name of the signing CA; absent for self-signed certs.
    pub ca_name: Option<String>,
    /// Certificate of the CA version that did *not* sign this leaf, when a
    /// rotation is in progress, so clients can trust both chains.
    pub trusted_ca: Option<String>,
    /// Whether the leaf itself is a CA.
    pub certificate_authority: bool,
    pub self_signed: bool,
    /// Always true for freshly issued credentials.
    pub generated: bool,
    /// Whether the duration floor raised the requested validity.
    pub duration_overridden: bool,
    /// Effective validity in days.
    pub duration_days: u32,
}

/// Orchestrates key generation, CA resolution, and signing into a single
/// synchronous issuance. Stateless per request; no retries happen here.
pub struct CertificateIssuanceEngine<A, G = OsKeyPairGenerator, C = SystemClock>
where
    A: CertificateAuthorityService,
    G: KeyPairGenerator,
    C: Clock,
{
    authority: A,
    key_generator: G,
    signer: CertificateSigner<C>,
    policy: DurationPolicy,
}

impl<A: CertificateAuthorityService> CertificateIssuanceEngine<A> {
    pub fn new(authority: A, policy: DurationPolicy) -> Self {
        Self::with_components(authority, OsKeyPairGenerator::default(), SystemClock, policy)
    }
}

impl<A, G, C> CertificateIssuanceEngine<A, G, C>
where
    A: CertificateAuthorityService,
    G: KeyPairGenerator,
    C: Clock,
{
    pub fn with_components(authority: A, key_generator: G, clock: C, policy: DurationPolicy) -> Self {
        Self {
            authority,
            key_generator,
            signer: CertificateSigner::new(clock),
            policy,
        }
    }

    /// Issue a certificate credential for the given request.
    pub fn issue(
        &self,
        request: &CertificateGenerationParameters,
    ) -> Result<CertificateCredentialValue> {
        request.validate()?;

        let key_pair = self.key_generator.generate_key_pair(request.key_length)?;
        let FlooredParameters {
            parameters,
            duration_overridden,
        } = request.with_duration_floor(&self.policy);
        if duration_overridden {
            debug!(
                requested = request.duration_days,
                effective = parameters.duration_days,
                "duration raised to satisfy the minimum-validity policy"
            );
        }
        let private_key = key_pair.private_key_to_pem()?;

        if parameters.self_signed {
            let certificate = self
                .signer
                .sign_self_signed(&parameters, &key_pair)?
                .to_pem()?;
            debug!(is_ca = parameters.is_ca, "issued self-signed certificate");
            return Ok(CertificateCredentialValue {
                ca: certificate.clone(),
                certificate,
                private_key,
                ca_name: None,
                trusted_ca: None,
                certificate_authority: parameters.is_ca,
                self_signed: true,
                generated: true,
                duration_overridden,
                duration_days: parameters.duration_days,
            });
        }

        let ca_name = parameters.ca_name.clone().ok_or_else(|| {
            Error::InvalidInput("a CA-signed certificate must name its signing CA".to_string())
        })?;
        let material = resolve_signing_material(
            &self.authority,
            &ca_name,
            parameters.allow_transitional_parent_to_sign,
        )?;
        let issuer_certificate = CertificateReader::from_pem(&material.certificate)?;
        let issuer_key = RsaKeyPair::from_private_key_pem(&material.private_key)?;

        let certificate = self
            .signer
            .sign_with_issuer(&parameters, &key_pair, &issuer_certificate, &issuer_key)?
            .to_pem()?;
        debug!(%ca_name, is_ca = parameters.is_ca, "issued CA-signed certificate");

        Ok(CertificateCredentialValue {
            ca: material.certificate,
            certificate,
            private_key,
            ca_name: Some(ca_name),
            trusted_ca: material.trusted_certificate,
            certificate_authority: parameters.is_ca,
            self_signed: false,
            generated: true,
            duration_overridden,
            duration_days: parameters.duration_days,
        })
    }
}
