use der::asn1::BitString;
use der::Encode;
use sha1::{Digest, Sha1};
use time::Duration;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::extensions::SubjectAltName;
use crate::cert::params::CertificateGenerationParameters;
use crate::cert::{Certificate, SignatureAlgorithm};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::key::RsaKeyPair;
use crate::reader::CertificateReader;
use crate::serial::SerialNumberSource;
use crate::tbs_certificate::TbsBuilder;

/// Builds and signs X.509 certificates, self-signed or issued by a CA.
///
/// Extensions are emitted in a fixed order: Subject Key Identifier, Subject
/// Alternative Name, Key Usage, Extended Key Usage, Authority Key
/// Identifier, Basic Constraints. The Authority Key Identifier is present
/// only when the issuer's own key identifier could be resolved.
pub struct CertificateSigner<C: Clock> {
    clock: C,
    serials: SerialNumberSource,
}

impl<C: Clock> CertificateSigner<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            serials: SerialNumberSource,
        }
    }

    /// Sign a certificate with its own subject key: issuer DN equals
    /// subject DN, and the Authority Key Identifier derives from the
    /// subject's own public key.
    pub fn sign_self_signed(
        &self,
        params: &CertificateGenerationParameters,
        subject_key: &RsaKeyPair,
    ) -> Result<Certificate> {
        let subject = params.subject.to_x509_name()?;
        let subject_spki = subject_key.to_spki()?;
        let authority_key_id = Some(key_identifier(&subject_spki));
        self.sign(
            params,
            subject_spki,
            subject.clone(),
            authority_key_id,
            subject_key,
        )
    }

    /// Sign a certificate under the supplied issuer: issuer DN is the
    /// issuer certificate's subject, and the Authority Key Identifier is
    /// the issuer's Subject Key Identifier when that certificate carries
    /// one.
    pub fn sign_with_issuer(
        &self,
        params: &CertificateGenerationParameters,
        subject_key: &RsaKeyPair,
        issuer_certificate: &CertificateReader,
        issuer_key: &RsaKeyPair,
    ) -> Result<Certificate> {
        let issuer = issuer_certificate.subject_x509_name().clone();
        let authority_key_id = issuer_certificate.subject_key_identifier()?;
        self.sign(
            params,
            subject_key.to_spki()?,
            issuer,
            authority_key_id,
            issuer_key,
        )
    }

    fn sign(
        &self,
        params: &CertificateGenerationParameters,
        subject_spki: SubjectPublicKeyInfoOwned,
        issuer: Name,
        authority_key_id: Option<Vec<u8>>,
        signing_key: &RsaKeyPair,
    ) -> Result<Certificate> {
        let not_before = self.clock.now();
        let not_after = not_before + Duration::days(i64::from(params.duration_days));
        let serial = self.serials.next_serial();
        let subject = params.subject.to_x509_name()?;
        let subject_key_id = key_identifier(&subject_spki);

        let mut tbs = TbsBuilder::new(
            serial.to_vec(),
            issuer,
            subject,
            subject_spki,
            not_before,
            not_after,
        );
        tbs.subject_key_identifier(subject_key_id)?;
        if let Some(names) = &params.alternative_names {
            tbs.subject_alternative_name(&SubjectAltName {
                names: names.clone(),
            })?;
        }
        if let Some(key_usage) = params.key_usage {
            tbs.key_usage(key_usage)?;
        }
        if let Some(eku) = &params.extended_key_usage {
            tbs.extended_key_usage(eku)?;
        }
        if let Some(key_id) = authority_key_id {
            tbs.authority_key_identifier(key_id)?;
        }
        tbs.basic_constraints(params.is_ca)?;

        let tbs_certificate = tbs.build()?;
        let message = tbs_certificate.to_der()?;
        let signature = signing_key.sign(&message)?;

        Ok(Certificate {
            inner: CertificateInner {
                tbs_certificate,
                signature_algorithm: SignatureAlgorithm::Sha256WithRsa.into(),
                signature: BitString::from_bytes(&signature)
                    .map_err(|e| Error::Encoding(e.to_string()))?,
            },
        })
    }
}

/// SHA-1 digest of the subject public key bit string, per the usual
/// SKI/AKI derivation.
fn key_identifier(spki: &SubjectPublicKeyInfoOwned) -> Vec<u8> {
    Sha1::digest(spki.subject_public_key.raw_bytes()).to_vec()
}
