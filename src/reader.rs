use const_oid::AssociatedOid;
use der::{Decode, Encode};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256, Sha384, Sha512};
use time::OffsetDateTime;
use x509_cert::certificate::{CertificateInner, TbsCertificateInner};
use x509_cert::name::Name;

use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName,
    SubjectKeyIdentifier, ToAndFromX509Extension,
};
use crate::cert::params::DistinguishedName;
use crate::cert::SignatureAlgorithm;
use crate::error::{Error, Result};

/// Outcome of a signature verification.
///
/// A failed verification is a value, not an error: only genuine parse or
/// I/O problems surface as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Verified,
    Mismatch,
}

/// A parsed view over a PEM certificate.
///
/// Parsing happens once at construction; every accessor afterwards is pure,
/// so reading the same PEM twice always yields identical results.
#[derive(Debug, Clone)]
pub struct CertificateReader {
    certificate: CertificateInner,
}

impl CertificateReader {
    /// Parse a PEM certificate.
    ///
    /// Blank input fails with [`Error::MissingCertificate`]; input without a
    /// CERTIFICATE block fails with [`Error::MalformedCertificate`]; a block
    /// whose contents are not a DER certificate fails with
    /// [`Error::UnreadableCertificate`].
    pub fn from_pem(pem_text: &str) -> Result<Self> {
        if pem_text.trim().is_empty() {
            return Err(Error::MissingCertificate);
        }
        let blocks = pem::parse_many(pem_text).map_err(|_| Error::MalformedCertificate)?;
        let block = blocks
            .into_iter()
            .find(|block| block.tag() == "CERTIFICATE")
            .ok_or(Error::MalformedCertificate)?;
        let certificate = CertificateInner::from_der(block.contents())
            .map_err(|e| Error::UnreadableCertificate(e.to_string()))?;
        Ok(Self { certificate })
    }

    fn tbs(&self) -> &TbsCertificateInner {
        &self.certificate.tbs_certificate
    }

    /// The subject DN, split into the attributes this core understands.
    pub fn subject_name(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.tbs().subject)
    }

    /// The issuer DN, split into the attributes this core understands.
    pub fn issuer_name(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.tbs().issuer)
    }

    /// The raw X.500 subject name, as placed into certificates this
    /// certificate issues.
    pub fn subject_x509_name(&self) -> &Name {
        &self.tbs().subject
    }

    pub fn common_name(&self) -> Option<String> {
        self.subject_name().common_name
    }

    pub fn organization(&self) -> Option<String> {
        self.subject_name().organization
    }

    pub fn organization_unit(&self) -> Option<String> {
        self.subject_name().organization_unit
    }

    pub fn locality(&self) -> Option<String> {
        self.subject_name().locality
    }

    pub fn state(&self) -> Option<String> {
        self.subject_name().state
    }

    pub fn country(&self) -> Option<String> {
        self.subject_name().country
    }

    fn extension_value(&self, oid: der::oid::ObjectIdentifier) -> Option<&[u8]> {
        self.tbs()
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.extn_id == oid)
            .map(|ext| ext.extn_value.as_bytes())
    }

    /// The Subject Alternative Name extension, or `None` if absent.
    pub fn alternative_names(&self) -> Result<Option<SubjectAltName>> {
        self.extension_value(SubjectAltName::OID)
            .map(SubjectAltName::from_x509_extension_value)
            .transpose()
    }

    /// The Key Usage extension, or `None` if absent.
    pub fn key_usage(&self) -> Result<Option<KeyUsage>> {
        self.extension_value(KeyUsage::OID)
            .map(KeyUsage::from_x509_extension_value)
            .transpose()
    }

    /// Canonical string tokens for the key usage bits; empty when the
    /// extension is absent.
    pub fn key_usage_tokens(&self) -> Result<Vec<&'static str>> {
        Ok(self.key_usage()?.map(|ku| ku.tokens()).unwrap_or_default())
    }

    /// The Extended Key Usage extension, or `None` if absent.
    pub fn extended_key_usage(&self) -> Result<Option<ExtendedKeyUsage>> {
        self.extension_value(ExtendedKeyUsage::OID)
            .map(ExtendedKeyUsage::from_x509_extension_value)
            .transpose()
    }

    /// Canonical string tokens for recognized extended key usages;
    /// unrecognized purposes are omitted, absent extension yields empty.
    pub fn extended_key_usage_tokens(&self) -> Result<Vec<&'static str>> {
        Ok(self
            .extended_key_usage()?
            .map(|eku| eku.tokens())
            .unwrap_or_default())
    }

    /// The Subject Key Identifier, or `None` if the certificate predates
    /// that extension.
    pub fn subject_key_identifier(&self) -> Result<Option<Vec<u8>>> {
        Ok(self
            .extension_value(SubjectKeyIdentifier::OID)
            .map(SubjectKeyIdentifier::from_x509_extension_value)
            .transpose()?
            .map(|ski| ski.0))
    }

    /// The Authority Key Identifier's key-identifier field, or `None` when
    /// the extension (or the field) is absent.
    pub fn authority_key_identifier(&self) -> Result<Option<Vec<u8>>> {
        Ok(self
            .extension_value(AuthorityKeyIdentifier::OID)
            .map(AuthorityKeyIdentifier::from_x509_extension_value)
            .transpose()?
            .map(|aki| aki.key_identifier))
    }

    /// Whether the certificate claims to be a CA.
    ///
    /// This reads the BasicConstraints extension only; an absent extension
    /// means `false`, and no signature check backs the claim. Whether the
    /// claim is trustworthy is the calling system's decision.
    pub fn is_ca(&self) -> Result<bool> {
        Ok(self
            .extension_value(BasicConstraints::OID)
            .map(BasicConstraints::from_x509_extension_value)
            .transpose()?
            .map(|bc| bc.is_ca)
            .unwrap_or(false))
    }

    /// RSA modulus bit length of the certificate's public key.
    pub fn key_length(&self) -> Result<u32> {
        Ok((self.rsa_public_key()?.size() * 8) as u32)
    }

    /// Whole days between notBefore and notAfter.
    pub fn duration_days(&self) -> i64 {
        (self.not_after() - self.not_before()).whole_days()
    }

    pub fn not_before(&self) -> OffsetDateTime {
        decode_time(&self.tbs().validity.not_before)
    }

    pub fn not_after(&self) -> OffsetDateTime {
        decode_time(&self.tbs().validity.not_after)
    }

    /// The certificate serial number as lowercase hex.
    pub fn serial_number_hex(&self) -> String {
        self.tbs()
            .serial_number
            .as_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// True iff issuer DN equals subject DN and the certificate's signature
    /// verifies against its own public key. A DN match alone is not enough:
    /// a forged issuer name without a valid self-signature reads as false.
    pub fn is_self_signed(&self) -> Result<bool> {
        if self.tbs().issuer != self.tbs().subject {
            return Ok(false);
        }
        let own_key = self.rsa_public_key()?;
        Ok(self.verify_signature(&own_key)? == SignatureCheck::Verified)
    }

    /// True iff this certificate's signature verifies against the public
    /// key of the given CA certificate. A signature mismatch is `false`;
    /// parse failures of either certificate still propagate as errors.
    pub fn is_signed_by(&self, ca_pem: &str) -> Result<bool> {
        let ca = CertificateReader::from_pem(ca_pem)?;
        let ca_key = ca.rsa_public_key()?;
        Ok(self.verify_signature(&ca_key)? == SignatureCheck::Verified)
    }

    /// Verify the certificate's signature against a candidate issuer key.
    pub fn verify_signature(&self, issuer_key: &RsaPublicKey) -> Result<SignatureCheck> {
        let algorithm = SignatureAlgorithm::from_oid(self.certificate.signature_algorithm.oid)
            .ok_or_else(|| {
                Error::UnreadableCertificate(format!(
                    "unsupported signature algorithm {}",
                    self.certificate.signature_algorithm.oid
                ))
            })?;
        let message = self.tbs().to_der()?;
        let signature = self
            .certificate
            .signature
            .as_bytes()
            .ok_or_else(|| Error::UnreadableCertificate("unaligned signature".to_string()))?;

        Ok(match algorithm {
            SignatureAlgorithm::Sha256WithRsa => {
                verify_with_digest::<Sha256>(issuer_key, &message, signature)
            }
            SignatureAlgorithm::Sha384WithRsa => {
                verify_with_digest::<Sha384>(issuer_key, &message, signature)
            }
            SignatureAlgorithm::Sha512WithRsa => {
                verify_with_digest::<Sha512>(issuer_key, &message, signature)
            }
        })
    }

    fn rsa_public_key(&self) -> Result<RsaPublicKey> {
        let spki_der = self.tbs().subject_public_key_info.to_der()?;
        RsaPublicKey::from_public_key_der(&spki_der)
            .map_err(|_| Error::UnreadableCertificate("subject public key is not RSA".to_string()))
    }
}

fn verify_with_digest<D>(key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> SignatureCheck
where
    D: Digest + AssociatedOid,
{
    let verifying_key = VerifyingKey::<D>::new(key.clone());
    let Ok(signature) = Signature::try_from(signature) else {
        return SignatureCheck::Mismatch;
    };
    match verifying_key.verify(message, &signature) {
        Ok(()) => SignatureCheck::Verified,
        Err(_) => SignatureCheck::Mismatch,
    }
}

fn decode_time(time: &x509_cert::time::Time) -> OffsetDateTime {
    match time {
        x509_cert::time::Time::UtcTime(utc) => OffsetDateTime::from(utc.to_system_time()),
        x509_cert::time::Time::GeneralTime(general) => {
            OffsetDateTime::from(general.to_system_time())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_missing() {
        assert!(matches!(
            CertificateReader::from_pem("").unwrap_err(),
            Error::MissingCertificate
        ));
        assert!(matches!(
            CertificateReader::from_pem("   \n").unwrap_err(),
            Error::MissingCertificate
        ));
    }

    #[test]
    fn non_certificate_input_is_malformed() {
        assert!(matches!(
            CertificateReader::from_pem("not a cert").unwrap_err(),
            Error::MalformedCertificate
        ));
    }

    #[test]
    fn wrong_block_type_is_malformed() {
        let pem = "-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n";
        assert!(matches!(
            CertificateReader::from_pem(pem).unwrap_err(),
            Error::MalformedCertificate
        ));
    }

    #[test]
    fn garbage_certificate_block_is_unreadable() {
        let pem = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            CertificateReader::from_pem(pem).unwrap_err(),
            Error::UnreadableCertificate(_)
        ));
    }
}
