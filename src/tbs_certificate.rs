use der::asn1::OctetString;
use time::OffsetDateTime;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;
use x509_cert::Version;

use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAltName,
    SubjectKeyIdentifier, ToAndFromX509Extension,
};
use crate::cert::SignatureAlgorithm;
use crate::error::{Error, Result};

/// Assembles the "to be signed" portion of a certificate.
///
/// This is the one place bound to the `x509-cert` object model: extensions
/// are appended through one method per category, in call order, so the
/// signer controls the exact extension sequence of the emitted certificate.
pub(crate) struct TbsBuilder {
    serial_number: Vec<u8>,
    issuer: Name,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
    subject: Name,
    subject_public_key: SubjectPublicKeyInfoOwned,
    extensions: Vec<Extension>,
}

impl TbsBuilder {
    pub fn new(
        serial_number: Vec<u8>,
        issuer: Name,
        subject: Name,
        subject_public_key: SubjectPublicKeyInfoOwned,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> Self {
        Self {
            serial_number,
            issuer,
            not_before,
            not_after,
            subject,
            subject_public_key,
            extensions: Vec::new(),
        }
    }

    fn push_extension<E: ToAndFromX509Extension>(&mut self, ext: &E, critical: bool) -> Result<()> {
        let value = ext.to_x509_extension_value()?;
        self.extensions.push(Extension {
            extn_id: E::OID,
            critical,
            extn_value: OctetString::new(value)?,
        });
        Ok(())
    }

    /// Subject Key Identifier, non-critical.
    pub fn subject_key_identifier(&mut self, key_id: Vec<u8>) -> Result<()> {
        self.push_extension(&SubjectKeyIdentifier(key_id), false)
    }

    /// Subject Alternative Name, non-critical.
    pub fn subject_alternative_name(&mut self, san: &SubjectAltName) -> Result<()> {
        self.push_extension(san, false)
    }

    /// Key Usage, critical.
    pub fn key_usage(&mut self, key_usage: KeyUsage) -> Result<()> {
        self.push_extension(&key_usage, true)
    }

    /// Extended Key Usage, non-critical.
    pub fn extended_key_usage(&mut self, eku: &ExtendedKeyUsage) -> Result<()> {
        self.push_extension(eku, false)
    }

    /// Authority Key Identifier, non-critical.
    pub fn authority_key_identifier(&mut self, key_id: Vec<u8>) -> Result<()> {
        self.push_extension(&AuthorityKeyIdentifier { key_identifier: key_id }, false)
    }

    /// Basic Constraints, critical.
    pub fn basic_constraints(&mut self, is_ca: bool) -> Result<()> {
        self.push_extension(
            &BasicConstraints {
                is_ca,
                max_path_length: None,
            },
            true,
        )
    }

    pub fn build(self) -> Result<TbsCertificateInner> {
        let serial_number = SerialNumber::new(self.serial_number.as_slice())?;

        let not_before = x509_cert::time::Time::UtcTime(
            der::asn1::UtcTime::from_system_time(self.not_before.into())
                .map_err(|e| Error::Encoding(e.to_string()))?,
        );
        let not_after = x509_cert::time::Time::UtcTime(
            der::asn1::UtcTime::from_system_time(self.not_after.into())
                .map_err(|e| Error::Encoding(e.to_string()))?,
        );

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: SignatureAlgorithm::Sha256WithRsa.into(),
            issuer: self.issuer,
            validity: x509_cert::time::Validity {
                not_before,
                not_after,
            },
            subject: self.subject,
            subject_public_key_info: self.subject_public_key,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(self.extensions),
        })
    }
}
