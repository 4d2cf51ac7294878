use std::net::IpAddr;

use const_oid::AssociatedOid;
use der::{
    Decode, Encode,
    asn1::{Ia5String, OctetString},
    flagset::FlagSet,
    oid::ObjectIdentifier,
};
use x509_cert::ext::pkix::name::GeneralName;
pub use x509_cert::ext::pkix::KeyUsages;

use crate::error::{Error, Result};

/// Encoding and decoding of a single X.509 extension value.
///
/// Implementations are the only code that touches the underlying ASN.1
/// object model for their extension category; everything above works with
/// the plain Rust types defined here.
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

/// A single Subject Alternative Name entry. Only DNS and IP forms are
/// issued or carried over by this core; other general-name forms are
/// ignored on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlternativeName {
    Dns(String),
    Ip(IpAddr),
}

impl std::fmt::Display for AlternativeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlternativeName::Dns(name) => write!(f, "{name}"),
            AlternativeName::Ip(ip) => write!(f, "{ip}"),
        }
    }
}

/// The Subject Alternative Name (SAN) extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltName {
    pub names: Vec<AlternativeName>,
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = <x509_cert::ext::pkix::SubjectAltName as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let san = x509_cert::ext::pkix::SubjectAltName(
            self.names
                .iter()
                .map(|name| match name {
                    AlternativeName::Dns(dns) => Ia5String::try_from(dns.clone())
                        .map(GeneralName::DnsName)
                        .map_err(|e| Error::InvalidInput(e.to_string())),
                    AlternativeName::Ip(ip) => {
                        let octets = match ip {
                            IpAddr::V4(v4) => v4.octets().to_vec(),
                            IpAddr::V6(v6) => v6.octets().to_vec(),
                        };
                        OctetString::new(octets)
                            .map(GeneralName::IpAddress)
                            .map_err(|e| Error::InvalidInput(e.to_string()))
                    }
                })
                .collect::<Result<Vec<_>>>()?,
        );

        san.to_der().map_err(Error::from)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let names = san
            .0
            .iter()
            .filter_map(|name| match name {
                GeneralName::DnsName(dns) => Some(AlternativeName::Dns(dns.to_string())),
                GeneralName::IpAddress(octets) => {
                    let bytes = octets.as_bytes();
                    if bytes.len() == 4 {
                        let mut v4 = [0u8; 4];
                        v4.copy_from_slice(bytes);
                        Some(AlternativeName::Ip(IpAddr::from(v4)))
                    } else if bytes.len() == 16 {
                        let mut v6 = [0u8; 16];
                        v6.copy_from_slice(bytes);
                        Some(AlternativeName::Ip(IpAddr::from(v6)))
                    } else {
                        None
                    }
                }
                _ => None,
            })
            .collect();
        Ok(Self { names })
    }
}

/// The Basic Constraints extension: whether the certificate may act as a CA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u32>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = <x509_cert::ext::pkix::BasicConstraints as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length.map(|v| v as u8),
        };
        bc.to_der().map_err(Error::from)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(extension)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint.map(|v| v as u32),
        })
    }
}

/// The Key Usage extension as a raw flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl KeyUsage {
    /// Canonical string tokens for the set bits, in bit order.
    pub fn tokens(&self) -> Vec<&'static str> {
        self.0
            .into_iter()
            .map(|flag| match flag {
                KeyUsages::DigitalSignature => "digitalSignature",
                KeyUsages::NonRepudiation => "nonRepudiation",
                KeyUsages::KeyEncipherment => "keyEncipherment",
                KeyUsages::DataEncipherment => "dataEncipherment",
                KeyUsages::KeyAgreement => "keyAgreement",
                KeyUsages::KeyCertSign => "keyCertSign",
                KeyUsages::CRLSign => "cRLSign",
                KeyUsages::EncipherOnly => "encipherOnly",
                KeyUsages::DecipherOnly => "decipherOnly",
            })
            .collect()
    }
}

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <x509_cert::ext::pkix::KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let ku = x509_cert::ext::pkix::KeyUsage(self.0);
        ku.to_der().map_err(Error::from)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ku = x509_cert::ext::pkix::KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// A recognized extended key usage purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
}

impl ExtendedKeyUsageOption {
    pub fn token(&self) -> &'static str {
        match self {
            ExtendedKeyUsageOption::ServerAuth => "serverAuth",
            ExtendedKeyUsageOption::ClientAuth => "clientAuth",
            ExtendedKeyUsageOption::CodeSigning => "codeSigning",
            ExtendedKeyUsageOption::EmailProtection => "emailProtection",
            ExtendedKeyUsageOption::TimeStamping => "timeStamping",
        }
    }

    fn from_oid(oid: ObjectIdentifier) -> Option<Self> {
        match oid {
            const_oid::db::rfc5912::ID_KP_SERVER_AUTH => Some(Self::ServerAuth),
            const_oid::db::rfc5912::ID_KP_CLIENT_AUTH => Some(Self::ClientAuth),
            const_oid::db::rfc5912::ID_KP_CODE_SIGNING => Some(Self::CodeSigning),
            const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION => Some(Self::EmailProtection),
            const_oid::db::rfc5912::ID_KP_TIME_STAMPING => Some(Self::TimeStamping),
            _ => None,
        }
    }
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::EmailProtection => {
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION
            }
            ExtendedKeyUsageOption::TimeStamping => const_oid::db::rfc5912::ID_KP_TIME_STAMPING,
        }
    }
}

/// The Extended Key Usage extension.
///
/// Purposes are kept as raw OIDs so that a certificate carrying usages this
/// core does not recognize survives a regeneration round-trip unchanged;
/// only the string-token view drops unknown entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub oids: Vec<ObjectIdentifier>,
}

impl ExtendedKeyUsage {
    pub fn from_options(options: &[ExtendedKeyUsageOption]) -> Self {
        Self {
            oids: options.iter().map(|o| ObjectIdentifier::from(*o)).collect(),
        }
    }

    /// Canonical string tokens for recognized purposes; unrecognized OIDs
    /// are omitted here but retained in [`ExtendedKeyUsage::oids`].
    pub fn tokens(&self) -> Vec<&'static str> {
        self.oids
            .iter()
            .filter_map(|oid| ExtendedKeyUsageOption::from_oid(*oid).map(|o| o.token()))
            .collect()
    }
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = <x509_cert::ext::pkix::ExtendedKeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(self.oids.clone());
        eku.to_der().map_err(Error::from)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        Ok(Self { oids: eku.0 })
    }
}

/// The Subject Key Identifier extension: a digest identifying the
/// certificate's own public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyIdentifier(pub Vec<u8>);

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier =
        <x509_cert::ext::pkix::SubjectKeyIdentifier as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier(OctetString::new(self.0.as_slice())?);
        ski.to_der().map_err(Error::from)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self(ski.0.as_bytes().to_vec()))
    }
}

/// The Authority Key Identifier extension, key-identifier form only: it
/// carries the issuer's subject key identifier and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Vec<u8>,
}

impl ToAndFromX509Extension for AuthorityKeyIdentifier {
    const OID: ObjectIdentifier =
        <x509_cert::ext::pkix::AuthorityKeyIdentifier as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(self.key_identifier.as_slice())?),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        };
        aki.to_der().map_err(Error::from)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier::from_der(extension)?;
        Ok(Self {
            key_identifier: aki
                .key_identifier
                .map(|id| id.as_bytes().to_vec())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_alt_name_carries_dns_and_ip_entries() {
        let original = SubjectAltName {
            names: vec![
                AlternativeName::Dns("example.com".to_string()),
                AlternativeName::Ip("10.0.0.1".parse().unwrap()),
            ],
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = SubjectAltName::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn basic_constraints_round_trip() {
        let original = BasicConstraints {
            is_ca: true,
            max_path_length: Some(3),
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn key_usage_tokens_follow_bit_order() {
        let usage = KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyCertSign);
        assert_eq!(usage.tokens(), vec!["digitalSignature", "keyCertSign"]);

        let encoded = usage.to_x509_extension_value().unwrap();
        let decoded = KeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(usage, decoded);
    }

    #[test]
    fn extended_key_usage_retains_unrecognized_oids() {
        let ocsp_signing = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.9");
        let eku = ExtendedKeyUsage {
            oids: vec![
                ObjectIdentifier::from(ExtendedKeyUsageOption::ServerAuth),
                ocsp_signing,
            ],
        };

        // The unknown purpose is dropped from the token view only.
        assert_eq!(eku.tokens(), vec!["serverAuth"]);

        let encoded = eku.to_x509_extension_value().unwrap();
        let decoded = ExtendedKeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(eku, decoded);
    }

    #[test]
    fn authority_key_identifier_round_trip() {
        let original = AuthorityKeyIdentifier {
            key_identifier: vec![1, 2, 3, 4, 5],
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = AuthorityKeyIdentifier::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }
}
