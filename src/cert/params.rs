use core::str::FromStr;

use bon::Builder;
use der::asn1::PrintableStringRef;
use der::oid::ObjectIdentifier;
use x509_cert::name::{Name, RdnSequence};

use crate::cert::extensions::{AlternativeName, ExtendedKeyUsage, KeyUsage};
use crate::error::{Error, Result};
use crate::reader::CertificateReader;

const OID_COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const OID_COUNTRY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const OID_LOCALITY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const OID_STATE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const OID_ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const OID_ORGANIZATION_UNIT: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");

/// Subject or issuer identity for a certificate.
///
/// Every attribute is optional, but at least one must be present for the
/// name to compose into a usable DN.
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
pub struct DistinguishedName {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
    pub locality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl DistinguishedName {
    /// Assemble the X.500 name from the populated attributes.
    ///
    /// Fails with [`Error::InvalidDistinguishedName`] when every attribute
    /// is absent.
    pub fn to_x509_name(&self) -> Result<Name> {
        let mut parts = Vec::new();
        if let Some(cn) = &self.common_name {
            parts.push(format!("CN={cn}"));
        }
        if let Some(ou) = &self.organization_unit {
            parts.push(format!("OU={ou}"));
        }
        if let Some(o) = &self.organization {
            parts.push(format!("O={o}"));
        }
        if let Some(l) = &self.locality {
            parts.push(format!("L={l}"));
        }
        if let Some(st) = &self.state {
            parts.push(format!("ST={st}"));
        }
        if let Some(c) = &self.country {
            parts.push(format!("C={c}"));
        }
        if parts.is_empty() {
            return Err(Error::InvalidDistinguishedName);
        }
        RdnSequence::from_str(&parts.join(",")).map_err(|e| Error::Encoding(e.to_string()))
    }

    /// Extract the attributes this core understands from an X.500 name.
    pub fn from_x509_name(name: &Name) -> Self {
        Self {
            common_name: attribute_value(name, OID_COMMON_NAME),
            organization: attribute_value(name, OID_ORGANIZATION),
            organization_unit: attribute_value(name, OID_ORGANIZATION_UNIT),
            locality: attribute_value(name, OID_LOCALITY),
            state: attribute_value(name, OID_STATE),
            country: attribute_value(name, OID_COUNTRY),
        }
    }
}

fn attribute_value(name: &Name, oid: ObjectIdentifier) -> Option<String> {
    for rdn in name.0.iter() {
        for attr in rdn.0.iter() {
            if attr.oid != oid {
                continue;
            }
            if let Ok(s) = attr.value.decode_as::<String>() {
                return Some(s);
            }
            if let Ok(s) = attr.value.decode_as::<PrintableStringRef>() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// Minimum validity lengths enforced at issuance time.
///
/// A zero floor leaves the requested duration untouched; the effective
/// duration is always at least one day.
#[derive(Clone, Copy, Debug, Default)]
pub struct DurationPolicy {
    pub ca_minimum_days: u32,
    pub leaf_minimum_days: u32,
}

/// The signing request for a new certificate.
#[derive(Clone, Debug, Builder)]
pub struct CertificateGenerationParameters {
    pub subject: DistinguishedName,
    /// RSA modulus size in bits.
    #[builder(default = 2048)]
    pub key_length: usize,
    /// Requested validity length in days.
    #[builder(default = 365)]
    pub duration_days: u32,
    pub alternative_names: Option<Vec<AlternativeName>>,
    pub key_usage: Option<KeyUsage>,
    pub extended_key_usage: Option<ExtendedKeyUsage>,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub self_signed: bool,
    /// Name of the signing CA; absent exactly when self-signed.
    pub ca_name: Option<String>,
    /// Opt-in to let an in-rotation CA version sign this certificate.
    #[builder(default)]
    pub allow_transitional_parent_to_sign: bool,
}

impl CertificateGenerationParameters {
    /// Reconstruct generation parameters from a previously issued
    /// certificate, for regeneration.
    ///
    /// Subject attributes, key length, duration, alternative names, key
    /// usage and extended key usage are carried over exactly as read:
    /// what was present stays present, what was absent stays absent.
    pub fn from_certificate(
        reader: &CertificateReader,
        ca_name: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            subject: reader.subject_name(),
            key_length: reader.key_length()? as usize,
            duration_days: reader.duration_days() as u32,
            alternative_names: reader.alternative_names()?.map(|san| san.names),
            key_usage: reader.key_usage()?,
            extended_key_usage: reader.extended_key_usage()?,
            is_ca: reader.is_ca()?,
            self_signed: reader.is_self_signed()?,
            ca_name,
            allow_transitional_parent_to_sign: false,
        })
    }

    /// The `ca_name`/`self_signed` invariant: a signing CA is named exactly
    /// when the certificate is not self-signed.
    pub fn validate(&self) -> Result<()> {
        match (&self.ca_name, self.self_signed) {
            (Some(_), true) => Err(Error::InvalidInput(
                "a self-signed certificate cannot name a signing CA".to_string(),
            )),
            (None, false) => Err(Error::InvalidInput(
                "a CA-signed certificate must name its signing CA".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Apply the duration floor, returning a floored copy plus whether the
    /// requested duration was raised. The request itself is never mutated.
    pub fn with_duration_floor(&self, policy: &DurationPolicy) -> FlooredParameters {
        let floor = if self.is_ca {
            policy.ca_minimum_days
        } else {
            policy.leaf_minimum_days
        };
        let effective = self.duration_days.max(floor).max(1);
        let mut parameters = self.clone();
        let duration_overridden = effective != parameters.duration_days;
        parameters.duration_days = effective;
        FlooredParameters {
            parameters,
            duration_overridden,
        }
    }
}

/// A generation request after floor-policy normalization.
#[derive(Clone, Debug)]
pub struct FlooredParameters {
    pub parameters: CertificateGenerationParameters,
    pub duration_overridden: bool,
}
