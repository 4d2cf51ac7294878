use time::OffsetDateTime;
use tracing::debug;

use crate::error::{Error, Result};

/// One stored version of a certificate authority's signing material.
///
/// Versions are owned and rotated by the external authority service; this
/// core only reads them.
#[derive(Debug, Clone)]
pub struct CaVersion {
    /// The CA certificate, PEM.
    pub certificate: String,
    /// The CA private key, PEM; absent for externally managed CAs that
    /// cannot sign.
    pub private_key: Option<String>,
    pub created_at: Option<OffsetDateTime>,
}

/// Lookup of a CA's current signing versions by name.
///
/// `find_transitional_version` returns a version only while a key rotation
/// is in progress.
pub trait CertificateAuthorityService: Send + Sync {
    fn find_active_version(&self, ca_name: &str) -> Result<CaVersion>;
    fn find_transitional_version(&self, ca_name: &str) -> Result<Option<CaVersion>>;
}

/// The CA material selected to sign one certificate, plus the certificate
/// of the version that did *not* sign, so clients can trust both chains
/// while a rotation rolls out.
#[derive(Debug, Clone)]
pub struct SigningMaterial {
    /// Certificate of the version that signs, PEM.
    pub certificate: String,
    /// Private key of the version that signs, PEM.
    pub private_key: String,
    /// Certificate of the other version, when one exists, PEM.
    pub trusted_certificate: Option<String>,
}

/// Decide which CA version signs a new certificate.
///
/// The transitional version signs only when the caller opted in, a
/// transitional version exists, both versions carry creation timestamps,
/// and the transitional one is strictly newer. In that case the active
/// certificate becomes the extra trusted certificate; otherwise the active
/// version signs and the transitional certificate (if any) is the extra
/// trust anchor. An active version without a private key is a hard
/// failure, never silently replaced by the transitional version.
pub fn resolve_signing_material<A>(
    service: &A,
    ca_name: &str,
    allow_transitional_parent_to_sign: bool,
) -> Result<SigningMaterial>
where
    A: CertificateAuthorityService + ?Sized,
{
    let active = service.find_active_version(ca_name)?;
    let transitional = service.find_transitional_version(ca_name)?;

    let active_key = active
        .private_key
        .ok_or_else(|| Error::CaMissingPrivateKey(ca_name.to_string()))?;

    let transitional_is_newer = transitional.as_ref().is_some_and(|t| {
        match (t.created_at, active.created_at) {
            (Some(transitional_at), Some(active_at)) => transitional_at > active_at,
            _ => false,
        }
    });

    if allow_transitional_parent_to_sign && transitional_is_newer {
        if let Some(transitional) = transitional {
            let transitional_key = transitional
                .private_key
                .ok_or_else(|| Error::CaMissingPrivateKey(ca_name.to_string()))?;
            debug!(ca_name, "transitional CA version signs; active kept as trust anchor");
            return Ok(SigningMaterial {
                certificate: transitional.certificate,
                private_key: transitional_key,
                trusted_certificate: Some(active.certificate),
            });
        }
    }

    if transitional.is_some() {
        debug!(ca_name, "active CA version signs; transitional kept as trust anchor");
    }
    Ok(SigningMaterial {
        certificate: active.certificate,
        private_key: active_key,
        trusted_certificate: transitional.map(|t| t.certificate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    struct StubAuthority {
        active: CaVersion,
        transitional: Option<CaVersion>,
    }

    impl CertificateAuthorityService for StubAuthority {
        fn find_active_version(&self, _ca_name: &str) -> Result<CaVersion> {
            Ok(self.active.clone())
        }

        fn find_transitional_version(&self, _ca_name: &str) -> Result<Option<CaVersion>> {
            Ok(self.transitional.clone())
        }
    }

    fn version(certificate: &str, created_at: Option<OffsetDateTime>) -> CaVersion {
        CaVersion {
            certificate: certificate.to_string(),
            private_key: Some(format!("{certificate}-key")),
            created_at,
        }
    }

    const T0: OffsetDateTime = datetime!(2026-01-01 00:00:00 UTC);
    const T1: OffsetDateTime = datetime!(2026-02-01 00:00:00 UTC);

    #[test]
    fn active_signs_when_no_transitional_exists() {
        let authority = StubAuthority {
            active: version("active", Some(T0)),
            transitional: None,
        };
        let material = resolve_signing_material(&authority, "/ca", true).unwrap();
        assert_eq!(material.certificate, "active");
        assert_eq!(material.trusted_certificate, None);
    }

    #[test]
    fn newer_transitional_signs_when_opted_in() {
        let authority = StubAuthority {
            active: version("active", Some(T0)),
            transitional: Some(version("transitional", Some(T1))),
        };
        let material = resolve_signing_material(&authority, "/ca", true).unwrap();
        assert_eq!(material.certificate, "transitional");
        assert_eq!(material.private_key, "transitional-key");
        assert_eq!(material.trusted_certificate.as_deref(), Some("active"));
    }

    #[test]
    fn active_signs_without_opt_in_but_transitional_stays_trusted() {
        let authority = StubAuthority {
            active: version("active", Some(T0)),
            transitional: Some(version("transitional", Some(T1))),
        };
        let material = resolve_signing_material(&authority, "/ca", false).unwrap();
        assert_eq!(material.certificate, "active");
        assert_eq!(
            material.trusted_certificate.as_deref(),
            Some("transitional")
        );
    }

    #[test]
    fn older_transitional_never_signs() {
        let authority = StubAuthority {
            active: version("active", Some(T1)),
            transitional: Some(version("transitional", Some(T0))),
        };
        let material = resolve_signing_material(&authority, "/ca", true).unwrap();
        assert_eq!(material.certificate, "active");
        assert_eq!(
            material.trusted_certificate.as_deref(),
            Some("transitional")
        );
    }

    #[test]
    fn missing_timestamps_keep_active_signing() {
        let authority = StubAuthority {
            active: version("active", None),
            transitional: Some(version("transitional", Some(T1))),
        };
        let material = resolve_signing_material(&authority, "/ca", true).unwrap();
        assert_eq!(material.certificate, "active");
    }

    #[test]
    fn active_without_private_key_is_a_hard_failure() {
        let mut active = version("active", Some(T0));
        active.private_key = None;
        let authority = StubAuthority {
            active,
            transitional: Some(version("transitional", Some(T1))),
        };
        let err = resolve_signing_material(&authority, "/ca", true).unwrap_err();
        assert!(matches!(err, Error::CaMissingPrivateKey(name) if name == "/ca"));
    }
}
