use certsmith::authority::{CaVersion, CertificateAuthorityService};
use certsmith::cert::params::{CertificateGenerationParameters, DistinguishedName};
use certsmith::clock::SystemClock;
use certsmith::error::Result;
use certsmith::key::{KeyPairGenerator, OsKeyPairGenerator};
use certsmith::signer::CertificateSigner;
use time::OffsetDateTime;

/// A root CA's material as it would come back from the authority service.
pub struct PemCa {
    pub certificate: String,
    pub private_key: String,
}

pub fn generate_root_ca(common_name: &str) -> PemCa {
    let key = OsKeyPairGenerator::default()
        .generate_key_pair(2048)
        .unwrap();
    let params = CertificateGenerationParameters::builder()
        .subject(
            DistinguishedName::builder()
                .common_name(common_name.to_string())
                .build(),
        )
        .duration_days(3650)
        .is_ca(true)
        .self_signed(true)
        .build();

    let certificate = CertificateSigner::new(SystemClock)
        .sign_self_signed(&params, &key)
        .unwrap();

    PemCa {
        certificate: certificate.to_pem().unwrap(),
        private_key: key.private_key_to_pem().unwrap(),
    }
}

pub fn ca_version(ca: &PemCa, created_at: OffsetDateTime) -> CaVersion {
    CaVersion {
        certificate: ca.certificate.clone(),
        private_key: Some(ca.private_key.clone()),
        created_at: Some(created_at),
    }
}

/// Canned authority-service responses for engine tests.
pub struct StubAuthority {
    pub active: CaVersion,
    pub transitional: Option<CaVersion>,
}

impl StubAuthority {
    pub fn without_transitional(active: CaVersion) -> Self {
        Self {
            active,
            transitional: None,
        }
    }
}

impl CertificateAuthorityService for StubAuthority {
    fn find_active_version(&self, _ca_name: &str) -> Result<CaVersion> {
        Ok(self.active.clone())
    }

    fn find_transitional_version(&self, _ca_name: &str) -> Result<Option<CaVersion>> {
        Ok(self.transitional.clone())
    }
}
