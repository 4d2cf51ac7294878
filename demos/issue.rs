//! End-to-end walkthrough: create a root CA, register it with an in-memory
//! authority service, then issue a server certificate under it.
//!
//! Run with `cargo run --example issue`.

use std::collections::HashMap;

use certsmith::authority::{CaVersion, CertificateAuthorityService};
use certsmith::cert::extensions::AlternativeName;
use certsmith::cert::params::{
    CertificateGenerationParameters, DistinguishedName, DurationPolicy,
};
use certsmith::engine::CertificateIssuanceEngine;
use certsmith::error::{Error, Result};
use certsmith::reader::CertificateReader;
use time::OffsetDateTime;

#[derive(Default)]
struct InMemoryAuthority {
    versions: HashMap<String, CaVersion>,
}

impl CertificateAuthorityService for InMemoryAuthority {
    fn find_active_version(&self, ca_name: &str) -> Result<CaVersion> {
        self.versions
            .get(ca_name)
            .cloned()
            .ok_or_else(|| Error::InvalidInput(format!("unknown CA `{ca_name}`")))
    }

    fn find_transitional_version(&self, _ca_name: &str) -> Result<Option<CaVersion>> {
        Ok(None)
    }
}

fn main() -> Result<()> {
    let policy = DurationPolicy {
        ca_minimum_days: 3650,
        leaf_minimum_days: 365,
    };

    // Bootstrap: the self-signed root never consults the authority service.
    let bootstrap = CertificateIssuanceEngine::new(InMemoryAuthority::default(), policy);
    let root_request = CertificateGenerationParameters::builder()
        .subject(
            DistinguishedName::builder()
                .common_name("Demo Root CA".to_string())
                .organization("Demo Org".to_string())
                .build(),
        )
        .duration_days(3650)
        .is_ca(true)
        .self_signed(true)
        .build();
    let root = bootstrap.issue(&root_request)?;
    println!("root CA:\n{}", root.certificate);

    // Register the root and issue a server certificate under it.
    let mut authority = InMemoryAuthority::default();
    authority.versions.insert(
        "/demo-root".to_string(),
        CaVersion {
            certificate: root.certificate.clone(),
            private_key: Some(root.private_key.clone()),
            created_at: Some(OffsetDateTime::now_utc()),
        },
    );
    let engine = CertificateIssuanceEngine::new(authority, policy);

    let server_request = CertificateGenerationParameters::builder()
        .subject(
            DistinguishedName::builder()
                .common_name("server.demo.local".to_string())
                .build(),
        )
        .duration_days(90)
        .alternative_names(vec![
            AlternativeName::Dns("server.demo.local".to_string()),
            AlternativeName::Ip("127.0.0.1".parse().expect("valid IP")),
        ])
        .ca_name("/demo-root".to_string())
        .build();
    let server = engine.issue(&server_request)?;

    println!("server certificate:\n{}", server.certificate);
    println!(
        "duration: {} days (raised by policy: {})",
        server.duration_days, server.duration_overridden
    );

    let reader = CertificateReader::from_pem(&server.certificate)?;
    println!(
        "issuer CN: {:?}, chains to root: {}",
        reader.issuer_name().common_name,
        reader.is_signed_by(&root.certificate)?
    );

    Ok(())
}
