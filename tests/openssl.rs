mod util;

use std::fs;
use std::process::Command;

use certsmith::cert::params::{CertificateGenerationParameters, DistinguishedName};
use certsmith::clock::SystemClock;
use certsmith::key::{KeyPairGenerator, OsKeyPairGenerator, RsaKeyPair};
use certsmith::reader::CertificateReader;
use certsmith::signer::CertificateSigner;
use regex::Regex;

use util::generate_root_ca;

fn issue_server_cert(root: &util::PemCa) -> String {
    let root_cert = CertificateReader::from_pem(&root.certificate).unwrap();
    let root_key = RsaKeyPair::from_private_key_pem(&root.private_key).unwrap();
    let server_key = OsKeyPairGenerator::default()
        .generate_key_pair(2048)
        .unwrap();

    let params = CertificateGenerationParameters::builder()
        .subject(
            DistinguishedName::builder()
                .common_name("server.myca.local".to_string())
                .build(),
        )
        .duration_days(365)
        .ca_name("/myca".to_string())
        .build();

    CertificateSigner::new(SystemClock)
        .sign_with_issuer(&params, &server_key, &root_cert, &root_key)
        .unwrap()
        .to_pem()
        .unwrap()
}

#[test]
fn openssl_cli_accepts_issued_certificates() {
    let root = generate_root_ca("myca.local");
    let server_cert_pem = issue_server_cert(&root);

    let cert_path = "/tmp/certsmith_test_server_cert.pem";
    fs::write(cert_path, &server_cert_pem).expect("write server certificate");

    let output = Command::new("openssl")
        .args(["x509", "-in", cert_path, "-noout", "-text"])
        .output()
        .expect("execute openssl");
    assert!(
        output.status.success(),
        "openssl failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = String::from_utf8_lossy(&output.stdout);

    // Attribute spacing differs between OpenSSL versions.
    let issuer = Regex::new(r"Issuer:.*CN\s*=\s*myca\.local").unwrap();
    let subject = Regex::new(r"Subject:.*CN\s*=\s*server\.myca\.local").unwrap();
    assert!(issuer.is_match(&text), "issuer not found in:\n{text}");
    assert!(subject.is_match(&text), "subject not found in:\n{text}");
    assert!(text.contains("Version: 3 (0x2)"));
    assert!(text.contains("Signature Algorithm: sha256WithRSAEncryption"));
    assert!(text.contains("X509v3 Subject Key Identifier"));
    assert!(text.contains("X509v3 Authority Key Identifier"));
    assert!(text.contains("X509v3 Basic Constraints: critical"));

    fs::remove_file(cert_path).expect("remove test certificate");
}

#[test]
fn openssl_crate_verifies_the_chain() {
    use openssl::x509::X509;

    let root = generate_root_ca("myca.local");
    let server_cert_pem = issue_server_cert(&root);

    let leaf = X509::from_pem(server_cert_pem.as_bytes()).expect("parse leaf PEM");
    let ca = X509::from_pem(root.certificate.as_bytes()).expect("parse CA PEM");

    let subject = leaf
        .subject_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(subject.to_string(), "server.myca.local");

    let issuer = leaf
        .issuer_name()
        .entries_by_nid(openssl::nid::Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap();
    assert_eq!(issuer.to_string(), "myca.local");

    assert_eq!(leaf.version(), 2, "X509 version is 0-based");

    // The leaf's signature must verify against the CA key, and the CA must
    // verify against itself.
    let ca_key = ca.public_key().unwrap();
    assert!(leaf.verify(&ca_key).unwrap());
    assert!(ca.verify(&ca_key).unwrap());

    // Serial numbers fit in 159 bits, never negative.
    let serial = leaf.serial_number().to_bn().unwrap();
    assert!(!serial.is_negative());
    assert!(serial.num_bits() <= 159);
}
