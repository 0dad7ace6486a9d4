//! TLS configuration and certificate loading.
//!
//! # Responsibilities
//! - Load PEM certificate chains, private keys and CA certificates
//! - Build the rustls server config (certificate + key, no client auth)
//! - Build the rustls client config trusting one CA, with a hostname policy
//!
//! # Design Decisions
//! - The ring provider is used explicitly; no process-wide default is installed
//! - Hostname verification is strict unless `HostnamePolicy::Skip` is chosen;
//!   skipping still validates the chain against the trust anchor

use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme};
use serde::{Deserialize, Serialize};

/// Errors raised while building TLS configuration.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no certificates found in {0}")]
    NoCertificates(String),

    #[error("no private key found in {0}")]
    NoPrivateKey(String),

    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    #[error("certificate verifier: {0}")]
    Verifier(#[from] rustls::client::VerifierBuilderError),

    #[error("rustls: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Whether the client checks that the server certificate names the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostnamePolicy {
    /// Chain and name are both verified.
    #[default]
    Strict,
    /// Chain is verified; a name mismatch is accepted.
    Skip,
}

fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

fn read_file(path: &Path) -> Result<Vec<u8>, TlsError> {
    std::fs::read(path).map_err(|source| TlsError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Parse every certificate in a PEM source.
pub fn parse_certificates(
    mut pem: &[u8],
    origin: &str,
) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let certs = rustls_pemfile::certs(&mut pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Read {
            path: origin.to_string(),
            source,
        })?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(origin.to_string()));
    }
    Ok(certs)
}

/// Parse the first private key (PKCS#8, PKCS#1 or SEC1) in a PEM source.
pub fn parse_private_key(mut pem: &[u8], origin: &str) -> Result<PrivateKeyDer<'static>, TlsError> {
    rustls_pemfile::private_key(&mut pem)
        .map_err(|source| TlsError::Read {
            path: origin.to_string(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(origin.to_string()))
}

/// Load every certificate in a PEM file.
pub fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    parse_certificates(&read_file(path)?, &path.display().to_string())
}

/// Load the first private key in a PEM file.
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    parse_private_key(&read_file(path)?, &path.display().to_string())
}

/// Server config presenting `certs` signed for `key`.
pub fn server_config(
    certs: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
) -> Result<Arc<rustls::ServerConfig>, TlsError> {
    let config = rustls::ServerConfig::builder_with_provider(provider())
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    Ok(Arc::new(config))
}

/// Load the server identity from PEM files.
pub fn load_server_config(
    cert_path: &Path,
    key_path: &Path,
) -> Result<Arc<rustls::ServerConfig>, TlsError> {
    let certs = load_certificates(cert_path)?;
    let key = load_private_key(key_path)?;
    tracing::debug!(
        cert_path = %cert_path.display(),
        chain_len = certs.len(),
        "Loaded server certificate"
    );
    server_config(certs, key)
}

/// Client config trusting only `ca_certs`.
pub fn client_config(
    ca_certs: Vec<CertificateDer<'static>>,
    policy: HostnamePolicy,
) -> Result<Arc<rustls::ClientConfig>, TlsError> {
    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(ca_certs);
    if added == 0 {
        return Err(TlsError::NoCertificates("trust anchor".to_string()));
    }
    if ignored > 0 {
        tracing::warn!(ignored, "Skipped unparsable CA certificates");
    }

    let provider = provider();
    let verifier =
        WebPkiServerVerifier::builder_with_provider(Arc::new(roots), Arc::clone(&provider))
            .build()?;
    let builder = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?;

    let config = match policy {
        HostnamePolicy::Strict => builder.with_webpki_verifier(verifier).with_no_client_auth(),
        HostnamePolicy::Skip => {
            tracing::warn!("Server hostname verification is disabled");
            let verifier = Arc::new(SkipHostnameVerifier { inner: verifier });
            builder
                .dangerous()
                .with_custom_certificate_verifier(verifier)
                .with_no_client_auth()
        }
    };
    Ok(Arc::new(config))
}

/// Load the client trust anchor from a PEM file.
pub fn load_client_config(
    ca_cert_path: &Path,
    policy: HostnamePolicy,
) -> Result<Arc<rustls::ClientConfig>, TlsError> {
    client_config(load_certificates(ca_cert_path)?, policy)
}

/// Validate and convert a server name for SNI and verification.
pub fn server_name(name: &str) -> Result<ServerName<'static>, TlsError> {
    ServerName::try_from(name.to_string())
        .map_err(|_| TlsError::InvalidServerName(name.to_string()))
}

/// Full WebPKI verification except for the certificate-name check.
#[derive(Debug)]
struct SkipHostnameVerifier {
    inner: Arc<WebPkiServerVerifier>,
}

fn is_name_mismatch(err: &CertificateError) -> bool {
    matches!(
        err,
        CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. }
    )
}

impl ServerCertVerifier for SkipHostnameVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        // The name check runs after chain validation, so a name mismatch
        // means the chain itself was accepted.
        match self
            .inner
            .verify_server_cert(end_entity, intermediates, server_name, ocsp_response, now)
        {
            Err(rustls::Error::InvalidCertificate(err)) if is_name_mismatch(&err) => {
                tracing::debug!(server_name = ?server_name, "Ignoring certificate name mismatch");
                Ok(ServerCertVerified::assertion())
            }
            other => other,
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_name_rejects_garbage() {
        assert!(server_name("localhost").is_ok());
        assert!(server_name("127.0.0.1").is_ok());
        assert!(matches!(
            server_name("not a host"),
            Err(TlsError::InvalidServerName(_))
        ));
    }

    #[test]
    fn empty_pem_has_no_certificates() {
        assert!(matches!(
            parse_certificates(b"", "inline"),
            Err(TlsError::NoCertificates(_))
        ));
        assert!(matches!(
            parse_private_key(b"", "inline"),
            Err(TlsError::NoPrivateKey(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_certificates(Path::new("/nonexistent/ca-cert.pem")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ca-cert.pem"));
    }

    #[test]
    fn client_config_needs_a_trust_anchor() {
        assert!(matches!(
            client_config(Vec::new(), HostnamePolicy::Strict),
            Err(TlsError::NoCertificates(_))
        ));
    }

    #[test]
    fn hostname_policy_defaults_to_strict() {
        assert_eq!(HostnamePolicy::default(), HostnamePolicy::Strict);
    }
}
