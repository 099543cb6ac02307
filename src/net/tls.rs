//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ChainError, ChainResult};

/// Certificate and key as loaded from disk, kept in PEM form.
#[derive(Clone)]
pub struct TlsMaterial {
    cert_pem: Vec<u8>,
    key_pem: Vec<u8>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("cert_pem_len", &self.cert_pem.len())
            .finish_non_exhaustive()
    }
}

impl TlsMaterial {
    pub fn from_pem(cert_pem: Vec<u8>, key_pem: Vec<u8>) -> Self {
        Self { cert_pem, key_pem }
    }

    /// Load certificate and key files.
    pub async fn load(cert_path: &Path, key_path: &Path) -> ChainResult<Self> {
        if !cert_path.exists() {
            return Err(ChainError::Configuration(format!(
                "Certificate file not found: {:?}",
                cert_path
            )));
        }
        if !key_path.exists() {
            return Err(ChainError::Configuration(format!(
                "Private key file not found: {:?}",
                key_path
            )));
        }

        let cert_pem = tokio::fs::read(cert_path).await.map_err(|e| {
            ChainError::Configuration(format!("Failed to read {:?}: {}", cert_path, e))
        })?;
        let key_pem = tokio::fs::read(key_path).await.map_err(|e| {
            ChainError::Configuration(format!("Failed to read {:?}: {}", key_path, e))
        })?;

        Ok(Self { cert_pem, key_pem })
    }

    /// Server-side config for TLS hops. ALPN offers both `h2` and `http/1.1`.
    pub async fn server_config(&self) -> ChainResult<RustlsConfig> {
        RustlsConfig::from_pem(self.cert_pem.clone(), self.key_pem.clone())
            .await
            .map_err(|e| ChainError::Configuration(format!("Invalid TLS certificate or key: {}", e)))
    }

    /// The served certificate doubles as the only trusted root.
    pub fn trust_root(&self) -> ChainResult<TrustRoot> {
        TrustRoot::from_pem(&self.cert_pem)
    }
}

/// Immutable set of trusted roots, shared read-only by every hop.
#[derive(Debug, Clone)]
pub struct TrustRoot {
    roots: Arc<RootCertStore>,
}

impl TrustRoot {
    /// Parse PEM certificate material into a root store.
    ///
    /// Fails when the input holds no certificate or a certificate is rejected.
    pub fn from_pem(pem: &[u8]) -> ChainResult<Self> {
        let mut reader = pem;
        let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut reader)
            .collect::<Result<_, _>>()
            .map_err(|e| ChainError::Configuration(format!("Malformed trust root PEM: {}", e)))?;

        if certs.is_empty() {
            return Err(ChainError::Configuration(
                "Trust root contains no certificate".to_string(),
            ));
        }

        let mut roots = RootCertStore::empty();
        for cert in certs {
            roots
                .add(cert)
                .map_err(|e| ChainError::Configuration(format!("Unusable trust root: {}", e)))?;
        }

        Ok(Self {
            roots: Arc::new(roots),
        })
    }

    /// Copy of the root store for a fresh client config.
    pub fn root_store(&self) -> RootCertStore {
        RootCertStore::clone(&self.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_signed() -> (String, String) {
        let key_pair = rcgen::KeyPair::generate().unwrap();
        let params = rcgen::CertificateParams::new(vec!["localhost".to_string()]).unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        (cert.pem(), key_pair.serialize_pem())
    }

    #[test]
    fn trust_root_accepts_pem_certificate() {
        let (cert, _) = self_signed();
        let root = TrustRoot::from_pem(cert.as_bytes()).unwrap();
        assert_eq!(root.root_store().len(), 1);
    }

    #[test]
    fn trust_root_rejects_empty_material() {
        let err = TrustRoot::from_pem(b"").unwrap_err();
        assert!(matches!(err, ChainError::Configuration(_)));
    }

    #[test]
    fn trust_root_rejects_non_certificate_pem() {
        let (_, key) = self_signed();
        let err = TrustRoot::from_pem(key.as_bytes()).unwrap_err();
        assert!(matches!(err, ChainError::Configuration(_)));
    }

    #[test]
    fn trust_root_rejects_garbage_certificate() {
        let pem = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        assert!(TrustRoot::from_pem(pem.as_bytes()).is_err());
    }

    #[tokio::test]
    async fn missing_files_are_configuration_errors() {
        let err = TlsMaterial::load(Path::new("/nope/server.crt"), Path::new("/nope/server.key"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Configuration(_)));
    }

    #[tokio::test]
    async fn server_config_builds_from_generated_pair() {
        let (cert, key) = self_signed();
        let material = TlsMaterial::from_pem(cert.into_bytes(), key.into_bytes());
        assert!(material.server_config().await.is_ok());
    }
}
