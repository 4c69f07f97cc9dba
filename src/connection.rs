//! IMAP session management
//!
//! [`connect`] opens an authenticated session either over implicit TLS
//! or by upgrading a plaintext connection with STARTTLS. [`close`]
//! logs the session out. Callers open one session per operation and
//! close it on every exit path.

use crate::config::MailConfig;
use crate::error::{Error, Result};
use async_imap::Session;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info, warn};

/// A TLS-wrapped IMAP session.
pub type ImapSession = Session<Compat<tokio_rustls::client::TlsStream<TcpStream>>>;

/// LOGOUT attempts before giving up on a clean close.
pub const LOGOUT_ATTEMPTS: usize = 3;

/// Build a TLS connector.
///
/// Verifies against the webpki roots unless the configuration opts
/// out for self-signed servers such as Proton Bridge.
fn tls_connector(config: &MailConfig) -> TlsConnector {
    let builder = rustls::ClientConfig::builder();
    let tls = if config.accept_invalid_certs {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
            .with_no_client_auth()
    } else {
        let roots = rustls::RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        builder.with_root_certificates(roots).with_no_client_auth()
    };
    TlsConnector::from(Arc::new(tls))
}

/// Open a fresh, logged-in IMAP session.
///
/// With `use_implicit_tls` the TLS handshake happens right after the
/// TCP connect; otherwise the client issues STARTTLS first.
///
/// # Errors
///
/// [`Error::Connection`] when the server cannot be reached,
/// [`Error::Tls`] when the upgrade or handshake fails and
/// [`Error::Auth`] when the server rejects the credentials.
pub async fn connect(config: &MailConfig) -> Result<ImapSession> {
    let addr = format!("{}:{}", config.imap_host, config.imap_port);
    debug!("Connecting to IMAP server at {}", addr);

    let mut tcp_stream = TcpStream::connect(&addr)
        .await
        .map_err(|e| Error::Connection(format!("{addr}: {e}")))?;

    if !config.use_implicit_tls {
        let mut client = async_imap::Client::new(tcp_stream.compat());
        let _greeting = client
            .read_response()
            .await
            .map_err(|e| Error::Connection(format!("Failed to read server greeting: {e}")))?;
        client
            .run_command_and_check_ok("STARTTLS", None)
            .await
            .map_err(|e| Error::Tls(format!("STARTTLS failed: {e}")))?;
        tcp_stream = client.into_inner().into_inner();
    }

    let server_name = ServerName::try_from(config.imap_host.clone())
        .map_err(|e| Error::Tls(format!("Invalid server name: {e}")))?;
    let tls_stream = tls_connector(config)
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| Error::Tls(e.to_string()))?;

    let mut tls_client = async_imap::Client::new(tls_stream.compat());
    if config.use_implicit_tls {
        let _greeting = tls_client
            .read_response()
            .await
            .map_err(|e| Error::Connection(format!("Failed to read server greeting: {e}")))?;
    }

    let session = tls_client
        .login(&config.username, &config.password)
        .await
        .map_err(|(e, _)| match e {
            async_imap::error::Error::No(msg) => Error::Auth(msg),
            other => Error::Connection(format!("Login failed: {other}")),
        })?;

    info!("Connected to IMAP server");
    Ok(session)
}

/// Log the session out.
///
/// Sends LOGOUT until the server confirms it, at most
/// [`LOGOUT_ATTEMPTS`] times. A server that never confirms cannot hold
/// the caller forever. The last failure is logged rather than returned
/// so it never masks the result of the operation that used the session.
pub async fn close(mut session: ImapSession) {
    for attempt in 1..=LOGOUT_ATTEMPTS {
        match session.logout().await {
            Ok(()) => {
                debug!("Logged out");
                return;
            }
            Err(e) => debug!("LOGOUT attempt {attempt} failed: {e}"),
        }
    }
    warn!("Server did not confirm LOGOUT after {LOGOUT_ATTEMPTS} attempts");
}

/// Certificate verifier that accepts all certificates
/// (self-signed bridges and test servers).
#[derive(Debug)]
struct DangerousVerifier;

impl ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
