//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve and bind the configured address
//! - Report bind failures (port in use, permission denied) as fatal errors

use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to resolve or bind the address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// A bound TCP listener, ready to be served.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind `host:port`. `host` is an IP literal (brackets allowed) or a name
    /// resolved by tokio; port 0 picks an ephemeral port.
    pub async fn bind(host: &str, port: u16) -> Result<Self, ListenerError> {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let bind_error = |source: std::io::Error| ListenerError::Bind {
            addr: format!("{host}:{port}"),
            source,
        };

        let inner = TcpListener::bind((host, port)).await.map_err(bind_error)?;
        let local_addr = inner.local_addr().map_err(bind_error)?;
        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral() {
        let listener = Listener::bind("127.0.0.1", 0).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_ipv6_literal() {
        // Hosts without IPv6 fail at bind, not at parse
        match Listener::bind("[::1]", 0).await {
            Ok(listener) => assert!(listener.local_addr().unwrap().is_ipv6()),
            Err(e) => assert!(matches!(e, ListenerError::Bind { .. })),
        }
    }

    #[tokio::test]
    async fn test_port_in_use_is_error() {
        let first = Listener::bind("127.0.0.1", 0).await.unwrap();
        let port = first.local_addr().unwrap().port();
        let err = Listener::bind("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }

    #[tokio::test]
    async fn test_localhost() {
        let listener = Listener::bind("localhost", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let err = Listener::bind("not a host", 80).await.unwrap_err();
        assert!(matches!(err, ListenerError::Bind { ref addr, .. } if addr == "not a host:80"));
    }
}
