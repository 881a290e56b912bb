use std::net::{AddrParseError, SocketAddr};
use std::num::ParseIntError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Socket address the API server binds to, from the `HOST` and `PORT` env vars.
/// Falls back to `127.0.0.1:3000` for whichever is unset.
pub fn api_socket_addr() -> Result<SocketAddr, HostPortError> {
    socket_addr_from(std::env::var("HOST").ok(), std::env::var("PORT").ok())
}

/// Base URL (`http://HOST:PORT`) other services use to reach the API server.
pub fn api_base_url() -> Result<String, HostPortError> {
    api_socket_addr().map(|addr| format!("http://{}", addr))
}

fn socket_addr_from(host: Option<String>, port: Option<String>) -> Result<SocketAddr, HostPortError> {
    let host = host
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match port.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
        Some(p) => p.parse::<u16>()?,
        None => DEFAULT_PORT,
    };
    Ok(format!("{}:{}", host, port).parse::<SocketAddr>()?)
}

#[derive(Debug)]
pub enum HostPortError {
    InvalidPort(ParseIntError),
    InvalidHostname(AddrParseError),
}

impl std::error::Error for HostPortError {}

impl std::fmt::Display for HostPortError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostPortError::InvalidPort(err) => write!(f, "Invalid PORT: {}", err),
            HostPortError::InvalidHostname(err) => write!(f, "Invalid HOST: {}", err),
        }
    }
}

impl From<ParseIntError> for HostPortError {
    fn from(err: ParseIntError) -> Self {
        HostPortError::InvalidPort(err)
    }
}

impl From<AddrParseError> for HostPortError {
    fn from(err: AddrParseError) -> Self {
        HostPortError::InvalidHostname(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let addr = socket_addr_from(None, None).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_explicit_host_and_port() {
        let addr = socket_addr_from(Some("0.0.0.0".into()), Some(" 8080 ".into())).unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_bad_port() {
        let err = socket_addr_from(None, Some("http".into())).unwrap_err();
        assert!(matches!(err, HostPortError::InvalidPort(_)));
    }

    #[test]
    fn test_bad_host() {
        let err = socket_addr_from(Some("not a host".into()), None).unwrap_err();
        assert!(matches!(err, HostPortError::InvalidHostname(_)));
    }
}
