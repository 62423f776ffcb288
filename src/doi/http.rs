//! HTTP-backed DOI resolution.

use super::{DoiResolver, ResolveError};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;

/// Prefix that turns a bare DOI into a resolvable URL.
pub const DEFAULT_DOI_BASE_URL: &str = "http://dx.doi.org/";

/// Configuration for [HttpDoiResolver].
///
/// # Examples
///
/// ```
/// use bibdoi::ResolverConfig;
/// use std::time::Duration;
///
/// let config = ResolverConfig {
///     timeout: Some(Duration::from_secs(10)),
///     require_success: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Prepended to the DOI to build the lookup URL.
    pub base_url: String,
    /// Overall request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    /// Treat a non-2xx status at the end of the redirect chain as a failure.
    ///
    /// Off by default: any completed request counts as resolved, even if the
    /// landing page answers `404`.
    pub require_success: bool,
    /// Value of the `User-Agent` header, if any.
    pub user_agent: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DOI_BASE_URL.to_string(),
            timeout: None,
            require_success: false,
            user_agent: Some(concat!("bibdoi/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

/// Resolves DOIs with a `HEAD` request to the DOI proxy, following redirects.
///
/// One blocking round trip per lookup; no retries.
#[derive(Debug, Clone)]
pub struct HttpDoiResolver {
    client: Client,
    config: ResolverConfig,
}

impl HttpDoiResolver {
    /// Creates a resolver with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Request`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ResolveError> {
        Self::with_config(ResolverConfig::default())
    }

    /// Creates a resolver with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Request`] if the HTTP client cannot be built.
    pub fn with_config(config: ResolverConfig) -> Result<Self, ResolveError> {
        let mut builder = Client::builder().redirect(Policy::default());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Creates a resolver around an already configured client.
    ///
    /// Only `base_url` and `require_success` are taken from `config`; timeout
    /// and user agent are whatever `client` was built with.
    pub fn with_client(client: Client, config: ResolverConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The lookup URL for a bare DOI.
    pub fn doi_url(&self, doi: &str) -> String {
        format!("{}{}", self.config.base_url, doi)
    }
}

impl DoiResolver for HttpDoiResolver {
    fn resolve(&self, doi: &str) -> Result<String, ResolveError> {
        let url = self.doi_url(doi);
        debug!("Requesting {url}");

        let response = self.client.head(&url).send()?;
        let status = response.status();
        let final_url = response.url().to_string();

        if self.config.require_success && !status.is_success() {
            return Err(ResolveError::Status {
                doi: doi.to_string(),
                url: final_url,
                status: status.as_u16(),
            });
        }
        Ok(final_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Serves a tiny DOI proxy on loopback:
    /// `/10.1/test` redirects to `/landing`, `/landing` answers 200,
    /// everything else 404. Returns the base URL.
    fn spawn_doi_proxy() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, port);
            }
        });
        format!("http://127.0.0.1:{port}/")
    }

    fn handle(mut stream: TcpStream, port: u16) {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let request = String::from_utf8_lossy(&request);
        let path = request.split_whitespace().nth(1).unwrap_or("/");

        let (status, location) = match path {
            "/10.1/test" => ("302 Found", Some(format!("http://127.0.0.1:{port}/landing"))),
            "/landing" => ("200 OK", None),
            _ => ("404 Not Found", None),
        };
        let mut response = format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n");
        if let Some(location) = location {
            response.push_str(&format!("Location: {location}\r\n"));
        }
        response.push_str("\r\n");
        let _ = stream.write_all(response.as_bytes());
    }

    fn resolver(base_url: String, require_success: bool) -> HttpDoiResolver {
        // loopback requests must not be routed through a system proxy
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let config = ResolverConfig {
            base_url,
            require_success,
            ..Default::default()
        };
        HttpDoiResolver::with_client(client, config)
    }

    #[test]
    fn test_default_doi_url() {
        let resolver = HttpDoiResolver::new().unwrap();
        assert_eq!(
            resolver.doi_url("10.1000/xyz123"),
            "http://dx.doi.org/10.1000/xyz123"
        );
    }

    #[test]
    fn test_follows_redirect_to_final_url() {
        let base_url = spawn_doi_proxy();
        let resolver = resolver(base_url.clone(), false);

        let url = resolver.resolve("10.1/test").unwrap();
        assert_eq!(url, format!("{base_url}landing"));
    }

    #[test]
    fn test_non_success_status_is_resolved_by_default() {
        let base_url = spawn_doi_proxy();
        let resolver = resolver(base_url.clone(), false);

        let url = resolver.resolve("10.9/missing").unwrap();
        assert_eq!(url, format!("{base_url}10.9/missing"));
    }

    #[test]
    fn test_non_success_status_fails_when_required() {
        let base_url = spawn_doi_proxy();
        let resolver = resolver(base_url, true);

        let err = resolver.resolve("10.9/missing").unwrap_err();
        assert!(matches!(err, ResolveError::Status { status: 404, .. }));
    }

    #[test]
    fn test_connection_failure_is_an_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let resolver = resolver(format!("http://127.0.0.1:{port}/"), false);

        let err = resolver.resolve("10.1/test").unwrap_err();
        assert!(matches!(err, ResolveError::Request(_)));
    }
}
