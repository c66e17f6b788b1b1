//! The I/O seam between the stateless client and the network.
//!
//! A `Transport` executes one `HttpRequest` and returns whatever the server
//! answered, whatever the status code. Interpreting the status is the
//! client's job. TLS, redirects, pooling and timeouts belong to the
//! transport.

use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes a single HTTP round-trip.
///
/// Implementations must return non-2xx responses as `Ok`; `Err` is reserved
/// for failures where no response was received.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::fmt;
    use std::time::Duration;

    use tracing::debug;
    use ureq::typestate::WithBody;
    use ureq::{Agent, RequestBuilder};

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a `ureq::Agent`.
    ///
    /// The agent is configured with `http_status_as_error(false)` so 4xx/5xx
    /// responses come back as data. Cloning shares the agent's connection pool.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("UreqTransport").finish_non_exhaustive()
        }
    }

    impl UreqTransport {
        pub fn new(timeout: Option<Duration>) -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent }
        }

        /// Wrap an existing agent. It must not treat HTTP statuses as errors.
        pub fn with_agent(agent: Agent) -> Self {
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new(None)
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            debug!(method = %request.method, url = %request.url, "sending request");

            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let result = match method {
                HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
                HttpMethod::Delete => with_headers(self.agent.delete(&url), &headers).call(),
                HttpMethod::Post => send(with_headers(self.agent.post(&url), &headers), body),
                HttpMethod::Patch => send(with_headers(self.agent.patch(&url), &headers), body),
            };
            let mut response = result.map_err(|e| ApiError::Transport(Box::new(e)))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(Box::new(e)))?;

            debug!(%status, url = %url, "received response");
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn with_headers<B>(
        mut builder: RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn send(
        builder: RequestBuilder<WithBody>,
        body: Option<String>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }
}
