//! Minimal blocking HTTP seam used by the POST and bulk-indexing writers.
//!
//! Writers talk to a [`Transport`], so they can be exercised without a
//! network. [`UreqTransport`] is the real thing, behind the `http` feature.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport {
    /// POST `body` to `url`. Non-2xx statuses are returned, not raised.
    fn post(&mut self, url: &str, headers: &[(String, String)], body: &[u8]) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn post(&mut self, url: &str, headers: &[(String, String)], body: &[u8]) -> Result<HttpResponse> {
        (**self).post(url, headers, body)
    }
}

/// `Authorization` header value for HTTP basic auth.
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

#[cfg(feature = "http")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "http")]
mod ureq_transport {
    use std::time::Duration;

    use super::{HttpResponse, Transport};
    use crate::error::{Error, Result};

    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::with_timeout(Duration::from_secs(60))
        }

        pub fn with_timeout(timeout: Duration) -> Self {
            Self {
                agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn post(
            &mut self,
            url: &str,
            headers: &[(String, String)],
            body: &[u8],
        ) -> Result<HttpResponse> {
            let mut req = self.agent.post(url);
            for (name, value) in headers {
                req = req.set(name, value);
            }

            let resp = match req.send_bytes(body) {
                Ok(resp) => resp,
                Err(ureq::Error::Status(_, resp)) => resp,
                Err(err) => return Err(Error::Http(err.to_string())),
            };

            let status = resp.status();
            let body = resp.into_string()?;
            Ok(HttpResponse { status, body })
        }
    }
}
