//!
//! _Transport_
//!
//! The part of the client that actually talks http. [`UreqTransport`] is the default;
//! anything implementing [`Transport`] can be handed to
//! [`Client::with_transport`](crate::Client::with_transport).
//!

use std::{
    fmt,
    sync::{Arc, mpsc},
    thread,
    time::Duration,
};

use url::Url;

use crate::error::{Error, Result};

mod context;
#[cfg(test)]
pub(crate) mod mock;

pub use context::{CancelHandle, Context};

/// How often a waiting call looks at the cancel flag
const CANCEL_POLL: Duration = Duration::from_millis(20);

/// A POST request with an empty body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Full url including the query string
    pub url: Url,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
}

/// Status and raw body of a response
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    /// Http status code
    pub status: u16,
    /// Body bytes, possibly empty
    pub body: Vec<u8>,
}

/// Sends a request and hands back whatever the server answered.
///
/// Implementations must not turn non-2xx statuses into errors; only failures to
/// get a response at all are errors, reported as [`Error::Network`].
pub trait Transport: fmt::Debug + Send + Sync {
    /// POST `request`, bounded by `ctx`
    fn post(&self, request: &HttpRequest, ctx: &Context) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn post(&self, request: &HttpRequest, ctx: &Context) -> Result<HttpResponse> {
        (**self).post(request, ctx)
    }
}

/// [`Transport`] backed by a [`ureq::Agent`]
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    /// Agent that reports every status as a normal response
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// Use an agent configured elsewhere.
    ///
    /// The agent must have `http_status_as_error(false)` set.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl UreqTransport {
    fn send(
        agent: &ureq::Agent,
        request: &HttpRequest,
        left: Option<Duration>,
    ) -> Result<HttpResponse> {
        let mut builder = agent.post(request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(left) = left {
            builder = builder.config().timeout_global(Some(left)).build();
        }

        let mut response = builder.send_empty().map_err(|e| match e {
            ureq::Error::Timeout(timeout) => {
                Error::network(format!("Request timed out ({timeout})"))
            }
            e => Error::network(format!("Failed to send http request: {e}")),
        })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| Error::network(format!("Failed to read response: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}

impl Transport for UreqTransport {
    /// The request runs on its own thread so a cancel returns at once; the abandoned
    /// thread ends when the socket does, at the latest at the deadline.
    fn post(&self, request: &HttpRequest, ctx: &Context) -> Result<HttpResponse> {
        if ctx.is_cancelled() {
            return Err(Error::network("Request cancelled"));
        }

        let (tx, rx) = mpsc::channel();
        let agent = self.agent.clone();
        let req = request.clone();
        let left = ctx.remaining();

        let _worker = thread::Builder::new()
            .name("deepl-request".to_string())
            .spawn(move || {
                //receiver is gone when the call was cancelled
                let _ = tx.send(Self::send(&agent, &req, left));
            })
            .map_err(|e| Error::network(format!("Failed to start request thread: {e}")))?;

        loop {
            match rx.recv_timeout(CANCEL_POLL) {
                Ok(res) => return res,
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if ctx.is_cancelled() {
                        return Err(Error::network("Request cancelled"));
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(Error::network("Request thread stopped without a response"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::{TcpListener, TcpStream},
        time::Instant,
    };

    use super::*;

    /// Reads one request head from `stream`
    fn read_head(stream: &mut TcpStream) -> String {
        let mut head = Vec::new();
        let mut buf = [0u8; 512];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        String::from_utf8_lossy(&head).into_owned()
    }

    /// Serves one canned response, sending the request head back over the channel
    fn serve_once(status_line: &'static str, body: &'static str) -> (Url, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let head = read_head(&mut stream);
            tx.send(head).unwrap();
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        });

        (Url::parse(&format!("http://{addr}/")).unwrap(), rx)
    }

    #[test]
    fn test_ureq_transport_round_trip() {
        let (base, rx) = serve_once("200 OK", r#"{"character_count":1,"character_limit":2}"#);
        let mut url = base.join("v2/usage").unwrap();
        url.query_pairs_mut().append_pair("auth_key", "abc");

        let request = HttpRequest {
            url,
            headers: vec![("User-Agent".into(), "deepl-test".into())],
        };
        let response = UreqTransport::new()
            .post(&request, &Context::background())
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            br#"{"character_count":1,"character_limit":2}"#.to_vec()
        );

        let head = rx.recv().unwrap();
        assert!(head.starts_with("POST /v2/usage?auth_key=abc HTTP/1.1"));
        assert!(head.to_ascii_lowercase().contains("user-agent: deepl-test"));
    }

    #[test]
    fn test_ureq_transport_keeps_error_statuses() {
        let (base, _rx) = serve_once("456 Quota Exceeded", r#"{"message":"Quota"}"#);
        let request = HttpRequest {
            url: base.join("v2/translate").unwrap(),
            headers: vec![],
        };

        let response = UreqTransport::new()
            .post(&request, &Context::background())
            .unwrap();

        assert_eq!(response.status, 456);
        assert_eq!(response.body, br#"{"message":"Quota"}"#.to_vec());
    }

    #[test]
    fn test_ureq_transport_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_head(&mut stream);
            thread::sleep(Duration::from_millis(1500));
        });

        let request = HttpRequest {
            url: Url::parse(&format!("http://{addr}/v2/usage")).unwrap(),
            headers: vec![],
        };
        let ctx = Context::with_timeout(Duration::from_millis(200));
        let res = UreqTransport::new().post(&request, &ctx);

        assert!(matches!(res, Err(Error::Network(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_ureq_transport_connection_refused() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let request = HttpRequest {
            url: Url::parse(&format!("http://{addr}/v2/usage")).unwrap(),
            headers: vec![],
        };

        let res = UreqTransport::new().post(&request, &Context::background());
        assert!(matches!(res, Err(Error::Network(_))));
    }

    #[test]
    fn test_ureq_transport_cancel_aborts_waiting_request() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_head(&mut stream);
            thread::sleep(Duration::from_secs(3));
        });

        let request = HttpRequest {
            url: Url::parse(&format!("http://{addr}/v2/translate")).unwrap(),
            headers: vec![],
        };
        let (ctx, handle) = Context::cancellable();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            handle.cancel();
        });

        let started = Instant::now();
        let res = UreqTransport::new().post(&request, &ctx);
        let elapsed = started.elapsed();

        assert!(matches!(res, Err(Error::Network(msg)) if msg.contains("cancelled")));
        assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
        canceller.join().unwrap();
    }

    #[test]
    fn test_ureq_transport_cancelled_context_never_connects() {
        let (ctx, handle) = Context::cancellable();
        handle.cancel();
        let request = HttpRequest {
            url: Url::parse("http://127.0.0.1:9/v2/usage").unwrap(),
            headers: vec![],
        };

        let res = UreqTransport::new().post(&request, &ctx);
        assert!(matches!(res, Err(Error::Network(msg)) if msg.contains("cancelled")));
    }
}
