//! Scripted transport for tests
//!
//! Replays canned responses in order and records every request it receives, so
//! tests can check what went over the wire without a network.

use std::{collections::VecDeque, sync::Mutex};

use super::{CancelHandle, Context, HttpRequest, HttpResponse, Transport};
use crate::error::{Error, Result};

#[derive(Debug)]
pub(crate) enum Reply {
    Response(HttpResponse),
    Fail(String),
}

#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
    cancel_on_send: Mutex<Option<CancelHandle>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a response with `status` and `body`
    pub(crate) fn respond(self, status: u16, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Response(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            }));
        self
    }

    /// Queue a transport failure
    pub(crate) fn fail(self, msg: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(msg.to_string()));
        self
    }

    /// Fire `handle` while the request is "in flight"
    pub(crate) fn cancel_during_send(self, handle: CancelHandle) -> Self {
        *self.cancel_on_send.lock().unwrap() = Some(handle);
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn post(&self, request: &HttpRequest, _ctx: &Context) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(handle) = self.cancel_on_send.lock().unwrap().as_ref() {
            handle.cancel();
        }

        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(msg)) => Err(Error::network(msg)),
            None => panic!("MockTransport has no reply queued for {}", request.url),
        }
    }
}
