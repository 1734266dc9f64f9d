//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use pmovirt::{RawResponse, Result, ServerVersion, Transport, VersionDiscovery, VirtError};

pub const VM_HREF: &str = "/api/vms/128f9ffd-b82c-41e4-8c00-9742ed173bac";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub body: String,
}

/// Records every request and answers from a queue (200 + `<vm/>` when
/// the queue is empty).
#[derive(Default)]
pub struct RecordingTransport {
    pub calls: RefCell<Vec<Call>>,
    responses: RefCell<VecDeque<Result<RawResponse>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(RawResponse::new(status, body)));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(VirtError::Transport(message.to_string())));
        self
    }

    pub fn single_call(&self) -> Call {
        let calls = self.calls.borrow();
        assert_eq!(calls.len(), 1, "expected exactly one request, got {calls:?}");
        calls[0].clone()
    }

    fn record(&self, method: &'static str, url: &str, body: &str) -> Result<RawResponse> {
        self.calls.borrow_mut().push(Call {
            method,
            url: url.to_string(),
            body: body.to_string(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(200, "<vm/>")))
    }
}

impl Transport for RecordingTransport {
    fn post(&self, url: &str, body: &str) -> Result<RawResponse> {
        self.record("POST", url, body)
    }

    fn put(&self, url: &str, body: &str) -> Result<RawResponse> {
        self.record("PUT", url, body)
    }
}

/// Returns a fixed version and counts the queries.
pub struct FixedVersion {
    version: ServerVersion,
    pub queries: Cell<usize>,
}

impl FixedVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            version: ServerVersion::new(major, minor, 0, 0),
            queries: Cell::new(0),
        }
    }
}

impl VersionDiscovery for FixedVersion {
    fn current_version(&self) -> Result<ServerVersion> {
        self.queries.set(self.queries.get() + 1);
        Ok(self.version)
    }
}
