//! Scripted transport for unit tests.

use async_trait::async_trait;
use filings_core::{FilingsError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::transport::Transport;

#[derive(Debug)]
enum Reply {
    Body(String),
    Status(u16),
    Network,
}

/// Answers from a fixed table and records every requested URL.
///
/// URLs not in the table answer 404.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    replies: HashMap<String, Reply>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(mut self, url: &str, body: &str) -> Self {
        self.replies.insert(url.to_string(), Reply::Body(body.to_string()));
        self
    }

    pub(crate) fn with_status(mut self, url: &str, status: u16) -> Self {
        self.replies.insert(url.to_string(), Reply::Status(status));
        self
    }

    pub(crate) fn with_network_error(mut self, url: &str) -> Self {
        self.replies.insert(url.to_string(), Reply::Network);
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.replies.get(url) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(FilingsError::Http {
                url: url.to_string(),
                status: *status,
            }),
            Some(Reply::Network) => Err(FilingsError::Network(format!("{url}: connection reset"))),
            None => Err(FilingsError::Http {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
