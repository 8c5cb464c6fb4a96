pub mod http_transport;
pub mod retry;

use async_trait::async_trait;

use crate::app::Result;
use crate::session::Credential;

pub use http_transport::HttpTransport;
pub use retry::{RateLimitedFetcher, RetryPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully formed HTTP request, ready to be sent by a [`Transport`].
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn credential(self, credential: &Credential) -> Self {
        let (name, value) = credential.header();
        self.header(name, value)
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport {
    async fn send(&self, request: &FetchRequest) -> Result<FetchResponse>;
}
