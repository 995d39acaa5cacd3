//! In-memory `UpstreamApi` for handler tests.

use super::{ApiError, ApiResponse, UpstreamApi};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::Mutex;

/// A request seen by the fake.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

enum Reply {
    Body(String),
    Error { status: u16, message: String },
}

struct Route {
    path: &'static str,
    param: Option<(&'static str, String)>,
    reply: Reply,
}

/// Routes are matched in registration order; the first match wins.
#[derive(Default)]
pub(crate) struct FakeApi {
    routes: Vec<Route>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, path: &'static str, body: Value) -> Self {
        self.routes.push(Route {
            path,
            param: None,
            reply: Reply::Body(body.to_string()),
        });
        self
    }

    pub fn on_text(mut self, path: &'static str, body: &str) -> Self {
        self.routes.push(Route {
            path,
            param: None,
            reply: Reply::Body(body.to_string()),
        });
        self
    }

    pub fn on_param(mut self, path: &'static str, key: &'static str, value: &str, body: Value) -> Self {
        self.routes.push(Route {
            path,
            param: Some((key, value.to_string())),
            reply: Reply::Body(body.to_string()),
        });
        self
    }

    pub fn fail_param(
        mut self,
        path: &'static str,
        key: &'static str,
        value: &str,
        status: u16,
        message: &str,
    ) -> Self {
        self.routes.push(Route {
            path,
            param: Some((key, value.to_string())),
            reply: Reply::Error {
                status,
                message: message.to_string(),
            },
        });
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UpstreamApi for FakeApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                method,
                path: path.to_string(),
                params: params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            });
        }

        let route = self.routes.iter().find(|route| {
            route.path == path
                && route.param.as_ref().map_or(true, |(key, value)| {
                    params.iter().any(|(k, v)| k == key && v == value)
                })
        });

        match route.map(|r| &r.reply) {
            Some(Reply::Body(body)) => Ok(ApiResponse::new(200, body.clone())),
            Some(Reply::Error { status, message }) => Err(ApiError::Status {
                status: *status,
                message: message.clone(),
            }),
            None => Err(ApiError::Status {
                status: 404,
                message: format!("no route for {}", path),
            }),
        }
    }
}
