//! MCP `ServerHandler` over the operation registry.
//!
//! The handler is a thin adapter: `list_tools` renders the registry, and
//! `call_tool` forwards to the [`Dispatcher`], which already turns every
//! failure into error-flagged text.

use crate::config::ServerSettings;
use crate::tools::{Dispatcher, ToolResponse};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeResult,
    ListToolsResult, PaginatedRequestParam, ServerCapabilities, Tool, ToolAnnotations,
};
use rmcp::ServerHandler;
use std::sync::Arc;

/// MCP service exposing the AbuseIPDB operations.
#[derive(Clone)]
pub struct AbuseIpdbServer {
    dispatcher: Arc<Dispatcher>,
    settings: ServerSettings,
}

impl AbuseIpdbServer {
    pub fn new(dispatcher: Arc<Dispatcher>, settings: ServerSettings) -> Self {
        Self {
            dispatcher,
            settings,
        }
    }

    /// Tool listing derived from the registry, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .registry()
            .operations()
            .map(|op| Tool {
                name: op.name.clone().into(),
                title: None,
                description: Some(op.description.clone().into()),
                input_schema: Arc::new(op.schema.json_schema()),
                output_schema: None,
                annotations: Some(ToolAnnotations {
                    read_only_hint: Some(true),
                    open_world_hint: Some(true),
                    ..Default::default()
                }),
                icons: None,
                meta: None,
            })
            .collect()
    }
}

fn into_call_result(response: ToolResponse) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(response.text)],
        structured_content: None,
        is_error: Some(response.is_error),
        meta: None,
    }
}

impl ServerHandler for AbuseIpdbServer {
    fn get_info(&self) -> InitializeResult {
        InitializeResult {
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: self.settings.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(self.settings.instructions.clone()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_
    {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_
    {
        Box::pin(async move {
            let response = self
                .dispatcher
                .call(&request.name, request.arguments.as_ref())
                .await;
            Ok(into_call_result(response))
        })
    }
}
