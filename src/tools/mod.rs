//! Operation registry and dispatcher.
//!
//! Every operation is registered once at startup with a name, a description,
//! an argument schema and a handler. The registry is read-only afterwards.
//! Dispatch validates arguments against the schema, runs the handler, applies
//! the token budget guard to guarded operations and turns every failure into
//! a text result for the host.

pub mod blacklist;
pub mod block;
pub mod ip;
pub mod schema;

use crate::api::{ApiError, UpstreamApi};
use crate::budget::{BudgetDecision, TokenBudgetGuard};
use async_trait::async_trait;
use schema::{ArgSchema, FieldSpec, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::{Map as JsonMap, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Argument that lets guarded operations bypass the token budget.
pub const OVERRIDE_FIELD: &str = "break_token_rule";

/// Error raised while dispatching an operation.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] ApiError),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    BudgetExceeded(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Text shown to the host for this error.
    pub fn to_text(&self) -> String {
        match self {
            ToolError::BudgetExceeded(advisory) => advisory.clone(),
            other => format!("Error: {}", other),
        }
    }
}

/// Registration-time error.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Operation '{0}' is already registered")]
    DuplicateOperation(String),
}

/// Handler invoked with validated, default-filled arguments.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(
        &self,
        api: &dyn UpstreamApi,
        args: JsonMap<String, Value>,
    ) -> Result<String, ToolError>;
}

/// Decode validated arguments into a handler's typed argument struct.
pub(crate) fn parse_args<T: DeserializeOwned>(args: JsonMap<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolError::Internal(format!("argument decoding failed: {}", e)))
}

/// A registered operation.
#[derive(Clone)]
pub struct OperationSpec {
    pub name: String,
    pub description: String,
    pub schema: ArgSchema,
    pub handler: Arc<dyn ToolHandler>,
    /// Output passes through the token budget guard.
    pub guarded: bool,
}

impl OperationSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ArgSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler,
            guarded: false,
        }
    }

    /// Put the operation behind the token budget guard and accept the override flag.
    pub fn with_budget_guard(mut self) -> Self {
        if self.schema.field(OVERRIDE_FIELD).is_none() {
            self.schema.push(
                FieldSpec::boolean(
                    OVERRIDE_FIELD,
                    "Bypass the token limit for very large responses. Only use in critical situations (default: false)",
                )
                .default_value(false),
            );
        }
        self.guarded = true;
        self
    }
}

impl std::fmt::Debug for OperationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationSpec")
            .field("name", &self.name)
            .field("guarded", &self.guarded)
            .finish()
    }
}

/// Name-to-operation map, populated at startup.
#[derive(Default)]
pub struct ToolRegistry {
    operations: HashMap<String, OperationSpec>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `check_ip`, `bulk_check`, `check_block` and `get_blacklist`.
    pub fn with_default_operations() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(ip::check_ip_operation())?;
        registry.register(ip::bulk_check_operation())?;
        registry.register(block::check_block_operation())?;
        registry.register(blacklist::get_blacklist_operation())?;
        Ok(registry)
    }

    /// Register an operation. Names must be unique.
    pub fn register(&mut self, spec: OperationSpec) -> Result<(), RegistryError> {
        if self.operations.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateOperation(spec.name));
        }
        debug!(operation = %spec.name, guarded = spec.guarded, "Registered operation");
        self.order.push(spec.name.clone());
        self.operations.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.get(name)
    }

    /// Operations in registration order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationSpec> {
        self.order.iter().filter_map(|name| self.operations.get(name))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Text result handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    pub text: String,
    pub is_error: bool,
}

/// Routes named calls to registered operations.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    api: Arc<dyn UpstreamApi>,
    guard: TokenBudgetGuard,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        api: Arc<dyn UpstreamApi>,
        guard: TokenBudgetGuard,
    ) -> Self {
        Self {
            registry,
            api,
            guard,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Validate, run and guard one operation.
    pub async fn dispatch(
        &self,
        name: &str,
        raw_args: Option<&JsonMap<String, Value>>,
    ) -> Result<String, ToolError> {
        let spec = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownOperation(name.to_string()))?;

        debug!(operation = name, "Dispatching operation");

        let args = spec.schema.validate(raw_args).map_err(|e| {
            debug!(operation = name, error = %e, "Argument validation failed");
            e
        })?;

        let override_requested = args
            .get(OVERRIDE_FIELD)
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let text = spec.handler.call(self.api.as_ref(), args).await?;

        if !spec.guarded {
            return Ok(text);
        }

        match self.guard.check(&text, override_requested) {
            BudgetDecision::Allowed { .. } => Ok(text),
            BudgetDecision::Denied { error, .. } => Err(ToolError::BudgetExceeded(error)),
        }
    }

    /// Like [`dispatch`](Self::dispatch), but every failure becomes an error-flagged text result.
    pub async fn call(&self, name: &str, raw_args: Option<&JsonMap<String, Value>>) -> ToolResponse {
        match self.dispatch(name, raw_args).await {
            Ok(text) => ToolResponse {
                text,
                is_error: false,
            },
            Err(e) => {
                if !matches!(e, ToolError::Validation(_) | ToolError::BudgetExceeded(_)) {
                    warn!(operation = name, error = %e, "Operation failed");
                }
                ToolResponse {
                    text: e.to_text(),
                    is_error: true,
                }
            }
        }
    }
}
