//! Argument contracts for registered operations.
//!
//! A schema lists every accepted field with its type, bounds, optionality and
//! default. Validation runs before any handler code, so out-of-range values
//! never reach the network.

use ipnet::IpNet;
use serde_json::{json, Map as JsonMap, Value};
use std::fmt;
use std::net::IpAddr;

/// Extra format constraint on a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    IpAddress,
    Cidr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String { format: Option<StringFormat> },
    Integer { min: i64, max: i64 },
    Boolean,
    StringList { min_items: usize, max_items: usize },
}

/// One field of an argument schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl FieldSpec {
    fn new(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            default: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, FieldKind::String { format: None })
    }

    pub fn integer(name: &'static str, description: &'static str, min: i64, max: i64) -> Self {
        Self::new(name, description, FieldKind::Integer { min, max })
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, FieldKind::Boolean)
    }

    pub fn string_list(
        name: &'static str,
        description: &'static str,
        min_items: usize,
        max_items: usize,
    ) -> Self {
        Self::new(
            name,
            description,
            FieldKind::StringList {
                min_items,
                max_items,
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Only meaningful on string fields.
    pub fn format(mut self, format: StringFormat) -> Self {
        if let FieldKind::String { format: ref mut f } = self.kind {
            *f = Some(format);
        }
        self
    }

    /// Check and normalize a present value.
    fn check(&self, value: &Value) -> Result<Value, String> {
        match &self.kind {
            FieldKind::String { format } => {
                let s = value.as_str().ok_or("expected a string")?.trim();
                if self.required && s.is_empty() {
                    return Err("must not be empty".to_string());
                }
                match format {
                    Some(StringFormat::IpAddress) if s.parse::<IpAddr>().is_err() => {
                        Err(format!("'{}' is not a valid IPv4 or IPv6 address", s))
                    }
                    Some(StringFormat::Cidr) if s.parse::<IpNet>().is_err() => Err(format!(
                        "'{}' is not a valid CIDR block (e.g. 198.51.100.0/24)",
                        s
                    )),
                    _ => Ok(Value::String(s.to_string())),
                }
            }
            FieldKind::Integer { min, max } => {
                let n = as_integer(value).ok_or("expected an integer")?;
                if n < *min || n > *max {
                    return Err(format!("must be between {} and {}", min, max));
                }
                Ok(Value::from(n))
            }
            FieldKind::Boolean => value
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| "expected a boolean".to_string()),
            FieldKind::StringList {
                min_items,
                max_items,
            } => {
                let items = value.as_array().ok_or("expected an array of strings")?;
                if items.len() < *min_items {
                    return Err(format!("must contain at least {} item(s)", min_items));
                }
                if items.len() > *max_items {
                    return Err(format!(
                        "must contain at most {} items (got {})",
                        max_items,
                        items.len()
                    ));
                }
                if let Some(idx) = items.iter().position(|item| !item.is_string()) {
                    return Err(format!("item {} is not a string", idx));
                }
                Ok(value.clone())
            }
        }
    }

    fn json_schema(&self) -> Value {
        let mut property = match &self.kind {
            FieldKind::String { .. } => json!({ "type": "string" }),
            FieldKind::Integer { min, max } => {
                json!({ "type": "integer", "minimum": min, "maximum": max })
            }
            FieldKind::Boolean => json!({ "type": "boolean" }),
            FieldKind::StringList {
                min_items,
                max_items,
            } => json!({
                "type": "array",
                "items": { "type": "string" },
                "minItems": min_items,
                "maxItems": max_items,
            }),
        };

        if let Some(obj) = property.as_object_mut() {
            obj.insert("description".into(), json!(self.description));
            if let Some(default) = &self.default {
                obj.insert("default".into(), default.clone());
            }
        }
        property
    }
}

/// Integers may arrive as floats with no fractional part (e.g. `30.0`).
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors found in one set of arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid arguments: {}", join_errors(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Ordered field list for one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSchema {
    fields: Vec<FieldSpec>,
}

impl ArgSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn push(&mut self, field: FieldSpec) {
        self.fields.push(field);
    }

    /// Validate raw arguments.
    ///
    /// Returns a normalized map holding every schema field that was supplied
    /// or has a default. Keys not in the schema are dropped.
    pub fn validate(
        &self,
        raw: Option<&JsonMap<String, Value>>,
    ) -> Result<JsonMap<String, Value>, ValidationError> {
        let mut normalized = JsonMap::new();
        let mut errors = Vec::new();

        for field in &self.fields {
            match raw.and_then(|args| args.get(field.name)) {
                None | Some(Value::Null) => {
                    if field.required {
                        errors.push(FieldError {
                            field: field.name.to_string(),
                            message: "is required".to_string(),
                        });
                    } else if let Some(default) = &field.default {
                        normalized.insert(field.name.to_string(), default.clone());
                    }
                }
                Some(value) => match field.check(value) {
                    Ok(value) => {
                        normalized.insert(field.name.to_string(), value);
                    }
                    Err(message) => errors.push(FieldError {
                        field: field.name.to_string(),
                        message,
                    }),
                },
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError { errors })
        }
    }

    /// JSON Schema object advertised to MCP clients.
    pub fn json_schema(&self) -> JsonMap<String, Value> {
        let properties: JsonMap<String, Value> = self
            .fields()
            .iter()
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields()
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        let mut schema = JsonMap::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        schema
    }
}
