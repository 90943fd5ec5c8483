//! Argument destructuring against a [`ToolDescriptor`].
//!
//! Absent optional arguments resolve to the descriptor's default; a JSON
//! `null` counts as absent. Arguments the descriptor does not declare are
//! ignored.
//!
//! Every accessor records the parameter it consulted, so the parameters a
//! handler actually reads can be compared with what its descriptor lists.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};
use crate::registry::{ParamDefault, ParamSpec, ParamType, ToolDescriptor};

/// Typed view over the raw `arguments` of a `tools/call`.
#[derive(Debug)]
pub struct ToolArgs<'a> {
    descriptor: &'static ToolDescriptor,
    values: Option<&'a Map<String, Value>>,
    /// Bit `i` is set once `descriptor.params[i]` has been read.
    consulted: AtomicU64,
}

impl<'a> ToolArgs<'a> {
    /// Bind raw arguments to a tool and check that every required
    /// parameter is present.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if `arguments` is neither an
    /// object nor null, or a required parameter is missing.
    pub fn bind(descriptor: &'static ToolDescriptor, arguments: &'a Value) -> ToolResult<Self> {
        let values = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "arguments must be an object, got {}",
                    json_kind(other)
                )))
            }
        };
        let args = Self {
            descriptor,
            values,
            consulted: AtomicU64::new(0),
        };

        if let Some(missing) = descriptor
            .params
            .iter()
            .find(|p| p.required && args.raw(p.name).is_none())
        {
            return Err(ToolError::InvalidArguments(format!(
                "missing required argument `{}`",
                missing.name
            )));
        }
        if let Some(values) = values {
            for key in values.keys().filter(|k| descriptor.param(k).is_none()) {
                tracing::debug!(
                    tool = %descriptor.name,
                    argument = %key,
                    "Ignoring undeclared argument"
                );
            }
        }
        Ok(args)
    }

    /// String argument, falling back to the declared default.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if the value is not a string
    /// or the parameter has neither a value nor a default.
    pub fn string(&self, name: &str) -> ToolResult<&'a str> {
        let spec = self.spec(name, ParamType::String)?;
        match self.optional_string(name)? {
            Some(value) => Ok(value),
            None => match spec.default {
                Some(ParamDefault::Str(default)) => Ok(default),
                _ => Err(missing(spec)),
            },
        }
    }

    /// String argument without a default.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if the value is not a string.
    pub fn optional_string(&self, name: &str) -> ToolResult<Option<&'a str>> {
        let spec = self.spec(name, ParamType::String)?;
        match self.raw(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(wrong_type(spec, other)),
        }
    }

    /// Boolean argument, falling back to the declared default.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if the value is not a boolean.
    pub fn flag(&self, name: &str) -> ToolResult<bool> {
        let spec = self.spec(name, ParamType::Boolean)?;
        match self.raw(name) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(wrong_type(spec, other)),
            None => match spec.default {
                Some(ParamDefault::Bool(default)) => Ok(default),
                _ => Err(missing(spec)),
            },
        }
    }

    /// Positive integer argument, falling back to the declared default.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] if the value is not an
    /// integer in `1..=u32::MAX`.
    pub fn positive(&self, name: &str) -> ToolResult<u32> {
        let spec = self.spec(name, ParamType::Integer)?;
        match self.raw(name) {
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    ToolError::InvalidArguments(format!(
                        "`{}` must be a positive integer, got {n}",
                        spec.name
                    ))
                }),
            Some(other) => Err(wrong_type(spec, other)),
            None => match spec.default {
                Some(ParamDefault::Int(default)) => Ok(default),
                _ => Err(missing(spec)),
            },
        }
    }

    /// Names of the declared parameters read so far, in catalog order.
    #[must_use]
    pub fn consulted(&self) -> Vec<&'static str> {
        let bits = self.consulted.load(Ordering::Relaxed);
        self.descriptor
            .params
            .iter()
            .enumerate()
            .filter(|(idx, _)| bit(*idx) & bits != 0)
            .map(|(_, spec)| spec.name)
            .collect()
    }

    fn raw(&self, name: &str) -> Option<&'a Value> {
        self.values
            .and_then(|values| values.get(name))
            .filter(|v| !v.is_null())
    }

    fn spec(&self, name: &str, ty: ParamType) -> ToolResult<&'static ParamSpec> {
        let Some((idx, spec)) = self
            .descriptor
            .params
            .iter()
            .enumerate()
            .find(|(_, p)| p.name == name)
        else {
            return Err(ToolError::InvalidArguments(format!(
                "{} has no parameter `{name}`",
                self.descriptor.name
            )));
        };
        self.consulted.fetch_or(bit(idx), Ordering::Relaxed);
        if spec.ty != ty {
            return Err(ToolError::InvalidArguments(format!(
                "`{name}` is declared as {}, not {}",
                spec.ty.json_type(),
                ty.json_type()
            )));
        }
        Ok(spec)
    }
}

fn bit(idx: usize) -> u64 {
    u32::try_from(idx)
        .ok()
        .and_then(|shift| 1_u64.checked_shl(shift))
        .unwrap_or(0)
}

fn missing(spec: &ParamSpec) -> ToolError {
    ToolError::InvalidArguments(format!("missing required argument `{}`", spec.name))
}

fn wrong_type(spec: &ParamSpec, value: &Value) -> ToolError {
    ToolError::InvalidArguments(format!(
        "`{}` must be a {}, got {}",
        spec.name,
        spec.ty.json_type(),
        json_kind(value)
    ))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::ToolRegistry;

    fn export_tool() -> &'static ToolDescriptor {
        ToolRegistry::standard()
            .find("export_diagram_formats")
            .expect("registered")
    }

    #[test]
    fn test_defaults_fill_absent_values() {
        let raw = json!({ "diagram_code": "graph TD", "format": "svg" });
        let args = ToolArgs::bind(export_tool(), &raw).expect("bind");
        assert_eq!(args.string("theme").expect("theme"), "default");
        assert_eq!(args.positive("width").expect("width"), 1920);
        assert_eq!(args.positive("height").expect("height"), 1080);
        assert_eq!(args.optional_string("output_path").expect("path"), None);
    }

    #[test]
    fn test_null_counts_as_absent() {
        let raw = json!({ "diagram_code": "graph TD", "format": "svg", "theme": null });
        let args = ToolArgs::bind(export_tool(), &raw).expect("bind");
        assert_eq!(args.string("theme").expect("theme"), "default");
    }

    #[test]
    fn test_missing_required() {
        let raw = json!({ "diagram_code": "graph TD" });
        let err = ToolArgs::bind(export_tool(), &raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid arguments: missing required argument `format`"
        );
    }

    #[test]
    fn test_null_arguments_only_fail_on_required() {
        let err = ToolArgs::bind(export_tool(), &Value::Null).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_non_object_arguments() {
        let err = ToolArgs::bind(export_tool(), &json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("got array"));
    }

    #[test]
    fn test_wrong_types() {
        let raw = json!({
            "diagram_code": "graph TD",
            "format": "svg",
            "width": "wide",
            "theme": 3
        });
        let args = ToolArgs::bind(export_tool(), &raw).expect("bind");
        assert!(args.positive("width").is_err());
        assert!(args.string("theme").unwrap_err().to_string().contains("got number"));
    }

    #[test]
    fn test_non_positive_integers_rejected() {
        for bad in [json!(0), json!(-5), json!(1.5)] {
            let raw = json!({ "diagram_code": "graph TD", "format": "png", "width": bad });
            let args = ToolArgs::bind(export_tool(), &raw).expect("bind");
            assert!(args.positive("width").is_err());
        }
    }

    #[test]
    fn test_undeclared_lookup_is_an_error() {
        let raw = json!({ "diagram_code": "graph TD", "format": "svg", "extra": true });
        let args = ToolArgs::bind(export_tool(), &raw).expect("extra keys are ignored");
        assert!(args.flag("extra").is_err());
        assert!(args.flag("width").is_err());
    }

    #[test]
    fn test_consulted_tracks_reads() {
        let raw = json!({ "diagram_code": "graph TD", "format": "svg" });
        let args = ToolArgs::bind(export_tool(), &raw).expect("bind");
        assert!(args.consulted().is_empty());
        args.string("theme").expect("theme");
        args.positive("width").expect("width");
        // A type mismatch still counts as a read of a declared parameter.
        assert!(args.flag("height").is_err());
        assert!(args.flag("extra").is_err());
        assert_eq!(args.consulted(), vec!["theme", "width", "height"]);
    }
}
