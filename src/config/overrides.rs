//! Dot-path overrides (`panels.0.axes.title=Latency`) applied to a validated spec
//!
//! The spec is turned back into raw form, the value is set at its path and the
//! result is validated again, so overrides obey the same schema as documents.

use super::models::FigureSpec;
use crate::{NicefigsError, Result};
use serde_json::{Map, Number, Value};

/// Cast an override value: numbers with a `.` become floats, other numbers
/// integers, `true`/`false` booleans, anything else stays a string.
pub fn cast_value(text: &str) -> Value {
    let number = if text.contains('.') {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        text.parse::<i64>().ok().map(Number::from)
    };
    if let Some(number) = number {
        return Value::Number(number);
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}

/// Split `key.path=value` into its path segments and cast value.
pub fn parse_override(assignment: &str) -> Result<(Vec<String>, Value)> {
    let Some((path, value)) = assignment.split_once('=') else {
        return Err(NicefigsError::validation(
            assignment,
            "override must have the form key.path=value",
        ));
    };
    let segments: Vec<String> = path.trim().split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(NicefigsError::validation(path, "empty segment in override path"));
    }
    Ok((segments, cast_value(value.trim())))
}

/// Set `value` at `path` inside `root`, creating intermediate mappings.
///
/// Numeric segments index into lists; an index past the end is an error.
pub fn set_path(root: &mut Value, path: &[String], value: Value) -> Result<()> {
    let dotted = path.join(".");
    let Some((last, parents)) = path.split_last() else {
        return Err(NicefigsError::validation(dotted, "empty override path"));
    };

    let mut node = root;
    for segment in parents {
        node = child_mut(node, segment, &dotted)?;
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
    }

    match node {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        Value::Array(items) => {
            let slot = list_slot(items, last, &dotted)?;
            *slot = value;
            Ok(())
        }
        _ => Err(NicefigsError::validation(
            dotted,
            format!("cannot set '{}' on a scalar value", last),
        )),
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str, dotted: &str) -> Result<&'a mut Value> {
    match node {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        Value::Array(items) => list_slot(items, segment, dotted),
        _ => Err(NicefigsError::validation(
            dotted,
            format!("cannot descend into '{}' of a scalar value", segment),
        )),
    }
}

fn list_slot<'a>(items: &'a mut [Value], segment: &str, dotted: &str) -> Result<&'a mut Value> {
    let len = items.len();
    let index: usize = segment.parse().map_err(|_| {
        NicefigsError::validation(dotted, format!("'{}' is not a list index", segment))
    })?;
    items.get_mut(index).ok_or_else(|| {
        NicefigsError::validation(
            dotted,
            format!("index {} out of range for a list of {}", index, len),
        )
    })
}

/// Apply each `key.path=value` override and re-validate the result.
pub fn apply_overrides(spec: &FigureSpec, assignments: &[String]) -> Result<FigureSpec> {
    if assignments.is_empty() {
        return Ok(spec.clone());
    }

    let mut raw = spec.as_raw();
    for assignment in assignments {
        let (path, value) = parse_override(assignment)?;
        tracing::debug!(path = %path.join("."), value = %value, "Applying override");
        set_path(&mut raw, &path, value)?;
    }
    super::validate(raw, spec.base_dir.as_deref())
}
