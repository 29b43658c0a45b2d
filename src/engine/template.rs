//! Template engine for record mapping
//!
//! Templates interpolate row fields via `{row.Column Name}` with optional
//! filter pipelines (`{row.Class ID | local_id | prefix:ATC:}`). A quoted
//! accessor is a literal (`{'subclass of' | translate}`), which is how
//! constant vocabulary terms reach the translation table.

use super::traits::EngineError;
use std::collections::HashMap;

/// Values available to template expressions while mapping one row.
pub struct TemplateContext<'a> {
    pub row: &'a HashMap<&'a str, &'a str>,
    pub source: &'a str,
    pub translation: &'a HashMap<String, String>,
}

/// Render a template string, replacing `{…}` expressions with their values.
pub fn render_template(template: &str, ctx: &TemplateContext) -> Result<String, EngineError> {
    let mut result = String::new();
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch == '{' {
            let mut expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => expr.push(c),
                    None => {
                        return Err(EngineError::Template(format!(
                            "unclosed template expression in: {}",
                            template
                        )))
                    }
                }
            }
            result.push_str(&eval_expression(expr.trim(), ctx)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Evaluate a single template expression (the part between { and }).
fn eval_expression(expr: &str, ctx: &TemplateContext) -> Result<String, EngineError> {
    let mut parts = expr.split('|');
    let accessor = parts.next().unwrap_or_default().trim();
    let mut value = resolve_accessor(accessor, ctx)?;
    for filter in parts {
        value = apply_filter(value, filter.trim(), ctx)?;
    }
    Ok(value)
}

/// Resolve `row.<column>`, `source`, or a quoted literal.
fn resolve_accessor(accessor: &str, ctx: &TemplateContext) -> Result<String, EngineError> {
    if accessor == "source" {
        return Ok(ctx.source.to_string());
    }
    if let Some(literal) = accessor
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
    {
        return Ok(literal.to_string());
    }
    if let Some(column) = accessor.strip_prefix("row.") {
        return ctx
            .row
            .get(column)
            .map(|v| v.to_string())
            .ok_or_else(|| EngineError::Template(format!("row has no column '{}'", column)));
    }
    Err(EngineError::Template(format!(
        "unknown template accessor: {}",
        accessor
    )))
}

/// Last path or fragment segment of an IRI.
fn local_id(value: &str) -> &str {
    value.rsplit(['/', '#']).next().unwrap_or(value)
}

/// Apply a single filter to a value.
fn apply_filter(value: String, filter: &str, ctx: &TemplateContext) -> Result<String, EngineError> {
    let (name, arg) = match filter.split_once(':') {
        Some((n, a)) => (n.trim(), Some(a.trim())),
        None => (filter, None),
    };

    match name {
        "lowercase" => Ok(value.to_lowercase()),
        "local_id" => Ok(local_id(&value).to_string()),
        "prefix" => Ok(format!("{}{}", arg.unwrap_or_default(), value)),
        "default" => Ok(if value.is_empty() {
            arg.unwrap_or_default().to_string()
        } else {
            value
        }),
        "translate" => ctx
            .translation
            .get(&value)
            .cloned()
            .ok_or(EngineError::UnknownTerm(value)),
        _ => Err(EngineError::Template(format!(
            "unknown template filter: {}",
            name
        ))),
    }
}
