use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::error::ExportError;

/// Built-in certificate layout.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/certificate.typ.tera");

/// Registered template name. The extension keeps Tera's HTML autoescaping
/// off; escaping is the `typst_str` filter's job.
const TEMPLATE_NAME: &str = "certificate.typ";

/// A parsed certificate template producing Typst markup.
pub struct CertificateTemplate {
    tera: Tera,
}

impl CertificateTemplate {
    /// Parse a template from its Jinja2-style source.
    pub fn from_source(source: &str) -> Result<Self, ExportError> {
        let mut tera = Tera::default();
        tera.register_filter("typst_str", typst_str_filter);
        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|e| ExportError::TemplateParse(format_tera_error(&e)))?;
        Ok(Self { tera })
    }

    /// The built-in layout.
    pub fn builtin() -> Result<Self, ExportError> {
        Self::from_source(DEFAULT_TEMPLATE)
    }

    pub fn from_file(path: &Path) -> Result<Self, ExportError> {
        let source = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_source(&source)
    }

    /// Render with any serializable context.
    pub fn render<C: Serialize>(&self, context: &C) -> Result<String, ExportError> {
        // Convert the context via serde_json so Tera sees plain values
        let value = serde_json::to_value(context)?;
        let context = Context::from_value(value)
            .map_err(|e| ExportError::TemplateRender(format_tera_error(&e)))?;

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| ExportError::TemplateRender(format_tera_error(&e)))
    }
}

/// Quote `text` as a Typst string literal.
pub fn typst_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn typst_str_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let literal = match value {
        Value::String(s) => typst_string_literal(s),
        Value::Null => typst_string_literal(""),
        other => typst_string_literal(&other.to_string()),
    };
    Ok(Value::String(literal))
}

/// Tera puts the useful detail in the source chain.
fn format_tera_error(err: &tera::Error) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
