use askama::Template;

use crate::router::Operation;

/// Words that cannot be plain function names
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "final", "fn", "for", "gen", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "try", "type", "typeof", "unsafe", "unsized", "use", "virtual",
    "where", "while", "yield",
];

/// Keywords that are not accepted as raw identifiers either
const RESERVED_PATH_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// A valid function identifier for `func_name`.
fn function_ident(func_name: &str) -> String {
    if RESERVED_PATH_KEYWORDS.contains(&func_name) {
        format!("{func_name}_")
    } else if RUST_KEYWORDS.contains(&func_name) {
        format!("r#{func_name}")
    } else if func_name.is_empty() || func_name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{func_name}")
    } else {
        func_name.to_string()
    }
}

/// Quoted string literal that `bail!` prints verbatim.
fn message_literal(operation_id: &str) -> String {
    let message = format!("Handler {operation_id} not implemented")
        .replace('{', "{{")
        .replace('}', "}}");
    format!("{message:?}")
}

/// Keep doc comment text on a single line
fn doc_text(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Render data for one generated handler function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerStub {
    /// Registration name (snake_case operation id)
    pub func_name: String,
    /// Function identifier, raw when `func_name` is a keyword
    pub ident: String,
    pub operation_id: String,
    /// Quoted, escaped failure message of the stub body
    pub message_literal: String,
    /// Uppercase HTTP method
    pub method: String,
    /// Path template
    pub path: String,
    /// Declared parameter names, formatted for the doc comment
    pub parameters: String,
}

impl HandlerStub {
    #[must_use]
    pub fn new(func_name: String, operation: &Operation) -> Self {
        let ident = function_ident(&func_name);
        let parameters = operation
            .parameters()
            .iter()
            .map(|p| format!("`{}`", doc_text(p.name())))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            func_name,
            ident,
            operation_id: doc_text(operation.id()),
            message_literal: message_literal(operation.id()),
            method: operation.method().to_string(),
            path: doc_text(operation.path()),
            parameters,
        }
    }
}

/// Template data for a handler stub module
#[derive(Template)]
#[template(
    source = r#"// Handler stubs generated by specrouter. Replace each body with an implementation.

use specrouter::handlers::{handler, Handler, HandlerContext, Reply};
use specrouter::parameters::Parameters;
{%- for stub in stubs %}

/// `{{ stub.method }} {{ stub.path }}` ({{ stub.operation_id }})
{%- if !stub.parameters.is_empty() %}
///
/// Parameters: {{ stub.parameters }}
{%- endif %}
pub fn {{ stub.ident }}(_ctx: &HandlerContext<'_>, _params: Parameters) -> anyhow::Result<Reply> {
    anyhow::bail!({{ stub.message_literal }})
}
{%- endfor %}

/// Every stub above, for `HandlerRegistryBuilder::add_handlers`
pub fn handlers() -> Vec<(String, Handler)> {
    vec![
{%- for stub in stubs %}
        ("{{ stub.func_name }}".to_string(), handler({{ stub.ident }})),
{%- endfor %}
    ]
}
"#,
    ext = "txt",
    escape = "none"
)]
pub struct HandlerStubsTemplateData {
    pub stubs: Vec<HandlerStub>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_ident() {
        assert_eq!(function_ident("get_pet"), "get_pet");
        assert_eq!(function_ident("match"), "r#match");
        assert_eq!(function_ident("self"), "self_");
        assert_eq!(function_ident("super"), "super_");
        assert_eq!(function_ident("crate"), "crate_");
        assert_eq!(function_ident("2fa_setup"), "_2fa_setup");
    }

    #[test]
    fn test_message_literal_escapes_quotes_and_braces() {
        assert_eq!(message_literal("getPet"), r#""Handler getPet not implemented""#);
        assert_eq!(
            message_literal(r#"say"hi"\now"#),
            r#""Handler say\"hi\"\\now not implemented""#
        );
        assert_eq!(message_literal("{id}"), r#""Handler {{id}} not implemented""#);
    }
}
