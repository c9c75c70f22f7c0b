//! Path template compilation.
//!
//! # Responsibilities
//! - Parse templates such as `/livros/{id}` into an anchored regex
//! - Collect placeholder names in declaration order
//! - Extract captured values as raw strings
//!
//! # Design Decisions
//! - `{name}` becomes `(?P<name>[^/]+)`; no per-placeholder patterns
//! - Literal text is regex-escaped, so `.` or `+` in a path match themselves
//! - Every pattern is anchored `^...$`; partial-path matches are impossible
//! - Compiled once at registration, never per request

use regex::Regex;
use thiserror::Error;

use crate::routing::controller::PathParams;

/// How malformed placeholder syntax is handled at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateMode {
    /// Reject the template.
    #[default]
    Strict,
    /// Log a warning and match the offending text literally.
    Lenient,
}

/// Malformed route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("'{template}': '{{' at byte {position} is never closed")]
    UnclosedPlaceholder { template: String, position: usize },

    #[error("'{template}': unmatched '}}' at byte {position}")]
    UnmatchedClose { template: String, position: usize },

    #[error("'{template}': '{name}' is not a valid parameter name")]
    InvalidName { template: String, name: String },

    #[error("'{template}': parameter '{name}' declared twice")]
    DuplicateName { template: String, name: String },

    #[error("'{template}': {message}")]
    Regex { template: String, message: String },
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    source: String,
    regex: Regex,
    params: Vec<String>,
}

impl RouteTemplate {
    /// Compile `template`, rejecting malformed placeholders.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        Self::compile(template, TemplateMode::Strict)
    }

    /// Compile `template` with the given handling of malformed placeholders.
    pub fn compile(template: &str, mode: TemplateMode) -> Result<Self, TemplateError> {
        let scanned = scan(template);

        if let Some(issue) = scanned.issues.first() {
            match mode {
                TemplateMode::Strict => return Err(issue.clone()),
                TemplateMode::Lenient => {
                    for issue in &scanned.issues {
                        tracing::warn!(%issue, "Malformed route template, matching literally");
                    }
                }
            }
        }

        let regex = Regex::new(&scanned.pattern).map_err(|e| TemplateError::Regex {
            template: template.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            source: template.to_string(),
            regex,
            params: scanned.params,
        })
    }

    /// The template as declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The generated regex source.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Placeholder names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match the full `path` and return its captured parameters.
    pub fn captures(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;
        Some(
            self.params
                .iter()
                .filter_map(|name| caps.name(name).map(|m| (name.clone(), m.as_str().to_string())))
                .collect(),
        )
    }
}

struct Scan {
    pattern: String,
    params: Vec<String>,
    issues: Vec<TemplateError>,
}

fn scan(template: &str) -> Scan {
    let mut pattern = String::from("^");
    let mut params: Vec<String> = Vec::new();
    let mut issues = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    let is_brace = |c: char| c == '{' || c == '}';

    while pos < template.len() {
        let rest = &template[pos..];
        let Some(offset) = rest.find(is_brace) else {
            literal.push_str(rest);
            break;
        };

        let at = pos + offset;
        literal.push_str(&template[pos..at]);

        if template[at..].starts_with('}') {
            issues.push(TemplateError::UnmatchedClose {
                template: template.to_string(),
                position: at,
            });
            literal.push('}');
            pos = at + 1;
            continue;
        }

        let inner_start = at + 1;
        let close = template[inner_start..]
            .find(is_brace)
            .map(|len| inner_start + len)
            .filter(|&end| template[end..].starts_with('}'));

        let Some(end) = close else {
            issues.push(TemplateError::UnclosedPlaceholder {
                template: template.to_string(),
                position: at,
            });
            literal.push('{');
            pos = inner_start;
            continue;
        };

        let name = &template[inner_start..end];
        if !is_identifier(name) {
            issues.push(TemplateError::InvalidName {
                template: template.to_string(),
                name: name.to_string(),
            });
            literal.push_str(&template[at..=end]);
        } else if params.iter().any(|p| p == name) {
            issues.push(TemplateError::DuplicateName {
                template: template.to_string(),
                name: name.to_string(),
            });
            literal.push_str(&template[at..=end]);
        } else {
            pattern.push_str(&regex::escape(&literal));
            literal.clear();
            pattern.push_str(&format!("(?P<{name}>[^/]+)"));
            params.push(name.to_string());
        }
        pos = end + 1;
    }

    pattern.push_str(&regex::escape(&literal));
    pattern.push('$');

    Scan {
        pattern,
        params,
        issues,
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_becomes_named_group() {
        let t = RouteTemplate::parse("/livros/{id}").unwrap();
        assert_eq!(t.pattern(), "^/livros/(?P<id>[^/]+)$");
        assert_eq!(t.param_names(), ["id".to_string()]);
    }

    #[test]
    fn test_captures_are_raw_strings() {
        let t = RouteTemplate::parse("/usuarios/{user_id}/pedidos/{pedido}").unwrap();
        let params = t.captures("/usuarios/42/pedidos/007").unwrap();
        assert_eq!(params.get("user_id"), Some("42"));
        assert_eq!(params.get("pedido"), Some("007"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_anchored_full_path() {
        let t = RouteTemplate::parse("/livros/{id}").unwrap();
        assert!(t.is_match("/livros/7"));
        assert!(!t.is_match("/livros/7/capitulos"));
        assert!(!t.is_match("/api/livros/7"));
        assert!(!t.is_match("/livros/"));
    }

    #[test]
    fn test_literals_are_escaped() {
        let t = RouteTemplate::parse("/arquivo.json").unwrap();
        assert!(t.is_match("/arquivo.json"));
        assert!(!t.is_match("/arquivoXjson"));
    }

    #[test]
    fn test_placeholder_within_segment() {
        let t = RouteTemplate::parse("/capas/{isbn}.jpg").unwrap();
        let params = t.captures("/capas/978-85.jpg").unwrap();
        assert_eq!(params.get("isbn"), Some("978-85"));
    }

    #[test]
    fn test_strict_rejects_malformed() {
        let cases = [
            ("/livros/{id", "never closed"),
            ("/livros/id}", "unmatched"),
            ("/livros/{}", "not a valid parameter name"),
            ("/livros/{1a}", "not a valid parameter name"),
            ("/livros/{a-b}", "not a valid parameter name"),
            ("/livros/{id}/{id}", "declared twice"),
            ("/livros/{{id}}", "never closed"),
        ];

        for (template, expected) in cases {
            let err = RouteTemplate::parse(template).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{template}: got '{err}', expected '{expected}'"
            );
        }
    }

    #[test]
    fn test_lenient_matches_malformed_text_literally() {
        let t = RouteTemplate::compile("/livros/{id", TemplateMode::Lenient).unwrap();
        assert!(t.is_match("/livros/{id"));
        assert!(t.param_names().is_empty());

        let t = RouteTemplate::compile("/a/{x}/b/{x}", TemplateMode::Lenient).unwrap();
        assert_eq!(t.param_names(), ["x".to_string()]);
        assert_eq!(t.captures("/a/1/b/{x}").unwrap().get("x"), Some("1"));
    }

    #[test]
    fn test_root_template() {
        let t = RouteTemplate::parse("/").unwrap();
        assert!(t.is_match("/"));
        assert!(!t.is_match("/x"));
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("id"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("livro2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2livro"));
        assert!(!is_identifier("título"));
    }
}
