//! Structured prompt templates.
//!
//! A template is its text plus an ordered list of parameter names. Values are
//! supplied positionally in that order, so prompt construction can be tested
//! without any backend.
//!
//! Placeholders look like `{name}` where `name` is `[a-z0-9_]+`. Rendering is a
//! single left-to-right pass: a value that itself contains `{input}` is copied
//! verbatim and never expanded again.

use crate::error::PromptError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    parameters: Vec<String>,
}

impl PromptTemplate {
    /// Build a template, checking that placeholders and parameters agree.
    pub fn new(
        template: impl Into<String>,
        parameters: &[&str],
    ) -> Result<Self, PromptError> {
        let template = template.into();
        let parameters: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();

        let mut seen = Vec::new();
        for segment in segments(&template) {
            if let Segment::Placeholder(name) = segment {
                if !parameters.iter().any(|p| p == name) {
                    return Err(PromptError::UndeclaredPlaceholder(name.to_string()));
                }
                seen.push(name.to_string());
            }
        }

        if let Some(unused) = parameters.iter().find(|p| !seen.contains(p)) {
            return Err(PromptError::UnusedParameter(unused.clone()));
        }

        Ok(Self {
            template,
            parameters,
        })
    }

    /// Parameter names, in the order `render` expects their values.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// The raw template text.
    pub fn text(&self) -> &str {
        &self.template
    }

    /// Render with positional values matching [`Self::parameters`].
    pub fn render(&self, values: &[&str]) -> Result<String, PromptError> {
        if values.len() != self.parameters.len() {
            return Err(PromptError::ParameterCount {
                expected: self.parameters.len(),
                actual: values.len(),
            });
        }

        let mut out = String::with_capacity(
            self.template.len() + values.iter().map(|v| v.len()).sum::<usize>(),
        );
        for segment in segments(&self.template) {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let idx = self
                        .parameters
                        .iter()
                        .position(|p| p == name)
                        .ok_or_else(|| PromptError::UndeclaredPlaceholder(name.to_string()))?;
                    out.push_str(values[idx]);
                }
            }
        }
        Ok(out)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split a template into literal text and `{name}` placeholders.
fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut parts = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}');
        match close {
            Some(close) if is_identifier(&after[..close]) => {
                if open > 0 {
                    parts.push(Segment::Literal(&rest[..open]));
                }
                parts.push(Segment::Placeholder(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                // Not a placeholder; keep the brace as text.
                parts.push(Segment::Literal(&rest[..open + 1]));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        parts.push(Segment::Literal(rest));
    }
    parts
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_parameter_order() {
        let t = PromptTemplate::new("History:\n{history}\nQ: {input}", &["history", "input"])
            .unwrap();
        let out = t.render(&["User: hi", "Where is my ticket?"]).unwrap();
        assert_eq!(out, "History:\nUser: hi\nQ: Where is my ticket?");
    }

    #[test]
    fn values_are_not_expanded_twice() {
        let t = PromptTemplate::new("A={a} B={b}", &["a", "b"]).unwrap();
        let out = t.render(&["{b}", "x"]).unwrap();
        assert_eq!(out, "A={b} B=x");
    }

    #[test]
    fn rejects_wrong_value_count() {
        let t = PromptTemplate::new("{input}", &["input"]).unwrap();
        assert_eq!(
            t.render(&[]).unwrap_err(),
            PromptError::ParameterCount {
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn rejects_undeclared_placeholder() {
        let err = PromptTemplate::new("{input} {extra}", &["input"]).unwrap_err();
        assert_eq!(err, PromptError::UndeclaredPlaceholder("extra".into()));
    }

    #[test]
    fn rejects_unused_parameter() {
        let err = PromptTemplate::new("{input}", &["input", "history"]).unwrap_err();
        assert_eq!(err, PromptError::UnusedParameter("history".into()));
    }

    #[test]
    fn non_identifier_braces_are_literal() {
        let t = PromptTemplate::new("json {\"a\": 1} and {input}", &["input"]).unwrap();
        assert_eq!(t.render(&["x"]).unwrap(), "json {\"a\": 1} and x");
    }

    #[test]
    fn repeated_placeholder_renders_each_time() {
        let t = PromptTemplate::new("{name} says hi. I am {name}.", &["name"]).unwrap();
        assert_eq!(t.render(&["Flex"]).unwrap(), "Flex says hi. I am Flex.");
    }
}
