//! Pattern template compilation.
//!
//! A template is literal text with `{name}` placeholders. Compiling a
//! template validates every brace and yields the placeholder names,
//! de-duplicated, in first-occurrence order.

use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("placeholder regex is valid")
});

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier regex is valid"));

/// A malformed brace token found while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedToken {
    /// The offending text.
    pub token: String,
    /// Human-readable reason.
    pub reason: &'static str,
}

/// Validate a template and extract its placeholders.
pub fn compile(template: &str) -> Result<Vec<String>, MalformedToken> {
    let mut placeholders: Vec<String> = Vec::new();
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '{' => {
                let mut end = None;
                while let Some(&(i, next)) = chars.peek() {
                    if next == '}' {
                        chars.next();
                        end = Some(i);
                        break;
                    }
                    if next == '{' {
                        break;
                    }
                    chars.next();
                }

                let Some(end) = end else {
                    let stop = chars.peek().map_or(template.len(), |&(i, _)| i);
                    return Err(MalformedToken {
                        token: template[start..stop].to_string(),
                        reason: "unclosed '{'",
                    });
                };

                let name = &template[start + 1..end];
                if name.is_empty() {
                    return Err(MalformedToken {
                        token: "{}".to_string(),
                        reason: "empty placeholder",
                    });
                }
                if !IDENTIFIER.is_match(name) {
                    return Err(MalformedToken {
                        token: template[start..=end].to_string(),
                        reason: "placeholder is not a valid identifier",
                    });
                }
                if !placeholders.iter().any(|p| p == name) {
                    placeholders.push(name.to_string());
                }
            }
            '}' => {
                return Err(MalformedToken {
                    token: "}".to_string(),
                    reason: "unmatched '}'",
                });
            }
            _ => {}
        }
    }

    Ok(placeholders)
}

/// Replace every placeholder occurrence using `value_for`.
///
/// Repeated placeholders call `value_for` once per occurrence.
pub fn interpolate<E>(
    template: &str,
    mut value_for: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        out.push_str(&value_for(name.as_str())?);
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

/// A piece of a compiled template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split a template into literal text and placeholders, in source order.
///
/// Empty literals are omitted.
pub fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Segment::Literal(&template[last..whole.start()]));
        }
        out.push(Segment::Placeholder(name.as_str()));
        last = whole.end();
    }

    if last < template.len() {
        out.push(Segment::Literal(&template[last..]));
    }
    out
}
