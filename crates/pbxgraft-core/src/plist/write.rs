//! Writer for ASCII property lists in Xcode's layout.
//!
//! Layout rules:
//! - tabs for indentation
//! - `isa` first in every dictionary, remaining keys in sorted order
//! - `Style::Inline` renders `{a = b; c = (d, ); }` on one line
//! - strings recognized by the `Annotate` hook get a trailing `/* comment */`

use super::{Dict, Value};

/// Supplies the `/* ... */` comment written after a string value.
pub trait Annotate {
    fn annotate(&self, value: &str) -> Option<String>;
}

/// Writes values without any comments.
pub struct NoAnnotations;

impl Annotate for NoAnnotations {
    fn annotate(&self, _value: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Multiline,
    Inline,
}

fn is_plain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '/' | '.')
}

/// Render a string as a plist token, quoting and escaping when required.
///
/// A bare token containing `//` would read back as a line comment.
pub fn quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_plain_char) && !s.contains("//") {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render `/* text */`, keeping the comment terminator out of the text.
pub fn comment(text: &str) -> String {
    format!("/* {} */", text.replace("*/", "* /"))
}

/// Keys of a dictionary in write order: `isa` first, the rest sorted.
pub fn ordered_keys(dict: &Dict) -> impl Iterator<Item = &String> {
    let isa = dict.get_key_value("isa").map(|(k, _)| k);
    isa.into_iter().chain(dict.keys().filter(|k| k.as_str() != "isa"))
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

/// Append `value` to `out`. `depth` is the indentation of the line the value
/// starts on; nested lines are indented one level deeper.
pub fn write_value(out: &mut String, value: &Value, depth: usize, style: Style, annotate: &dyn Annotate) {
    match value {
        Value::String(s) => {
            out.push_str(&quote(s));
            if let Some(text) = annotate.annotate(s) {
                out.push(' ');
                out.push_str(&comment(&text));
            }
        }
        Value::Data(bytes) => {
            out.push('<');
            out.push_str(&hex::encode(bytes));
            out.push('>');
        }
        Value::Array(items) => match style {
            Style::Inline => {
                out.push('(');
                for item in items {
                    write_value(out, item, depth, style, annotate);
                    out.push_str(", ");
                }
                out.push(')');
            }
            Style::Multiline => {
                out.push_str("(\n");
                for item in items {
                    indent(out, depth + 1);
                    write_value(out, item, depth + 1, style, annotate);
                    out.push_str(",\n");
                }
                indent(out, depth);
                out.push(')');
            }
        },
        Value::Dict(dict) => write_dict(out, dict, depth, style, annotate),
    }
}

pub fn write_dict(out: &mut String, dict: &Dict, depth: usize, style: Style, annotate: &dyn Annotate) {
    match style {
        Style::Inline => {
            out.push('{');
            for key in ordered_keys(dict) {
                out.push_str(&quote(key));
                out.push_str(" = ");
                write_value(out, &dict[key], depth, style, annotate);
                out.push_str("; ");
            }
            out.push('}');
        }
        Style::Multiline => {
            out.push_str("{\n");
            for key in ordered_keys(dict) {
                indent(out, depth + 1);
                out.push_str(&quote(key));
                out.push_str(" = ");
                write_value(out, &dict[key], depth + 1, style, annotate);
                out.push_str(";\n");
            }
            indent(out, depth);
            out.push('}');
        }
    }
}
