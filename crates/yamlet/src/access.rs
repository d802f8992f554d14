// Yamlet - YAML parser, document model, and emitter
//
// Copyright (c) 2025 the Yamlet contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Typed path accessors.
//!
//! The convenience surface over path lookup: typed readers and writers
//! on [`Document`], a [`scan`] function that reads several paths in one
//! call from a small format string (`"/invoice %d /name %s"`), and
//! [`build_from_template`], which renders typed arguments into a YAML
//! template and parses it. The format string is parsed into a list of
//! `(path, kind)` pairs internally; there is no variadic machinery.

use yamlet_core::{Document, NodeStyle, ScalarStyle, Token, YamlError, YamlResult};

/// The primitive conversions the accessors support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `%d`: signed integer.
    Int,
    /// `%u`: unsigned integer.
    Uint,
    /// `%f`: float.
    Float,
    /// `%b`: boolean.
    Bool,
    /// `%s`: string.
    Str,
}

impl PrimitiveKind {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'd' | 'i' => Some(Self::Int),
            'u' => Some(Self::Uint),
            'f' => Some(Self::Float),
            'b' => Some(Self::Bool),
            's' => Some(Self::Str),
            _ => None,
        }
    }
}

/// A value read by [`scan`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScanValue {
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A float.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A string.
    Str(String),
}

/// An argument to [`build_from_template`].
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateArg<'a> {
    /// Substituted for `%d`.
    Int(i64),
    /// Substituted for `%u`.
    Uint(u64),
    /// Substituted for `%f`.
    Float(f64),
    /// Substituted for `%b`.
    Bool(bool),
    /// Substituted for `%s`, quoted as needed.
    Str(&'a str),
}

/// Parse YAML core-schema integers: decimal, `0x` hex, `0o` octal.
fn parse_int(text: &str) -> Option<i64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = if let Some(hex) = body.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = body.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()?
    } else {
        body.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

fn parse_uint(text: &str) -> Option<u64> {
    let body = text.strip_prefix('+').unwrap_or(text);
    if let Some(hex) = body.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = body.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else {
        body.parse::<u64>().ok()
    }
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | "+.inf" => Some(f64::INFINITY),
        "-.inf" => Some(f64::NEG_INFINITY),
        ".nan" => Some(f64::NAN),
        _ => text.parse::<f64>().ok(),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Typed path-based access on documents.
pub trait PathAccess {
    /// The scalar text at a path.
    fn get_str(&self, path: &str) -> Option<&str>;
    /// The integer at a path (decimal, `0x`, or `0o`).
    fn get_i64(&self, path: &str) -> Option<i64>;
    /// The unsigned integer at a path.
    fn get_u64(&self, path: &str) -> Option<u64>;
    /// The float at a path (including `.inf`/`.nan` forms).
    fn get_f64(&self, path: &str) -> Option<f64>;
    /// The boolean at a path (`true`/`false`).
    fn get_bool(&self, path: &str) -> Option<bool>;
    /// Set a scalar at a path, creating intermediate mappings. The leaf
    /// value is replaced in place when the key exists.
    fn set_str(&mut self, path: &str, value: &str) -> YamlResult<()>;
    /// Set an integer at a path.
    fn set_i64(&mut self, path: &str, value: i64) -> YamlResult<()>;
    /// Set an unsigned integer at a path.
    fn set_u64(&mut self, path: &str, value: u64) -> YamlResult<()>;
    /// Set a float at a path.
    fn set_f64(&mut self, path: &str, value: f64) -> YamlResult<()>;
    /// Set a boolean at a path.
    fn set_bool(&mut self, path: &str, value: bool) -> YamlResult<()>;
}

impl PathAccess for Document {
    fn get_str(&self, path: &str) -> Option<&str> {
        self.scalar_text(self.lookup_by_path(path)?)
    }

    fn get_i64(&self, path: &str) -> Option<i64> {
        parse_int(self.get_str(path)?)
    }

    fn get_u64(&self, path: &str) -> Option<u64> {
        parse_uint(self.get_str(path)?)
    }

    fn get_f64(&self, path: &str) -> Option<f64> {
        parse_float(self.get_str(path)?)
    }

    fn get_bool(&self, path: &str) -> Option<bool> {
        parse_bool(self.get_str(path)?)
    }

    fn set_str(&mut self, path: &str, value: &str) -> YamlResult<()> {
        set_scalar(self, path, value, true)
    }

    fn set_i64(&mut self, path: &str, value: i64) -> YamlResult<()> {
        set_scalar(self, path, &value.to_string(), false)
    }

    fn set_u64(&mut self, path: &str, value: u64) -> YamlResult<()> {
        set_scalar(self, path, &value.to_string(), false)
    }

    fn set_f64(&mut self, path: &str, value: f64) -> YamlResult<()> {
        set_scalar(self, path, &format_float(value), false)
    }

    fn set_bool(&mut self, path: &str, value: bool) -> YamlResult<()> {
        set_scalar(self, path, if value { "true" } else { "false" }, false)
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        ".nan".to_string()
    } else if value == f64::INFINITY {
        ".inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        value.to_string()
    }
}

/// Walk a path creating intermediate mappings, then set the leaf.
fn set_scalar(doc: &mut Document, path: &str, text: &str, is_string: bool) -> YamlResult<()> {
    let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    if components.is_empty() {
        return Err(YamlError::api("cannot set a scalar at the root path"));
    }
    let mut current = match doc.root() {
        Some(root) => root,
        None => {
            let root = doc.new_mapping();
            doc.set_root(Some(root));
            root
        }
    };
    for component in &components[..components.len() - 1] {
        match doc.mapping_lookup(current, component) {
            Some(next) => current = next,
            None => {
                let next = doc.new_mapping();
                let key = doc.new_scalar(component);
                doc.mapping_append_unchecked(current, key, next)?;
                current = next;
            }
        }
    }
    let leaf = components[components.len() - 1];
    let style = if is_string && yamlet_emit::scalar::analyze(text, false, false).allow_plain {
        NodeStyle::Plain
    } else if is_string {
        NodeStyle::DoubleQuoted
    } else {
        NodeStyle::Plain
    };
    let token = Token::synthetic_scalar(text, ScalarStyle::Plain);
    let value = doc.new_scalar_from_token(token, style);
    doc.mapping_set(current, leaf, value)?;
    doc.reparent();
    Ok(())
}

/// Read several typed values in one call. The format string alternates
/// paths and `%` conversions: `"/invoice %d /bill-to/given %s"`.
pub fn scan(doc: &Document, format: &str) -> YamlResult<Vec<ScanValue>> {
    let spec = parse_format(format)?;
    let mut out = Vec::with_capacity(spec.len());
    for (path, kind) in spec {
        let text = doc
            .get_str(&path)
            .ok_or_else(|| YamlError::api(format!("no scalar at path '{path}'")))?;
        let value = match kind {
            PrimitiveKind::Int => ScanValue::Int(
                parse_int(text)
                    .ok_or_else(|| YamlError::api(format!("'{text}' is not an integer")))?,
            ),
            PrimitiveKind::Uint => ScanValue::Uint(
                parse_uint(text)
                    .ok_or_else(|| YamlError::api(format!("'{text}' is not unsigned")))?,
            ),
            PrimitiveKind::Float => ScanValue::Float(
                parse_float(text)
                    .ok_or_else(|| YamlError::api(format!("'{text}' is not a float")))?,
            ),
            PrimitiveKind::Bool => ScanValue::Bool(
                parse_bool(text)
                    .ok_or_else(|| YamlError::api(format!("'{text}' is not a boolean")))?,
            ),
            PrimitiveKind::Str => ScanValue::Str(text.to_string()),
        };
        out.push(value);
    }
    Ok(out)
}

/// Parse an accessor format string into `(path, kind)` pairs.
fn parse_format(format: &str) -> YamlResult<Vec<(String, PrimitiveKind)>> {
    let mut out = Vec::new();
    let mut tokens = format.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        let path = token.to_string();
        let conv = tokens.next().ok_or_else(|| {
            YamlError::api(format!("path '{path}' has no %-conversion after it"))
        })?;
        let code = conv
            .strip_prefix('%')
            .and_then(|rest| rest.chars().next())
            .ok_or_else(|| YamlError::api(format!("expected %-conversion, got '{conv}'")))?;
        let kind = PrimitiveKind::from_code(code)
            .ok_or_else(|| YamlError::api(format!("unknown conversion '%{code}'")))?;
        out.push((path, kind));
    }
    Ok(out)
}

/// Build a document from a YAML template with `%d`/`%u`/`%f`/`%b`/`%s`
/// placeholders, substituting the typed arguments with YAML-safe
/// renderings, then parsing the result.
pub fn build_from_template(template: &str, args: &[TemplateArg<'_>]) -> YamlResult<Document> {
    let mut out = String::with_capacity(template.len());
    let mut arg_iter = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(&code) if PrimitiveKind::from_code(code).is_some() => {
                chars.next();
                let kind = PrimitiveKind::from_code(code).unwrap_or(PrimitiveKind::Str);
                let arg = arg_iter.next().ok_or_else(|| {
                    YamlError::api("not enough arguments for the template")
                })?;
                render_arg(&mut out, kind, arg)?;
            }
            _ => out.push('%'),
        }
    }
    if arg_iter.next().is_some() {
        return Err(YamlError::api("too many arguments for the template"));
    }
    yamlet_core::Document::from_yaml_str(&out)
}

fn render_arg(out: &mut String, kind: PrimitiveKind, arg: &TemplateArg<'_>) -> YamlResult<()> {
    match (kind, arg) {
        (PrimitiveKind::Int, TemplateArg::Int(v)) => out.push_str(&v.to_string()),
        (PrimitiveKind::Uint, TemplateArg::Uint(v)) => out.push_str(&v.to_string()),
        (PrimitiveKind::Float, TemplateArg::Float(v)) => out.push_str(&format_float(*v)),
        (PrimitiveKind::Bool, TemplateArg::Bool(v)) => {
            out.push_str(if *v { "true" } else { "false" })
        }
        (PrimitiveKind::Str, TemplateArg::Str(v)) => {
            if yamlet_emit::scalar::analyze(v, false, false).allow_plain {
                out.push_str(v);
            } else {
                out.push('"');
                out.push_str(&yamlet_emit::scalar::escape_double_quoted(v));
                out.push('"');
            }
        }
        (kind, arg) => {
            return Err(YamlError::api(format!(
                "template conversion {kind:?} does not match argument {arg:?}"
            )))
        }
    }
    Ok(())
}
