//! # Attribute Operations
//!
//! Reads attribute arguments such as
//! `#[request_param(value = "q", required = false)]` or
//! `#[api_errors((code = 404, reason = "Not found"), BadRequest)]`
//! from the rust-analyzer token tree of an attribute.

use ra_ap_syntax::ast;
use ra_ap_syntax::{AstNode, NodeOrToken, SyntaxElement, SyntaxKind};
use regex::Regex;
use std::sync::OnceLock;

/// A single attribute argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A string literal, unquoted and unescaped.
    Str(String),
    /// An integer literal.
    Int(i64),
    /// `true` or `false`.
    Bool(bool),
    /// A bare path such as `NotFound` or `errors::NotFound`.
    Path(String),
    /// A parenthesized group of arguments.
    List(AttrArgs),
}

impl AttrValue {
    /// The string literal content.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The boolean value. String literals `"true"` and `"false"` are accepted too.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The path text. String literals are accepted as paths.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            AttrValue::Path(p) | AttrValue::Str(p) => Some(p),
            _ => None,
        }
    }

    /// The nested group.
    pub fn as_list(&self) -> Option<&AttrArgs> {
        match self {
            AttrValue::List(l) => Some(l),
            _ => None,
        }
    }
}

/// One argument, optionally named (`key = value` or `key(...)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrArg {
    /// The argument name, `None` for positional arguments.
    pub key: Option<String>,
    /// The argument value.
    pub value: AttrValue,
}

/// The ordered arguments of one attribute or group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrArgs {
    args: Vec<AttrArg>,
}

impl AttrArgs {
    /// The first argument with the given name.
    pub fn named(&self, key: &str) -> Option<&AttrValue> {
        self.args
            .iter()
            .find(|a| a.key.as_deref() == Some(key))
            .map(|a| &a.value)
    }

    /// The first of several names that is present.
    pub fn named_any(&self, keys: &[&str]) -> Option<&AttrValue> {
        keys.iter().find_map(|k| self.named(k))
    }

    /// The `index`-th positional argument.
    pub fn positional(&self, index: usize) -> Option<&AttrValue> {
        self.args
            .iter()
            .filter(|a| a.key.is_none())
            .nth(index)
            .map(|a| &a.value)
    }

    /// All arguments in order.
    pub fn iter(&self) -> impl Iterator<Item = &AttrArg> {
        self.args.iter()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// The attribute name: the last segment of its path (`actix_web::get` → `get`).
pub fn attr_name(attr: &ast::Attr) -> Option<String> {
    let path = attr.meta()?.path()?;
    let segment = path.segment()?;
    Some(segment.name_ref()?.text().to_string())
}

/// Parses the arguments of an attribute. Attributes without a token tree yield no arguments.
pub fn parse_attr_args(attr: &ast::Attr) -> AttrArgs {
    attr.meta()
        .and_then(|meta| meta.token_tree())
        .map(|tt| parse_token_tree(&tt))
        .unwrap_or_default()
}

/// Parses a delimited token tree into arguments.
pub fn parse_token_tree(tt: &ast::TokenTree) -> AttrArgs {
    let mut args = Vec::new();
    let mut segment: Vec<SyntaxElement> = Vec::new();

    for element in tt.syntax().children_with_tokens() {
        let kind = element.kind();
        if kind.is_trivia() || is_delimiter(kind) {
            continue;
        }
        if kind == SyntaxKind::COMMA {
            args.extend(parse_segment(&segment));
            segment.clear();
        } else {
            segment.push(element);
        }
    }
    args.extend(parse_segment(&segment));

    AttrArgs { args }
}

fn is_delimiter(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::L_PAREN
            | SyntaxKind::R_PAREN
            | SyntaxKind::L_BRACK
            | SyntaxKind::R_BRACK
            | SyntaxKind::L_CURLY
            | SyntaxKind::R_CURLY
    )
}

fn parse_segment(elements: &[SyntaxElement]) -> Option<AttrArg> {
    match elements {
        [] => None,
        [key, eq, rest @ ..] if key.kind() == SyntaxKind::IDENT && eq.kind() == SyntaxKind::EQ => {
            Some(AttrArg {
                key: Some(element_text(key)),
                value: parse_value(rest)?,
            })
        }
        [key, NodeOrToken::Node(node)] if key.kind() == SyntaxKind::IDENT => {
            let tt = ast::TokenTree::cast(node.clone())?;
            Some(AttrArg {
                key: Some(element_text(key)),
                value: AttrValue::List(parse_token_tree(&tt)),
            })
        }
        _ => Some(AttrArg {
            key: None,
            value: parse_value(elements)?,
        }),
    }
}

fn parse_value(elements: &[SyntaxElement]) -> Option<AttrValue> {
    match elements {
        [] => None,
        [NodeOrToken::Node(node)] => {
            let tt = ast::TokenTree::cast(node.clone())?;
            Some(AttrValue::List(parse_token_tree(&tt)))
        }
        [NodeOrToken::Token(token)] => {
            let text = token.text();
            match token.kind() {
                SyntaxKind::STRING => Some(AttrValue::Str(unquote(text))),
                SyntaxKind::INT_NUMBER => parse_int(text).map(AttrValue::Int),
                _ if text == "true" => Some(AttrValue::Bool(true)),
                _ if text == "false" => Some(AttrValue::Bool(false)),
                _ => Some(AttrValue::Path(text.to_string())),
            }
        }
        [minus, NodeOrToken::Token(token)]
            if minus.kind() == SyntaxKind::MINUS && token.kind() == SyntaxKind::INT_NUMBER =>
        {
            parse_int(token.text()).map(|i| AttrValue::Int(-i))
        }
        _ => Some(AttrValue::Path(
            elements.iter().map(element_text).collect::<String>(),
        )),
    }
}

fn element_text(element: &SyntaxElement) -> String {
    match element {
        NodeOrToken::Node(node) => node.text().to_string(),
        NodeOrToken::Token(token) => token.text().to_string(),
    }
}

/// Parses an integer literal, ignoring `_` separators and type suffixes (`404u16`).
fn parse_int(text: &str) -> Option<i64> {
    let digits: String = text
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '_')
        .filter(|c| *c != '_')
        .collect();
    digits.parse().ok()
}

/// Strips the quotes of a string literal and resolves simple escapes.
fn unquote(literal: &str) -> String {
    static ESCAPE_RE: OnceLock<Regex> = OnceLock::new();
    let escape_re = ESCAPE_RE.get_or_init(|| Regex::new(r"\\(.)").expect("Invalid regex"));

    if let Some(raw) = literal.strip_prefix('r') {
        let hashes = raw.len() - raw.trim_start_matches('#').len();
        let body = &raw[hashes..raw.len().saturating_sub(hashes)];
        let body = body.strip_prefix('"').unwrap_or(body);
        return body.strip_suffix('"').unwrap_or(body).to_string();
    }

    let body = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);
    escape_re
        .replace_all(body, |caps: &regex::Captures| match &caps[1] {
            "n" => "\n".to_string(),
            "t" => "\t".to_string(),
            other => other.to_string(),
        })
        .into_owned()
}
