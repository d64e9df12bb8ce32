//! Filter query language understood by the in-memory backend.
//!
//! The grammar is a small subset of a document query language:
//!
//! ```text
//! FOR <var> IN <collection>
//!     [FILTER <var>.<path> == <operand>]*
//!     (RETURN <var> | REMOVE <var> IN <collection>)
//! ```
//!
//! `<collection>` is either a bind parameter (`@@name`) or a bare name.
//! `<operand>` is either a value bind parameter (`@name`) or a JSON scalar
//! literal without whitespace (`"abc"`, `42`, `true`, `null`). Keywords are
//! case-insensitive. Every supplied bind parameter must be used by the query.

use std::collections::BTreeSet;

use serde_json::Value;
use tokenvault_storage::{BindVars, StorageError, StorageResult};

/// Collection reference as written in the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionRef {
    /// `@@name`, resolved from the bind parameter `@name`.
    Bind(String),
    /// A literal collection name.
    Named(String),
}

impl CollectionRef {
    fn parse(token: &str) -> StorageResult<Self> {
        if let Some(name) = token.strip_prefix("@@") {
            if !is_identifier(name) {
                return Err(StorageError::query(format!(
                    "invalid collection parameter '{token}'"
                )));
            }
            return Ok(Self::Bind(name.to_string()));
        }
        if token.starts_with('@') || !is_identifier(token) {
            return Err(StorageError::query(format!(
                "invalid collection reference '{token}'"
            )));
        }
        Ok(Self::Named(token.to_string()))
    }

    fn resolve(&self, vars: &BindVars, used: &mut BTreeSet<String>) -> StorageResult<String> {
        match self {
            Self::Named(name) => Ok(name.clone()),
            Self::Bind(name) => {
                used.insert(format!("@{name}"));
                vars.collection(name).map(str::to_string).ok_or_else(|| {
                    StorageError::query(format!(
                        "collection parameter '@@{name}' is not bound to a string"
                    ))
                })
            }
        }
    }
}

/// Right-hand side of a filter comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `@name`, resolved from the bind parameter `name`.
    Bind(String),
    /// Inline JSON scalar.
    Literal(Value),
}

impl Operand {
    fn parse(token: &str) -> StorageResult<Self> {
        if let Some(name) = token.strip_prefix('@') {
            if !is_identifier(name) {
                return Err(StorageError::query(format!(
                    "invalid value parameter '{token}'"
                )));
            }
            return Ok(Self::Bind(name.to_string()));
        }
        match serde_json::from_str::<Value>(token) {
            Ok(value) if !value.is_array() && !value.is_object() => Ok(Self::Literal(value)),
            _ => Err(StorageError::query(format!("invalid literal '{token}'"))),
        }
    }
}

/// A single `FILTER <var>.<path> == <operand>` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    /// Attribute path below the loop variable.
    pub path: Vec<String>,
    /// Value the attribute is compared against.
    pub operand: Operand,
}

/// What the query does with matching documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAction {
    /// Return every matching document through the cursor.
    Return,
    /// Remove every matching document; the cursor yields nothing.
    Remove {
        /// Collection named in `REMOVE <var> IN <collection>`.
        collection: CollectionRef,
    },
}

/// A parsed, not yet bound, query.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    /// Loop variable name.
    pub variable: String,
    /// Iterated collection.
    pub collection: CollectionRef,
    /// Filter clauses, all of which must match.
    pub filters: Vec<FilterClause>,
    /// Terminal action.
    pub action: QueryAction,
}

/// A query with every parameter resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    /// Iterated collection name.
    pub collection: String,
    /// Attribute paths and the values they must equal.
    pub filters: Vec<(Vec<String>, Value)>,
    /// `true` for `REMOVE`, `false` for `RETURN`.
    pub remove: bool,
}

impl DocumentQuery {
    /// Parses query text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Query` if the text does not follow the grammar.
    pub fn parse(text: &str) -> StorageResult<Self> {
        let mut tokens = Tokens::new(text);

        tokens.expect_keyword("FOR")?;
        let variable = tokens.next_required("loop variable")?;
        if !is_identifier(variable) {
            return Err(StorageError::query(format!(
                "invalid loop variable '{variable}'"
            )));
        }
        tokens.expect_keyword("IN")?;
        let collection = CollectionRef::parse(tokens.next_required("collection")?)?;

        let mut filters = Vec::new();
        let action = loop {
            let keyword = tokens.next_required("FILTER, RETURN or REMOVE")?;
            match keyword.to_ascii_uppercase().as_str() {
                "FILTER" => {
                    let lhs = tokens.next_required("filter attribute")?;
                    let path = parse_path(variable, lhs)?;
                    let op = tokens.next_required("comparison operator")?;
                    if op != "==" {
                        return Err(StorageError::query(format!(
                            "unsupported operator '{op}', only '==' is supported"
                        )));
                    }
                    let operand = Operand::parse(tokens.next_required("filter operand")?)?;
                    filters.push(FilterClause { path, operand });
                }
                "RETURN" => {
                    let returned = tokens.next_required("returned variable")?;
                    if returned != variable {
                        return Err(StorageError::query(format!(
                            "RETURN must name the loop variable '{variable}'"
                        )));
                    }
                    break QueryAction::Return;
                }
                "REMOVE" => {
                    let removed = tokens.next_required("removed variable")?;
                    if removed != variable {
                        return Err(StorageError::query(format!(
                            "REMOVE must name the loop variable '{variable}'"
                        )));
                    }
                    tokens.expect_keyword("IN")?;
                    let target = CollectionRef::parse(tokens.next_required("collection")?)?;
                    break QueryAction::Remove { collection: target };
                }
                other => {
                    return Err(StorageError::query(format!(
                        "unexpected token '{other}'"
                    )));
                }
            }
        };

        if let Some(extra) = tokens.next_token() {
            return Err(StorageError::query(format!(
                "unexpected trailing token '{extra}'"
            )));
        }

        Ok(Self {
            variable: variable.to_string(),
            collection,
            filters,
            action,
        })
    }

    /// Resolves every bind parameter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Query` if a referenced parameter is missing, a
    /// supplied parameter is unused, or `REMOVE` targets a different
    /// collection than the one iterated.
    pub fn bind(&self, vars: &BindVars) -> StorageResult<BoundQuery> {
        let mut used = BTreeSet::new();
        let collection = self.collection.resolve(vars, &mut used)?;

        let mut filters = Vec::with_capacity(self.filters.len());
        for clause in &self.filters {
            let value = match &clause.operand {
                Operand::Literal(value) => value.clone(),
                Operand::Bind(name) => {
                    used.insert(name.clone());
                    vars.value(name).cloned().ok_or_else(|| {
                        StorageError::query(format!("bind parameter '@{name}' is not set"))
                    })?
                }
            };
            filters.push((clause.path.clone(), value));
        }

        let remove = match &self.action {
            QueryAction::Return => false,
            QueryAction::Remove { collection: target } => {
                let target = target.resolve(vars, &mut used)?;
                if target != collection {
                    return Err(StorageError::query(format!(
                        "REMOVE targets '{target}' but the query iterates '{collection}'"
                    )));
                }
                true
            }
        };

        if let Some((unused, _)) = vars.iter().find(|(name, _)| !used.contains(*name)) {
            return Err(StorageError::query(format!(
                "bind parameter '{unused}' declared but not used"
            )));
        }

        Ok(BoundQuery {
            collection,
            filters,
            remove,
        })
    }
}

impl BoundQuery {
    /// Returns `true` if `document` satisfies every filter.
    ///
    /// A missing attribute compares as `null`.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        self.filters.iter().all(|(path, expected)| {
            lookup(document, path).unwrap_or(&Value::Null) == expected
        })
    }
}

fn lookup<'a>(document: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(document, |current, segment| current.get(segment.as_str()))
}

fn parse_path(variable: &str, token: &str) -> StorageResult<Vec<String>> {
    let rest = token
        .strip_prefix(variable)
        .and_then(|rest| rest.strip_prefix('.'))
        .ok_or_else(|| {
            StorageError::query(format!(
                "filter attribute '{token}' must start with '{variable}.'"
            ))
        })?;

    let path: Vec<String> = rest.split('.').map(str::to_string).collect();
    if path.iter().any(|segment| !is_attribute(segment)) {
        return Err(StorageError::query(format!(
            "invalid attribute path '{token}'"
        )));
    }
    Ok(path)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_attribute(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn next_required(&mut self, what: &str) -> StorageResult<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| StorageError::query(format!("unexpected end of query, expected {what}")))
    }

    fn expect_keyword(&mut self, keyword: &str) -> StorageResult<()> {
        let token = self.next_required(keyword)?;
        if token.eq_ignore_ascii_case(keyword) {
            Ok(())
        } else {
            Err(StorageError::query(format!(
                "expected {keyword}, found '{token}'"
            )))
        }
    }
}
