//! Lookup compiler.
//!
//! A field is written `column` or `column__lookup`. [`compile`] turns a field and
//! a [`Value`] into a [`Condition`]: a SQL fragment with `?` placeholders plus
//! the values to bind to them, in placeholder order.
//!
//! | lookup | clause | bound values |
//! |---|---|---|
//! | (none) / `exact` | `col = ?` | `[v]` |
//! | `isnull` | `col IS NULL` / `col IS NOT NULL` | `[]` |
//! | `in` | `col IN (?, ?, ...)` | the list elements |
//! | `gte` / `lte` / `gt` / `lt` | `col >= ?` ... | `[v]` |
//! | `contains` | `col LIKE ?` | `["%v%"]` |
//! | `startswith` | `col LIKE ?` | `["v%"]` |
//! | `endswith` | `col LIKE ?` | `["%v"]` |
//!
//! Values are never interpolated into the SQL text. Column names are, so they
//! must come from trusted code, not from end users.

use std::fmt;

use crate::config::{BuilderConfig, UnknownLookup};
use crate::error::{QbError, QbResult};
use crate::value::Value;

/// Separator between a column name and its lookup suffix.
pub const LOOKUP_SEPARATOR: &str = "__";

/// A recognized lookup suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// `column = ?`
    Exact,
    /// `column IS NULL` / `column IS NOT NULL`
    IsNull,
    /// `column IN (?, ...)`
    In,
    /// `column >= ?`
    Gte,
    /// `column <= ?`
    Lte,
    /// `column > ?`
    Gt,
    /// `column < ?`
    Lt,
    /// `column LIKE '%v%'`
    Contains,
    /// `column LIKE 'v%'`
    StartsWith,
    /// `column LIKE '%v'`
    EndsWith,
}

impl Lookup {
    pub const ALL: [Lookup; 10] = [
        Lookup::Exact,
        Lookup::IsNull,
        Lookup::In,
        Lookup::Gte,
        Lookup::Lte,
        Lookup::Gt,
        Lookup::Lt,
        Lookup::Contains,
        Lookup::StartsWith,
        Lookup::EndsWith,
    ];

    /// The suffix as written after `__`.
    pub fn as_str(self) -> &'static str {
        match self {
            Lookup::Exact => "exact",
            Lookup::IsNull => "isnull",
            Lookup::In => "in",
            Lookup::Gte => "gte",
            Lookup::Lte => "lte",
            Lookup::Gt => "gt",
            Lookup::Lt => "lt",
            Lookup::Contains => "contains",
            Lookup::StartsWith => "startswith",
            Lookup::EndsWith => "endswith",
        }
    }

    /// Parse a suffix. Matching is case-sensitive.
    pub fn parse(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == suffix)
    }

    /// Compile this lookup against `column`.
    pub fn apply(self, column: &str, value: Value) -> QbResult<Condition> {
        match self {
            Lookup::Exact => {
                let value = self.expect_scalar(value)?;
                Ok(Condition::new(format!("{column} = ?"), vec![value]))
            }
            Lookup::IsNull => {
                let is_null = match value {
                    Value::Bool(b) => b,
                    Value::Integer(i) => i != 0,
                    other => return Err(self.invalid(&other, "a boolean")),
                };
                let test = if is_null { "IS NULL" } else { "IS NOT NULL" };
                Ok(Condition::new(format!("{column} {test}"), Vec::new()))
            }
            Lookup::In => {
                let items = match value {
                    Value::List(items) => items,
                    other => return Err(self.invalid(&other, "a list")),
                };
                if let Some(nested) = items.iter().find(|v| !v.is_scalar()) {
                    return Err(self.invalid(nested, "a list of scalars"));
                }
                let placeholders = vec!["?"; items.len()].join(", ");
                Ok(Condition::new(format!("{column} IN ({placeholders})"), items))
            }
            Lookup::Gte | Lookup::Lte | Lookup::Gt | Lookup::Lt => {
                let op = match self {
                    Lookup::Gte => ">=",
                    Lookup::Lte => "<=",
                    Lookup::Gt => ">",
                    _ => "<",
                };
                match value {
                    Value::Integer(_) | Value::Real(_) | Value::Text(_) => {
                        Ok(Condition::new(format!("{column} {op} ?"), vec![value]))
                    }
                    other => Err(self.invalid(&other, "a number or text")),
                }
            }
            Lookup::Contains | Lookup::StartsWith | Lookup::EndsWith => {
                let text = match value {
                    Value::Text(s) => s,
                    other => return Err(self.invalid(&other, "text")),
                };
                let pattern = match self {
                    Lookup::Contains => format!("%{text}%"),
                    Lookup::StartsWith => format!("{text}%"),
                    _ => format!("%{text}"),
                };
                Ok(Condition::new(
                    format!("{column} LIKE ?"),
                    vec![Value::Text(pattern)],
                ))
            }
        }
    }

    fn expect_scalar(self, value: Value) -> QbResult<Value> {
        if value.is_scalar() {
            Ok(value)
        } else {
            Err(self.invalid(&value, "a scalar"))
        }
    }

    fn invalid(self, found: &Value, expected: &'static str) -> QbError {
        QbError::InvalidLookupValue {
            lookup: self.as_str(),
            expected,
            found: found.kind(),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field split into its column and optional lookup suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec<'a> {
    column: &'a str,
    suffix: Option<&'a str>,
}

impl<'a> FieldSpec<'a> {
    /// Split `field` once on the first `__`.
    pub fn parse(field: &'a str) -> QbResult<Self> {
        if field.is_empty() {
            return Err(QbError::invalid_field(field, "field is empty"));
        }
        let Some((column, suffix)) = field.split_once(LOOKUP_SEPARATOR) else {
            return Ok(Self {
                column: field,
                suffix: None,
            });
        };
        if column.is_empty() {
            return Err(QbError::invalid_field(field, "missing column name"));
        }
        if suffix.is_empty() {
            return Err(QbError::invalid_field(field, "missing lookup after separator"));
        }
        if suffix.contains(LOOKUP_SEPARATOR) {
            return Err(QbError::invalid_field(
                field,
                "more than one lookup separator",
            ));
        }
        Ok(Self {
            column,
            suffix: Some(suffix),
        })
    }

    pub fn column(&self) -> &'a str {
        self.column
    }

    /// The raw suffix text, if any.
    pub fn suffix(&self) -> Option<&'a str> {
        self.suffix
    }

    /// The recognized lookup. No suffix means [`Lookup::Exact`]; an unknown
    /// suffix gives `None`.
    pub fn lookup(&self) -> Option<Lookup> {
        match self.suffix {
            None => Some(Lookup::Exact),
            Some(suffix) => Lookup::parse(suffix),
        }
    }
}

/// A compiled WHERE fragment and its bound values.
///
/// The number of `?` in [`clause`](Self::clause) always equals
/// `values().len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    clause: String,
    values: Vec<Value>,
}

impl Condition {
    fn new(clause: String, values: Vec<Value>) -> Self {
        Self { clause, values }
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Count of `?` placeholders in the clause.
    pub fn placeholder_count(&self) -> usize {
        self.clause.matches('?').count()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.clause, self.values)
    }
}

/// Compile `field` and `value` with the default (strict) configuration.
///
/// # Example
/// ```
/// use litequery::Value;
/// use litequery::lookup::compile;
///
/// let cond = compile("name__startswith", "Al").unwrap();
/// assert_eq!(cond.clause(), "name LIKE ?");
/// assert_eq!(cond.values()[0], Value::Text("Al%".into()));
/// ```
pub fn compile(field: &str, value: impl Into<Value>) -> QbResult<Condition> {
    compile_with(field, value.into(), &BuilderConfig::default())
}

/// Compile `field` and `value`, resolving unknown suffixes per `config`.
pub fn compile_with(field: &str, value: Value, config: &BuilderConfig) -> QbResult<Condition> {
    let spec = FieldSpec::parse(field)?;
    let lookup = match spec.lookup() {
        Some(lookup) => lookup,
        None => {
            let suffix = spec.suffix().unwrap_or_default();
            match config.unknown_lookup {
                UnknownLookup::Reject => return Err(QbError::unsupported_lookup(field, suffix)),
                UnknownLookup::Exact => {
                    tracing::warn!(
                        target: "litequery.lookup",
                        field,
                        lookup = suffix,
                        "unknown lookup, falling back to exact match"
                    );
                    Lookup::Exact
                }
            }
        }
    };
    lookup.apply(spec.column(), value)
}
