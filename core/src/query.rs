//! Search criteria builder for audience searches.
//!
//! # Design
//! The remote API accepts search criteria as a nested JSON array: a
//! comparison is `[field, operator, operand, ...]` and logical combinators
//! wrap fully-serialized children, e.g. `["and", [...], [...]]`. `Query` is
//! an immutable expression tree over that shape; combinators consume their
//! operands and return a new node, and serialization is a pure function of
//! the tree structure.
//!
//! Operators form a closed set. They are modeled as an enum with an
//! exhaustive wire-code mapping rather than a string table, so an unknown
//! operator is unrepresentable. The one wire-format quirk is `zip-radius`,
//! which bakes the radius into the operator string itself (`"zip-radius:10"`)
//! instead of passing it as an operand.
//!
//! Usage:
//!
//! ```
//! use emma_core::Query;
//!
//! let query = Query::eq("member_field:foo", 1)
//!     & Query::contains("member_field:bar", "*foo*");
//! assert_eq!(
//!     query.to_string(),
//!     r#"["and",["member_field:foo","eq",1],["member_field:bar","contains","*foo*"]]"#
//! );
//! ```

use std::fmt;
use std::ops;

use serde_json::Value;

use crate::error::ApiError;

/// Radius values the remote service accepts for `zip-radius` searches.
const ALLOWED_RADII: [u32; 6] = [5, 10, 15, 20, 25, 50];

/// Comparison operator of a leaf query.
///
/// Closed enumeration; [`Operator::code`] is the exhaustive mapping to the
/// wire strings the remote service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Basic equality.
    Eq,
    /// Less than.
    Lt,
    /// Greater than.
    Gt,
    /// Inclusive range, two operands.
    Between,
    /// Relative date: within the last interval.
    InLast,
    /// Relative date: within the next interval.
    InNext,
    /// Component-wise date match; every supplied part must match.
    DateMatch,
    /// Match a string field against a shell-glob-style pattern.
    Contains,
    /// Match a value against an array-valued field.
    Any,
    /// Set membership; operands are the candidate values.
    In,
    /// Match zip codes within the given radius (miles) of a center zip.
    ZipRadius(u32),
}

impl Operator {
    /// The operator string sent over the wire.
    pub fn code(&self) -> String {
        match self {
            Operator::Eq => "eq".to_string(),
            Operator::Lt => "lt".to_string(),
            Operator::Gt => "gt".to_string(),
            Operator::Between => "between".to_string(),
            Operator::InLast => "in last".to_string(),
            Operator::InNext => "in next".to_string(),
            Operator::DateMatch => "datematch".to_string(),
            Operator::Contains => "contains".to_string(),
            Operator::Any => "any".to_string(),
            Operator::In => "in".to_string(),
            Operator::ZipRadius(radius) => format!("zip-radius:{radius}"),
        }
    }
}

/// An immutable node in a search-criteria expression tree.
///
/// Built with the constructor functions (`Query::eq`, `Query::contains`, ...)
/// and composed with [`Query::and`] / [`Query::or`] / [`Query::negate`] or
/// the `&`, `|` and `!` operators. Serialized with [`Query::to_value`] into
/// the nested-array form embedded in a search's `criteria` field.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Leaf comparison: one field tested against operand(s) via an operator.
    Compare {
        field: String,
        op: Operator,
        operands: Vec<Value>,
    },
    /// Logical AND over exactly two children.
    And(Box<Query>, Box<Query>),
    /// Logical OR over exactly two children.
    Or(Box<Query>, Box<Query>),
    /// Logical NOT over exactly one child.
    Not(Box<Query>),
}

impl Query {
    fn compare(field: impl Into<String>, op: Operator, operands: Vec<Value>) -> Self {
        Query::Compare {
            field: field.into(),
            op,
            operands,
        }
    }

    /// `[field, "eq", value]` — basic equality.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Eq, vec![value.into()])
    }

    /// `[field, "lt", value]` — less than.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Lt, vec![value.into()])
    }

    /// `[field, "gt", value]` — greater than.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Gt, vec![value.into()])
    }

    /// `[field, "between", low, high]` — inclusive range.
    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::compare(field, Operator::Between, vec![low.into(), high.into()])
    }

    /// `[field, "in last", interval]` — relative date lookback.
    ///
    /// `interval` is a unit-count mapping such as `json!({"day": 4})`.
    pub fn in_last(field: impl Into<String>, interval: impl Into<Value>) -> Self {
        Self::compare(field, Operator::InLast, vec![interval.into()])
    }

    /// `[field, "in next", interval]` — relative date lookahead.
    pub fn in_next(field: impl Into<String>, interval: impl Into<Value>) -> Self {
        Self::compare(field, Operator::InNext, vec![interval.into()])
    }

    /// `[field, "datematch", date]` — component-wise date match.
    ///
    /// `date` is a partial date mapping such as `json!({"year": 2011})`;
    /// every supplied component must equal the target date's.
    pub fn date_match(field: impl Into<String>, date: impl Into<Value>) -> Self {
        Self::compare(field, Operator::DateMatch, vec![date.into()])
    }

    /// `[field, "contains", pattern]` — shell-glob match (`*`/`?` wildcards)
    /// against a string field.
    pub fn contains(field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Contains, vec![pattern.into()])
    }

    /// `[field, "any", value]` — membership test against an array field.
    pub fn any(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Any, vec![value.into()])
    }

    /// `[field, "in", v1, v2, ...]` — set membership. The candidate values
    /// splice directly into the serialized sequence rather than nesting as
    /// a sub-array.
    pub fn is_in(
        field: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Self::compare(
            field,
            Operator::In,
            values.into_iter().map(Into::into).collect(),
        )
    }

    /// `[field, "zip-radius:<radius>", zip]` — zip codes within `radius`
    /// miles of the center `zip`. The radius is baked into the operator
    /// string; the remote service only accepts 5, 10, 15, 20, 25 or 50
    /// miles, so any other radius fails here with
    /// [`ApiError::InvalidRadius`].
    pub fn zip_radius(
        field: impl Into<String>,
        radius: u32,
        zip: impl ToString,
    ) -> Result<Self, ApiError> {
        if !ALLOWED_RADII.contains(&radius) {
            return Err(ApiError::InvalidRadius(radius));
        }
        Ok(Self::compare(
            field,
            Operator::ZipRadius(radius),
            vec![Value::String(zip.to_string())],
        ))
    }

    /// Logical AND of `self` and `other`, in that order. Also available as
    /// the `&` operator.
    pub fn and(self, other: Query) -> Self {
        Query::And(Box::new(self), Box::new(other))
    }

    /// Logical OR of `self` and `other`, in that order. Also available as
    /// the `|` operator.
    pub fn or(self, other: Query) -> Self {
        Query::Or(Box::new(self), Box::new(other))
    }

    /// Logical NOT of `self`. Also available as the `!` operator.
    pub fn negate(self) -> Self {
        Query::Not(Box::new(self))
    }

    /// Serialize to the nested-array wire shape.
    ///
    /// Comparison nodes become `[field, code, operand, ...]` with operands
    /// spliced at the top level; AND/OR become `["and"|"or", left, right]`
    /// with both children fully serialized, and NOT becomes
    /// `["not", child]`. Nested combinators stay nested — `a & b & c` is
    /// `["and", ["and", a, b], c]`, never a flattened 3-ary form. Operand
    /// values pass through untouched.
    pub fn to_value(&self) -> Value {
        match self {
            Query::Compare { field, op, operands } => {
                let mut seq = Vec::with_capacity(2 + operands.len());
                seq.push(Value::String(field.clone()));
                seq.push(Value::String(op.code()));
                seq.extend(operands.iter().cloned());
                Value::Array(seq)
            }
            Query::And(left, right) => Value::Array(vec![
                Value::String("and".to_string()),
                left.to_value(),
                right.to_value(),
            ]),
            Query::Or(left, right) => Value::Array(vec![
                Value::String("or".to_string()),
                left.to_value(),
                right.to_value(),
            ]),
            Query::Not(child) => Value::Array(vec![
                Value::String("not".to_string()),
                child.to_value(),
            ]),
        }
    }
}

/// Renders the compact JSON form of [`Query::to_value`].
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl ops::BitAnd for Query {
    type Output = Query;

    fn bitand(self, other: Query) -> Query {
        self.and(other)
    }
}

impl ops::BitOr for Query {
    type Output = Query;

    fn bitor(self, other: Query) -> Query {
        self.or(other)
    }
}

impl ops::Not for Query {
    type Output = Query;

    fn not(self) -> Query {
        self.negate()
    }
}
