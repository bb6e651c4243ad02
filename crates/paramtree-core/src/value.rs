//! Parameter values and the value-kind allow-list.
//!
//! A [`ParamValue`] is a closed set of kinds decided when the value is built.
//! [`ValueTypeValidator`] narrows that set further per factory, so a host can
//! for example forbid deferred values in a given tree.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParamError, Result};

/// Numeric payload of a [`ParamValue::Number`].
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

// Floats compare by bit pattern: NaN equals itself and 0.0 differs from -0.0,
// so an item is always equal to its own clone.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
        }
    }
}

type SupplierFn = dyn Fn() -> ParamValue + Send + Sync;
type ConsumerFn = dyn Fn(&ParamValue) + Send + Sync;
type FunctionFn = dyn Fn(&ParamValue) -> ParamValue + Send + Sync;

/// A value computed or consumed later rather than stored up front.
#[derive(Clone)]
pub enum Deferred {
    /// Zero-argument producer.
    Supplier(Arc<SupplierFn>),
    /// One-argument sink.
    Consumer(Arc<ConsumerFn>),
    /// One-argument transformation.
    Function(Arc<FunctionFn>),
}

impl Deferred {
    /// Evaluate a supplier. Other shapes need an argument and return `None`.
    pub fn get(&self) -> Option<ParamValue> {
        match self {
            Self::Supplier(f) => Some(f()),
            _ => None,
        }
    }

    /// Feed `input` to a consumer. Returns false for other shapes.
    pub fn accept(&self, input: &ParamValue) -> bool {
        match self {
            Self::Consumer(f) => {
                f(input);
                true
            }
            _ => false,
        }
    }

    /// Apply a function to `input`.
    pub fn apply(&self, input: &ParamValue) -> Option<ParamValue> {
        match self {
            Self::Function(f) => Some(f(input)),
            _ => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Supplier(_) => ValueKind::Supplier,
            Self::Consumer(_) => ValueKind::Consumer,
            Self::Function(_) => ValueKind::Function,
        }
    }

    fn addr(&self) -> *const () {
        match self {
            Self::Supplier(f) => Arc::as_ptr(f) as *const (),
            Self::Consumer(f) => Arc::as_ptr(f) as *const (),
            Self::Function(f) => Arc::as_ptr(f) as *const (),
        }
    }
}

// Callables have no structural equality; two deferred values are equal only
// when they share the same closure.
impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.addr() == other.addr()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deferred::{:?}({:p})", self.kind(), self.addr())
    }
}

/// The value held by a parameter item.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(Number),
    DateTime(DateTime<Utc>),
    Path(PathBuf),
    Deferred(Deferred),
}

impl ParamValue {
    pub fn supplier<F>(f: F) -> Self
    where
        F: Fn() -> ParamValue + Send + Sync + 'static,
    {
        Self::Deferred(Deferred::Supplier(Arc::new(f)))
    }

    pub fn consumer<F>(f: F) -> Self
    where
        F: Fn(&ParamValue) + Send + Sync + 'static,
    {
        Self::Deferred(Deferred::Consumer(Arc::new(f)))
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&ParamValue) -> ParamValue + Send + Sync + 'static,
    {
        Self::Deferred(Deferred::Function(Arc::new(f)))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Number(_) => ValueKind::Number,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Path(_) => ValueKind::Path,
            Self::Deferred(d) => d.kind(),
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Deferred(d) => write!(f, "<{}>", d.kind()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::Integer(value))
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Number(Number::Integer(i64::from(value)))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<PathBuf> for ParamValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

/// Converts a TOML value from a layout file.
///
/// Paths are written as `{ path = "..." }`; booleans, arrays and any other
/// table shape are rejected.
impl TryFrom<toml::Value> for ParamValue {
    type Error = ParamError;

    fn try_from(value: toml::Value) -> Result<Self> {
        match value {
            toml::Value::String(s) => Ok(Self::Text(s)),
            toml::Value::Integer(n) => Ok(Self::Number(Number::Integer(n))),
            toml::Value::Float(n) => Ok(Self::Number(Number::Float(n))),
            toml::Value::Datetime(dt) => datetime_from_toml(&dt).map(Self::DateTime),
            toml::Value::Table(table) => match table.get("path") {
                Some(toml::Value::String(p)) if table.len() == 1 => {
                    Ok(Self::Path(PathBuf::from(p)))
                }
                _ => Err(ParamError::InvalidValueType {
                    kind: "table".into(),
                }),
            },
            toml::Value::Boolean(_) => Err(ParamError::InvalidValueType {
                kind: "boolean".into(),
            }),
            toml::Value::Array(_) => Err(ParamError::InvalidValueType {
                kind: "array".into(),
            }),
        }
    }
}

fn datetime_from_toml(dt: &toml::value::Datetime) -> Result<DateTime<Utc>> {
    let raw = dt.to_string();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    // Local date-times carry no offset and are taken as UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Some(midnight) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(ParamError::InvalidValueType {
        kind: format!("time '{}'", raw),
    })
}

/// Kinds a [`ParamValue`] can take.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Text,
    Number,
    DateTime,
    Path,
    Supplier,
    Consumer,
    Function,
}

impl ValueKind {
    pub fn all() -> &'static [ValueKind] {
        &[
            Self::Text,
            Self::Number,
            Self::DateTime,
            Self::Path,
            Self::Supplier,
            Self::Consumer,
            Self::Function,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::DateTime => "date-time",
            Self::Path => "path",
            Self::Supplier => "supplier",
            Self::Consumer => "consumer",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ValueKind {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.id() == s.trim())
            .ok_or_else(|| ParamError::InvalidValueType {
                kind: s.to_string(),
            })
    }
}

/// Gatekeeps which value kinds an item may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTypeValidator {
    allowed: BTreeSet<ValueKind>,
}

impl ValueTypeValidator {
    pub fn new(allowed: impl IntoIterator<Item = ValueKind>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn allows(&self, kind: ValueKind) -> bool {
        self.allowed.contains(&kind)
    }

    /// Pass `value` through if its kind is allowed.
    pub fn validate(&self, value: ParamValue) -> Result<ParamValue> {
        let kind = value.kind();
        if !self.allows(kind) {
            return Err(ParamError::invalid_kind(kind));
        }
        Ok(value)
    }
}

impl Default for ValueTypeValidator {
    fn default() -> Self {
        Self::new(ValueKind::all().iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_validator_allows_every_kind() {
        let validator = ValueTypeValidator::default();
        for kind in ValueKind::all() {
            assert!(validator.allows(*kind), "{} should be allowed", kind);
        }
        assert!(validator.validate(ParamValue::from("x")).is_ok());
        assert!(validator.validate(ParamValue::supplier(|| 1.into())).is_ok());
    }

    #[test]
    fn test_restricted_validator_rejects_kind() {
        let validator = ValueTypeValidator::new([ValueKind::Text, ValueKind::Number]);
        assert!(validator.validate(ParamValue::from(2)).is_ok());

        let err = validator
            .validate(ParamValue::from(PathBuf::from("/tmp")))
            .unwrap_err();
        assert!(matches!(err, ParamError::InvalidValueType { ref kind } if kind == "path"));
    }

    #[test]
    fn test_deferred_equality_is_identity() {
        let a = ParamValue::supplier(|| ParamValue::from("v"));
        let b = ParamValue::supplier(|| ParamValue::from("v"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_deferred_shapes() {
        let supplier = ParamValue::supplier(|| ParamValue::from(42));
        let ParamValue::Deferred(d) = &supplier else {
            panic!("expected deferred");
        };
        assert_eq!(d.get(), Some(ParamValue::from(42)));
        assert_eq!(d.apply(&ParamValue::from(1)), None);

        let double = ParamValue::function(|v| match v.as_number() {
            Some(Number::Integer(n)) => ParamValue::from(n * 2),
            _ => v.clone(),
        });
        let ParamValue::Deferred(d) = &double else {
            panic!("expected deferred");
        };
        assert_eq!(d.apply(&ParamValue::from(21)), Some(ParamValue::from(42)));

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let sink = ParamValue::consumer(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let ParamValue::Deferred(d) = &sink else {
            panic!("expected deferred");
        };
        assert!(d.accept(&ParamValue::from("x")));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(sink.kind(), ValueKind::Consumer);
    }

    #[test]
    fn test_value_kind_parse() {
        assert_eq!("date-time".parse::<ValueKind>().unwrap(), ValueKind::DateTime);
        assert_eq!(" path ".parse::<ValueKind>().unwrap(), ValueKind::Path);
        assert!("boolean".parse::<ValueKind>().is_err());
    }

    #[test]
    fn test_from_toml_scalars() {
        let doc: toml::Table = toml::from_str(
            r#"
            s = "hello"
            i = 1000
            f = 2.5
            d = 2024-03-01T10:00:00Z
            l = 2024-03-01T10:00:00
            day = 2024-03-01
            p = { path = "/etc/hosts" }
            "#,
        )
        .unwrap();

        let get = |k: &str| ParamValue::try_from(doc[k].clone()).unwrap();
        assert_eq!(get("s"), ParamValue::from("hello"));
        assert_eq!(get("i"), ParamValue::from(1000));
        assert_eq!(get("f"), ParamValue::from(2.5));

        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(get("d"), ParamValue::DateTime(expected));
        assert_eq!(get("l"), ParamValue::DateTime(expected));
        assert_eq!(
            get("day"),
            ParamValue::DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(get("p"), ParamValue::Path(PathBuf::from("/etc/hosts")));
    }

    #[test]
    fn test_from_toml_rejects_unknown_kinds() {
        let doc: toml::Table = toml::from_str(
            r#"
            b = true
            a = [1, 2]
            t = { path = "/x", extra = 1 }
            "#,
        )
        .unwrap();

        for key in ["b", "a", "t"] {
            let err = ParamValue::try_from(doc[key].clone()).unwrap_err();
            assert!(
                matches!(err, ParamError::InvalidValueType { .. }),
                "{} should be rejected, got {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        let nan = ParamValue::from(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(ParamValue::from(0.0), ParamValue::from(-0.0));
        assert_ne!(ParamValue::from(1.0), ParamValue::from(1));
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamValue::from(1000).to_string(), "1000");
        assert_eq!(ParamValue::from("v").to_string(), "v");
        assert_eq!(
            ParamValue::function(|v| v.clone()).to_string(),
            "<function>"
        );
    }
}
