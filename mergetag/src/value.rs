use std::{collections::BTreeMap, ffi::OsStr, fmt, fs, path::Path, str::FromStr};

use serde::{
    ser::{SerializeMap, SerializeSeq},
    Deserialize, Deserializer, Serialize,
};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use serde_yaml::{Number as YamlNumber, Value as YamlValue};
use toml::Value as TomlValue;

use crate::Error;

/// We use [`std::collections::BTreeMap`] as our default map structure.
pub type Map<K, V> = BTreeMap<K, V>;

/// A single record of a tabular dataset, mapping field names to values.
pub type Row = Map<String, Value>;

/// The supported file formats from which we can load [`Value`] instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SupportedFormat {
    Json,
    Yaml,
    Toml,
}

impl FromStr for SupportedFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Ok(match lower.as_ref() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            _ => return Err(Error::UnsupportedFileType(s.to_string())),
        })
    }
}

/// A dynamically typed value, as supplied by the host's widgets and APIs.
///
/// Converting a value to a string (through its [`fmt::Display`]
/// implementation) follows the same coercion rules the host applies when it
/// concatenates values into text, e.g. `0` becomes `"0"` and `2.0` becomes
/// `"2"`.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    Null,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(Map<String, Value>),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl Value {
    /// Attempts to create a new value by parsing it from a string using the
    /// given format.
    pub fn load_as(fmt: SupportedFormat, content: &str) -> Result<Self, Error> {
        match fmt {
            SupportedFormat::Json => Ok(Self::from(serde_json::from_str::<JsonValue>(content)?)),
            SupportedFormat::Yaml => Self::try_from(serde_yaml::from_str::<YamlValue>(content)?),
            SupportedFormat::Toml => Self::try_from(toml::from_str::<TomlValue>(content)?),
        }
    }

    /// Attempts to create a new value by loading it from the given file.
    /// Automatically detects the file format from the file's extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .ok_or_else(|| Error::CannotDetermineFileType(path.to_path_buf()))?;
        let fmt = SupportedFormat::from_str(ext)
            .map_err(|e| Error::LoadFromFile(path.to_path_buf(), Box::new(e)))?;
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
        Self::load_as(fmt, &content)
            .map_err(|e| Error::LoadFromFile(path.to_path_buf(), Box::new(e)))
    }

    /// Null is the only value the templating layer treats as "missing".
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this value would pass a truthiness check in the host's
    /// scripting environment. `null`, `false`, zero, `NaN` and the empty
    /// string are falsy; everything else (including empty arrays and maps)
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Signed(i) => *i != 0,
            Self::Unsigned(u) => *u != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Map(_) => true,
        }
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<Map<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Signed(i) => write!(f, "{}", i),
            Self::Unsigned(u) => write!(f, "{}", u),
            Self::Float(x) => write!(f, "{}", format_float(*x)),
            Self::String(s) => write!(f, "{}", s),
            Self::Array(arr) => {
                // Nulls inside arrays are joined as empty strings.
                let parts = arr
                    .iter()
                    .map(|v| if v.is_null() { String::new() } else { v.to_string() })
                    .collect::<Vec<String>>();
                write!(f, "{}", parts.join(","))
            }
            Self::Map(_) => write!(f, "[object Object]"),
        }
    }
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        let s = if x > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if x == 0.0 {
        // Covers negative zero too.
        "0".to_string()
    } else if x.abs() >= 1e21 || x.abs() < 1e-6 {
        // Exponent form, with an explicit sign on positive exponents.
        let s = format!("{:e}", x);
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => s,
        }
    } else if x.fract() == 0.0 {
        format!("{:.0}", x)
    } else {
        format!("{}", x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Signed(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Self::Unsigned(u)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(maybe: Option<T>) -> Self {
        maybe.map(Into::into).unwrap_or(Self::Null)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Signed(i) => serializer.serialize_i64(*i),
            Value::Unsigned(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for el in arr {
                    seq.serialize_element(el)?;
                }
                seq.end()
            }
            Value::Map(m) => {
                let mut sm = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    sm.serialize_entry(k, v)?;
                }
                sm.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(Self::from)
    }
}

impl From<Value> for JsonValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Signed(i) => i.into(),
            Value::Unsigned(u) => u.into(),
            // Non-finite floats have no JSON representation.
            Value::Float(f) => JsonNumber::from_f64(f)
                .map(Self::Number)
                .unwrap_or(Self::Null),
            Value::String(s) => Self::String(s),
            Value::Array(arr) => Self::Array(arr.into_iter().map(Into::into).collect()),
            Value::Map(m) => Self::Object(JsonMap::from_iter(
                m.into_iter().map(|(k, v)| (k, v.into())),
            )),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => Self::from(n),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(arr) => Self::Array(arr.into_iter().map(Into::into).collect()),
            JsonValue::Object(obj) => {
                Self::Map(Map::from_iter(obj.into_iter().map(|(k, v)| (k, v.into()))))
            }
        }
    }
}

impl From<JsonNumber> for Value {
    fn from(value: JsonNumber) -> Self {
        if let Some(u) = value.as_u64() {
            Self::Unsigned(u)
        } else if let Some(i) = value.as_i64() {
            Self::Signed(i)
        } else {
            Self::Float(value.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl TryFrom<YamlValue> for Value {
    type Error = Error;

    fn try_from(value: YamlValue) -> Result<Self, Self::Error> {
        Ok(match value {
            YamlValue::Null => Self::Null,
            YamlValue::Bool(b) => Self::Bool(b),
            YamlValue::Number(n) => Self::from(n),
            YamlValue::String(s) => Self::String(s),
            YamlValue::Sequence(seq) => Self::Array(
                seq.into_iter()
                    .map(TryInto::try_into)
                    .collect::<Result<Vec<Self>, Error>>()?,
            ),
            YamlValue::Mapping(m) => Self::Map(
                m.into_iter()
                    .map(|(k, v)| match k {
                        YamlValue::String(k) => Ok((k, v.try_into()?)),
                        _ => Err(Error::ObjectKeysMustBeStrings),
                    })
                    .collect::<Result<Map<String, Self>, Error>>()?,
            ),
        })
    }
}

impl From<YamlNumber> for Value {
    fn from(value: YamlNumber) -> Self {
        if let Some(u) = value.as_u64() {
            Self::Unsigned(u)
        } else if let Some(i) = value.as_i64() {
            Self::Signed(i)
        } else {
            Self::Float(value.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl TryFrom<TomlValue> for Value {
    type Error = Error;

    fn try_from(value: TomlValue) -> Result<Self, Self::Error> {
        Ok(match value {
            TomlValue::String(s) => Self::String(s),
            TomlValue::Integer(i) => Self::Signed(i),
            TomlValue::Float(f) => Self::Float(f),
            TomlValue::Boolean(b) => Self::Bool(b),
            TomlValue::Datetime(dt) => Self::String(dt.to_string()),
            TomlValue::Array(arr) => Self::Array(
                arr.into_iter()
                    .map(TryInto::try_into)
                    .collect::<Result<Vec<Self>, Error>>()?,
            ),
            TomlValue::Table(t) => Self::Map(
                t.into_iter()
                    .map(|(k, v)| Ok((k, Self::try_from(v)?)))
                    .collect::<Result<Map<String, Self>, Error>>()?,
            ),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_coercion() {
        let cases: Vec<(Value, &str)> = vec![
            (Value::Null, "null"),
            (Value::Bool(true), "true"),
            (Value::Unsigned(0), "0"),
            (Value::Signed(-3), "-3"),
            (Value::Float(2.0), "2"),
            (Value::Float(1.5), "1.5"),
            (Value::Float(-0.0), "0"),
            (Value::Float(1e21), "1e+21"),
            (Value::Float(-1.5e21), "-1.5e+21"),
            (Value::Float(1e20), "100000000000000000000"),
            (Value::Float(1e-7), "1e-7"),
            (Value::Float(0.000001), "0.000001"),
            (Value::Float(f64::INFINITY), "Infinity"),
            (Value::from("plain"), "plain"),
            (
                Value::Array(vec![Value::Unsigned(1), Value::Null, Value::from("x")]),
                "1,,x",
            ),
            (Value::Map(Map::new()), "[object Object]"),
        ];
        for (value, expected) in cases {
            assert_eq!(value.to_string(), expected, "coercing {:?}", value);
        }
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::Unsigned(0).is_truthy());
        assert!(!Value::Float(f64::NAN).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::from("name").is_truthy());
        assert!(Value::Signed(-1).is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
    }

    #[test]
    fn json_numbers_keep_their_kind() {
        let v = Value::from(json!({ "a": 1, "b": -1, "c": 1.25 }));
        let m = v.as_map().unwrap();
        assert_eq!(m.get("a"), Some(&Value::Unsigned(1)));
        assert_eq!(m.get("b"), Some(&Value::Signed(-1)));
        assert_eq!(m.get("c"), Some(&Value::Float(1.25)));
    }

    #[test]
    fn yaml_and_toml_loading() {
        let yaml = Value::load_as(SupportedFormat::Yaml, "name: Ada\nage: 36\n").unwrap();
        let yaml = yaml.into_map().unwrap();
        assert_eq!(yaml.get("name"), Some(&Value::from("Ada")));
        assert_eq!(yaml.get("age"), Some(&Value::Unsigned(36)));

        let toml = Value::load_as(SupportedFormat::Toml, "name = \"Ada\"\nage = 36\n").unwrap();
        let toml = toml.into_map().unwrap();
        assert_eq!(toml.get("age"), Some(&Value::Signed(36)));
    }

    #[test]
    fn yaml_keys_must_be_strings() {
        let result = Value::load_as(SupportedFormat::Yaml, "1: one\n");
        assert!(matches!(result, Err(Error::ObjectKeysMustBeStrings)));
    }

    #[test]
    fn unsupported_format() {
        assert!(matches!(
            SupportedFormat::from_str("csv"),
            Err(Error::UnsupportedFileType(_))
        ));
        assert_eq!(SupportedFormat::from_str("YML").unwrap(), SupportedFormat::Yaml);
    }

    #[test]
    fn deserializes_through_json() {
        let v: Value = serde_json::from_str(r#"{"list": [true, null, "x"]}"#).unwrap();
        assert_eq!(
            JsonValue::from(v),
            json!({ "list": [true, null, "x"] })
        );
    }
}
