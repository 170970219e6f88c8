//! Typed id lists. Comma-joined strings are only the storage encoding.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Parse a boundary id: a non-negative JSON integer or a numeric string.
pub fn parse_id(value: &Value) -> Result<i32, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if i < 0 {
                    return Err("id cannot be negative".into());
                }
                i32::try_from(i).map_err(|_| format!("id out of range: {}", i))
            } else if n.as_u64().is_some() {
                Err(format!("id out of range: {}", n))
            } else if n.as_f64().map(|f| f < 0.0).unwrap_or(false) {
                Err("id cannot be negative".into())
            } else {
                Err(format!("id must be an integer: {}", n))
            }
        }
        Value::String(s) => parse_id_str(s),
        Value::Null => Err("id is required".into()),
        other => Err(format!("unsupported id type: {}", json_type(other))),
    }
}

pub fn parse_id_str(s: &str) -> Result<i32, String> {
    if s.is_empty() {
        return Err("id cannot be empty".into());
    }
    let n: u32 = s.parse().map_err(|_| format!("invalid id format: {}", s))?;
    i32::try_from(n).map_err(|_| format!("id out of range: {}", s))
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Ordered, duplicate-free list of entity ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList(Vec<i32>);

impl IdList {
    pub fn new() -> Self { Self::default() }

    /// Push unless already present; keeps first-seen order.
    pub fn push(&mut self, id: i32) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    /// Read the stored form, skipping blank tokens. Tokens that are not ids are
    /// returned separately so callers can log them.
    pub fn parse_lenient(stored: &str) -> (Self, Vec<String>) {
        let mut ids = IdList::new();
        let mut rejected = Vec::new();
        for token in stored.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match parse_id_str(token) {
                Ok(id) => ids.push(id),
                Err(_) => rejected.push(token.to_string()),
            }
        }
        (ids, rejected)
    }

    pub fn to_stored(&self) -> String {
        self.0.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ { self.0.iter().copied() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<i32> for IdList {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        let mut ids = IdList::new();
        for id in iter {
            ids.push(id);
        }
        ids
    }
}

impl FromStr for IdList {
    type Err = String;

    /// Strict form: every non-blank token must be an id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ids = IdList::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            ids.push(parse_id_str(token)?);
        }
        Ok(ids)
    }
}

impl fmt::Display for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored())
    }
}

impl Serialize for IdList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Accepts `"1,2"` or `[1, "2"]`.
impl<'de> Deserialize<'de> for IdList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse().map_err(de::Error::custom),
            Value::Array(items) => items
                .iter()
                .map(parse_id)
                .collect::<Result<IdList, _>>()
                .map_err(de::Error::custom),
            Value::Null => Ok(IdList::new()),
            other => Err(de::Error::custom(format!("unsupported id list type: {}", json_type(&other)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_id_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_id(&json!(7)), Ok(7));
        assert_eq!(parse_id(&json!("42")), Ok(42));
        assert_eq!(parse_id(&json!(0)), Ok(0));
    }

    #[test]
    fn parse_id_rejects_bad_values_with_reason() {
        assert_eq!(parse_id(&json!(-1)), Err("id cannot be negative".to_string()));
        assert_eq!(parse_id(&json!("")), Err("id cannot be empty".to_string()));
        assert!(parse_id(&json!("12a")).unwrap_err().contains("invalid id format"));
        assert!(parse_id(&json!("-3")).unwrap_err().contains("invalid id format"));
        assert!(parse_id(&json!(1.5)).unwrap_err().contains("integer"));
        assert!(parse_id(&json!(true)).unwrap_err().contains("unsupported id type"));
        assert!(parse_id(&json!(5_000_000_000u64)).unwrap_err().contains("out of range"));
    }

    #[test]
    fn lenient_parse_keeps_order_and_drops_duplicates() {
        let (ids, rejected) = IdList::parse_lenient(" 3, 1,,3 ,x, 2");
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(rejected, vec!["x".to_string()]);
        assert_eq!(ids.to_stored(), "3,1,2");
    }

    #[test]
    fn strict_parse_fails_on_garbage() {
        assert!("1,abc".parse::<IdList>().is_err());
        assert!("".parse::<IdList>().unwrap().is_empty());
    }

    #[test]
    fn deserializes_from_string_or_array() {
        let a: IdList = serde_json::from_value(json!("4,5")).unwrap();
        let b: IdList = serde_json::from_value(json!([4, "5"])).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_value::<IdList>(json!([-1])).is_err());
    }
}
