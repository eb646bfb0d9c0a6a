//! Flattening of nested reports into `(path, leaf)` pairs.
//!
//! Objects contribute their keys and `[key, value]` pair arrays contribute
//! the pair key, so a keyed timing map flattens like an object. Any other
//! array contributes element indices. Object keys come out sorted.

use std::fmt;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// A scalar at the end of a metric path.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf(Value);

impl Leaf {
    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

/// Numeric value of a leaf, reading the textual non-finite forms too.
pub fn leaf_f64(leaf: &Leaf) -> Option<f64> {
    match leaf.value() {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => ptreval_types::float::parse_non_finite(s),
        _ => None,
    }
}

pub fn flatten<T: Serialize + ?Sized>(value: &T) -> Result<Vec<(Vec<String>, Leaf)>> {
    let value = serde_json::to_value(value)?;
    let mut out = Vec::new();
    walk(&value, &mut Vec::new(), &mut out);
    Ok(out)
}

fn walk(value: &Value, path: &mut Vec<String>, out: &mut Vec<(Vec<String>, Leaf)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                walk(child, path, out);
                path.pop();
            }
        }
        Value::Array(items) if items.iter().all(is_pair) => {
            for item in items {
                if let Value::Array(pair) = item
                    && let Value::String(key) = &pair[0]
                {
                    path.push(key.clone());
                    walk(&pair[1], path, out);
                    path.pop();
                }
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                path.push(idx.to_string());
                walk(child, path, out);
                path.pop();
            }
        }
        scalar => out.push((path.clone(), Leaf(scalar.clone()))),
    }
}

fn is_pair(value: &Value) -> bool {
    matches!(value, Value::Array(pair) if pair.len() == 2 && pair[0].is_string())
}

/// CSV column name of a metric path: each segment capitalised, spaces
/// dropped, segments concatenated.
pub fn column_name(path: &[String]) -> String {
    let mut out = String::new();
    for segment in path {
        for word in segment.split_whitespace() {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(value: &Value) -> Vec<String> {
        flatten(value)
            .unwrap()
            .into_iter()
            .map(|(p, _)| p.join("-"))
            .collect()
    }

    #[test]
    fn pair_arrays_flatten_by_key() {
        let value = json!({"perSlice": [["static slicing", {"min": 1}], ["total", {"min": 2}]]});
        assert_eq!(paths(&value), vec!["perSlice-static slicing-min", "perSlice-total-min"]);
    }

    #[test]
    fn plain_arrays_flatten_by_index() {
        let value = json!({"xs": [10, 20]});
        assert_eq!(paths(&value), vec!["xs-0", "xs-1"]);
    }

    #[test]
    fn non_finite_strings_read_as_floats() {
        let leaves = flatten(&json!({"a": "NaN", "b": "-Infinity", "c": 2.5, "d": "text"})).unwrap();
        let values: Vec<Option<f64>> = leaves.iter().map(|(_, l)| leaf_f64(l)).collect();
        assert!(values[0].unwrap().is_nan());
        assert_eq!(values[1], Some(f64::NEG_INFINITY));
        assert_eq!(values[2], Some(2.5));
        assert_eq!(values[3], None);
    }

    #[test]
    fn column_name_capitalises_segments() {
        let path = vec![
            "timePerToken".to_string(),
            "totalPerSlice".to_string(),
            "static slicing".to_string(),
        ];
        assert_eq!(column_name(&path), "TimePerTokenTotalPerSliceStaticSlicing");
    }

    #[test]
    fn leaf_display_has_no_quotes() {
        let leaves = flatten(&json!({"s": "NaN", "n": 3})).unwrap();
        let shown: Vec<String> = leaves.iter().map(|(_, l)| l.to_string()).collect();
        assert_eq!(shown, vec!["3", "NaN"]);
    }
}
