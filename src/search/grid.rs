//! Hyperparameter grids

use crate::error::{NestError, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }

    /// Integer view; floats with no fractional part are accepted
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// One hyperparameter combination, in grid order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    entries: Vec<(String, ParamValue)>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<S: Into<String>>(pairs: Vec<(S, ParamValue)>) -> Self {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, name: &str, value: ParamValue) {
        self.entries.push((name.to_string(), value));
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for ParamSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A named parameter and its candidate values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamAxis {
    pub name: String,
    pub values: Vec<ParamValue>,
}

/// Mapping from parameter name to candidate values; evaluated as a Cartesian product.
///
/// Names keep insertion order and the last name varies fastest, so
/// `C ∈ {1, 10}, gamma ∈ {0.01, 0.1}` enumerates
/// `{C: 1, gamma: 0.01}, {C: 1, gamma: 0.1}, {C: 10, gamma: 0.01}, ...`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamGrid {
    axes: Vec<ParamAxis>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter with its candidate values
    pub fn add<V, I>(mut self, name: impl Into<String>, values: I) -> Self
    where
        V: Into<ParamValue>,
        I: IntoIterator<Item = V>,
    {
        self.axes.push(ParamAxis {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn axes(&self) -> &[ParamAxis] {
        &self.axes
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject empty value lists and repeated names
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for axis in &self.axes {
            if axis.values.is_empty() {
                return Err(NestError::ConfigError(format!(
                    "parameter '{}' has no candidate values",
                    axis.name
                )));
            }
            if !seen.insert(axis.name.as_str()) {
                return Err(NestError::ConfigError(format!(
                    "parameter '{}' appears twice in the grid",
                    axis.name
                )));
            }
        }
        Ok(())
    }

    /// Every combination, in enumeration order
    pub fn candidates(&self) -> Result<Vec<ParamSet>> {
        self.validate()?;

        let total = self.len();
        let mut out = Vec::with_capacity(total);
        for flat in 0..total {
            // Mixed-radix decode with the last axis as the least significant digit
            let mut digits = vec![0usize; self.axes.len()];
            let mut rest = flat;
            for (slot, axis) in digits.iter_mut().zip(&self.axes).rev() {
                *slot = rest % axis.values.len();
                rest /= axis.values.len();
            }

            let mut params = ParamSet::new();
            for (axis, &d) in self.axes.iter().zip(&digits) {
                params.push(&axis.name, axis.values[d].clone());
            }
            out.push(params);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc_grid() -> ParamGrid {
        ParamGrid::new()
            .add("C", [1.0, 10.0, 100.0])
            .add("gamma", [0.01, 0.1])
    }

    #[test]
    fn test_grid_len_and_order() {
        let grid = svc_grid();
        assert_eq!(grid.len(), 6);

        let candidates = grid.candidates().unwrap();
        let rendered: Vec<String> = candidates.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "{C: 1, gamma: 0.01}",
                "{C: 1, gamma: 0.1}",
                "{C: 10, gamma: 0.01}",
                "{C: 10, gamma: 0.1}",
                "{C: 100, gamma: 0.01}",
                "{C: 100, gamma: 0.1}",
            ]
        );
    }

    #[test]
    fn test_empty_grid_has_single_candidate() {
        let candidates = ParamGrid::new().candidates().unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].is_empty());
    }

    #[test]
    fn test_empty_values_rejected() {
        let grid = ParamGrid::new().add("C", Vec::<f64>::new());
        assert!(grid.is_empty());
        assert!(matches!(grid.candidates(), Err(NestError::ConfigError(_))));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let grid = ParamGrid::new().add("C", [1.0]).add("C", [2.0]);
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_mixed_value_types() {
        let grid = ParamGrid::new()
            .add("kernel", ["linear", "rbf"])
            .add("degree", [2, 3]);
        let candidates = grid.candidates().unwrap();
        assert_eq!(candidates[3].get("kernel"), Some(&ParamValue::Text("rbf".into())));
        assert_eq!(candidates[3].get("degree").and_then(|v| v.as_i64()), Some(3));
    }

    #[test]
    fn test_grid_json_round_trip() {
        let json = r#"[{"name":"C","values":[1,10]},{"name":"gamma","values":[0.5]}]"#;
        let grid: ParamGrid = serde_json::from_str(json).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.axes()[0].values[1], ParamValue::Int(10));
        assert_eq!(grid.axes()[1].values[0], ParamValue::Float(0.5));
    }

    #[test]
    fn test_param_set_serializes_as_map() {
        let params = ParamSet::from_pairs(vec![("C", ParamValue::Int(10))]);
        assert_eq!(serde_json::to_string(&params).unwrap(), r#"{"C":10}"#);
    }
}
