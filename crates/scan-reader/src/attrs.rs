//! Typed attribute decoding.
//!
//! Decoders hand over a flat map of named attributes; each known field is
//! read through an explicit typed getter that fails by name. No coercion
//! beyond the lossless integer-to-float widening that file formats force on
//! us, and no silent defaults.

use std::collections::HashMap;

use radar_common::{RadarError, RadarResult};

/// One decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Long(i64),
    Double(f64),
    Text(String),
    DoubleArray(Vec<f64>),
}

impl AttrValue {
    fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Long(_) => "long",
            AttrValue::Double(_) => "double",
            AttrValue::Text(_) => "text",
            AttrValue::DoubleArray(_) => "double array",
        }
    }
}

/// Attribute map for one scan, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    values: HashMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        self.values.insert(name.into(), value);
    }

    fn fetch(&self, name: &str) -> RadarResult<&AttrValue> {
        self.values
            .get(name)
            .ok_or_else(|| RadarError::MissingAttribute(name.to_string()))
    }

    pub fn long(&self, name: &str) -> RadarResult<i64> {
        match self.fetch(name)? {
            AttrValue::Long(v) => Ok(*v),
            other => Err(mismatch(name, "long", other)),
        }
    }

    /// Non-negative integer attribute as usize (dimensions, counts).
    pub fn dimension(&self, name: &str) -> RadarResult<usize> {
        let v = self.long(name)?;
        usize::try_from(v).map_err(|_| {
            RadarError::MalformedScan(format!("attribute '{}' is negative: {}", name, v))
        })
    }

    /// Double attribute. Long values widen, as some writers store whole
    /// numbers as integers.
    pub fn double(&self, name: &str) -> RadarResult<f64> {
        match self.fetch(name)? {
            AttrValue::Double(v) => Ok(*v),
            AttrValue::Long(v) => Ok(*v as f64),
            other => Err(mismatch(name, "double", other)),
        }
    }

    pub fn text(&self, name: &str) -> RadarResult<&str> {
        match self.fetch(name)? {
            AttrValue::Text(v) => Ok(v),
            other => Err(mismatch(name, "text", other)),
        }
    }

    pub fn double_array(&self, name: &str) -> RadarResult<&[f64]> {
        match self.fetch(name)? {
            AttrValue::DoubleArray(v) => Ok(v),
            other => Err(mismatch(name, "double array", other)),
        }
    }
}

fn mismatch(name: &str, expected: &'static str, found: &AttrValue) -> RadarError {
    tracing::debug!(attribute = name, expected, found = found.type_name(), "attribute type mismatch");
    RadarError::TypeMismatch {
        attribute: name.to_string(),
        expected,
    }
}
