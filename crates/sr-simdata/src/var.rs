//! Simulation variables.

use serde::{Deserialize, Serialize};
use sr_core::Real;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum VarValue {
    Real(Real),
    Int(i64),
    Bool(bool),
    Str(String),
    RealArray(Vec<Real>),
}

impl VarValue {
    pub fn as_real(&self) -> Option<Real> {
        match self {
            VarValue::Real(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Real> for VarValue {
    fn from(v: Real) -> Self {
        VarValue::Real(v)
    }
}

impl From<i64> for VarValue {
    fn from(v: i64) -> Self {
        VarValue::Int(v)
    }
}

impl From<bool> for VarValue {
    fn from(v: bool) -> Self {
        VarValue::Bool(v)
    }
}

impl From<String> for VarValue {
    fn from(v: String) -> Self {
        VarValue::Str(v)
    }
}

impl From<&str> for VarValue {
    fn from(v: &str) -> Self {
        VarValue::Str(v.to_string())
    }
}

impl From<Vec<Real>> for VarValue {
    fn from(v: Vec<Real>) -> Self {
        VarValue::RealArray(v)
    }
}

/// A named variable's value plus optional metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimVar {
    pub value: VarValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SimVar {
    pub fn new(value: impl Into<VarValue>) -> Self {
        Self {
            value: value.into(),
            unit: None,
            description: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
