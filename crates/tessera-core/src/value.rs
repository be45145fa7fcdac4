//! The tagged value carried by every parameter and pin.
//!
//! [`ParameterValue`] is a closed sum type. Internal logic matches on it
//! exhaustively; the public typed boundary ([`ParameterValue::get`],
//! [`ParameterValue::to`], [`Parameter::set`](crate::Parameter::set)) keeps
//! a runtime type check because pins are wired from external configuration
//! and their types are not known at compile time.
//!
//! ## Exact vs. coerced reads
//!
//! - [`get`](ParameterValue::get) succeeds only when the stored variant is
//!   exactly `T`.
//! - [`to`](ParameterValue::to) additionally converts between the numeric
//!   variants (float, double, int64, bool). Float to int truncates toward
//!   zero; bool reads as `0`/`1` and numbers read as bool when non-zero.
//!   Strings and data handles never coerce.
//!
//! ```rust
//! use tessera_core::{ParameterValue, ValueType};
//!
//! let v = ParameterValue::from(2.75f32);
//! assert_eq!(v.value_type(), ValueType::Float);
//! assert_eq!(v.get::<f32>(), Ok(2.75));
//! assert!(v.get::<i64>().is_err());
//! assert_eq!(v.to::<i64>(), Ok(2));
//! ```

use core::fmt;

use crate::control::ControlHandle;
use crate::error::TypeMismatch;
use crate::flow::FlowHandle;

/// Runtime tag for the active [`ParameterValue`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// Untyped; the first assignment fixes the type.
    #[default]
    None,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// 64-bit signed integer.
    Int64,
    /// Boolean.
    Bool,
    /// Owned UTF-8 string.
    String,
    /// Handle to a multi-channel [`FlowData`](crate::FlowData) buffer.
    Flow,
    /// Handle to a [`ControlData`](crate::ControlData) event list.
    Control,
}

impl ValueType {
    /// Lowercase name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Int64 => "int64",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Flow => "flow",
            ValueType::Control => "control",
        }
    }

    /// Whether values of this type ramp over time when set non-immediately.
    #[inline]
    pub const fn is_interpolable(self) -> bool {
        matches!(
            self,
            ValueType::Float | ValueType::Double | ValueType::Int64 | ValueType::Bool
        )
    }

    /// Whether [`ParameterValue::to`] can coerce between values of this type.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.is_interpolable()
    }

    /// Flow and control pins carry buffers rather than scalars and take part
    /// in eager dependency scheduling.
    #[inline]
    pub const fn is_stream(self) -> bool {
        matches!(self, ValueType::Flow | ValueType::Control)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value holding exactly one variant at a time.
#[derive(Debug, Clone, Default)]
pub enum ParameterValue {
    /// No value yet.
    #[default]
    None,
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// 64-bit signed integer.
    Int64(i64),
    /// Boolean.
    Bool(bool),
    /// Owned string.
    String(String),
    /// Shared flow-data buffer.
    Flow(FlowHandle),
    /// Shared control-event list.
    Control(ControlHandle),
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            // Handles compare by identity: same underlying buffer.
            (Self::Flow(a), Self::Flow(b)) => a.ptr_eq(b),
            (Self::Control(a), Self::Control(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl ParameterValue {
    /// Runtime tag of the active variant.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::None => ValueType::None,
            Self::Float(_) => ValueType::Float,
            Self::Double(_) => ValueType::Double,
            Self::Int64(_) => ValueType::Int64,
            Self::Bool(_) => ValueType::Bool,
            Self::String(_) => ValueType::String,
            Self::Flow(_) => ValueType::Flow,
            Self::Control(_) => ValueType::Control,
        }
    }

    /// Returns `true` for the untyped `None` variant.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Exact read: fails unless the stored variant is `T`.
    pub fn get<T: ValueKind>(&self) -> Result<T, TypeMismatch> {
        T::from_value(self).ok_or_else(|| TypeMismatch::new(T::TYPE, self.value_type()))
    }

    /// Coercing read: like [`get`](Self::get) but converts between numeric
    /// variants.
    pub fn to<T: ValueKind>(&self) -> Result<T, TypeMismatch> {
        T::coerce(self).ok_or_else(|| TypeMismatch::new(T::TYPE, self.value_type()))
    }

    /// Numeric view of a float/double/int64/bool value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            Self::Int64(v) => Some(*v as f64),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::None | Self::String(_) | Self::Flow(_) | Self::Control(_) => None,
        }
    }

    /// Returns the flow handle if this is a flow value.
    pub fn as_flow(&self) -> Option<&FlowHandle> {
        match self {
            Self::Flow(h) => Some(h),
            _ => None,
        }
    }

    /// Returns the control handle if this is a control value.
    pub fn as_control(&self) -> Option<&ControlHandle> {
        match self {
            Self::Control(h) => Some(h),
            _ => None,
        }
    }

    /// Builds a numeric value of type `ty` from a plain number.
    ///
    /// Int64 rounds to the nearest integer, bool is `v >= 0.5`. Returns
    /// `None` for non-numeric types.
    pub fn from_f64_as(ty: ValueType, v: f64) -> Option<Self> {
        match ty {
            ValueType::Float => Some(Self::Float(v as f32)),
            ValueType::Double => Some(Self::Double(v)),
            ValueType::Int64 => Some(Self::Int64(v.round() as i64)),
            ValueType::Bool => Some(Self::Bool(v >= 0.5)),
            ValueType::None | ValueType::String | ValueType::Flow | ValueType::Control => None,
        }
    }

    /// Value at fraction `frac` (0..1) of the way from `start` to `end`.
    ///
    /// Floats snap to `end` once within machine epsilon of it. Integers
    /// truncate. Everything else, and any mismatched pair, yields `end`.
    pub(crate) fn interpolate(start: &Self, end: &Self, frac: f64) -> Self {
        match (start, end) {
            (Self::Float(a), Self::Float(b)) => {
                let a64 = f64::from(*a);
                let v = (a64 + (f64::from(*b) - a64) * frac) as f32;
                if (v - b).abs() <= f32::EPSILON {
                    Self::Float(*b)
                } else {
                    Self::Float(v)
                }
            }
            (Self::Double(a), Self::Double(b)) => {
                let v = a + (b - a) * frac;
                if (v - b).abs() <= f64::EPSILON {
                    Self::Double(*b)
                } else {
                    Self::Double(v)
                }
            }
            (Self::Int64(a), Self::Int64(b)) => {
                let delta = (*b as f64 - *a as f64) * frac;
                Self::Int64(a.saturating_add(delta as i64))
            }
            _ => end.clone(),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
            Self::Flow(h) => write!(f, "<flow {} samples>", h.read().num_samples()),
            Self::Control(h) => write!(f, "<control {} events>", h.read().len()),
        }
    }
}

/// Rust types that map onto one [`ParameterValue`] variant.
pub trait ValueKind: Sized {
    /// The variant this type maps to.
    const TYPE: ValueType;

    /// Wraps `self` in its variant.
    fn into_value(self) -> ParameterValue;

    /// Exact extraction; `None` when the variant differs.
    fn from_value(value: &ParameterValue) -> Option<Self>;

    /// Extraction allowing numeric coercion. Defaults to exact.
    fn coerce(value: &ParameterValue) -> Option<Self> {
        Self::from_value(value)
    }
}

impl ValueKind for f32 {
    const TYPE: ValueType = ValueType::Float;

    fn into_value(self) -> ParameterValue {
        ParameterValue::Float(self)
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn coerce(value: &ParameterValue) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

impl ValueKind for f64 {
    const TYPE: ValueType = ValueType::Double;

    fn into_value(self) -> ParameterValue {
        ParameterValue::Double(self)
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    fn coerce(value: &ParameterValue) -> Option<Self> {
        value.as_f64()
    }
}

impl ValueKind for i64 {
    const TYPE: ValueType = ValueType::Int64;

    fn into_value(self) -> ParameterValue {
        ParameterValue::Int64(self)
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    fn coerce(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Int64(v) => Some(*v),
            other => other.as_f64().map(|v| v as i64),
        }
    }
}

impl ValueKind for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn into_value(self) -> ParameterValue {
        ParameterValue::Bool(self)
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn coerce(value: &ParameterValue) -> Option<Self> {
        value.as_f64().map(|v| v != 0.0)
    }
}

impl ValueKind for String {
    const TYPE: ValueType = ValueType::String;

    fn into_value(self) -> ParameterValue {
        ParameterValue::String(self)
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl ValueKind for FlowHandle {
    const TYPE: ValueType = ValueType::Flow;

    fn into_value(self) -> ParameterValue {
        ParameterValue::Flow(self)
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        value.as_flow().cloned()
    }
}

impl ValueKind for ControlHandle {
    const TYPE: ValueType = ValueType::Control;

    fn into_value(self) -> ParameterValue {
        ParameterValue::Control(self)
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        value.as_control().cloned()
    }
}

impl From<f32> for ParameterValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<bool> for ParameterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for ParameterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<FlowHandle> for ParameterValue {
    fn from(v: FlowHandle) -> Self {
        Self::Flow(v)
    }
}

impl From<ControlHandle> for ParameterValue {
    fn from(v: ControlHandle) -> Self {
        Self::Control(v)
    }
}
