//! Time-interpolated parameters.
//!
//! A [`Parameter`] stores a typed [`ParameterValue`] and ramps numeric
//! changes over a configurable number of ticks ("portamento") so that a
//! control moved between two evaluations glides instead of jumping.
//!
//! ## Ramping
//!
//! - `set(v, true)` snaps: start, current and target all become `v`.
//! - `set(v, false)` starts a ramp from the *current* value to `v`, beginning
//!   at the last tick seen by [`update`](Parameter::update).
//! - Strings, flow and control values never ramp.
//!
//! ```rust
//! use tessera_core::Parameter;
//!
//! let mut p = Parameter::new(0.0f32).with_lerp_ticks(10);
//! p.update(100);
//! p.set(1.0f32, false).unwrap();
//! p.update(105);
//! assert!((p.to::<f32>().unwrap() - 0.5).abs() < 1e-6);
//! p.update(110);
//! assert_eq!(p.to::<f32>().unwrap(), 1.0);
//! ```
//!
//! ## Normalization
//!
//! [`normalized`](Parameter::normalized) maps the value into `[0, 1]` using
//! the attribute range and taper. A taper of 1.0 is linear; other values
//! apply `t^(1/taper)`, the same power curve as a skewed range:
//!
//! - taper > 1.0 gives more resolution at the low end of the range
//! - taper < 1.0 gives more resolution at the high end

use crate::error::TypeMismatch;
use crate::value::{ParameterValue, ValueKind, ValueType};

/// Bitflag set for parameter properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParameterFlags(u8);

impl ParameterFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Value is displayed but cannot be changed through normalized writes.
    pub const READ_ONLY: Self = Self(1 << 0);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// The kind of control a view layer should build for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UiHint {
    /// No preference.
    #[default]
    None,
    /// Horizontal or vertical slider.
    Slider,
    /// Rotary knob.
    Knob,
    /// Momentary or toggle button.
    Button,
    /// Free text field.
    Text,
    /// Application-defined widget.
    Custom,
}

/// How a parameter value is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayFormat {
    /// The value's own `Display`.
    #[default]
    Default,
    /// Fixed number of decimal places.
    Decimal(u8),
    /// Linear position within the range, as `0%..100%`.
    Percent,
    /// Rounded to a whole number.
    Integer,
    /// Index into the label list.
    Labels,
}

/// Range, presentation and behavior attributes of a parameter.
///
/// `min`, `max`, `origin`, `step` and `thumb` share the parameter's scalar
/// type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterAttributes {
    /// Lower bound.
    pub min: ParameterValue,
    /// Upper bound.
    pub max: ParameterValue,
    /// Value a bipolar control is drawn from.
    pub origin: ParameterValue,
    /// Increment for stepped controls.
    pub step: ParameterValue,
    /// Size of the draggable part of a control, in value units.
    pub thumb: ParameterValue,
    /// Widget preference.
    pub ui_hint: UiHint,
    /// Text rendering.
    pub format: DisplayFormat,
    /// Unit suffix, e.g. `"Hz"`.
    pub unit: Option<String>,
    /// Property flags.
    pub flags: ParameterFlags,
    /// Labels for discrete controls.
    pub labels: Vec<String>,
    /// Taper exponent; 1.0 is linear.
    pub taper: f64,
}

impl Default for ParameterAttributes {
    fn default() -> Self {
        Self {
            min: ParameterValue::None,
            max: ParameterValue::None,
            origin: ParameterValue::None,
            step: ParameterValue::None,
            thumb: ParameterValue::None,
            ui_hint: UiHint::None,
            format: DisplayFormat::Default,
            unit: None,
            flags: ParameterFlags::NONE,
            labels: Vec::new(),
            taper: 1.0,
        }
    }
}

impl ParameterAttributes {
    /// Attributes with a `0..1` range in the type of `value`.
    ///
    /// Non-numeric values get empty attributes.
    pub fn for_value(value: &ParameterValue) -> Self {
        let ty = value.value_type();
        match (
            ParameterValue::from_f64_as(ty, 0.0),
            ParameterValue::from_f64_as(ty, 1.0),
        ) {
            (Some(min), Some(max)) => Self::default().with_range(min.clone(), max).with_origin(min),
            _ => Self::default(),
        }
    }

    /// Sets `min` and `max`.
    ///
    /// Builder pattern, like every `with_*` method here.
    pub fn with_range(mut self, min: impl Into<ParameterValue>, max: impl Into<ParameterValue>) -> Self {
        self.min = min.into();
        self.max = max.into();
        self
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: impl Into<ParameterValue>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Sets the step.
    pub fn with_step(mut self, step: impl Into<ParameterValue>) -> Self {
        self.step = step.into();
        self
    }

    /// Sets the thumb size.
    pub fn with_thumb(mut self, thumb: impl Into<ParameterValue>) -> Self {
        self.thumb = thumb.into();
        self
    }

    /// Sets the widget preference.
    pub fn with_ui_hint(mut self, hint: UiHint) -> Self {
        self.ui_hint = hint;
        self
    }

    /// Sets the display format.
    pub fn with_format(mut self, format: DisplayFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the unit suffix.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the flags.
    pub fn with_flags(mut self, flags: ParameterFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the taper exponent.
    pub fn with_taper(mut self, taper: f64) -> Self {
        self.taper = taper;
        self
    }

    /// Returns `true` when [`ParameterFlags::READ_ONLY`] is set.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(ParameterFlags::READ_ONLY)
    }

    /// Numeric `(min, max)` if both bounds are numeric.
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        Some((self.min.as_f64()?, self.max.as_f64()?))
    }

    /// Linear position of `value` within the range, unclamped.
    ///
    /// A zero-width range maps everything to 0.
    pub fn linear_position(&self, value: &ParameterValue) -> Option<f64> {
        let v = value.as_f64()?;
        let (min, max) = self.numeric_range()?;
        let range = max - min;
        if range == 0.0 {
            return Some(0.0);
        }
        Some((v - min) / range)
    }

    /// Renders `value` as text for a control.
    ///
    /// ```rust
    /// use tessera_core::{DisplayFormat, ParameterAttributes, ParameterValue};
    ///
    /// let attrs = ParameterAttributes::default()
    ///     .with_range(20.0f32, 20000.0f32)
    ///     .with_format(DisplayFormat::Decimal(1))
    ///     .with_unit("Hz");
    /// assert_eq!(attrs.format_value(&ParameterValue::Float(440.0)), "440.0 Hz");
    /// ```
    pub fn format_value(&self, value: &ParameterValue) -> String {
        let Some(v) = value.as_f64() else {
            return value.to_string();
        };

        let text = match self.format {
            DisplayFormat::Default => value.to_string(),
            DisplayFormat::Decimal(places) => format!("{v:.prec$}", prec = usize::from(places)),
            DisplayFormat::Integer => format!("{}", v.round() as i64),
            DisplayFormat::Percent => {
                let t = self.linear_position(value).unwrap_or(0.0);
                return format!("{:.0}%", t * 100.0);
            }
            DisplayFormat::Labels => {
                let offset = self.min.as_f64().unwrap_or(0.0);
                let index = (v - offset).round();
                if index >= 0.0
                    && let Some(label) = self.labels.get(index as usize)
                {
                    return label.clone();
                }
                value.to_string()
            }
        };

        match &self.unit {
            Some(unit) => format!("{text} {unit}"),
            None => text,
        }
    }
}

/// The part of a parameter's state mirrored onto its shadows.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowState {
    /// Current value.
    pub value: ParameterValue,
    /// Ramp start value.
    pub start: ParameterValue,
    /// Ramp target.
    pub end: ParameterValue,
    /// Tick the ramp began at.
    pub ramp_start_tick: u64,
}

/// A typed value with portamento, range attributes and a change counter.
#[derive(Debug, Clone)]
pub struct Parameter {
    value: ParameterValue,
    start: ParameterValue,
    end: ParameterValue,
    attributes: ParameterAttributes,
    lerp_ticks: Option<u64>,
    ramp_start_tick: u64,
    last_tick: u64,
    generation: u64,
}

impl Default for Parameter {
    fn default() -> Self {
        Self::untyped()
    }
}

impl Parameter {
    /// Create a parameter holding `initial`, with a `0..1` range in its type.
    pub fn new(initial: impl Into<ParameterValue>) -> Self {
        let value = initial.into();
        Self {
            attributes: ParameterAttributes::for_value(&value),
            start: value.clone(),
            end: value.clone(),
            value,
            lerp_ticks: None,
            ramp_start_tick: 0,
            last_tick: 0,
            generation: 0,
        }
    }

    /// Create an untyped parameter. The first `set` fixes its type.
    pub fn untyped() -> Self {
        Self::new(ParameterValue::None)
    }

    /// Replace the attributes.
    pub fn with_attributes(mut self, attributes: ParameterAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the ramp duration in ticks.
    pub fn with_lerp_ticks(mut self, ticks: u64) -> Self {
        self.lerp_ticks = Some(ticks);
        self
    }

    /// Current value.
    #[inline]
    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    /// Type fixed at first assignment, or [`ValueType::None`].
    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.end.value_type()
    }

    /// Exact typed read of the current value.
    pub fn get<T: ValueKind>(&self) -> Result<T, TypeMismatch> {
        self.value.get()
    }

    /// Coercing typed read of the current value.
    pub fn to<T: ValueKind>(&self) -> Result<T, TypeMismatch> {
        self.value.to()
    }

    /// Ramp start value.
    pub fn start(&self) -> &ParameterValue {
        &self.start
    }

    /// Ramp target.
    pub fn end(&self) -> &ParameterValue {
        &self.end
    }

    /// Range and presentation attributes.
    pub fn attributes(&self) -> &ParameterAttributes {
        &self.attributes
    }

    /// Mutable attributes.
    pub fn attributes_mut(&mut self) -> &mut ParameterAttributes {
        &mut self.attributes
    }

    /// Ramp duration in ticks. Unset durations ramp in zero ticks.
    pub fn lerp_ticks(&self) -> u64 {
        self.lerp_ticks.unwrap_or(0)
    }

    /// Whether a ramp duration was given, zero included.
    pub fn has_lerp_ticks(&self) -> bool {
        self.lerp_ticks.is_some()
    }

    /// Change the ramp duration. Takes effect on the next `update`.
    pub fn set_lerp_ticks(&mut self, ticks: u64) {
        self.lerp_ticks = Some(ticks);
    }

    /// Tick the current ramp started at.
    pub fn ramp_start_tick(&self) -> u64 {
        self.ramp_start_tick
    }

    /// Last tick passed to [`update`](Self::update).
    pub fn last_tick(&self) -> u64 {
        self.last_tick
    }

    /// Incremented on every logical change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a ramp is in progress.
    pub fn is_ramping(&self) -> bool {
        self.start != self.end
    }

    /// Typed write. See [`set_value`](Self::set_value).
    pub fn set<T: ValueKind>(&mut self, value: T, immediate: bool) -> Result<bool, TypeMismatch> {
        self.set_value(value.into_value(), immediate)
    }

    /// Write a value, ramping or snapping.
    ///
    /// Returns `Ok(false)` when `value` equals the current target (nothing
    /// changes, not even the generation) and `Ok(true)` otherwise.
    ///
    /// # Errors
    ///
    /// [`TypeMismatch`] if the parameter is typed and `value` is of a
    /// different type.
    pub fn set_value(&mut self, value: ParameterValue, immediate: bool) -> Result<bool, TypeMismatch> {
        let current = self.value_type();
        let incoming = value.value_type();

        if current == ValueType::None {
            if incoming == ValueType::None {
                return Ok(false);
            }
            if self.attributes.min.is_none() {
                let base = ParameterAttributes::for_value(&value);
                self.attributes.min = base.min;
                self.attributes.max = base.max;
                self.attributes.origin = base.origin;
            }
            self.snap(value);
            self.generation += 1;
            return Ok(true);
        }

        if incoming != current {
            return Err(TypeMismatch::new(current, incoming));
        }
        if value == self.end {
            return Ok(false);
        }

        self.generation += 1;
        if immediate || !current.is_interpolable() {
            self.snap(value);
        } else {
            self.start = self.value.clone();
            self.end = value;
            self.ramp_start_tick = self.last_tick;
        }
        Ok(true)
    }

    fn snap(&mut self, value: ParameterValue) {
        self.start = value.clone();
        self.end = value.clone();
        self.value = value;
        self.ramp_start_tick = 0;
    }

    /// Advance the ramp to `tick` and return the current value.
    ///
    /// Ticks are expected to be non-decreasing.
    pub fn update(&mut self, tick: u64) -> &ParameterValue {
        self.last_tick = tick;
        if self.start == self.end {
            return &self.value;
        }

        let frac = match self.lerp_ticks {
            None | Some(0) => 1.0,
            Some(lerp) => {
                let elapsed = tick.saturating_sub(self.ramp_start_tick) as f64;
                (elapsed / lerp as f64).clamp(0.0, 1.0)
            }
        };

        let ramps = matches!(
            self.end,
            ParameterValue::Float(_) | ParameterValue::Double(_) | ParameterValue::Int64(_)
        );
        if frac >= 1.0 || !ramps {
            self.value = self.end.clone();
            self.start = self.end.clone();
        } else {
            self.value = ParameterValue::interpolate(&self.start, &self.end, frac);
        }
        self.generation += 1;
        &self.value
    }

    /// Position of the value within its range, tapered and clamped to `[0, 1]`.
    ///
    /// Returns 0 for non-numeric parameters and zero-width ranges.
    pub fn normalized(&self) -> f64 {
        let Some(t) = self.attributes.linear_position(&self.value) else {
            return 0.0;
        };
        let t = t.clamp(0.0, 1.0);
        let taper = self.attributes.taper;
        if taper == 1.0 || taper <= 0.0 {
            t
        } else {
            t.powf(1.0 / taper).clamp(0.0, 1.0)
        }
    }

    /// Linear position within the range without clamping, for overshoot display.
    pub fn normalized_unclamped(&self) -> f64 {
        self.attributes.linear_position(&self.value).unwrap_or(0.0)
    }

    /// Set the value from a normalized position.
    ///
    /// Goes through a non-immediate [`set_value`](Self::set_value), so the
    /// change ramps. Read-only and non-numeric parameters ignore the call
    /// and return `Ok(false)`.
    pub fn set_from_normalized(&mut self, normalized: f64) -> Result<bool, TypeMismatch> {
        if self.attributes.is_read_only() {
            return Ok(false);
        }
        let Some((min, max)) = self.attributes.numeric_range() else {
            return Ok(false);
        };

        let n = normalized.clamp(0.0, 1.0);
        let taper = self.attributes.taper;
        let t = if taper == 1.0 || taper <= 0.0 { n } else { n.powf(taper) };

        let ty = self.value_type();
        let value = if ty == ValueType::Bool {
            Some(ParameterValue::Bool(t >= 0.5))
        } else {
            ParameterValue::from_f64_as(ty, min + t * (max - min))
        };
        match value {
            Some(value) => self.set_value(value, false),
            None => Ok(false),
        }
    }

    /// State copied onto shadow parameters after a change.
    pub fn shadow_state(&self) -> ShadowState {
        ShadowState {
            value: self.value.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            ramp_start_tick: self.ramp_start_tick,
        }
    }

    /// Mirror another parameter's ramp state.
    ///
    /// Returns `Ok(false)` if this parameter already matches.
    ///
    /// # Errors
    ///
    /// [`TypeMismatch`] if both are typed and the types differ.
    pub fn apply_shadow(&mut self, state: &ShadowState) -> Result<bool, TypeMismatch> {
        let current = self.value_type();
        let incoming = state.end.value_type();
        if current != ValueType::None && current != incoming {
            return Err(TypeMismatch::new(current, incoming));
        }
        if self.value == state.value && self.start == state.start && self.end == state.end {
            return Ok(false);
        }
        self.value = state.value.clone();
        self.start = state.start.clone();
        self.end = state.end.clone();
        self.ramp_start_tick = state.ramp_start_tick;
        self.generation += 1;
        Ok(true)
    }

    /// Text for the current value, per the attributes' display format.
    pub fn formatted(&self) -> String {
        self.attributes.format_value(&self.value)
    }
}
