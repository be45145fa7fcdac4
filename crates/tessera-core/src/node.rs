//! Nodes, node kinds and the compute context.
//!
//! A [`Node`] owns its input and output [`Pin`]s and a boxed
//! [`NodeBehavior`]. Behaviors declare their pins once, when the graph
//! creates the node, and then run [`compute`](NodeBehavior::compute) whenever
//! the scheduler evaluates the node.
//!
//! # Declaring a node kind
//!
//! ```rust
//! use tessera_core::{
//!     ComputeContext, Graph, GraphConfig, GraphError, Node, NodeBehavior, Parameter, node_kind,
//! };
//!
//! struct Double;
//! node_kind!(Double, "double", "Double");
//!
//! impl NodeBehavior for Double {
//!     fn declare(&mut self, node: &mut Node, _config: &GraphConfig) {
//!         node.add_input("x", Parameter::new(0.0f32));
//!         node.add_output("y", Parameter::new(0.0f32));
//!     }
//!
//!     fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
//!         let x: f32 = ctx.input(0)?;
//!         ctx.set_output(0, x * 2.0)?;
//!         Ok(())
//!     }
//! }
//!
//! let mut graph = Graph::new();
//! let id = graph.create_node(Double);
//! assert_eq!(graph.node(id).unwrap().kind_name(), "double");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::GraphConfig;
use crate::control::{ControlData, ControlHandle};
use crate::error::{GraphError, TypeMismatch};
use crate::flow::{FlowData, FlowHandle};
use crate::param::Parameter;
use crate::pin::{Direction, Pin, PinRef};
use crate::value::{ParameterValue, ValueKind, ValueType};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique node identifier.
///
/// Ids come from a monotonic counter and are never reused, so an id held
/// after its node was removed cannot alias a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw id. Useful for tests and diagnostics; ids minted this way
    /// are not registered with any graph.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable naming for a node kind. Implement with [`node_kind!`](crate::node_kind).
pub trait NodeKind {
    /// Stable string key, used by registries and serialized references.
    fn kind_name(&self) -> &'static str;
    /// Human-readable name shown on the node.
    fn display_name(&self) -> &'static str;
}

/// Implements [`NodeKind`] for a type and adds `KIND` / `DISPLAY_NAME`
/// associated constants.
///
/// ```rust
/// struct Noise;
/// tessera_core::node_kind!(Noise, "noise", "White Noise");
///
/// assert_eq!(Noise::KIND, "noise");
/// assert_eq!(Noise::DISPLAY_NAME, "White Noise");
/// ```
#[macro_export]
macro_rules! node_kind {
    ($ty:ty, $kind:literal) => {
        $crate::node_kind!($ty, $kind, $kind);
    };
    ($ty:ty, $kind:literal, $display:literal) => {
        impl $ty {
            /// Stable kind key.
            pub const KIND: &'static str = $kind;
            /// Display name.
            pub const DISPLAY_NAME: &'static str = $display;
        }

        impl $crate::NodeKind for $ty {
            fn kind_name(&self) -> &'static str {
                $kind
            }

            fn display_name(&self) -> &'static str {
                $display
            }
        }
    };
}

/// The behavior behind a node.
pub trait NodeBehavior: NodeKind + Send + 'static {
    /// Add this kind's pins to a freshly created node.
    fn declare(&mut self, node: &mut Node, config: &GraphConfig);

    /// Produce outputs from inputs. The default does nothing.
    fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
        let _ = ctx;
        Ok(())
    }
}

/// Display annotation attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorKind {
    /// Static text.
    Label,
    /// Level meter bound to a pin.
    Meter,
    /// Waveform scope bound to a flow pin.
    Scope,
}

/// A display annotation, optionally bound to a pin.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    /// What to draw.
    pub kind: DecoratorKind,
    /// Pin the annotation reads from.
    pub pin: Option<PinRef>,
    /// Caption.
    pub label: String,
}

impl Decorator {
    /// A text label.
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            kind: DecoratorKind::Label,
            pin: None,
            label: text.into(),
        }
    }

    /// A decorator of `kind` bound to `pin`.
    pub fn bound(kind: DecoratorKind, pin: PinRef, label: impl Into<String>) -> Self {
        Self {
            kind,
            pin: Some(pin),
            label: label.into(),
        }
    }
}

/// A graph node: pins, view data and behavior.
pub struct Node {
    id: NodeId,
    kind_name: &'static str,
    display_name: String,
    inputs: Vec<Pin>,
    outputs: Vec<Pin>,
    flow_inputs: Vec<usize>,
    flow_outputs: Vec<usize>,
    control_inputs: Vec<usize>,
    control_outputs: Vec<usize>,
    decorators: Vec<Decorator>,
    position: (f32, f32),
    default_lerp_ticks: u64,
    pub(crate) generation: u64,
    behavior: Option<Box<dyn NodeBehavior>>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind_name)
            .field("name", &self.display_name)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Node {
    pub(crate) fn new(id: NodeId, behavior: &dyn NodeBehavior, default_lerp_ticks: u64) -> Self {
        Self {
            id,
            kind_name: behavior.kind_name(),
            display_name: behavior.display_name().to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            flow_inputs: Vec::new(),
            flow_outputs: Vec::new(),
            control_inputs: Vec::new(),
            control_outputs: Vec::new(),
            decorators: Vec::new(),
            position: (0.0, 0.0),
            default_lerp_ticks,
            generation: 0,
            behavior: None,
        }
    }

    pub(crate) fn attach(&mut self, behavior: Box<dyn NodeBehavior>) {
        self.behavior = Some(behavior);
    }

    /// Unique id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Stable kind key.
    pub fn kind_name(&self) -> &'static str {
        self.kind_name
    }

    /// Name shown on the node.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Rename the node.
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    /// Generation this node was last evaluated in.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Input pins in declaration order.
    pub fn inputs(&self) -> &[Pin] {
        &self.inputs
    }

    /// Output pins in declaration order.
    pub fn outputs(&self) -> &[Pin] {
        &self.outputs
    }

    /// Input pin `index`.
    pub fn input(&self, index: usize) -> Option<&Pin> {
        self.inputs.get(index)
    }

    /// Output pin `index`.
    pub fn output(&self, index: usize) -> Option<&Pin> {
        self.outputs.get(index)
    }

    /// Pin by direction and index.
    pub fn pin(&self, direction: Direction, index: usize) -> Option<&Pin> {
        match direction {
            Direction::Input => self.inputs.get(index),
            Direction::Output => self.outputs.get(index),
        }
    }

    /// Mutable pin by direction and index.
    pub fn pin_mut(&mut self, direction: Direction, index: usize) -> Option<&mut Pin> {
        match direction {
            Direction::Input => self.inputs.get_mut(index),
            Direction::Output => self.outputs.get_mut(index),
        }
    }

    /// Index of the pin named `name`.
    pub fn pin_index(&self, direction: Direction, name: &str) -> Option<usize> {
        let pins = match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        };
        pins.iter().position(|p| p.name() == name)
    }

    /// Indices of flow inputs.
    pub fn flow_inputs(&self) -> &[usize] {
        &self.flow_inputs
    }

    /// Indices of flow outputs.
    pub fn flow_outputs(&self) -> &[usize] {
        &self.flow_outputs
    }

    /// Indices of control inputs.
    pub fn control_inputs(&self) -> &[usize] {
        &self.control_inputs
    }

    /// Indices of control outputs.
    pub fn control_outputs(&self) -> &[usize] {
        &self.control_outputs
    }

    /// Display annotations.
    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    /// Attach a display annotation.
    pub fn add_decorator(&mut self, decorator: Decorator) {
        self.decorators.push(decorator);
    }

    /// Canvas position.
    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    /// Move the node on the canvas.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = (x, y);
    }

    /// Declare a scalar input. Inputs without their own ramp duration take
    /// the graph's default; an explicit zero keeps the input unramped.
    pub fn add_input(&mut self, name: impl Into<String>, mut param: Parameter) -> usize {
        if !param.has_lerp_ticks() {
            param.set_lerp_ticks(self.default_lerp_ticks);
        }
        self.inputs.push(Pin::new(self.id, Direction::Input, name, param));
        self.inputs.len() - 1
    }

    /// Declare a flow input with a placeholder buffer shaped like `data`.
    pub fn add_flow_input(&mut self, name: impl Into<String>, data: FlowData) -> usize {
        let index = self.add_input(name, Parameter::new(FlowHandle::new(data)));
        self.flow_inputs.push(index);
        index
    }

    /// Declare a control input.
    pub fn add_control_input(&mut self, name: impl Into<String>) -> usize {
        let index = self.add_input(name, Parameter::new(ControlHandle::new(ControlData::new())));
        self.control_inputs.push(index);
        index
    }

    /// Declare a scalar output.
    pub fn add_output(&mut self, name: impl Into<String>, param: Parameter) -> usize {
        self.outputs.push(Pin::new(self.id, Direction::Output, name, param));
        self.outputs.len() - 1
    }

    /// Declare a flow output owning `data`.
    pub fn add_flow_output(&mut self, name: impl Into<String>, data: FlowData) -> usize {
        let index = self.add_output(name, Parameter::new(FlowHandle::new(data)));
        self.flow_outputs.push(index);
        index
    }

    /// Declare a control output.
    pub fn add_control_output(&mut self, name: impl Into<String>) -> usize {
        let index = self.add_output(name, Parameter::new(ControlHandle::new(ControlData::new())));
        self.control_outputs.push(index);
        index
    }

    /// `base`, or `base_N` for the smallest `N` not yet taken by an input.
    pub(crate) fn unique_input_name(&self, base: &str) -> String {
        if self.pin_index(Direction::Input, base).is_none() {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|name| self.pin_index(Direction::Input, name).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut [Pin] {
        &mut self.inputs
    }

    pub(crate) fn outputs_mut(&mut self) -> &mut [Pin] {
        &mut self.outputs
    }

    pub(crate) fn run_compute(
        &mut self,
        tick: u64,
        config: &GraphConfig,
        inputs: &[ParameterValue],
    ) -> Result<Vec<usize>, GraphError> {
        let Some(behavior) = self.behavior.as_mut() else {
            return Ok(Vec::new());
        };
        let mut ctx = ComputeContext {
            node: self.id,
            tick,
            config,
            inputs,
            outputs: &mut self.outputs,
            changed: Vec::new(),
        };
        behavior.compute(&mut ctx)?;
        Ok(ctx.changed)
    }
}

/// What a behavior sees during [`compute`](NodeBehavior::compute).
///
/// Inputs are already resolved through their sources and advanced to the
/// current tick. Outputs are the node's own pins.
pub struct ComputeContext<'a> {
    node: NodeId,
    tick: u64,
    config: &'a GraphConfig,
    inputs: &'a [ParameterValue],
    outputs: &'a mut [Pin],
    changed: Vec<usize>,
}

impl<'a> ComputeContext<'a> {
    /// Node being computed.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Current tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Graph configuration.
    pub fn config(&self) -> &GraphConfig {
        self.config
    }

    /// Number of inputs.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of outputs.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Resolved value of input `index`.
    pub fn input_value(&self, index: usize) -> Result<&ParameterValue, GraphError> {
        self.inputs
            .get(index)
            .ok_or(GraphError::PinNotFound(PinRef::input(self.node, index)))
    }

    /// Exact typed read of input `index`.
    pub fn input<T: ValueKind>(&self, index: usize) -> Result<T, GraphError> {
        Ok(self.input_value(index)?.get()?)
    }

    /// Coercing typed read of input `index`.
    pub fn input_to<T: ValueKind>(&self, index: usize) -> Result<T, GraphError> {
        Ok(self.input_value(index)?.to()?)
    }

    /// Flow buffer feeding input `index`.
    pub fn input_flow(&self, index: usize) -> Result<FlowHandle, GraphError> {
        self.input(index)
    }

    /// Control events feeding input `index`.
    pub fn input_control(&self, index: usize) -> Result<ControlHandle, GraphError> {
        self.input(index)
    }

    /// Output pin `index`.
    pub fn output(&mut self, index: usize) -> Result<&mut Pin, GraphError> {
        let node = self.node;
        self.outputs
            .get_mut(index)
            .ok_or(GraphError::PinNotFound(PinRef::output(node, index)))
    }

    /// Flow buffer owned by output `index`.
    pub fn output_flow(&mut self, index: usize) -> Result<FlowHandle, GraphError> {
        let value = self.output(index)?.value();
        value
            .as_flow()
            .cloned()
            .ok_or_else(|| TypeMismatch::new(ValueType::Flow, value.value_type()).into())
    }

    /// Control list owned by output `index`.
    pub fn output_control(&mut self, index: usize) -> Result<ControlHandle, GraphError> {
        let value = self.output(index)?.value();
        value
            .as_control()
            .cloned()
            .ok_or_else(|| TypeMismatch::new(ValueType::Control, value.value_type()).into())
    }

    /// Write output `index` immediately. Returns whether the value changed.
    ///
    /// Changed outputs are fanned out to their shadows once compute returns.
    pub fn set_output<T: ValueKind>(&mut self, index: usize, value: T) -> Result<bool, GraphError> {
        let changed = self.output(index)?.parameter_mut().set(value, true)?;
        if changed && !self.changed.contains(&index) {
            self.changed.push(index);
        }
        Ok(changed)
    }

    /// Outputs changed through [`set_output`](Self::set_output) so far.
    pub fn changed_outputs(&self) -> &[usize] {
        &self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowKind, SampleType};

    struct Probe;
    node_kind!(Probe, "probe", "Probe");

    impl NodeBehavior for Probe {
        fn declare(&mut self, node: &mut Node, _config: &GraphConfig) {
            node.add_input("a", Parameter::new(1.0f32));
            node.add_flow_input("audio", FlowData::new(FlowKind::Audio, SampleType::F32));
            node.add_output("b", Parameter::new(0i64));
            node.add_control_output("events");
        }
    }

    fn probe_node(lerp: u64) -> Node {
        let mut behavior = Probe;
        let mut node = Node::new(NodeId::next(), &behavior, lerp);
        behavior.declare(&mut node, &GraphConfig::default());
        node.attach(Box::new(behavior));
        node
    }

    #[test]
    fn node_ids_are_unique_and_ordered() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert!(b > a);
        assert_eq!(NodeId::from_raw(12).to_string(), "#12");
        assert_eq!(NodeId::from_raw(12).raw(), 12);
    }

    #[test]
    fn macro_names() {
        assert_eq!(Probe::KIND, "probe");
        assert_eq!(Probe.display_name(), "Probe");
    }

    #[test]
    fn declare_records_sublists() {
        let node = probe_node(0);
        assert_eq!(node.kind_name(), "probe");
        assert_eq!(node.inputs().len(), 2);
        assert_eq!(node.flow_inputs(), &[1]);
        assert_eq!(node.control_outputs(), &[1]);
        assert!(node.flow_outputs().is_empty());
        assert_eq!(node.pin_index(Direction::Output, "events"), Some(1));
        assert_eq!(node.input(1).map(Pin::value_type), Some(ValueType::Flow));
        assert!(node.inputs().iter().all(|p| p.owner() == node.id()));
    }

    #[test]
    fn inputs_take_default_lerp() {
        let node = probe_node(6);
        assert_eq!(node.input(0).map(|p| p.parameter().lerp_ticks()), Some(6));
        // outputs are written immediately and never ramp
        assert_eq!(node.output(0).map(|p| p.parameter().lerp_ticks()), Some(0));
    }

    #[test]
    fn explicit_zero_lerp_keeps_input_unramped() {
        let mut node = probe_node(6);
        let snap = node.add_input("snap", Parameter::new(0.0f32).with_lerp_ticks(0));
        let glide = node.add_input("glide", Parameter::new(0.0f32).with_lerp_ticks(2));
        assert_eq!(node.input(snap).map(|p| p.parameter().lerp_ticks()), Some(0));
        assert_eq!(node.input(glide).map(|p| p.parameter().lerp_ticks()), Some(2));
    }

    #[test]
    fn unique_input_names() {
        let mut node = probe_node(0);
        assert_eq!(node.unique_input_name("in"), "in");
        assert_eq!(node.unique_input_name("a"), "a_1");
        node.add_input("a_1", Parameter::new(0.0f32));
        assert_eq!(node.unique_input_name("a"), "a_2");
    }

    #[test]
    fn context_accessors() {
        let mut node = probe_node(0);
        let config = GraphConfig::default();
        let inputs = vec![ParameterValue::Float(2.5), ParameterValue::Int64(3)];
        let mut ctx = ComputeContext {
            node: node.id(),
            tick: 9,
            config: &config,
            inputs: &inputs,
            outputs: node.outputs_mut(),
            changed: Vec::new(),
        };

        assert_eq!(ctx.tick(), 9);
        assert_eq!(ctx.input::<f32>(0).unwrap(), 2.5);
        assert_eq!(ctx.input_to::<f64>(1).unwrap(), 3.0);
        assert!(matches!(ctx.input::<f32>(1), Err(GraphError::TypeMismatch(_))));
        assert!(matches!(ctx.input_value(5), Err(GraphError::PinNotFound(_))));
        assert!(ctx.input_flow(0).is_err());

        assert!(ctx.set_output(0, 7i64).unwrap());
        assert!(!ctx.set_output(0, 7i64).unwrap());
        assert_eq!(ctx.changed_outputs(), &[0]);
        assert!(ctx.output_control(1).is_ok());
        assert!(ctx.output_flow(1).is_err());
        assert!(ctx.set_output(0, 1.0f32).is_err());
        assert_eq!(node.output(0).map(|p| p.value().clone()), Some(ParameterValue::Int64(7)));
    }

    #[test]
    fn decorators_and_position() {
        let mut node = probe_node(0);
        let pin = PinRef::output(node.id(), 0);
        node.add_decorator(Decorator::label("hello"));
        node.add_decorator(Decorator::bound(DecoratorKind::Meter, pin, "level"));
        assert_eq!(node.decorators().len(), 2);
        assert_eq!(node.decorators()[1].pin, Some(pin));

        node.set_position(10.0, -4.0);
        assert_eq!(node.position(), (10.0, -4.0));
    }
}
