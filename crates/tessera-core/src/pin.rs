//! Pins: a node's typed inputs and outputs.
//!
//! A [`Pin`] wraps a [`Parameter`] with connection endpoints. Connections are
//! stored as [`PinRef`]s into the owning graph, never as references:
//!
//! - an input has at most one `source` and no targets
//! - an output has no source and any number of `targets`
//!
//! The pin only asserts these shapes. Type checks and reverse links are the
//! graph's job (see [`Graph::connect`](crate::Graph::connect)).

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::flow::FlowData;
use crate::node::NodeId;
use crate::param::Parameter;
use crate::snapshot::DisplaySnapshot;
use crate::value::{ParameterValue, ValueType};

/// Which side of a node a pin is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Consumes a value.
    Input,
    /// Produces a value.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// Address of a pin within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinRef {
    /// Owning node.
    pub node: NodeId,
    /// Input or output list.
    pub direction: Direction,
    /// Index into that list.
    pub index: usize,
}

impl PinRef {
    /// Input `index` of `node`.
    pub const fn input(node: NodeId, index: usize) -> Self {
        Self {
            node,
            direction: Direction::Input,
            index,
        }
    }

    /// Output `index` of `node`.
    pub const fn output(node: NodeId, index: usize) -> Self {
        Self {
            node,
            direction: Direction::Output,
            index,
        }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}]", self.node, self.direction, self.index)
    }
}

/// Selects a pin by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinSelector {
    /// Position in the input or output list.
    Index(usize),
    /// Pin name.
    Name(String),
}

impl From<usize> for PinSelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PinSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for PinSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// View-layer metadata for a pin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinView {
    /// Not drawn on the node body.
    pub hidden: bool,
    /// Label override; the pin name is used when `None`.
    pub label: Option<String>,
}

/// A parameter with connection endpoints.
#[derive(Debug)]
pub struct Pin {
    param: Parameter,
    owner: NodeId,
    direction: Direction,
    name: String,
    source: Option<PinRef>,
    targets: BTreeSet<PinRef>,
    view: PinView,
    display: Arc<DisplaySnapshot>,
}

impl Pin {
    /// Create an unconnected pin.
    pub fn new(owner: NodeId, direction: Direction, name: impl Into<String>, param: Parameter) -> Self {
        Self {
            param,
            owner,
            direction,
            name: name.into(),
            source: None,
            targets: BTreeSet::new(),
            view: PinView::default(),
            display: Arc::new(DisplaySnapshot::new()),
        }
    }

    /// Owning node.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Input or output.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` for input pins.
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    /// Returns `true` for output pins.
    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Pin name, unique per node and direction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pin's own parameter.
    ///
    /// For a connected input this is not the value the node sees; use
    /// [`Graph::pin_value`](crate::Graph::pin_value) to resolve through the
    /// source.
    pub fn parameter(&self) -> &Parameter {
        &self.param
    }

    /// Mutable parameter. Writes here bypass shadow fan-out.
    pub fn parameter_mut(&mut self) -> &mut Parameter {
        &mut self.param
    }

    /// The pin's own current value.
    pub fn value(&self) -> &ParameterValue {
        self.param.value()
    }

    /// Type of the pin's parameter.
    pub fn value_type(&self) -> ValueType {
        self.param.value_type()
    }

    /// Returns `true` for flow and control pins.
    pub fn is_stream(&self) -> bool {
        self.value_type().is_stream()
    }

    /// Source output of an input pin.
    pub fn source(&self) -> Option<PinRef> {
        self.source
    }

    /// Target inputs of an output pin, in address order.
    pub fn targets(&self) -> impl ExactSizeIterator<Item = PinRef> + '_ {
        self.targets.iter().copied()
    }

    /// Returns `true` if the pin has a source or any target.
    pub fn has_connection(&self) -> bool {
        self.source.is_some() || !self.targets.is_empty()
    }

    /// View metadata.
    pub fn view(&self) -> &PinView {
        &self.view
    }

    /// Mutable view metadata.
    pub fn view_mut(&mut self) -> &mut PinView {
        &mut self.view
    }

    /// Label to draw: the view override or the name.
    pub fn label(&self) -> &str {
        self.view.label.as_deref().unwrap_or(&self.name)
    }

    /// Replace the source of an input pin.
    pub fn set_source(&mut self, source: Option<PinRef>) {
        debug_assert!(self.is_input(), "only input pins have a source");
        self.source = source;
    }

    /// Add a target to an output pin. Returns `false` if already present.
    pub fn add_target(&mut self, target: PinRef) -> bool {
        debug_assert!(self.is_output(), "only output pins have targets");
        self.targets.insert(target)
    }

    /// Remove a target from an output pin. Returns `false` if absent.
    pub fn remove_target(&mut self, target: PinRef) -> bool {
        self.targets.remove(&target)
    }

    /// Drop every connection and return the former peers.
    pub fn detach(&mut self) -> Vec<PinRef> {
        let mut peers: Vec<PinRef> = self.source.take().into_iter().collect();
        peers.extend(std::mem::take(&mut self.targets));
        peers
    }

    /// Advance the parameter to `tick`, publishing flow data for display first.
    ///
    /// `upstream` is the resolved source value of a connected input. A
    /// connected flow pin publishes a copy of that buffer (or of its own
    /// buffer for outputs) when `publish` is set.
    pub fn update(&mut self, tick: u64, upstream: Option<&ParameterValue>, publish: bool) -> &ParameterValue {
        if publish
            && self.has_connection()
            && let Some(flow) = upstream.unwrap_or(self.param.value()).as_flow()
        {
            self.display.publish(flow.snapshot());
        }
        self.param.update(tick)
    }

    /// Latest published flow snapshot.
    pub fn display_flow(&self) -> Option<Arc<FlowData>> {
        self.display.load()
    }

    /// Shared snapshot cell for reader threads.
    pub fn display_snapshot(&self) -> Arc<DisplaySnapshot> {
        Arc::clone(&self.display)
    }
}
