//! The node arena and the lazy-pull evaluation scheduler.
//!
//! A [`Graph`] owns every [`Node`] keyed by [`NodeId`]. Connections and
//! shadow links are [`PinRef`] addresses into this arena, so removing a node
//! is a matter of unlinking the addresses that point at it.
//!
//! # Evaluation
//!
//! [`Graph::compute`] bumps the generation and evaluates each target
//! depth-first:
//!
//! 1. Nodes already stamped with the current generation are skipped.
//! 2. Upstream nodes feeding a *flow or control* input are evaluated first,
//!    each at most once per generation.
//! 3. Inputs advance to the tick, the behavior runs, outputs advance, and the
//!    node is stamped.
//!
//! Scalar connections never schedule work. A scalar input reads whatever
//! its source output currently holds.
//!
//! The walk is iterative. A node reached again while its own dependencies
//! are still being evaluated is a cycle and fails the pass with
//! [`GraphError::CycleDetected`].

use std::collections::{BTreeMap, BTreeSet};

use crate::config::GraphConfig;
use crate::error::{ConnectionError, GraphError, TypeMismatch};
use crate::flow::FlowData;
use crate::node::{Node, NodeBehavior, NodeId};
use crate::pin::{Direction, Pin, PinRef, PinSelector};
use crate::shadow::ShadowRegistry;
use crate::value::{ParameterValue, ValueKind, ValueType};

/// An arena of nodes with a generation-stamped scheduler.
#[derive(Debug)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    generation: u64,
    display_nodes: Vec<NodeId>,
    output_nodes: Vec<NodeId>,
    shadows: ShadowRegistry<PinRef>,
    config: GraphConfig,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty graph with default configuration.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Create an empty graph.
    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            nodes: BTreeMap::new(),
            generation: 1,
            display_nodes: Vec::new(),
            output_nodes: Vec::new(),
            shadows: ShadowRegistry::new(),
            config,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Replace the configuration. Existing nodes keep the pins they declared.
    pub fn set_config(&mut self, config: GraphConfig) {
        self.config = config;
    }

    /// Incremented once per [`compute`](Self::compute) call; starts at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `id` is owned by this graph.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutable node by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Pin by address.
    pub fn pin(&self, pin: PinRef) -> Option<&Pin> {
        self.nodes.get(&pin.node)?.pin(pin.direction, pin.index)
    }

    /// Mutable pin by address. Writes here bypass shadow fan-out.
    pub fn pin_mut(&mut self, pin: PinRef) -> Option<&mut Pin> {
        self.nodes.get_mut(&pin.node)?.pin_mut(pin.direction, pin.index)
    }

    fn pin_checked(&self, pin: PinRef) -> Result<&Pin, GraphError> {
        let node = self.nodes.get(&pin.node).ok_or(GraphError::NodeNotFound(pin.node))?;
        node.pin(pin.direction, pin.index).ok_or(GraphError::PinNotFound(pin))
    }

    fn pin_mut_checked(&mut self, pin: PinRef) -> Result<&mut Pin, GraphError> {
        let node = self
            .nodes
            .get_mut(&pin.node)
            .ok_or(GraphError::NodeNotFound(pin.node))?;
        node.pin_mut(pin.direction, pin.index).ok_or(GraphError::PinNotFound(pin))
    }

    // --- Node mutations ---

    /// Create a node running `behavior`. Returns the new node's id.
    pub fn create_node<B: NodeBehavior>(&mut self, behavior: B) -> NodeId {
        self.create_boxed(Box::new(behavior))
    }

    /// Create a node from a boxed behavior, as produced by a registry factory.
    pub fn create_boxed(&mut self, mut behavior: Box<dyn NodeBehavior>) -> NodeId {
        let id = NodeId::next();
        let mut node = Node::new(id, &*behavior, self.config.default_lerp_ticks);
        behavior.declare(&mut node, &self.config);
        node.attach(behavior);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {} node {id}", node.kind_name());
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node, its connections and its shadow links.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node = self.nodes.remove(&id).ok_or(GraphError::NodeNotFound(id))?;

        for (index, pin) in node.inputs().iter().enumerate() {
            if let Some(source) = pin.source()
                && let Some(output) = self.pin_mut(source)
            {
                output.remove_target(PinRef::input(id, index));
            }
        }
        for pin in node.outputs() {
            for target in pin.targets() {
                if let Some(input) = self.pin_mut(target) {
                    input.set_source(None);
                }
            }
        }

        self.shadows.unlink_where(|pin| pin.node == id);
        self.display_nodes.retain(|&n| n != id);
        self.output_nodes.retain(|&n| n != id);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: node {id}");
        Ok(())
    }

    // --- Connections ---

    /// Connect output `output` of `from` to input `input` of `to`.
    ///
    /// Returns the address of the connected input.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidConnection`] when the output index is out of
    /// range, the nodes are the same, the input index is out of range, the
    /// input already has a source, the types differ, or a named pin does not
    /// exist. [`GraphError::NodeNotFound`] for unknown nodes.
    pub fn connect(
        &mut self,
        from: NodeId,
        output: impl Into<PinSelector>,
        to: NodeId,
        input: impl Into<PinSelector>,
    ) -> Result<PinRef, GraphError> {
        self.connect_pins(from, &output.into(), to, Some(&input.into()))
    }

    /// Connect a flow or control output to a new input on `to`.
    ///
    /// The input is named after the output, with a numeric suffix if that
    /// name is taken.
    ///
    /// # Errors
    ///
    /// As [`connect`](Self::connect), plus [`ConnectionError::InputRequired`]
    /// for scalar outputs.
    pub fn connect_auto(
        &mut self,
        from: NodeId,
        output: impl Into<PinSelector>,
        to: NodeId,
    ) -> Result<PinRef, GraphError> {
        self.connect_pins(from, &output.into(), to, None)
    }

    fn select(node: &Node, direction: Direction, selector: &PinSelector) -> Result<usize, ConnectionError> {
        let count = match direction {
            Direction::Input => node.inputs().len(),
            Direction::Output => node.outputs().len(),
        };
        match selector {
            PinSelector::Index(index) if *index < count => Ok(*index),
            PinSelector::Index(index) => Err(match direction {
                Direction::Input => ConnectionError::InputOutOfRange {
                    node: node.id(),
                    index: *index,
                    count,
                },
                Direction::Output => ConnectionError::OutputOutOfRange {
                    node: node.id(),
                    index: *index,
                    count,
                },
            }),
            PinSelector::Name(name) => {
                node.pin_index(direction, name)
                    .ok_or_else(|| ConnectionError::UnknownPin {
                        node: node.id(),
                        direction,
                        name: name.clone(),
                    })
            }
        }
    }

    fn connect_pins(
        &mut self,
        from: NodeId,
        output: &PinSelector,
        to: NodeId,
        input: Option<&PinSelector>,
    ) -> Result<PinRef, GraphError> {
        let source = self.nodes.get(&from).ok_or(GraphError::NodeNotFound(from))?;
        let out_index = Self::select(source, Direction::Output, output)?;
        let out_ref = PinRef::output(from, out_index);
        if from == to {
            return Err(ConnectionError::SelfConnection(from).into());
        }

        let out_pin = source.output(out_index).ok_or(GraphError::PinNotFound(out_ref))?;
        let out_type = out_pin.value_type();
        let out_name = out_pin.name().to_string();
        let flow_shape = out_pin.value().as_flow().map(|flow| {
            let data = flow.read();
            FlowData::new(data.kind(), data.sample_type())
        });

        let target = self.nodes.get(&to).ok_or(GraphError::NodeNotFound(to))?;
        let in_index = match input {
            Some(selector) => {
                let index = Self::select(target, Direction::Input, selector)?;
                let in_ref = PinRef::input(to, index);
                let pin = target.input(index).ok_or(GraphError::PinNotFound(in_ref))?;
                if let Some(existing) = pin.source() {
                    return Err(ConnectionError::InputAlreadyConnected {
                        input: in_ref,
                        existing,
                    }
                    .into());
                }
                if pin.value_type() != out_type {
                    return Err(ConnectionError::TypeMismatch {
                        output: out_type,
                        input: pin.value_type(),
                    }
                    .into());
                }
                index
            }
            None => {
                let name = target.unique_input_name(&out_name);
                let target = self.nodes.get_mut(&to).ok_or(GraphError::NodeNotFound(to))?;
                match (out_type, flow_shape) {
                    (ValueType::Flow, Some(shape)) => target.add_flow_input(name, shape),
                    (ValueType::Control, _) => target.add_control_input(name),
                    _ => return Err(ConnectionError::InputRequired(out_ref).into()),
                }
            }
        };

        let in_ref = PinRef::input(to, in_index);
        self.pin_mut_checked(in_ref)?.set_source(Some(out_ref));
        self.pin_mut_checked(out_ref)?.add_target(in_ref);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_connect: {out_ref} → {in_ref}");
        Ok(in_ref)
    }

    /// Drop every connection of `pin`, fixing the reverse links.
    ///
    /// Returns how many connections were removed.
    pub fn disconnect(&mut self, pin: PinRef) -> Result<usize, GraphError> {
        let peers = self.pin_mut_checked(pin)?.detach();
        for &peer in &peers {
            if let Some(other) = self.pin_mut(peer) {
                match pin.direction {
                    Direction::Input => {
                        other.remove_target(pin);
                    }
                    Direction::Output => other.set_source(None),
                }
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_disconnect: {pin} ({} connections)", peers.len());
        Ok(peers.len())
    }

    /// Disconnect `pin` and remove it from its shadow group.
    pub fn detach_pin(&mut self, pin: PinRef) -> Result<usize, GraphError> {
        let removed = self.disconnect(pin)?;
        self.shadows.unlink(&pin);
        Ok(removed)
    }

    // --- Shadowing ---

    /// Make `follower` mirror writes to `leader` (and every other member of
    /// the leader's group).
    ///
    /// # Errors
    ///
    /// [`GraphError::TypeMismatch`] when both pins are typed and differ.
    pub fn shadow(&mut self, follower: PinRef, leader: PinRef) -> Result<bool, GraphError> {
        let follower_type = self.pin_checked(follower)?.value_type();
        let leader_type = self.pin_checked(leader)?.value_type();
        if follower_type != ValueType::None && leader_type != ValueType::None && follower_type != leader_type
        {
            return Err(TypeMismatch::new(leader_type, follower_type).into());
        }
        let linked = self.shadows.shadow(follower, leader);
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_shadow: {follower} follows {leader}");
        Ok(linked)
    }

    /// Remove `pin` from its shadow group.
    pub fn unshadow(&mut self, pin: PinRef) -> bool {
        self.shadows.unlink(&pin)
    }

    /// The shadow registry.
    pub fn shadows(&self) -> &ShadowRegistry<PinRef> {
        &self.shadows
    }

    fn propagate_shadow(&mut self, pin: PinRef) -> Result<(), GraphError> {
        if !self.shadows.is_linked(&pin) {
            return Ok(());
        }
        let state = self.pin_checked(pin)?.parameter().shadow_state();
        let members: Vec<PinRef> = self.shadows.shadows_of(&pin).copied().collect();
        for member in members {
            if let Some(other) = self.pin_mut(member) {
                other.parameter_mut().apply_shadow(&state)?;
            }
        }
        Ok(())
    }

    // --- Values ---

    /// Write a pin's parameter and fan the change out to its shadows.
    pub fn set_pin_value(
        &mut self,
        pin: PinRef,
        value: impl Into<ParameterValue>,
        immediate: bool,
    ) -> Result<bool, GraphError> {
        let changed = self
            .pin_mut_checked(pin)?
            .parameter_mut()
            .set_value(value.into(), immediate)?;
        if changed {
            self.propagate_shadow(pin)?;
        }
        Ok(changed)
    }

    /// Value seen through `pin`: a connected input resolves through its
    /// source chain, anything else returns its own value.
    pub fn pin_value(&self, pin: PinRef) -> Result<&ParameterValue, GraphError> {
        let mut current = self.pin_checked(pin)?;
        while let Some(source) = current.source() {
            current = self.pin_checked(source)?;
        }
        Ok(current.value())
    }

    /// Exact typed read of [`pin_value`](Self::pin_value).
    pub fn pin_get<T: ValueKind>(&self, pin: PinRef) -> Result<T, GraphError> {
        Ok(self.pin_value(pin)?.get()?)
    }

    /// Coercing typed read of [`pin_value`](Self::pin_value).
    pub fn pin_to<T: ValueKind>(&self, pin: PinRef) -> Result<T, GraphError> {
        Ok(self.pin_value(pin)?.to()?)
    }

    /// Normalized position of the pin's own parameter.
    pub fn pin_normalized(&self, pin: PinRef) -> Result<f64, GraphError> {
        Ok(self.pin_checked(pin)?.parameter().normalized())
    }

    /// Set the pin's parameter from a normalized position, ramping, and fan
    /// the change out to its shadows.
    pub fn set_pin_normalized(&mut self, pin: PinRef, normalized: f64) -> Result<bool, GraphError> {
        let changed = self
            .pin_mut_checked(pin)?
            .parameter_mut()
            .set_from_normalized(normalized)?;
        if changed {
            self.propagate_shadow(pin)?;
        }
        Ok(changed)
    }

    /// Every unconnected scalar pin, inputs then outputs per node.
    ///
    /// Recomputed on each call.
    pub fn control_surface(&self) -> Vec<PinRef> {
        let mut surface = Vec::new();
        for (&id, node) in &self.nodes {
            for (index, pin) in node.inputs().iter().enumerate() {
                if pin.source().is_none() && !pin.is_stream() {
                    surface.push(PinRef::input(id, index));
                }
            }
            for (index, pin) in node.outputs().iter().enumerate() {
                if pin.source().is_none() && !pin.is_stream() {
                    surface.push(PinRef::output(id, index));
                }
            }
        }
        surface
    }

    // --- Node subsets ---

    /// Nodes the view layer draws.
    pub fn display_nodes(&self) -> &[NodeId] {
        &self.display_nodes
    }

    /// Replace the display subset. Unknown and repeated ids are dropped.
    pub fn set_display_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.display_nodes = self.owned_subset(ids);
    }

    /// Nodes whose outputs leave the graph.
    pub fn output_nodes(&self) -> &[NodeId] {
        &self.output_nodes
    }

    /// Replace the output subset. Unknown and repeated ids are dropped.
    pub fn set_output_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.output_nodes = self.owned_subset(ids);
    }

    fn owned_subset(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        let mut seen = BTreeSet::new();
        ids.into_iter()
            .filter(|id| self.nodes.contains_key(id) && seen.insert(*id))
            .collect()
    }

    // --- Evaluation ---

    /// Evaluate `targets` and whatever flow/control producers they depend on
    /// for `tick`.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] for an unknown target,
    /// [`GraphError::CycleDetected`] if the flow/control dependencies loop,
    /// and any error returned by a node's behavior.
    pub fn compute(&mut self, targets: &[NodeId], tick: u64) -> Result<(), GraphError> {
        self.generation += 1;
        let generation = self.generation;
        let mut in_progress = BTreeSet::new();
        #[cfg(feature = "tracing")]
        let mut evaluated = 0usize;

        for &target in targets {
            if !self.nodes.contains_key(&target) {
                return Err(GraphError::NodeNotFound(target));
            }

            // (node, dependencies already pushed)
            let mut stack = vec![(target, false)];
            while let Some((id, expanded)) = stack.pop() {
                let node = self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;
                if node.generation == generation {
                    continue;
                }

                if expanded {
                    self.evaluate(id, tick, generation)?;
                    in_progress.remove(&id);
                    #[cfg(feature = "tracing")]
                    {
                        evaluated += 1;
                    }
                    continue;
                }

                if !in_progress.insert(id) {
                    return Err(self.cycle(id));
                }
                stack.push((id, true));
                for dep in self.stream_dependencies(node, generation).into_iter().rev() {
                    if in_progress.contains(&dep) {
                        return Err(self.cycle(dep));
                    }
                    stack.push((dep, false));
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            "graph_compute: generation {generation}, {} targets, {evaluated} evaluated",
            targets.len()
        );
        Ok(())
    }

    /// Evaluate the output subset.
    pub fn compute_outputs(&mut self, tick: u64) -> Result<(), GraphError> {
        let targets = self.output_nodes.clone();
        self.compute(&targets, tick)
    }

    fn cycle(&self, id: NodeId) -> GraphError {
        #[cfg(feature = "tracing")]
        tracing::warn!("graph_compute: dependency cycle through node {id}");
        GraphError::CycleDetected(id)
    }

    /// Distinct stale producers feeding `node`'s flow and control inputs.
    fn stream_dependencies(&self, node: &Node, generation: u64) -> Vec<NodeId> {
        let mut deps = Vec::new();
        for pin in node.inputs().iter().filter(|p| p.is_stream()) {
            let Some(source) = pin.source() else {
                continue;
            };
            let stale = self
                .nodes
                .get(&source.node)
                .is_some_and(|n| n.generation != generation);
            if stale && !deps.contains(&source.node) {
                deps.push(source.node);
            }
        }
        deps
    }

    fn evaluate(&mut self, id: NodeId, tick: u64, generation: u64) -> Result<(), GraphError> {
        let upstream = {
            let node = self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))?;
            node.inputs()
                .iter()
                .map(|pin| match pin.source() {
                    Some(source) => self.pin_value(source).map(|v| Some(v.clone())),
                    None => Ok(None),
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let publish = self.config.publish_display;
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        let mut resolved = Vec::with_capacity(upstream.len());
        for (pin, upstream) in node.inputs_mut().iter_mut().zip(upstream) {
            let own = pin.update(tick, upstream.as_ref(), publish);
            resolved.push(match upstream {
                Some(value) => value,
                None => own.clone(),
            });
        }

        let changed = node.run_compute(tick, &self.config, &resolved)?;

        for pin in node.outputs_mut() {
            pin.update(tick, None, publish);
        }
        node.generation = generation;

        for index in changed {
            self.propagate_shadow(PinRef::output(id, index))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowKind, SampleType};
    use crate::node::ComputeContext;
    use crate::node_kind;
    use crate::param::Parameter;

    struct Scalar;
    node_kind!(Scalar, "scalar");

    impl NodeBehavior for Scalar {
        fn declare(&mut self, node: &mut Node, _config: &crate::GraphConfig) {
            node.add_input("in", Parameter::new(0.0f32));
            node.add_output("out", Parameter::new(0.0f32));
            node.add_output("count", Parameter::new(0i64));
        }

        fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
            let v: f32 = ctx.input(0)?;
            ctx.set_output(0, v)?;
            Ok(())
        }
    }

    struct Stream;
    node_kind!(Stream, "stream");

    impl NodeBehavior for Stream {
        fn declare(&mut self, node: &mut Node, config: &crate::GraphConfig) {
            node.add_flow_output(
                "audio",
                FlowData::with_layout(FlowKind::Audio, SampleType::F32, [0], config.block_size),
            );
            node.add_control_output("events");
        }
    }

    #[test]
    fn connect_and_resolve_scalar() {
        let mut graph = Graph::new();
        let a = graph.create_node(Scalar);
        let b = graph.create_node(Scalar);

        let input = graph.connect(a, "out", b, "in").unwrap();
        assert_eq!(input, PinRef::input(b, 0));
        assert_eq!(graph.pin(input).and_then(Pin::source), Some(PinRef::output(a, 0)));
        assert_eq!(
            graph.pin(PinRef::output(a, 0)).map(|p| p.targets().collect::<Vec<_>>()),
            Some(vec![input])
        );

        graph.set_pin_value(PinRef::output(a, 0), 0.25f32, true).unwrap();
        assert_eq!(graph.pin_to::<f32>(input), Ok(0.25));
        assert_eq!(graph.pin(input).map(|p| p.value().clone()), Some(ParameterValue::Float(0.0)));
    }

    #[test]
    fn connect_validation() {
        let mut graph = Graph::new();
        let a = graph.create_node(Scalar);
        let b = graph.create_node(Scalar);

        let err = graph.connect(a, 3usize, b, 0usize).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection(ConnectionError::OutputOutOfRange { index: 3, count: 2, .. })
        ));

        let err = graph.connect(a, 0usize, a, 0usize).unwrap_err();
        assert_eq!(err, GraphError::InvalidConnection(ConnectionError::SelfConnection(a)));

        let err = graph.connect(a, 0usize, b, 5usize).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection(ConnectionError::InputOutOfRange { index: 5, .. })
        ));

        let err = graph.connect(a, "count", b, "in").unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidConnection(ConnectionError::TypeMismatch {
                output: ValueType::Int64,
                input: ValueType::Float,
            })
        );

        let err = graph.connect(a, "nope", b, "in").unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection(ConnectionError::UnknownPin { direction: Direction::Output, .. })
        ));

        graph.connect(a, "out", b, "in").unwrap();
        let c = graph.create_node(Scalar);
        let err = graph.connect(c, "out", b, "in").unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection(ConnectionError::InputAlreadyConnected { .. })
        ));

        let ghost = NodeId::from_raw(u64::MAX);
        assert_eq!(graph.connect(ghost, 0usize, b, 0usize), Err(GraphError::NodeNotFound(ghost)));
    }

    #[test]
    fn connect_auto_generates_unique_inputs() {
        let mut graph = Graph::new();
        let src = graph.create_node(Stream);
        let other = graph.create_node(Stream);
        let dst = graph.create_node(Scalar);

        let first = graph.connect_auto(src, "audio", dst).unwrap();
        let second = graph.connect_auto(other, "audio", dst).unwrap();
        let events = graph.connect_auto(src, "events", dst).unwrap();

        let node = graph.node(dst).unwrap();
        assert_eq!(node.input(first.index).map(Pin::name), Some("audio"));
        assert_eq!(node.input(second.index).map(Pin::name), Some("audio_1"));
        assert_eq!(node.input(events.index).map(Pin::value_type), Some(ValueType::Control));
        assert_eq!(node.flow_inputs(), &[first.index, second.index]);
        assert_eq!(node.control_inputs(), &[events.index]);

        let err = graph.connect_auto(dst, "out", src).unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidConnection(ConnectionError::InputRequired(PinRef::output(dst, 0)))
        );
    }

    #[test]
    fn disconnect_fixes_both_ends() {
        let mut graph = Graph::new();
        let a = graph.create_node(Scalar);
        let b = graph.create_node(Scalar);
        let c = graph.create_node(Scalar);
        graph.connect(a, "out", b, "in").unwrap();
        graph.connect(a, "out", c, "in").unwrap();

        assert_eq!(graph.disconnect(PinRef::input(b, 0)), Ok(1));
        assert_eq!(graph.pin(PinRef::input(b, 0)).and_then(Pin::source), None);
        assert_eq!(graph.pin(PinRef::output(a, 0)).map(|p| p.targets().len()), Some(1));

        assert_eq!(graph.disconnect(PinRef::output(a, 0)), Ok(1));
        assert_eq!(graph.pin(PinRef::input(c, 0)).and_then(Pin::source), None);
        assert_eq!(
            graph.disconnect(PinRef::input(c, 9)),
            Err(GraphError::PinNotFound(PinRef::input(c, 9)))
        );
    }

    #[test]
    fn remove_node_unlinks_everything() {
        let mut graph = Graph::new();
        let a = graph.create_node(Scalar);
        let b = graph.create_node(Scalar);
        let c = graph.create_node(Scalar);
        graph.connect(a, "out", b, "in").unwrap();
        graph.connect(b, "out", c, "in").unwrap();
        graph.shadow(PinRef::input(a, 0), PinRef::input(b, 0)).unwrap();
        graph.set_display_nodes([a, b, c]);
        graph.set_output_nodes([b]);

        graph.remove_node(b).unwrap();
        assert!(!graph.contains_node(b));
        assert_eq!(graph.pin(PinRef::output(a, 0)).map(|p| p.targets().len()), Some(0));
        assert_eq!(graph.pin(PinRef::input(c, 0)).and_then(Pin::source), None);
        assert!(graph.shadows().is_empty());
        assert_eq!(graph.display_nodes(), &[a, c]);
        assert!(graph.output_nodes().is_empty());
        assert_eq!(graph.remove_node(b), Err(GraphError::NodeNotFound(b)));
    }

    #[test]
    fn shadow_fans_out_and_checks_types() {
        let mut graph = Graph::new();
        let a = graph.create_node(Scalar);
        let b = graph.create_node(Scalar);
        let leader = PinRef::input(a, 0);
        let follower = PinRef::input(b, 0);

        assert_eq!(graph.shadow(follower, leader), Ok(true));
        graph.set_pin_value(leader, 0.75f32, true).unwrap();
        assert_eq!(graph.pin_to::<f32>(follower), Ok(0.75));

        // links are symmetric
        graph.set_pin_value(follower, 0.5f32, true).unwrap();
        assert_eq!(graph.pin_to::<f32>(leader), Ok(0.5));

        let err = graph.shadow(PinRef::output(a, 1), leader).unwrap_err();
        assert_eq!(err, GraphError::TypeMismatch(TypeMismatch::new(ValueType::Float, ValueType::Int64)));

        assert!(graph.unshadow(follower));
        graph.set_pin_value(leader, 0.1f32, true).unwrap();
        assert_eq!(graph.pin_to::<f32>(follower), Ok(0.5));
    }

    #[test]
    fn normalized_access_fans_out() {
        let mut graph = Graph::new();
        let a = graph.create_node(Scalar);
        let b = graph.create_node(Scalar);
        graph.shadow(PinRef::input(b, 0), PinRef::input(a, 0)).unwrap();

        assert_eq!(graph.set_pin_normalized(PinRef::input(a, 0), 0.5), Ok(true));
        graph.compute(&[a, b], 1).unwrap();
        assert_eq!(graph.pin_normalized(PinRef::input(a, 0)), Ok(0.5));
        assert_eq!(graph.pin_normalized(PinRef::input(b, 0)), Ok(0.5));
    }

    #[test]
    fn control_surface_lists_unconnected_scalars() {
        let mut graph = Graph::new();
        let a = graph.create_node(Scalar);
        let b = graph.create_node(Scalar);
        let s = graph.create_node(Stream);
        graph.connect(a, "out", b, "in").unwrap();
        graph.connect_auto(s, "audio", b).unwrap();

        let surface = graph.control_surface();
        assert!(surface.contains(&PinRef::input(a, 0)));
        assert!(!surface.contains(&PinRef::input(b, 0)));
        assert!(!surface.contains(&PinRef::input(b, 1)));
        assert!(surface.contains(&PinRef::output(a, 0)));
        assert!(!surface.contains(&PinRef::output(s, 0)));
        assert!(surface.iter().all(|p| p.node != s));
    }

    #[test]
    fn generation_increments_per_compute() {
        let mut graph = Graph::new();
        assert_eq!(graph.generation(), 1);
        let a = graph.create_node(Scalar);
        graph.compute(&[a], 0).unwrap();
        graph.compute(&[], 1).unwrap();
        assert_eq!(graph.generation(), 3);
        assert_eq!(graph.node(a).map(Node::generation), Some(2));
    }

    #[test]
    fn unknown_target_fails() {
        let mut graph = Graph::new();
        let ghost = NodeId::from_raw(u64::MAX - 1);
        assert_eq!(graph.compute(&[ghost], 0), Err(GraphError::NodeNotFound(ghost)));
    }

    #[test]
    fn subsets_drop_unknown_and_repeated_ids() {
        let mut graph = Graph::new();
        let a = graph.create_node(Scalar);
        graph.set_display_nodes([a, NodeId::from_raw(u64::MAX), a]);
        assert_eq!(graph.display_nodes(), &[a]);
    }
}
