//! Node registry and factory for tessera graphs.
//!
//! This crate lists every built-in node kind with display metadata and
//! creates instances by id, either as boxed behaviors or directly inside a
//! [`Graph`].
//!
//! # Features
//!
//! - **Node Discovery**: List all available node kinds with metadata
//! - **Factory Pattern**: Create nodes by id at runtime
//! - **Category System**: Kinds grouped as math, generators, processors, control
//!
//! The registry is closed: the set of kinds is fixed at compile time.
//!
//! # Example
//!
//! ```rust
//! use tessera_core::Graph;
//! use tessera_registry::{NodeCategory, NodeRegistry};
//!
//! let registry = NodeRegistry::new();
//!
//! for node in registry.all_nodes() {
//!     println!("{}: {}", node.name, node.description);
//! }
//!
//! let mut graph = Graph::new();
//! let osc = registry.instantiate(&mut graph, "oscillator").unwrap();
//! assert_eq!(graph.node(osc).unwrap().kind_name(), "oscillator");
//!
//! for node in registry.nodes_in_category(NodeCategory::Generator) {
//!     println!("Generator: {}", node.name);
//! }
//! ```

use tessera_core::{Direction, Graph, NodeBehavior, NodeId};
use tessera_nodes::{Gain, Mixer, Oscillator, Pulse, Sum};

/// Category of node kind for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    /// Scalar arithmetic
    Math,
    /// Flow sources
    Generator,
    /// Flow-in, flow-out processing
    Processor,
    /// Control event sources
    Control,
}

impl NodeCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            NodeCategory::Math => "Math",
            NodeCategory::Generator => "Generator",
            NodeCategory::Processor => "Processor",
            NodeCategory::Control => "Control",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            NodeCategory::Math => "Arithmetic on scalar pins",
            NodeCategory::Generator => "Oscillators and other flow sources",
            NodeCategory::Processor => "Gain stages, mixers and other flow processors",
            NodeCategory::Control => "Triggers and other control event sources",
        }
    }
}

/// Describes a node kind in the registry.
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    /// Stable kind key, equal to the node's `kind_name`.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Category for organization.
    pub category: NodeCategory,
}

/// Factory function type for creating node behaviors.
type NodeFactory = fn() -> Box<dyn NodeBehavior>;

struct RegistryEntry {
    descriptor: NodeDescriptor,
    factory: NodeFactory,
}

/// Registry of all available node kinds.
pub struct NodeRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    /// Create a new registry with all built-in node kinds registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(5),
        };
        registry.register_builtin_nodes();
        registry
    }

    fn register_builtin_nodes(&mut self) {
        self.register(
            NodeDescriptor {
                id: Sum::KIND,
                name: Sum::DISPLAY_NAME,
                description: "Adds two float inputs",
                category: NodeCategory::Math,
            },
            || Box::new(Sum),
        );

        self.register(
            NodeDescriptor {
                id: Oscillator::KIND,
                name: Oscillator::DISPLAY_NAME,
                description: "Phase-continuous sine generator",
                category: NodeCategory::Generator,
            },
            || Box::new(Oscillator::default()),
        );

        self.register(
            NodeDescriptor {
                id: Gain::KIND,
                name: Gain::DISPLAY_NAME,
                description: "Scales every channel of a flow input",
                category: NodeCategory::Processor,
            },
            || Box::new(Gain),
        );

        self.register(
            NodeDescriptor {
                id: Mixer::KIND,
                name: Mixer::DISPLAY_NAME,
                description: "Sums two flow inputs over the union of their channels",
                category: NodeCategory::Processor,
            },
            || Box::new(Mixer),
        );

        self.register(
            NodeDescriptor {
                id: Pulse::KIND,
                name: Pulse::DISPLAY_NAME,
                description: "Emits a trigger event every N ticks",
                category: NodeCategory::Control,
            },
            || Box::new(Pulse::default()),
        );
    }

    fn register(&mut self, descriptor: NodeDescriptor, factory: NodeFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Returns descriptors for all registered node kinds.
    pub fn all_nodes(&self) -> Vec<&NodeDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns descriptors for node kinds in a specific category.
    pub fn nodes_in_category(&self, category: NodeCategory) -> Vec<&NodeDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a descriptor by kind id.
    pub fn descriptor(&self, id: &str) -> Option<&NodeDescriptor> {
        self.entry(id).map(|e| &e.descriptor)
    }

    fn entry(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.descriptor.id == id)
    }

    /// Create a fresh behavior by kind id.
    pub fn create(&self, id: &str) -> Option<Box<dyn NodeBehavior>> {
        self.entry(id).map(|e| (e.factory)())
    }

    /// Create a node of kind `id` inside `graph`.
    ///
    /// Returns `None` if the id is not registered.
    pub fn instantiate(&self, graph: &mut Graph, id: &str) -> Option<NodeId> {
        let behavior = self.create(id)?;
        let node = graph.create_boxed(behavior);
        #[cfg(feature = "tracing")]
        tracing::debug!("registry_instantiate: {id} as node {node}");
        Some(node)
    }

    /// Find a pin index by name for a given node kind.
    ///
    /// Declares a temporary instance in a scratch graph to read its pins.
    /// Matching ignores ASCII case.
    pub fn pin_index_by_name(&self, id: &str, direction: Direction, name: &str) -> Option<usize> {
        let mut scratch = Graph::new();
        let node = self.instantiate(&mut scratch, id)?;
        let node = scratch.node(node)?;
        let pins = match direction {
            Direction::Input => node.inputs(),
            Direction::Output => node.outputs(),
        };
        pins.iter().position(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Returns the number of registered node kinds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no node kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{NodeKind, PinRef};

    #[test]
    fn test_registry_creation() {
        let registry = NodeRegistry::new();
        assert_eq!(registry.len(), 5);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_descriptor() {
        let registry = NodeRegistry::new();

        let osc = registry.descriptor("oscillator").unwrap();
        assert_eq!(osc.name, "Oscillator");
        assert_eq!(osc.category, NodeCategory::Generator);

        assert!(registry.descriptor("nonexistent").is_none());
    }

    #[test]
    fn test_nodes_by_category() {
        let registry = NodeRegistry::new();
        assert_eq!(registry.nodes_in_category(NodeCategory::Math).len(), 1);
        assert_eq!(registry.nodes_in_category(NodeCategory::Generator).len(), 1);
        assert_eq!(registry.nodes_in_category(NodeCategory::Processor).len(), 2); // Gain, Mixer
        assert_eq!(registry.nodes_in_category(NodeCategory::Control).len(), 1);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(NodeCategory::Generator.name(), "Generator");
        assert!(!NodeCategory::Control.description().is_empty());
    }

    #[test]
    fn test_all_nodes_can_be_instantiated() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let registry = NodeRegistry::new();
        let mut graph = Graph::new();

        for descriptor in registry.all_nodes() {
            let id = registry.instantiate(&mut graph, descriptor.id);
            assert!(id.is_some(), "Failed to instantiate node: {}", descriptor.id);

            let id = id.unwrap();
            let node = graph.node(id).unwrap();
            assert_eq!(node.kind_name(), descriptor.id);
            assert_eq!(node.display_name(), descriptor.name);
            assert!(
                graph.compute(&[id], 0).is_ok(),
                "Node {} failed to compute",
                descriptor.id
            );
        }
        assert_eq!(graph.len(), registry.len());
        assert!(registry.instantiate(&mut graph, "nonexistent").is_none());
    }

    #[test]
    fn test_created_behaviors_are_independent() {
        let registry = NodeRegistry::new();
        let a = registry.create("pulse").unwrap();
        let b = registry.create("pulse").unwrap();
        assert_eq!(a.kind_name(), b.kind_name());

        let mut graph = Graph::new();
        let first = graph.create_boxed(a);
        let second = graph.create_boxed(b);
        graph.compute(&[first], 0).unwrap();
        graph.compute(&[first, second], 1).unwrap();

        let events = |id| {
            graph
                .pin_value(PinRef::output(id, 0))
                .unwrap()
                .as_control()
                .unwrap()
                .read()
                .len()
        };
        // default interval 4: the first already fired at tick 0
        assert_eq!(events(first), 0);
        assert_eq!(events(second), 1);
    }

    #[test]
    fn test_pin_index_by_name() {
        let registry = NodeRegistry::new();
        assert_eq!(registry.pin_index_by_name("gain", Direction::Input, "Gain"), Some(1));
        assert_eq!(registry.pin_index_by_name("sum", Direction::Output, "sum"), Some(0));
        assert_eq!(registry.pin_index_by_name("sum", Direction::Input, "z"), None);
        assert_eq!(registry.pin_index_by_name("nonexistent", Direction::Input, "x"), None);
    }
}
