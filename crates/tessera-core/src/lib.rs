//! Tessera Core - dataflow node graph engine
//!
//! Typed nodes exchange values through directional pins, and a scheduler
//! lazily evaluates only the nodes needed to produce a requested set of
//! outputs for a given tick.
//!
//! # Core Abstractions
//!
//! ## Values and Parameters
//!
//! - [`ParameterValue`] - Tagged value: scalars, strings, flow and control handles
//! - [`Parameter`] - Typed value with portamento ramps, range and taper
//! - [`ParameterAttributes`] - Range, display format, flags and labels
//! - [`ShadowRegistry`] - Groups of parameters that mirror each other's writes
//!
//! ## Signal Data
//!
//! - [`FlowData`] - Multi-channel raw sample buffer with type conversion
//! - [`ControlData`] - Timestamped control events
//! - [`DisplaySnapshot`] - Lock-free snapshot cell for display threads
//!
//! ## Graph
//!
//! - [`Pin`] / [`PinRef`] - Typed connection endpoints and their addresses
//! - [`Node`] / [`NodeBehavior`] - Pin owner and its compute hook
//! - [`node_kind!`] - Declares a node kind's stable name
//! - [`Graph`] - Node arena and generation-stamped lazy-pull scheduler
//!
//! # Example
//!
//! ```rust
//! use tessera_core::{
//!     ComputeContext, Graph, GraphConfig, GraphError, Node, NodeBehavior, Parameter, PinRef,
//!     node_kind,
//! };
//!
//! struct Add;
//! node_kind!(Add, "add", "Add");
//!
//! impl NodeBehavior for Add {
//!     fn declare(&mut self, node: &mut Node, _config: &GraphConfig) {
//!         node.add_input("x", Parameter::new(0.0f32));
//!         node.add_input("y", Parameter::new(0.0f32));
//!         node.add_output("sum", Parameter::new(0.0f32));
//!     }
//!
//!     fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
//!         let sum = ctx.input::<f32>(0)? + ctx.input::<f32>(1)?;
//!         ctx.set_output(0, sum)?;
//!         Ok(())
//!     }
//! }
//!
//! let mut graph = Graph::new();
//! let add = graph.create_node(Add);
//! graph.set_pin_value(PinRef::input(add, 0), 2.0f32, true)?;
//! graph.set_pin_value(PinRef::input(add, 1), 3.0f32, true)?;
//! graph.compute(&[add], 0)?;
//! assert_eq!(graph.pin_to::<f32>(PinRef::output(add, 0))?, 5.0);
//! # Ok::<(), GraphError>(())
//! ```

pub mod config;
pub mod control;
pub mod error;
pub mod flow;
pub mod graph;
pub mod handle;
pub mod node;
pub mod param;
pub mod pin;
pub mod shadow;
pub mod snapshot;
pub mod value;

pub use config::GraphConfig;
pub use control::{ControlData, ControlEvent, ControlHandle};
pub use error::{ConfigError, ConnectionError, GraphError, TypeMismatch};
pub use flow::{FlowData, FlowFlags, FlowHandle, FlowKind, Sample, SampleType};
pub use graph::Graph;
pub use handle::Handle;
pub use node::{ComputeContext, Decorator, DecoratorKind, Node, NodeBehavior, NodeId, NodeKind};
pub use param::{
    DisplayFormat, Parameter, ParameterAttributes, ParameterFlags, ShadowState, UiHint,
};
pub use pin::{Direction, Pin, PinRef, PinSelector, PinView};
pub use shadow::ShadowRegistry;
pub use snapshot::DisplaySnapshot;
pub use value::{ParameterValue, ValueKind, ValueType};
