//! Tessera Nodes - Built-in node kinds
//!
//! Ready-made behaviors for [`tessera_core::Graph`]:
//!
//! - [`Sum`] - Adds two float inputs
//! - [`Oscillator`] - Phase-continuous sine generator on a flow output
//! - [`Gain`] - Scales every channel of a flow input
//! - [`Mixer`] - Sums two flow inputs over the union of their channels
//! - [`Pulse`] - Emits a control event every `interval` ticks
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Graph, GraphConfig, PinRef};
//! use tessera_nodes::{Gain, Oscillator};
//!
//! let mut graph = Graph::with_config(GraphConfig::default().with_block_size(64));
//! let osc = graph.create_node(Oscillator::default());
//! let gain = graph.create_node(Gain::default());
//! graph.connect(osc, "out", gain, "in")?;
//! graph.set_pin_value(PinRef::input(gain, 1), 0.5f32, true)?;
//!
//! graph.compute(&[gain], 0)?;
//! let out = graph.pin_value(PinRef::output(gain, 0))?.as_flow().cloned();
//! assert_eq!(out.map(|flow| flow.read().num_samples()), Some(64));
//! # Ok::<(), tessera_core::GraphError>(())
//! ```

pub mod gain;
pub mod mixer;
pub mod oscillator;
pub mod pulse;
pub mod sum;

pub use gain::Gain;
pub use mixer::Mixer;
pub use oscillator::Oscillator;
pub use pulse::Pulse;
pub use sum::Sum;
