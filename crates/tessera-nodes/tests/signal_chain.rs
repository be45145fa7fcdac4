//! Integration tests for tessera-nodes.
//!
//! Wires the built-in kinds into small graphs and checks the signal that
//! comes out, the scheduling of shared producers and display publishing.

use tessera_core::{FlowData, Graph, GraphConfig, NodeId, PinRef};
use tessera_nodes::{Gain, Mixer, Oscillator, Pulse, Sum};

fn flow_out(graph: &Graph, id: NodeId) -> FlowData {
    graph
        .pin_value(PinRef::output(id, 0))
        .unwrap()
        .as_flow()
        .unwrap()
        .snapshot()
}

// ============================================================================
// 1. Oscillator → Gain → Mixer
// ============================================================================

#[test]
fn oscillator_through_gain_and_mixer() {
    let mut graph = Graph::with_config(GraphConfig::default().with_block_size(128));
    let osc = graph.create_node(Oscillator::default());
    let left = graph.create_node(Gain);
    let right = graph.create_node(Gain);
    let mix = graph.create_node(Mixer);

    graph.connect(osc, "out", left, "in").unwrap();
    graph.connect(osc, "out", right, "in").unwrap();
    graph.connect(left, "out", mix, "a").unwrap();
    graph.connect(right, "out", mix, "b").unwrap();
    graph.set_pin_value(PinRef::input(left, 1), 0.25f32, true).unwrap();
    graph.set_pin_value(PinRef::input(right, 1), 0.75f32, true).unwrap();
    graph.set_output_nodes([mix]);

    graph.compute_outputs(0).unwrap();

    let source = flow_out(&graph, osc).read_samples::<f32>(0);
    let mixed = flow_out(&graph, mix).read_samples::<f32>(0);
    assert_eq!(mixed.len(), 128);
    for (s, m) in source.iter().zip(&mixed) {
        assert!((s - m).abs() < 1e-6, "{s} vs {m}");
    }
}

#[test]
fn shared_oscillator_advances_once_per_tick() {
    let mut graph = Graph::with_config(GraphConfig::default().with_block_size(64));
    let osc = graph.create_node(Oscillator::default());
    let a = graph.create_node(Gain);
    let b = graph.create_node(Gain);
    graph.connect(osc, "out", a, "in").unwrap();
    graph.connect(osc, "out", b, "in").unwrap();

    for tick in 0..3 {
        graph.compute(&[a, b], tick).unwrap();
    }

    // three blocks rendered, not six
    let mut reference = Oscillator::default();
    let mut scratch = vec![0.0f32; 64 * 3];
    reference.render(&mut scratch, 440.0, 0.5, 48000.0);
    let last_block = &scratch[128..];
    let out = flow_out(&graph, a).read_samples::<f32>(0);
    for (x, y) in out.iter().zip(last_block) {
        assert!((x - y).abs() < 1e-5);
    }
}

#[test]
fn gain_ramps_over_ticks() {
    let mut graph = Graph::with_config(
        GraphConfig::default()
            .with_block_size(16)
            .with_default_lerp_ticks(4),
    );
    let osc = graph.create_node(Oscillator::default());
    let gain = graph.create_node(Gain);
    graph.connect(osc, "out", gain, "in").unwrap();
    graph.compute(&[gain], 0).unwrap();

    graph.set_pin_value(PinRef::input(gain, 1), 0.0f32, false).unwrap();
    graph.compute(&[gain], 2).unwrap();
    let half: f32 = graph.pin_get(PinRef::input(gain, 1)).unwrap();
    assert!((half - 0.5).abs() < 1e-6);

    graph.compute(&[gain], 4).unwrap();
    let out = flow_out(&graph, gain).read_samples::<f32>(0);
    assert!(out.iter().all(|&s| s == 0.0));
}

// ============================================================================
// 2. Scalars and control
// ============================================================================

#[test]
fn sum_chain_resolves_through_sources() {
    let mut graph = Graph::new();
    let first = graph.create_node(Sum);
    let second = graph.create_node(Sum);
    graph.connect(first, "sum", second, "x").unwrap();
    graph.set_pin_value(PinRef::input(first, 0), 0.5f32, true).unwrap();
    graph.set_pin_value(PinRef::input(first, 1), 0.1f32, true).unwrap();
    graph.set_pin_value(PinRef::input(second, 1), 1.0f32, true).unwrap();

    graph.compute(&[first, second], 0).unwrap();
    let total: f32 = graph.pin_get(PinRef::output(second, 0)).unwrap();
    assert!((total - 1.6).abs() < 1e-6);

    graph.set_pin_value(PinRef::input(first, 0), 1.0f32, false).unwrap();
    graph.compute(&[first, second], 1).unwrap();
    let total: f32 = graph.pin_get(PinRef::output(second, 0)).unwrap();
    assert!((total - 2.1).abs() < 1e-6);
}

#[test]
fn pulse_control_feeds_auto_input() {
    let mut graph = Graph::new();
    let pulse = graph.create_node(Pulse::default());
    let sink = graph.create_node(Sum);
    let input = graph.connect_auto(pulse, "trigger", sink).unwrap();
    graph.set_pin_value(PinRef::input(pulse, 0), 2i64, true).unwrap();

    let mut seen = Vec::new();
    for tick in 0..6 {
        graph.compute(&[sink], tick).unwrap();
        let value = graph.pin_value(input).unwrap();
        seen.push(value.as_control().unwrap().read().len());
    }
    assert_eq!(seen, [1, 0, 1, 0, 1, 0]);
}

// ============================================================================
// 3. Display
// ============================================================================

#[test]
fn connected_oscillator_publishes_to_display() {
    let mut graph = Graph::with_config(GraphConfig::default().with_block_size(32));
    let osc = graph.create_node(Oscillator::default());
    let gain = graph.create_node(Gain);
    graph.connect(osc, "out", gain, "in").unwrap();
    graph.set_display_nodes([osc, gain]);

    graph.compute(&[gain], 0).unwrap();

    for &id in graph.display_nodes() {
        let node = graph.node(id).unwrap();
        let published = node
            .inputs()
            .iter()
            .chain(node.outputs())
            .filter_map(|pin| pin.display_flow())
            .count();
        assert_eq!(published, 1, "{}", node.kind_name());
    }
}
