//! Property-based tests for tessera-nodes.

use proptest::prelude::*;
use tessera_core::{Graph, GraphConfig, PinRef};
use tessera_nodes::{Gain, Oscillator};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any frequency and amplitude, the oscillator stays within
    /// `±amplitude` and keeps its phase in `0..1`.
    #[test]
    fn oscillator_bounded(
        frequency in 20.0f32..20000.0,
        amplitude in 0.0f32..=1.0,
        blocks in 1usize..8,
    ) {
        let mut osc = Oscillator::default();
        let mut out = vec![0.0f32; 64];
        for _ in 0..blocks {
            osc.render(&mut out, frequency, amplitude, 48000.0);
            for &s in &out {
                prop_assert!(s.is_finite() && s.abs() <= amplitude + 1e-6);
            }
            prop_assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    /// Gain output is the oscillator block scaled by the gain value.
    #[test]
    fn gain_is_linear(gain in 0.0f32..=2.0, frequency in 50.0f32..5000.0) {
        let mut graph = Graph::with_config(GraphConfig::default().with_block_size(48));
        let osc = graph.create_node(Oscillator::default());
        let stage = graph.create_node(Gain);
        graph.connect(osc, "out", stage, "in").unwrap();
        graph.set_pin_value(PinRef::input(osc, 0), frequency, true).unwrap();
        graph.set_pin_value(PinRef::input(stage, 1), gain, true).unwrap();
        graph.compute(&[stage], 0).unwrap();

        let read = |id| -> Vec<f32> {
            graph.pin_value(PinRef::output(id, 0)).unwrap().as_flow().unwrap().read().read_samples(0)
        };
        let input = read(osc);
        let output = read(stage);
        prop_assert_eq!(input.len(), output.len());
        for (i, o) in input.iter().zip(&output) {
            prop_assert!((i * gain - o).abs() <= 1e-6, "{} * {} != {}", i, gain, o);
        }
    }
}
