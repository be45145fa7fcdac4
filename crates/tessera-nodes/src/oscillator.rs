//! Sine oscillator.
//!
//! Fills one block of samples per tick on its flow output. Phase carries
//! over between ticks, so consecutive blocks join without a discontinuity
//! as long as frequency is steady.
//!
//! ```text
//! out[n] = amplitude × sin(2π × phase[n]),  phase[n + 1] = frac(phase[n] + f / sr)
//! ```

use core::f32::consts::TAU;

use libm::sinf;
use tessera_core::{
    ComputeContext, Decorator, DecoratorKind, DisplayFormat, FlowData, FlowKind, GraphConfig,
    GraphError, Node, NodeBehavior, Parameter, ParameterAttributes, ParameterValue, PinRef,
    SampleType, UiHint, node_kind,
};

/// Default frequency in Hz.
pub const DEFAULT_FREQUENCY: f32 = 440.0;
/// Default amplitude.
pub const DEFAULT_AMPLITUDE: f32 = 0.5;

/// Phase-continuous sine generator.
///
/// ## Parameters
///
/// | Index | Name | Range | Default |
/// |-------|------|-------|---------|
/// | 0 | `frequency` | 20–20000 Hz, taper 2 | 440.0 Hz |
/// | 1 | `amplitude` | 0–1 | 0.5 |
///
/// Output 0 is `out`: audio, F32, one channel (id 0), `block_size` samples.
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phase: f32,
}

node_kind!(Oscillator, "oscillator", "Oscillator");

impl Oscillator {
    /// Current phase in cycles, `0.0..1.0`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Write `out.len()` samples and advance the phase.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, amplitude: f32, sample_rate: f32) {
        let increment = frequency / sample_rate;
        for sample in out {
            *sample = amplitude * sinf(TAU * self.phase);
            self.phase += increment;
            self.phase -= libm::floorf(self.phase);
        }
    }
}

impl NodeBehavior for Oscillator {
    fn declare(&mut self, node: &mut Node, config: &GraphConfig) {
        let frequency = ParameterAttributes::for_value(&ParameterValue::Float(DEFAULT_FREQUENCY))
            .with_range(20.0f32, 20000.0f32)
            .with_origin(20.0f32)
            .with_taper(2.0)
            .with_unit("Hz")
            .with_format(DisplayFormat::Decimal(1))
            .with_ui_hint(UiHint::Knob);
        node.add_input("frequency", Parameter::new(DEFAULT_FREQUENCY).with_attributes(frequency));

        let amplitude = ParameterAttributes::for_value(&ParameterValue::Float(DEFAULT_AMPLITUDE))
            .with_format(DisplayFormat::Percent)
            .with_ui_hint(UiHint::Slider);
        node.add_input("amplitude", Parameter::new(DEFAULT_AMPLITUDE).with_attributes(amplitude));

        let out = node.add_flow_output(
            "out",
            FlowData::with_layout(FlowKind::Audio, SampleType::F32, [0], config.block_size),
        );
        let scope = PinRef::output(node.id(), out);
        node.add_decorator(Decorator::bound(DecoratorKind::Scope, scope, "waveform"));
    }

    fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
        let frequency: f32 = ctx.input(0)?;
        let amplitude: f32 = ctx.input(1)?;
        let block_size = ctx.config().block_size;
        let sample_rate = ctx.config().sample_rate;

        let mut block = vec![0.0; block_size];
        self.render(&mut block, frequency, amplitude, sample_rate);

        let out = ctx.output_flow(0)?;
        let mut data = out.write();
        if data.num_samples() != block_size {
            data.set_num_samples(block_size);
        }
        data.write_samples(0, &block);
        Ok(())
    }
}
