//! Flow gain stage.

use tessera_core::{
    ComputeContext, DisplayFormat, FlowData, FlowKind, GraphConfig, GraphError, Node, NodeBehavior,
    Parameter, ParameterAttributes, ParameterValue, SampleType, UiHint, node_kind,
};

/// Multiplies every channel of its flow input by `gain`.
///
/// | Index | Input | Type | Default |
/// |-------|-------|------|---------|
/// | 0 | `in` | flow | empty |
/// | 1 | `gain` | Float, 0–2 | 1.0 |
///
/// Output 0 (`out`) takes the input's channel layout and element type each
/// tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gain;

node_kind!(Gain, "gain", "Gain");

impl NodeBehavior for Gain {
    fn declare(&mut self, node: &mut Node, config: &GraphConfig) {
        node.add_flow_input("in", FlowData::new(FlowKind::Audio, SampleType::F32));
        let attributes = ParameterAttributes::for_value(&ParameterValue::Float(1.0))
            .with_range(0.0f32, 2.0f32)
            .with_format(DisplayFormat::Decimal(2))
            .with_ui_hint(UiHint::Knob);
        node.add_input("gain", Parameter::new(1.0f32).with_attributes(attributes));
        node.add_flow_output(
            "out",
            FlowData::with_layout(FlowKind::Audio, SampleType::F32, [0], config.block_size),
        );
    }

    fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
        let input = ctx.input_flow(0)?;
        let gain: f32 = ctx.input(1)?;
        let out = ctx.output_flow(0)?;

        let input = input.read();
        let mut out = out.write();
        out.match_channel_input(&input, false);
        for id in input.channel_ids() {
            let scaled: Vec<f32> = input.read_samples::<f32>(id).iter().map(|s| s * gain).collect();
            out.write_samples(id, &scaled);
        }
        Ok(())
    }
}
