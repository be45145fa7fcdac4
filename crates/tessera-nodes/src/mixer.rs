//! Two-input flow mixer.
//!
//! The output carries the union of both inputs' channel ids. A channel
//! present on only one input passes through; channels present on both are
//! summed sample by sample. Inputs of different lengths are zero-extended to
//! the longer one.

use std::collections::BTreeSet;

use tessera_core::{
    ComputeContext, FlowData, FlowKind, GraphConfig, GraphError, Node, NodeBehavior, SampleType,
    node_kind,
};

/// Sums flow inputs `a` and `b` into F32 output `out`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mixer;

node_kind!(Mixer, "mixer", "Mixer");

impl NodeBehavior for Mixer {
    fn declare(&mut self, node: &mut Node, config: &GraphConfig) {
        node.add_flow_input("a", FlowData::new(FlowKind::Audio, SampleType::F32));
        node.add_flow_input("b", FlowData::new(FlowKind::Audio, SampleType::F32));
        node.add_flow_output(
            "out",
            FlowData::with_layout(FlowKind::Audio, SampleType::F32, [0], config.block_size),
        );
    }

    fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
        let a = ctx.input_flow(0)?;
        let b = ctx.input_flow(1)?;
        let out = ctx.output_flow(0)?;

        let (a, b) = (a.read(), b.read());
        let len = a.num_samples().max(b.num_samples());
        let ids: BTreeSet<u32> = a.channel_ids().chain(b.channel_ids()).collect();

        let mut out = out.write();
        let stale: Vec<u32> = out.channel_ids().filter(|id| !ids.contains(id)).collect();
        for id in stale {
            out.remove_channel(id);
        }
        if ids.is_empty() {
            return Ok(());
        }
        for &id in &ids {
            out.add_channel(id);
        }
        if out.num_samples() != len {
            #[cfg(feature = "tracing")]
            tracing::trace!("mixer: resizing output to {len} samples");
            out.set_num_samples(len);
        }

        for &id in &ids {
            let mut acc = vec![0.0f32; len];
            for input in [&*a, &*b] {
                if input.has_channel_id(id) {
                    for (sum, s) in acc.iter_mut().zip(input.read_samples::<f32>(id)) {
                        *sum += s;
                    }
                }
            }
            out.write_samples(id, &acc);
        }
        Ok(())
    }
}
