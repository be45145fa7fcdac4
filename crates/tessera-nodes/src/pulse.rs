//! Periodic trigger source.

use tessera_core::{
    ComputeContext, ControlEvent, DisplayFormat, GraphConfig, GraphError, Node, NodeBehavior,
    Parameter, ParameterAttributes, ParameterValue, UiHint, node_kind,
};

/// Event id carried by every trigger.
pub const TRIGGER_ID: u32 = 0;

/// Emits one control event on `trigger` every `interval` ticks.
///
/// The first evaluation always fires. After that a trigger fires once at
/// least `interval` ticks have passed since the previous one, so skipped
/// ticks do not produce bursts. Intervals below 1 count as 1.
///
/// Each event has offset 0, id [`TRIGGER_ID`] and the running trigger count
/// as its value. The event list is cleared at the start of every tick.
#[derive(Debug, Clone, Default)]
pub struct Pulse {
    last_fired: Option<u64>,
    fired: u32,
}

node_kind!(Pulse, "pulse", "Pulse");

impl Pulse {
    /// Triggers emitted so far.
    pub fn count(&self) -> u32 {
        self.fired
    }

    fn due(&self, tick: u64, interval: u64) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => tick.saturating_sub(last) >= interval,
        }
    }
}

impl NodeBehavior for Pulse {
    fn declare(&mut self, node: &mut Node, _config: &GraphConfig) {
        let attributes = ParameterAttributes::for_value(&ParameterValue::Int64(4))
            .with_range(1i64, 1024i64)
            .with_step(1i64)
            .with_format(DisplayFormat::Integer)
            .with_unit("ticks")
            .with_ui_hint(UiHint::Slider);
        node.add_input("interval", Parameter::new(4i64).with_attributes(attributes));
        node.add_control_output("trigger");
    }

    fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
        let interval = ctx.input::<i64>(0)?.max(1) as u64;
        let tick = ctx.tick();
        let out = ctx.output_control(0)?;
        let mut events = out.write();
        events.clear();

        if self.due(tick, interval) {
            self.fired += 1;
            self.last_fired = Some(tick);
            events.push(ControlEvent::new(0, TRIGGER_ID, self.fired as f32));
        }
        Ok(())
    }
}
