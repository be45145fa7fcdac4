//! Scalar adder.

use tessera_core::{ComputeContext, GraphConfig, GraphError, Node, NodeBehavior, Parameter, node_kind};

/// `sum = x + y` on float pins.
///
/// | Index | Input | Default |
/// |-------|-------|---------|
/// | 0 | `x` | 0.0 |
/// | 1 | `y` | 0.0 |
///
/// Output 0 is `sum`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

node_kind!(Sum, "sum", "Sum");

impl NodeBehavior for Sum {
    fn declare(&mut self, node: &mut Node, _config: &GraphConfig) {
        node.add_input("x", Parameter::new(0.0f32));
        node.add_input("y", Parameter::new(0.0f32));
        node.add_output("sum", Parameter::new(0.0f32));
    }

    fn compute(&mut self, ctx: &mut ComputeContext<'_>) -> Result<(), GraphError> {
        let sum = ctx.input::<f32>(0)? + ctx.input::<f32>(1)?;
        ctx.set_output(0, sum)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Graph, PinRef};

    #[test]
    fn adds_inputs() {
        let mut graph = Graph::new();
        let id = graph.create_node(Sum);
        graph.set_pin_value(PinRef::input(id, 0), 0.5f32, true).unwrap();
        graph.set_pin_value(PinRef::input(id, 1), 0.1f32, true).unwrap();
        graph.compute(&[id], 0).unwrap();

        let sum: f32 = graph.pin_get(PinRef::output(id, 0)).unwrap();
        assert!((sum - 0.6).abs() < 1e-6);
    }

    #[test]
    fn pin_names() {
        let mut graph = Graph::new();
        let id = graph.create_node(Sum);
        let node = graph.node(id).unwrap();
        let names: Vec<&str> = node.inputs().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(node.output(0).map(|p| p.name()), Some("sum"));
        assert_eq!(node.kind_name(), Sum::KIND);
    }
}
