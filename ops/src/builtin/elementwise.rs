use serde::Serialize;

use core_types::{BindingKey, CompileError, Result, SubroutineRef, template};
use subroutines::names;

use crate::op::Op;
use crate::register_op;
use crate::types::{Behavior, BodyContext, OpDescriptor, Operand};


/// Binary `X <op> Y`, reading `Y` through the broadcaster.
pub struct ElementwiseOp {
    desc: OpDescriptor,
    symbol: &'static str,
}

#[derive(Serialize)]
struct ElementwiseContext<'a, 'c> {
    #[serde(flatten)]
    base: &'a BodyContext<'c>,
    symbol: &'static str,
}

impl ElementwiseOp {
    fn with(name: &'static str, symbol: &'static str) -> Self {
        Self {
            desc: OpDescriptor {
                name,
                inputs: vec![Operand::new("X", "origin"), Operand::new("Y", "counter")],
                params: vec!["axis"],
                deps: vec![
                    SubroutineRef::unbound(names::OUTPUT_TENSOR_POS),
                    SubroutineRef::unbound(names::SET_OUTPUT),
                ],
                texture_func_conf: vec![
                    (BindingKey::from("counter"), vec![names::FORMAT_NCHW, names::VALUE_FROM_TENSOR_POS]),
                    (BindingKey::from("origin"), vec![names::VALUE_FROM_TENSOR_POS]),
                ],
                behaviors: vec![Behavior::ProcessAxis],
            },
            symbol,
        }
    }

    pub fn add() -> Self {
        Self::with("elementwise_add", "+")
    }

    pub fn sub() -> Self {
        Self::with("elementwise_sub", "-")
    }

    pub fn mul() -> Self {
        Self::with("elementwise_mul", "*")
    }

    pub fn div() -> Self {
        Self::with("elementwise_div", "/")
    }
}

impl Op for ElementwiseOp {
    fn descriptor(&self) -> &OpDescriptor { &self.desc }

    fn body_template(&self) -> &'static str {
        include_str!("../../templates/elementwise.glsl")
    }

    fn render_body(&self, ctx: &BodyContext<'_>) -> Result<String> {
        // X is read unclamped at the output position
        let origin = ctx.input(&BindingKey::from("origin"))?;
        if origin.shape != ctx.output.shape {
            return Err(CompileError::InvalidShape {
                dims: origin.shape.dims().iter().map(|&d| d as usize).collect(),
                reason: "elementwise operand X must match the output shape",
            });
        }

        template::render(
            self.desc.name,
            self.body_template(),
            ElementwiseContext { base: ctx, symbol: self.symbol },
        )
    }
}

register_op!("elementwise_add", ElementwiseOp::add);
register_op!("elementwise_sub", ElementwiseOp::sub);
register_op!("elementwise_mul", ElementwiseOp::mul);
register_op!("elementwise_div", ElementwiseOp::div);


#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundParams;
    use core_types::{LayoutTable, TensorShape, layout_of};

    fn table() -> LayoutTable {
        let x = layout_of(TensorShape::new(1, 3, 4, 4)).unwrap();
        let y = layout_of(TensorShape::new(1, 1, 4, 4)).unwrap();
        LayoutTable::new(x).bind("origin", x).bind("counter", y)
    }

    #[test]
    fn div_body_reads_counter_through_axis() {
        let op = ElementwiseOp::div();
        let layouts = table();
        let params = BoundParams::new().with("axis", 2);
        let ctx = BodyContext::new(op.descriptor(), &layouts, &params).unwrap();
        let body = op.render_body(&ctx).unwrap();
        assert!(body.contains("getValueFromTensorPos_counter(0, 0, oPos.b, oPos.a)"), "{body}");
        assert!(body.contains("float res = o / c;"));
    }

    #[test]
    fn symbols_differ_per_op() {
        let layouts = table();
        let params = BoundParams::new().with("axis", -1);
        for (op, sym) in [
            (ElementwiseOp::add(), "+"),
            (ElementwiseOp::sub(), "-"),
            (ElementwiseOp::mul(), "*"),
        ] {
            let ctx = BodyContext::new(op.descriptor(), &layouts, &params).unwrap();
            let body = op.render_body(&ctx).unwrap();
            assert!(body.contains(&format!("float res = o {sym} c;")));
            assert!(body.contains("getValueFromTensorPos_counter(oPos.r, oPos.g, oPos.b, oPos.a)"));
        }
    }

    #[test]
    fn axis_value_is_folded_into_the_body() {
        let op = ElementwiseOp::div();
        let layouts = table();
        let body = |axis: i64| {
            let params = BoundParams::new().with("axis", axis);
            let ctx = BodyContext::new(op.descriptor(), &layouts, &params).unwrap();
            op.render_body(&ctx).unwrap()
        };
        assert!(body(-1).contains("const int AXIS = -1;"));
        assert_ne!(body(0), body(-1));
        assert_ne!(body(0), body(7));
    }

    #[test]
    fn origin_must_match_output() {
        let op = ElementwiseOp::add();
        let x = layout_of(TensorShape::new(1, 3, 4, 4)).unwrap();
        let out = layout_of(TensorShape::new(1, 3, 8, 4)).unwrap();
        let layouts = LayoutTable::new(out).bind("origin", x).bind("counter", x);
        let params = BoundParams::new().with("axis", 1);
        let ctx = BodyContext::new(op.descriptor(), &layouts, &params).unwrap();
        let err = op.render_body(&ctx).unwrap_err();
        assert!(matches!(err, CompileError::InvalidShape { dims, .. } if dims == vec![1, 3, 4, 4]));
    }

    #[test]
    fn descriptor_exposes_operand_order() {
        assert_eq!(ElementwiseOp::div().descriptor().inputs_name(), vec!["X", "Y"]);
    }
}
