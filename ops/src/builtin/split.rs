use serde::Serialize;

use core_types::{BindingKey, CompileError, Result, SubroutineRef, template};
use subroutines::names;

use crate::op::Op;
use crate::register_op;
use crate::types::{BodyContext, OpDescriptor, Operand, RegistrationInfo};

const LANES: [&str; 4] = ["r", "g", "b", "a"];

/// One output slice of `split`: copies `X` starting at `offset` along `axis`.
pub struct SplitOp {
    desc: OpDescriptor,
}

#[derive(Serialize)]
struct SplitContext<'a, 'c> {
    #[serde(flatten)]
    base: &'a BodyContext<'c>,
    lane: &'static str,
}

impl SplitOp {
    pub fn new() -> Self {
        Self {
            desc: OpDescriptor {
                name: Self::NAME,
                inputs: vec![Operand::new("X", "origin")],
                params: vec!["axis", "offset"],
                deps: vec![
                    SubroutineRef::unbound(names::TRANSFER_NHWC_TO_NCHW),
                    SubroutineRef::unbound(names::OUTPUT_TENSOR_POS),
                    SubroutineRef::bound(names::VALUE_FROM_TENSOR_POS, "origin"),
                    SubroutineRef::unbound(names::SET_OUTPUT),
                ],
                texture_func_conf: Vec::new(),
                behaviors: Vec::new(),
            },
        }
    }
}

impl Default for SplitOp {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationInfo for SplitOp {
    const NAME: &'static str = "split";
}

impl Op for SplitOp {
    fn descriptor(&self) -> &OpDescriptor { &self.desc }

    fn body_template(&self) -> &'static str {
        include_str!("../../templates/split.glsl")
    }

    fn render_body(&self, ctx: &BodyContext<'_>) -> Result<String> {
        let raw_axis = ctx.params.int(Self::NAME, "axis")?;
        let offset = ctx.params.int(Self::NAME, "offset")?;
        if !(-4..4).contains(&raw_axis) {
            return Err(CompileError::render(
                Self::NAME,
                format!("axis {raw_axis} is outside [-4, 4)"),
            ));
        }
        let axis = raw_axis.rem_euclid(4) as usize;

        let input = ctx.input(&BindingKey::from("origin"))?;
        let (in_dims, out_dims) = (input.shape.dims(), ctx.output.shape.dims());
        if (0..4).any(|d| d != axis && in_dims[d] != out_dims[d]) {
            return Err(CompileError::InvalidShape {
                dims: out_dims.iter().map(|&d| d as usize).collect(),
                reason: "split output differs from its input outside the split axis",
            });
        }

        let in_extent = i64::from(in_dims[axis]);
        let out_extent = i64::from(out_dims[axis]);
        let past_end = offset.checked_add(out_extent).is_none_or(|end| end > in_extent);
        if offset < 0 || past_end {
            return Err(CompileError::render(
                Self::NAME,
                format!("slice of {out_extent} at offset {offset} exceeds input extent {in_extent} on axis {axis}"),
            ));
        }

        template::render(
            Self::NAME,
            self.body_template(),
            SplitContext { base: ctx, lane: LANES[axis] },
        )
    }
}

register_op!(SplitOp);
