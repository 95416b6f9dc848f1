use core_types::SubroutineRef;
use subroutines::names;

use crate::op::Op;
use crate::register_op;
use crate::types::{OpDescriptor, Operand, RegistrationInfo};


/// `scale * x + bias`, or `scale * (x + bias)` when `bias_after_scale` is false
pub struct ScaleOp {
    desc: OpDescriptor,
}

impl ScaleOp {
    pub fn new() -> Self {
        Self {
            desc: OpDescriptor {
                name: Self::NAME,
                inputs: vec![Operand::new("X", "origin")],
                params: vec!["scale", "bias", "bias_after_scale"],
                deps: vec![
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

impl Default for ScaleOp {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationInfo for ScaleOp {
    const NAME: &'static str = "scale";
}

impl Op for ScaleOp {
    fn descriptor(&self) -> &OpDescriptor { &self.desc }

    fn body_template(&self) -> &'static str {
        include_str!("../../templates/scale.glsl")
    }
}

register_op!(ScaleOp);
