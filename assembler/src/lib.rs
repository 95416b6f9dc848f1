mod config;
mod kernel_cache;

use std::collections::BTreeMap;

use tracing::debug;

use core_types::{CompileError, LayoutTable, Result, TensorShape, TextureLayout, layout_with};
use subroutines::{DependencyResolver, SubroutineRegistry};
use texkern_ops::{BodyContext, BoundParams, Op};

pub use config::{CompilerConfig, Precision};
pub use kernel_cache::KernelCache;


/// Logical shapes of one invocation: operands by name, plus the output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperandShapes {
    inputs: BTreeMap<String, TensorShape>,
    output: TensorShape,
}

impl OperandShapes {
    pub fn new(output: TensorShape) -> Self {
        Self { inputs: BTreeMap::new(), output }
    }

    pub fn input(mut self, name: &str, shape: TensorShape) -> Self {
        self.inputs.insert(name.to_string(), shape);
        self
    }

    pub fn get(&self, name: &str) -> Option<TensorShape> {
        self.inputs.get(name).copied()
    }

    pub fn output(&self) -> TensorShape {
        self.output
    }
}

/// Finished kernel handed to the execution side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    pub op: String,
    pub source: String,
    /// Operand names in binding-slot order
    pub inputs_name: Vec<String>,
    /// `(operand name, sampler uniform)` in the same order
    pub samplers: Vec<(String, String)>,
    pub output: TextureLayout,
}


/// Turns an operator plus bound parameters and shapes into one kernel source
pub struct KernelAssembler {
    config: CompilerConfig,
    subroutines: SubroutineRegistry,
}

impl KernelAssembler {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_subroutines(config, SubroutineRegistry::builtin())
    }

    pub fn with_subroutines(config: CompilerConfig, subroutines: SubroutineRegistry) -> Self {
        Self { config, subroutines }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    fn layout(&self, shape: TensorShape) -> Result<TextureLayout> {
        let layout = layout_with(shape, self.config.packing)?;
        let limit = self.config.max_texture_size;
        if layout.width > limit || layout.height > limit {
            return Err(CompileError::TextureTooLarge {
                width: layout.width,
                height: layout.height,
                limit,
            });
        }
        Ok(layout)
    }

    #[tracing::instrument(skip_all, fields(op = op.descriptor().name))]
    pub fn assemble(&self, op: &dyn Op, params: &BoundParams, shapes: &OperandShapes) -> Result<Kernel> {
        let desc = op.descriptor();

        // 1) every declared parameter is folded into the text
        if let Some(missing) = desc.params.iter().find(|p| !params.contains(p)) {
            return Err(CompileError::render(
                desc.name,
                format!("missing parameter `{missing}`"),
            ));
        }

        // 2) layouts for the output and every bound operand
        let mut layouts = LayoutTable::new(self.layout(shapes.output())?);
        for operand in &desc.inputs {
            let shape = shapes.get(operand.name).ok_or_else(|| CompileError::MissingOperand {
                op: desc.name.to_string(),
                operand: operand.name.to_string(),
            })?;
            layouts = layouts.bind(operand.binding.clone(), self.layout(shape)?);
        }

        // 3) shared subroutines, dependencies first
        let resolver = DependencyResolver::new(&self.subroutines);
        let plan = resolver.resolve(desc)?;
        let fragments = resolver.render(&plan, &layouts)?;

        // 4) operator body
        let ctx = BodyContext::new(desc, &layouts, params)?;
        let body = op.render_body(&ctx)?;

        // 5) concatenate
        let precision = self.config.precision.qualifier();
        let mut source = format!(
            "#version {}\nprecision {precision} float;\nprecision {precision} int;\nprecision {precision} sampler2DArray;\n",
            self.config.glsl_version,
        );
        for fragment in &fragments {
            source.push('\n');
            source.push_str(&fragment.source);
            source.push('\n');
        }
        source.push('\n');
        source.push_str(&body);
        source.push('\n');

        debug!(fragments = fragments.len(), bytes = source.len(), "assembled kernel");

        Ok(Kernel {
            op: desc.name.to_string(),
            source,
            inputs_name: desc.inputs_name().into_iter().map(String::from).collect(),
            samplers: desc
                .inputs
                .iter()
                .map(|o| (o.name.to_string(), format!("texture_{}", o.binding)))
                .collect(),
            output: layouts.output,
        })
    }
}


/* ------------------------------------------------------------------------- */
/*                                  Tests                                    */
/* ------------------------------------------------------------------------- */
#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Packing;
    use texkern_ops::OpRegistry;

    fn div_shapes() -> OperandShapes {
        OperandShapes::new(TensorShape::new(1, 3, 4, 4))
            .input("X", TensorShape::new(1, 3, 4, 4))
            .input("Y", TensorShape::new(1, 1, 4, 4))
    }

    fn assemble_div(params: &BoundParams) -> Result<Kernel> {
        let reg = OpRegistry::global();
        let op = reg.lookup("elementwise_div")?;
        KernelAssembler::new(CompilerConfig::default()).assemble(op, params, &div_shapes())
    }

    #[test]
    fn div_kernel_is_complete() {
        let kernel = assemble_div(&BoundParams::new().with("axis", 1)).unwrap();
        let src = &kernel.source;

        assert!(src.starts_with("#version 300 es\nprecision highp float;"));
        assert_eq!(kernel.inputs_name, vec!["X", "Y"]);
        assert_eq!(
            kernel.samplers,
            vec![
                ("X".to_string(), "texture_origin".to_string()),
                ("Y".to_string(), "texture_counter".to_string()),
            ]
        );

        // every helper is defined before main uses it
        let main_at = src.find("void main()").unwrap();
        for ident in [
            "ivec4 transferFromNHWCtoNCHW(",
            "ivec4 getOutputTensorPos(",
            "void setOutput(",
            "ivec4 formatNCHW_counter(",
            "float getValueFromTensorPos_counter(",
            "float getValueFromTensorPos_origin(",
        ] {
            let at = src.find(ident).unwrap_or_else(|| panic!("{ident} missing in\n{src}"));
            assert!(at < main_at);
        }
        assert!(src.find("transferFromNHWCtoNCHW(").unwrap() < src.find("ivec4 getOutputTensorPos(").unwrap());
        assert!(src.find("uniform sampler2DArray texture_counter;").unwrap()
            < src.find("float getValueFromTensorPos_counter(").unwrap());
        assert_eq!(src.matches("float getValueFromTensorPos_origin(").count(), 1);
        assert!(src.contains("getValueFromTensorPos_counter(0, oPos.g, oPos.b, oPos.a)"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let params = BoundParams::new().with("axis", 2);
        let a = assemble_div(&params).unwrap();
        let b = assemble_div(&params).unwrap();
        assert_eq!(a.source, b.source);

        let c = assemble_div(&BoundParams::new().with("axis", 3)).unwrap();
        assert_ne!(a.source, c.source);

        // axes that only clamp still show up in the text
        let zero = assemble_div(&BoundParams::new().with("axis", 0)).unwrap();
        let last = assemble_div(&BoundParams::new().with("axis", -1)).unwrap();
        assert_ne!(zero.source, last.source);
        assert!(last.source.contains("const int AXIS = -1;"));
    }

    #[test]
    fn missing_parameter_is_a_render_error() {
        let err = assemble_div(&BoundParams::new()).unwrap_err();
        match err {
            CompileError::TemplateRender { template, reason } => {
                assert_eq!(template, "elementwise_div");
                assert!(reason.contains("axis"));
            }
            other => panic!("expected TemplateRender, got {other:?}"),
        }
    }

    #[test]
    fn missing_operand_shape_fails() {
        let reg = OpRegistry::global();
        let op = reg.lookup("elementwise_div").unwrap();
        let shapes = OperandShapes::new(TensorShape::new(1, 3, 4, 4)).input("X", TensorShape::new(1, 3, 4, 4));
        let err = KernelAssembler::new(CompilerConfig::default())
            .assemble(op, &BoundParams::new().with("axis", 0), &shapes)
            .unwrap_err();
        assert_eq!(err, CompileError::MissingOperand { op: "elementwise_div".into(), operand: "Y".into() });
    }

    #[test]
    fn invalid_shape_propagates() {
        let reg = OpRegistry::global();
        let op = reg.lookup("scale").unwrap();
        let shapes = OperandShapes::new(TensorShape::new(1, 1, 0, 4)).input("X", TensorShape::new(1, 1, 0, 4));
        let params = BoundParams::new().with("scale", 1.0).with("bias", 0.0).with("bias_after_scale", true);
        let err = KernelAssembler::new(CompilerConfig::default())
            .assemble(op, &params, &shapes)
            .unwrap_err();
        assert!(matches!(err, CompileError::InvalidShape { .. }));
    }

    #[test]
    fn oversized_texture_is_rejected() {
        let reg = OpRegistry::global();
        let op = reg.lookup("scale").unwrap();
        let shape = TensorShape::new(64, 1, 128, 4);
        let shapes = OperandShapes::new(shape).input("X", shape);
        let params = BoundParams::new().with("scale", 1.0).with("bias", 0.0).with("bias_after_scale", true);
        let err = KernelAssembler::new(CompilerConfig::default())
            .assemble(op, &params, &shapes)
            .unwrap_err();
        assert_eq!(err, CompileError::TextureTooLarge { width: 4, height: 8192, limit: 4096 });
    }

    #[test]
    fn packing_changes_sampler_type() {
        let reg = OpRegistry::global();
        let op = reg.lookup("split").unwrap();
        let shapes = OperandShapes::new(TensorShape::new(1, 2, 4, 4)).input("X", TensorShape::new(1, 6, 4, 4));
        let params = BoundParams::new().with("axis", 1).with("offset", 4);

        let plain = KernelAssembler::new(CompilerConfig::default())
            .assemble(op, &params, &shapes)
            .unwrap();
        assert!(plain.source.contains("uniform sampler2DArray texture_origin;"));
        assert!(plain.source.contains("uniform int u_out_layer;"));

        let config = CompilerConfig { packing: Packing::ChannelMajor, ..CompilerConfig::default() };
        let packed = KernelAssembler::new(config).assemble(op, &params, &shapes).unwrap();
        assert!(packed.source.contains("uniform sampler2D texture_origin;"));
        assert!(!packed.source.contains("u_out_layer"));
        assert_eq!(packed.output.width, 8);
    }
}
