use std::collections::HashMap;

use core_types::{BindingKey, CompileError, Result};

use crate::spec::SubroutineSpec;

/// Name of the builtin subroutines
pub mod names {
    pub const TRANSFER_NHWC_TO_NCHW: &str = "transferFromNHWCtoNCHW";
    pub const OUTPUT_TENSOR_POS: &str = "getOutputTensorPos";
    pub const SET_OUTPUT: &str = "setOutput";
    pub const TEXTURE_DECL: &str = "textureDecl";
    pub const TEXTURE_POS: &str = "getTexturePos";
    pub const VALUE_FROM_TENSOR_POS: &str = "getValueFromTensorPos";
    pub const FORMAT_NCHW: &str = "formatNCHW";
}

/// Holds every shared subroutine a descriptor may ask for
#[derive(Debug, Default, Clone)]
pub struct SubroutineRegistry {
    map: HashMap<String, SubroutineSpec>,
}

impl SubroutineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the texture addressing library.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        let specs = [
            SubroutineSpec::unbound(
                names::TRANSFER_NHWC_TO_NCHW,
                include_str!("../templates/transfer_nhwc_to_nchw.glsl"),
            ),
            SubroutineSpec::unbound(
                names::OUTPUT_TENSOR_POS,
                include_str!("../templates/output_tensor_pos.glsl"),
            )
            .with_deps(&[names::TRANSFER_NHWC_TO_NCHW]),
            SubroutineSpec::unbound(names::SET_OUTPUT, include_str!("../templates/set_output.glsl")),
            SubroutineSpec::bound(names::TEXTURE_DECL, include_str!("../templates/texture_decl.glsl")),
            SubroutineSpec::bound(names::TEXTURE_POS, include_str!("../templates/texture_pos.glsl")),
            SubroutineSpec::bound(
                names::VALUE_FROM_TENSOR_POS,
                include_str!("../templates/value_from_tensor_pos.glsl"),
            )
            .with_deps(&[names::TEXTURE_DECL, names::TEXTURE_POS]),
            SubroutineSpec::bound(names::FORMAT_NCHW, include_str!("../templates/format_nchw.glsl")),
        ];
        for spec in specs {
            // names above are distinct
            reg.map.insert(spec.name.clone(), spec);
        }
        reg
    }

    /// Register a new subroutine under its name
    pub fn register_subroutine(&mut self, spec: SubroutineSpec) -> Result<()> {
        if self.map.contains_key(&spec.name) {
            return Err(CompileError::DuplicateSubroutine(spec.name));
        }
        self.map.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Lookup + check that the binding matches how the spec is parameterized
    pub fn lookup_subroutine(&self, name: &str, binding: Option<&BindingKey>) -> Result<&SubroutineSpec> {
        let spec = self.map.get(name).ok_or_else(|| CompileError::UnknownSubroutine {
            name: name.to_string(),
        })?;
        match (spec.bound, binding) {
            (true, None) => Err(CompileError::BindingMismatch {
                name: name.to_string(),
                reason: "requires a tensor binding",
            }),
            (false, Some(_)) => Err(CompileError::BindingMismatch {
                name: name.to_string(),
                reason: "does not take a tensor binding",
            }),
            _ => Ok(spec),
        }
    }

    /// lookup without binding checks
    pub fn get(&self, name: &str) -> Option<&SubroutineSpec> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
