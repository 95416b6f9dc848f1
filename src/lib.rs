//! Compiles declarative operator descriptions into GLSL fragment kernels that
//! read texture-backed tensors and write a result texture.
//!
//! ```no_run
//! use texkern::{BoundParams, Compiler, OperandShapes, TensorShape};
//!
//! let compiler = Compiler::default();
//! let shapes = OperandShapes::new(TensorShape::new(1, 3, 4, 4))
//!     .input("X", TensorShape::new(1, 3, 4, 4))
//!     .input("Y", TensorShape::new(1, 1, 4, 4));
//! let kernel = compiler
//!     .compile("elementwise_div", &BoundParams::new().with("axis", 2), &shapes)
//!     .unwrap();
//! println!("{}", kernel.source);
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

pub use assembler::{CompilerConfig, Kernel, KernelAssembler, KernelCache, OperandShapes, Precision};
pub use core_types::{
    BindingKey, BroadcastAxis, CompileError, Coord4, LayoutTable, Packing, SubroutineRef, TensorShape,
    TextureLayout, broadcast, layout_of, layout_with,
};
pub use subroutines::{DependencyResolver, ResolvedPlan, SubroutineRegistry, SubroutineSpec};
pub use texkern_ops::{Behavior, BoundParams, Op, OpDescriptor, OpRegistry, ParamValue, register_op};

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Global operator registry + one assembler + a kernel cache
pub struct Compiler {
    assembler: KernelAssembler,
    cache: KernelCache,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            assembler: KernelAssembler::new(config),
            cache: KernelCache::new(),
        }
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self::new(CompilerConfig::load(path)?))
    }

    /// Compile (or fetch from cache) the kernel of a registered operator.
    pub fn compile(
        &self,
        op: &str,
        params: &BoundParams,
        shapes: &OperandShapes,
    ) -> Result<Arc<Kernel>, CompileError> {
        self.cache
            .get_or_compile(&self.assembler, OpRegistry::global(), op, params, shapes)
    }

    pub fn config(&self) -> &CompilerConfig {
        self.assembler.config()
    }

    pub fn cached_kernels(&self) -> usize {
        self.cache.len()
    }
}
