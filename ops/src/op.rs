use core_types::{Result, template};

use crate::types::{BodyContext, OpDescriptor};


/// Trait to implement for each Op
pub trait Op: Send + Sync {
    /// Full declarative description
    fn descriptor(&self) -> &OpDescriptor;

    /// GLSL template of the kernel's `main`
    fn body_template(&self) -> &'static str;

    /// Render the body for one bound invocation
    fn render_body(&self, ctx: &BodyContext<'_>) -> Result<String> {
        template::render(self.descriptor().name, self.body_template(), ctx)
    }
}


/// Wrapper for op factory functions
pub struct OpFactory {
    pub name: &'static str,
    pub factory: fn() -> Box<dyn Op>,
}

// Collect all registered ops
inventory::collect!(OpFactory);
