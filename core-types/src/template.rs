use minijinja::{Environment, UndefinedBehavior};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{CompileError, Result};

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    // a missing parameter must fail rather than render as empty text
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("glsl_float", glsl_float);
    env
});

/// Format a number as a GLSL float literal (always carries a decimal point).
pub fn glsl_float(value: f64) -> String {
    let text = format!("{value:?}");
    if text.contains(['.', 'e', 'E']) || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// Render a kernel template against a typed context.
pub fn render<S: Serialize>(name: &str, source: &str, ctx: S) -> Result<String> {
    ENV.render_str(source, ctx)
        .map_err(|e| CompileError::render(name, e.to_string()))
}
