use thiserror::Error;

/// Errors raised while turning an operator description into kernel source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("invalid tensor shape {dims:?}: {reason}")]
    InvalidShape { dims: Vec<usize>, reason: &'static str },

    #[error("unknown subroutine `{name}`")]
    UnknownSubroutine { name: String },

    #[error("subroutine `{name}`: {reason}")]
    BindingMismatch { name: String, reason: &'static str },

    #[error("subroutine dependency cycle: {path}")]
    SubroutineCycle { path: String },

    #[error("subroutine `{0}` is already registered")]
    DuplicateSubroutine(String),

    #[error("operator `{0}` not found")]
    OperatorNotFound(String),

    #[error("operator `{0}` is already registered")]
    DuplicateOperator(String),

    #[error("failed to render `{template}`: {reason}")]
    TemplateRender { template: String, reason: String },

    #[error("operator `{op}` has no shape for operand `{operand}`")]
    MissingOperand { op: String, operand: String },

    #[error("no layout bound to `{binding}`")]
    UnboundOperand { binding: String },

    #[error("texture {width}x{height} exceeds the {limit} texel limit")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },

    #[error("precondition violated: {0}")]
    PreconditionViolated(String),
}

impl CompileError {
    pub fn render(template: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::TemplateRender {
            template: template.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
