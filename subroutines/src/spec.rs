/// A named, reusable GLSL addressing function.
///
/// `template` is rendered once per instance with `ident`, `binding`,
/// `layout`, `sampler` and `out` in scope. A bound spec is specialized per
/// [`core_types::BindingKey`]; each of its bound `deps` inherits that key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineSpec {
    pub name: String,
    pub bound: bool,
    pub deps: Vec<String>,
    pub template: String,
}

impl SubroutineSpec {
    pub fn unbound(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: false,
            deps: Vec::new(),
            template: template.into(),
        }
    }

    pub fn bound(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            bound: true,
            ..Self::unbound(name, template)
        }
    }

    pub fn with_deps(mut self, deps: &[&str]) -> Self {
        self.deps = deps.iter().map(|d| d.to_string()).collect();
        self
    }
}
