use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, trace};

use core_types::template;
use core_types::{BindingKey, CompileError, LayoutTable, Result, SubroutineDemand, SubroutineRef, TextureLayout};

use crate::registry::SubroutineRegistry;

/// Deduplicated subroutine instances in emission order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedPlan {
    instances: Vec<SubroutineRef>,
}

impl ResolvedPlan {
    pub fn instances(&self) -> &[SubroutineRef] {
        &self.instances
    }

    /// Instances specialized for one binding
    pub fn instances_for<'a>(&'a self, key: &'a BindingKey) -> impl Iterator<Item = &'a SubroutineRef> + 'a {
        self.instances
            .iter()
            .filter(move |r| r.binding.as_ref() == Some(key))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// One rendered subroutine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub instance: SubroutineRef,
    pub ident: String,
    pub source: String,
}

#[derive(Serialize)]
struct FragmentContext<'a> {
    ident: &'a str,
    binding: Option<&'a BindingKey>,
    layout: &'a TextureLayout,
    sampler: &'static str,
    out: &'a TextureLayout,
}

/// Expands a descriptor's subroutine requests into ordered, specialized fragments
pub struct DependencyResolver<'r> {
    registry: &'r SubroutineRegistry,
}

struct Walk {
    visited: HashSet<SubroutineRef>,
    stack: Vec<SubroutineRef>,
    order: Vec<SubroutineRef>,
}

impl<'r> DependencyResolver<'r> {
    pub fn new(registry: &'r SubroutineRegistry) -> Self {
        Self { registry }
    }

    /// Post-order walk: dependencies land before their users, ties keep
    /// declaration order, and each `(name, binding)` pair appears once.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve<D: SubroutineDemand + ?Sized>(&self, demand: &D) -> Result<ResolvedPlan> {
        let mut walk = Walk {
            visited: HashSet::new(),
            stack: Vec::new(),
            order: Vec::new(),
        };
        for request in demand.subroutine_requests() {
            self.visit(request, &mut walk)?;
        }
        debug!(
            order = %walk.order.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", "),
            "resolved subroutines"
        );
        Ok(ResolvedPlan { instances: walk.order })
    }

    fn visit(&self, request: SubroutineRef, walk: &mut Walk) -> Result<()> {
        if walk.visited.contains(&request) {
            trace!(instance = %request, "already emitted");
            return Ok(());
        }
        if let Some(pos) = walk.stack.iter().position(|r| *r == request) {
            let mut path: Vec<String> = walk.stack[pos..].iter().map(|r| r.to_string()).collect();
            path.push(request.to_string());
            return Err(CompileError::SubroutineCycle { path: path.join(" -> ") });
        }

        let spec = self
            .registry
            .lookup_subroutine(&request.name, request.binding.as_ref())?;

        walk.stack.push(request.clone());
        for dep in &spec.deps {
            let dep_spec = self.registry.get(dep).ok_or_else(|| CompileError::UnknownSubroutine {
                name: dep.clone(),
            })?;
            let binding = if dep_spec.bound {
                Some(request.binding.clone().ok_or_else(|| CompileError::BindingMismatch {
                    name: dep.clone(),
                    reason: "needed by an unbound subroutine, no binding to inherit",
                })?)
            } else {
                None
            };
            self.visit(SubroutineRef { name: dep.clone(), binding }, walk)?;
        }
        walk.stack.pop();

        walk.visited.insert(request.clone());
        walk.order.push(request);
        Ok(())
    }

    /// Render every instance of `plan` against the layouts of this compile call.
    pub fn render(&self, plan: &ResolvedPlan, layouts: &LayoutTable) -> Result<Vec<Fragment>> {
        plan.instances
            .iter()
            .map(|instance| {
                let spec = self
                    .registry
                    .lookup_subroutine(&instance.name, instance.binding.as_ref())?;
                let layout = match &instance.binding {
                    Some(key) => layouts.get(key)?,
                    None => &layouts.output,
                };
                let ident = instance.ident();
                let source = template::render(
                    &ident,
                    &spec.template,
                    FragmentContext {
                        ident: &ident,
                        binding: instance.binding.as_ref(),
                        layout,
                        sampler: layout.sampler_type(),
                        out: &layouts.output,
                    },
                )?;
                Ok(Fragment {
                    instance: instance.clone(),
                    ident,
                    source,
                })
            })
            .collect()
    }
}
