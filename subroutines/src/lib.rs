//! Shared GLSL addressing subroutines and the resolver that specializes them
//! per tensor binding.

pub mod registry;
pub mod resolver;
pub mod spec;

pub use registry::{SubroutineRegistry, names};
pub use resolver::{DependencyResolver, Fragment, ResolvedPlan};
pub use spec::SubroutineSpec;
