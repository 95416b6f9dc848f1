pub mod op;
pub mod types;
pub mod builtin;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use core_types::{CompileError, Result};

pub use op::{Op, OpFactory};
pub use types::{Behavior, BodyContext, BoundParams, OpDescriptor, Operand, ParamValue, RegistrationInfo};

#[doc(hidden)]
pub use inventory;


/// Register an operation with the inventory system
#[macro_export]
macro_rules! register_op {
    ($op_type:ident) => {
        $crate::inventory::submit! {
            $crate::OpFactory {
                name: <$op_type as $crate::RegistrationInfo>::NAME,
                factory: || Box::new($op_type::new()),
            }
        }
    };
    ($name:literal, $ctor:path) => {
        $crate::inventory::submit! {
            $crate::OpFactory {
                name: $name,
                factory: || Box::new($ctor()),
            }
        }
    };
}


static GLOBAL: Lazy<OpRegistry> = Lazy::new(|| {
    let mut reg = OpRegistry::new();
    // inventory names are unique per crate, a clash is a build mistake
    if let Err(e) = reg.collect_inventory() {
        tracing::error!(error = %e, "duplicate operator in inventory");
    }
    reg
});


/// Holds all registered ops, append-only
#[derive(Default)]
pub struct OpRegistry {
    map: HashMap<&'static str, Box<dyn Op>>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// Process-wide registry holding every op submitted through `register_op!`.
    ///
    /// Populated once on first use and read-only afterwards.
    pub fn global() -> &'static OpRegistry {
        &GLOBAL
    }

    pub fn collect_inventory(&mut self) -> Result<()> {
        for factory in inventory::iter::<OpFactory> {
            let op = (factory.factory)();
            self.register_boxed(factory.name, op)?;
        }
        debug!(count = self.map.len(), "collected operators");
        Ok(())
    }

    /// Register a new Op under its descriptor name
    pub fn register<O: Op + 'static>(&mut self, op: O) -> Result<()> {
        let name = op.descriptor().name;
        self.register_boxed(name, Box::new(op))
    }

    /// Register a boxed Op with an explicit name
    pub fn register_boxed(&mut self, name: &'static str, op: Box<dyn Op>) -> Result<()> {
        if self.map.contains_key(name) {
            return Err(CompileError::DuplicateOperator(name.to_string()));
        }
        self.map.insert(name, op);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&dyn Op> {
        self.map
            .get(name)
            .map(|b| b.as_ref())
            .ok_or_else(|| CompileError::OperatorNotFound(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.map.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
