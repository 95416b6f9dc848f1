use std::{
    collections::HashMap,
    sync::Arc,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

use core_types::Result;
use texkern_ops::{BoundParams, OpRegistry, ParamValue};

use crate::{Kernel, KernelAssembler, OperandShapes};

/// Hashable form of a parameter value; floats compare by bit pattern
#[derive(Clone, PartialEq, Eq, Hash)]
enum ParamKey {
    Int(i64),
    Float(u64),
    Bool(bool),
}

impl From<&ParamValue> for ParamKey {
    fn from(v: &ParamValue) -> Self {
        match *v {
            ParamValue::Int(i) => ParamKey::Int(i),
            ParamValue::Float(f) => ParamKey::Float(f.to_bits()),
            ParamValue::Bool(b) => ParamKey::Bool(b),
        }
    }
}

/// Signature of a compiled kernel: operator + parameter values + shapes
#[derive(Clone, PartialEq, Eq, Hash)]
struct KernelKey {
    op:     Arc<str>,
    params: Vec<(String, ParamKey)>,
    shapes: OperandShapes,
}

/// Memoizes assembled kernels; failed compiles are not cached.
pub struct KernelCache {
    cache: Mutex<HashMap<KernelKey, Arc<Kernel>>>,
}

impl Default for KernelCache {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelCache {
    pub fn new() -> Self {
        Self { cache: Mutex::new(HashMap::new()) }
    }

    #[tracing::instrument(skip(self, assembler, registry, params, shapes))]
    pub fn get_or_compile(
        &self,
        assembler: &KernelAssembler,
        registry: &OpRegistry,
        op: &str,
        params: &BoundParams,
        shapes: &OperandShapes,
    ) -> Result<Arc<Kernel>> {
        let key = KernelKey {
            op:     Arc::from(op),
            params: params.iter().map(|(k, v)| (k.to_string(), ParamKey::from(v))).collect(),
            shapes: shapes.clone(),
        };

        // cache lookup
        if let Some(k) = self.cache.lock().get(&key) {
            trace!("kernel cache hit");
            return Ok(k.clone());
        }

        // compile outside the lock, other ops keep being served meanwhile
        let kernel = Arc::new(assembler.assemble(registry.lookup(op)?, params, shapes)?);
        debug!(bytes = kernel.source.len(), "kernel compiled");

        // a racing compile of the same key produced identical text, keep the first
        let kernel = self.cache.lock().entry(key).or_insert(kernel).clone();
        Ok(kernel)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}
