use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{CompileError, Result};
use crate::shape::TextureLayout;

/// Tensor role a shared subroutine is specialized for (`origin`, `counter`, ...)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BindingKey(String);

impl BindingKey {
    pub fn new(key: impl Into<String>) -> Self {
        BindingKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BindingKey {
    fn from(key: &str) -> Self {
        BindingKey::new(key)
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One requested subroutine instance; also the dedup key of the resolver.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubroutineRef {
    pub name: String,
    pub binding: Option<BindingKey>,
}

impl SubroutineRef {
    pub fn unbound(name: impl Into<String>) -> Self {
        Self { name: name.into(), binding: None }
    }

    pub fn bound(name: impl Into<String>, binding: impl Into<BindingKey>) -> Self {
        Self { name: name.into(), binding: Some(binding.into()) }
    }

    /// GLSL identifier of this instance
    pub fn ident(&self) -> String {
        match &self.binding {
            Some(key) => format!("{}_{}", self.name, key),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for SubroutineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some(key) => write!(f, "{}<{}>", self.name, key),
            None => f.write_str(&self.name),
        }
    }
}

/// Anything that declares which subroutines it needs, in declaration order.
pub trait SubroutineDemand {
    fn subroutine_requests(&self) -> Vec<SubroutineRef>;
}

impl SubroutineDemand for [SubroutineRef] {
    fn subroutine_requests(&self) -> Vec<SubroutineRef> {
        self.to_vec()
    }
}

impl SubroutineDemand for Vec<SubroutineRef> {
    fn subroutine_requests(&self) -> Vec<SubroutineRef> {
        self.clone()
    }
}

/// Layouts of the output and of every bound operand for one compile call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutTable {
    pub output: TextureLayout,
    pub inputs: BTreeMap<BindingKey, TextureLayout>,
}

impl LayoutTable {
    pub fn new(output: TextureLayout) -> Self {
        Self { output, inputs: BTreeMap::new() }
    }

    pub fn bind(mut self, key: impl Into<BindingKey>, layout: TextureLayout) -> Self {
        self.inputs.insert(key.into(), layout);
        self
    }

    pub fn get(&self, key: &BindingKey) -> Result<&TextureLayout> {
        self.inputs.get(key).ok_or_else(|| CompileError::UnboundOperand {
            binding: key.to_string(),
        })
    }
}
