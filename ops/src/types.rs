use std::collections::BTreeMap;

use derive_more::From;
use serde::Serialize;

use core_types::{
    BindingKey, BroadcastAxis, CompileError, LayoutTable, Result, SubroutineDemand, SubroutineRef,
    TextureLayout,
};

/// One logical operand: its public name (`X`) and the binding its
/// subroutines are specialized for (`origin`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub name: &'static str,
    pub binding: BindingKey,
}

impl Operand {
    pub fn new(name: &'static str, binding: &str) -> Self {
        Self { name, binding: BindingKey::from(binding) }
    }
}

/// Addressing strategies an operator can opt into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    /// Read the `counter` operand through the broadcaster, driven by the
    /// integer `axis` parameter.
    ProcessAxis,
}

/// The full declarative description of an operation:
/// - `name`
/// - ordered operands and their bindings
/// - template parameters required at bind time
/// - operator-wide subroutines and the per-binding `texture_func_conf`
/// - addressing behaviors
#[derive(Debug, Clone)]
pub struct OpDescriptor {
    pub name: &'static str,
    pub inputs: Vec<Operand>,
    pub params: Vec<&'static str>,
    pub deps: Vec<SubroutineRef>,
    pub texture_func_conf: Vec<(BindingKey, Vec<&'static str>)>,
    pub behaviors: Vec<Behavior>,
}

impl OpDescriptor {
    /// Operand names in binding-slot order
    pub fn inputs_name(&self) -> Vec<&'static str> {
        self.inputs.iter().map(|o| o.name).collect()
    }

    pub fn has_behavior(&self, behavior: Behavior) -> bool {
        self.behaviors.contains(&behavior)
    }
}

impl SubroutineDemand for OpDescriptor {
    fn subroutine_requests(&self) -> Vec<SubroutineRef> {
        let per_binding = self.texture_func_conf.iter().flat_map(|(key, funcs)| {
            funcs
                .iter()
                .map(move |f| SubroutineRef::bound(*f, key.clone()))
        });
        self.deps.iter().cloned().chain(per_binding).collect()
    }
}

/// Scalar value folded into the kernel text
#[derive(Debug, Clone, Copy, PartialEq, From, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

// integer literals default to i32
impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            ParamValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

/// Parameter values of one invocation, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BoundParams(BTreeMap<String, ParamValue>);

impl BoundParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Integer parameter, with the operator named in the error
    pub fn int(&self, op: &str, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(other) => Err(CompileError::render(
                op,
                format!("parameter `{name}` must be an integer, got {other:?}"),
            )),
            None => Err(CompileError::render(op, format!("missing parameter `{name}`"))),
        }
    }
}

/// Everything a body template may interpolate
#[derive(Debug, Clone, Serialize)]
pub struct BodyContext<'a> {
    pub op: &'a str,
    pub inputs: &'a BTreeMap<BindingKey, TextureLayout>,
    pub output: &'a TextureLayout,
    pub params: &'a BoundParams,
    /// Argument list reading the broadcast operand, set for [`Behavior::ProcessAxis`]
    pub broadcast_args: Option<String>,
}

impl<'a> BodyContext<'a> {
    pub fn new(desc: &'a OpDescriptor, layouts: &'a LayoutTable, params: &'a BoundParams) -> Result<Self> {
        let mut broadcast_args = None;
        for behavior in &desc.behaviors {
            match behavior {
                Behavior::ProcessAxis => {
                    let axis = BroadcastAxis::from_param(params.int(desc.name, "axis")?);
                    broadcast_args = Some(axis.read_args("oPos"));
                }
            }
        }
        Ok(Self {
            op: desc.name,
            inputs: &layouts.inputs,
            output: &layouts.output,
            params,
            broadcast_args,
        })
    }

    pub fn input(&self, key: &BindingKey) -> Result<&'a TextureLayout> {
        self.inputs.get(key).ok_or_else(|| CompileError::UnboundOperand {
            binding: key.to_string(),
        })
    }
}

/// Trait to implement for each Op to work with inventory
pub trait RegistrationInfo {
    /// Unique name for the operation
    const NAME: &'static str;
}
