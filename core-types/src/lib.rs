//! Shared vocabulary of the kernel compiler: tensor shapes and their texture
//! layouts, the coordinate broadcaster, binding keys and the error type.

pub mod binding;
pub mod broadcast;
pub mod error;
pub mod shape;
pub mod template;

pub use binding::{BindingKey, LayoutTable, SubroutineDemand, SubroutineRef};
pub use broadcast::{BroadcastAxis, Coord4, broadcast};
pub use error::{CompileError, Result};
pub use shape::{Packing, TensorShape, TextureLayout, layout_of, layout_with};
