pub mod elementwise;
pub mod scale;
pub mod split;

pub use elementwise::ElementwiseOp;
pub use scale::ScaleOp;
pub use split::SplitOp;
