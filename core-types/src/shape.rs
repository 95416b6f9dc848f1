use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// Logical NCHW shape of a texture-backed tensor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TensorShape {
    pub n: u32,
    pub c: u32,
    pub h: u32,
    pub w: u32,
}

impl TensorShape {
    pub const fn new(n: u32, c: u32, h: u32, w: u32) -> Self {
        Self { n, c, h, w }
    }

    /// Placeholder shape used for scalar operands
    pub const fn scalar() -> Self {
        Self::new(1, 1, 1, 1)
    }

    /// Build a shape from 1..=4 dims, left-padding missing leading dims with 1.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() || dims.len() > 4 {
            return Err(CompileError::InvalidShape {
                dims: dims.to_vec(),
                reason: "expected between 1 and 4 dimensions",
            });
        }
        let mut padded = [1u32; 4];
        let start = 4 - dims.len();
        for (i, &d) in dims.iter().enumerate() {
            padded[start + i] = u32::try_from(d).map_err(|_| CompileError::InvalidShape {
                dims: dims.to_vec(),
                reason: "dimension does not fit in 32 bits",
            })?;
        }
        Ok(Self::new(padded[0], padded[1], padded[2], padded[3]))
    }

    pub fn dims(&self) -> [u32; 4] {
        [self.n, self.c, self.h, self.w]
    }

    pub fn numel(&self) -> u64 {
        self.dims().iter().map(|&d| d as u64).product()
    }

    fn validate(&self) -> Result<()> {
        if self.dims().iter().any(|&d| d < 1) {
            return Err(CompileError::InvalidShape {
                dims: self.dims().iter().map(|&d| d as usize).collect(),
                reason: "every dimension must be at least 1",
            });
        }
        Ok(())
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.n, self.c, self.h, self.w)
    }
}

/// How the logical dims are laid out on the 2D texture
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Packing {
    /// `W x (H*N)` texels, one array layer per channel
    #[default]
    Plain,
    /// `(W*C) x (H*N)` texels, channels side by side in a single layer
    ChannelMajor,
}

/// Physical texture view of a [`TensorShape`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TextureLayout {
    pub shape: TensorShape,
    pub packing: Packing,
    pub width: u32,
    pub height: u32,
    pub layers: u32,
    /// Logical batch rows stacked vertically, always `height / shape.h`
    pub pack_ratio: u32,
}

impl TextureLayout {
    /// GLSL sampler type able to fetch from this layout.
    pub fn sampler_type(&self) -> &'static str {
        match self.packing {
            Packing::Plain => "sampler2DArray",
            Packing::ChannelMajor => "sampler2D",
        }
    }
}

/// Texture layout of `shape` under the default [`Packing::Plain`] scheme.
pub fn layout_of(shape: TensorShape) -> Result<TextureLayout> {
    layout_with(shape, Packing::Plain)
}

pub fn layout_with(shape: TensorShape, packing: Packing) -> Result<TextureLayout> {
    shape.validate()?;

    let overflow = || CompileError::InvalidShape {
        dims: shape.dims().iter().map(|&d| d as usize).collect(),
        reason: "texture extent overflows 32 bits",
    };

    let height = shape.h.checked_mul(shape.n).ok_or_else(overflow)?;
    let (width, layers) = match packing {
        Packing::Plain => (shape.w, shape.c),
        Packing::ChannelMajor => (shape.w.checked_mul(shape.c).ok_or_else(overflow)?, 1),
    };

    Ok(TextureLayout {
        shape,
        packing,
        width,
        height,
        layers,
        pack_ratio: height / shape.h,
    })
}
