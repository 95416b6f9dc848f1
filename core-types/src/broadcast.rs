use crate::error::{CompileError, Result};
use crate::shape::TensorShape;

/// Logical NCHW coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord4 {
    pub n: u32,
    pub c: u32,
    pub h: u32,
    pub w: u32,
}

impl Coord4 {
    pub const fn new(n: u32, c: u32, h: u32, w: u32) -> Self {
        Self { n, c, h, w }
    }

    /// Rejects negative components; those only come from a caller bug.
    pub fn try_from_signed(coord: [i64; 4]) -> Result<Self> {
        let conv = |v: i64| {
            u32::try_from(v).map_err(|_| {
                CompileError::PreconditionViolated(format!(
                    "coordinate {coord:?} is outside the addressable range"
                ))
            })
        };
        Ok(Self::new(conv(coord[0])?, conv(coord[1])?, conv(coord[2])?, conv(coord[3])?))
    }
}

/// Dimension at which a smaller operand starts lining up with the output.
///
/// Every dimension in front of it is read at index 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BroadcastAxis {
    /// Independent per-dimension clamp
    #[default]
    None,
    /// `axis = 1`: reads `(0, c, h, w)`
    Channel,
    /// `axis = 2`: reads `(0, 0, h, w)`
    Height,
    /// `axis = 3`: reads `(0, 0, 0, w)`
    Width,
}

impl BroadcastAxis {
    pub fn from_param(axis: i64) -> Self {
        match axis {
            1 => BroadcastAxis::Channel,
            2 => BroadcastAxis::Height,
            3 => BroadcastAxis::Width,
            _ => BroadcastAxis::None,
        }
    }

    /// Number of leading NCHW dims forced to zero
    fn forced(self) -> usize {
        match self {
            BroadcastAxis::None => 0,
            BroadcastAxis::Channel => 1,
            BroadcastAxis::Height => 2,
            BroadcastAxis::Width => 3,
        }
    }

    /// GLSL argument list reading `var` (an `ivec4`) with forced dims zeroed.
    pub fn read_args(self, var: &str) -> String {
        ["r", "g", "b", "a"]
            .iter()
            .enumerate()
            .map(|(i, lane)| {
                if i < self.forced() {
                    "0".to_string()
                } else {
                    format!("{var}.{lane}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Coordinate to read from an operand of shape `target` for output position `out`.
pub fn broadcast(out: Coord4, target: &TensorShape, axis: BroadcastAxis) -> Coord4 {
    // N extent is the texture pack ratio, which equals the logical batch
    let extents = target.dims();
    let mut coord = [out.n, out.c, out.h, out.w];
    for (i, value) in coord.iter_mut().enumerate() {
        if i < axis.forced() {
            *value = 0;
        } else if *value >= extents[i] {
            *value = extents[i].saturating_sub(1);
        }
    }
    Coord4::new(coord[0], coord[1], coord[2], coord[3])
}
