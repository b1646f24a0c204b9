//! Symbolic entity keys.
//!
//! Every topological entity of the fractured cube is named by a structured
//! key instead of a hardcoded integer tag. The builder maps keys to
//! kernel-assigned tags at emission time, so the schema is unit-testable
//! without a kernel.
//!
//! Axis conventions (matching the physical sample):
//! - x spans `[-L/2, +L/2]` between the [`SideX::Left`] and [`SideX::Right`]
//!   lateral faces;
//! - y spans `[-H/2, +H/2]` between the [`EndY::Back`] and [`EndY::Front`]
//!   end faces; the fracture band crosses the domain near `y = 0`;
//! - z spans `[z_bot, z_top]` between the [`Cap::Bottom`] and [`Cap::Top`]
//!   caps.

/// Z level: bottom (`z_bot`) or top (`z_top`) of the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cap {
    /// `z = z_bot`.
    Bottom,
    /// `z = z_top`.
    Top,
}

/// Lateral face: `x = -L/2` (left) or `x = +L/2` (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SideX {
    /// `x = -L/2`.
    Left,
    /// `x = +L/2`.
    Right,
}

/// End face: `y = +H/2` (front) or `y = -H/2` (back).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EndY {
    /// `y = +H/2`; the matrix block on this side is `MATRIX_TOP`.
    Front,
    /// `y = -H/2`; the matrix block on this side is `MATRIX_BOTTOM`.
    Back,
}

/// The three band layers, ordered along +y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Lower band boundary, `y = ±dy - r_b`.
    Minus,
    /// Fracture mid-plane, `y = ±dy`.
    Mid,
    /// Upper band boundary, `y = ±dy + r_b`.
    Plus,
}

impl Layer {
    /// All layers, lower to upper.
    pub const ALL: [Layer; 3] = [Layer::Minus, Layer::Mid, Layer::Plus];
}

/// The four y-strips a cut face (or y-parallel cuboid edge) is split into
/// by the three band layers, front to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strip {
    /// Front corner down to the plus layer (matrix side).
    Front,
    /// Plus layer to mid-plane (upper band half).
    Upper,
    /// Mid-plane to minus layer (lower band half).
    Lower,
    /// Minus layer to the back corner (matrix side).
    Back,
}

impl Strip {
    /// All strips, front to back.
    pub const ALL: [Strip; 4] = [Strip::Front, Strip::Upper, Strip::Lower, Strip::Back];
}

/// Position of a rim edge on an end face's perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RimPos {
    /// `z = z_bot` edge.
    Bottom,
    /// `x = -L/2` edge.
    Left,
    /// `z = z_top` edge.
    Top,
    /// `x = +L/2` edge.
    Right,
}

/// Corner of the cuboid in the x-y plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CornerXY {
    /// `(-L/2, +H/2)`.
    FrontLeft,
    /// `(+L/2, +H/2)`.
    FrontRight,
    /// `(+L/2, -H/2)`.
    BackRight,
    /// `(-L/2, -H/2)`.
    BackLeft,
}

impl CornerXY {
    /// All corners, front-left first, then clockwise viewed from +z.
    pub const ALL: [CornerXY; 4] = [
        CornerXY::FrontLeft,
        CornerXY::FrontRight,
        CornerXY::BackRight,
        CornerXY::BackLeft,
    ];
}

/// The four cuboid faces that are split into panels by the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CutFace {
    /// `x = -L/2`.
    Left,
    /// `x = +L/2`.
    Right,
    /// `z = z_top`.
    Top,
    /// `z = z_bot`.
    Bottom,
}

impl CutFace {
    /// All cut faces.
    pub const ALL: [CutFace; 4] = [CutFace::Left, CutFace::Right, CutFace::Top, CutFace::Bottom];
}

/// Half of the fracture band, split at the mid-plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Half {
    /// Between the plus layer and the mid-plane.
    Upper,
    /// Between the mid-plane and the minus layer.
    Lower,
}

/// Symbolic name of one of the 21 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKey {
    /// One of the 8 cuboid corners.
    Corner {
        /// Corner in the x-y plane.
        xy: CornerXY,
        /// Z level.
        cap: Cap,
    },
    /// One of the 12 band-layer points on the lateral faces.
    Band {
        /// Lateral face.
        side: SideX,
        /// Band layer.
        layer: Layer,
        /// Z level.
        cap: Cap,
    },
    /// The domain-center point.
    Center,
}

/// Symbolic name of one of the 36 edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKey {
    /// Perimeter edge of an end face (8).
    Rim {
        /// Which end face.
        end: EndY,
        /// Position on the perimeter.
        at: RimPos,
    },
    /// Segment of a y-parallel cuboid edge, split by the band stations (16).
    Column {
        /// Lateral face the column belongs to.
        side: SideX,
        /// Z level of the column.
        cap: Cap,
        /// Which of the four segments.
        strip: Strip,
    },
    /// Band-layer line on a z cap, running along x (6).
    Trace {
        /// Band layer.
        layer: Layer,
        /// Z level.
        cap: Cap,
    },
    /// Band-layer line on a lateral face, running along z (6).
    Rail {
        /// Band layer.
        layer: Layer,
        /// Lateral face.
        side: SideX,
    },
}

/// Symbolic name of one of the 21 faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKey {
    /// Uncut end face at `y = ±H/2` (2).
    End(EndY),
    /// One of the 16 sub-panels of the four cut faces.
    Panel {
        /// Which cut face.
        face: CutFace,
        /// Which y-strip.
        strip: Strip,
    },
    /// Band cross-section at a layer (3), internal to the cuboid.
    Band(Layer),
}

/// Symbolic name of one of the 4 volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeKey {
    /// Matrix block on the given end side.
    Matrix(EndY),
    /// Half of the fracture band.
    BandHalf(Half),
}

/// A signed edge reference inside a face loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientedEdge {
    /// The referenced edge.
    pub key: EdgeKey,
    /// Whether the loop traverses the edge head-to-tail.
    pub reversed: bool,
}

impl OrientedEdge {
    /// Forward traversal.
    pub fn fwd(key: EdgeKey) -> Self {
        Self {
            key,
            reversed: false,
        }
    }

    /// Reversed traversal.
    pub fn rev(key: EdgeKey) -> Self {
        Self {
            key,
            reversed: true,
        }
    }
}
