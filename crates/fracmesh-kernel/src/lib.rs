#![warn(missing_docs)]

//! Abstract geometry/meshing kernel interface for fracmesh.
//!
//! The mesh builder never talks to a concrete CAD kernel directly. It emits
//! an ordered sequence of calls against the [`GeoKernel`] trait, which covers
//! exactly the capability set the fracture-band topology needs: points,
//! lines, curve loops, plane surfaces, surface loops, volumes, transfinite /
//! recombine marks, synchronization, physical groups, mesh generation and
//! serialization.
//!
//! Two backends ship with this crate:
//!
//! - [`RecordingKernel`]: in-memory backend that assigns sequential tags,
//!   validates references and loop closure, and records every call. Used by
//!   tests and by `fracmesh inspect`.
//! - [`GeoScriptKernel`]: renders the call sequence as a gmsh `.geo` script
//!   so the external gmsh kernel can execute the build.

pub mod error;
pub mod recording;
pub mod script;
pub mod session;

pub use error::{KernelError, Result};
pub use recording::{FailOp, Op, RecordingKernel};
pub use script::GeoScriptKernel;
pub use session::Session;

use std::path::Path;

/// Dimension of a topological entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dim {
    /// 0-dimensional: points.
    Point,
    /// 1-dimensional: curves.
    Curve,
    /// 2-dimensional: surfaces.
    Surface,
    /// 3-dimensional: volumes.
    Volume,
}

impl Dim {
    /// All dimensions, ascending.
    pub const ALL: [Dim; 4] = [Dim::Point, Dim::Curve, Dim::Surface, Dim::Volume];

    /// Numeric dimension (0..=3), as consumed by kernel APIs.
    pub fn as_i32(self) -> i32 {
        match self {
            Dim::Point => 0,
            Dim::Curve => 1,
            Dim::Surface => 2,
            Dim::Volume => 3,
        }
    }
}

macro_rules! entity_tag {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub i32);
    };
}

entity_tag!(
    /// Kernel-assigned tag of a point.
    PointTag
);
entity_tag!(
    /// Kernel-assigned tag of a curve (line).
    CurveTag
);
entity_tag!(
    /// Kernel-assigned tag of a curve loop.
    LoopTag
);
entity_tag!(
    /// Kernel-assigned tag of a plane surface.
    SurfaceTag
);
entity_tag!(
    /// Kernel-assigned tag of a surface loop (shell).
    ShellTag
);
entity_tag!(
    /// Kernel-assigned tag of a volume.
    VolumeTag
);
entity_tag!(
    /// Kernel-assigned tag of a physical group.
    PhysicalTag
);

/// An oriented reference to a curve inside a curve loop.
///
/// Mirrors the signed-integer convention of gmsh: a reversed reference
/// traverses the curve from its end point back to its start point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedCurve {
    /// The referenced curve.
    pub tag: CurveTag,
    /// Whether the loop traverses the curve against its direction.
    pub reversed: bool,
}

impl SignedCurve {
    /// Reference traversing the curve in its own direction.
    pub fn forward(tag: CurveTag) -> Self {
        Self {
            tag,
            reversed: false,
        }
    }

    /// Reference traversing the curve backwards.
    pub fn reverse(tag: CurveTag) -> Self {
        Self {
            tag,
            reversed: true,
        }
    }

    /// Signed integer id (negative when reversed), the kernel wire form.
    pub fn signed_id(self) -> i32 {
        if self.reversed {
            -self.tag.0
        } else {
            self.tag.0
        }
    }
}

/// Capability set of the external geometry/meshing kernel.
///
/// Call order matters: entities must exist before they are referenced,
/// physical groups may only be attached after [`GeoKernel::synchronize`],
/// and [`GeoKernel::write`] is only meaningful after mesh generation.
/// The builder in `fracmesh-build` enforces that order.
pub trait GeoKernel {
    /// Set a numeric kernel option (e.g. `Mesh.RecombineAll`).
    fn set_number_option(&mut self, name: &str, value: f64) -> Result<()>;

    /// Name the active model.
    fn set_model_name(&mut self, name: &str) -> Result<()>;

    /// Create a point at `(x, y, z)` with a target mesh size.
    fn add_point(&mut self, x: f64, y: f64, z: f64, size: f64) -> Result<PointTag>;

    /// Create a straight line from `start` to `end`.
    fn add_line(&mut self, start: PointTag, end: PointTag) -> Result<CurveTag>;

    /// Create a closed, oriented loop of curves.
    fn add_curve_loop(&mut self, curves: &[SignedCurve]) -> Result<LoopTag>;

    /// Create a plane surface bounded by a curve loop.
    fn add_plane_surface(&mut self, boundary: LoopTag) -> Result<SurfaceTag>;

    /// Create a closed shell of surfaces.
    fn add_surface_loop(&mut self, faces: &[SurfaceTag]) -> Result<ShellTag>;

    /// Create a volume bounded by a surface loop.
    fn add_volume(&mut self, shell: ShellTag) -> Result<VolumeTag>;

    /// Mark a surface for transfinite (structured) meshing.
    fn set_transfinite_surface(&mut self, face: SurfaceTag) -> Result<()>;

    /// Mark a surface for triangle-pair recombination into quads.
    fn set_recombine_surface(&mut self, face: SurfaceTag) -> Result<()>;

    /// Mark a volume for transfinite (hexahedral) meshing.
    fn set_transfinite_volume(&mut self, vol: VolumeTag) -> Result<()>;

    /// Materialize the CAD description into queryable model topology.
    fn synchronize(&mut self) -> Result<()>;

    /// Attach a physical group over raw entity tags of dimension `dim`.
    fn add_physical_group(&mut self, dim: Dim, tags: &[i32]) -> Result<PhysicalTag>;

    /// Name a physical group.
    fn set_physical_name(&mut self, dim: Dim, group: PhysicalTag, name: &str) -> Result<()>;

    /// Generate the mesh up to dimension `dim`.
    fn generate(&mut self, dim: Dim) -> Result<()>;

    /// Serialize the model/mesh to `path`.
    fn write(&mut self, path: &Path) -> Result<()>;

    /// Tear down the kernel session. Further calls must be rejected.
    fn finalize(&mut self) -> Result<()>;
}

impl<K: GeoKernel + ?Sized> GeoKernel for &mut K {
    fn set_number_option(&mut self, name: &str, value: f64) -> Result<()> {
        (**self).set_number_option(name, value)
    }

    fn set_model_name(&mut self, name: &str) -> Result<()> {
        (**self).set_model_name(name)
    }

    fn add_point(&mut self, x: f64, y: f64, z: f64, size: f64) -> Result<PointTag> {
        (**self).add_point(x, y, z, size)
    }

    fn add_line(&mut self, start: PointTag, end: PointTag) -> Result<CurveTag> {
        (**self).add_line(start, end)
    }

    fn add_curve_loop(&mut self, curves: &[SignedCurve]) -> Result<LoopTag> {
        (**self).add_curve_loop(curves)
    }

    fn add_plane_surface(&mut self, boundary: LoopTag) -> Result<SurfaceTag> {
        (**self).add_plane_surface(boundary)
    }

    fn add_surface_loop(&mut self, faces: &[SurfaceTag]) -> Result<ShellTag> {
        (**self).add_surface_loop(faces)
    }

    fn add_volume(&mut self, shell: ShellTag) -> Result<VolumeTag> {
        (**self).add_volume(shell)
    }

    fn set_transfinite_surface(&mut self, face: SurfaceTag) -> Result<()> {
        (**self).set_transfinite_surface(face)
    }

    fn set_recombine_surface(&mut self, face: SurfaceTag) -> Result<()> {
        (**self).set_recombine_surface(face)
    }

    fn set_transfinite_volume(&mut self, vol: VolumeTag) -> Result<()> {
        (**self).set_transfinite_volume(vol)
    }

    fn synchronize(&mut self) -> Result<()> {
        (**self).synchronize()
    }

    fn add_physical_group(&mut self, dim: Dim, tags: &[i32]) -> Result<PhysicalTag> {
        (**self).add_physical_group(dim, tags)
    }

    fn set_physical_name(&mut self, dim: Dim, group: PhysicalTag, name: &str) -> Result<()> {
        (**self).set_physical_name(dim, group, name)
    }

    fn generate(&mut self, dim: Dim) -> Result<()> {
        (**self).generate(dim)
    }

    fn write(&mut self, path: &Path) -> Result<()> {
        (**self).write(path)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}
