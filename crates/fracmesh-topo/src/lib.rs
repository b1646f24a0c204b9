#![warn(missing_docs)]

//! Fracture-band cuboid topology for fracmesh.
//!
//! A cuboid sample is partitioned into two matrix blocks and a thin,
//! possibly dipping fracture band of two half-thickness layers. This crate
//! owns everything upstream of the meshing kernel:
//!
//! - [`FracParams`]: the physical build parameters and their validation;
//! - [`coords`]: closed-form derivation of the 21 point coordinates;
//! - [`Schema`]: the static connectivity table (36 edges, 21 faces,
//!   4 volumes) expressed over symbolic keys rather than kernel tags, with a
//!   consistency checker and the transfinite/recombine mark sets;
//! - [`physical`]: the solver-facing named groups.
//!
//! The schema is identical for every parameter value; only point positions
//! move. Silently wrong loop signs produce inverted or self-intersecting
//! faces downstream, so the checker runs before any kernel call.

pub mod coords;
pub mod error;
pub mod keys;
pub mod params;
pub mod physical;
pub mod schema;

pub use coords::{derive_points, SizedPoint};
pub use error::TopoError;
pub use keys::{
    Cap, CornerXY, CutFace, EdgeKey, EndY, FaceKey, Half, Layer, OrientedEdge, PointKey, RimPos,
    SideX, Strip, VolumeKey,
};
pub use params::{Derived, FracParams};
pub use physical::{physical_groups, PhysicalDef, PhysicalEntities};
pub use schema::{EdgeDef, FaceDef, Schema, VolumeDef};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;
