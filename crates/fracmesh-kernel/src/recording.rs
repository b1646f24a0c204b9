//! In-memory recording backend.
//!
//! Assigns sequential tags, validates every reference, checks curve-loop
//! closure and surface-loop watertightness, and keeps the full call sequence
//! so tests can assert on ordering (e.g. write-after-generate).

use std::path::{Path, PathBuf};

use crate::error::{KernelError, Result};
use crate::{
    CurveTag, Dim, GeoKernel, LoopTag, PhysicalTag, PointTag, ShellTag, SignedCurve, SurfaceTag,
    VolumeTag,
};

/// A recorded point with its target mesh size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedPoint {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
    /// Target mesh size at this point.
    pub size: f64,
}

/// A recorded physical group.
#[derive(Debug, Clone)]
pub struct PhysicalGroup {
    /// Kernel-assigned group tag (sequential per dimension).
    pub tag: PhysicalTag,
    /// Raw entity tags the group covers.
    pub entities: Vec<i32>,
    /// Solver-facing name, once assigned.
    pub name: Option<String>,
}

/// One entry of the recorded call sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `set_number_option`.
    SetOption(String, f64),
    /// `set_model_name`.
    SetModelName(String),
    /// `add_point`.
    AddPoint(PointTag),
    /// `add_line`.
    AddLine(CurveTag),
    /// `add_curve_loop`.
    AddCurveLoop(LoopTag),
    /// `add_plane_surface`.
    AddPlaneSurface(SurfaceTag),
    /// `add_surface_loop`.
    AddSurfaceLoop(ShellTag),
    /// `add_volume`.
    AddVolume(VolumeTag),
    /// `set_transfinite_surface`.
    TransfiniteSurface(SurfaceTag),
    /// `set_recombine_surface`.
    RecombineSurface(SurfaceTag),
    /// `set_transfinite_volume`.
    TransfiniteVolume(VolumeTag),
    /// `synchronize`.
    Synchronize,
    /// `add_physical_group`.
    AddPhysicalGroup(Dim, PhysicalTag),
    /// `set_physical_name`.
    SetPhysicalName(Dim, PhysicalTag, String),
    /// `generate`.
    Generate(Dim),
    /// `write`.
    Write(PathBuf),
    /// `finalize`.
    Finalize,
}

/// Operations at which a test can inject a kernel failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOp {
    /// Fail the next `add_volume`.
    AddVolume,
    /// Fail the next `generate`.
    Generate,
    /// Fail the next `write`.
    Write,
}

/// In-memory kernel backend for tests and inspection.
#[derive(Debug, Default)]
pub struct RecordingKernel {
    points: Vec<RecordedPoint>,
    curves: Vec<(PointTag, PointTag)>,
    loops: Vec<Vec<SignedCurve>>,
    surfaces: Vec<LoopTag>,
    shells: Vec<Vec<SurfaceTag>>,
    volumes: Vec<ShellTag>,
    physical: [Vec<PhysicalGroup>; 4],
    ops: Vec<Op>,
    synchronized: bool,
    generated: Option<Dim>,
    written: Vec<PathBuf>,
    finalized: bool,
    fail_at: Option<FailOp>,
}

fn dim_idx(dim: Dim) -> usize {
    dim.as_i32() as usize
}

impl RecordingKernel {
    /// Fresh, empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrange for the next occurrence of `op` to fail.
    pub fn fail_at(&mut self, op: FailOp) {
        self.fail_at = Some(op);
    }

    /// Number of entities created in `dim`.
    pub fn entity_count(&self, dim: Dim) -> usize {
        match dim {
            Dim::Point => self.points.len(),
            Dim::Curve => self.curves.len(),
            Dim::Surface => self.surfaces.len(),
            Dim::Volume => self.volumes.len(),
        }
    }

    /// Recorded points, in creation order.
    pub fn points(&self) -> &[RecordedPoint] {
        &self.points
    }

    /// Endpoints of a recorded curve.
    pub fn curve_endpoints(&self, tag: CurveTag) -> Option<(PointTag, PointTag)> {
        self.curves.get((tag.0 - 1) as usize).copied()
    }

    /// Physical groups of a dimension, in creation order.
    pub fn physical_groups(&self, dim: Dim) -> &[PhysicalGroup] {
        &self.physical[dim_idx(dim)]
    }

    /// Assigned physical names of a dimension, in creation order.
    pub fn physical_names(&self, dim: Dim) -> Vec<&str> {
        self.physical[dim_idx(dim)]
            .iter()
            .filter_map(|g| g.name.as_deref())
            .collect()
    }

    /// The full recorded call sequence.
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Whether a 3-D mesh was generated.
    pub fn mesh_generated(&self) -> bool {
        self.generated == Some(Dim::Volume)
    }

    /// Paths passed to `write`, in call order.
    pub fn written_paths(&self) -> &[PathBuf] {
        &self.written
    }

    /// Whether the session has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn live(&self) -> Result<()> {
        if self.finalized {
            return Err(KernelError::Rejected("session already finalized".into()));
        }
        Ok(())
    }

    fn maybe_fail(&mut self, op: FailOp) -> Result<()> {
        if self.fail_at == Some(op) {
            self.fail_at = None;
            return Err(KernelError::Rejected(format!("injected failure at {op:?}")));
        }
        Ok(())
    }

    fn point_exists(&self, tag: PointTag) -> Result<()> {
        if tag.0 < 1 || tag.0 as usize > self.points.len() {
            return Err(KernelError::UnknownTag {
                kind: "point",
                tag: tag.0,
            });
        }
        Ok(())
    }

    fn curve_exists(&self, tag: CurveTag) -> Result<()> {
        if tag.0 < 1 || tag.0 as usize > self.curves.len() {
            return Err(KernelError::UnknownTag {
                kind: "curve",
                tag: tag.0,
            });
        }
        Ok(())
    }

    /// Directed endpoints of a signed curve reference.
    fn signed_endpoints(&self, sc: SignedCurve) -> (PointTag, PointTag) {
        let (a, b) = self.curves[(sc.tag.0 - 1) as usize];
        if sc.reversed {
            (b, a)
        } else {
            (a, b)
        }
    }
}

impl GeoKernel for RecordingKernel {
    fn set_number_option(&mut self, name: &str, value: f64) -> Result<()> {
        self.live()?;
        self.ops.push(Op::SetOption(name.to_owned(), value));
        Ok(())
    }

    fn set_model_name(&mut self, name: &str) -> Result<()> {
        self.live()?;
        self.ops.push(Op::SetModelName(name.to_owned()));
        Ok(())
    }

    fn add_point(&mut self, x: f64, y: f64, z: f64, size: f64) -> Result<PointTag> {
        self.live()?;
        self.points.push(RecordedPoint { x, y, z, size });
        let tag = PointTag(self.points.len() as i32);
        self.ops.push(Op::AddPoint(tag));
        Ok(tag)
    }

    fn add_line(&mut self, start: PointTag, end: PointTag) -> Result<CurveTag> {
        self.live()?;
        self.point_exists(start)?;
        self.point_exists(end)?;
        if start == end {
            return Err(KernelError::Degenerate(format!(
                "line with coincident endpoints (point {})",
                start.0
            )));
        }
        self.curves.push((start, end));
        let tag = CurveTag(self.curves.len() as i32);
        self.ops.push(Op::AddLine(tag));
        Ok(tag)
    }

    fn add_curve_loop(&mut self, curves: &[SignedCurve]) -> Result<LoopTag> {
        self.live()?;
        if curves.is_empty() {
            return Err(KernelError::Degenerate("empty curve loop".into()));
        }
        for sc in curves {
            self.curve_exists(sc.tag)?;
        }
        for (i, sc) in curves.iter().enumerate() {
            let next = curves[(i + 1) % curves.len()];
            let (_, head) = self.signed_endpoints(*sc);
            let (tail, _) = self.signed_endpoints(next);
            if head != tail {
                return Err(KernelError::OpenLoop(format!(
                    "curve {} ends at point {} but curve {} starts at point {}",
                    sc.signed_id(),
                    head.0,
                    next.signed_id(),
                    tail.0
                )));
            }
        }
        self.loops.push(curves.to_vec());
        let tag = LoopTag(self.loops.len() as i32);
        self.ops.push(Op::AddCurveLoop(tag));
        Ok(tag)
    }

    fn add_plane_surface(&mut self, boundary: LoopTag) -> Result<SurfaceTag> {
        self.live()?;
        if boundary.0 < 1 || boundary.0 as usize > self.loops.len() {
            return Err(KernelError::UnknownTag {
                kind: "curve loop",
                tag: boundary.0,
            });
        }
        self.surfaces.push(boundary);
        let tag = SurfaceTag(self.surfaces.len() as i32);
        self.ops.push(Op::AddPlaneSurface(tag));
        Ok(tag)
    }

    fn add_surface_loop(&mut self, faces: &[SurfaceTag]) -> Result<ShellTag> {
        self.live()?;
        if faces.is_empty() {
            return Err(KernelError::Degenerate("empty surface loop".into()));
        }
        for f in faces {
            if f.0 < 1 || f.0 as usize > self.surfaces.len() {
                return Err(KernelError::UnknownTag {
                    kind: "surface",
                    tag: f.0,
                });
            }
        }
        // Watertightness: within the shell, every curve must be used by
        // exactly two member faces.
        let mut use_count = std::collections::HashMap::new();
        for f in faces {
            let boundary = self.surfaces[(f.0 - 1) as usize];
            for sc in &self.loops[(boundary.0 - 1) as usize] {
                *use_count.entry(sc.tag).or_insert(0usize) += 1;
            }
        }
        if let Some((curve, n)) = use_count.iter().find(|(_, n)| **n != 2) {
            return Err(KernelError::Rejected(format!(
                "surface loop is not watertight: curve {} used {} time(s)",
                curve.0, n
            )));
        }
        self.shells.push(faces.to_vec());
        let tag = ShellTag(self.shells.len() as i32);
        self.ops.push(Op::AddSurfaceLoop(tag));
        Ok(tag)
    }

    fn add_volume(&mut self, shell: ShellTag) -> Result<VolumeTag> {
        self.live()?;
        self.maybe_fail(FailOp::AddVolume)?;
        if shell.0 < 1 || shell.0 as usize > self.shells.len() {
            return Err(KernelError::UnknownTag {
                kind: "surface loop",
                tag: shell.0,
            });
        }
        self.volumes.push(shell);
        let tag = VolumeTag(self.volumes.len() as i32);
        self.ops.push(Op::AddVolume(tag));
        Ok(tag)
    }

    fn set_transfinite_surface(&mut self, face: SurfaceTag) -> Result<()> {
        self.live()?;
        if face.0 < 1 || face.0 as usize > self.surfaces.len() {
            return Err(KernelError::UnknownTag {
                kind: "surface",
                tag: face.0,
            });
        }
        self.ops.push(Op::TransfiniteSurface(face));
        Ok(())
    }

    fn set_recombine_surface(&mut self, face: SurfaceTag) -> Result<()> {
        self.live()?;
        if face.0 < 1 || face.0 as usize > self.surfaces.len() {
            return Err(KernelError::UnknownTag {
                kind: "surface",
                tag: face.0,
            });
        }
        self.ops.push(Op::RecombineSurface(face));
        Ok(())
    }

    fn set_transfinite_volume(&mut self, vol: VolumeTag) -> Result<()> {
        self.live()?;
        if vol.0 < 1 || vol.0 as usize > self.volumes.len() {
            return Err(KernelError::UnknownTag {
                kind: "volume",
                tag: vol.0,
            });
        }
        self.ops.push(Op::TransfiniteVolume(vol));
        Ok(())
    }

    fn synchronize(&mut self) -> Result<()> {
        self.live()?;
        self.synchronized = true;
        self.ops.push(Op::Synchronize);
        Ok(())
    }

    fn add_physical_group(&mut self, dim: Dim, tags: &[i32]) -> Result<PhysicalTag> {
        self.live()?;
        if !self.synchronized {
            return Err(KernelError::Rejected(
                "physical groups require a synchronized model".into(),
            ));
        }
        if tags.is_empty() {
            return Err(KernelError::Degenerate("empty physical group".into()));
        }
        let count = self.entity_count(dim) as i32;
        for &t in tags {
            if t < 1 || t > count {
                return Err(KernelError::UnknownTag {
                    kind: "physical group entity",
                    tag: t,
                });
            }
        }
        let groups = &mut self.physical[dim_idx(dim)];
        let tag = PhysicalTag(groups.len() as i32 + 1);
        groups.push(PhysicalGroup {
            tag,
            entities: tags.to_vec(),
            name: None,
        });
        self.ops.push(Op::AddPhysicalGroup(dim, tag));
        Ok(tag)
    }

    fn set_physical_name(&mut self, dim: Dim, group: PhysicalTag, name: &str) -> Result<()> {
        self.live()?;
        let groups = &mut self.physical[dim_idx(dim)];
        let entry = groups
            .iter_mut()
            .find(|g| g.tag == group)
            .ok_or(KernelError::UnknownTag {
                kind: "physical group",
                tag: group.0,
            })?;
        entry.name = Some(name.to_owned());
        self.ops
            .push(Op::SetPhysicalName(dim, group, name.to_owned()));
        Ok(())
    }

    fn generate(&mut self, dim: Dim) -> Result<()> {
        self.live()?;
        self.maybe_fail(FailOp::Generate)?;
        if !self.synchronized {
            return Err(KernelError::Rejected(
                "mesh generation requires a synchronized model".into(),
            ));
        }
        self.generated = Some(dim);
        self.ops.push(Op::Generate(dim));
        Ok(())
    }

    fn write(&mut self, path: &Path) -> Result<()> {
        self.live()?;
        self.maybe_fail(FailOp::Write)?;
        self.written.push(path.to_owned());
        self.ops.push(Op::Write(path.to_owned()));
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if !self.finalized {
            self.finalized = true;
            self.ops.push(Op::Finalize);
        }
        Ok(())
    }
}
