//! Schema-to-kernel emission.
//!
//! Walks the static schema in its fixed order and maps every symbolic key to
//! the tag the kernel hands back. Lookup misses mean the schema and the
//! physical table disagree; they surface as `TopoError::Inconsistent` rather
//! than panicking.

use std::collections::HashMap;

use fracmesh_kernel::{
    CurveTag, Dim, GeoKernel, PointTag, SignedCurve, SurfaceTag, VolumeTag,
};
use fracmesh_topo::{
    derive_points, physical_groups, EdgeKey, FaceKey, FracParams, PhysicalEntities, PointKey,
    Schema, TopoError, VolumeKey,
};

use crate::{BuildError, PhysicalReport};

pub(crate) struct Emitter<'a, K: GeoKernel> {
    kernel: &'a mut K,
    schema: &'a Schema,
    points: HashMap<PointKey, PointTag>,
    curves: HashMap<EdgeKey, CurveTag>,
    surfaces: HashMap<FaceKey, SurfaceTag>,
    volumes: HashMap<VolumeKey, VolumeTag>,
}

fn missing(what: &str) -> BuildError {
    BuildError::Topo(TopoError::Inconsistent(format!(
        "emission referenced an unmapped {what}"
    )))
}

impl<'a, K: GeoKernel> Emitter<'a, K> {
    pub(crate) fn new(kernel: &'a mut K, schema: &'a Schema) -> Self {
        Self {
            kernel,
            schema,
            points: HashMap::new(),
            curves: HashMap::new(),
            surfaces: HashMap::new(),
            volumes: HashMap::new(),
        }
    }

    pub(crate) fn kernel(&mut self) -> &mut K {
        self.kernel
    }

    /// Points, lines, curve loops + plane surfaces, surface loops + volumes,
    /// in schema order.
    pub(crate) fn emit_geometry(&mut self, params: &FracParams) -> Result<(), BuildError> {
        for point in derive_points(params) {
            let tag = self
                .kernel
                .add_point(point.pos.x, point.pos.y, point.pos.z, point.size)?;
            self.points.insert(point.key, tag);
        }

        for edge in &self.schema.edges {
            let tail = *self.points.get(&edge.tail).ok_or_else(|| missing("point"))?;
            let head = *self.points.get(&edge.head).ok_or_else(|| missing("point"))?;
            let tag = self.kernel.add_line(tail, head)?;
            self.curves.insert(edge.key, tag);
        }

        for face in &self.schema.faces {
            let mut loop_refs = Vec::with_capacity(face.boundary.len());
            for oe in &face.boundary {
                let tag = *self.curves.get(&oe.key).ok_or_else(|| missing("curve"))?;
                loop_refs.push(if oe.reversed {
                    SignedCurve::reverse(tag)
                } else {
                    SignedCurve::forward(tag)
                });
            }
            let boundary = self.kernel.add_curve_loop(&loop_refs)?;
            let tag = self.kernel.add_plane_surface(boundary)?;
            self.surfaces.insert(face.key, tag);
        }

        for volume in &self.schema.volumes {
            let mut shell_faces = Vec::with_capacity(volume.shell.len());
            for fk in &volume.shell {
                shell_faces.push(*self.surfaces.get(fk).ok_or_else(|| missing("surface"))?);
            }
            let shell = self.kernel.add_surface_loop(&shell_faces)?;
            let tag = self.kernel.add_volume(shell)?;
            self.volumes.insert(volume.key, tag);
        }

        Ok(())
    }

    /// Transfinite + recombine marks on the band-adjacent faces, transfinite
    /// marks on the band-half volumes.
    pub(crate) fn apply_structured_marks(&mut self) -> Result<(), BuildError> {
        for fk in self.schema.transfinite_faces() {
            let tag = *self.surfaces.get(&fk).ok_or_else(|| missing("surface"))?;
            self.kernel.set_transfinite_surface(tag)?;
            self.kernel.set_recombine_surface(tag)?;
        }
        for vk in self.schema.transfinite_volumes() {
            let tag = *self.volumes.get(&vk).ok_or_else(|| missing("volume"))?;
            self.kernel.set_transfinite_volume(tag)?;
        }
        Ok(())
    }

    /// Named physical groups; requires a synchronized model.
    pub(crate) fn apply_physical_groups(&mut self) -> Result<Vec<PhysicalReport>, BuildError> {
        let mut reports = Vec::new();
        for group in physical_groups() {
            let (dim, raw): (Dim, Vec<i32>) = match &group.entities {
                PhysicalEntities::Points(keys) => (
                    Dim::Point,
                    keys.iter()
                        .map(|k| self.points.get(k).map(|t| t.0).ok_or_else(|| missing("point")))
                        .collect::<Result<_, _>>()?,
                ),
                PhysicalEntities::Edges(keys) => (
                    Dim::Curve,
                    keys.iter()
                        .map(|k| self.curves.get(k).map(|t| t.0).ok_or_else(|| missing("curve")))
                        .collect::<Result<_, _>>()?,
                ),
                PhysicalEntities::Faces(keys) => (
                    Dim::Surface,
                    keys.iter()
                        .map(|k| {
                            self.surfaces
                                .get(k)
                                .map(|t| t.0)
                                .ok_or_else(|| missing("surface"))
                        })
                        .collect::<Result<_, _>>()?,
                ),
                PhysicalEntities::Volumes(keys) => (
                    Dim::Volume,
                    keys.iter()
                        .map(|k| {
                            self.volumes
                                .get(k)
                                .map(|t| t.0)
                                .ok_or_else(|| missing("volume"))
                        })
                        .collect::<Result<_, _>>()?,
                ),
            };
            let tag = self.kernel.add_physical_group(dim, &raw)?;
            self.kernel.set_physical_name(dim, tag, group.name)?;
            reports.push(PhysicalReport {
                name: group.name.to_owned(),
                dim,
                tag,
            });
        }
        Ok(reports)
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn into_tag_maps(
        self,
    ) -> (
        HashMap<PointKey, PointTag>,
        HashMap<EdgeKey, CurveTag>,
        HashMap<FaceKey, SurfaceTag>,
        HashMap<VolumeKey, VolumeTag>,
    ) {
        (self.points, self.curves, self.surfaces, self.volumes)
    }
}
