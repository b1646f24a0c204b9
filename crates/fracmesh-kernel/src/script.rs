//! gmsh `.geo` script backend.
//!
//! Renders the kernel call sequence as a plain-text gmsh script. Nothing is
//! written to disk by this backend: the script accumulates in memory and the
//! caller persists it only after a successful build, so a failed build never
//! leaves a partial output behind.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{KernelError, Result};
use crate::{
    CurveTag, Dim, GeoKernel, LoopTag, PhysicalTag, PointTag, ShellTag, SignedCurve, SurfaceTag,
    VolumeTag,
};

#[derive(Debug, Clone)]
struct PendingGroup {
    dim: Dim,
    tag: PhysicalTag,
    entities: Vec<i32>,
}

/// Kernel backend that renders gmsh `.geo` statements.
#[derive(Debug, Default)]
pub struct GeoScriptKernel {
    buf: String,
    next_point: i32,
    next_curve: i32,
    next_loop: i32,
    next_surface: i32,
    next_shell: i32,
    next_volume: i32,
    next_physical: [i32; 4],
    pending: Vec<PendingGroup>,
    finalized: bool,
}

fn num(v: f64) -> String {
    // Shortest round-trip form; gmsh accepts both `4` and `4.0`.
    format!("{v:?}")
}

fn join(ids: &[i32]) -> String {
    ids.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn physical_keyword(dim: Dim) -> &'static str {
    match dim {
        Dim::Point => "Physical Point",
        Dim::Curve => "Physical Curve",
        Dim::Surface => "Physical Surface",
        Dim::Volume => "Physical Volume",
    }
}

impl GeoScriptKernel {
    /// Fresh, empty script session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The script rendered so far.
    pub fn script(&self) -> &str {
        &self.buf
    }

    /// Consume the backend and return the finished script.
    pub fn into_script(self) -> String {
        self.buf
    }

    fn live(&self) -> Result<()> {
        if self.finalized {
            return Err(KernelError::Rejected("session already finalized".into()));
        }
        Ok(())
    }
}

impl GeoKernel for GeoScriptKernel {
    fn set_number_option(&mut self, name: &str, value: f64) -> Result<()> {
        self.live()?;
        let _ = writeln!(self.buf, "{name} = {};", num(value));
        Ok(())
    }

    fn set_model_name(&mut self, name: &str) -> Result<()> {
        self.live()?;
        let _ = writeln!(self.buf, "// model: {name}");
        Ok(())
    }

    fn add_point(&mut self, x: f64, y: f64, z: f64, size: f64) -> Result<PointTag> {
        self.live()?;
        self.next_point += 1;
        let tag = self.next_point;
        let _ = writeln!(
            self.buf,
            "Point({tag}) = {{{}, {}, {}, {}}};",
            num(x),
            num(y),
            num(z),
            num(size)
        );
        Ok(PointTag(tag))
    }

    fn add_line(&mut self, start: PointTag, end: PointTag) -> Result<CurveTag> {
        self.live()?;
        self.next_curve += 1;
        let tag = self.next_curve;
        let _ = writeln!(self.buf, "Line({tag}) = {{{}, {}}};", start.0, end.0);
        Ok(CurveTag(tag))
    }

    fn add_curve_loop(&mut self, curves: &[SignedCurve]) -> Result<LoopTag> {
        self.live()?;
        if curves.is_empty() {
            return Err(KernelError::Degenerate("empty curve loop".into()));
        }
        self.next_loop += 1;
        let tag = self.next_loop;
        let ids: Vec<i32> = curves.iter().map(|c| c.signed_id()).collect();
        let _ = writeln!(self.buf, "Curve Loop({tag}) = {{{}}};", join(&ids));
        Ok(LoopTag(tag))
    }

    fn add_plane_surface(&mut self, boundary: LoopTag) -> Result<SurfaceTag> {
        self.live()?;
        self.next_surface += 1;
        let tag = self.next_surface;
        let _ = writeln!(self.buf, "Plane Surface({tag}) = {{{}}};", boundary.0);
        Ok(SurfaceTag(tag))
    }

    fn add_surface_loop(&mut self, faces: &[SurfaceTag]) -> Result<ShellTag> {
        self.live()?;
        if faces.is_empty() {
            return Err(KernelError::Degenerate("empty surface loop".into()));
        }
        self.next_shell += 1;
        let tag = self.next_shell;
        let ids: Vec<i32> = faces.iter().map(|f| f.0).collect();
        let _ = writeln!(self.buf, "Surface Loop({tag}) = {{{}}};", join(&ids));
        Ok(ShellTag(tag))
    }

    fn add_volume(&mut self, shell: ShellTag) -> Result<VolumeTag> {
        self.live()?;
        self.next_volume += 1;
        let tag = self.next_volume;
        let _ = writeln!(self.buf, "Volume({tag}) = {{{}}};", shell.0);
        Ok(VolumeTag(tag))
    }

    fn set_transfinite_surface(&mut self, face: SurfaceTag) -> Result<()> {
        self.live()?;
        let _ = writeln!(self.buf, "Transfinite Surface{{{}}};", face.0);
        Ok(())
    }

    fn set_recombine_surface(&mut self, face: SurfaceTag) -> Result<()> {
        self.live()?;
        let _ = writeln!(self.buf, "Recombine Surface{{{}}};", face.0);
        Ok(())
    }

    fn set_transfinite_volume(&mut self, vol: VolumeTag) -> Result<()> {
        self.live()?;
        let _ = writeln!(self.buf, "Transfinite Volume{{{}}};", vol.0);
        Ok(())
    }

    fn synchronize(&mut self) -> Result<()> {
        // The .geo language synchronizes implicitly between statements.
        self.live()
    }

    fn add_physical_group(&mut self, dim: Dim, tags: &[i32]) -> Result<PhysicalTag> {
        self.live()?;
        if tags.is_empty() {
            return Err(KernelError::Degenerate("empty physical group".into()));
        }
        let slot = dim.as_i32() as usize;
        self.next_physical[slot] += 1;
        let tag = PhysicalTag(self.next_physical[slot]);
        // Held back until the name arrives: gmsh scripts attach the name in
        // the same statement.
        self.pending.push(PendingGroup {
            dim,
            tag,
            entities: tags.to_vec(),
        });
        Ok(tag)
    }

    fn set_physical_name(&mut self, dim: Dim, group: PhysicalTag, name: &str) -> Result<()> {
        self.live()?;
        let idx = self
            .pending
            .iter()
            .position(|g| g.dim == dim && g.tag == group)
            .ok_or(KernelError::UnknownTag {
                kind: "physical group",
                tag: group.0,
            })?;
        let g = self.pending.remove(idx);
        let _ = writeln!(
            self.buf,
            "{}(\"{name}\", {}) = {{{}}};",
            physical_keyword(g.dim),
            g.tag.0,
            join(&g.entities)
        );
        Ok(())
    }

    fn generate(&mut self, dim: Dim) -> Result<()> {
        self.live()?;
        let _ = writeln!(self.buf, "Mesh {};", dim.as_i32());
        Ok(())
    }

    fn write(&mut self, path: &Path) -> Result<()> {
        self.live()?;
        let _ = writeln!(self.buf, "Save \"{}\";", path.display());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_geometry_statements() {
        let mut k = GeoScriptKernel::new();
        let a = k.add_point(-2.0, 2.0, -2.0, 1.0).unwrap();
        let b = k.add_point(2.0, 2.0, -2.0, 1.0).unwrap();
        let c = k.add_line(a, b).unwrap();
        assert_eq!(c, CurveTag(1));
        assert!(k.script().contains("Point(1) = {-2.0, 2.0, -2.0, 1.0};"));
        assert!(k.script().contains("Line(1) = {1, 2};"));
    }

    #[test]
    fn signed_loop_references() {
        let mut k = GeoScriptKernel::new();
        let p: Vec<_> = (0..4)
            .map(|i| k.add_point(i as f64, 0.0, 0.0, 1.0).unwrap())
            .collect();
        let c: Vec<_> = (0..4)
            .map(|i| k.add_line(p[i], p[(i + 1) % 4]).unwrap())
            .collect();
        k.add_curve_loop(&[
            SignedCurve::forward(c[0]),
            SignedCurve::forward(c[1]),
            SignedCurve::reverse(c[3]),
            SignedCurve::reverse(c[2]),
        ])
        .unwrap();
        assert!(k.script().contains("Curve Loop(1) = {1, 2, -4, -3};"));
    }

    #[test]
    fn physical_name_flushes_group() {
        let mut k = GeoScriptKernel::new();
        let a = k.add_point(0.0, 0.0, 0.0, 1.0).unwrap();
        let b = k.add_point(1.0, 0.0, 0.0, 1.0).unwrap();
        k.add_line(a, b).unwrap();
        k.synchronize().unwrap();
        let g = k.add_physical_group(Dim::Curve, &[1]).unwrap();
        assert!(!k.script().contains("Physical Curve"));
        k.set_physical_name(Dim::Curve, g, "L_BOT_FRONT").unwrap();
        assert!(k
            .script()
            .contains("Physical Curve(\"L_BOT_FRONT\", 1) = {1};"));
    }

    #[test]
    fn mesh_and_save() {
        let mut k = GeoScriptKernel::new();
        k.generate(Dim::Volume).unwrap();
        k.write(Path::new("sample.msh")).unwrap();
        assert!(k.script().contains("Mesh 3;"));
        assert!(k.script().contains("Save \"sample.msh\";"));
    }
}
