#![warn(missing_docs)]

//! Emitter/orchestrator for fracmesh builds.
//!
//! Drives a [`GeoKernel`] backend through one complete fractured-cube build:
//! parameter validation, schema consistency check, mesh options, geometry
//! emission (points, lines, loops, surfaces, shells, volumes), structured-
//! mesh marking, synchronization, physical tagging, mesh generation and
//! serialization. The kernel session is finalized on every exit path; a
//! kernel rejection aborts the whole build and produces no output.
//!
//! ```no_run
//! use fracmesh_build::{build_fractured_cube, BuildOptions};
//! use fracmesh_kernel::GeoScriptKernel;
//! use fracmesh_topo::FracParams;
//!
//! let params = FracParams::default();
//! let opts = BuildOptions::new("sample.msh");
//! let out = build_fractured_cube(GeoScriptKernel::new(), &params, &opts)?;
//! std::fs::write("sample.geo", out.kernel.into_script())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod emit;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use fracmesh_kernel::{
    CurveTag, Dim, GeoKernel, KernelError, PhysicalTag, PointTag, Session, SurfaceTag, VolumeTag,
};
use fracmesh_topo::{EdgeKey, FaceKey, FracParams, PointKey, Schema, TopoError, VolumeKey};

/// Errors from a build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Parameter or schema defect, caught before any kernel call.
    #[error(transparent)]
    Topo(#[from] TopoError),

    /// Kernel-level rejection; the session has been released.
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// Build-level options, separate from the physical parameters.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Target mesh file; the extension is normalized to `.msh`.
    pub output: PathBuf,
    /// Whether to run 3-D mesh generation (a pure-geometry output is still
    /// written when disabled).
    pub generate_mesh: bool,
}

impl BuildOptions {
    /// Options for an output path, with mesh generation enabled.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            generate_mesh: true,
        }
    }

    /// The output path with its extension forced to `.msh`.
    pub fn normalized_output(&self) -> PathBuf {
        if self.output.extension().and_then(|e| e.to_str()) == Some("msh") {
            self.output.clone()
        } else {
            self.output.with_extension("msh")
        }
    }

    fn model_name(&self) -> String {
        self.output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("fractured_cube")
            .to_owned()
    }
}

/// A named physical group as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalReport {
    /// Solver-facing name.
    pub name: String,
    /// Entity dimension.
    pub dim: Dim,
    /// Kernel-assigned group tag.
    pub tag: PhysicalTag,
}

/// Symbolic-key to kernel-tag maps of one finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Path the mesh was written to.
    pub output: PathBuf,
    /// Point tags.
    pub points: HashMap<PointKey, PointTag>,
    /// Curve tags.
    pub curves: HashMap<EdgeKey, CurveTag>,
    /// Surface tags.
    pub surfaces: HashMap<FaceKey, SurfaceTag>,
    /// Volume tags.
    pub volumes: HashMap<VolumeKey, VolumeTag>,
    /// Physical groups, in emission order.
    pub physical: Vec<PhysicalReport>,
    /// Whether a 3-D mesh was generated.
    pub mesh_generated: bool,
}

/// A finished build: the released kernel backend plus the report.
#[derive(Debug)]
pub struct BuildOutput<K> {
    /// The backend, finalized. For the script backend this still carries the
    /// rendered script.
    pub kernel: K,
    /// Tag maps and output metadata.
    pub report: BuildReport,
}

/// Run one complete fractured-cube build against `kernel`.
///
/// Parameters are validated and the schema checked before the kernel session
/// opens; any later kernel error finalizes the session and discards the
/// backend, so no partial output survives a failed build.
pub fn build_fractured_cube<K: GeoKernel>(
    kernel: K,
    params: &FracParams,
    opts: &BuildOptions,
) -> Result<BuildOutput<K>, BuildError> {
    params.validate()?;
    let schema = Schema::fractured_cube();
    schema.check()?;

    let mut session = Session::new(kernel);
    let report = run_build(&mut session, &schema, params, opts)?;
    let kernel = session.finish()?;
    Ok(BuildOutput { kernel, report })
}

fn run_build<K: GeoKernel>(
    kernel: &mut Session<K>,
    schema: &Schema,
    params: &FracParams,
    opts: &BuildOptions,
) -> Result<BuildReport, BuildError> {
    kernel.set_number_option("General.Verbosity", 2.0)?;
    kernel.set_number_option("Mesh.RecombineAll", 1.0)?;
    kernel.set_number_option("Mesh.SubdivisionAlgorithm", 1.0)?;
    kernel.set_model_name(&opts.model_name())?;

    let mut emitter = emit::Emitter::new(&mut **kernel, schema);
    emitter.emit_geometry(params)?;
    emitter.apply_structured_marks()?;
    emitter.kernel().synchronize()?;
    let physical = emitter.apply_physical_groups()?;
    let (points, curves, surfaces, volumes) = emitter.into_tag_maps();

    if opts.generate_mesh {
        kernel.generate(Dim::Volume)?;
    }
    let output = opts.normalized_output();
    kernel.write(Path::new(&output))?;

    Ok(BuildReport {
        output,
        points,
        curves,
        surfaces,
        volumes,
        physical,
        mesh_generated: opts.generate_mesh,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fracmesh_kernel::{FailOp, GeoScriptKernel, Op, RecordingKernel};

    fn reference_params() -> FracParams {
        FracParams {
            lc: 1.0,
            lc_frac: 0.2,
            length: 4.0,
            height: 4.0,
            thickness: 4.0,
            dip_deg: 0.0,
            band: 0.2,
            center_z: 0.0,
        }
    }

    fn build_recorded(params: &FracParams, opts: &BuildOptions) -> (RecordingKernel, BuildReport) {
        let mut kernel = RecordingKernel::new();
        let report = build_fractured_cube(&mut kernel, params, opts)
            .expect("build failed")
            .report;
        (kernel, report)
    }

    #[test]
    fn reference_scenario_entity_counts() {
        let (kernel, report) =
            build_recorded(&reference_params(), &BuildOptions::new("sample.msh"));
        assert_eq!(kernel.entity_count(Dim::Point), 21);
        assert_eq!(kernel.entity_count(Dim::Curve), 36);
        assert_eq!(kernel.entity_count(Dim::Surface), 21);
        assert_eq!(kernel.entity_count(Dim::Volume), 4);
        assert!(report.mesh_generated);
        assert_eq!(report.points.len(), 21);
        assert_eq!(report.curves.len(), 36);
        assert_eq!(report.surfaces.len(), 21);
        assert_eq!(report.volumes.len(), 4);
    }

    #[test]
    fn reference_scenario_physical_names() {
        let (kernel, report) =
            build_recorded(&reference_params(), &BuildOptions::new("sample.msh"));
        for name in [
            "MATRIX_TOP",
            "MATRIX_BOTTOM",
            "FRAC",
            "F_FRAC_U",
            "F_FRAC_M",
            "F_FRAC_L",
        ] {
            assert!(
                report.physical.iter().any(|g| g.name == name),
                "missing {name}"
            );
        }
        let point_names = kernel.physical_names(Dim::Point);
        for name in ["CENTER", "P_BOT_FL", "P_BOT_FR", "P_BOT_BR", "P_BOT_BL"] {
            assert!(point_names.contains(&name), "missing {name}");
        }
        for group in kernel.physical_groups(Dim::Volume) {
            assert!(!group.entities.is_empty());
        }
        // FRAC merges the two band halves into one material region.
        let frac = kernel
            .physical_groups(Dim::Volume)
            .iter()
            .find(|g| g.name.as_deref() == Some("FRAC"))
            .unwrap();
        assert_eq!(frac.entities.len(), 2);
    }

    #[test]
    fn dipping_build_keeps_entity_counts() {
        let params = FracParams {
            dip_deg: 30.0,
            ..reference_params()
        };
        let (kernel, _) = build_recorded(&params, &BuildOptions::new("dip30.msh"));
        assert_eq!(kernel.entity_count(Dim::Point), 21);
        assert_eq!(kernel.entity_count(Dim::Curve), 36);
        assert_eq!(kernel.entity_count(Dim::Surface), 21);
        assert_eq!(kernel.entity_count(Dim::Volume), 4);
    }

    #[test]
    fn zero_thickness_band_still_builds() {
        let params = FracParams {
            band: 0.0,
            ..reference_params()
        };
        let (kernel, _) = build_recorded(&params, &BuildOptions::new("thin.msh"));
        assert_eq!(kernel.entity_count(Dim::Volume), 4);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let opts = BuildOptions::new("sample.msh");
        let (kernel_a, report_a) = build_recorded(&reference_params(), &opts);
        let (kernel_b, report_b) = build_recorded(&reference_params(), &opts);
        assert_eq!(report_a.points, report_b.points);
        assert_eq!(report_a.curves, report_b.curves);
        assert_eq!(report_a.surfaces, report_b.surfaces);
        assert_eq!(report_a.volumes, report_b.volumes);
        assert_eq!(report_a.physical, report_b.physical);
        for dim in Dim::ALL {
            assert_eq!(kernel_a.entity_count(dim), kernel_b.entity_count(dim));
        }
    }

    #[test]
    fn invalid_params_never_touch_the_kernel() {
        let params = FracParams {
            length: -1.0,
            ..reference_params()
        };
        let mut kernel = RecordingKernel::new();
        let err = build_fractured_cube(&mut kernel, &params, &BuildOptions::new("bad.msh"))
            .unwrap_err();
        assert!(matches!(err, BuildError::Topo(TopoError::InvalidParams(_))));
        assert!(kernel.ops().is_empty());
        assert!(!kernel.is_finalized());
        assert!(kernel.written_paths().is_empty());
    }

    #[test]
    fn call_ordering_is_enforced() {
        let (kernel, _) = build_recorded(&reference_params(), &BuildOptions::new("sample.msh"));
        let ops = kernel.ops();
        let index_of = |pred: &dyn Fn(&Op) -> bool| ops.iter().position(|op| pred(op)).unwrap();
        let last_of = |pred: &dyn Fn(&Op) -> bool| {
            ops.len() - 1 - ops.iter().rev().position(|op| pred(op)).unwrap()
        };
        let sync = index_of(&|op| matches!(op, Op::Synchronize));
        // Marks precede synchronization, physical groups follow it.
        assert!(last_of(&|op| matches!(op, Op::TransfiniteSurface(_))) < sync);
        assert!(last_of(&|op| matches!(op, Op::TransfiniteVolume(_))) < sync);
        assert!(index_of(&|op| matches!(op, Op::AddPhysicalGroup(..))) > sync);
        // Generation after tagging, write after generation, finalize last.
        let generate = index_of(&|op| matches!(op, Op::Generate(_)));
        assert!(last_of(&|op| matches!(op, Op::SetPhysicalName(..))) < generate);
        let write = index_of(&|op| matches!(op, Op::Write(_)));
        assert!(generate < write);
        assert_eq!(last_of(&|_| true), index_of(&|op| matches!(op, Op::Finalize)));
    }

    #[test]
    fn skip_generation_still_writes_geometry() {
        let opts = BuildOptions {
            output: PathBuf::from("geom.msh"),
            generate_mesh: false,
        };
        let (kernel, report) = build_recorded(&reference_params(), &opts);
        assert!(!kernel.mesh_generated());
        assert!(!report.mesh_generated);
        assert_eq!(kernel.written_paths(), [PathBuf::from("geom.msh")].as_slice());
    }

    #[test]
    fn output_extension_is_normalized() {
        let (kernel, report) =
            build_recorded(&reference_params(), &BuildOptions::new("sample.vtk"));
        assert_eq!(report.output, PathBuf::from("sample.msh"));
        assert_eq!(kernel.written_paths(), [PathBuf::from("sample.msh")].as_slice());
    }

    #[test]
    fn kernel_failure_finalizes_session_and_writes_nothing() {
        let mut kernel = RecordingKernel::new();
        kernel.fail_at(FailOp::AddVolume);
        let err = build_fractured_cube(
            &mut kernel,
            &reference_params(),
            &BuildOptions::new("sample.msh"),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Kernel(_)));
        assert!(kernel.is_finalized());
        assert!(kernel.written_paths().is_empty());
    }

    #[test]
    fn failed_generation_produces_no_output() {
        let mut kernel = RecordingKernel::new();
        kernel.fail_at(FailOp::Generate);
        let err = build_fractured_cube(
            &mut kernel,
            &reference_params(),
            &BuildOptions::new("sample.msh"),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Kernel(_)));
        assert!(kernel.written_paths().is_empty());
        assert!(kernel.is_finalized());
    }

    #[test]
    fn script_backend_renders_complete_build() {
        let out = build_fractured_cube(
            GeoScriptKernel::new(),
            &reference_params(),
            &BuildOptions::new("sample"),
        )
        .unwrap();
        let script = out.kernel.into_script();
        assert_eq!(script.matches("\nPoint(").count(), 21);
        assert_eq!(script.matches("\nLine(").count(), 36);
        assert_eq!(script.matches("Plane Surface(").count(), 21);
        assert_eq!(script.matches("Surface Loop(").count(), 4);
        assert_eq!(script.matches("\nVolume(").count(), 4);
        assert_eq!(script.matches("Transfinite Surface{").count(), 11);
        assert_eq!(script.matches("Recombine Surface{").count(), 11);
        assert_eq!(script.matches("Transfinite Volume{").count(), 2);
        assert!(script.contains("Mesh.RecombineAll = 1.0;"));
        assert!(script.contains("Physical Volume(\"FRAC\""));
        assert!(script.contains("Physical Surface(\"F_FRAC_M\""));
        assert!(script.contains("Mesh 3;"));
        assert!(script.contains("Save \"sample.msh\";"));
    }
}
