//! Scoped kernel session.
//!
//! The external kernel keeps a single implicit modeling context, so a build
//! must release it on every exit path. [`Session`] owns a backend for the
//! duration of one build and guarantees `finalize()` runs on drop, whether
//! the build succeeded, the kernel rejected geometry, or the caller bailed
//! early.

use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::GeoKernel;

/// RAII guard around a kernel backend.
#[derive(Debug)]
pub struct Session<K: GeoKernel> {
    kernel: Option<K>,
}

impl<K: GeoKernel> Session<K> {
    /// Open a session over `kernel`.
    pub fn new(kernel: K) -> Self {
        Self {
            kernel: Some(kernel),
        }
    }

    /// Finalize explicitly and recover the backend (e.g. to extract a
    /// rendered script).
    pub fn finish(mut self) -> Result<K> {
        let mut kernel = self.kernel.take().expect("session already finished");
        kernel.finalize()?;
        Ok(kernel)
    }
}

impl<K: GeoKernel> Deref for Session<K> {
    type Target = K;

    fn deref(&self) -> &K {
        self.kernel.as_ref().expect("session already finished")
    }
}

impl<K: GeoKernel> DerefMut for Session<K> {
    fn deref_mut(&mut self) -> &mut K {
        self.kernel.as_mut().expect("session already finished")
    }
}

impl<K: GeoKernel> Drop for Session<K> {
    fn drop(&mut self) {
        if let Some(kernel) = self.kernel.as_mut() {
            // Nothing useful to do with a finalize error during unwind.
            let _ = kernel.finalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CurveTag, Dim, LoopTag, PhysicalTag, PointTag, RecordingKernel, ShellTag, SignedCurve,
        SurfaceTag, VolumeTag,
    };
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    #[test]
    fn finish_finalizes() {
        let session = Session::new(RecordingKernel::new());
        let kernel = session.finish().unwrap();
        assert!(kernel.is_finalized());
    }

    /// Stub backend observable after the session consumed it.
    struct Flagged(Rc<Cell<bool>>);

    impl GeoKernel for Flagged {
        fn set_number_option(&mut self, _: &str, _: f64) -> Result<()> {
            Ok(())
        }
        fn set_model_name(&mut self, _: &str) -> Result<()> {
            Ok(())
        }
        fn add_point(&mut self, _: f64, _: f64, _: f64, _: f64) -> Result<PointTag> {
            Ok(PointTag(1))
        }
        fn add_line(&mut self, _: PointTag, _: PointTag) -> Result<CurveTag> {
            Ok(CurveTag(1))
        }
        fn add_curve_loop(&mut self, _: &[SignedCurve]) -> Result<LoopTag> {
            Ok(LoopTag(1))
        }
        fn add_plane_surface(&mut self, _: LoopTag) -> Result<SurfaceTag> {
            Ok(SurfaceTag(1))
        }
        fn add_surface_loop(&mut self, _: &[SurfaceTag]) -> Result<ShellTag> {
            Ok(ShellTag(1))
        }
        fn add_volume(&mut self, _: ShellTag) -> Result<VolumeTag> {
            Ok(VolumeTag(1))
        }
        fn set_transfinite_surface(&mut self, _: SurfaceTag) -> Result<()> {
            Ok(())
        }
        fn set_recombine_surface(&mut self, _: SurfaceTag) -> Result<()> {
            Ok(())
        }
        fn set_transfinite_volume(&mut self, _: VolumeTag) -> Result<()> {
            Ok(())
        }
        fn synchronize(&mut self) -> Result<()> {
            Ok(())
        }
        fn add_physical_group(&mut self, _: Dim, _: &[i32]) -> Result<PhysicalTag> {
            Ok(PhysicalTag(1))
        }
        fn set_physical_name(&mut self, _: Dim, _: PhysicalTag, _: &str) -> Result<()> {
            Ok(())
        }
        fn generate(&mut self, _: Dim) -> Result<()> {
            Ok(())
        }
        fn write(&mut self, _: &Path) -> Result<()> {
            Ok(())
        }
        fn finalize(&mut self) -> Result<()> {
            self.0.set(true);
            Ok(())
        }
    }

    #[test]
    fn drop_finalizes() {
        let flag = Rc::new(Cell::new(false));
        let mut session = Session::new(Flagged(flag.clone()));
        session.add_point(0.0, 0.0, 0.0, 1.0).unwrap();
        drop(session);
        assert!(flag.get());
    }
}
