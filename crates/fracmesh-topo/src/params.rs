//! Build parameters and derived scalars.

use serde::{Deserialize, Serialize};

use crate::error::TopoError;

/// Below this, `cos θ` is treated as zero and the band half-width collapses
/// to 0 (degenerate but valid output, not an error).
const COS_EPS: f64 = 1e-12;

/// Physical parameters of a fractured-cube build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FracParams {
    /// Target mesh size in the matrix blocks.
    pub lc: f64,
    /// Target mesh size in the fracture band.
    pub lc_frac: f64,
    /// Domain extent along x.
    pub length: f64,
    /// Domain extent along y.
    pub height: f64,
    /// Domain extent along z.
    pub thickness: f64,
    /// Dip angle of the fracture plane from horizontal, in degrees.
    pub dip_deg: f64,
    /// Total band thickness (≈ `2·r_b` for small dips).
    pub band: f64,
    /// Vertical shift of the whole sample along z.
    pub center_z: f64,
}

impl Default for FracParams {
    fn default() -> Self {
        Self {
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
}

impl FracParams {
    /// Validate physical plausibility. Runs before any kernel session opens.
    pub fn validate(&self) -> Result<(), TopoError> {
        if self.lc <= 0.0 {
            return Err(TopoError::InvalidParams("lc must be positive".into()));
        }
        if self.lc_frac <= 0.0 {
            return Err(TopoError::InvalidParams("lc_frac must be positive".into()));
        }
        if self.length <= 0.0 {
            return Err(TopoError::InvalidParams("length must be positive".into()));
        }
        if self.height <= 0.0 {
            return Err(TopoError::InvalidParams("height must be positive".into()));
        }
        if self.thickness <= 0.0 {
            return Err(TopoError::InvalidParams(
                "thickness must be positive".into(),
            ));
        }
        if self.band < 0.0 {
            return Err(TopoError::InvalidParams(
                "band thickness must be non-negative".into(),
            ));
        }
        if self.band >= self.height {
            return Err(TopoError::InvalidParams(format!(
                "band thickness {} must be smaller than the domain height {}",
                self.band, self.height
            )));
        }
        if !self.dip_deg.is_finite() || !self.center_z.is_finite() {
            return Err(TopoError::InvalidParams(
                "dip_deg and center_z must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Closed-form derived scalars.
    pub fn derived(&self) -> Derived {
        let theta = self.dip_deg.to_radians();
        let dy = (self.length / 2.0) * theta.tan();
        let cos = theta.cos();
        // Near-vertical dip: the thickness projection blows up, so the band
        // half-width is defined as 0 instead (documented degenerate case).
        let r_b = if cos.abs() > COS_EPS {
            self.band / (2.0 * cos)
        } else {
            0.0
        };
        Derived {
            theta,
            dy,
            r_b,
            z_bot: self.center_z - self.thickness / 2.0,
            z_top: self.center_z + self.thickness / 2.0,
        }
    }
}

/// Scalars derived from [`FracParams`].
#[derive(Debug, Clone, Copy)]
pub struct Derived {
    /// Dip angle in radians.
    pub theta: f64,
    /// Vertical offset of the fracture mid-plane at `x = ±L/2`.
    pub dy: f64,
    /// Band half-width along the dip direction.
    pub r_b: f64,
    /// Bottom cap z.
    pub z_bot: f64,
    /// Top cap z.
    pub z_top: f64,
}
