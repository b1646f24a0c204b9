//! Closed-form point coordinates.
//!
//! Pure derivation: parameters in, 21 tagged `(position, mesh size)` points
//! out, in a fixed deterministic order. No iteration, no solver.

use crate::keys::{Cap, CornerXY, Layer, PointKey, SideX};
use crate::params::FracParams;
use crate::Point3;

/// A point with its symbolic key and target mesh size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedPoint {
    /// Symbolic name.
    pub key: PointKey,
    /// Position.
    pub pos: Point3,
    /// Target mesh size handed to the kernel.
    pub size: f64,
}

fn side_x(side: SideX, length: f64) -> f64 {
    match side {
        SideX::Left => -length / 2.0,
        SideX::Right => length / 2.0,
    }
}

fn corner_xy(xy: CornerXY, length: f64, height: f64) -> (f64, f64) {
    match xy {
        CornerXY::FrontLeft => (-length / 2.0, height / 2.0),
        CornerXY::FrontRight => (length / 2.0, height / 2.0),
        CornerXY::BackRight => (length / 2.0, -height / 2.0),
        CornerXY::BackLeft => (-length / 2.0, -height / 2.0),
    }
}

/// Derive all 21 points of the fractured cube.
///
/// Order: the 8 corners (bottom ring front-left clockwise, then the top
/// ring), then the band points per layer (mid, minus, plus; left-top,
/// right-top, left-bottom, right-bottom within each), then the center.
///
/// For `dip_deg = 0` the band mid-plane sits at `y = 0` on both sides; for
/// `band = 0` the three layer points per column coincide. Both are valid,
/// documented degeneracies.
pub fn derive_points(params: &FracParams) -> Vec<SizedPoint> {
    let d = params.derived();
    let cap_z = |cap: Cap| match cap {
        Cap::Bottom => d.z_bot,
        Cap::Top => d.z_top,
    };
    // The mid-plane dips across x: y = -dy on the left face, +dy on the
    // right face.
    let band_y = |side: SideX, layer: Layer| {
        let mid = match side {
            SideX::Left => -d.dy,
            SideX::Right => d.dy,
        };
        match layer {
            Layer::Minus => mid - d.r_b,
            Layer::Mid => mid,
            Layer::Plus => mid + d.r_b,
        }
    };

    let mut points = Vec::with_capacity(21);
    for cap in [Cap::Bottom, Cap::Top] {
        for xy in CornerXY::ALL {
            let (x, y) = corner_xy(xy, params.length, params.height);
            points.push(SizedPoint {
                key: PointKey::Corner { xy, cap },
                pos: Point3::new(x, y, cap_z(cap)),
                size: params.lc,
            });
        }
    }
    for layer in [Layer::Mid, Layer::Minus, Layer::Plus] {
        for (side, cap) in [
            (SideX::Left, Cap::Top),
            (SideX::Right, Cap::Top),
            (SideX::Left, Cap::Bottom),
            (SideX::Right, Cap::Bottom),
        ] {
            points.push(SizedPoint {
                key: PointKey::Band { side, layer, cap },
                pos: Point3::new(
                    side_x(side, params.length),
                    band_y(side, layer),
                    cap_z(cap),
                ),
                size: params.lc_frac,
            });
        }
    }
    points.push(SizedPoint {
        key: PointKey::Center,
        pos: Point3::new(0.0, 0.0, params.center_z),
        size: params.lc_frac,
    });
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn find(points: &[SizedPoint], key: PointKey) -> SizedPoint {
        *points.iter().find(|p| p.key == key).unwrap()
    }

    #[test]
    fn twenty_one_unique_points() {
        let points = derive_points(&FracParams::default());
        assert_eq!(points.len(), 21);
        let keys: HashSet<_> = points.iter().map(|p| p.key).collect();
        assert_eq!(keys.len(), 21);
    }

    #[test]
    fn corner_positions_and_sizes() {
        let points = derive_points(&FracParams::default());
        let fl = find(
            &points,
            PointKey::Corner {
                xy: CornerXY::FrontLeft,
                cap: Cap::Bottom,
            },
        );
        assert_relative_eq!(fl.pos.x, -2.0);
        assert_relative_eq!(fl.pos.y, 2.0);
        assert_relative_eq!(fl.pos.z, -2.0);
        assert_relative_eq!(fl.size, 1.0);
    }

    #[test]
    fn flat_band_is_symmetric_around_y0() {
        let points = derive_points(&FracParams::default());
        for side in [SideX::Left, SideX::Right] {
            let mid = find(
                &points,
                PointKey::Band {
                    side,
                    layer: Layer::Mid,
                    cap: Cap::Top,
                },
            );
            let minus = find(
                &points,
                PointKey::Band {
                    side,
                    layer: Layer::Minus,
                    cap: Cap::Top,
                },
            );
            let plus = find(
                &points,
                PointKey::Band {
                    side,
                    layer: Layer::Plus,
                    cap: Cap::Top,
                },
            );
            assert_relative_eq!(mid.pos.y, 0.0);
            assert_relative_eq!(minus.pos.y, -0.1);
            assert_relative_eq!(plus.pos.y, 0.1);
            assert_relative_eq!(mid.size, 0.2);
        }
    }

    #[test]
    fn dipping_band_offsets_sides_oppositely() {
        let params = FracParams {
            dip_deg: 30.0,
            ..Default::default()
        };
        let points = derive_points(&params);
        let left = find(
            &points,
            PointKey::Band {
                side: SideX::Left,
                layer: Layer::Mid,
                cap: Cap::Top,
            },
        );
        let right = find(
            &points,
            PointKey::Band {
                side: SideX::Right,
                layer: Layer::Mid,
                cap: Cap::Top,
            },
        );
        assert_relative_eq!(left.pos.y, -1.154_700_538_379_251_5, epsilon = 1e-9);
        assert_relative_eq!(right.pos.y, 1.154_700_538_379_251_5, epsilon = 1e-9);
    }

    #[test]
    fn zero_band_collapses_layers() {
        let params = FracParams {
            band: 0.0,
            ..Default::default()
        };
        let points = derive_points(&params);
        let minus = find(
            &points,
            PointKey::Band {
                side: SideX::Left,
                layer: Layer::Minus,
                cap: Cap::Top,
            },
        );
        let plus = find(
            &points,
            PointKey::Band {
                side: SideX::Left,
                layer: Layer::Plus,
                cap: Cap::Top,
            },
        );
        assert_relative_eq!(minus.pos.y, plus.pos.y);
    }

    #[test]
    fn center_follows_shift() {
        let params = FracParams {
            center_z: -100.0,
            ..Default::default()
        };
        let points = derive_points(&params);
        let c = find(&points, PointKey::Center);
        assert_relative_eq!(c.pos.z, -100.0);
        // Band sizing applies to the center point as well.
        assert_relative_eq!(c.size, 0.2);
    }
}
