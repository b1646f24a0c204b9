//! The static connectivity table of the fractured cube.
//!
//! The table never changes with the parameters: 21 points, 36 edges, 21
//! faces, 4 volumes. Only the point positions move. The incidence structure
//! encodes the partition into two matrix blocks and two band halves; the
//! [`Schema::check`] pass catches a malformed table before it ever reaches
//! the kernel, where wrong loop signs would mesh silently wrong geometry.

use std::collections::{HashMap, HashSet};

use crate::error::TopoError;
use crate::keys::{
    Cap, CornerXY, CutFace, EdgeKey, EndY, FaceKey, Half, Layer, OrientedEdge, PointKey, RimPos,
    SideX, Strip, VolumeKey,
};

/// A directed edge between two named points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDef {
    /// Symbolic name.
    pub key: EdgeKey,
    /// Start point.
    pub tail: PointKey,
    /// End point.
    pub head: PointKey,
}

/// A planar face bounded by a closed 4-edge loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceDef {
    /// Symbolic name.
    pub key: FaceKey,
    /// Signed boundary loop; consecutive entries chain head-to-tail.
    pub boundary: [OrientedEdge; 4],
}

/// A volume bounded by a closed 6-face shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDef {
    /// Symbolic name.
    pub key: VolumeKey,
    /// Watertight shell.
    pub shell: [FaceKey; 6],
}

/// The full topology table.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Point keys, in emission order.
    pub points: Vec<PointKey>,
    /// Edge table, in emission order.
    pub edges: Vec<EdgeDef>,
    /// Face table, in emission order.
    pub faces: Vec<FaceDef>,
    /// Volume table, in emission order.
    pub volumes: Vec<VolumeDef>,
}

fn corner(xy: CornerXY, cap: Cap) -> PointKey {
    PointKey::Corner { xy, cap }
}

fn band(side: SideX, layer: Layer, cap: Cap) -> PointKey {
    PointKey::Band { side, layer, cap }
}

fn rim(end: EndY, at: RimPos) -> EdgeKey {
    EdgeKey::Rim { end, at }
}

fn col(side: SideX, cap: Cap, strip: Strip) -> EdgeKey {
    EdgeKey::Column { side, cap, strip }
}

fn trace(layer: Layer, cap: Cap) -> EdgeKey {
    EdgeKey::Trace { layer, cap }
}

fn rail(layer: Layer, side: SideX) -> EdgeKey {
    EdgeKey::Rail { layer, side }
}

impl Schema {
    /// Build the fractured-cube schema.
    pub fn fractured_cube() -> Self {
        use Cap::{Bottom as B, Top as T};
        use CornerXY::{BackLeft as BL, BackRight as BR, FrontLeft as FL, FrontRight as FR};
        use EndY::{Back, Front};
        use Layer::{Mid, Minus, Plus};
        use SideX::{Left as L, Right as R};
        use Strip as St;

        let fwd = OrientedEdge::fwd;
        let rev = OrientedEdge::rev;

        let mut points = Vec::with_capacity(21);
        for cap in [B, T] {
            for xy in CornerXY::ALL {
                points.push(corner(xy, cap));
            }
        }
        for layer in [Mid, Minus, Plus] {
            for (side, cap) in [(L, T), (R, T), (L, B), (R, B)] {
                points.push(band(side, layer, cap));
            }
        }
        points.push(PointKey::Center);

        let e = |key, tail, head| EdgeDef { key, tail, head };
        let edges = vec![
            // End-face rims. The back rims run +x to -x on top and bottom;
            // the front rims the other way around.
            e(rim(Back, RimPos::Top), corner(BR, T), corner(BL, T)),
            e(rim(Back, RimPos::Right), corner(BR, T), corner(BR, B)),
            e(rim(Back, RimPos::Bottom), corner(BR, B), corner(BL, B)),
            e(rim(Back, RimPos::Left), corner(BL, B), corner(BL, T)),
            e(rim(Front, RimPos::Bottom), corner(FR, B), corner(FL, B)),
            e(rim(Front, RimPos::Left), corner(FL, B), corner(FL, T)),
            e(rim(Front, RimPos::Top), corner(FL, T), corner(FR, T)),
            e(rim(Front, RimPos::Right), corner(FR, T), corner(FR, B)),
            // Column segments. Right columns run back to front, left columns
            // front to back.
            e(col(R, T, St::Back), corner(BR, T), band(R, Minus, T)),
            e(col(R, T, St::Lower), band(R, Minus, T), band(R, Mid, T)),
            e(col(R, T, St::Upper), band(R, Mid, T), band(R, Plus, T)),
            e(col(R, T, St::Front), band(R, Plus, T), corner(FR, T)),
            e(col(L, T, St::Front), corner(FL, T), band(L, Plus, T)),
            e(col(L, T, St::Upper), band(L, Plus, T), band(L, Mid, T)),
            e(col(L, T, St::Lower), band(L, Mid, T), band(L, Minus, T)),
            e(col(L, T, St::Back), band(L, Minus, T), corner(BL, T)),
            e(col(R, B, St::Back), corner(BR, B), band(R, Minus, B)),
            e(col(R, B, St::Lower), band(R, Minus, B), band(R, Mid, B)),
            e(col(R, B, St::Upper), band(R, Mid, B), band(R, Plus, B)),
            e(col(R, B, St::Front), band(R, Plus, B), corner(FR, B)),
            e(col(L, B, St::Front), corner(FL, B), band(L, Plus, B)),
            e(col(L, B, St::Upper), band(L, Plus, B), band(L, Mid, B)),
            e(col(L, B, St::Lower), band(L, Mid, B), band(L, Minus, B)),
            e(col(L, B, St::Back), band(L, Minus, B), corner(BL, B)),
            // Band traces on the caps, all running left to right.
            e(trace(Minus, T), band(L, Minus, T), band(R, Minus, T)),
            e(trace(Mid, T), band(L, Mid, T), band(R, Mid, T)),
            e(trace(Plus, T), band(L, Plus, T), band(R, Plus, T)),
            // Band rails on the lateral faces.
            e(rail(Minus, L), band(L, Minus, T), band(L, Minus, B)),
            e(rail(Mid, L), band(L, Mid, T), band(L, Mid, B)),
            e(rail(Plus, L), band(L, Plus, T), band(L, Plus, B)),
            e(trace(Minus, B), band(L, Minus, B), band(R, Minus, B)),
            e(trace(Mid, B), band(L, Mid, B), band(R, Mid, B)),
            e(trace(Plus, B), band(L, Plus, B), band(R, Plus, B)),
            e(rail(Minus, R), band(R, Minus, B), band(R, Minus, T)),
            e(rail(Mid, R), band(R, Mid, T), band(R, Mid, B)),
            e(rail(Plus, R), band(R, Plus, T), band(R, Plus, B)),
        ];

        let f = |key, boundary| FaceDef { key, boundary };
        let faces = vec![
            f(
                FaceKey::End(Front),
                [
                    fwd(rim(Front, RimPos::Right)),
                    fwd(rim(Front, RimPos::Bottom)),
                    fwd(rim(Front, RimPos::Left)),
                    fwd(rim(Front, RimPos::Top)),
                ],
            ),
            f(
                FaceKey::End(Back),
                [
                    fwd(rim(Back, RimPos::Bottom)),
                    fwd(rim(Back, RimPos::Left)),
                    rev(rim(Back, RimPos::Top)),
                    fwd(rim(Back, RimPos::Right)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Left,
                    strip: St::Front,
                },
                [
                    fwd(col(L, T, St::Front)),
                    fwd(rail(Plus, L)),
                    rev(col(L, B, St::Front)),
                    fwd(rim(Front, RimPos::Left)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Left,
                    strip: St::Upper,
                },
                [
                    fwd(rail(Plus, L)),
                    fwd(col(L, B, St::Upper)),
                    rev(rail(Mid, L)),
                    rev(col(L, T, St::Upper)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Left,
                    strip: St::Lower,
                },
                [
                    fwd(col(L, T, St::Lower)),
                    fwd(rail(Minus, L)),
                    rev(col(L, B, St::Lower)),
                    rev(rail(Mid, L)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Left,
                    strip: St::Back,
                },
                [
                    fwd(col(L, B, St::Back)),
                    fwd(rim(Back, RimPos::Left)),
                    rev(col(L, T, St::Back)),
                    fwd(rail(Minus, L)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Right,
                    strip: St::Front,
                },
                [
                    fwd(rim(Front, RimPos::Right)),
                    rev(col(R, B, St::Front)),
                    rev(rail(Plus, R)),
                    fwd(col(R, T, St::Front)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Right,
                    strip: St::Upper,
                },
                [
                    fwd(rail(Plus, R)),
                    rev(col(R, B, St::Upper)),
                    rev(rail(Mid, R)),
                    fwd(col(R, T, St::Upper)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Right,
                    strip: St::Lower,
                },
                [
                    fwd(rail(Mid, R)),
                    rev(col(R, B, St::Lower)),
                    fwd(rail(Minus, R)),
                    fwd(col(R, T, St::Lower)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Right,
                    strip: St::Back,
                },
                [
                    fwd(col(R, B, St::Back)),
                    fwd(rail(Minus, R)),
                    rev(col(R, T, St::Back)),
                    fwd(rim(Back, RimPos::Right)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Top,
                    strip: St::Front,
                },
                [
                    fwd(rim(Front, RimPos::Top)),
                    rev(col(R, T, St::Front)),
                    rev(trace(Plus, T)),
                    rev(col(L, T, St::Front)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Top,
                    strip: St::Upper,
                },
                [
                    fwd(trace(Plus, T)),
                    rev(col(R, T, St::Upper)),
                    rev(trace(Mid, T)),
                    rev(col(L, T, St::Upper)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Top,
                    strip: St::Lower,
                },
                [
                    fwd(col(L, T, St::Lower)),
                    fwd(trace(Minus, T)),
                    fwd(col(R, T, St::Lower)),
                    rev(trace(Mid, T)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Top,
                    strip: St::Back,
                },
                [
                    fwd(col(R, T, St::Back)),
                    rev(trace(Minus, T)),
                    fwd(col(L, T, St::Back)),
                    rev(rim(Back, RimPos::Top)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Bottom,
                    strip: St::Back,
                },
                [
                    fwd(rim(Back, RimPos::Bottom)),
                    rev(col(L, B, St::Back)),
                    fwd(trace(Minus, B)),
                    rev(col(R, B, St::Back)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Bottom,
                    strip: St::Lower,
                },
                [
                    fwd(trace(Minus, B)),
                    fwd(col(R, B, St::Lower)),
                    rev(trace(Mid, B)),
                    fwd(col(L, B, St::Lower)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Bottom,
                    strip: St::Upper,
                },
                [
                    fwd(col(R, B, St::Upper)),
                    rev(trace(Plus, B)),
                    fwd(col(L, B, St::Upper)),
                    fwd(trace(Mid, B)),
                ],
            ),
            f(
                FaceKey::Panel {
                    face: CutFace::Bottom,
                    strip: St::Front,
                },
                [
                    fwd(col(L, B, St::Front)),
                    fwd(trace(Plus, B)),
                    fwd(col(R, B, St::Front)),
                    fwd(rim(Front, RimPos::Bottom)),
                ],
            ),
            f(
                FaceKey::Band(Plus),
                [
                    fwd(trace(Plus, B)),
                    rev(rail(Plus, R)),
                    rev(trace(Plus, T)),
                    fwd(rail(Plus, L)),
                ],
            ),
            f(
                FaceKey::Band(Mid),
                [
                    fwd(rail(Mid, L)),
                    fwd(trace(Mid, B)),
                    rev(rail(Mid, R)),
                    rev(trace(Mid, T)),
                ],
            ),
            f(
                FaceKey::Band(Minus),
                [
                    fwd(trace(Minus, T)),
                    rev(rail(Minus, R)),
                    rev(trace(Minus, B)),
                    rev(rail(Minus, L)),
                ],
            ),
        ];

        let panel = |face, strip| FaceKey::Panel { face, strip };
        let volumes = vec![
            VolumeDef {
                key: VolumeKey::Matrix(Front),
                shell: [
                    panel(CutFace::Bottom, St::Front),
                    panel(CutFace::Left, St::Front),
                    panel(CutFace::Top, St::Front),
                    FaceKey::End(Front),
                    panel(CutFace::Right, St::Front),
                    FaceKey::Band(Plus),
                ],
            },
            VolumeDef {
                key: VolumeKey::Matrix(Back),
                shell: [
                    panel(CutFace::Bottom, St::Back),
                    FaceKey::End(Back),
                    panel(CutFace::Left, St::Back),
                    panel(CutFace::Top, St::Back),
                    panel(CutFace::Right, St::Back),
                    FaceKey::Band(Minus),
                ],
            },
            VolumeDef {
                key: VolumeKey::BandHalf(Half::Upper),
                shell: [
                    panel(CutFace::Right, St::Upper),
                    panel(CutFace::Bottom, St::Upper),
                    panel(CutFace::Left, St::Upper),
                    panel(CutFace::Top, St::Upper),
                    FaceKey::Band(Plus),
                    FaceKey::Band(Mid),
                ],
            },
            VolumeDef {
                key: VolumeKey::BandHalf(Half::Lower),
                shell: [
                    FaceKey::Band(Mid),
                    FaceKey::Band(Minus),
                    panel(CutFace::Bottom, St::Lower),
                    panel(CutFace::Right, St::Lower),
                    panel(CutFace::Top, St::Lower),
                    panel(CutFace::Left, St::Lower),
                ],
            },
        ];

        Self {
            points,
            edges,
            faces,
            volumes,
        }
    }

    /// Directed endpoints of an edge.
    pub fn edge_endpoints(&self, key: EdgeKey) -> Option<(PointKey, PointKey)> {
        self.edges
            .iter()
            .find(|e| e.key == key)
            .map(|e| (e.tail, e.head))
    }

    /// Faces meshed as structured quad grids (and recombined): the three
    /// band cross-sections plus the Upper/Lower panels adjacent to the band
    /// on all four cut faces. End faces and far panels stay unstructured.
    pub fn transfinite_faces(&self) -> Vec<FaceKey> {
        let mut out = Vec::with_capacity(11);
        for strip in [Strip::Upper, Strip::Lower] {
            for face in CutFace::ALL {
                out.push(FaceKey::Panel { face, strip });
            }
        }
        for layer in [Layer::Plus, Layer::Mid, Layer::Minus] {
            out.push(FaceKey::Band(layer));
        }
        out
    }

    /// Volumes meshed as transfinite hexahedra: the two band halves. The
    /// band is thin, so free tetrahedra there would degenerate.
    pub fn transfinite_volumes(&self) -> Vec<VolumeKey> {
        vec![
            VolumeKey::BandHalf(Half::Upper),
            VolumeKey::BandHalf(Half::Lower),
        ]
    }

    /// Verify the incidence invariants. Runs before any kernel call; a
    /// failure here is a defect in the table itself.
    pub fn check(&self) -> Result<(), TopoError> {
        let point_set: HashSet<_> = self.points.iter().copied().collect();
        if point_set.len() != self.points.len() {
            return Err(TopoError::Inconsistent("duplicate point key".into()));
        }

        let mut endpoints = HashMap::new();
        for edge in &self.edges {
            if edge.tail == edge.head {
                return Err(TopoError::Inconsistent(format!(
                    "edge {:?} is a self-loop",
                    edge.key
                )));
            }
            for p in [edge.tail, edge.head] {
                if !point_set.contains(&p) {
                    return Err(TopoError::Inconsistent(format!(
                        "edge {:?} references unknown point {:?}",
                        edge.key, p
                    )));
                }
            }
            if endpoints.insert(edge.key, (edge.tail, edge.head)).is_some() {
                return Err(TopoError::Inconsistent(format!(
                    "duplicate edge key {:?}",
                    edge.key
                )));
            }
        }

        let mut face_keys = HashSet::new();
        let mut edge_face_uses: HashMap<EdgeKey, usize> = HashMap::new();
        for face in &self.faces {
            if !face_keys.insert(face.key) {
                return Err(TopoError::Inconsistent(format!(
                    "duplicate face key {:?}",
                    face.key
                )));
            }
            for (i, oe) in face.boundary.iter().enumerate() {
                let (_, head) = directed(&endpoints, *oe).ok_or_else(|| {
                    TopoError::Inconsistent(format!(
                        "face {:?} references unknown edge {:?}",
                        face.key, oe.key
                    ))
                })?;
                let next = face.boundary[(i + 1) % face.boundary.len()];
                let (next_tail, _) = directed(&endpoints, next).ok_or_else(|| {
                    TopoError::Inconsistent(format!(
                        "face {:?} references unknown edge {:?}",
                        face.key, next.key
                    ))
                })?;
                if head != next_tail {
                    return Err(TopoError::Inconsistent(format!(
                        "face {:?} loop breaks between {:?} and {:?}",
                        face.key, oe.key, next.key
                    )));
                }
                *edge_face_uses.entry(oe.key).or_default() += 1;
            }
        }
        for edge in &self.edges {
            let n = edge_face_uses.get(&edge.key).copied().unwrap_or(0);
            if n < 2 {
                return Err(TopoError::Inconsistent(format!(
                    "edge {:?} bounds only {} face(s)",
                    edge.key, n
                )));
            }
        }

        let mut face_shell_uses: HashMap<FaceKey, usize> = HashMap::new();
        let mut volume_keys = HashSet::new();
        for volume in &self.volumes {
            if !volume_keys.insert(volume.key) {
                return Err(TopoError::Inconsistent(format!(
                    "duplicate volume key {:?}",
                    volume.key
                )));
            }
            // Watertightness: inside one shell every edge must be shared by
            // exactly two of its six faces.
            let mut shell_edge_uses: HashMap<EdgeKey, usize> = HashMap::new();
            for fk in &volume.shell {
                let face = self.faces.iter().find(|f| f.key == *fk).ok_or_else(|| {
                    TopoError::Inconsistent(format!(
                        "volume {:?} references unknown face {:?}",
                        volume.key, fk
                    ))
                })?;
                *face_shell_uses.entry(*fk).or_default() += 1;
                for oe in &face.boundary {
                    *shell_edge_uses.entry(oe.key).or_default() += 1;
                }
            }
            if let Some((k, n)) = shell_edge_uses.iter().find(|(_, n)| **n != 2) {
                return Err(TopoError::Inconsistent(format!(
                    "shell of {:?} is not watertight: edge {:?} used {} time(s)",
                    volume.key, k, n
                )));
            }
        }
        for face in &self.faces {
            let n = face_shell_uses.get(&face.key).copied().unwrap_or(0);
            let internal = matches!(face.key, FaceKey::Band(_));
            let expected = if internal { 2 } else { 1 };
            if n != expected {
                return Err(TopoError::Inconsistent(format!(
                    "face {:?} appears in {} shell(s), expected {}",
                    face.key, n, expected
                )));
            }
        }

        Ok(())
    }
}

fn directed(
    endpoints: &HashMap<EdgeKey, (PointKey, PointKey)>,
    oe: OrientedEdge,
) -> Option<(PointKey, PointKey)> {
    let (tail, head) = *endpoints.get(&oe.key)?;
    if oe.reversed {
        Some((head, tail))
    } else {
        Some((tail, head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_counts() {
        let s = Schema::fractured_cube();
        assert_eq!(s.points.len(), 21);
        assert_eq!(s.edges.len(), 36);
        assert_eq!(s.faces.len(), 21);
        assert_eq!(s.volumes.len(), 4);
    }

    #[test]
    fn shipped_schema_is_consistent() {
        Schema::fractured_cube().check().unwrap();
    }

    #[test]
    fn band_faces_are_the_only_internal_faces() {
        let s = Schema::fractured_cube();
        let mut uses: HashMap<FaceKey, usize> = HashMap::new();
        for v in &s.volumes {
            for fk in &v.shell {
                *uses.entry(*fk).or_default() += 1;
            }
        }
        assert_eq!(uses.values().sum::<usize>(), 24);
        for (fk, n) in uses {
            match fk {
                FaceKey::Band(_) => assert_eq!(n, 2, "{fk:?}"),
                _ => assert_eq!(n, 1, "{fk:?}"),
            }
        }
    }

    #[test]
    fn band_halves_share_only_the_mid_plane() {
        let s = Schema::fractured_cube();
        let shell_of = |key: VolumeKey| {
            s.volumes
                .iter()
                .find(|v| v.key == key)
                .unwrap()
                .shell
                .iter()
                .copied()
                .collect::<HashSet<_>>()
        };
        let upper = shell_of(VolumeKey::BandHalf(Half::Upper));
        let lower = shell_of(VolumeKey::BandHalf(Half::Lower));
        let shared: Vec<_> = upper.intersection(&lower).collect();
        assert_eq!(shared, vec![&FaceKey::Band(Layer::Mid)]);
    }

    #[test]
    fn corrupted_loop_sign_fails_check() {
        let mut s = Schema::fractured_cube();
        s.faces[0].boundary[1].reversed = !s.faces[0].boundary[1].reversed;
        assert!(matches!(
            s.check().unwrap_err(),
            TopoError::Inconsistent(_)
        ));
    }

    #[test]
    fn dropped_volume_face_fails_check() {
        let mut s = Schema::fractured_cube();
        // Swap one shell face for a face already present: no longer watertight.
        s.volumes[0].shell[0] = s.volumes[0].shell[1];
        assert!(s.check().is_err());
    }

    #[test]
    fn transfinite_sets() {
        let s = Schema::fractured_cube();
        let faces = s.transfinite_faces();
        assert_eq!(faces.len(), 11);
        assert!(faces.contains(&FaceKey::Band(Layer::Mid)));
        assert!(faces.contains(&FaceKey::Panel {
            face: CutFace::Left,
            strip: Strip::Upper
        }));
        assert!(!faces.contains(&FaceKey::End(EndY::Front)));
        assert!(!faces.contains(&FaceKey::Panel {
            face: CutFace::Left,
            strip: Strip::Front
        }));
        assert_eq!(s.transfinite_volumes().len(), 2);
    }

    #[test]
    fn column_segments_chain_along_each_column() {
        let s = Schema::fractured_cube();
        // Left columns run front corner -> plus -> mid -> minus -> back corner.
        let (tail, head) = s
            .edge_endpoints(EdgeKey::Column {
                side: SideX::Left,
                cap: Cap::Top,
                strip: Strip::Upper,
            })
            .unwrap();
        assert_eq!(
            tail,
            PointKey::Band {
                side: SideX::Left,
                layer: Layer::Plus,
                cap: Cap::Top
            }
        );
        assert_eq!(
            head,
            PointKey::Band {
                side: SideX::Left,
                layer: Layer::Mid,
                cap: Cap::Top
            }
        );
    }
}
