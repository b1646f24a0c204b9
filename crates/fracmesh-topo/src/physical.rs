//! Solver-facing physical groups.
//!
//! Named subsets of entities, attached after kernel synchronization and
//! consumed downstream to bind boundary conditions and material regions.
//! The two band halves are meshed as separate transfinite volumes for
//! element quality but exposed as the single `FRAC` material region.

use crate::keys::{
    Cap, CornerXY, CutFace, EdgeKey, EndY, FaceKey, Half, Layer, PointKey, RimPos, SideX, Strip,
    VolumeKey,
};

/// Entities of one physical group (all of one dimension).
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalEntities {
    /// 0-dimensional group.
    Points(Vec<PointKey>),
    /// 1-dimensional group.
    Edges(Vec<EdgeKey>),
    /// 2-dimensional group.
    Faces(Vec<FaceKey>),
    /// 3-dimensional group.
    Volumes(Vec<VolumeKey>),
}

/// A named physical group.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalDef {
    /// Solver-facing name, unique per dimension.
    pub name: &'static str,
    /// The entities the group covers.
    pub entities: PhysicalEntities,
}

fn group(name: &'static str, entities: PhysicalEntities) -> PhysicalDef {
    PhysicalDef { name, entities }
}

/// The full tag table, in emission order (volumes, faces, edges, points).
pub fn physical_groups() -> Vec<PhysicalDef> {
    use PhysicalEntities::{Edges, Faces, Points, Volumes};

    let side_panels = |face: CutFace| {
        Faces(
            Strip::ALL
                .iter()
                .map(|&strip| FaceKey::Panel { face, strip })
                .collect(),
        )
    };
    let bottom_columns = |side: SideX| {
        Edges(
            Strip::ALL
                .iter()
                .map(|&strip| EdgeKey::Column {
                    side,
                    cap: Cap::Bottom,
                    strip,
                })
                .collect(),
        )
    };
    let bottom_corner = |xy: CornerXY| {
        Points(vec![PointKey::Corner {
            xy,
            cap: Cap::Bottom,
        }])
    };

    vec![
        group("MATRIX_TOP", Volumes(vec![VolumeKey::Matrix(EndY::Front)])),
        group(
            "MATRIX_BOTTOM",
            Volumes(vec![VolumeKey::Matrix(EndY::Back)]),
        ),
        group(
            "FRAC",
            Volumes(vec![
                VolumeKey::BandHalf(Half::Upper),
                VolumeKey::BandHalf(Half::Lower),
            ]),
        ),
        group("F_FRONT", Faces(vec![FaceKey::End(EndY::Front)])),
        group("F_BACK", Faces(vec![FaceKey::End(EndY::Back)])),
        group("F_LEFT", side_panels(CutFace::Left)),
        group("F_RIGHT", side_panels(CutFace::Right)),
        group("F_TOP", side_panels(CutFace::Top)),
        group("F_BOTTOM", side_panels(CutFace::Bottom)),
        group("F_FRAC_U", Faces(vec![FaceKey::Band(Layer::Plus)])),
        group("F_FRAC_M", Faces(vec![FaceKey::Band(Layer::Mid)])),
        group("F_FRAC_L", Faces(vec![FaceKey::Band(Layer::Minus)])),
        group(
            "L_BOT_FRONT",
            Edges(vec![EdgeKey::Rim {
                end: EndY::Front,
                at: RimPos::Bottom,
            }]),
        ),
        group(
            "L_BOT_BACK",
            Edges(vec![EdgeKey::Rim {
                end: EndY::Back,
                at: RimPos::Bottom,
            }]),
        ),
        group("L_BOT_RIGHT", bottom_columns(SideX::Right)),
        group("L_BOT_LEFT", bottom_columns(SideX::Left)),
        group("CENTER", Points(vec![PointKey::Center])),
        group("P_BOT_FL", bottom_corner(CornerXY::FrontLeft)),
        group("P_BOT_FR", bottom_corner(CornerXY::FrontRight)),
        group("P_BOT_BR", bottom_corner(CornerXY::BackRight)),
        group("P_BOT_BL", bottom_corner(CornerXY::BackLeft)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use std::collections::HashSet;

    #[test]
    fn names_unique_per_dimension() {
        let groups = physical_groups();
        let mut seen: HashSet<(u8, &str)> = HashSet::new();
        for g in &groups {
            let dim = match g.entities {
                PhysicalEntities::Points(_) => 0,
                PhysicalEntities::Edges(_) => 1,
                PhysicalEntities::Faces(_) => 2,
                PhysicalEntities::Volumes(_) => 3,
            };
            assert!(seen.insert((dim, g.name)), "duplicate name {}", g.name);
        }
        assert_eq!(groups.len(), 21);
    }

    #[test]
    fn no_group_is_empty() {
        for g in physical_groups() {
            let n = match &g.entities {
                PhysicalEntities::Points(v) => v.len(),
                PhysicalEntities::Edges(v) => v.len(),
                PhysicalEntities::Faces(v) => v.len(),
                PhysicalEntities::Volumes(v) => v.len(),
            };
            assert!(n > 0, "{} is empty", g.name);
        }
    }

    #[test]
    fn every_referenced_entity_exists_in_the_schema() {
        let s = Schema::fractured_cube();
        let points: HashSet<_> = s.points.iter().copied().collect();
        let edges: HashSet<_> = s.edges.iter().map(|e| e.key).collect();
        let faces: HashSet<_> = s.faces.iter().map(|f| f.key).collect();
        let volumes: HashSet<_> = s.volumes.iter().map(|v| v.key).collect();
        for g in physical_groups() {
            match &g.entities {
                PhysicalEntities::Points(v) => {
                    assert!(v.iter().all(|k| points.contains(k)), "{}", g.name)
                }
                PhysicalEntities::Edges(v) => {
                    assert!(v.iter().all(|k| edges.contains(k)), "{}", g.name)
                }
                PhysicalEntities::Faces(v) => {
                    assert!(v.iter().all(|k| faces.contains(k)), "{}", g.name)
                }
                PhysicalEntities::Volumes(v) => {
                    assert!(v.iter().all(|k| volumes.contains(k)), "{}", g.name)
                }
            }
        }
    }

    #[test]
    fn frac_region_merges_both_halves() {
        let frac = physical_groups()
            .into_iter()
            .find(|g| g.name == "FRAC")
            .unwrap();
        assert_eq!(
            frac.entities,
            PhysicalEntities::Volumes(vec![
                VolumeKey::BandHalf(Half::Upper),
                VolumeKey::BandHalf(Half::Lower),
            ])
        );
    }

    #[test]
    fn side_regions_aggregate_all_four_panels() {
        let left = physical_groups()
            .into_iter()
            .find(|g| g.name == "F_LEFT")
            .unwrap();
        match left.entities {
            PhysicalEntities::Faces(v) => assert_eq!(v.len(), 4),
            _ => panic!("F_LEFT must be a surface group"),
        }
    }
}
