/// Hazard classification and hierarchical aggregation.
///
/// A soil-water-index value is classified against a mesh's three
/// ascending boundaries into a 4-level hazard code; container timelines
/// (area, secondary subdivision, prefecture) are the pointwise maximum
/// over their member meshes. Aggregation is index-aligned: the first
/// mesh's timeline dictates the container timeline's length, and meshes
/// whose timeline is shorter (or empty — the "no data" case) simply
/// contribute nothing at the missing indices.

use crate::geometry::{Mesh, Prefecture};
use crate::model::{RISK_ADVISORY, RISK_DISASTER, RISK_NONE, RISK_WARNING, RiskPoint, TimePoint};

/// Classifies one soil-water-index value against ascending boundaries.
///
/// The `9999` sentinel disables a level: realistic index values can
/// never reach it.
pub fn classify(value: f64, advisory: i32, warning: i32, disaster: i32) -> u8 {
    if value >= f64::from(disaster) {
        RISK_DISASTER
    } else if value >= f64::from(warning) {
        RISK_WARNING
    } else if value >= f64::from(advisory) {
        RISK_ADVISORY
    } else {
        RISK_NONE
    }
}

fn classify_for(mesh: &Mesh, value: f64) -> u8 {
    classify(value, mesh.advisory_bound, mesh.warning_bound, mesh.disaster_bound)
}

/// Pointwise-maximum risk timeline over a set of meshes, driven by their
/// 3-hourly soil-water-index series.
pub fn aggregate_risk(meshes: &[&Mesh]) -> Vec<RiskPoint> {
    let Some(first) = meshes.first() else {
        return Vec::new();
    };
    first
        .swi_timeline
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut level = RISK_NONE;
            for mesh in meshes {
                if let Some(p) = mesh.swi_timeline.get(i) {
                    level = level.max(classify_for(mesh, p.value));
                }
            }
            RiskPoint { lead_hours: point.lead_hours, level }
        })
        .collect()
}

/// Pointwise-maximum 3-hourly rainfall over a set of meshes, rounded to
/// whole millimetres (the reporting convention for container rainfall).
pub fn aggregate_rain(meshes: &[&Mesh]) -> Vec<TimePoint> {
    let Some(first) = meshes.first() else {
        return Vec::new();
    };
    first
        .rain_timeline
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut value: f64 = 0.0;
            for mesh in meshes {
                if let Some(p) = mesh.rain_timeline.get(i) {
                    value = value.max(p.value);
                }
            }
            TimePoint { lead_hours: point.lead_hours, value: value.round() }
        })
        .collect()
}

/// Derives a mesh's own risk series from its hourly soil-water index:
/// the pointwise hourly classification, and per 3-hour block the maximum
/// hourly level, reported at the block end.
pub fn attach_mesh_risk(mesh: &mut Mesh) {
    mesh.risk_hourly_timeline = mesh
        .swi_hourly_timeline
        .iter()
        .map(|p| RiskPoint { lead_hours: p.lead_hours, level: classify_for(mesh, p.value) })
        .collect();

    let mut blocks: Vec<RiskPoint> = Vec::new();
    for point in &mesh.risk_hourly_timeline {
        if point.lead_hours <= 0 {
            continue;
        }
        // Hours 1..3 belong to the block ending at 3, and so on.
        let block_end = (point.lead_hours + 2) / 3 * 3;
        match blocks.last_mut() {
            Some(last) if last.lead_hours == block_end => {
                last.level = last.level.max(point.level);
            }
            _ => blocks.push(RiskPoint { lead_hours: block_end, level: point.level }),
        }
    }
    mesh.risk_3h_max_timeline = blocks;
}

/// Runs the full classification pass over the hierarchy: mesh-level risk
/// series, then area, subdivision and prefecture aggregates.
pub fn evaluate(prefectures: &mut [Prefecture]) {
    for prefecture in prefectures {
        for area in &mut prefecture.areas {
            for mesh in &mut area.meshes {
                attach_mesh_risk(mesh);
            }
            let members: Vec<&Mesh> = area.meshes.iter().collect();
            area.risk_timeline = aggregate_risk(&members);
            area.rain_timeline = aggregate_rain(&members);
        }

        let Prefecture { areas, subdivisions, risk_timeline, .. } = prefecture;
        for subdivision in subdivisions.iter_mut() {
            let members: Vec<&Mesh> = areas
                .iter()
                .filter(|a| subdivision.area_names.contains(&a.name))
                .flat_map(|a| a.meshes.iter())
                .collect();
            subdivision.risk_timeline = aggregate_risk(&members);
            subdivision.rain_timeline = aggregate_rain(&members);
        }

        let members: Vec<&Mesh> = areas.iter().flat_map(|a| a.meshes.iter()).collect();
        *risk_timeline = aggregate_risk(&members);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Area;
    use crate::model::{NEVER_TRIGGER, TimePoint};

    fn mesh_with_swi(advisory: i32, warning: i32, disaster: i32, values: &[f64]) -> Mesh {
        let mut mesh = Mesh::new("52352679", advisory, warning, disaster);
        mesh.swi_timeline = values
            .iter()
            .enumerate()
            .map(|(i, &v)| TimePoint { lead_hours: 3 * i as i32, value: v })
            .collect();
        mesh
    }

    // --- classify ------------------------------------------------------------

    #[test]
    fn test_classify_levels_in_order() {
        assert_eq!(classify(50.0, 91, 115, 131), RISK_NONE);
        assert_eq!(classify(91.0, 91, 115, 131), RISK_ADVISORY);
        assert_eq!(classify(115.0, 91, 115, 131), RISK_WARNING);
        assert_eq!(classify(200.0, 91, 115, 131), RISK_DISASTER);
    }

    #[test]
    fn test_classify_boundaries_are_inclusive() {
        assert_eq!(classify(131.0, 91, 115, 131), RISK_DISASTER);
        assert_eq!(classify(130.999, 91, 115, 131), RISK_WARNING);
    }

    #[test]
    fn test_classify_is_monotonic_in_the_value() {
        let mut previous = RISK_NONE;
        for i in 0..2000 {
            let level = classify(f64::from(i) * 0.1, 91, 115, 131);
            assert!(level >= previous, "level dropped at value {}", f64::from(i) * 0.1);
            previous = level;
        }
    }

    #[test]
    fn test_sentinel_boundary_never_triggers() {
        let sentinel = NEVER_TRIGGER;
        assert_eq!(classify(500.0, sentinel, sentinel, sentinel), RISK_NONE);
        // A mesh with only the disaster level disabled still warns.
        assert_eq!(classify(500.0, 91, 115, sentinel), RISK_WARNING);
    }

    // --- aggregation ---------------------------------------------------------

    #[test]
    fn test_aggregate_takes_the_pointwise_maximum() {
        let quiet = mesh_with_swi(91, 115, 131, &[10.0, 10.0, 10.0]);
        let rising = mesh_with_swi(91, 115, 131, &[10.0, 95.0, 140.0]);
        let timeline = aggregate_risk(&[&quiet, &rising]);

        assert_eq!(
            timeline,
            vec![
                RiskPoint { lead_hours: 0, level: RISK_NONE },
                RiskPoint { lead_hours: 3, level: RISK_ADVISORY },
                RiskPoint { lead_hours: 6, level: RISK_DISASTER },
            ]
        );
    }

    #[test]
    fn test_aggregate_matches_explicit_maximum_over_random_sets() {
        // Pseudo-random mesh sets (fixed seed, multiplicative generator);
        // the aggregate at every index must equal the explicit maximum.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..20 {
            let mesh_count = 1 + (next() % 5) as usize;
            let meshes: Vec<Mesh> = (0..mesh_count)
                .map(|_| {
                    let values: Vec<f64> = (0..4).map(|_| (next() % 160) as f64).collect();
                    mesh_with_swi(91, 115, 131, &values)
                })
                .collect();
            let refs: Vec<&Mesh> = meshes.iter().collect();
            let timeline = aggregate_risk(&refs);

            for (i, point) in timeline.iter().enumerate() {
                let expected = refs
                    .iter()
                    .map(|m| {
                        m.swi_timeline
                            .get(i)
                            .map_or(RISK_NONE, |p| classify_for(m, p.value))
                    })
                    .max()
                    .unwrap_or(RISK_NONE);
                assert_eq!(point.level, expected, "index {}", i);
            }
        }
    }

    #[test]
    fn test_aggregate_excludes_meshes_with_no_data() {
        let live = mesh_with_swi(91, 115, 131, &[120.0, 120.0]);
        let skipped = mesh_with_swi(91, 115, 131, &[]); // outside the grid
        let timeline = aggregate_risk(&[&live, &skipped]);
        assert_eq!(timeline.len(), 2);
        assert!(timeline.iter().all(|p| p.level == RISK_WARNING));
    }

    #[test]
    fn test_aggregate_length_follows_the_first_mesh() {
        let short = mesh_with_swi(91, 115, 131, &[10.0]);
        let long = mesh_with_swi(91, 115, 131, &[10.0, 140.0, 140.0]);
        assert_eq!(aggregate_risk(&[&short, &long]).len(), 1);
        assert_eq!(aggregate_risk(&[&long, &short]).len(), 3);
    }

    #[test]
    fn test_aggregate_of_nothing_is_empty() {
        assert!(aggregate_risk(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_rain_rounds_the_maximum() {
        let mut a = Mesh::new("52352679", 91, 115, 131);
        a.rain_timeline = vec![TimePoint { lead_hours: 3, value: 2.4 }];
        let mut b = Mesh::new("52352689", 91, 115, 131);
        b.rain_timeline = vec![TimePoint { lead_hours: 3, value: 2.6 }];

        let timeline = aggregate_rain(&[&a, &b]);
        assert_eq!(timeline, vec![TimePoint { lead_hours: 3, value: 3.0 }]);
    }

    // --- mesh-level risk series ----------------------------------------------

    #[test]
    fn test_mesh_hourly_risk_and_block_maximum() {
        let mut mesh = Mesh::new("52352679", 91, 115, 131);
        mesh.swi_hourly_timeline = vec![
            TimePoint { lead_hours: 0, value: 50.0 },
            TimePoint { lead_hours: 1, value: 95.0 },
            TimePoint { lead_hours: 2, value: 120.0 },
            TimePoint { lead_hours: 3, value: 95.0 },
            TimePoint { lead_hours: 4, value: 50.0 },
            TimePoint { lead_hours: 5, value: 50.0 },
            TimePoint { lead_hours: 6, value: 135.0 },
        ];
        attach_mesh_risk(&mut mesh);

        assert_eq!(mesh.risk_hourly_timeline.len(), 7);
        assert_eq!(mesh.risk_hourly_timeline[0].level, RISK_NONE);
        assert_eq!(mesh.risk_hourly_timeline[2].level, RISK_WARNING);

        // Block 3h: max of hours 1..3 = warning; block 6h: disaster.
        assert_eq!(
            mesh.risk_3h_max_timeline,
            vec![
                RiskPoint { lead_hours: 3, level: RISK_WARNING },
                RiskPoint { lead_hours: 6, level: RISK_DISASTER },
            ]
        );
    }

    // --- hierarchy pass ------------------------------------------------------

    #[test]
    fn test_evaluate_fills_every_container_level() {
        let mut area_a = Area {
            name: "A".into(),
            meshes: vec![mesh_with_swi(91, 115, 131, &[120.0, 120.0])],
            risk_timeline: Vec::new(),
            rain_timeline: Vec::new(),
        };
        area_a.meshes[0].rain_timeline = vec![TimePoint { lead_hours: 3, value: 5.0 }];
        let area_b = Area {
            name: "B".into(),
            meshes: vec![mesh_with_swi(91, 115, 131, &[10.0, 140.0])],
            risk_timeline: Vec::new(),
            rain_timeline: Vec::new(),
        };
        let mut prefectures = vec![Prefecture {
            name: "Test".into(),
            code: "99".into(),
            areas: vec![area_a, area_b],
            subdivisions: vec![crate::geometry::SecondarySubdivision {
                name: "South".into(),
                area_names: vec!["B".into()],
                risk_timeline: Vec::new(),
                rain_timeline: Vec::new(),
            }],
            risk_timeline: Vec::new(),
        }];

        evaluate(&mut prefectures);

        let pref = &prefectures[0];
        assert_eq!(pref.areas[0].risk_timeline[0].level, RISK_WARNING);
        assert_eq!(pref.areas[1].risk_timeline[1].level, RISK_DISASTER);
        // The subdivision covers only area B.
        assert_eq!(pref.subdivisions[0].risk_timeline[0].level, RISK_NONE);
        assert_eq!(pref.subdivisions[0].risk_timeline[1].level, RISK_DISASTER);
        // The prefecture covers everything.
        assert_eq!(pref.risk_timeline[0].level, RISK_WARNING);
        assert_eq!(pref.risk_timeline[1].level, RISK_DISASTER);
    }
}
