/// Result assembly for downstream collaborators.
///
/// The run's output is the processed geometry tree plus the two feed
/// reference times — a plain serializable structure. An external result
/// cache keys entries on the feed-time pair; an external session store
/// can hold the same tree under an opaque token. This module has no
/// opinion on either store's format, only on the shape of the payload.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::geometry::Prefecture;

/// One complete run's output, borrowing the processed hierarchy.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// Reference time of the soil-water-index analysis feed.
    pub soil_initial_time: NaiveDateTime,
    /// Reference time of the rainfall-guidance feed.
    pub rainfall_initial_time: NaiveDateTime,
    pub prefectures: &'a [Prefecture],
}

impl<'a> RunReport<'a> {
    pub fn new(
        soil_initial_time: NaiveDateTime,
        rainfall_initial_time: NaiveDateTime,
        prefectures: &'a [Prefecture],
    ) -> Self {
        Self { soil_initial_time, rainfall_initial_time, prefectures }
    }

    /// The key an external result cache files this run under.
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{}",
            self.soil_initial_time.format("%Y%m%d%H%M%S"),
            self.rainfall_initial_time.format("%Y%m%d%H%M%S")
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Area, Mesh};
    use crate::model::{RiskPoint, TimePoint};
    use chrono::NaiveDate;

    fn sample_time(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_cache_key_pairs_both_feed_times() {
        let report = RunReport::new(sample_time(0), sample_time(3), &[]);
        assert_eq!(report.cache_key(), "20230602000000_20230602030000");
    }

    #[test]
    fn test_report_serializes_the_full_tree() {
        let mut mesh = Mesh::new("52352679", 91, 115, 131);
        mesh.swi_timeline = vec![TimePoint { lead_hours: 0, value: 20.0 }];
        mesh.risk_3h_max_timeline = vec![RiskPoint { lead_hours: 3, level: 1 }];
        let prefectures = vec![Prefecture {
            name: "Shiga".into(),
            code: "25".into(),
            areas: vec![Area {
                name: "Otsu".into(),
                meshes: vec![mesh],
                risk_timeline: vec![RiskPoint { lead_hours: 0, level: 0 }],
                rain_timeline: Vec::new(),
            }],
            subdivisions: Vec::new(),
            risk_timeline: Vec::new(),
        }];

        let report = RunReport::new(sample_time(0), sample_time(0), &prefectures);
        let json = serde_json::to_value(&report).expect("report should serialize");

        assert_eq!(json["prefectures"][0]["name"], "Shiga");
        assert_eq!(json["prefectures"][0]["areas"][0]["meshes"][0]["code"], "52352679");
        assert_eq!(
            json["prefectures"][0]["areas"][0]["meshes"][0]["swi_timeline"][0]["value"],
            20.0
        );
        assert_eq!(
            json["prefectures"][0]["areas"][0]["risk_timeline"][0]["level"],
            0
        );
    }
}
