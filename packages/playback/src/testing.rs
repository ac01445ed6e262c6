//! In-memory [`SceneRenderer`] and record builders shared by unit tests.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use globe_dataset_models::{Dataset, LocationRecord, MonthRecord};

use crate::scene::{
    FogSettings, LngLat, MarkerId, MarkerSpec, RingFeature, RingLayerStyle, SceneRenderer,
};

#[derive(Debug, Clone)]
pub struct RecordedMarker {
    pub spec: MarkerSpec,
    pub opacity: f32,
}

/// Scene that records every call so tests can assert on visible state.
#[derive(Debug)]
pub struct RecordingScene {
    pub markers: BTreeMap<MarkerId, RecordedMarker>,
    pub added: usize,
    pub has_ring_source: bool,
    pub ring_updates: usize,
    pub last_rings: Vec<RingFeature>,
    pub fog: Option<FogSettings>,
    pub center: LngLat,
}

impl Default for RecordingScene {
    fn default() -> Self {
        Self {
            markers: BTreeMap::new(),
            added: 0,
            has_ring_source: false,
            ring_updates: 0,
            last_rings: Vec::new(),
            fog: None,
            center: LngLat::new(20.0, 20.0),
        }
    }
}

impl RecordingScene {
    pub fn with_ring_source() -> Self {
        Self {
            has_ring_source: true,
            ..Self::default()
        }
    }
}

impl SceneRenderer for RecordingScene {
    fn add_marker(&mut self, marker: &MarkerSpec) {
        self.added += 1;
        self.markers.insert(
            marker.id,
            RecordedMarker {
                spec: marker.clone(),
                opacity: marker.opacity,
            },
        );
    }

    fn set_marker_opacity(&mut self, id: MarkerId, opacity: f32) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.opacity = opacity;
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn add_ring_layer(&mut self, _style: &RingLayerStyle) {
        self.has_ring_source = true;
    }

    fn update_ring_data(&mut self, rings: &[RingFeature]) -> bool {
        if !self.has_ring_source {
            return false;
        }
        self.ring_updates += 1;
        self.last_rings = rings.to_vec();
        true
    }

    fn set_fog(&mut self, fog: &FogSettings) {
        self.fog = Some(fog.clone());
    }

    fn center(&self) -> LngLat {
        self.center
    }

    fn set_center(&mut self, center: LngLat) {
        self.center = center;
    }
}

pub fn location(count: u32, is_covid: bool, event: &str, dtype: &str) -> LocationRecord {
    LocationRecord {
        lat: 10.0,
        lon: 20.0,
        count,
        country_name: Some("Testland".to_string()),
        country_iso3: None,
        region_name: None,
        event_name: Some(event.to_string()),
        dtype_name: Some(dtype.to_string()),
        is_covid,
        titles: Vec::new(),
    }
}

pub fn month(number: u32, locations: Vec<LocationRecord>) -> MonthRecord {
    MonthRecord {
        month: format!("2020-{number:02}"),
        date: NaiveDate::from_ymd_opt(2020, number, 1).unwrap(),
        total_reports: locations.iter().map(|l| u64::from(l.count)).sum(),
        total_locations: locations.len() as u64,
        locations,
    }
}

/// Three months: `[2 covid, 3 flood]`, `[1 ukraine]`, `[4 others]`.
pub fn three_month_dataset() -> Dataset {
    Dataset::new(vec![
        month(
            1,
            vec![
                location(2, true, "COVID-19 pandemic", "Epidemic"),
                location(3, false, "Floods", "Flood"),
            ],
        ),
        month(2, vec![location(1, false, "Ukraine crisis", "Civil Unrest")]),
        month(3, vec![location(4, false, "Fire", "Fire")]),
    ])
    .unwrap()
}
