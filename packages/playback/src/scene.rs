//! Rendering engine boundary.
//!
//! The playback core never talks to a map library directly. It drives a
//! [`SceneRenderer`], a narrow capability trait covering the handful of
//! scene-graph operations it needs: markers with popups, the live ring
//! data source, fog and the camera center. The browser front-end, the
//! headless CLI renderer and the test fakes all implement it.

use globe_dataset_models::LocationRecord;
use globe_event_models::EventCategory;
use serde::{Deserialize, Serialize};

/// Identifier of a marker placed on the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerId(pub u64);

/// A longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    /// Longitude.
    pub lng: f64,
    /// Latitude.
    pub lat: f64,
}

impl LngLat {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<&LocationRecord> for LngLat {
    fn from(location: &LocationRecord) -> Self {
        Self::new(location.lon, location.lat)
    }
}

/// Maximum number of report titles shown in a marker popup.
pub const POPUP_TITLE_LIMIT: usize = 2;

/// Detail popup attached to a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPopup {
    /// Country name, or `"Unknown"`.
    pub country: String,
    /// Number of reports at the location.
    pub reports: u32,
    /// Disaster type name as reported.
    pub disaster_type: String,
    /// Category the location was classified into.
    pub category: EventCategory,
    /// Up to [`POPUP_TITLE_LIMIT`] report titles.
    pub titles: Vec<String>,
}

impl MarkerPopup {
    /// Builds the popup content for a classified location.
    #[must_use]
    pub fn new(location: &LocationRecord, category: EventCategory) -> Self {
        Self {
            country: location
                .country_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or("Unknown")
                .to_string(),
            reports: location.count,
            disaster_type: location.dtype_name.clone().unwrap_or_default(),
            category,
            titles: location
                .titles
                .iter()
                .take(POPUP_TITLE_LIMIT)
                .cloned()
                .collect(),
        }
    }
}

/// Everything needed to place one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSpec {
    /// Identifier used for later opacity changes and removal.
    pub id: MarkerId,
    /// Where the marker sits.
    pub position: LngLat,
    /// Diameter in pixels.
    pub size: f64,
    /// CSS color.
    pub color: &'static str,
    /// Initial opacity: 0 when the marker will fade in, 1 otherwise.
    pub opacity: f32,
    /// Detail popup.
    pub popup: MarkerPopup,
}

/// One feature of the ring data source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingFeature {
    /// Ring center.
    pub position: LngLat,
    /// CSS color.
    pub color: &'static str,
    /// Base radius at progress 0.
    pub size: f64,
    /// Animation progress in `[0, 1]`.
    pub progress: f64,
}

/// Paint properties of the circle layer that renders ring features.
///
/// Radius and opacities interpolate linearly over the per-feature
/// `progress` property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingLayerStyle {
    /// Data source identifier.
    pub source_id: &'static str,
    /// Layer identifier.
    pub layer_id: &'static str,
    /// Radius at progress 1, as a multiple of the feature size.
    pub radius_growth: f64,
    /// Fill opacity at progress 0 (fades to 0).
    pub fill_opacity: f64,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Stroke opacity at progress 0 (fades to 0).
    pub stroke_opacity: f64,
}

impl Default for RingLayerStyle {
    fn default() -> Self {
        Self {
            source_id: "rings",
            layer_id: "ring-layer",
            radius_growth: 3.0,
            fill_opacity: 0.6,
            stroke_width: 2.0,
            stroke_opacity: 0.8,
        }
    }
}

impl RingLayerStyle {
    /// Circle radius of a feature of `size` at `progress`.
    #[must_use]
    pub fn radius_at(&self, size: f64, progress: f64) -> f64 {
        lerp(size, size * self.radius_growth, progress)
    }

    /// Fill opacity at `progress`.
    #[must_use]
    pub fn fill_opacity_at(&self, progress: f64) -> f64 {
        lerp(self.fill_opacity, 0.0, progress)
    }

    /// Stroke opacity at `progress`.
    #[must_use]
    pub fn stroke_opacity_at(&self, progress: f64) -> f64 {
        lerp(self.stroke_opacity, 0.0, progress)
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    (to - from).mul_add(t, from)
}

/// Atmosphere settings for the globe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogSettings {
    /// Start and end of the fog range.
    pub range: [f64; 2],
    /// Fog color near the ground.
    pub color: String,
    /// Blend between horizon and sky.
    pub horizon_blend: f64,
    /// Upper atmosphere color.
    pub high_color: String,
    /// Background color of space.
    pub space_color: String,
    /// Star brightness.
    pub star_intensity: f64,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            range: [0.8, 8.0],
            color: "#ffffff".to_string(),
            horizon_blend: 0.1,
            high_color: "#245bde".to_string(),
            space_color: "#000000".to_string(),
            star_intensity: 0.2,
        }
    }
}

/// Map projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// 3D globe.
    Globe,
    /// Flat web mercator.
    Mercator,
}

/// Options used when the map view is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Map style URL.
    pub style: String,
    /// Projection.
    pub projection: Projection,
    /// Initial camera center.
    pub center: LngLat,
    /// Initial zoom level.
    pub zoom: f64,
    /// Initial pitch in degrees.
    pub pitch: f64,
    /// Atmosphere applied once the style has loaded.
    pub fog: FogSettings,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            style: "mapbox://styles/go-ifrc/ckrfe16ru4c8718phmckdfjh0".to_string(),
            projection: Projection::Globe,
            center: LngLat::new(20.0, 20.0),
            zoom: 2.2,
            pitch: 0.0,
            fog: FogSettings::default(),
        }
    }
}

/// Scene-graph operations the playback core needs from a rendering engine.
///
/// Implementations must tolerate operations on objects that no longer
/// exist: removing an unknown marker or changing its opacity is a no-op.
pub trait SceneRenderer {
    /// Places a marker with its popup.
    fn add_marker(&mut self, marker: &MarkerSpec);

    /// Changes the opacity of a marker (drives fade transitions).
    fn set_marker_opacity(&mut self, id: MarkerId, opacity: f32);

    /// Removes a marker from the scene.
    fn remove_marker(&mut self, id: MarkerId);

    /// Registers the ring data source and its circle layer.
    fn add_ring_layer(&mut self, style: &RingLayerStyle);

    /// Replaces the ring data source contents. Returns `false`, doing
    /// nothing, if the ring source has not been registered.
    fn update_ring_data(&mut self, rings: &[RingFeature]) -> bool;

    /// Applies atmosphere settings.
    fn set_fog(&mut self, fog: &FogSettings);

    /// Current camera center.
    fn center(&self) -> LngLat;

    /// Moves the camera center.
    fn set_center(&mut self, center: LngLat);
}
