//! Renderer used when no map engine is attached.
//!
//! [`LogScene`] keeps just enough scene state to answer the session's
//! queries (camera center, ring source) and logs every scene-graph call at
//! trace level, so `RUST_LOG=globe_app=trace` shows the full marker and
//! ring churn of a playback run.

use std::collections::BTreeMap;

use globe_playback::{
    FogSettings, LngLat, MarkerId, MarkerSpec, RingFeature, RingLayerStyle, SceneRenderer,
    ViewOptions,
};

use crate::bootstrap::{FailureMessage, FailureSurface, ViewError, ViewFactory};

/// Scene renderer that records counts and logs calls.
#[derive(Debug)]
pub struct LogScene {
    markers: BTreeMap<MarkerId, f32>,
    ring_layer: Option<RingLayerStyle>,
    rings: usize,
    fog: Option<FogSettings>,
    center: LngLat,
}

impl LogScene {
    /// Creates an empty scene with the camera at `center`.
    #[must_use]
    pub const fn new(center: LngLat) -> Self {
        Self {
            markers: BTreeMap::new(),
            ring_layer: None,
            rings: 0,
            fog: None,
            center,
        }
    }

    /// Markers currently placed, including ones fading out.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Markers with non-zero opacity. Faded-out markers awaiting removal
    /// are not counted.
    #[must_use]
    pub fn visible_marker_count(&self) -> usize {
        self.markers.values().filter(|o| **o > 0.0).count()
    }

    /// Ring features in the last ring data update.
    #[must_use]
    pub const fn ring_count(&self) -> usize {
        self.rings
    }

    /// Whether the ring source and layer were registered.
    #[must_use]
    pub const fn has_ring_source(&self) -> bool {
        self.ring_layer.is_some()
    }

    /// Atmosphere applied to the view, if any.
    #[must_use]
    pub const fn fog(&self) -> Option<&FogSettings> {
        self.fog.as_ref()
    }
}

impl SceneRenderer for LogScene {
    fn add_marker(&mut self, marker: &MarkerSpec) {
        log::trace!(
            "add marker {:?} at ({:.3}, {:.3}) size {:.1} {} [{}: {} reports]",
            marker.id,
            marker.position.lng,
            marker.position.lat,
            marker.size,
            marker.color,
            marker.popup.country,
            marker.popup.reports,
        );
        self.markers.insert(marker.id, marker.opacity);
    }

    fn set_marker_opacity(&mut self, id: MarkerId, opacity: f32) {
        if let Some(current) = self.markers.get_mut(&id) {
            *current = opacity;
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if self.markers.remove(&id).is_some() {
            log::trace!("remove marker {id:?}");
        }
    }

    fn add_ring_layer(&mut self, style: &RingLayerStyle) {
        log::debug!(
            "ring layer `{}` on source `{}` registered",
            style.layer_id,
            style.source_id
        );
        self.ring_layer = Some(style.clone());
    }

    fn update_ring_data(&mut self, rings: &[RingFeature]) -> bool {
        if self.ring_layer.is_none() {
            return false;
        }
        if rings.len() != self.rings {
            log::trace!("{} ring(s) active", rings.len());
        }
        self.rings = rings.len();
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

/// Creates [`LogScene`] views.
#[derive(Debug, Default)]
pub struct HeadlessViewFactory;

impl ViewFactory for HeadlessViewFactory {
    type Renderer = LogScene;

    fn create_view(&mut self, token: &str, options: &ViewOptions) -> Result<LogScene, ViewError> {
        if token.trim().is_empty() {
            return Err(ViewError {
                message: "empty access token".to_string(),
            });
        }
        log::info!(
            "Created headless {:?} view of {} at ({}, {}) zoom {}",
            options.projection,
            options.style,
            options.center.lng,
            options.center.lat,
            options.zoom,
        );
        Ok(LogScene::new(options.center))
    }
}

/// Prints startup failures to standard error.
#[derive(Debug, Default)]
pub struct StderrSurface;

impl FailureSurface for StderrSurface {
    fn show_failure(&mut self, failure: &FailureMessage) {
        eprintln!("{}", failure.title);
        eprintln!("  {}", failure.detail);
        eprintln!("  {}", failure.hint);
    }
}
