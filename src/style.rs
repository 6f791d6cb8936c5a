//! Immutable style configuration.
//!
//! A `StyleConfig` is a plain value handed into every build and render call.
//! Changing a style means constructing a new configuration; nothing in the
//! engine mutates one in place.

/// Flat style configuration for all drawable kinds and grids.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub point_radius: f64,
    pub point_color: String,
    pub segment_color: String,
    pub segment_width: f64,
    pub circle_color: String,
    pub vector_color: String,
    /// Arrowhead edge length in math units.
    pub vector_tip_size: f64,
    pub angle_color: String,
    /// Arc radius for angle marks, in math units.
    pub angle_arc_radius: f64,
    /// The degree label sits on the bisector at arc radius times this.
    pub angle_text_arc_radius_factor: f64,
    pub function_color: String,
    pub function_width: f64,
    pub label_color: String,
    pub label_font_size: f64,
    pub label_font_family: String,
    pub area_fill_color: String,
    pub area_fill_opacity: f64,
    pub bar_fill_color: String,
    pub grid_color: String,
    pub axis_color: String,
    pub axis_label_color: String,
    pub polar_axis_color: String,
    /// Tick spacing in math units at scale 1.
    pub grid_default_tick_spacing: f64,
    /// Labels smaller than this many screen pixels are clamped up to it.
    pub min_label_font_px: f64,
    /// Labels that would shrink to this size or below are not drawn at all.
    pub label_vanish_threshold_px: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            point_radius: 0.1,
            point_color: "#1f77b4".to_string(),
            segment_color: "#333333".to_string(),
            segment_width: 2.0,
            circle_color: "#333333".to_string(),
            vector_color: "#d62728".to_string(),
            vector_tip_size: 0.35,
            angle_color: "#2ca02c".to_string(),
            angle_arc_radius: 0.8,
            angle_text_arc_radius_factor: 1.8,
            function_color: "#1f77b4".to_string(),
            function_width: 2.0,
            label_color: "#222222".to_string(),
            label_font_size: 14.0,
            label_font_family: "sans-serif".to_string(),
            area_fill_color: "#1f77b4".to_string(),
            area_fill_opacity: 0.25,
            bar_fill_color: "#9467bd".to_string(),
            grid_color: "#dddddd".to_string(),
            axis_color: "#888888".to_string(),
            axis_label_color: "#666666".to_string(),
            polar_axis_color: "#c8c8d8".to_string(),
            grid_default_tick_spacing: 1.0,
            min_label_font_px: 6.0,
            label_vanish_threshold_px: 4.0,
        }
    }
}

impl StyleConfig {
    /// Return a copy with a different function color. Builder-style helpers
    /// keep call sites from spelling out whole structs for one change.
    pub fn with_function_color(mut self, color: impl Into<String>) -> Self {
        self.function_color = color.into();
        self
    }

    /// Return a copy with a different point radius.
    pub fn with_point_radius(mut self, radius: f64) -> Self {
        self.point_radius = radius;
        self
    }
}
