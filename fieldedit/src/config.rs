//! See [`EditingConfig`].

use fieldedit_types::Srid;

/// Default size of a gesture rectangle (in pixels) below which the gesture is treated as a tap.
pub const DEFAULT_TOUCH_BOX_THRESHOLD: f64 = 10.0;
/// Default minimal pointer displacement (in pixels) that updates the gesture feedback.
pub const DEFAULT_MOVE_THRESHOLD: f64 = 1.0;

/// Thresholds and reference systems used by editing tools.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EditingConfig {
    touch_box_threshold: f64,
    move_threshold: f64,
    degenerate_expand: f64,
    display_srid: u32,
    split_precision: f64,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            touch_box_threshold: DEFAULT_TOUCH_BOX_THRESHOLD,
            move_threshold: DEFAULT_MOVE_THRESHOLD,
            degenerate_expand: 1.0,
            display_srid: Srid::WGS84.code(),
            split_precision: 1e7,
        }
    }
}

impl EditingConfig {
    /// Size of a selection rectangle in pixels that must be exceeded in both directions for the
    /// gesture to issue a query. Smaller gestures are considered accidental taps.
    pub fn touch_box_threshold(&self) -> f64 {
        self.touch_box_threshold
    }

    /// Sets the tap suppression threshold.
    pub fn with_touch_box_threshold(mut self, threshold: f64) -> Self {
        self.touch_box_threshold = threshold;
        self
    }

    /// Sets the tap suppression threshold.
    pub fn set_touch_box_threshold(&mut self, threshold: f64) {
        self.touch_box_threshold = threshold;
    }

    /// Pointer moves shorter than this (in pixels) do not update the gesture feedback.
    pub fn move_threshold(&self) -> f64 {
        self.move_threshold
    }

    /// Sets the move threshold.
    pub fn with_move_threshold(mut self, threshold: f64) -> Self {
        self.move_threshold = threshold;
        self
    }

    /// Sets the move threshold.
    pub fn set_move_threshold(&mut self, threshold: f64) {
        self.move_threshold = threshold;
    }

    /// Amount (in display map units) by which zero-width or zero-height query envelopes are
    /// grown.
    pub fn degenerate_expand(&self) -> f64 {
        self.degenerate_expand
    }

    /// Sets the degenerate envelope expansion.
    pub fn with_degenerate_expand(mut self, amount: f64) -> Self {
        self.degenerate_expand = amount;
        self
    }

    /// Sets the degenerate envelope expansion.
    pub fn set_degenerate_expand(&mut self, amount: f64) {
        self.degenerate_expand = amount;
    }

    /// Reference system of the map display coordinates.
    pub fn display_srid(&self) -> Srid {
        Srid(self.display_srid)
    }

    /// Sets the display reference system.
    pub fn with_display_srid(mut self, srid: Srid) -> Self {
        self.display_srid = srid.code();
        self
    }

    /// Sets the display reference system.
    pub fn set_display_srid(&mut self, srid: Srid) {
        self.display_srid = srid.code();
    }

    /// Scale of the precision grid used when splitting self-intersecting polygons. Coordinates
    /// are rounded to `1 / split_precision`.
    pub fn split_precision(&self) -> f64 {
        self.split_precision
    }

    /// Sets the split precision scale.
    pub fn with_split_precision(mut self, precision: f64) -> Self {
        self.split_precision = precision;
        self
    }

    /// Sets the split precision scale.
    pub fn set_split_precision(&mut self, precision: f64) {
        self.split_precision = precision;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = EditingConfig::default()
            .with_touch_box_threshold(20.0)
            .with_display_srid(Srid::WEB_MERCATOR);

        assert_eq!(config.touch_box_threshold(), 20.0);
        assert_eq!(config.move_threshold(), DEFAULT_MOVE_THRESHOLD);
        assert_eq!(config.display_srid(), Srid::WEB_MERCATOR);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_partial() {
        let config: EditingConfig =
            serde_json::from_str(r#"{"touch_box_threshold": 15.0}"#).expect("valid json");
        assert_eq!(config.touch_box_threshold(), 15.0);
        assert_eq!(config.degenerate_expand(), 1.0);
        assert_eq!(config.display_srid(), Srid::WGS84);
    }
}
