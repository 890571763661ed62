// Rust guideline compliant 2026-10-18

//! Pure construction of [`ChartSeries`] values.

use domain::{ChartSeries, ForecastPoint};

/// Wraps one device's fresh forecast into a styled series.
///
/// Never reads the forecast cache: a series holds exactly the points of the
/// current request.
#[derive(Debug, Clone, Copy)]
pub struct ChartAssembler {
    fill: bool,
    border_width: u32,
}

impl ChartAssembler {
    /// Create an assembler applying the given style to every series.
    #[must_use]
    pub fn new(fill: bool, border_width: u32) -> Self {
        Self { fill, border_width }
    }

    /// Build one series. An empty `points` gives an empty series.
    #[must_use]
    pub fn assemble(&self, label: String, points: Vec<ForecastPoint>) -> ChartSeries {
        ChartSeries { label, fill: self.fill, border_width: self.border_width, points }
    }
}

impl Default for ChartAssembler {
    fn default() -> Self {
        Self::new(false, 1)
    }
}
