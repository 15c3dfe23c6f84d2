#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AxisOrientation {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl AxisOrientation {
    pub fn is_vertical(&self) -> bool {
        matches!(self, AxisOrientation::Left | AxisOrientation::Right)
    }

    /// Direction ticks point away from the plot area: -1 for top/left, 1 for bottom/right
    pub fn sign(&self) -> f64 {
        match self {
            AxisOrientation::Top | AxisOrientation::Left => -1.0,
            AxisOrientation::Bottom | AxisOrientation::Right => 1.0,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            AxisOrientation::Top => "axis-top",
            AxisOrientation::Bottom => "axis-bottom",
            AxisOrientation::Left => "axis-left",
            AxisOrientation::Right => "axis-right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    pub orientation: AxisOrientation,
    /// Translation of the axis group within its parent, e.g. `[0, height]`
    /// for a bottom axis under the plot area
    pub origin: [f64; 2],
    /// Approximate tick count for continuous scales
    pub tick_count: Option<f64>,
    pub title: Option<String>,
    /// Extra offset between labels and title
    pub title_offset: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            orientation: AxisOrientation::Bottom,
            origin: [0.0, 0.0],
            tick_count: None,
            title: None,
            title_offset: 0.0,
        }
    }
}

impl AxisConfig {
    pub fn bottom(height: f64) -> Self {
        Self {
            orientation: AxisOrientation::Bottom,
            origin: [0.0, height],
            ..Default::default()
        }
    }

    pub fn left() -> Self {
        Self {
            orientation: AxisOrientation::Left,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_tick_count(mut self, count: f64) -> Self {
        self.tick_count = Some(count);
        self
    }
}
