//! Flow intensity levels.

use serde::Serialize;

/// Discrete flow severity. Ordering follows intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowLevel {
    Light = 1,
    ModerateLight = 2,
    Moderate = 3,
    ModerateHeavy = 4,
    Heavy = 5,
}

impl FlowLevel {
    pub const ALL: [FlowLevel; 5] = [
        FlowLevel::Light,
        FlowLevel::ModerateLight,
        FlowLevel::Moderate,
        FlowLevel::ModerateHeavy,
        FlowLevel::Heavy,
    ];

    /// Intensity this level stands for (1-5).
    pub fn intensity(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            FlowLevel::Light => "Light",
            FlowLevel::ModerateLight => "Moderate-Light",
            FlowLevel::Moderate => "Moderate",
            FlowLevel::ModerateHeavy => "Moderate-Heavy",
            FlowLevel::Heavy => "Heavy",
        }
    }

    /// Display opacity, 0.2 for light up to 1.0 for heavy.
    pub fn weight(self) -> f32 {
        self.intensity() as f32 / 5.0
    }

    pub fn css_class(self) -> &'static str {
        match self {
            FlowLevel::Light => "flow-light",
            FlowLevel::ModerateLight => "flow-moderate-light",
            FlowLevel::Moderate => "flow-moderate",
            FlowLevel::ModerateHeavy => "flow-moderate-heavy",
            FlowLevel::Heavy => "flow-heavy",
        }
    }
}

/// Classify a recorded intensity.
///
/// `None` and `0` mean nothing was recorded. Anything else is clamped into
/// 1..=5 before mapping, so stray values still render.
pub fn classify_flow(intensity: Option<i32>) -> Option<FlowLevel> {
    match intensity? {
        0 => None,
        i => Some(FlowLevel::ALL[(i.clamp(1, 5) - 1) as usize]),
    }
}
