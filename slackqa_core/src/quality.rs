use serde::{Deserialize, Deserializer, Serialize};

/// Self-evaluated quality of a generated answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerQuality {
    #[serde(default)]
    pub has_direct_answer: bool,
    #[serde(default)]
    pub has_specific_info: bool,
    #[serde(default)]
    pub has_time_info: bool,
    #[serde(default)]
    pub is_relevant: bool,
    /// Always within `[0, 1]`.
    #[serde(default, deserialize_with = "deserialize_unit_interval")]
    pub confidence_score: f64,
}

impl AnswerQuality {
    /// Quality assigned to the templated fallback answer.
    #[must_use]
    pub const fn fallback() -> Self {
        Self {
            has_direct_answer: true,
            has_specific_info: true,
            has_time_info: true,
            is_relevant: true,
            confidence_score: 0.6,
        }
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn deserialize_unit_interval<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(clamp_unit(value))
}
