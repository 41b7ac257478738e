use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Inference step count sent as `numInferenceSteps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Low, Quality::Medium, Quality::High];

    pub fn steps(self) -> u32 {
        match self {
            Quality::Low => 16,
            Quality::Medium => 32,
            Quality::High => 54,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Low => "Low",
            Quality::Medium => "Medium",
            Quality::High => "High",
        }
    }
}

impl TryFrom<u32> for Quality {
    type Error = Error;

    fn try_from(steps: u32) -> Result<Self, Self::Error> {
        match steps {
            16 => Ok(Quality::Low),
            32 => Ok(Quality::Medium),
            54 => Ok(Quality::High),
            other => Err(Error::InvalidQuality(other)),
        }
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.steps()
    }
}

/// One entry of the quality selector shown by the page.
#[derive(Debug, Clone, Serialize)]
pub struct QualityOption {
    pub value: u32,
    pub label: &'static str,
}

pub fn options() -> Vec<QualityOption> {
    Quality::ALL
        .iter()
        .map(|q| QualityOption {
            value: q.steps(),
            label: q.label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_medium() {
        assert_eq!(Quality::default().steps(), 32);
    }

    #[test]
    fn rejects_values_outside_the_set() {
        for steps in [0, 15, 17, 33, 53, 55, 64] {
            assert!(matches!(Quality::try_from(steps), Err(Error::InvalidQuality(s)) if s == steps));
        }
    }

    #[test]
    fn serializes_as_step_count() {
        assert_eq!(serde_json::to_string(&Quality::High).unwrap(), "54");
        let q: Quality = serde_json::from_str("16").unwrap();
        assert_eq!(q, Quality::Low);
        assert!(serde_json::from_str::<Quality>("20").is_err());
    }

    #[test]
    fn options_are_labelled() {
        let labels: Vec<_> = options().iter().map(|o| (o.value, o.label)).collect();
        assert_eq!(labels, vec![(16, "Low"), (32, "Medium"), (54, "High")]);
    }
}
