use serde::{Deserialize, Serialize};

use imfo_core::DomainError;

/// One of the three sequential wizard screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    YourDetails,
    EventDetails,
    Review,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::YourDetails, Stage::EventDetails, Stage::Review];

    /// 1-based position, as shown in the progress header.
    pub fn number(&self) -> u8 {
        match self {
            Stage::YourDetails => 1,
            Stage::EventDetails => 2,
            Stage::Review => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::YourDetails => "Your Details",
            Stage::EventDetails => "Event Details",
            Stage::Review => "Review & Confirm",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Stage::YourDetails => "Tell us about yourself.",
            Stage::EventDetails => "Tell us about your event.",
            Stage::Review => "Review your details before confirming your booking.",
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::YourDetails => Some(Stage::EventDetails),
            Stage::EventDetails => Some(Stage::Review),
            Stage::Review => None,
        }
    }

    pub fn previous(&self) -> Option<Stage> {
        match self {
            Stage::YourDetails => None,
            Stage::EventDetails => Some(Stage::YourDetails),
            Stage::Review => Some(Stage::EventDetails),
        }
    }
}

impl TryFrom<u8> for Stage {
    type Error = DomainError;

    /// Out-of-range stage numbers are rejected rather than clamped.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Stage::YourDetails),
            2 => Ok(Stage::EventDetails),
            3 => Ok(Stage::Review),
            other => Err(DomainError::validation(format!(
                "stage must be between 1 and 3, got {other}"
            ))),
        }
    }
}

impl From<Stage> for u8 {
    fn from(value: Stage) -> Self {
        value.number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::try_from(stage.number()).unwrap(), stage);
        }
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        for n in [0u8, 4, 255] {
            match Stage::try_from(n).unwrap_err() {
                DomainError::Validation(msg) if msg.contains("between 1 and 3") => {}
                other => panic!("Expected Validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn next_and_previous_are_linear() {
        assert_eq!(Stage::YourDetails.next(), Some(Stage::EventDetails));
        assert_eq!(Stage::EventDetails.next(), Some(Stage::Review));
        assert_eq!(Stage::Review.next(), None);
        assert_eq!(Stage::YourDetails.previous(), None);
        assert_eq!(Stage::Review.previous(), Some(Stage::EventDetails));
    }
}
