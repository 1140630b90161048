use core::str::FromStr;
use serde::{Deserialize, Serialize};

use streamkeep_core::{DomainError, ValueObject};

/// Lifecycle state of a forgettable payload.
///
/// ```text
/// Created ──(owning entry stored & published)──▶ CreatedAndClaimed
/// Created ──(unclaimed longer than timeout)────▶ Forgotten
/// CreatedAndClaimed ──(forget requested)───────▶ Forgotten
/// ```
///
/// `Forgotten` is terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ForgettablePayloadState {
    Created,
    CreatedAndClaimed,
    Forgotten,
}

impl ForgettablePayloadState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::CreatedAndClaimed => "CreatedAndClaimed",
            Self::Forgotten => "Forgotten",
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::CreatedAndClaimed)
                | (Self::Created, Self::Forgotten)
                | (Self::CreatedAndClaimed, Self::Forgotten)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Forgotten
    }
}

impl core::fmt::Display for ForgettablePayloadState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForgettablePayloadState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "CreatedAndClaimed" => Ok(Self::CreatedAndClaimed),
            "Forgotten" => Ok(Self::Forgotten),
            other => Err(DomainError::invalid_value(format!(
                "unknown forgettable payload state '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for ForgettablePayloadState {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ForgettablePayloadState> for String {
    fn from(value: ForgettablePayloadState) -> Self {
        value.as_str().to_string()
    }
}

impl ValueObject for ForgettablePayloadState {}

#[cfg(test)]
mod tests {
    use super::*;
    use ForgettablePayloadState::*;

    #[test]
    fn only_forward_transitions_are_allowed() {
        assert!(Created.can_transition_to(CreatedAndClaimed));
        assert!(Created.can_transition_to(Forgotten));
        assert!(CreatedAndClaimed.can_transition_to(Forgotten));

        assert!(!CreatedAndClaimed.can_transition_to(Created));
        assert!(!Forgotten.can_transition_to(Created));
        assert!(!Forgotten.can_transition_to(CreatedAndClaimed));
        assert!(!Created.can_transition_to(Created));
    }

    #[test]
    fn parse_round_trips_known_names() {
        for state in [Created, CreatedAndClaimed, Forgotten] {
            assert_eq!(state.as_str().parse::<ForgettablePayloadState>().unwrap(), state);
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "Archived".parse::<ForgettablePayloadState>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue(_)));

        let err = serde_json::from_str::<ForgettablePayloadState>("\"created\"").unwrap_err();
        assert!(err.to_string().contains("unknown forgettable payload state"));
    }
}
