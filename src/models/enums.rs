use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The stored string doubles as the serde representation.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(RiskOutcome {
    HighRisk => "High Risk",
    LowRisk => "Low Risk",
});

str_enum!(FollowUpTier {
    Critical => "critical",
    Urgent => "urgent",
    Soon => "soon",
    Routine => "routine",
});

impl FollowUpTier {
    /// Recommendation text shown to the clinician and stored on the prediction.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL: Immediate attention required.",
            Self::Urgent => "Urgent follow-up needed within 3 days.",
            Self::Soon => "Follow-up recommended within 2 weeks.",
            Self::Routine => "Routine check-up in 6 months.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn risk_outcome_round_trip() {
        for (variant, s) in [
            (RiskOutcome::HighRisk, "High Risk"),
            (RiskOutcome::LowRisk, "Low Risk"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(RiskOutcome::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn risk_outcome_serializes_as_label() {
        let json = serde_json::to_string(&RiskOutcome::HighRisk).unwrap();
        assert_eq!(json, "\"High Risk\"");
        let parsed: RiskOutcome = serde_json::from_str("\"Low Risk\"").unwrap();
        assert_eq!(parsed, RiskOutcome::LowRisk);
    }

    #[test]
    fn follow_up_recommendations_are_distinct() {
        let texts = [
            FollowUpTier::Critical.recommendation(),
            FollowUpTier::Urgent.recommendation(),
            FollowUpTier::Soon.recommendation(),
            FollowUpTier::Routine.recommendation(),
        ];
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(RiskOutcome::from_str("high risk").is_err());
        assert!(FollowUpTier::from_str("").is_err());
    }
}
