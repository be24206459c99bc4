pub mod enums;
pub mod patient;
pub mod prediction;

pub use enums::{FollowUpTier, RiskOutcome};
pub use patient::*;
pub use prediction::*;
