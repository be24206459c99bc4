pub mod report; // Report intake: CSV rows and PDF text layers
pub mod risk; // Classifier artifact, risk tiers, assess step
pub mod processor; // assess → alert → persist orchestrator
