//! Household financial-health scoring (UHFS) for gig-economy users.
//!
//! Questionnaire answers across five life domains are mapped to normalized sub-scores through a
//! versioned [`scoring::Ruleset`], classified into risk buckets, blended into a 300-900 score and
//! persisted as a single per-user snapshot by [`scoring::UhfsService`].

pub mod answers;
pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
