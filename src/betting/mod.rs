//! Prediction game core: outcomes, bet states, stake arithmetic and match settlement.

pub mod outcome;
pub mod placement;
pub mod settlement;
pub mod stake;

pub use outcome::{BetStatus, Outcome};
pub use placement::{place_bet, PlacementError};
pub use settlement::{SettlementError, SettlementOutcome, SettlementService, SettlementSummary};
