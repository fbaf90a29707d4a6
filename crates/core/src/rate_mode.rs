//! Interest rate mode selector

use serde::{Deserialize, Serialize};
use strum::Display;

/// Rate mode chosen by a borrower.
///
/// `None` is only meaningful for flash loans, where it means "no fallback
/// borrow on shortfall" (the whole operation fails instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum RateMode {
    /// No debt position (flash loan strict repayment).
    None,
    /// Rate fixed per position at draw time, blended into a pool average.
    Stable,
    /// Rate tracked through the shared variable borrow index.
    Variable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_mode_display() {
        assert_eq!(RateMode::Stable.to_string(), "Stable");
        assert_eq!(RateMode::Variable.to_string(), "Variable");
    }
}
