//! Lentra Price Oracle
//!
//! Asset prices for collateral and debt valuation. Prices are WAD-scaled
//! integers in a common numeraire and are consumed read-only; a missing or
//! invalid price is a hard error, the engine never guesses.
//!
//! `MockOracle` serves tests; production feeds implement `PriceOracle`.

mod error;
mod mock;
mod types;

pub use error::OracleError;
pub use mock::MockOracle;
pub use types::PriceOracle;
