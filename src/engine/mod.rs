pub mod filter;
pub mod performance;
pub mod progression;
pub mod shuffle;
pub mod tiles;
