pub mod removal;
pub mod round;
