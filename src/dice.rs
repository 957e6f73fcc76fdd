//! Dice roller
//!
//! Cosmetic only: results never enter the transcript.

use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// Die used by `/roll` without an argument
pub const DEFAULT_SIDES: u32 = 20;

/// How long "Rolling..." stays up before the result
pub const DEFAULT_ROLL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("A die needs at least one side")]
    NoSides,
}

/// Uniform integer in `[1, sides]`
pub fn roll_dice<R: Rng + ?Sized>(sides: u32, rng: &mut R) -> Result<u32, DiceError> {
    if sides == 0 {
        return Err(DiceError::NoSides);
    }
    Ok(rng.gen_range(1..=sides))
}
