#[macro_use]
mod macros;

pub mod cost;
pub mod energy;
pub mod rate;
pub mod temperature;
mod zero;

pub use self::zero::Zero;
