pub mod clock;
pub mod ticks;
