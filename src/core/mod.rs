pub mod clock;
pub mod ids;
pub mod services;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{IdGenerator, SequentialIdGenerator, TimestampIdGenerator, UuidIdGenerator};
