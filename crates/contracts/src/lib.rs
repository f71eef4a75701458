//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! sensor payload types, the windowed sample returned to consumers, the
//! dataset configuration model and the error taxonomy.
//! Business crates depend on this crate only, never the other way round.
//!
//! ## Time Model
//! - All sensor streams share one clock: wall-clock microseconds
//!   (timestamp files carry nanoseconds, truncated on parse)
//! - Scan and inertial series of a session are strictly increasing

mod blueprint;
mod decoder;
mod error;
mod sample;
mod sensor;
mod session_id;
mod timestamp;

pub use blueprint::*;
pub use decoder::SensorDecoder;
pub use error::*;
pub use sample::*;
pub use sensor::*;
pub use session_id::SessionId;
pub use timestamp::Timestamp;
