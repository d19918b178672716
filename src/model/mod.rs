//! Model module - session state and data types
//!
//! Everything the session controller owns lives here, organized by
//! responsibility:
//!
//! - `types`: core track/stream types and the playback mode
//! - `queue`: the FIFO play queue
//! - `shuffle`: the cycling shuffle session
//! - `volume`: the shared gain value
//! - `session_model`: the aggregate state owned by one controller

mod queue;
mod session_model;
mod shuffle;
mod types;
mod volume;

pub use queue::PlayQueue;
pub use session_model::{NextTrack, SessionModel};
pub use shuffle::ShuffleSession;
pub use types::{ActiveTrack, PlayMode, PlayableStream, TrackRequest};
pub use volume::VolumeState;
