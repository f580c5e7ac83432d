// Frame-deduplication and recognition-gating pipeline.

pub mod change;
pub mod crop;
pub mod gate;
pub mod orchestrator;
pub mod timecode;
pub mod types;
