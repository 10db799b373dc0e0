//! Streaming pipeline: upstream chunks → canonical fragments → client and
//! transcript.

mod framing;
mod normalizer;
mod transcript;

pub use framing::{LineFramer, Utf8Carry};
pub use normalizer::{
    interpret_unit, interrupted_fragment, normalize, upstream_error_fragment, FragmentStream,
};
pub use transcript::{
    not_saved_fragment, spawn_transcript_pump, TranscriptContext, TranscriptOutcome,
    DEFAULT_CHANNEL_CAPACITY,
};
