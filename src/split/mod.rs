//! Splitters that turn one large artifact into bounded, indexed chunks.
//!
//! Two variants: size/duration-bounded for media ([`media::MediaSplitter`])
//! and sentence-boundary-bounded for text ([`sentence::SentenceSplitter`]).
//! Both emit chunks with contiguous indices `0..N-1`.

pub mod media;
pub mod sentence;

pub use media::{MediaChunk, MediaSplitter};
pub use sentence::{SentenceSplitter, TextChunk};
