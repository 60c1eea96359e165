//! Text segmentation: paragraph units and sentence spans.

mod segmenter;
mod tagger;

pub use segmenter::{segment, ExtractionUnit, Segments};
pub use tagger::{
    candidate_sentences, validate_spans, SentenceTag, SentenceTagger, TaggedSpan,
    UnicodeSentenceTagger,
};
