//! Sentence-boundary splitter for text artifacts.
//!
//! Text is cut on sentence-terminating punctuation and the fragments are
//! accumulated into chunks of at most a configured word count. A sentence is
//! never split across a chunk boundary; a single sentence longer than the
//! ceiling becomes its own chunk.

use tracing::debug;

/// Sentence-terminating punctuation, Latin and CJK.
const TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// One word-bounded slice of a text artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk in the artifact, starting at 0.
    pub index: usize,
    /// Complete sentences, terminators included, joined by single spaces.
    pub text: String,
    /// Whitespace-separated word count of `text`.
    pub words: usize,
}

/// Splitter configured with a word ceiling per chunk.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    max_words: usize,
}

impl SentenceSplitter {
    /// Creates a splitter with the given word ceiling.
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    /// Splits `text` into sentence-aligned chunks.
    ///
    /// Empty or whitespace-only input yields an empty chunk sequence.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        let fragments = sentence_fragments(text);

        let mut chunks: Vec<TextChunk> = Vec::new();
        let mut current = String::new();
        let mut current_words = 0;

        for fragment in fragments {
            let words = fragment.split_whitespace().count();

            if current_words + words > self.max_words && !current.is_empty() {
                chunks.push(TextChunk {
                    index: chunks.len(),
                    text: std::mem::take(&mut current),
                    words: current_words,
                });
                current_words = 0;
            }

            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&fragment);
            current_words += words;
        }

        if !current.is_empty() {
            chunks.push(TextChunk {
                index: chunks.len(),
                text: current,
                words: current_words,
            });
        }

        debug!(chunks = chunks.len(), "split text artifact");
        chunks
    }
}

/// Cuts text into sentence fragments, each keeping its terminator.
///
/// Fragments that are empty apart from the terminator itself (consecutive
/// punctuation, stray whitespace) are discarded. A trailing fragment without
/// a terminator is kept as-is.
fn sentence_fragments(text: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if TERMINATORS.contains(&ch) {
            let body = &current[..current.len() - ch.len_utf8()];
            if body.trim().is_empty() {
                current.clear();
            } else {
                fragments.push(current.trim().to_string());
                current = String::new();
            }
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        fragments.push(tail.to_string());
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let splitter = SentenceSplitter::new(10);
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\t ").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let splitter = SentenceSplitter::new(100);
        let chunks = splitter.split("Hello world. This is a test.");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "Hello world. This is a test.");
        assert_eq!(chunks[0].words, 6);
    }

    #[test]
    fn chunks_respect_the_word_ceiling() {
        let splitter = SentenceSplitter::new(6);
        // Four 4-word sentences; ceiling of 6 fits one sentence per chunk
        let text = "One two three four. Five six seven eight. \
                    Nine ten eleven twelve. Thirteen fourteen fifteen sixteen.";
        let chunks = splitter.split(text);

        assert_eq!(chunks.len(), 4);
        for chunk in &chunks {
            assert!(chunk.words <= 6, "chunk {} has {} words", chunk.index, chunk.words);
            assert_eq!(chunk.words, word_count(&chunk.text));
        }
    }

    #[test]
    fn sentences_accumulate_up_to_the_ceiling() {
        let splitter = SentenceSplitter::new(8);
        let text = "One two three four. Five six seven eight. Nine ten.";
        let chunks = splitter.split(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "One two three four. Five six seven eight.");
        assert_eq!(chunks[1].text, "Nine ten.");
    }

    #[test]
    fn oversized_sentence_becomes_its_own_chunk() {
        let splitter = SentenceSplitter::new(3);
        let text = "Short one. This single sentence has far too many words for the ceiling. End.";
        let chunks = splitter.split(text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "Short one.");
        assert_eq!(
            chunks[1].text,
            "This single sentence has far too many words for the ceiling."
        );
        assert!(chunks[1].words > 3);
        assert_eq!(chunks[2].text, "End.");
    }

    #[test]
    fn no_sentence_is_split_across_chunks() {
        let splitter = SentenceSplitter::new(5);
        let text = "Alpha beta gamma. Delta epsilon zeta eta. Theta iota.";
        let chunks = splitter.split(text);

        for chunk in &chunks {
            // Every chunk ends on a sentence boundary
            let last = chunk.text.chars().last().unwrap();
            assert!(TERMINATORS.contains(&last), "chunk ends mid-sentence: {:?}", chunk.text);
        }
    }

    #[test]
    fn concatenation_recovers_the_sentence_sequence() {
        let splitter = SentenceSplitter::new(4);
        let text = "One two three. Four five six. Seven eight nine. Ten eleven twelve.";
        let chunks = splitter.split(text);

        assert!(chunks.len() > 1);
        let reassembled = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(reassembled, text);
    }

    #[test]
    fn indices_are_contiguous_from_zero() {
        let splitter = SentenceSplitter::new(2);
        let text = "A b. C d. E f. G h.";
        let chunks = splitter.split(text);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn cjk_terminators_are_boundaries() {
        let splitter = SentenceSplitter::new(100);
        let chunks = splitter.split("你好世界。这是一个测试。");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "你好世界。 这是一个测试。");
    }

    #[test]
    fn consecutive_terminators_are_discarded() {
        let splitter = SentenceSplitter::new(100);
        let chunks = splitter.split("Wait... what? Really?!");

        assert_eq!(chunks.len(), 1);
        // "Wait." survives; the lone extra dots collapse away
        assert!(chunks[0].text.starts_with("Wait."));
        assert!(chunks[0].text.contains("what?"));
        assert!(chunks[0].text.contains("Really?"));
    }

    #[test]
    fn trailing_text_without_terminator_is_kept() {
        let splitter = SentenceSplitter::new(100);
        let chunks = splitter.split("Complete sentence. And a trailing thought");

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.ends_with("And a trailing thought"));
    }

    #[test]
    fn exclamation_and_question_terminate() {
        let splitter = SentenceSplitter::new(3);
        let chunks = splitter.split("Stop right there! Who goes? Nobody knows.");

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "Stop right there!");
        assert_eq!(chunks[1].text, "Who goes?");
        assert_eq!(chunks[2].text, "Nobody knows.");
    }
}
