//! Transcript assembly from streaming recognition results.
//!
//! The capture engine delivers result events carrying a mix of final and
//! interim segments. The accumulator merges them into a stable pending
//! transcript and emits a completed [`Utterance`] whenever an event
//! carries finalized text.

/// One recognized segment within a result event.
#[derive(Debug, Clone)]
pub struct RecognitionSegment {
    /// Recognized text for this segment.
    pub text: String,
    /// Whether the engine has committed to this text.
    pub is_final: bool,
}

impl RecognitionSegment {
    /// Interim (revisable) segment.
    #[must_use]
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    /// Final (committed) segment.
    #[must_use]
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// One result event from the capture engine.
///
/// Engines batch several segments into a single event; segment order is
/// the engine's arrival order and must be preserved.
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    /// Segments in arrival order.
    pub segments: Vec<RecognitionSegment>,
}

/// A finalized unit of recognized speech, ready for the send flow.
///
/// Never empty: trimmed-empty final text is dropped by the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    /// Trimmed utterance text.
    pub text: String,
}

/// Merges streaming partial/final recognition segments into stable text.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    pending: String,
}

impl TranscriptAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one result event.
    ///
    /// Final segments are concatenated in arrival order with no separator
    /// (speech engines batch results that way). If the event carried any
    /// final text, the trimmed concatenation is emitted as an [`Utterance`]
    /// and the pending transcript resets to empty. Otherwise the pending
    /// transcript becomes `final + interim` so a display can show live
    /// partials before commit.
    pub fn ingest(&mut self, result: &RecognitionResult) -> Option<Utterance> {
        let mut final_text = String::new();
        let mut interim_text = String::new();

        for segment in &result.segments {
            if segment.is_final {
                final_text.push_str(&segment.text);
            } else {
                interim_text.push_str(&segment.text);
            }
        }

        self.pending = format!("{final_text}{interim_text}");

        if final_text.is_empty() {
            return None;
        }

        self.pending.clear();
        let text = final_text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Utterance {
            text: text.to_owned(),
        })
    }

    /// Current pending (not yet committed) transcript.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Discard any pending transcript.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn event(segments: Vec<RecognitionSegment>) -> RecognitionResult {
        RecognitionResult { segments }
    }

    #[test]
    fn interim_only_updates_pending_without_emitting() {
        let mut acc = TranscriptAccumulator::new();
        let emitted = acc.ingest(&event(vec![RecognitionSegment::interim("bonjour")]));
        assert!(emitted.is_none());
        assert_eq!(acc.pending(), "bonjour");
    }

    #[test]
    fn final_segment_emits_trimmed_utterance_and_resets_pending() {
        let mut acc = TranscriptAccumulator::new();
        acc.ingest(&event(vec![RecognitionSegment::interim("bonjour")]));

        let emitted = acc.ingest(&event(vec![RecognitionSegment::finalized(
            "bonjour comment",
        )]));
        assert_eq!(emitted.unwrap().text, "bonjour comment");
        assert_eq!(acc.pending(), "");
    }

    #[test]
    fn multiple_final_segments_concatenate_in_order() {
        let mut acc = TranscriptAccumulator::new();
        let emitted = acc.ingest(&event(vec![
            RecognitionSegment::finalized("bonjour "),
            RecognitionSegment::interim("ignored"),
            RecognitionSegment::finalized("tout le monde"),
        ]));
        assert_eq!(emitted.unwrap().text, "bonjour tout le monde");
    }

    #[test]
    fn mixed_event_shows_final_plus_interim_when_final_is_empty() {
        let mut acc = TranscriptAccumulator::new();
        let emitted = acc.ingest(&event(vec![
            RecognitionSegment::interim("bon"),
            RecognitionSegment::interim("jour"),
        ]));
        assert!(emitted.is_none());
        assert_eq!(acc.pending(), "bonjour");
    }

    #[test]
    fn whitespace_only_final_text_never_emits() {
        let mut acc = TranscriptAccumulator::new();
        let emitted = acc.ingest(&event(vec![RecognitionSegment::finalized("   ")]));
        assert!(emitted.is_none());
        assert_eq!(acc.pending(), "");
    }

    #[test]
    fn utterance_text_is_trimmed() {
        let mut acc = TranscriptAccumulator::new();
        let emitted = acc.ingest(&event(vec![RecognitionSegment::finalized("  salut  ")]));
        assert_eq!(emitted.unwrap().text, "salut");
    }

    #[test]
    fn empty_event_resets_pending_and_emits_nothing() {
        let mut acc = TranscriptAccumulator::new();
        acc.ingest(&event(vec![RecognitionSegment::interim("en cours")]));
        let emitted = acc.ingest(&event(vec![]));
        assert!(emitted.is_none());
        assert_eq!(acc.pending(), "");
    }

    #[test]
    fn clear_discards_pending() {
        let mut acc = TranscriptAccumulator::new();
        acc.ingest(&event(vec![RecognitionSegment::interim("bonjour")]));
        acc.clear();
        assert_eq!(acc.pending(), "");
    }
}
