use crate::engine::RecognitionSegment;

/// Accumulated transcript of a recognition session
///
/// Finalized text only ever grows at the end. The interim suffix holds the
/// latest provisional hypothesis and is replaced by every result event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    finalized: String,
    interim: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one result event
    ///
    /// Segments before `result_index` were handled by an earlier event and are
    /// skipped. Final segments are appended, each followed by a single space;
    /// the non-final segments become the new interim suffix.
    /// Trailing whitespace an engine leaves on a final segment is normalised to that one space.
    pub fn apply(&mut self, result_index: usize, results: &[RecognitionSegment]) {
        let fresh = results.get(result_index..).unwrap_or_default();

        let mut final_part = String::new();
        let mut interim_part = String::new();

        for segment in fresh {
            if segment.is_final {
                final_part.push_str(segment.transcript.trim_end());
                final_part.push(' ');
            } else {
                interim_part.push_str(&segment.transcript);
            }
        }

        self.finalized.push_str(&final_part);
        self.interim = interim_part;
    }

    /// Full text: finalized part followed by the interim suffix
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.finalized.len() + self.interim.len());
        text.push_str(&self.finalized);
        text.push_str(&self.interim);
        text
    }

    pub fn finalized(&self) -> &str {
        &self.finalized
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn is_empty(&self) -> bool {
        self.finalized.is_empty() && self.interim.is_empty()
    }

    pub fn clear(&mut self) {
        self.finalized.clear();
        self.interim.clear();
    }
}
