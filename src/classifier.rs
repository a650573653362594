/// Edit classification: decides whether a single edit event is large enough to flag
///
/// Only the literal inserted text of each fragment is counted. A replacement that
/// shrinks the document still counts the full length of its new text.

use crate::event::EditEvent;

/// Outcome of evaluating one edit event against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Sum of inserted characters across all fragments
    pub inserted_length: usize,
    /// Threshold in effect when the event was classified
    pub threshold: usize,
    /// `inserted_length >= threshold`
    pub flagged: bool,
}

/// Classify an edit event
///
/// Returns `None` when the event is disqualified: the document is not backed by a
/// real file, or the event carries no change fragments.
pub fn classify(event: &EditEvent, threshold: usize) -> Option<ClassificationResult> {
    if !event.document.is_file() || event.changes.is_empty() {
        return None;
    }

    let inserted_length = event.changes.iter().map(|change| change.inserted_len()).sum();

    Some(ClassificationResult {
        inserted_length,
        threshold,
        flagged: inserted_length >= threshold,
    })
}
