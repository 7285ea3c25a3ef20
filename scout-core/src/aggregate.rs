//! Evidence aggregation: flattens an [`EvidenceSet`] into the text corpus
//! handed to the risk synthesizer.

use crate::types::EvidenceRecord;
use std::fmt::Write;

/// Render one record in the corpus layout.
pub fn render_record(out: &mut String, record: &EvidenceRecord) {
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "Title: {}\nSnippet: {}\nSource: {}\n\n",
        record.title(),
        record.snippet(),
        record.source_link()
    );
}

/// Concatenate records in received order. Pure and total; the empty set
/// yields the empty string. No deduplication, sorting, or filtering.
pub fn aggregate(records: &[EvidenceRecord]) -> String {
    let mut corpus = String::new();
    for record in records {
        render_record(&mut corpus, record);
    }
    corpus
}
