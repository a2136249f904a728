use rte_protocol::ManualAlignments;

use crate::ConllxError;

/// Reads a manual alignment list: one `form_POS<TAB>form_POS` pair per
/// line, T side first. Blank lines are skipped.
pub fn read_manual_alignments(input: &str) -> Result<ManualAlignments, ConllxError> {
    let mut alignments = ManualAlignments::new();

    for (index, text) in input.lines().enumerate() {
        let text = text.trim_end_matches('\r');
        if text.trim().is_empty() {
            continue;
        }
        match text.split_once('\t') {
            Some((t_key, h_key)) if !t_key.is_empty() && !h_key.is_empty() && !h_key.contains('\t') => {
                alignments.insert(t_key, h_key);
            }
            _ => return Err(ConllxError::ManualAlignment { line: index + 1 }),
        }
    }

    tracing::debug!(pairs = alignments.len(), "read manual alignments");
    Ok(alignments)
}
