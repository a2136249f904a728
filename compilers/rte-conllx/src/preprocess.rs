use rte_protocol::{Fragment, Token};

/// Relation the parsers use for punctuation marks.
pub const PUNCT: &str = "punct";

/// Drops punctuation leaves and renumbers what is left.
///
/// A token goes when its relation is [`PUNCT`] and no token of the input
/// depends on it. Ids and heads of the survivors are rewritten through an
/// old-to-new index table.
pub fn remove_punctuation(fragment: &Fragment) -> Fragment {
    let mut has_dependents = vec![false; fragment.len()];
    for head in fragment.iter().filter_map(Token::head) {
        if let Some(flag) = has_dependents.get_mut(head) {
            *flag = true;
        }
    }

    let mut new_index = vec![None; fragment.len()];
    let mut next = 0;
    for (old, token) in fragment.iter().enumerate() {
        if token.deprel() == PUNCT && !has_dependents[old] {
            continue;
        }
        new_index[old] = Some(next);
        next += 1;
    }

    let dropped = fragment.len() - next;
    if dropped > 0 {
        tracing::trace!(dropped, "removed punctuation");
    }

    fragment
        .iter()
        .enumerate()
        .filter_map(|(old, token)| {
            let id = new_index[old]?;
            // Heads of kept tokens always survive: dropped tokens have no dependents.
            let head = token.head().and_then(|head| new_index.get(head).copied().flatten());
            Some(token.clone().with_position(id, head))
        })
        .collect()
}

/// Joins the sentences of one text into a single tree.
///
/// Tokens are renumbered consecutively. The first root met becomes the root
/// of the whole fragment; roots of every later sentence are attached to it.
pub fn merge_sentences<I>(sentences: I) -> Fragment
where
    I: IntoIterator<Item = Fragment>,
{
    let mut merged = Fragment::new();
    let mut anchor: Option<(usize, usize)> = None;

    for (sentence, fragment) in sentences.into_iter().enumerate() {
        let offset = merged.len();
        for token in fragment {
            let id = offset + token.id();
            let head = match token.head() {
                Some(head) => Some(offset + head),
                None => match anchor {
                    Some((root_sentence, root)) if root_sentence != sentence => Some(root),
                    Some(_) => None,
                    None => {
                        anchor = Some((sentence, id));
                        None
                    }
                },
            };
            merged.push(token.with_position(id, head));
        }
    }

    merged
}
