use nom::{
    bytes::complete::take_till1,
    character::complete::{digit1, space1},
    combinator::{all_consuming, map_res},
    multi::separated_list1,
    IResult,
};
use rte_protocol::{Fragment, Token};

use crate::ConllxError;

const FIELD_COUNT: usize = 10;

/// One token line, still in file numbering.
#[derive(Debug)]
struct Row<'a> {
    line: usize,
    id: usize,
    form: &'a str,
    lemma: &'a str,
    pos: &'a str,
    head: Option<usize>,
    deprel: &'a str,
}

fn fields(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(space1, take_till1(char::is_whitespace))(input)
}

fn number(value: &str, field: &'static str, line: usize) -> Result<usize, ConllxError> {
    let parsed: IResult<&str, usize> = all_consuming(map_res(digit1, str::parse))(value);
    parsed
        .map(|(_, n)| n)
        .map_err(|_| ConllxError::InvalidNumber {
            line,
            field,
            value: value.to_string(),
        })
}

fn parse_row(text: &str, line: usize) -> Result<Row<'_>, ConllxError> {
    let columns = match fields(text) {
        Ok(("", columns)) => columns,
        Ok((_, columns)) => return Err(ConllxError::FieldCount { line, found: columns.len() }),
        Err(_) => return Err(ConllxError::FieldCount { line, found: 0 }),
    };
    if columns.len() != FIELD_COUNT {
        return Err(ConllxError::FieldCount {
            line,
            found: columns.len(),
        });
    }

    let id = number(columns[0], "id", line)?;
    let head = match columns[6] {
        "_" => None,
        value => match number(value, "head", line)? {
            0 => None,
            head => Some(head),
        },
    };

    Ok(Row {
        line,
        id,
        form: columns[1],
        lemma: columns[2],
        pos: columns[3],
        head,
        deprel: columns[7],
    })
}

fn build(rows: Vec<Row<'_>>) -> Result<Fragment, ConllxError> {
    let len = rows.len();
    let mut fragment = Fragment::new();

    for (index, row) in rows.into_iter().enumerate() {
        if row.id != index + 1 {
            return Err(ConllxError::NonSequentialId {
                line: row.line,
                expected: index + 1,
                found: row.id,
            });
        }
        if let Some(head) = row.head {
            if head > len {
                return Err(ConllxError::HeadOutOfRange {
                    line: row.line,
                    head,
                    len,
                });
            }
        }

        fragment.push(Token::new(
            index,
            row.form,
            row.lemma,
            row.pos,
            row.head.map(|head| head - 1),
            row.deprel,
        ));
    }

    Ok(fragment)
}

/// Sentences together with the line each one starts on.
fn sentences(input: &str) -> Result<Vec<(usize, Fragment)>, ConllxError> {
    let mut result = Vec::new();
    let mut rows = Vec::new();
    let mut start = 0;

    for (index, text) in input.lines().enumerate() {
        let line = index + 1;
        let text = text.trim();
        if text.is_empty() {
            if !rows.is_empty() {
                result.push((start, build(std::mem::take(&mut rows))?));
            }
            continue;
        }
        if rows.is_empty() {
            start = line;
        }
        rows.push(parse_row(text, line)?);
    }
    if !rows.is_empty() {
        result.push((start, build(rows)?));
    }

    Ok(result)
}

/// Reads every sentence of a CoNLL-X document, in order.
pub fn read_sentences(input: &str) -> Result<Vec<Fragment>, ConllxError> {
    let sentences: Vec<Fragment> = sentences(input)?
        .into_iter()
        .map(|(_, fragment)| fragment)
        .collect();
    tracing::debug!(sentences = sentences.len(), "read conll-x document");
    Ok(sentences)
}

/// Reads a document that must hold at most one sentence. Empty input gives
/// an empty fragment.
pub fn parse_sentence(input: &str) -> Result<Fragment, ConllxError> {
    let mut sentences = sentences(input)?.into_iter();
    let first = sentences.next();
    if let Some((line, _)) = sentences.next() {
        return Err(ConllxError::MultipleSentences { line });
    }
    Ok(first.map(|(_, fragment)| fragment).unwrap_or_default())
}
