use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One node of a dependency tree, as read from a CoNLL-X line.
///
/// `id` and `head` are 0-based positions inside the owning [`Fragment`];
/// `head` is `None` for the root.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "TokenRecord"))]
pub struct Token {
    id: usize,
    form: String,
    lemma: String,
    pos: String,
    head: Option<usize>,
    deprel: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    deprel_path: Option<String>,
}

impl Token {
    /// Builds a token. A token whose lemma is `no` always carries the
    /// `neg` relation, whatever the parser said.
    pub fn new(
        id: usize,
        form: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
        head: Option<usize>,
        deprel: impl Into<String>,
    ) -> Self {
        let lemma = lemma.into();
        let deprel = if lemma == "no" {
            "neg".to_string()
        } else {
            deprel.into()
        };

        Self {
            id,
            form: form.into(),
            lemma,
            pos: pos.into(),
            head,
            deprel,
            deprel_path: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn form(&self) -> &str {
        &self.form
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn pos(&self) -> &str {
        &self.pos
    }

    pub fn head(&self) -> Option<usize> {
        self.head
    }

    pub fn deprel(&self) -> &str {
        &self.deprel
    }

    pub fn is_root(&self) -> bool {
        self.head.is_none()
    }

    /// `#`-joined relations from this token up to the root, inclusive.
    ///
    /// Only tokens owned by a labeled tree have a path; tokens fresh out of a
    /// fragment return `None`.
    pub fn deprel_path(&self) -> Option<&str> {
        self.deprel_path.as_deref()
    }

    /// Attaches the root path. Called once by tree construction, after every
    /// parent of the tree is known.
    pub fn with_deprel_path(mut self, path: impl Into<String>) -> Self {
        self.deprel_path = Some(path.into());
        self
    }

    /// Moves the token to a new position, used when tokens are dropped from
    /// or appended to a fragment. Any root path is discarded.
    pub fn with_position(mut self, id: usize, head: Option<usize>) -> Self {
        self.id = id;
        self.head = head;
        self.deprel_path = None;
        self
    }
}

/// Serialized form of a [`Token`]. Deserialization goes through
/// [`Token::new`]; a root path in the input is ignored.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct TokenRecord {
    id: usize,
    form: String,
    lemma: String,
    pos: String,
    head: Option<usize>,
    deprel: String,
}

#[cfg(feature = "serde")]
impl From<TokenRecord> for Token {
    fn from(record: TokenRecord) -> Self {
        Token::new(record.id, record.form, record.lemma, record.pos, record.head, record.deprel)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = self.head.map(|h| h as i64).unwrap_or(-1);
        write!(
            f,
            "{}__{}__{}__{}__{}__{}__{}",
            self.id,
            self.form,
            self.lemma,
            self.pos,
            head,
            self.deprel,
            self.deprel_path.as_deref().unwrap_or("null")
        )
    }
}

/// The flattened tree of one sentence, tokens in CoNLL-X line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fragment {
    tokens: Vec<Token>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// 1-based access, matching the numbering of the CoNLL-X id column.
    pub fn token(&self, index: usize) -> Option<&Token> {
        index.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl FromIterator<Token> for Fragment {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Fragment {
    type Item = &'a Token;
    type IntoIter = core::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl IntoIterator for Fragment {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            writeln!(f, "{}", token)?;
        }
        Ok(())
    }
}
