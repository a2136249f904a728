use core::fmt;

use rte_protocol::{Token, TransformationKinds};
use serde::Serialize;

use crate::classifier::Judgment;

/// An edit operation read as an entailment step. Tokens carry their root
/// paths, so a transformation stands alone once extracted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transformation {
    Match {
        info: Option<String>,
        t: Token,
        h: Token,
    },
    Replace {
        judgment: Option<Judgment>,
        info: Option<String>,
        t: Token,
        h: Token,
    },
    Insertion {
        h: Token,
    },
    Deletion {
        t: Token,
    },
}

impl Transformation {
    /// Short type name used in feature strings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Transformation::Match { .. } => "match",
            Transformation::Replace { .. } => "rep",
            Transformation::Insertion { .. } => "ins",
            Transformation::Deletion { .. } => "del",
        }
    }

    pub fn kind(&self) -> TransformationKinds {
        match self {
            Transformation::Match { .. } => TransformationKinds::MATCH,
            Transformation::Replace { .. } => TransformationKinds::REPLACE,
            Transformation::Insertion { .. } => TransformationKinds::INSERTION,
            Transformation::Deletion { .. } => TransformationKinds::DELETION,
        }
    }

    pub fn info(&self) -> Option<&str> {
        match self {
            Transformation::Match { info, .. } | Transformation::Replace { info, .. } => info.as_deref(),
            _ => None,
        }
    }

    pub fn t_token(&self) -> Option<&Token> {
        match self {
            Transformation::Match { t, .. }
            | Transformation::Replace { t, .. }
            | Transformation::Deletion { t } => Some(t),
            Transformation::Insertion { .. } => None,
        }
    }

    pub fn h_token(&self) -> Option<&Token> {
        match self {
            Transformation::Match { h, .. }
            | Transformation::Replace { h, .. }
            | Transformation::Insertion { h } => Some(h),
            Transformation::Deletion { .. } => None,
        }
    }

    /// The feature string, or `None` when this kind is not enabled.
    ///
    /// ```text
    /// Type:match#Info:null#T_DPrelR:det#nsubj#ROOT#H_DPrelR:det#nsubj#ROOT
    /// Type:ins#H_DPrelR:neg#ROOT
    /// Type:del#T_DPrelR:punct#ROOT
    /// ```
    pub fn render(&self, enabled: TransformationKinds) -> Option<String> {
        if !enabled.contains(self.kind()) {
            return None;
        }
        let rendered = match self {
            Transformation::Match { info, t, h } | Transformation::Replace { info, t, h, .. } => format!(
                "Type:{}#Info:{}#T_DPrelR:{}#H_DPrelR:{}",
                self.type_name(),
                info.as_deref().unwrap_or("null"),
                path(t),
                path(h)
            ),
            Transformation::Insertion { h } => format!("Type:ins#H_DPrelR:{}", path(h)),
            Transformation::Deletion { t } => format!("Type:del#T_DPrelR:{}", path(t)),
        };
        Some(rendered)
    }
}

fn path(token: &Token) -> &str {
    token.deprel_path().unwrap_or("null")
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transformation::Match { info, t, h } | Transformation::Replace { info, t, h, .. } => write!(
                f,
                "Type: {} Info: {} token_T: {} token_H: {}",
                self.type_name(),
                info.as_deref().unwrap_or("null"),
                t,
                h
            ),
            Transformation::Insertion { h } => write!(f, "Type: ins token_H: {}", h),
            Transformation::Deletion { t } => write!(f, "Type: del token_T: {}", t),
        }
    }
}
