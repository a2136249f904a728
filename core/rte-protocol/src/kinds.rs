use core::str::FromStr;

use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

bitflags! {
    /// Categories of transformation that are turned into classifier features.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct TransformationKinds: u8 {
        const MATCH = 1;
        const REPLACE = 2;
        const INSERTION = 4;
        const DELETION = 8;
    }
}

impl TransformationKinds {
    /// Positional form used by the feature printer: replace, match, deletion, insertion.
    pub fn from_switches(replace: bool, matched: bool, deletion: bool, insertion: bool) -> Self {
        let mut kinds = Self::empty();
        kinds.set(Self::REPLACE, replace);
        kinds.set(Self::MATCH, matched);
        kinds.set(Self::DELETION, deletion);
        kinds.set(Self::INSERTION, insertion);
        kinds
    }
}

impl Default for TransformationKinds {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for TransformationKinds {
    type Err = ProtocolError;

    /// Comma separated names, e.g. `match,insertion`. Short names (`rep`,
    /// `ins`, `del`) are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut kinds = Self::empty();
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            kinds |= match name.to_ascii_lowercase().as_str() {
                "match" => Self::MATCH,
                "replace" | "rep" => Self::REPLACE,
                "insertion" | "ins" => Self::INSERTION,
                "deletion" | "del" => Self::DELETION,
                "all" => Self::all(),
                _ => return Err(ProtocolError::UnknownKind(name.to_string())),
            };
        }
        Ok(kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switches() {
        let kinds = TransformationKinds::from_switches(true, false, false, true);
        assert_eq!(kinds, TransformationKinds::REPLACE | TransformationKinds::INSERTION);
        assert_eq!(TransformationKinds::default(), TransformationKinds::all());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "match, del".parse::<TransformationKinds>(),
            Ok(TransformationKinds::MATCH | TransformationKinds::DELETION)
        );
        assert_eq!("all".parse::<TransformationKinds>(), Ok(TransformationKinds::all()));
        assert!("swap".parse::<TransformationKinds>().is_err());
    }
}
