//! Query-expression tokens.
//!
//! Each operator kind is its own variant; the numeric token code and the
//! printable symbol are derived from the variant, so there is no lookup table
//! to keep in sync.  Codes are stable across releases.

use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    And,
    Or,
    Not,
    Equal,
    NotEqual,
    LessThanOrEqual,
    LessThan,
    GreaterThanOrEqual,
    GreaterThan,
    /// Null-safe equality.
    EqualNullSafe,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThanOrEqual,
        Operator::LessThan,
        Operator::GreaterThanOrEqual,
        Operator::GreaterThan,
        Operator::EqualNullSafe,
    ];

    pub fn token_code(self) -> u16 {
        match self {
            Operator::And                => 1,
            Operator::Or                 => 2,
            Operator::Not                => 3,
            Operator::Equal              => 11,
            Operator::NotEqual           => 12,
            Operator::LessThanOrEqual    => 13,
            Operator::LessThan           => 14,
            Operator::GreaterThanOrEqual => 15,
            Operator::GreaterThan        => 16,
            Operator::EqualNullSafe      => 17,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::And                => "&",
            Operator::Or                 => "|",
            Operator::Not                => "!",
            Operator::Equal              => "=",
            Operator::NotEqual           => "<>",
            Operator::LessThanOrEqual    => "<=",
            Operator::LessThan           => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::GreaterThan        => ">",
            Operator::EqualNullSafe      => "<=>",
        }
    }

    pub fn from_token_code(code: u16) -> Option<Operator> {
        Self::ALL.into_iter().find(|op| op.token_code() == code)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }

    pub fn is_comparison(self) -> bool {
        !self.is_logical()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
