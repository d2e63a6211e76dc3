//! Join condition vocabulary shared by planners, operators, and the CLI.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Comparison between a left and a right join key.
///
/// Planners may express any of these; the merge engine accepts all but
/// `NotEqual`, which has no ordered-merge formulation and must be rejected
/// before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinComparison {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl JoinComparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            JoinComparison::Equal => "=",
            JoinComparison::NotEqual => "<>",
            JoinComparison::LessThan => "<",
            JoinComparison::LessThanOrEqual => "<=",
            JoinComparison::GreaterThan => ">",
            JoinComparison::GreaterThanOrEqual => ">=",
        }
    }

    /// The comparison that holds after exchanging the operands
    /// (`a < b` iff `b > a`).
    pub fn flip(&self) -> JoinComparison {
        match self {
            JoinComparison::LessThan => JoinComparison::GreaterThan,
            JoinComparison::LessThanOrEqual => JoinComparison::GreaterThanOrEqual,
            JoinComparison::GreaterThan => JoinComparison::LessThan,
            JoinComparison::GreaterThanOrEqual => JoinComparison::LessThanOrEqual,
            other => *other,
        }
    }

    /// Evaluate the comparison on an already computed ordering of left vs right.
    pub fn holds(&self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            JoinComparison::Equal => ord == Equal,
            JoinComparison::NotEqual => ord != Equal,
            JoinComparison::LessThan => ord == Less,
            JoinComparison::LessThanOrEqual => ord != Greater,
            JoinComparison::GreaterThan => ord == Greater,
            JoinComparison::GreaterThanOrEqual => ord != Less,
        }
    }
}

impl std::fmt::Display for JoinComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for JoinComparison {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "=" | "==" => JoinComparison::Equal,
            "<>" | "!=" => JoinComparison::NotEqual,
            "<" => JoinComparison::LessThan,
            "<=" => JoinComparison::LessThanOrEqual,
            ">" => JoinComparison::GreaterThan,
            ">=" => JoinComparison::GreaterThanOrEqual,
            other => {
                return Err(Error::Plan(format!(
                    "unknown join comparison '{}'",
                    other
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn parse_and_display_agree() {
        for op in ["=", "<>", "<", "<=", ">", ">="] {
            let parsed: JoinComparison = op.parse().unwrap();
            assert_eq!(parsed.to_string(), op);
        }
        assert_eq!("==".parse::<JoinComparison>().unwrap(), JoinComparison::Equal);
        assert!("=>".parse::<JoinComparison>().is_err());
    }

    #[test]
    fn flip_is_operand_exchange() {
        for ord in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
            for op in [
                JoinComparison::LessThan,
                JoinComparison::LessThanOrEqual,
                JoinComparison::GreaterThan,
                JoinComparison::GreaterThanOrEqual,
            ] {
                assert_eq!(op.holds(ord), op.flip().holds(ord.reverse()));
            }
        }
    }
}
