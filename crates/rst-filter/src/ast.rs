//! Parsed filter representation.

use std::fmt;

use crate::item::{CharacteristicValue, Filterable};

/// Comparison between a characteristic and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `=`
    Equal,
    /// `<=`
    LessOrEqual,
    /// `<`
    Less,
}

impl Relation {
    /// Relations ordered longest symbol first, the order the parser tries them.
    pub const BY_SYMBOL_LENGTH: [Self; 5] = [
        Self::GreaterOrEqual,
        Self::LessOrEqual,
        Self::Greater,
        Self::Less,
        Self::Equal,
    ];

    /// Source symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Equal => "=",
            Self::LessOrEqual => "<=",
            Self::Less => "<",
        }
    }

    /// Look up a relation by its exact symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::BY_SYMBOL_LENGTH
            .into_iter()
            .find(|relation| relation.symbol() == symbol)
    }

    /// Plain IEEE comparison; `=` is exact equality.
    #[allow(clippy::float_cmp)]
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Greater => value > threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::Equal => value == threshold,
            Self::LessOrEqual => value <= threshold,
            Self::Less => value < threshold,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One `characteristic R threshold` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Characteristic key, matched case-sensitively.
    pub characteristic: String,
    /// Comparison to apply.
    pub relation: Relation,
    /// Right-hand side.
    pub threshold: f64,
}

impl Clause {
    /// Evaluate against one item. Missing or non-numeric characteristics fail.
    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        let value = match item.characteristic(&self.characteristic) {
            Some(CharacteristicValue::Number(n)) => *n,
            Some(CharacteristicValue::Text(text)) => match text.trim().parse::<f64>() {
                Ok(n) => n,
                Err(_) => return false,
            },
            None => return false,
        };
        self.relation.holds(value, self.threshold)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.characteristic, self.relation, self.threshold)
    }
}

/// A parsed filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Blank input; matches everything.
    #[default]
    Empty,
    /// Conjunction of one or more clauses, in source order.
    All(Vec<Clause>),
}

impl Filter {
    /// Returns true if every clause holds for `item`.
    pub fn evaluate<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        match self {
            Self::Empty => true,
            Self::All(clauses) => clauses.iter().all(|clause| clause.matches(item)),
        }
    }

    /// Whether this is the match-everything filter.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Clauses in source order (empty for [`Filter::Empty`]).
    pub fn clauses(&self) -> &[Clause] {
        match self {
            Self::Empty => &[],
            Self::All(clauses) => clauses,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for clause in self.clauses() {
            if !first {
                f.write_str("&")?;
            }
            write!(f, "{clause}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Item;

    #[test]
    fn relation_symbols_round_trip() {
        for relation in Relation::BY_SYMBOL_LENGTH {
            assert_eq!(Relation::from_symbol(relation.symbol()), Some(relation));
        }
        assert_eq!(Relation::from_symbol("=>"), None);
        assert_eq!(Relation::from_symbol("=="), None);
    }

    #[test]
    fn equality_is_exact() {
        assert!(Relation::Equal.holds(0.5, 0.5));
        assert!(!Relation::Equal.holds(0.1 + 0.2, 0.3));
    }

    #[test]
    fn text_characteristic_compares_when_numeric() {
        let clause = Clause {
            characteristic: "certainty".into(),
            relation: Relation::GreaterOrEqual,
            threshold: 0.5,
        };
        assert!(clause.matches(&Item::new(0).with("certainty", "0.75")));
        assert!(!clause.matches(&Item::new(1).with("certainty", "high")));
    }

    #[test]
    fn empty_filter_displays_as_blank() {
        assert_eq!(Filter::Empty.to_string(), "");
    }
}
