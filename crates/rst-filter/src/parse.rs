//! Filter text parser.
//!
//! Grammar (whitespace is removed before a clause is tokenized):
//!
//! ```text
//! filter   := clause ( '&' clause )*
//! clause   := characteristic relation threshold
//! relation := '>=' | '<=' | '>' | '<' | '='
//! ```

use crate::ast::{Clause, Filter, Relation};
use crate::error::{FilterSyntaxError, Result, SyntaxErrorKind};

const CLAUSE_SEPARATOR: char = '&';

fn is_relation_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=')
}

/// Parse filter text.
///
/// Blank or whitespace-only text yields [`Filter::Empty`]. The first clause
/// that fails to parse aborts the whole filter.
///
/// # Errors
///
/// Returns [`FilterSyntaxError`] naming the offending clause.
pub fn parse(text: &str) -> Result<Filter> {
    if text.trim().is_empty() {
        return Ok(Filter::Empty);
    }

    let clauses = text
        .split(CLAUSE_SEPARATOR)
        .map(parse_clause)
        .collect::<Result<Vec<_>>>()?;

    tracing::trace!(clauses = clauses.len(), "parsed filter");
    Ok(Filter::All(clauses))
}

fn parse_clause(raw: &str) -> Result<Clause> {
    let fail = |kind| FilterSyntaxError::new(raw.trim(), kind);

    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(fail(SyntaxErrorKind::EmptyClause));
    }

    let Some(split_at) = compact.find(is_relation_char) else {
        return Err(fail(SyntaxErrorKind::MissingRelation));
    };
    let (characteristic, rest) = compact.split_at(split_at);
    if characteristic.is_empty() {
        return Err(fail(SyntaxErrorKind::MissingCharacteristic));
    }

    // Longest symbol first so `=` never claims the tail of `>=` / `<=`.
    let relation = Relation::BY_SYMBOL_LENGTH
        .into_iter()
        .find(|relation| rest.starts_with(relation.symbol()));
    let threshold_text = relation.map_or(rest, |r| &rest[r.symbol().len()..]);

    let relation = match relation {
        Some(relation) if !threshold_text.starts_with(is_relation_char) => relation,
        _ => {
            let run_len = rest.find(|c: char| !is_relation_char(c)).unwrap_or(rest.len());
            return Err(fail(SyntaxErrorKind::UnrecognizedRelation(
                rest[..run_len].to_string(),
            )));
        }
    };

    let threshold = threshold_text
        .parse::<f64>()
        .ok()
        .filter(|value| !value.is_nan())
        .ok_or_else(|| fail(SyntaxErrorKind::InvalidThreshold(threshold_text.to_string())))?;

    Ok(Clause {
        characteristic: characteristic.to_string(),
        relation,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(characteristic: &str, relation: Relation, threshold: f64) -> Clause {
        Clause {
            characteristic: characteristic.to_string(),
            relation,
            threshold,
        }
    }

    #[test]
    fn test_blank_is_empty_filter() {
        assert_eq!(parse("").unwrap(), Filter::Empty);
        assert_eq!(parse("   \t ").unwrap(), Filter::Empty);
    }

    #[test]
    fn test_composite_filter() {
        let filter = parse("support >= 5 & length <= 2").unwrap();
        assert_eq!(
            filter,
            Filter::All(vec![
                clause("support", Relation::GreaterOrEqual, 5.0),
                clause("length", Relation::LessOrEqual, 2.0),
            ])
        );
    }

    #[test]
    fn test_every_relation_is_recognized() {
        for relation in Relation::BY_SYMBOL_LENGTH {
            let text = format!("x{}1", relation.symbol());
            assert_eq!(
                parse(&text).unwrap(),
                Filter::All(vec![clause("x", relation, 1.0)])
            );
        }
    }

    #[test]
    fn test_unusual_characteristic_names() {
        let filter = parse("epsilon' < 0.1 & coverage-factor > 0.3").unwrap();
        let names: Vec<_> = filter
            .clauses()
            .iter()
            .map(|c| c.characteristic.as_str())
            .collect();
        assert_eq!(names, ["epsilon'", "coverage-factor"]);
    }

    #[test]
    fn test_negative_and_exponent_thresholds() {
        let filter = parse("Z>-0.25&support>=1e1").unwrap();
        assert_eq!(filter.clauses()[0].threshold, -0.25);
        assert_eq!(filter.clauses()[1].threshold, 10.0);
    }

    #[test]
    fn test_doubled_operator_is_rejected() {
        let err = parse("support >># 5").unwrap_err();
        assert_eq!(err.clause, "support >># 5");
        assert_eq!(err.kind, SyntaxErrorKind::UnrecognizedRelation(">>".into()));
    }

    #[test]
    fn test_reversed_operator_is_rejected() {
        let err = parse("support => 5").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnrecognizedRelation("=>".into()));
    }

    #[test]
    fn test_missing_relation() {
        let err = parse("support 5").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MissingRelation);
    }

    #[test]
    fn test_missing_characteristic() {
        let err = parse(">= 5").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MissingCharacteristic);
    }

    #[test]
    fn test_bad_threshold_names_the_clause() {
        let err = parse("support>=5 & confidence > high").unwrap_err();
        assert_eq!(err.clause, "confidence > high");
        assert_eq!(err.kind, SyntaxErrorKind::InvalidThreshold("high".into()));
    }

    #[test]
    fn test_empty_threshold() {
        let err = parse("support>=").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidThreshold(String::new()));
    }

    #[test]
    fn test_nan_threshold_is_rejected() {
        let err = parse("support>NaN").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::InvalidThreshold("NaN".into()));
    }

    #[test]
    fn test_dangling_separator() {
        let err = parse("support>=5&").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::EmptyClause);
        let err = parse("support>=5 && length<2").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::EmptyClause);
    }
}
