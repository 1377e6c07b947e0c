//! Splits a normalized token stream into the top-level RBQL clauses.

use rbql_helpers::IndexMap;

use crate::error::ParseError;
use crate::lexer::Token;

/// One of the seven keyword phrases RBQL recognizes at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    Select,
    SelectDistinct,
    InnerJoin,
    LeftJoin,
    StrictLeftJoin,
    Where,
    OrderBy,
}

impl Clause {
    pub fn name(self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::SelectDistinct => "SELECT DISTINCT",
            Clause::InnerJoin => "INNER JOIN",
            Clause::LeftJoin => "LEFT JOIN",
            Clause::StrictLeftJoin => "STRICT LEFT JOIN",
            Clause::Where => "WHERE",
            Clause::OrderBy => "ORDER BY",
        }
    }

    fn words(self) -> &'static [&'static str] {
        match self {
            Clause::Select => &["SELECT"],
            Clause::SelectDistinct => &["SELECT", "DISTINCT"],
            Clause::InnerJoin => &["INNER", "JOIN"],
            Clause::LeftJoin => &["LEFT", "JOIN"],
            Clause::StrictLeftJoin => &["STRICT", "LEFT", "JOIN"],
            Clause::Where => &["WHERE"],
            Clause::OrderBy => &["ORDER", "BY"],
        }
    }
}

/// Keyword phrases in longest-match-first order, mirroring how the reference
/// implementation sorts its pattern list by character length before scanning.
const PRIORITY: &[Clause] = &[
    Clause::StrictLeftJoin,
    Clause::SelectDistinct,
    Clause::InnerJoin,
    Clause::LeftJoin,
    Clause::OrderBy,
    Clause::Select,
    Clause::Where,
];

/// Token-count of a clause's keyword phrase: one token per word plus one
/// `Whitespace` token between each pair of words.
fn phrase_token_len(clause: Clause) -> usize {
    let words = clause.words();
    words.len() * 2 - 1
}

fn phrase_matches(clause: Clause, tokens: &[Token], idx: usize) -> bool {
    let words = clause.words();
    let mut pos = idx;
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            match tokens.get(pos) {
                Some(Token::Whitespace) => pos += 1,
                _ => return false,
            }
        }
        match tokens.get(pos) {
            Some(Token::AlphanumRaw(content)) if content.to_uppercase() == *word => pos += 1,
            _ => return false,
        }
    }
    true
}

/// Attempts to match a clause keyword phrase starting at `idx`. Returns the
/// matched clause and the number of tokens it consumed.
fn try_match(tokens: &[Token], idx: usize) -> Option<(Clause, usize)> {
    if tokens.get(idx).map(Token::is_string_literal).unwrap_or(false) {
        return None;
    }
    for &clause in PRIORITY {
        let len = phrase_token_len(clause);
        // A keyword match is only honored when at least one token follows it,
        // matching the reference scanner's lookahead requirement.
        if idx + len >= tokens.len() {
            continue;
        }
        if phrase_matches(clause, tokens, idx) {
            return Some((clause, len));
        }
    }
    None
}

fn strip_whitespace_edges(tokens: &[Token]) -> Vec<Token> {
    let mut start = 0;
    let mut end = tokens.len();
    while start < end && tokens[start].is_whitespace() {
        start += 1;
    }
    while end > start && tokens[end - 1].is_whitespace() {
        end -= 1;
    }
    tokens[start..end].to_vec()
}

/// Partitions a normalized token stream into a clause map.
///
/// Each clause keyword may appear at most once; a repeat occurrence is a
/// [`ParseError::DuplicateClause`].
pub fn split_clauses(tokens: &[Token]) -> Result<IndexMap<Clause, Vec<Token>>, ParseError> {
    let mut result: IndexMap<Clause, Vec<Token>> = IndexMap::default();
    let mut prev: Option<Clause> = None;
    let mut k = 0usize;
    let mut i = 0usize;
    while i < tokens.len() {
        match try_match(tokens, i) {
            None => i += 1,
            Some((clause, len)) => {
                if let Some(prev_clause) = prev {
                    result.insert(prev_clause, strip_whitespace_edges(&tokens[k..i]));
                }
                if result.contains_key(&clause) {
                    return Err(ParseError::DuplicateClause { clause: clause.name() });
                }
                prev = Some(clause);
                i += len;
                k = i;
            }
        }
    }
    if let Some(prev_clause) = prev {
        result.insert(prev_clause, strip_whitespace_edges(&tokens[k..i]));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{join_tokens, lex};
    use pretty_assertions::assert_eq;

    fn split(src: &str) -> IndexMap<Clause, Vec<Token>> {
        split_clauses(&lex(src).unwrap()).unwrap()
    }

    #[test]
    fn select_distinct_wins_over_select() {
        let clauses = split("select distinct a1 where a2 > 1");
        assert!(clauses.contains_key(&Clause::SelectDistinct));
        assert!(!clauses.contains_key(&Clause::Select));
        assert_eq!(join_tokens(&clauses[&Clause::SelectDistinct]), "a1");
        assert_eq!(join_tokens(&clauses[&Clause::Where]), "a2 > 1");
    }

    #[test]
    fn strict_left_join_wins_over_left_join() {
        let clauses = split("select a1 strict left join /tmp/b.tsv on a1 == b1");
        assert!(clauses.contains_key(&Clause::StrictLeftJoin));
        assert!(!clauses.contains_key(&Clause::LeftJoin));
    }

    #[test]
    fn duplicate_where_is_an_error() {
        let tokens = lex("select a1 where a2 > 1 where a3 > 2").unwrap();
        let err = split_clauses(&tokens).unwrap_err();
        assert_eq!(err, ParseError::DuplicateClause { clause: "WHERE" });
    }

    #[test]
    fn keyword_inside_string_literal_is_ignored() {
        let clauses = split(r#"select "where" where a1 > 1"#);
        assert_eq!(join_tokens(&clauses[&Clause::Select]), "\"where\"");
        assert_eq!(join_tokens(&clauses[&Clause::Where]), "a1 > 1");
    }

    #[test]
    fn order_by_is_recognized() {
        let clauses = split("select a1 order by a1 desc");
        assert_eq!(join_tokens(&clauses[&Clause::OrderBy]), "a1 desc");
    }
}
