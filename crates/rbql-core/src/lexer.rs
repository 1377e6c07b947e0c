//! Converts raw RBQL source into a flat token stream.
//!
//! Lexing runs in three passes over the comment-stripped source: a
//! string-literal pass that isolates quoted spans verbatim, a term pass that
//! splits the remaining raw runs on whitespace and boundary characters, and a
//! final pass that collapses consecutive whitespace tokens.

use crate::error::ParseError;

/// A single lexical unit of an RBQL query.
///
/// String literals are never touched by later rewrite passes: their content
/// is preserved byte-for-byte, quotes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Raw(String),
    StringLiteral(String),
    Whitespace,
    AlphanumRaw(String),
    SymbolRaw(char),
}

impl Token {
    pub fn content(&self) -> String {
        match self {
            Token::Raw(s) | Token::StringLiteral(s) | Token::AlphanumRaw(s) => s.clone(),
            Token::Whitespace => " ".to_string(),
            Token::SymbolRaw(c) => c.to_string(),
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self, Token::StringLiteral(_))
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace)
    }

    /// A token can participate in keyword / column-variable matching only if
    /// it is an `AlphanumRaw` or `SymbolRaw` token produced by the term pass.
    pub fn is_matchable(&self) -> bool {
        matches!(self, Token::AlphanumRaw(_) | Token::SymbolRaw(_))
    }

    fn set_content(&mut self, content: String) {
        match self {
            Token::Raw(s) | Token::StringLiteral(s) | Token::AlphanumRaw(s) => *s = content,
            Token::Whitespace | Token::SymbolRaw(_) => {}
        }
    }
}

fn is_boundary(c: char) -> bool {
    !(c == '_' || c.is_ascii_alphanumeric())
}

fn is_escaped_quote(line: &[char], i: usize) -> bool {
    if i == 0 {
        return false;
    }
    if i == 1 && line[i - 1] == '\\' {
        return true;
    }
    line[i - 1] == '\\' && line[i - 2] != '\\'
}

/// Strips a trailing `#` comment (outside string literals), trailing
/// whitespace, and replaces tabs with spaces.
pub fn strip_comments(line: &str) -> String {
    let line = line.trim_end();
    let line: String = line.chars().map(|c| if c == '\t' { ' ' } else { c }).collect();
    let chars: Vec<char> = line.chars().collect();
    let mut cur_quote: Option<char> = None;
    for (i, &c) in chars.iter().enumerate() {
        if cur_quote.is_none() && c == '#' {
            return chars[..i].iter().collect::<String>().trim_end().to_string();
        }
        if cur_quote.is_none() && (c == '\'' || c == '"') {
            cur_quote = Some(c);
            continue;
        }
        if cur_quote == Some(c) && !is_escaped_quote(&chars, i) {
            cur_quote = None;
        }
    }
    line
}

fn tokenize_string_literals(lines: &[String]) -> Vec<Token> {
    let mut result = Vec::new();
    for line in lines {
        let chars: Vec<char> = line.chars().collect();
        let mut cur_quote: Option<char> = None;
        let mut k = 0usize;
        let mut i = 0usize;
        while i < chars.len() {
            let c = chars[i];
            if cur_quote.is_none() && (c == '\'' || c == '"') {
                cur_quote = Some(c);
                result.push(Token::Raw(chars[k..i].iter().collect()));
                k = i;
            } else if cur_quote == Some(c) && !is_escaped_quote(&chars, i) {
                cur_quote = None;
                result.push(Token::StringLiteral(chars[k..=i].iter().collect()));
                k = i + 1;
            }
            i += 1;
        }
        if k < i {
            result.push(Token::Raw(chars[k..i].iter().collect()));
        }
        result.push(Token::Whitespace);
    }
    result
}

fn tokenize_terms(tokens: Vec<Token>) -> Vec<Token> {
    let mut result = Vec::new();
    for token in tokens {
        let content = match token {
            Token::Raw(content) => content,
            other => {
                result.push(other);
                continue;
            }
        };
        let chars: Vec<char> = content.chars().collect();
        let mut i = 0usize;
        let mut k = 0usize;
        let mut in_alphanumeric = false;
        while i < chars.len() {
            let c = chars[i];
            if c == ' ' || is_boundary(c) {
                if k < i {
                    result.push(Token::AlphanumRaw(chars[k..i].iter().collect()));
                }
                k = i + 1;
                in_alphanumeric = false;
                if c == ' ' {
                    result.push(Token::Whitespace);
                } else {
                    result.push(Token::SymbolRaw(c));
                }
            } else if !in_alphanumeric {
                in_alphanumeric = true;
                k = i;
            }
            i += 1;
        }
        if k < i {
            result.push(Token::AlphanumRaw(chars[k..i].iter().collect()));
        }
    }
    result
}

fn remove_consecutive_whitespaces(tokens: Vec<Token>) -> Vec<Token> {
    let mut result = Vec::new();
    for token in tokens {
        let prev_is_whitespace = result.last().map(Token::is_whitespace).unwrap_or(false);
        if !(token.is_whitespace() && prev_is_whitespace) {
            result.push(token);
        }
    }
    if result.first().map(Token::is_whitespace).unwrap_or(false) {
        result.remove(0);
    }
    if result.last().map(Token::is_whitespace).unwrap_or(false) {
        result.pop();
    }
    result
}

/// Lexes full RBQL source (possibly multiple lines) into a normalized token
/// stream, ready for clause splitting.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lines = Vec::new();
    for (idx, raw_line) in source.lines().enumerate() {
        if raw_line.contains("'''") || raw_line.contains("\"\"\"") {
            return Err(ParseError::MultilineLiteral { line: idx + 1 });
        }
        let stripped = strip_comments(raw_line);
        if !stripped.is_empty() {
            lines.push(stripped);
        }
    }
    let tokens = tokenize_string_literals(&lines);
    let tokens = tokenize_terms(tokens);
    Ok(remove_consecutive_whitespaces(tokens))
}

/// Joins token contents back into source text, trimming the result. Used by
/// the clause splitter once a clause body has been isolated.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(Token::content).collect::<String>().trim().to_string()
}

pub(crate) fn rewrite_content(tokens: &mut [Token], idx: usize, new_content: String) {
    tokens[idx].set_content(new_content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_trailing_comment() {
        assert_eq!(strip_comments("select a1 #comment"), "select a1");
    }

    #[test]
    fn hash_inside_literal_is_not_a_comment() {
        assert_eq!(strip_comments("select \"a#b\" #real"), "select \"a#b\"");
    }

    #[test]
    fn tabs_become_spaces() {
        assert_eq!(strip_comments("select\ta1"), "select a1");
    }

    #[test]
    fn rejects_triple_quote() {
        let err = lex("select '''x'''").unwrap_err();
        assert_eq!(err, ParseError::MultilineLiteral { line: 1 });
    }

    #[test]
    fn lexes_string_literal_verbatim() {
        let tokens = lex(r#"select "a b", a1"#).unwrap();
        assert!(tokens.iter().any(|t| matches!(t, Token::StringLiteral(s) if s == "\"a b\"")));
    }

    #[test]
    fn round_trip_join_tokens() {
        let src = "select a1, a2 where a1 > 5";
        let tokens = lex(src).unwrap();
        assert_eq!(join_tokens(&tokens), src);
    }

    #[test]
    fn collapses_consecutive_whitespace() {
        let tokens = lex("select   distinct  a1").unwrap();
        assert_eq!(join_tokens(&tokens), "select distinct a1");
    }

    #[test]
    fn escaped_quote_does_not_close_literal() {
        let tokens = lex(r#"select "a\"b""#).unwrap();
        assert!(tokens.iter().any(|t| matches!(t, Token::StringLiteral(s) if s == r#""a\"b""#)));
    }
}
