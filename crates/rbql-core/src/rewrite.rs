//! Rewrites column-variable tokens (`aN`, `bN`) and the isolated `*` token
//! into the field-index expressions the host evaluator understands.

use fancy_regex::Regex;
use std::sync::LazyLock;

use crate::lexer::{rewrite_content, Token};

static A_COLUMN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^a([1-9][0-9]*)$").unwrap());
static B_COLUMN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^b([1-9][0-9]*)$").unwrap());

/// Rewrites `aN` / `bN` in `text` to `fields[N-1]` / `bfields[N-1]`, if it
/// matches either pattern. Returns `None` for anything else.
pub fn rewrite_column_var(text: &str) -> Option<String> {
    if let Ok(Some(m)) = A_COLUMN.captures(text) {
        let n: usize = m.get(1).unwrap().as_str().parse().unwrap();
        return Some(format!("fields[{}]", n - 1));
    }
    if let Ok(Some(m)) = B_COLUMN.captures(text) {
        let n: usize = m.get(1).unwrap().as_str().parse().unwrap();
        return Some(format!("bfields[{}]", n - 1));
    }
    None
}

pub fn is_a_column(text: &str) -> bool {
    matches!(A_COLUMN.is_match(text), Ok(true))
}

pub fn is_b_column(text: &str) -> bool {
    matches!(B_COLUMN.is_match(text), Ok(true))
}

/// Rewrites every non-string-literal `aN`/`bN` token in `tokens` in place.
pub fn replace_column_vars(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        if tokens[i].is_string_literal() {
            continue;
        }
        if let Some(replacement) = rewrite_column_var(&tokens[i].content()) {
            rewrite_content(tokens, i, replacement);
        }
    }
}

/// Rewrites a positionally-isolated `*` token to `star_line`.
///
/// A `*` is isolated iff its nearest non-whitespace neighbor on each side
/// (when one exists) ends/starts with a comma, so `a1, *, a3` qualifies but
/// `func(*)` does not.
pub fn replace_star_vars(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        if tokens[i].is_string_literal() {
            continue;
        }
        if tokens[i].content() != "*" {
            continue;
        }

        let mut j = i.checked_sub(1);
        if let Some(jj) = j {
            if tokens[jj].is_whitespace() {
                j = jj.checked_sub(1);
            }
        }
        if let Some(jj) = j {
            if !tokens[jj].content().ends_with(',') {
                continue;
            }
        }

        let mut j = Some(i + 1).filter(|&jj| jj < tokens.len());
        if let Some(jj) = j {
            if tokens[jj].is_whitespace() {
                j = Some(jj + 1).filter(|&jjj| jjj < tokens.len());
            }
        }
        if let Some(jj) = j {
            if !tokens[jj].content().starts_with(',') {
                continue;
            }
        }

        rewrite_content(tokens, i, "star_line".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{join_tokens, lex};
    use pretty_assertions::assert_eq;

    #[test]
    fn rewrites_a_and_b_columns() {
        assert_eq!(rewrite_column_var("a1"), Some("fields[0]".to_string()));
        assert_eq!(rewrite_column_var("a12"), Some("fields[11]".to_string()));
        assert_eq!(rewrite_column_var("b3"), Some("bfields[2]".to_string()));
        assert_eq!(rewrite_column_var("a0"), None);
        assert_eq!(rewrite_column_var("abc"), None);
    }

    #[test]
    fn star_between_commas_is_rewritten() {
        let mut tokens = lex("a1, *, a3").unwrap();
        replace_column_vars(&mut tokens);
        replace_star_vars(&mut tokens);
        assert_eq!(join_tokens(&tokens), "fields[0], star_line, fields[2]");
    }

    #[test]
    fn star_in_function_call_is_untouched() {
        let mut tokens = lex("func(*)").unwrap();
        replace_star_vars(&mut tokens);
        assert_eq!(join_tokens(&tokens), "func(*)");
    }

    #[test]
    fn leading_star_is_isolated() {
        let mut tokens = lex("*, a2").unwrap();
        replace_star_vars(&mut tokens);
        assert_eq!(join_tokens(&tokens), "star_line, a2");
    }

    #[test]
    fn solitary_star_is_isolated() {
        let mut tokens = lex("*").unwrap();
        replace_star_vars(&mut tokens);
        assert_eq!(join_tokens(&tokens), "star_line");
    }

    #[test]
    fn string_literal_is_never_rewritten() {
        let mut tokens = lex(r#""a1""#).unwrap();
        replace_column_vars(&mut tokens);
        assert_eq!(join_tokens(&tokens), "\"a1\"");
    }
}
