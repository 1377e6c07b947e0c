//! Tokenizer for the host expression sub-language (the text that ends up
//! inside `fields[...]`, `bfields[...]`, `WHERE ...`, `ORDER BY ...` after
//! column-variable rewriting).

use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    Eof,
}

pub fn tokenize(src: &str) -> Result<Vec<Tok>, EvalError> {
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0usize;
    let mut out = Vec::new();
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '(' => {
                out.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                out.push(Tok::RParen);
                i += 1;
            }
            '[' => {
                out.push(Tok::LBracket);
                i += 1;
            }
            ']' => {
                out.push(Tok::RBracket);
                i += 1;
            }
            ',' => {
                out.push(Tok::Comma);
                i += 1;
            }
            '.' if !chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
                out.push(Tok::Dot);
                i += 1;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
            }
            '*' => {
                out.push(Tok::Star);
                i += 1;
            }
            '/' => {
                out.push(Tok::Slash);
                i += 1;
            }
            '%' => {
                out.push(Tok::Percent);
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                out.push(Tok::EqEq);
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                out.push(Tok::NotEq);
                i += 2;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                out.push(Tok::Le);
                i += 2;
            }
            '<' => {
                out.push(Tok::Lt);
                i += 1;
            }
            '>' if chars.get(i + 1) == Some(&'=') => {
                out.push(Tok::Ge);
                i += 2;
            }
            '>' => {
                out.push(Tok::Gt);
                i += 1;
            }
            '\'' | '"' => {
                let (s, consumed) = read_string(&chars[i..], c)?;
                out.push(Tok::Str(s));
                i += consumed;
            }
            _ if c.is_ascii_digit() => {
                let (tok, consumed) = read_number(&chars[i..]);
                out.push(tok);
                i += consumed;
            }
            _ if c.is_alphabetic() || c == '_' => {
                let (word, consumed) = read_ident(&chars[i..]);
                i += consumed;
                out.push(match word.as_str() {
                    "and" => Tok::And,
                    "or" => Tok::Or,
                    "not" => Tok::Not,
                    _ => Tok::Ident(word),
                });
            }
            other => return Err(EvalError::Parse(format!("unexpected character '{other}'"))),
        }
    }
    out.push(Tok::Eof);
    Ok(out)
}

fn read_string(chars: &[char], quote: char) -> Result<(String, usize), EvalError> {
    let mut out = String::new();
    let mut i = 1usize;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() && chars[i + 1] == quote {
            out.push(quote);
            i += 2;
            continue;
        }
        if c == quote {
            return Ok((out, i + 1));
        }
        out.push(c);
        i += 1;
    }
    Err(EvalError::Parse("unterminated string literal".to_string()))
}

fn read_number(chars: &[char]) -> (Tok, usize) {
    let mut i = 0usize;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    let mut is_float = false;
    if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
        is_float = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    let text: String = chars[..i].iter().collect();
    if is_float {
        (Tok::Float(text.parse().unwrap()), i)
    } else {
        (Tok::Int(text.parse().unwrap()), i)
    }
}

fn read_ident(chars: &[char]) -> (String, usize) {
    let mut i = 0usize;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    (chars[..i].iter().collect(), i)
}
