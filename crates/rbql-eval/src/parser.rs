//! Recursive-descent / precedence-climbing parser producing an [`Expr`] AST
//! from the host expression sub-language's token stream.

use crate::ast::{BinOp, Expr, FieldBase, UnaryOp};
use crate::error::EvalError;
use crate::tokenizer::{tokenize, Tok};

pub struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Tok {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Tok {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Tok) -> Result<(), EvalError> {
        if self.peek() == expected {
            self.bump();
            Ok(())
        } else {
            Err(EvalError::Parse(format!("expected {expected:?}, found {:?}", self.peek())))
        }
    }

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), Tok::Or) {
            self.bump();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_not()?;
        while matches!(self.peek(), Tok::And) {
            self.bump();
            let rhs = self.parse_not()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, EvalError> {
        if matches!(self.peek(), Tok::Not) {
            self.bump();
            let inner = self.parse_not()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Expr, EvalError> {
        let lhs = self.parse_add()?;
        let op = match self.peek() {
            Tok::EqEq => BinOp::Eq,
            Tok::NotEq => BinOp::Ne,
            Tok::Lt => BinOp::Lt,
            Tok::Le => BinOp::Le,
            Tok::Gt => BinOp::Gt,
            Tok::Ge => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.bump();
        let rhs = self.parse_add()?;
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_add(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Tok::Plus => BinOp::Add,
                Tok::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_mul()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Tok::Star => BinOp::Mul,
                Tok::Slash => BinOp::Div,
                Tok::Percent => BinOp::Mod,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        if matches!(self.peek(), Tok::Minus) {
            self.bump();
            let inner = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(inner)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Tok::LBracket => {
                    self.bump();
                    let index = self.parse_or()?;
                    self.expect(&Tok::RBracket)?;
                    let base = match &expr {
                        Expr::Ident(name) if name == "fields" => FieldBase::A,
                        Expr::Ident(name) if name == "bfields" => FieldBase::B,
                        _ => {
                            return Err(EvalError::Parse(
                                "indexing is only supported on fields/bfields".to_string(),
                            ))
                        }
                    };
                    expr = Expr::FieldIndex(base, Box::new(index));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, EvalError> {
        self.expect(&Tok::LParen)?;
        let mut args = Vec::new();
        if !matches!(self.peek(), Tok::RParen) {
            args.push(self.parse_or()?);
            while matches!(self.peek(), Tok::Comma) {
                self.bump();
                args.push(self.parse_or()?);
            }
        }
        self.expect(&Tok::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.bump() {
            Tok::Int(n) => Ok(Expr::Int(n)),
            Tok::Float(x) => Ok(Expr::Float(x)),
            Tok::Str(s) => Ok(Expr::Str(s)),
            Tok::LParen => {
                let inner = self.parse_or()?;
                self.expect(&Tok::RParen)?;
                Ok(inner)
            }
            Tok::Ident(name) => {
                let mut full_name = name;
                if matches!(self.peek(), Tok::Dot) {
                    self.bump();
                    match self.bump() {
                        Tok::Ident(suffix) => full_name = format!("{full_name}.{suffix}"),
                        other => return Err(EvalError::Parse(format!("expected identifier after '.', found {other:?}"))),
                    }
                }
                if matches!(self.peek(), Tok::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::Call(full_name, args))
                } else {
                    Ok(Expr::Ident(full_name))
                }
            }
            other => Err(EvalError::Parse(format!("unexpected token {other:?}"))),
        }
    }
}

fn parse_one(src: &str) -> Result<(Expr, Parser), EvalError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    Ok((expr, parser))
}

/// Parses a single expression, requiring the whole source to be consumed.
pub fn parse_expr(src: &str) -> Result<Expr, EvalError> {
    let (expr, mut parser) = parse_one(src)?;
    if !matches!(parser.peek(), Tok::Eof) {
        return Err(EvalError::Parse(format!("unexpected trailing token {:?}", parser.peek())));
    }
    Ok(expr)
}

/// Parses a top-level comma-separated expression list (a SELECT list).
pub fn parse_expr_list(src: &str) -> Result<Vec<Expr>, EvalError> {
    let (first, mut parser) = parse_one(src)?;
    let mut list = vec![first];
    while matches!(parser.peek(), Tok::Comma) {
        parser.bump();
        list.push(parser.parse_or()?);
    }
    if !matches!(parser.peek(), Tok::Eof) {
        return Err(EvalError::Parse(format!("unexpected trailing token {:?}", parser.peek())));
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_arithmetic_precedence() {
        let expr = parse_expr("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinOp::Add,
                Box::new(Expr::Int(1)),
                Box::new(Expr::Binary(BinOp::Mul, Box::new(Expr::Int(2)), Box::new(Expr::Int(3))))
            )
        );
    }

    #[test]
    fn parses_field_index() {
        let expr = parse_expr("fields[0]").unwrap();
        assert_eq!(expr, Expr::FieldIndex(FieldBase::A, Box::new(Expr::Int(0))));
    }

    #[test]
    fn parses_dotted_call() {
        let expr = parse_expr("math.sqrt(4)").unwrap();
        assert_eq!(expr, Expr::Call("math.sqrt".to_string(), vec![Expr::Int(4)]));
    }

    #[test]
    fn parses_select_list() {
        let list = parse_expr_list("fields[0], fields[1], len(fields[2])").unwrap();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn parses_multi_key_order_by_list() {
        let list = parse_expr_list("fields[1] , int ( fields [ 0 ] )").unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn parses_and_or_not_precedence() {
        let expr = parse_expr("not a and b or c").unwrap();
        // `(not a) and b` then `or c`
        assert_eq!(
            expr,
            Expr::Binary(
                BinOp::Or,
                Box::new(Expr::Binary(
                    BinOp::And,
                    Box::new(Expr::Unary(UnaryOp::Not, Box::new(Expr::Ident("a".into())))),
                    Box::new(Expr::Ident("b".into()))
                )),
                Box::new(Expr::Ident("c".into()))
            )
        );
    }
}
