// ABOUTME: Recursive-descent parser turning tokens into expression trees

use crate::error::{LambError, SourcePos};
use crate::expr::Expr;
use crate::tokenizer::{Token, TokenKind};
use std::rc::Rc;

/// Parse exactly one expression; trailing tokens are an error.
pub fn parse(tokens: &[Token]) -> Result<Expr, LambError> {
    let mut cursor = Cursor::new(tokens);
    let expr = cursor.expression()?;
    if let Some(extra) = cursor.peek() {
        return Err(parse_error(
            format!("unexpected trailing input starting at '{}'", extra.text),
            Some(extra.pos.clone()),
        ));
    }
    Ok(expr)
}

/// Parse a whole program: a sequence of top-level expressions.
pub fn parse_all(tokens: &[Token]) -> Result<Vec<Expr>, LambError> {
    let mut cursor = Cursor::new(tokens);
    let mut exprs = Vec::new();
    while cursor.peek().is_some() {
        exprs.push(cursor.expression()?);
    }
    Ok(exprs)
}

fn parse_error(message: String, pos: Option<SourcePos>) -> LambError {
    LambError::Parse { message, pos }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, index: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.index);
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Position to blame for an unexpected end of input.
    fn last_pos(&self) -> Option<SourcePos> {
        self.tokens.last().map(|t| t.pos.clone())
    }

    fn err_here(&self, message: impl Into<String>) -> LambError {
        let pos = self.peek().map(|t| t.pos.clone()).or_else(|| self.last_pos());
        parse_error(message.into(), pos)
    }

    fn expect_next(&mut self, what: &str) -> Result<&'a Token, LambError> {
        let pos = self.last_pos();
        self.next()
            .ok_or_else(|| parse_error(format!("unexpected end of input, expected {what}"), pos))
    }

    fn expect_kind(&mut self, kind: TokenKind, what: &str) -> Result<&'a Token, LambError> {
        let token = self.expect_next(what)?;
        if token.kind != kind {
            return Err(parse_error(
                format!("expected {what}, found '{}'", token.text),
                Some(token.pos.clone()),
            ));
        }
        Ok(token)
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, LambError> {
        let token = self.expect_next(what)?;
        if token.kind != TokenKind::Ident {
            return Err(parse_error(
                format!("expected {what}, found '{}'", token.text),
                Some(token.pos.clone()),
            ));
        }
        Ok(token.text.clone())
    }

    fn expression(&mut self) -> Result<Expr, LambError> {
        let token = self.expect_next("an expression")?;
        match token.kind {
            TokenKind::Backquote => Ok(Expr::Quasiquote(Rc::new(self.expression()?))),
            TokenKind::Comma => Ok(Expr::Unquote(Rc::new(self.expression()?))),
            TokenKind::Quote => Ok(Expr::Quote(Rc::new(self.expression()?))),
            TokenKind::LParen => self.compound(),
            TokenKind::Int => Ok(Expr::Literal(token.text.clone())),
            TokenKind::Str => Ok(Expr::Literal(token.text.clone())),
            TokenKind::Ident | TokenKind::Op => Ok(Expr::Variable(token.text.clone())),
            TokenKind::RParen | TokenKind::Dot => Err(parse_error(
                format!("unexpected token '{}'", token.text),
                Some(token.pos.clone()),
            )),
        }
    }

    /// Everything that starts with '('. Special forms are recognized by
    /// their first token, anything else is an n-ary application.
    fn compound(&mut self) -> Result<Expr, LambError> {
        let head = self
            .peek()
            .ok_or_else(|| parse_error("unexpected end of input after '('".to_string(), self.last_pos()))?;

        if head.kind == TokenKind::Ident {
            match head.text.as_str() {
                "λ" | "lambda" => {
                    self.next();
                    return self.lambda();
                }
                "let" => {
                    self.next();
                    return self.let_form();
                }
                "letrec" => {
                    self.next();
                    return self.letrec();
                }
                "define" => {
                    self.next();
                    return self.define();
                }
                "if" => {
                    self.next();
                    return self.if_form();
                }
                "defmacro" => {
                    self.next();
                    return self.defmacro();
                }
                "quote" => {
                    self.next();
                    return self.wrapped(Expr::Quote, "quote");
                }
                "quasiquote" => {
                    self.next();
                    return self.wrapped(Expr::Quasiquote, "quasiquote");
                }
                "unquote" => {
                    self.next();
                    return self.wrapped(Expr::Unquote, "unquote");
                }
                _ => {}
            }
        }

        // Application: head expression followed by zero or more arguments
        let func = self.expression()?;
        let mut args = Vec::new();
        loop {
            match self.peek() {
                Some(t) if t.kind == TokenKind::RParen => {
                    self.next();
                    return Ok(Expr::Application {
                        func: Rc::new(func),
                        args,
                    });
                }
                Some(_) => args.push(self.expression()?),
                None => {
                    return Err(parse_error(
                        "unexpected end of input, expected ')' to close application".to_string(),
                        self.last_pos(),
                    ))
                }
            }
        }
    }

    /// `(lambda <param> . <body>)`
    fn lambda(&mut self) -> Result<Expr, LambError> {
        // Tolerate a stray ',' before the parameter, as appears in
        // quasiquoted lambda templates
        if matches!(self.peek(), Some(t) if t.kind == TokenKind::Comma) {
            self.next();
        }
        let param = self.expect_ident("a lambda parameter name")?;
        self.expect_kind(TokenKind::Dot, "'.' after lambda parameter")?;
        let body = self.expression()?;
        self.expect_kind(TokenKind::RParen, "')' after lambda body")?;
        Ok(Expr::Abstraction {
            param,
            body: Rc::new(body),
        })
    }

    /// `(let <var> <value> <body>)` desugars to immediate application.
    fn let_form(&mut self) -> Result<Expr, LambError> {
        let var = self.expect_ident("a let variable name")?;
        let value = self.expression()?;
        let body = self.expression()?;
        self.expect_kind(TokenKind::RParen, "')' after let body")?;
        Ok(Expr::Application {
            func: Rc::new(Expr::Abstraction {
                param: var,
                body: Rc::new(body),
            }),
            args: vec![value],
        })
    }

    /// `(letrec ((n1 v1) ... (nk vk)) body1 ... bodym)`
    fn letrec(&mut self) -> Result<Expr, LambError> {
        self.expect_kind(TokenKind::LParen, "'(' to open letrec bindings")?;

        let mut bindings = Vec::new();
        loop {
            match self.peek() {
                Some(t) if t.kind == TokenKind::RParen => {
                    self.next();
                    break;
                }
                Some(_) => {
                    self.expect_kind(TokenKind::LParen, "'(' to open a letrec binding")?;
                    let name = self.expect_ident("a letrec binding name")?;
                    let value = self.expression()?;
                    self.expect_kind(TokenKind::RParen, "')' after letrec binding")?;
                    bindings.push((name, value));
                }
                None => {
                    return Err(parse_error(
                        "unexpected end of input in letrec bindings".to_string(),
                        self.last_pos(),
                    ))
                }
            }
        }

        let mut body = Vec::new();
        loop {
            match self.peek() {
                Some(t) if t.kind == TokenKind::RParen => {
                    self.next();
                    break;
                }
                Some(_) => body.push(self.expression()?),
                None => {
                    return Err(parse_error(
                        "unexpected end of input in letrec body".to_string(),
                        self.last_pos(),
                    ))
                }
            }
        }

        if body.is_empty() {
            return Err(self.err_here("letrec body cannot be empty"));
        }

        Ok(Expr::LetRec { bindings, body })
    }

    /// `(define <name> <value>)`
    fn define(&mut self) -> Result<Expr, LambError> {
        let token = self.expect_next("a name to define")?;
        let name = match token.kind {
            TokenKind::Ident | TokenKind::Op => token.text.clone(),
            _ => {
                return Err(parse_error(
                    format!("expected a name to define, found '{}'", token.text),
                    Some(token.pos.clone()),
                ))
            }
        };
        let value = self.expression()?;
        self.expect_kind(TokenKind::RParen, "')' after define value")?;
        Ok(Expr::Define {
            name,
            value: Rc::new(value),
        })
    }

    /// `(if <cond> <then> <else>)`
    fn if_form(&mut self) -> Result<Expr, LambError> {
        let cond = self.expression()?;
        let then_branch = self.expression()?;
        let else_branch = self.expression()?;
        self.expect_kind(TokenKind::RParen, "')' after if branches")?;
        Ok(Expr::If {
            cond: Rc::new(cond),
            then_branch: Rc::new(then_branch),
            else_branch: Rc::new(else_branch),
        })
    }

    /// `(defmacro <name> (p1 ... pk) <body>)`
    fn defmacro(&mut self) -> Result<Expr, LambError> {
        let name = self.expect_ident("a macro name")?;
        self.expect_kind(TokenKind::LParen, "'(' to open macro parameters")?;

        let mut params = Vec::new();
        loop {
            match self.peek() {
                Some(t) if t.kind == TokenKind::RParen => {
                    self.next();
                    break;
                }
                Some(_) => params.push(self.expect_ident("a macro parameter name")?),
                None => {
                    return Err(parse_error(
                        "unterminated parameter list in defmacro".to_string(),
                        self.last_pos(),
                    ))
                }
            }
        }

        let body = self.expression()?;
        self.expect_kind(TokenKind::RParen, "')' after defmacro body")?;
        Ok(Expr::DefMacro {
            name,
            params,
            body: Rc::new(body),
        })
    }

    /// `(quote e)`, `(quasiquote e)`, `(unquote e)`
    fn wrapped(
        &mut self,
        build: fn(Rc<Expr>) -> Expr,
        form: &str,
    ) -> Result<Expr, LambError> {
        let inner = self.expression()?;
        self.expect_kind(TokenKind::RParen, &format!("')' after {form}"))?;
        Ok(build(Rc::new(inner)))
    }
}
