// ABOUTME: Tokenizer turning source text into position-tagged tokens

use crate::error::{LambError, SourcePos};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while_m_n};
use nom::character::complete::digit1;
use nom::combinator::recognize;
use nom::IResult;
use nom::Parser;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    Dot,
    Comma,
    Backquote,
    Quote,
    /// Decimal digit run.
    Int,
    /// String literal; `text` holds the content without the quotes.
    Str,
    /// Identifier, including the lambda symbol `λ`.
    Ident,
    /// Operator, single or multi character.
    Op,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: SourcePos,
}

/// Tokenize `source`, attaching `file` plus line/column to every token.
pub fn tokenize(source: &str, file: &str) -> Result<Vec<Token>, LambError> {
    Lexer::new(source, file).run()
}

fn multi_char_op(input: &str) -> IResult<&str, &str> {
    alt((tag("++"), tag("!="), tag("<="), tag(">="))).parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize((
        take_while_m_n(1, 1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '?'),
    ))
    .parse(input)
}

struct Lexer<'a> {
    rest: &'a str,
    file: Rc<str>,
    lines: Vec<Rc<str>>,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, file: &str) -> Self {
        Lexer {
            rest: source,
            file: Rc::from(file),
            lines: source.lines().map(Rc::from).collect(),
            line: 1,
            column: 1,
        }
    }

    fn pos(&self) -> SourcePos {
        SourcePos {
            file: Rc::clone(&self.file),
            line: self.line,
            column: self.column,
            line_text: self
                .lines
                .get(self.line as usize - 1)
                .cloned()
                .unwrap_or_else(|| Rc::from("")),
        }
    }

    /// Consume `bytes` from the input, updating line and column counters.
    fn advance(&mut self, bytes: usize) {
        for c in self.rest[..bytes].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.rest = &self.rest[bytes..];
    }

    fn push(&mut self, tokens: &mut Vec<Token>, kind: TokenKind, text: &str, bytes: usize) {
        tokens.push(Token {
            kind,
            text: text.to_string(),
            pos: self.pos(),
        });
        self.advance(bytes);
    }

    fn error(&self, message: String) -> LambError {
        LambError::Tokenize {
            message,
            pos: self.pos(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LambError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.rest.chars().next() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
                continue;
            }

            // Comments run from ';' to end of line
            if c == ';' {
                let end = self.rest.find('\n').unwrap_or(self.rest.len());
                self.advance(end);
                continue;
            }

            if c == '"' {
                self.string_literal(&mut tokens)?;
                continue;
            }

            // Multi-char operators take precedence over single-char ones
            if matches!(c, '+' | '!' | '<' | '>') {
                if let Ok((_, op)) = multi_char_op(self.rest) {
                    let len = op.len();
                    let text = op.to_string();
                    self.push(&mut tokens, TokenKind::Op, &text, len);
                    continue;
                }
            }

            if let Some(kind) = single_char_kind(c) {
                let mut buf = [0u8; 4];
                let text = c.encode_utf8(&mut buf).to_string();
                self.push(&mut tokens, kind, &text, c.len_utf8());
                continue;
            }

            // λ is an identifier-class token on its own, even when letters
            // follow it
            if c == 'λ' {
                self.push(&mut tokens, TokenKind::Ident, "λ", 'λ'.len_utf8());
                continue;
            }

            if c.is_ascii_digit() {
                match digit1::<&str, nom::error::Error<&str>>(self.rest) {
                    Ok((_, digits)) => {
                        let len = digits.len();
                        let text = digits.to_string();
                        self.push(&mut tokens, TokenKind::Int, &text, len);
                    }
                    Err(_) => return Err(self.error(format!("unexpected character '{c}'"))),
                }
                continue;
            }

            if c.is_ascii_alphabetic() || c == '_' {
                match identifier(self.rest) {
                    Ok((_, name)) => {
                        let len = name.len();
                        let text = name.to_string();
                        self.push(&mut tokens, TokenKind::Ident, &text, len);
                    }
                    Err(_) => return Err(self.error(format!("unexpected character '{c}'"))),
                }
                continue;
            }

            return Err(self.error(format!("unexpected character '{c}'")));
        }

        Ok(tokens)
    }

    fn string_literal(&mut self, tokens: &mut Vec<Token>) -> Result<(), LambError> {
        // The error, if any, points at the opening quote
        let open = self.pos();
        let body = &self.rest[1..];

        match body.find('"') {
            Some(end) => {
                let content = body[..end].to_string();
                tokens.push(Token {
                    kind: TokenKind::Str,
                    text: content,
                    pos: open,
                });
                // Newlines inside the literal advance the line counter
                self.advance(1 + end + 1);
                Ok(())
            }
            None => Err(LambError::Tokenize {
                message: "unterminated string literal".to_string(),
                pos: open,
            }),
        }
    }
}

fn single_char_kind(c: char) -> Option<TokenKind> {
    match c {
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '.' => Some(TokenKind::Dot),
        ',' => Some(TokenKind::Comma),
        '`' => Some(TokenKind::Backquote),
        '\'' => Some(TokenKind::Quote),
        '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' => Some(TokenKind::Op),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source, "<test>")
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(texts("(lambda x . x)"), vec!["(", "lambda", "x", ".", "x", ")"]);
    }

    #[test]
    fn test_lambda_symbol_is_its_own_token() {
        assert_eq!(texts("(λx. x)"), vec!["(", "λ", "x", ".", "x", ")"]);
    }

    #[test]
    fn test_comments_are_ignored() {
        assert_eq!(texts("(+ 1 2) ; this is a comment"), vec!["(", "+", "1", "2", ")"]);
        assert_eq!(texts("; only a comment"), Vec::<String>::new());
    }

    #[test]
    fn test_multi_char_operators_before_single() {
        assert_eq!(texts("<= >= != ++"), vec!["<=", ">=", "!=", "++"]);
        assert_eq!(texts("< = >"), vec!["<", "=", ">"]);
    }

    #[test]
    fn test_integer_literals() {
        let tokens = tokenize("42 007", "<test>").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].text, "007");
    }

    #[test]
    fn test_identifiers() {
        let tokens = tokenize("foo foo-bar foo? _tmp x2", "<test>").unwrap();
        let names: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(names, vec!["foo", "foo-bar", "foo?", "_tmp", "x2"]);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Ident));
    }

    #[test]
    fn test_string_literal_strips_quotes() {
        let tokens = tokenize("\"hello world\"", "<test>").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text, "hello world");
    }

    #[test]
    fn test_string_with_newline_advances_line_counter() {
        let tokens = tokenize("\"a\nb\" x", "<test>").unwrap();
        assert_eq!(tokens[0].text, "a\nb");
        assert_eq!(tokens[1].text, "x");
        assert_eq!(tokens[1].pos.line, 2);
    }

    #[test]
    fn test_unterminated_string_points_at_opening_quote() {
        let err = tokenize("  \"hello", "<test>").unwrap_err();
        match err {
            LambError::Tokenize { message, pos } => {
                assert!(message.contains("nterminated string"));
                assert_eq!(pos.line, 1);
                assert_eq!(pos.column, 3);
            }
            other => panic!("Expected TokenizeError, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("(+ 1 @)", "<test>").unwrap_err();
        match err {
            LambError::Tokenize { message, pos } => {
                assert!(message.contains('@'));
                assert_eq!(pos.line, 1);
                assert_eq!(pos.column, 6);
                assert_eq!(&*pos.line_text, "(+ 1 @)");
            }
            other => panic!("Expected TokenizeError, got {other:?}"),
        }
    }

    #[test]
    fn test_positions_across_lines() {
        let tokens = tokenize("(define x\n  42)", "<test>").unwrap();
        // (, define, x, 42, )
        assert_eq!(tokens[0].pos.line, 1);
        assert_eq!(tokens[0].pos.column, 1);
        assert_eq!(tokens[2].pos.column, 9);
        assert_eq!(tokens[3].pos.line, 2);
        assert_eq!(tokens[3].pos.column, 3);
    }

    #[test]
    fn test_reader_macro_tokens() {
        let tokens = tokenize("'x `y ,z", "<test>").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Quote);
        assert_eq!(tokens[2].kind, TokenKind::Backquote);
        assert_eq!(tokens[4].kind, TokenKind::Comma);
    }

    #[test]
    fn test_empty_source() {
        assert!(tokenize("", "<test>").unwrap().is_empty());
        assert!(tokenize("   \n\t  ", "<test>").unwrap().is_empty());
    }

    #[test]
    fn test_bare_bang_is_an_error() {
        // '!' only exists as part of '!='
        assert!(tokenize("!", "<test>").is_err());
    }
}
