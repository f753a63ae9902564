// ABOUTME: Syntax highlighter for the REPL prompt line

use rustyline::highlight::{CmdKind, Highlighter};
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;

// 4-bit ANSI colors for maximum terminal compatibility
const COLOR_RESET: &str = "\x1b[0m";
const COLOR_PARENS: &str = "\x1b[1;34m"; // Bold blue
const COLOR_SPECIAL_FORM: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_BUILTIN: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_COMMENT: &str = "\x1b[90m"; // Gray
const COLOR_QUOTE: &str = "\x1b[1;33m"; // Bold yellow

const SPECIAL_FORMS: &[&str] = &[
    "lambda",
    "λ",
    "let",
    "letrec",
    "define",
    "if",
    "defmacro",
    "quote",
    "quasiquote",
    "unquote",
];

const BUILTINS: &[&str] = &[
    "+", "-", "*", "/", "%", "=", "<", "not", "and", "or", "cons", "head", "tail", "isNil",
    "print", "gensym", "true", "false", "nil",
];

#[derive(Completer, Helper, Hinter, Validator)]
pub struct LambHelper;

impl LambHelper {
    pub fn new() -> Self {
        LambHelper
    }
}

impl Default for LambHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for LambHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let highlighted = highlight_line(line);
        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, line: &str, _pos: usize, _kind: CmdKind) -> bool {
        !line.is_empty()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '?' | '+' | '*' | '/' | '%' | '=' | '<' | '>' | '!')
}

fn colored(out: &mut String, color: &str, text: &str) {
    out.push_str(color);
    out.push_str(text);
    out.push_str(COLOR_RESET);
}

fn highlight_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ';' => {
                let rest: String = chars[i..].iter().collect();
                colored(&mut out, COLOR_COMMENT, &rest);
                break;
            }
            '"' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j] != '"' {
                    j += 1;
                }
                let end = (j + 1).min(chars.len());
                let text: String = chars[i..end].iter().collect();
                colored(&mut out, COLOR_STRING, &text);
                i = end;
            }
            '(' | ')' => {
                colored(&mut out, COLOR_PARENS, &c.to_string());
                i += 1;
            }
            '\'' | '`' | ',' => {
                colored(&mut out, COLOR_QUOTE, &c.to_string());
                i += 1;
            }
            '0'..='9' => {
                let mut j = i;
                while j < chars.len() && chars[j].is_ascii_digit() {
                    j += 1;
                }
                let text: String = chars[i..j].iter().collect();
                colored(&mut out, COLOR_NUMBER, &text);
                i = j;
            }
            'λ' => {
                colored(&mut out, COLOR_SPECIAL_FORM, "λ");
                i += 1;
            }
            c if is_word_char(c) => {
                let mut j = i;
                while j < chars.len() && is_word_char(chars[j]) {
                    j += 1;
                }
                let word: String = chars[i..j].iter().collect();
                if SPECIAL_FORMS.contains(&word.as_str()) {
                    colored(&mut out, COLOR_SPECIAL_FORM, &word);
                } else if BUILTINS.contains(&word.as_str()) {
                    colored(&mut out, COLOR_BUILTIN, &word);
                } else {
                    out.push_str(&word);
                }
                i = j;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}
