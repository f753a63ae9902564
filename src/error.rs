// ABOUTME: Error taxonomy for the Lambdora interpreter

use std::rc::Rc;
use thiserror::Error;

/// Location of a lexical or syntactic error in the source text.
///
/// `line` and `column` are 1-based; `line_text` is the full offending line,
/// kept around so the renderer can draw a caret under the column.
#[derive(Debug, Clone)]
pub struct SourcePos {
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
    pub line_text: Rc<str>,
}

#[derive(Error, Debug, Clone)]
pub enum LambError {
    #[error("{message}")]
    Tokenize { message: String, pos: SourcePos },

    #[error("{message}")]
    Parse {
        message: String,
        pos: Option<SourcePos>,
    },

    #[error("macro '{name}' expects {expected} argument{}, got {actual}", if *.expected == 1 { "" } else { "s" })]
    MacroExpansion {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("{0}")]
    Eval(String),

    #[error("{primitive}: {message}")]
    Builtin {
        primitive: &'static str,
        message: String,
    },

    #[error("recursive binding '{0}' accessed before initialisation")]
    RecursionInit(String),
}

impl LambError {
    pub fn eval(message: impl Into<String>) -> Self {
        LambError::Eval(message.into())
    }

    pub fn unbound(name: &str) -> Self {
        LambError::Eval(format!("unbound variable: {name}"))
    }

    pub fn builtin(primitive: &'static str, message: impl Into<String>) -> Self {
        LambError::Builtin {
            primitive,
            message: message.into(),
        }
    }

    /// Source position, when the error carries one.
    pub fn pos(&self) -> Option<&SourcePos> {
        match self {
            LambError::Tokenize { pos, .. } => Some(pos),
            LambError::Parse { pos, .. } => pos.as_ref(),
            _ => None,
        }
    }
}

/// Render an error as a multi-line report: the message, the offending source
/// line with a caret under the column, and a tip for common mistakes.
pub fn render(err: &LambError) -> String {
    let mut out = format!("Error: {err}");

    if let Some(pos) = err.pos() {
        out.push_str(&format!("\n  --> {}:{}:{}", pos.file, pos.line, pos.column));
        if !pos.line_text.is_empty() {
            let indent = " ".repeat(pos.column.saturating_sub(1) as usize);
            out.push_str(&format!("\n   | {}\n   | {indent}^", pos.line_text));
        }
    }

    if let Some(tip) = tip_for(err) {
        out.push_str(&format!("\ntip: {tip}"));
    }

    out
}

fn tip_for(err: &LambError) -> Option<&'static str> {
    match err {
        LambError::Tokenize { message, .. } if message.contains("string") => {
            Some("close the string with '\"'")
        }
        LambError::Parse { message, .. } if message.contains("lambda") || message.contains('λ') => {
            Some("lambda syntax is (lambda x . body)")
        }
        LambError::Parse { message, .. }
            if message.contains(')') || message.contains("end of input") =>
        {
            Some("check for a missing or unbalanced ')'")
        }
        LambError::Eval(message) if message.contains("unbound variable") => {
            Some("check the spelling, or define it first with (define name value)")
        }
        _ => None,
    }
}
