// ABOUTME: Constants for the CLI and REPL

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const PROMPT: &str = "λ> ";

pub const WELCOME_MESSAGE: &str = "Lambdora, a lambda-calculus Lisp";
pub const WELCOME_FOOTER: &str = "Type 'help' for syntax, 'exit' to leave.";

/// History lives in the user's home directory, REPL-only; dropping the file
/// loses nothing but convenience.
pub const HISTORY_FILE: &str = ".lambdora_history";

pub const HELP_TEXT: &str = r#"
Syntax:
  (lambda x . body)            single-parameter function, λ works too
  (f a b c)                    application, curried left to right
  (let x value body)           bind x in body
  (letrec ((n v) ...) body)    mutually recursive bindings
  (define name value)          bind name in the current scope
  (if cond then else)          cond must be a boolean
  (defmacro name (p ...) body) register a tree-rewriting macro
  'e  `e  ,e                   quote, quasiquote, unquote

Builtins:
  + - * / % = <                integer arithmetic and comparison
  not and or                   boolean logic (no short-circuit)
  cons head tail isNil         lists, nil-terminated
  print gensym                 console output, fresh identifiers
  true false nil               constants

Commands: help, clear, exit, quit
"#;
