//! Parsing Hack assembly source code into an AST.
//!
//! This module is used to convert strings (which represent assembly source code)
//! into abstract syntax trees that maintain all of the information of the source code
//! in an easy to handle format.
//!
//! The main function to use from this module is [`parse_ast`],
//! which parses an assembly code program into a list of statements.
//!
//! Parsing is done line by line:
//! 1. Comments (`//` to the end of the line) and surrounding whitespace are removed,
//!    and blank lines are skipped ([`source_lines`]).
//! 2. Each remaining line is classified into one of the three [`Command`] kinds
//!    and its fields are extracted ([`parse_command`]).

pub mod lex;

use std::borrow::Cow;
use std::ops::Range;

use crate::ast::asm::{Command, Stmt};
use crate::ast::{Comp, Dest, Jump, Label};
use lex::{lex_regs, lex_single, Token};

/// Parses an assembly source code string into a `Vec` of statements.
///
/// Parsing stops at the first erroneous line.
///
/// # Example
/// ```
/// use hack_ensemble::parse::parse_ast;
///
/// let src = "
///     // Adds 2 and 3
///     @2
///     D=A
///     @3
///     D=D+A   // D = 5
///     (END)
///     @END
///     0;JMP
/// ";
/// let ast = parse_ast(src).unwrap();
/// assert_eq!(ast.len(), 7);
///
/// // Syntax errors are raised:
/// assert!(parse_ast("@2\nD+A\n").is_err());
/// ```
pub fn parse_ast(src: &str) -> Result<Vec<Stmt>, ParseErr> {
    source_lines(src)
        .map(|(span, line)| {
            parse_command_at(line, span.start)
                .map(|nucleus| Stmt { nucleus, span: span.clone() })
                .map_err(|kind| ParseErr::new(kind, line, span))
        })
        .collect()
}

/// Iterates over the cleaned lines of a source string.
///
/// Each line has its `//` comment removed and whitespace trimmed.
/// Lines which are blank after this process are skipped.
///
/// This iterator yields the span of the cleaned line in the source string,
/// as well as the cleaned line itself.
///
/// # Example
/// ```
/// use hack_ensemble::parse::source_lines;
///
/// let src = "// comment\n  @2 // load 2\n\nD=A\r\n";
/// let lines: Vec<_> = source_lines(src).collect();
/// assert_eq!(lines, [(13..15, "@2"), (27..30, "D=A")]);
/// ```
pub fn source_lines(src: &str) -> impl Iterator<Item=(Range<usize>, &str)> + '_ {
    src.split('\n')
        .scan(0, |line_start, raw| {
            let start = *line_start;
            *line_start += raw.len() + 1;
            Some((start, raw))
        })
        .filter_map(|(start, raw)| {
            let code = raw.split_once("//").map_or(raw, |(left, _)| left);
            let trimmed = code.trim();
            if trimmed.is_empty() { return None; }

            let offset = start + (code.len() - code.trim_start().len());
            Some((offset .. offset + trimmed.len(), trimmed))
        })
}

/// Parses a single cleaned line (no comments, no surrounding whitespace) into a command.
///
/// The line is classified as:
/// 1. an address command, if it starts with `@` which is followed by a non-space character,
/// 2. a label command, if it is wrapped in parentheses with at least one character inside,
/// 3. a compute command, if it starts with `A`, `D`, `M`, or `0`, and contains `=` or `;`.
///
/// Anything else is a syntax error.
///
/// # Example
/// ```
/// use hack_ensemble::parse::{parse_command, ParseErrKind};
/// use hack_ensemble::ast::asm::Command;
/// use hack_ensemble::ast::{Comp, Jump};
///
/// assert_eq!(parse_command("@LOOP"), Ok(Command::Address("LOOP".to_string())));
/// assert_eq!(parse_command("0;JMP"), Ok(Command::Compute { dest: None, comp: Comp::Zero, jump: Some(Jump::JMP) }));
/// assert_eq!(parse_command("D=D+Q"), Err(ParseErrKind::UnknownComp));
/// assert_eq!(parse_command("GOTO 5"), Err(ParseErrKind::UnrecognizedCommand));
/// ```
pub fn parse_command(line: &str) -> Result<Command, ParseErrKind> {
    parse_command_at(line, 0)
}

/// Parses a single cleaned line which starts at index `start` of the source.
fn parse_command_at(line: &str, start: usize) -> Result<Command, ParseErrKind> {
    if let Some(sym) = line.strip_prefix('@').filter(|s| !s.is_empty() && !s.starts_with(' ')) {
        Ok(Command::Address(sym.to_string()))
    } else if let Some(name) = line.strip_prefix('(').and_then(|l| l.strip_suffix(')')).filter(|n| !n.is_empty()) {
        let name_start = start + 1;
        Ok(Command::Label(Label::new(name.to_string(), name_start..(name_start + name.len()))))
    } else if line.starts_with(['A', 'D', 'M', '0']) && line.contains(['=', ';']) {
        parse_compute(line)
    } else {
        Err(ParseErrKind::UnrecognizedCommand)
    }
}

/// Parses the fields of a compute command.
///
/// If there is a `=`, the line is `dest=comp`. Otherwise, it is `comp;jump`.
fn parse_compute(line: &str) -> Result<Command, ParseErrKind> {
    if let Some((dest, comp)) = line.split_once('=') {
        Ok(Command::Compute {
            dest: Some(parse_dest(dest)?),
            comp: parse_comp(comp)?,
            jump: None
        })
    } else if let Some((comp, jump)) = line.split_once(';') {
        Ok(Command::Compute {
            dest: None,
            comp: parse_comp(comp)?,
            jump: Some(parse_jump(jump)?)
        })
    } else {
        Err(ParseErrKind::UnrecognizedCommand)
    }
}

fn parse_dest(text: &str) -> Result<Dest, ParseErrKind> {
    lex_regs(text)
        .and_then(Dest::new)
        .ok_or(ParseErrKind::InvalidDest)
}
fn parse_comp(text: &str) -> Result<Comp, ParseErrKind> {
    lex_single(text)
        .and_then(Token::as_comp)
        .ok_or(ParseErrKind::UnknownComp)
}
fn parse_jump(text: &str) -> Result<Jump, ParseErrKind> {
    match lex_single(text) {
        Some(Token::Jump(jump)) => Ok(jump),
        _ => Err(ParseErrKind::InvalidJump)
    }
}

/// Kinds of errors that can occur from parsing a line of assembly code.
///
/// See [`ParseErr`] for this error type with the line and span information included.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ParseErrKind {
    /// The line is not an address, label, or compute command.
    UnrecognizedCommand,
    /// The destination of a compute command is not a combination of `A`, `D`, and `M`.
    InvalidDest,
    /// The jump of a compute command is not a known jump condition.
    InvalidJump,
    /// The computation of a compute command is not a known computation.
    UnknownComp,
}
impl std::fmt::Display for ParseErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedCommand => f.write_str("unrecognized command"),
            Self::InvalidDest         => f.write_str("invalid destination"),
            Self::InvalidJump         => f.write_str("invalid jump"),
            Self::UnknownComp         => f.write_str("unrecognized computation"),
        }
    }
}

/// Error from parsing assembly code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseErr {
    /// The kind of error.
    pub kind: ParseErrKind,
    /// The offending line (without comments or surrounding whitespace).
    pub line: String,
    /// The span in the source associated with this error.
    pub span: Range<usize>
}
impl ParseErr {
    /// Creates a new [`ParseErr`].
    pub fn new(kind: ParseErrKind, line: &str, span: Range<usize>) -> Self {
        ParseErr { kind, line: line.to_string(), span }
    }
}
impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} in '{}'", self.kind, self.line)
    }
}
impl std::error::Error for ParseErr {}
impl crate::err::Error for ParseErr {
    fn span(&self) -> Option<Range<usize>> {
        Some(self.span.clone())
    }

    fn help(&self) -> Option<Cow<str>> {
        match self.kind {
            ParseErrKind::UnrecognizedCommand => Some("lines must be of the form @value, (LABEL), dest=comp, or comp;jump".into()),
            ParseErrKind::InvalidDest         => Some("a destination is any combination of A, D, and M, with each register at most once".into()),
            ParseErrKind::InvalidJump         => Some("jumps are JGT, JEQ, JGE, JLT, JNE, JLE, and JMP".into()),
            ParseErrKind::UnknownComp         => {
                let comps = Comp::ALL.iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!("computations are {comps}").into())
            },
        }
    }
}
