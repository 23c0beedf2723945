//! Error interface for this crate.
//!
//! This module creates an [`Error`] trait, which is implemented for
//! all of the errors which can occur while parsing and assembling.
//! The trait provides the source span and a help message for an error,
//! which [`report`] uses to render the error against its source code.
//!
//! All of the error types in this crate are also re-exported here.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::ops::Range;

use crate::asm::SourceInfo;

pub use crate::ast::AddrNewErr;
pub use crate::parse::lex::LexErr;
pub use crate::parse::{ParseErr, ParseErrKind};
pub use crate::asm::{AsmErr, AsmErrKind};

/// Unified error interface for all errors in this library.
pub trait Error: std::error::Error {
    /// The range where this error occurs in source.
    ///
    /// If this is not known, this can be set to `None`.
    fn span(&self) -> Option<Range<usize>> {
        None
    }

    /// A clarifying message to help aid someone in how to fix the message.
    ///
    /// If there is none to add, this can be set to `None`.
    fn help(&self) -> Option<Cow<str>> {
        None
    }
}

/// Renders an error along with the line of source code it occurred on.
///
/// # Example
/// ```
/// use hack_ensemble::asm::SourceInfo;
/// use hack_ensemble::err::report;
/// use hack_ensemble::parse::parse_ast;
///
/// let src = "@2\nD=A\nD=D+2\n";
/// let err = parse_ast(src).unwrap_err();
///
/// let msg = report(&err, &SourceInfo::new(src));
/// assert!(msg.starts_with("error: unrecognized computation in 'D=D+2'"));
/// assert!(msg.contains("--> line 3"));
/// ```
pub fn report<E: Error + ?Sized>(err: &E, src: &SourceInfo) -> String {
    fn _report<E: Error + ?Sized>(err: &E, src: &SourceInfo) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        writeln!(buf, "error: {err}")?;

        if let Some(span) = err.span() {
            let (lno, _) = src.get_pos_pair(span.start);
            let line_span = src.line_span(lno).unwrap_or(span.start..span.start);
            let line = src.source().get(line_span.clone()).unwrap_or("");

            // Lines are displayed 1-indexed.
            let gutter = (lno + 1).to_string();
            let gw = gutter.len();
            let pad = span.start.saturating_sub(line_span.start);
            let width = span.len().max(1);

            writeln!(buf, "{0:gw$}--> line {gutter}", "")?;
            writeln!(buf, "{gutter} | {line}")?;
            writeln!(buf, "{0:gw$} | {0:pad$}{0:~<width$}", "")?;
        }

        if let Some(help) = err.help() {
            writeln!(buf, "help: {help}")?;
        }

        Ok(buf)
    }

    _report(err, src).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::asm::{assemble, SourceInfo};
    use crate::parse::parse_ast;

    use super::report;

    #[test]
    fn test_report_parse_err() {
        let src = "@2\n    DD=A  // oops\n";
        let err = parse_ast(src).unwrap_err();

        let msg = report(&err, &SourceInfo::new(src));
        let lines: Vec<_> = msg.lines().collect();
        assert_eq!(lines, [
            "error: invalid destination in 'DD=A'",
            " --> line 2",
            "2 | DD=A  // oops",
            "  | ~~~~",
            "help: a destination is any combination of A, D, and M, with each register at most once",
        ]);
    }

    #[test]
    fn test_report_asm_err() {
        let src = "@1\n@32768\n";
        let err = assemble(parse_ast(src).unwrap()).unwrap_err();

        let msg = report(&err, &SourceInfo::new(src));
        assert!(msg.contains("2 | @32768"), "{msg}");
        assert!(msg.contains("help: the range for an address is [0, 32767]"), "{msg}");
    }
}
