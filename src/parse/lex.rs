//! Tokenizing the fields of Hack assembly commands.
//!
//! This module holds the tokens that make up the fixed vocabulary of
//! compute commands ([`Token`]): registers, computations, and jump conditions.
//! The parser uses these tokens to validate the destination, computation,
//! and jump fields of a compute command.
//!
//! Address and label commands are not tokenized, as their operands are
//! kept verbatim.

use logos::Logos;

use crate::ast::{Comp, Jump, Reg};

/// A unit of information in a compute command.
///
/// Note that the tokens are never separated by whitespace.
/// Any whitespace inside a field is a lexing error.
#[derive(Debug, Logos, PartialEq, Eq, Clone, Copy)]
#[logos(error = LexErr)]
pub enum Token {
    /// A register (i.e., `A`, `D`, or `M`).
    ///
    /// This can be a part of a destination or a computation on its own.
    #[token("A", |_| Reg::A)]
    #[token("D", |_| Reg::D)]
    #[token("M", |_| Reg::M)]
    Reg(Reg),

    /// A computation (e.g., `D+1`, `!M`, `0`).
    ///
    /// Computations which consist of a single register are lexed as [`Token::Reg`].
    /// Aliased computations (e.g., `D+A` and `A+D`) produce the same value.
    #[token("0",   |_| Comp::Zero)]
    #[token("1",   |_| Comp::One)]
    #[token("-1",  |_| Comp::NegOne)]
    #[token("!D",  |_| Comp::NotD)]
    #[token("!A",  |_| Comp::NotA)]
    #[token("-D",  |_| Comp::NegD)]
    #[token("-A",  |_| Comp::NegA)]
    #[token("D+1", |_| Comp::DPlusOne)]
    #[token("1+D", |_| Comp::DPlusOne)]
    #[token("A+1", |_| Comp::APlusOne)]
    #[token("1+A", |_| Comp::APlusOne)]
    #[token("D-1", |_| Comp::DMinusOne)]
    #[token("A-1", |_| Comp::AMinusOne)]
    #[token("D+A", |_| Comp::DPlusA)]
    #[token("A+D", |_| Comp::DPlusA)]
    #[token("D-A", |_| Comp::DMinusA)]
    #[token("A-D", |_| Comp::AMinusD)]
    #[token("D&A", |_| Comp::DAndA)]
    #[token("A&D", |_| Comp::DAndA)]
    #[token("D|A", |_| Comp::DOrA)]
    #[token("A|D", |_| Comp::DOrA)]
    #[token("!M",  |_| Comp::NotM)]
    #[token("-M",  |_| Comp::NegM)]
    #[token("M+1", |_| Comp::MPlusOne)]
    #[token("1+M", |_| Comp::MPlusOne)]
    #[token("M-1", |_| Comp::MMinusOne)]
    #[token("D+M", |_| Comp::DPlusM)]
    #[token("M+D", |_| Comp::DPlusM)]
    #[token("D-M", |_| Comp::DMinusM)]
    #[token("M-D", |_| Comp::MMinusD)]
    #[token("D&M", |_| Comp::DAndM)]
    #[token("M&D", |_| Comp::DAndM)]
    #[token("D|M", |_| Comp::DOrM)]
    #[token("M|D", |_| Comp::DOrM)]
    Comp(Comp),

    /// A jump condition (e.g., `JMP`, `JEQ`).
    #[token("JGT", |_| Jump::JGT)]
    #[token("JEQ", |_| Jump::JEQ)]
    #[token("JGE", |_| Jump::JGE)]
    #[token("JLT", |_| Jump::JLT)]
    #[token("JNE", |_| Jump::JNE)]
    #[token("JLE", |_| Jump::JLE)]
    #[token("JMP", |_| Jump::JMP)]
    Jump(Jump),
}
impl Token {
    /// Gets the computation this token represents, if it represents one.
    pub fn as_comp(self) -> Option<Comp> {
        match self {
            Token::Reg(r)  => Some(Comp::from(r)),
            Token::Comp(c) => Some(c),
            Token::Jump(_) => None,
        }
    }
}

/// Lexes a string which must consist of exactly one token.
///
/// This returns `None` if the string is empty, has an invalid token,
/// or consists of more than one token.
pub(crate) fn lex_single(src: &str) -> Option<Token> {
    let mut tokens = Token::lexer(src);
    match (tokens.next(), tokens.next()) {
        (Some(Ok(token)), None) => Some(token),
        _ => None
    }
}

/// Lexes a string which must consist only of register tokens.
///
/// This returns `None` if the string has any token which is not a register.
pub(crate) fn lex_regs(src: &str) -> Option<Vec<Reg>> {
    Token::lexer(src)
        .map(|token| match token {
            Ok(Token::Reg(r)) => Some(r),
            _ => None
        })
        .collect()
}

/// Any errors raised in attempting to tokenize an input stream.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum LexErr {
    /// A character sequence was used which is not part of any token.
    #[default]
    InvalidSymbol
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::InvalidSymbol => f.write_str("unrecognized symbol"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::InvalidSymbol => Some("fields of a compute command consist only of registers, computations, and jumps, without spaces".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use crate::ast::{Comp, Jump, Reg};
    use crate::err::LexErr;

    use super::{lex_regs, lex_single, Token};

    #[test]
    fn test_regs() {
        let tokens: Result<Vec<_>, _> = Token::lexer("AMD").collect();
        assert_eq!(tokens, Ok(vec![Token::Reg(Reg::A), Token::Reg(Reg::M), Token::Reg(Reg::D)]));

        let tokens: Result<Vec<_>, _> = Token::lexer("DM").collect();
        assert_eq!(tokens, Ok(vec![Token::Reg(Reg::D), Token::Reg(Reg::M)]));
    }

    #[test]
    fn test_lex_regs() {
        assert_eq!(lex_regs("MD"), Some(vec![Reg::M, Reg::D]));
        assert_eq!(lex_regs("AAA"), Some(vec![Reg::A, Reg::A, Reg::A]));
        assert_eq!(lex_regs("D+1"), None);
        assert_eq!(lex_regs("A D"), None);
    }

    #[test]
    fn test_comp_longest_match() {
        // Registers should not swallow longer computations
        assert_eq!(lex_single("D"), Some(Token::Reg(Reg::D)));
        assert_eq!(lex_single("D+1"), Some(Token::Comp(Comp::DPlusOne)));
        assert_eq!(lex_single("D|M"), Some(Token::Comp(Comp::DOrM)));
        assert_eq!(lex_single("-1"), Some(Token::Comp(Comp::NegOne)));
        assert_eq!(lex_single("1"), Some(Token::Comp(Comp::One)));
    }

    #[test]
    fn test_comp_aliases() {
        let pairs = [
            ("D+1", "1+D"), ("A+1", "1+A"), ("M+1", "1+M"),
            ("D+A", "A+D"), ("D&A", "A&D"), ("D|A", "A|D"),
            ("D+M", "M+D"), ("D&M", "M&D"), ("D|M", "M|D"),
        ];
        for (l, r) in pairs {
            assert_eq!(lex_single(l), lex_single(r), "{l} and {r} should be the same computation");
        }

        // D-A and A-D are different operations
        assert_ne!(lex_single("D-A"), lex_single("A-D"));
    }

    #[test]
    fn test_every_comp_lexes() {
        for comp in Comp::ALL {
            let text = comp.to_string();
            assert_eq!(lex_single(&text).and_then(Token::as_comp), Some(comp), "{text} did not lex");
        }
    }

    #[test]
    fn test_jumps() {
        let mut tokens = Token::lexer("JGTJEQJGEJLTJNEJLEJMP");
        assert_eq!(tokens.next(), Some(Ok(Token::Jump(Jump::JGT))));
        assert_eq!(tokens.next(), Some(Ok(Token::Jump(Jump::JEQ))));
        assert_eq!(tokens.next(), Some(Ok(Token::Jump(Jump::JGE))));
        assert_eq!(tokens.next(), Some(Ok(Token::Jump(Jump::JLT))));
        assert_eq!(tokens.next(), Some(Ok(Token::Jump(Jump::JNE))));
        assert_eq!(tokens.next(), Some(Ok(Token::Jump(Jump::JLE))));
        assert_eq!(tokens.next(), Some(Ok(Token::Jump(Jump::JMP))));
        assert_eq!(tokens.next(), None);

        assert_eq!(lex_single("JMP").and_then(Token::as_comp), None);
    }

    #[test]
    fn test_invalid() {
        assert_eq!(Token::lexer(" ").next(), Some(Err(LexErr::InvalidSymbol)));
        assert_eq!(Token::lexer("X").next(), Some(Err(LexErr::InvalidSymbol)));
        assert_eq!(Token::lexer("jmp").next(), Some(Err(LexErr::InvalidSymbol)));

        assert_eq!(lex_single(""), None);
        assert_eq!(lex_single("D "), None);
        assert_eq!(lex_single("D+2"), None);
        assert_eq!(lex_single("JMPX"), None);
        assert_eq!(lex_single("AM"), None);
    }
}
