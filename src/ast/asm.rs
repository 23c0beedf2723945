//! This module holds the AST for Hack assembly source code.
//!
//! The key types are [`Command`] (the three kinds of lines in Hack assembly)
//! and [`Stmt`] (a command with its source span).

use std::ops::Range;

use super::{Comp, Dest, Jump, Label};

/// A single line of Hack assembly.
///
/// ## Examples
/// ```text
/// @17      // address command (numeric literal)
/// @LOOP    // address command (symbol)
/// (LOOP)   // label command
/// D=D+1    // compute command with destination
/// 0;JMP    // compute command with jump
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Command {
    /// An address command (`@value`).
    ///
    /// The text after the `@` is stored verbatim.
    /// It is resolved into an address during the second assembler pass:
    /// decimal literals (`-?\d+`) are used as is, anything else is a label or variable.
    Address(String),

    /// A label command (`(LABEL)`).
    ///
    /// This does not produce any instruction, it only binds the label
    /// to the address of the next instruction.
    Label(Label),

    /// A compute command (`dest=comp` or `comp;jump`).
    Compute {
        /// Registers the result is written into (if any).
        dest: Option<Dest>,
        /// The computation.
        comp: Comp,
        /// The jump condition (if any).
        jump: Option<Jump>
    },
}
impl Command {
    /// Whether this command produces an instruction word.
    ///
    /// Label commands do not.
    pub fn is_instr(&self) -> bool {
        !matches!(self, Command::Label(_))
    }
}
impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Address(sym) => write!(f, "@{sym}"),
            Command::Label(label) => write!(f, "({label})"),
            Command::Compute { dest, comp, jump } => {
                if let Some(dest) = dest {
                    write!(f, "{dest}=")?;
                }
                write!(f, "{comp}")?;
                if let Some(jump) = jump {
                    write!(f, ";{jump}")?;
                }
                Ok(())
            },
        }
    }
}

/// A "statement" in Hack assembly.
///
/// This is a [`Command`] together with the span of its (comment-stripped, trimmed)
/// line in the source code.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Stmt {
    /// The command of this statement.
    pub nucleus: Command,
    /// The span of the statement in the source code.
    pub span: Range<usize>
}

#[cfg(test)]
mod tests {
    use crate::ast::{Comp, Dest, Jump, Label, Reg};

    use super::Command;

    #[test]
    fn test_display() {
        assert_eq!(Command::Address("LOOP".to_string()).to_string(), "@LOOP");
        assert_eq!(Command::Label(Label::new("END".to_string(), 1..4)).to_string(), "(END)");

        let cmd = Command::Compute {
            dest: Dest::new([Reg::M, Reg::D]),
            comp: Comp::MPlusOne,
            jump: None
        };
        assert_eq!(cmd.to_string(), "MD=M+1");

        let cmd = Command::Compute { dest: None, comp: Comp::Zero, jump: Some(Jump::JMP) };
        assert_eq!(cmd.to_string(), "0;JMP");
    }

    #[test]
    fn test_is_instr() {
        assert!(Command::Address("0".to_string()).is_instr());
        assert!(!Command::Label(Label::default()).is_instr());
    }
}
