//! A Hack parser and assembler.
//!
//! This is a suite to convert assembly for the 16-bit Hack computer
//! into its machine code.
//!
//! # Usage
//!
//! To convert Hack source code to an object file, it must be parsed and assembled:
//! ```
//! use hack_ensemble::parse::parse_ast;
//! use hack_ensemble::asm::{assemble, assemble_debug, ObjectFile};
//!
//! let code = "
//!     // Computes R0 = 2 + 3
//!     @2
//!     D=A
//!     @3
//!     D=D+A
//!     @R0
//!     M=D
//! ";
//! let ast = parse_ast(code).unwrap();
//!
//! // Assemble AST into object file:
//! # {
//! # let ast = ast.clone();
//! let obj_file: ObjectFile = assemble(ast).unwrap();
//! # }
//! // OR:
//! let obj_file: ObjectFile = assemble_debug(ast, code).unwrap();
//! ```
//!
//! Once an object file has been created, it can be written out with one of the formats
//! in [`asm::encoding`]:
//! ```
//! # use hack_ensemble::parse::parse_ast;
//! # use hack_ensemble::asm::assemble;
//! #
//! # let obj_file = assemble(parse_ast("@2\nD=A").unwrap()).unwrap();
//! use hack_ensemble::asm::encoding::{ObjFileFormat, TextFormat};
//!
//! let hack = TextFormat::serialize(&obj_file);
//! assert_eq!(hack, "0000000000000010\n1110110000010000\n");
//! ```
//!
//! Errors from either step can be rendered against the source with [`err::report`].
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod asm;
pub mod err;
