//! Assembling Hack assembly source ASTs into object files.
//!
//! This module is used to convert source ASTs (`Vec<`[`Stmt`]`>`) into object files
//! which hold the 16-bit machine code words of the program.
//!
//! The assembler module notably consists of:
//! - [`assemble`] and [`assemble_debug`]: The main functions which assemble the statements into an object file.
//! - [`SymbolTable`]: a struct holding the symbol table, which stores the address of
//!   every predefined symbol, label, and variable
//! - [`ObjectFile`]: a struct holding the object file, which can be written to disk with
//!   one of the formats in [`encoding`]
//!
//! Assembly is done in two passes:
//! 1. [`SymbolTable::new`] computes the ROM address of every label.
//! 2. [`ObjectFile`] creation resolves every address command (allocating variables
//!    as they are first seen) and encodes every instruction.

pub mod encoding;

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use crate::ast::asm::{Command, Stmt};
use crate::ast::mach::MachInstr;
use crate::ast::{Addr, AddrNewErr};

/// Assembles a Hack assembly source code AST into an object file.
///
/// This function assembles the source AST *without* including debug symbols
/// in the object file.
/// See [`SymbolTable`] for more details about debug symbols.
///
/// # Example
/// ```
/// use hack_ensemble::parse::parse_ast;
/// use hack_ensemble::asm::assemble;
///
/// let src = "
///     @2
///     D=A
///     (END)
///     @END
///     0;JMP
/// ";
/// let ast = parse_ast(src).unwrap();
///
/// let obj_file = assemble(ast);
/// assert!(obj_file.is_ok());
///
/// // Symbol table doesn't exist in object file:
/// let obj_file = obj_file.unwrap();
/// assert_eq!(obj_file.words(), [0b0000000000000010, 0b1110110000010000, 0b0000000000000010, 0b1110101010000111]);
/// assert!(obj_file.symbol_table().is_none());
/// ```
pub fn assemble(ast: Vec<Stmt>) -> Result<ObjectFile, AsmErr> {
    let sym = SymbolTable::new(&ast, None)?;
    ObjectFile::new(ast, sym, false)
}
/// Assembles a Hack assembly source code AST into an object file.
///
/// This function assembles the source AST *and* includes debug symbols
/// in the object file.
/// See [`SymbolTable`] for more details about debug symbols.
///
/// # Example
/// ```
/// use hack_ensemble::parse::parse_ast;
/// use hack_ensemble::asm::assemble_debug;
///
/// let src = "
///     (LOOP)
///     @LOOP
///     0;JMP
/// ";
/// let ast = parse_ast(src).unwrap();
///
/// let obj_file = assemble_debug(ast, src);
/// assert!(obj_file.is_ok());
///
/// // Symbol table does exist in object file:
/// let obj_file = obj_file.unwrap();
/// assert!(obj_file.symbol_table().is_some());
/// ```
pub fn assemble_debug(ast: Vec<Stmt>, src: &str) -> Result<ObjectFile, AsmErr> {
    let sym = SymbolTable::new(&ast, Some(src))?;
    ObjectFile::new(ast, sym, true)
}

/// Kinds of errors that can occur from assembling given assembly code.
///
/// See [`AsmErr`] for this error type with span information included.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AsmErrKind {
    /// The program has more instructions than fit in ROM (pass 1).
    RomOverflow,
    /// An address literal or symbol could not be converted to an address (pass 2).
    AddrNewErr(AddrNewErr),
    /// There are more variables than fit in RAM (pass 2).
    VariableOverflow,
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RomOverflow      => f.write_str("program does not fit in ROM"),
            Self::AddrNewErr(e)    => write!(f, "{e}"),
            Self::VariableOverflow => f.write_str("ran out of memory to allocate variable"),
        }
    }
}
impl From<AddrNewErr> for AsmErrKind {
    fn from(value: AddrNewErr) -> Self {
        AsmErrKind::AddrNewErr(value)
    }
}

/// Error from assembling given assembly code.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AsmErr {
    /// The kind of error.
    pub kind: AsmErrKind,
    /// The span in the source associated with this error.
    pub span: Range<usize>
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new(kind: AsmErrKind, span: Range<usize>) -> Self {
        AsmErr { kind, span }
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}
impl std::error::Error for AsmErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AsmErrKind::AddrNewErr(e) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for AsmErr {
    fn span(&self) -> Option<Range<usize>> {
        Some(self.span.clone())
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match &self.kind {
            AsmErrKind::RomOverflow      => Some(format!("the ROM holds at most {ROM_SIZE} instructions").into()),
            AsmErrKind::AddrNewErr(e)    => crate::err::Error::help(e),
            AsmErrKind::VariableOverflow => Some(format!("variables are allocated from address {VAR_START} to {}", Addr::MAX).into()),
        }
    }
}

/// The number of words in the instruction memory.
const ROM_SIZE: usize = 0x8000;

/// The address given to the first variable.
/// Every subsequent variable is given the next address.
pub const VAR_START: u16 = 16;

/// Symbols which are defined in every program.
///
/// `R0`-`R15` are also predefined (and map to addresses 0-15).
const PREDEFINED: [(&str, u16); 7] = [
    ("SP",     0),
    ("LCL",    1),
    ("ARG",    2),
    ("THIS",   3),
    ("THAT",   4),
    ("SCREEN", 0x4000),
    ("KBD",    0x6000),
];
const NUM_VIRTUAL_REGS: u16 = 16;

/// The source text of a program, indexed by line.
///
/// Lines are 0-indexed and split on `\n`.
#[derive(PartialEq, Eq, Clone)]
pub struct SourceInfo {
    src: String,
    /// The byte index where each line starts. Always starts with 0.
    line_starts: Vec<usize>
}
impl std::fmt::Debug for SourceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceInfo")
            .field("lines", &self.line_starts.len())
            .finish_non_exhaustive()
    }
}
impl SourceInfo {
    /// Indexes the lines of the given source.
    pub fn new(src: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self { src: src.to_string(), line_starts }
    }

    /// Returns the entire source.
    pub fn source(&self) -> &str {
        &self.src
    }

    /// The line containing the byte at `index`.
    ///
    /// Indices past the end of the source are on the last line.
    fn get_line(&self, index: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= index).saturating_sub(1)
    }

    /// Gets the byte range of a line, excluding surrounding whitespace.
    ///
    /// This returns None if the line does not exist.
    pub fn line_span(&self, line: usize) -> Option<Range<usize>> {
        let start = *self.line_starts.get(line)?;
        let end = self.line_starts.get(line + 1).copied().unwrap_or(self.src.len());

        let text = &self.src[start..end];
        let lead = text.len() - text.trim_start().len();
        let trimmed_len = text.trim().len();

        Some((start + lead)..(start + lead + trimmed_len))
    }

    /// Reads a line from source, without surrounding whitespace.
    ///
    /// # Example
    /// ```
    /// use hack_ensemble::asm::SourceInfo;
    ///
    /// let src = SourceInfo::new("@2\n  D=A // load\n");
    /// assert_eq!(src.read_line(1), Some("D=A // load"));
    /// assert_eq!(src.read_line(2), Some(""));
    /// assert_eq!(src.read_line(3), None);
    /// ```
    pub fn read_line(&self, line: usize) -> Option<&str> {
        self.line_span(line).map(|r| &self.src[r])
    }

    /// Splits a byte index into its line and its offset from the start of that line.
    pub fn get_pos_pair(&self, index: usize) -> (usize, usize) {
        let line = self.get_line(index);
        (line, index - self.line_starts[line])
    }
}

/// How a symbol came to be defined.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SymbolKind {
    /// A symbol defined in every program (e.g., `SP`, `R0`, `SCREEN`).
    Predefined,
    /// A label (`(LABEL)`), which maps to a ROM address.
    Label,
    /// A variable, which was allocated a RAM address when it was first referenced.
    Variable,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
struct SymbolData {
    addr: u16,
    kind: SymbolKind,
    /// The start of the definition (for labels) or first reference (for variables).
    src_start: Option<usize>
}
impl SymbolData {
    /// Calculates the source range of this symbol, given the name of the symbol.
    fn span(&self, name: &str) -> Option<Range<usize>> {
        self.src_start.map(|start| start .. (start + name.len()))
    }
}

/// Debug symbols.
#[derive(PartialEq, Eq, Debug, Clone)]
struct DebugSymbols {
    /// A mapping from each line with an instruction in the source to its ROM address.
    line_map: BTreeMap<usize, u16>,

    /// Information about the source.
    src_info: SourceInfo
}

/// The symbol table, which maps every symbol in a program to its address.
///
/// The symbol table is created with the predefined symbols, and is then filled:
/// - with labels in the first assembler pass ([`SymbolTable::new`]),
/// - with variables in the second assembler pass (when creating an [`ObjectFile`]).
///
/// Symbols are case-sensitive.
///
/// # Debug symbols
///
/// Debug symbols are optional data added to this symbol table which can help users debug their code.
///
/// Without debug symbols, the symbol table is only used during the assembly process
/// and is not part of the resultant [`ObjectFile`].
///
/// With debug symbols, the symbol table persists in the resultant [`ObjectFile`]
/// (including its variables), and additionally holds:
/// - Mappings from source code line numbers to ROM addresses
/// - Source code text (see [`SourceInfo`] for more details)
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SymbolTable {
    /// A mapping from symbol name to address and kind.
    label_map: HashMap<String, SymbolData>,

    /// Debug symbols. If None, there were no debug symbols provided.
    debug_symbols: Option<DebugSymbols>,
}

impl SymbolTable {
    /// Creates a symbol table which only holds the predefined symbols.
    ///
    /// ## Example
    /// ```
    /// use hack_ensemble::asm::SymbolTable;
    ///
    /// let sym = SymbolTable::predefined();
    /// assert_eq!(sym.lookup_label("THAT"), Some(4));
    /// assert_eq!(sym.lookup_label("R13"), Some(13));
    /// assert_eq!(sym.lookup_label("KBD"), Some(24576));
    /// assert_eq!(sym.len(), 23);
    /// ```
    pub fn predefined() -> Self {
        let registers = (0..NUM_VIRTUAL_REGS).map(|i| (format!("R{i}"), i));
        let named = PREDEFINED.iter().map(|&(name, addr)| (name.to_string(), addr));

        let label_map = named.chain(registers)
            .map(|(name, addr)| (name, SymbolData { addr, kind: SymbolKind::Predefined, src_start: None }))
            .collect();

        SymbolTable { label_map, debug_symbols: None }
    }

    /// Creates a new symbol table.
    ///
    /// This performs the first assembler pass, calculating the ROM address of
    /// every label. A label is bound to the number of instructions before it.
    ///
    /// If a symbol is defined more than once (or a label has the name of a predefined symbol),
    /// the first definition is kept.
    ///
    /// If a `src` argument is provided, debug symbols are also computed for the symbol table.
    ///
    /// ## Example
    /// ```
    /// use hack_ensemble::parse::parse_ast;
    /// use hack_ensemble::asm::SymbolTable;
    ///
    /// let src = "
    ///     @END
    ///     0;JMP
    ///     (LOOP)
    ///     @LOOP
    ///     0;JMP
    ///     (END)
    /// ";
    /// let ast = parse_ast(src).unwrap();
    ///
    /// // without debug symbols
    /// let sym = SymbolTable::new(&ast, None).unwrap();
    /// assert_eq!(sym.lookup_label("LOOP"), Some(2));
    /// assert_eq!(sym.lookup_label("END"), Some(4));
    /// assert_eq!(sym.lookup_line(4), None);
    ///
    /// // with debug symbols
    /// let sym = SymbolTable::new(&ast, Some(src)).unwrap();
    /// assert_eq!(sym.lookup_line(4), Some(2));
    /// ```
    pub fn new(stmts: &[Stmt], src: Option<&str>) -> Result<Self, AsmErr> {
        let mut sym = SymbolTable::predefined();
        let mut debug_sym = src.map(|s| (BTreeMap::new(), SourceInfo::new(s)));

        // The ROM address of the next instruction.
        let mut pc: usize = 0;

        for stmt in stmts {
            match &stmt.nucleus {
                Command::Label(label) => {
                    // pc <= ROM_SIZE, so this always fits
                    sym.add_symbol(&label.name, pc as u16, SymbolKind::Label, label.span().start);
                },
                Command::Address(_) | Command::Compute { .. } => {
                    if pc >= ROM_SIZE {
                        return Err(AsmErr::new(AsmErrKind::RomOverflow, stmt.span.clone()));
                    }

                    if let Some((lines, s)) = &mut debug_sym {
                        lines.insert(s.get_line(stmt.span.start), pc as u16);
                    }
                    pc += 1;
                },
            }
        }

        log::debug!("pass 1 complete: {pc} instructions, {} labels", sym.count_kind(SymbolKind::Label));

        sym.debug_symbols = debug_sym.map(|(line_map, src_info)| DebugSymbols { line_map, src_info });
        Ok(sym)
    }

    /// Adds a symbol to the table, if it is not already defined.
    fn add_symbol(&mut self, name: &str, addr: u16, kind: SymbolKind, src_start: usize) {
        match self.label_map.entry(name.to_string()) {
            Entry::Occupied(e) => {
                let SymbolData { addr: old_addr, kind: old_kind, .. } = e.get();
                log::warn!("{name} was already defined ({old_kind:?} at {old_addr}), ignoring {kind:?} at {addr}");
            },
            Entry::Vacant(e) => {
                log::trace!("binding {kind:?} {name} to {addr}");
                e.insert(SymbolData { addr, kind, src_start: Some(src_start) });
            }
        }
    }

    fn count_kind(&self, kind: SymbolKind) -> usize {
        self.label_map.values()
            .filter(|data| data.kind == kind)
            .count()
    }

    /// Gets the address of a given symbol (if it exists).
    ///
    /// For labels, this is a ROM address. For variables and most predefined symbols,
    /// this is a RAM address.
    pub fn lookup_label(&self, label: &str) -> Option<u16> {
        self.label_map.get(label).map(|sym_data| sym_data.addr)
    }

    /// Gets the kind of a given symbol (if it exists).
    pub fn symbol_kind(&self, label: &str) -> Option<SymbolKind> {
        self.label_map.get(label).map(|sym_data| sym_data.kind)
    }

    /// Gets the label at a given ROM address (if it exists).
    ///
    /// If there are multiple labels at the address, any of them may be returned.
    /// Predefined symbols and variables are not considered.
    ///
    /// ## Example
    /// ```
    /// use hack_ensemble::parse::parse_ast;
    /// use hack_ensemble::asm::SymbolTable;
    ///
    /// let src = "
    ///     (LOOP)
    ///     @LOOP
    ///     0;JMP
    ///     (END)
    ///     @END
    ///     0;JMP
    /// ";
    /// let ast = parse_ast(src).unwrap();
    ///
    /// let sym = SymbolTable::new(&ast, None).unwrap();
    /// assert_eq!(sym.rev_lookup_label(0), Some("LOOP"));
    /// assert_eq!(sym.rev_lookup_label(2), Some("END"));
    /// assert_eq!(sym.rev_lookup_label(1), None);
    /// ```
    pub fn rev_lookup_label(&self, addr: u16) -> Option<&str> {
        let (label, _) = self.label_map.iter()
            .find(|&(_, sym_data)| sym_data.kind == SymbolKind::Label && sym_data.addr == addr)?;

        Some(label)
    }

    /// Gets the source span of the given symbol (if it exists and is not predefined).
    ///
    /// For labels, this is the span of its definition.
    /// For variables, this is the span of its first reference.
    pub fn get_label_source(&self, label: &str) -> Option<Range<usize>> {
        self.label_map.get(label)?.span(label)
    }

    /// Gets the ROM address of a given source line (if it exists).
    ///
    /// This will always return None if debug symbols are not enabled.
    pub fn lookup_line(&self, line: usize) -> Option<u16> {
        self.debug_symbols.as_ref()?.line_map.get(&line).copied()
    }

    /// Gets the source line of a given ROM address (if it exists).
    ///
    /// This will always return None if debug symbols are not enabled.
    pub fn rev_lookup_line(&self, addr: u16) -> Option<usize> {
        self.debug_symbols.as_ref()?.line_map.iter()
            .find(|&(_, &line_addr)| line_addr == addr)
            .map(|(&line, _)| line)
    }

    /// Reads the source info from this symbol table (if debug symbols are enabled).
    pub fn source_info(&self) -> Option<&SourceInfo> {
        self.debug_symbols.as_ref().map(|d| &d.src_info)
    }

    /// Gets an iterable of the mapping from symbols to addresses,
    /// sorted by kind, then by address, then by name.
    pub fn label_iter(&self) -> impl Iterator<Item=(&str, u16, SymbolKind)> + '_ {
        let mut entries: Vec<_> = self.label_map.iter()
            .map(|(label, sym_data)| (&**label, sym_data.addr, sym_data.kind))
            .collect();
        entries.sort_by_key(|&(label, addr, kind)| (kind as u8, addr, label));

        entries.into_iter()
    }

    /// The number of symbols in this table.
    pub fn len(&self) -> usize {
        self.label_map.len()
    }

    /// Whether this table has no symbols.
    pub fn is_empty(&self) -> bool {
        self.label_map.is_empty()
    }
}

/// Allocates variables during the second assembler pass.
struct VarAllocator {
    /// The address of the next variable.
    next: u16
}
impl VarAllocator {
    fn new() -> Self {
        VarAllocator { next: VAR_START }
    }

    /// Resolves the operand of an address command into an address.
    ///
    /// - Numeric literals (`-?\d+`) are used as is.
    /// - Existing symbols resolve to their address.
    /// - Anything else is a new variable, which is given the next free address.
    fn resolve(&mut self, sym: &mut SymbolTable, operand: &str, src_start: usize) -> Result<Addr, AsmErrKind> {
        if is_literal(operand) {
            let value = operand.parse::<i64>()
                .map_err(|_| match operand.starts_with('-') {
                    true  => AddrNewErr::Negative,
                    false => AddrNewErr::TooLarge,
                })?;

            return Ok(Addr::new(value)?);
        }

        let addr = match sym.lookup_label(operand) {
            Some(addr) => addr,
            None => {
                let addr = self.next;
                if addr > Addr::MAX.get() {
                    return Err(AsmErrKind::VariableOverflow);
                }

                sym.add_symbol(operand, addr, SymbolKind::Variable, src_start);
                self.next += 1;
                addr
            }
        };

        Ok(Addr::new(i64::from(addr))?)
    }
}

/// Checks if an address operand is a decimal literal (`-?\d+`).
fn is_literal(operand: &str) -> bool {
    let digits = operand.strip_prefix('-').unwrap_or(operand);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl Command {
    /// Converts a command into a machine instruction ([`MachInstr`])
    /// by resolving its symbol (if it has one).
    ///
    /// Label commands do not produce an instruction, so this returns `None` for those.
    fn into_mach_instr(self, alloc: &mut VarAllocator, sym: &mut SymbolTable, span: &Range<usize>) -> Result<Option<MachInstr>, AsmErr> {
        match self {
            Command::Address(operand) => {
                // the operand starts right after the `@`
                alloc.resolve(sym, &operand, span.start + 1)
                    .map(|addr| Some(MachInstr::Address(addr)))
                    .map_err(|e| AsmErr::new(e, span.clone()))
            },
            Command::Label(_) => Ok(None),
            Command::Compute { dest, comp, jump } => Ok(Some(MachInstr::Compute { dest, comp, jump })),
        }
    }
}

/// An object file.
///
/// This is the final product after assembly source code is fully assembled.
/// It holds one 16-bit word for every instruction in the program, in program order.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ObjectFile {
    /// The machine code words of the program.
    words: Vec<u16>,

    /// Debug symbols.
    sym: Option<SymbolTable>
}
impl ObjectFile {
    /// Creates an empty object file.
    pub fn empty() -> Self {
        ObjectFile { words: vec![], sym: None }
    }

    /// Creates an object file from machine code words, without any debug symbols.
    pub fn from_words(words: Vec<u16>) -> Self {
        ObjectFile { words, sym: None }
    }

    /// Creates a new object file from an assembly AST and a symbol table.
    ///
    /// This performs the second assembler pass.
    fn new(ast: Vec<Stmt>, mut sym: SymbolTable, debug: bool) -> Result<Self, AsmErr> {
        let mut alloc = VarAllocator::new();
        let mut words = Vec::with_capacity(ast.iter().filter(|stmt| stmt.nucleus.is_instr()).count());

        for Stmt { nucleus, span } in ast {
            if let Some(instr) = nucleus.into_mach_instr(&mut alloc, &mut sym, &span)? {
                words.push(instr.encode());
            }
        }

        log::debug!("pass 2 complete: {} words, {} variables", words.len(), alloc.next - VAR_START);

        Ok(Self {
            words,
            sym: debug.then_some(sym),
        })
    }

    /// Gets the machine code words of this object file.
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    /// Gets the number of words in this object file.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether this object file has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Gets the symbol table if it is present in the object file.
    pub fn symbol_table(&self) -> Option<&SymbolTable> {
        self.sym.as_ref()
    }
}
