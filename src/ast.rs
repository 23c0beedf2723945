//! Components relating to the abstract syntax trees (ASTs)
//! used in representing Hack assembly instructions.
//!
//! These components together are used to construct...
//! - [`asm::Command`] (a data structure holding an assembly source code command),
//! - and [`mach::MachInstr`] (a data structure holding a resolved machine instruction).
//!
//! The fixed encoding tables of the Hack machine live on the operand types
//! of this module ([`Comp::code`], [`Dest::code`], [`Jump::code`]).

pub mod asm;
pub mod mach;

use std::fmt::Write as _;

/// A register which can appear in a destination or computation.
///
/// `A` is the address register, `D` is the data register,
/// and `M` is the memory word addressed by `A`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Reg {
    #[allow(missing_docs)]
    A,
    #[allow(missing_docs)]
    D,
    #[allow(missing_docs)]
    M
}
impl Reg {
    /// The bit this register occupies in a destination code.
    fn dest_bit(self) -> u8 {
        match self {
            Reg::A => 0b100,
            Reg::D => 0b010,
            Reg::M => 0b001,
        }
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reg::A => f.write_char('A'),
            Reg::D => f.write_char('D'),
            Reg::M => f.write_char('M'),
        }
    }
}

/// The destination of a compute command: a non-empty set of registers.
///
/// Registers can be written in any order, but each register can only appear once.
///
/// ## Examples
///
/// ```text
/// M=D
/// ~
/// AMD=M+1
/// ~~~
/// DA=A-1
/// ~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Dest(u8);

impl Dest {
    /// Creates a destination out of the provided registers.
    ///
    /// This returns `None` if the list is empty or if a register occurs more than once.
    ///
    /// # Example
    /// ```
    /// use hack_ensemble::ast::{Dest, Reg};
    ///
    /// let md = Dest::new([Reg::M, Reg::D]).unwrap();
    /// assert_eq!(md.code(), 0b011);
    /// assert_eq!(Dest::new([Reg::M, Reg::D]), Dest::new([Reg::D, Reg::M]));
    ///
    /// assert_eq!(Dest::new([]), None);
    /// assert_eq!(Dest::new([Reg::A, Reg::A]), None);
    /// ```
    pub fn new(regs: impl IntoIterator<Item=Reg>) -> Option<Self> {
        let mut bits = 0;
        for reg in regs {
            let bit = reg.dest_bit();
            if bits & bit != 0 { return None; }
            bits |= bit;
        }

        (bits != 0).then_some(Dest(bits))
    }

    /// Checks whether this destination writes to the given register.
    pub fn contains(self, reg: Reg) -> bool {
        self.0 & reg.dest_bit() != 0
    }

    /// The 3-bit destination code.
    ///
    /// Each bit indicates the presence of a register (from most to least significant: `A`, `D`, `M`).
    pub fn code(self) -> u16 {
        u16::from(self.0)
    }
}
impl std::fmt::Display for Dest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        [Reg::A, Reg::M, Reg::D].into_iter()
            .filter(|&r| self.contains(r))
            .try_for_each(|r| std::fmt::Display::fmt(&r, f))
    }
}

macro_rules! comp_enum {
    ($($comp:ident = $text:literal => $code:literal),+ $(,)?) => {
        /// A computation performed by the ALU.
        ///
        /// There are 28 computations. Some computations can be written in more than one way
        /// (e.g., `D+A` and `A+D`), and these aliases all parse to the same variant.
        /// The [`std::fmt::Display`] implementation writes the first spelling listed in [`Comp::code`].
        #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
        pub enum Comp {
            $(
                #[allow(missing_docs)]
                $comp
            ),+
        }

        impl Comp {
            /// Every computation.
            pub const ALL: [Comp; 28] = [$(Comp::$comp),+];

            /// The 7-bit computation code (the `a` bit, followed by `c1`-`c6`).
            ///
            /// | computation     | code      |
            /// |-----------------|-----------|
            $(
            #[doc = concat!("| `", $text, "` | `", stringify!($code), "` |")]
            )+
            pub fn code(self) -> u16 {
                match self {
                    $(Comp::$comp => $code),+
                }
            }
        }

        impl std::fmt::Display for Comp {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Comp::$comp => f.write_str($text)),+
                }
            }
        }
    };
}
comp_enum! {
    Zero      = "0"   => 0b0101010,
    One       = "1"   => 0b0111111,
    NegOne    = "-1"  => 0b0111010,
    D         = "D"   => 0b0001100,
    A         = "A"   => 0b0110000,
    NotD      = "!D"  => 0b0001101,
    NotA      = "!A"  => 0b0110001,
    NegD      = "-D"  => 0b0001111,
    NegA      = "-A"  => 0b0110011,
    DPlusOne  = "D+1" => 0b0011111,
    APlusOne  = "A+1" => 0b0110111,
    DMinusOne = "D-1" => 0b0001110,
    AMinusOne = "A-1" => 0b0110010,
    DPlusA    = "D+A" => 0b0000010,
    DMinusA   = "D-A" => 0b0010011,
    AMinusD   = "A-D" => 0b0000111,
    DAndA     = "D&A" => 0b0000000,
    DOrA      = "D|A" => 0b0010101,
    M         = "M"   => 0b1110000,
    NotM      = "!M"  => 0b1110001,
    NegM      = "-M"  => 0b1110011,
    MPlusOne  = "M+1" => 0b1110111,
    MMinusOne = "M-1" => 0b1110010,
    DPlusM    = "D+M" => 0b1000010,
    DMinusM   = "D-M" => 0b1010011,
    MMinusD   = "M-D" => 0b1000111,
    DAndM     = "D&M" => 0b1000000,
    DOrM      = "D|M" => 0b1010101,
}
impl From<Reg> for Comp {
    fn from(value: Reg) -> Self {
        match value {
            Reg::A => Comp::A,
            Reg::D => Comp::D,
            Reg::M => Comp::M,
        }
    }
}

/// A jump condition, which compares the result of the computation against 0.
///
/// | condition | code  |
/// |-----------|-------|
/// | (none)    | `000` |
/// | `JGT`     | `001` |
/// | `JEQ`     | `010` |
/// | `JGE`     | `011` |
/// | `JLT`     | `100` |
/// | `JNE`     | `101` |
/// | `JLE`     | `110` |
/// | `JMP`     | `111` |
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Jump {
    #[allow(missing_docs)]
    JGT,
    #[allow(missing_docs)]
    JEQ,
    #[allow(missing_docs)]
    JGE,
    #[allow(missing_docs)]
    JLT,
    #[allow(missing_docs)]
    JNE,
    #[allow(missing_docs)]
    JLE,
    #[allow(missing_docs)]
    JMP,
}
impl Jump {
    /// The 3-bit jump code.
    pub fn code(self) -> u16 {
        match self {
            Jump::JGT => 0b001,
            Jump::JEQ => 0b010,
            Jump::JGE => 0b011,
            Jump::JLT => 0b100,
            Jump::JNE => 0b101,
            Jump::JLE => 0b110,
            Jump::JMP => 0b111,
        }
    }
}
impl std::fmt::Display for Jump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// The errors that can result from calling [`Addr::new`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AddrNewErr {
    /// The provided value is negative.
    Negative,
    /// The provided value does not fit within 15 bits.
    TooLarge,
}
impl std::fmt::Display for AddrNewErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddrNewErr::Negative => f.write_str("address cannot be negative"),
            AddrNewErr::TooLarge => f.write_str("address is too big for unsigned 15-bit integer"),
        }
    }
}
impl std::error::Error for AddrNewErr {}
impl crate::err::Error for AddrNewErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        Some(format!("the range for an address is [0, {}]", Addr::MAX.get()).into())
    }
}

/// A 15-bit unsigned address, the operand of an address command.
///
/// ## Examples
/// ```text
/// @2
///  ~
/// @SCREEN
///  ~~~~~~ (once resolved to 16384)
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct Addr(u16);
impl Addr {
    /// The largest address.
    pub const MAX: Addr = Addr(0x7FFF);

    /// Creates a new address.
    /// This must fit within 15 bits, otherwise an error is raised.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hack_ensemble::ast::{Addr, AddrNewErr};
    /// #
    /// assert_eq!(Addr::new(16384).map(|a| a.get()), Ok(16384));
    /// assert_eq!(Addr::new(32767).map(|a| a.get()), Ok(32767));
    /// assert_eq!(Addr::new(32768), Err(AddrNewErr::TooLarge));
    /// assert_eq!(Addr::new(-1), Err(AddrNewErr::Negative));
    /// ```
    pub fn new(n: i64) -> Result<Self, AddrNewErr> {
        match u16::try_from(n) {
            Ok(n) if n <= Self::MAX.0 => Ok(Addr(n)),
            Ok(_) => Err(AddrNewErr::TooLarge),
            Err(_) if n < 0 => Err(AddrNewErr::Negative),
            Err(_) => Err(AddrNewErr::TooLarge),
        }
    }

    /// Gets the value of the address.
    pub fn get(self) -> u16 {
        self.0
    }
}
impl std::fmt::Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A label.
///
/// This struct stores the name of the label (accessible by the `name` field)
/// and the source code span indicating where the label is located in assembly source code.
///
/// # Examples
/// ```text
/// @i
/// M=1
/// (LOOP)
///  ~~~~
/// @i
/// M=M+1
/// @LOOP
/// 0;JMP
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Label {
    /// The label's identifier
    pub name: String,

    /// The start of the label in assembly source code.
    start: usize
}
impl Label {
    /// Creates a new label.
    pub fn new(name: String, span: std::ops::Range<usize>) -> Self {
        debug_assert_eq!(span.start + name.len(), span.end, "span should have the same length as name");
        Label { name, start: span.start }
    }
    /// Returns the span of the label in assembly source code.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start .. (self.start + self.name.len())
    }
}
impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
