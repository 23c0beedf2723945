//! This module holds the machine instructions of the Hack computer.
//!
//! A [`MachInstr`] is a [`Command`] with every symbol resolved,
//! so that it can be directly encoded into a 16-bit word.
//!
//! [`Command`]: crate::ast::asm::Command

use super::{Addr, Comp, Dest, Jump};

/// The top 3 bits of every compute instruction.
const COMPUTE_PREFIX: u16 = 0b111 << 13;

/// A resolved Hack machine instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MachInstr {
    /// An address instruction, which loads the address into the `A` register.
    ///
    /// Layout: `0vvv vvvv vvvv vvvv`
    Address(Addr),

    /// A compute instruction.
    ///
    /// Layout: `111a cccc ccdd djjj`
    Compute {
        /// Destination (`ddd`). If absent, encodes as `000`.
        dest: Option<Dest>,
        /// Computation (`accccccc`).
        comp: Comp,
        /// Jump condition (`jjj`). If absent, encodes as `000`.
        jump: Option<Jump>
    }
}
impl MachInstr {
    /// Encodes this instruction into its 16-bit machine code.
    ///
    /// # Example
    /// ```
    /// use hack_ensemble::ast::{Addr, Comp, Dest, Jump, Reg};
    /// use hack_ensemble::ast::mach::MachInstr;
    ///
    /// let at2 = MachInstr::Address(Addr::new(2).unwrap());
    /// assert_eq!(format!("{:016b}", at2.encode()), "0000000000000010");
    ///
    /// let incr = MachInstr::Compute { dest: Dest::new([Reg::D]), comp: Comp::DPlusOne, jump: None };
    /// assert_eq!(format!("{:016b}", incr.encode()), "1110011111010000");
    ///
    /// let goto = MachInstr::Compute { dest: None, comp: Comp::Zero, jump: Some(Jump::JMP) };
    /// assert_eq!(format!("{:016b}", goto.encode()), "1110101010000111");
    /// ```
    pub fn encode(self) -> u16 {
        match self {
            MachInstr::Address(addr) => addr.get(),
            MachInstr::Compute { dest, comp, jump } => {
                let dest = dest.map_or(0, Dest::code);
                let jump = jump.map_or(0, Jump::code);

                COMPUTE_PREFIX | (comp.code() << 6) | (dest << 3) | jump
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Addr, Comp, Dest, Jump, Reg};

    use super::MachInstr;

    fn bits(instr: MachInstr) -> String {
        format!("{:016b}", instr.encode())
    }

    #[test]
    fn test_encode_address() {
        assert_eq!(bits(MachInstr::Address(Addr::new(0).unwrap())), "0000000000000000");
        assert_eq!(bits(MachInstr::Address(Addr::new(16384).unwrap())), "0100000000000000");
        assert_eq!(bits(MachInstr::Address(Addr::MAX)), "0111111111111111");
    }

    #[test]
    fn test_encode_compute() {
        let instr = MachInstr::Compute { dest: Dest::new([Reg::M]), comp: Comp::D, jump: None };
        assert_eq!(bits(instr), "1110001100001000");

        let instr = MachInstr::Compute { dest: Dest::new([Reg::A, Reg::M, Reg::D]), comp: Comp::MMinusOne, jump: None };
        assert_eq!(bits(instr), "1111110010111000");

        let instr = MachInstr::Compute { dest: None, comp: Comp::D, jump: Some(Jump::JGT) };
        assert_eq!(bits(instr), "1110001100000001");

        // All fields present
        let instr = MachInstr::Compute { dest: Dest::new([Reg::D]), comp: Comp::DMinusA, jump: Some(Jump::JNE) };
        assert_eq!(bits(instr), "1110010011010101");
    }
}
