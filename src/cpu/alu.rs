//! Arithmetic/compare unit.

use crate::cpu::registers::{Flags, Reg, Registers};
use serde::{Serialize, Deserialize};

/// Operations the ALU can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluOp {
    /// `a := (a + b) mod 256`
    Add,
    /// `a := (a * b) mod 256`
    Mul,
    /// Set FL from an unsigned comparison of `a` and `b`.
    Cmp,
}

/// Apply `op` to registers `a` and `b`.
pub fn alu(regs: &mut Registers, op: AluOp, a: Reg, b: Reg) {
    let lhs = regs.get(a);
    let rhs = regs.get(b);

    match op {
        AluOp::Add => regs.set(a, lhs.wrapping_add(rhs)),
        AluOp::Mul => regs.set(a, lhs.wrapping_mul(rhs)),
        AluOp::Cmp => regs.fl = compare(lhs, rhs),
    }
}

/// Exactly one flag bit is set. Equality is tested first.
fn compare(lhs: u8, rhs: u8) -> Flags {
    let bits = if lhs == rhs {
        Flags::EQUAL
    } else if lhs < rhs {
        Flags::LESS
    } else {
        Flags::GREATER
    };
    Flags::from_bits(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn r(i: u8) -> Reg {
        Reg::new(i).unwrap()
    }

    fn regs_with(a: u8, b: u8) -> Registers {
        let mut regs = Registers::new();
        regs.set(r(0), a);
        regs.set(r(1), b);
        regs
    }

    #[test]
    fn test_mul_wraps() {
        let mut regs = regs_with(250, 10);
        alu(&mut regs, AluOp::Mul, r(0), r(1));
        assert_eq!(regs.get(r(0)), 4);
        assert_eq!(regs.get(r(1)), 10);
    }

    #[test]
    fn test_add_wraps() {
        let mut regs = regs_with(200, 100);
        alu(&mut regs, AluOp::Add, r(0), r(1));
        assert_eq!(regs.get(r(0)), 44);
    }

    #[test]
    fn test_add_same_register() {
        let mut regs = regs_with(21, 0);
        alu(&mut regs, AluOp::Add, r(0), r(0));
        assert_eq!(regs.get(r(0)), 42);
    }

    #[test]
    fn test_cmp_outcomes() {
        let mut regs = regs_with(5, 5);
        alu(&mut regs, AluOp::Cmp, r(0), r(1));
        assert_eq!(regs.fl.bits(), 0b001);

        let mut regs = regs_with(3, 5);
        alu(&mut regs, AluOp::Cmp, r(0), r(1));
        assert_eq!(regs.fl.bits(), 0b100);

        let mut regs = regs_with(7, 5);
        alu(&mut regs, AluOp::Cmp, r(0), r(1));
        assert_eq!(regs.fl.bits(), 0b010);
    }

    #[test]
    fn test_cmp_leaves_registers() {
        let mut regs = regs_with(9, 4);
        alu(&mut regs, AluOp::Cmp, r(0), r(1));
        assert_eq!(regs.get(r(0)), 9);
        assert_eq!(regs.get(r(1)), 4);
    }

    proptest! {
        #[test]
        fn prop_add_matches_modular(a: u8, b: u8) {
            let mut regs = regs_with(a, b);
            alu(&mut regs, AluOp::Add, r(0), r(1));
            prop_assert_eq!(regs.get(r(0)) as u32, (a as u32 + b as u32) % 256);
        }

        #[test]
        fn prop_mul_matches_modular(a: u8, b: u8) {
            let mut regs = regs_with(a, b);
            alu(&mut regs, AluOp::Mul, r(0), r(1));
            prop_assert_eq!(regs.get(r(0)) as u32, (a as u32 * b as u32) % 256);
        }

        #[test]
        fn prop_cmp_sets_one_flag(a: u8, b: u8) {
            let mut regs = regs_with(a, b);
            alu(&mut regs, AluOp::Cmp, r(0), r(1));
            let fl = regs.fl;
            prop_assert_eq!(fl.bits().count_ones(), 1);
            prop_assert_eq!(fl.equal(), a == b);
            prop_assert_eq!(fl.less(), a < b);
            prop_assert_eq!(fl.greater(), a > b);
        }
    }
}
