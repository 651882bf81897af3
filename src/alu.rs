//! ALU implementation
//! All arithmetic wraps; nothing here traps on overflow.

use crate::instruction::decode_helper::sign_extend_imm;
use crate::instruction::Function;

/// Register-register and shift operations.
/// Returns None for anything that is not a pure A-op-B computation.
pub fn alu(function: Function, a: u32, b: u32, shamt: u32) -> Option<u32> {
    use Function::*;
    Some(match function {
        SLL => b << shamt,
        SRL => b >> shamt,
        SRA => shift_right_arithmetic(b, shamt),
        ADD | ADDU => a.wrapping_add(b),
        SUB | SUBU => a.wrapping_sub(b),
        AND => a & b,
        OR => a | b,
        XOR => a ^ b,
        NOR => !(a | b),
        // Unsigned compare
        SLT => (a < b) as u32,
        _ => return None,
    })
}

/// Register-immediate operations and effective-address computation.
/// `imm` is the raw 16-bit field.
pub fn alu_imm(function: Function, a: u32, imm: u32) -> Option<u32> {
    use Function::*;
    let simm = sign_extend_imm(imm);
    let zimm = imm & 0xFFFF;
    Some(match function {
        ADDI | ADDIU => a.wrapping_add(simm),
        SLTI => ((a as i32) < (simm as i32)) as u32,
        ANDI => a & zimm,
        ORI => a | zimm,
        XORI => a ^ zimm,
        LUI => zimm << 16,
        LB | LH | LW | SB | SH | SW => effective_address(a, imm),
        _ => return None,
    })
}

/// base + sign-extended offset
pub fn effective_address(base: u32, imm: u32) -> u32 {
    base.wrapping_add(sign_extend_imm(imm))
}

/// Arithmetic right shift through bit inversion:
/// a negative value is inverted, shifted logically, and inverted back.
pub fn shift_right_arithmetic(value: u32, shamt: u32) -> u32 {
    if value & 0x8000_0000 != 0 {
        !(!value >> shamt)
    } else {
        value >> shamt
    }
}

/// 64-bit product split into (HI, LO).
/// Signed multiplication sign-extends both operands first.
pub fn multiply(a: u32, b: u32, signed: bool) -> (u32, u32) {
    let product = if signed {
        (a as i32 as i64).wrapping_mul(b as i32 as i64) as u64
    } else {
        (a as u64) * (b as u64)
    };
    ((product >> 32) as u32, product as u32)
}

/// (HI, LO) = (remainder, quotient), or None for a zero divisor
pub fn divide(a: u32, b: u32, signed: bool) -> Option<(u32, u32)> {
    if b == 0 {
        return None;
    }
    Some(if signed {
        let (a, b) = (a as i32, b as i32);
        (a.wrapping_rem(b) as u32, a.wrapping_div(b) as u32)
    } else {
        (a % b, a / b)
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_r_type() {
        assert_eq!(alu(Function::ADD, 0xFFFF_FFFF, 2, 0), Some(1));
        assert_eq!(alu(Function::SUBU, 1, 2, 0), Some(0xFFFF_FFFF));
        assert_eq!(alu(Function::NOR, 0xF0F0_0000, 0x0F0F_0000, 0), Some(0x0000_FFFF));
        assert_eq!(alu(Function::SLL, 0, 1, 4), Some(16));
        assert_eq!(alu(Function::SRL, 0, 0x8000_0000, 31), Some(1));
        assert_eq!(alu(Function::MULT, 1, 1, 0), None);
    }

    #[test]
    fn test_slt_is_unsigned() {
        // -1 is the largest unsigned value
        assert_eq!(alu(Function::SLT, 0xFFFF_FFFF, 1, 0), Some(0));
        assert_eq!(alu(Function::SLT, 1, 0xFFFF_FFFF, 0), Some(1));
    }

    #[test]
    fn test_sra() {
        assert_eq!(shift_right_arithmetic(0x8000_0000, 4), 0xF800_0000);
        assert_eq!(shift_right_arithmetic(0xFFFF_FFF0, 2), 0xFFFF_FFFC);
        assert_eq!(shift_right_arithmetic(0x7000_0000, 4), 0x0700_0000);
    }

    #[test]
    fn test_immediates() {
        assert_eq!(alu_imm(Function::ADDIU, 10, 0xFFFF), Some(9));
        assert_eq!(alu_imm(Function::SLTI, (-3i32) as u32, 0xFFFE), Some(1));
        assert_eq!(alu_imm(Function::SLTI, 3, 0xFFFE), Some(0));
        assert_eq!(alu_imm(Function::ANDI, 0xFFFF_FFFF, 0x8001), Some(0x8001));
        assert_eq!(alu_imm(Function::ORI, 0x1_0000, 0xFFFF), Some(0x1_FFFF));
        assert_eq!(alu_imm(Function::XORI, 0xFF, 0x0F), Some(0xF0));
        assert_eq!(alu_imm(Function::LUI, 0, 0x1234), Some(0x1234_0000));
        assert_eq!(alu_imm(Function::LW, 0x1000_0008, 0xFFFC), Some(0x1000_0004));
        assert_eq!(alu_imm(Function::BEQ, 0, 0), None);
    }

    #[test]
    fn test_divide() {
        assert_eq!(divide(7, 2, false), Some((1, 3)));
        assert_eq!(divide((-7i32) as u32, 2, true), Some(((-1i32) as u32, (-3i32) as u32)));
        assert_eq!(divide(5, 0, true), None);
        assert_eq!(divide(5, 0, false), None);
        // i32::MIN / -1 wraps instead of trapping
        assert_eq!(divide(0x8000_0000, 0xFFFF_FFFF, true), Some((0, 0x8000_0000)));
    }

    proptest! {
        #[test]
        fn prop_multu_never_sign_extends(a: u32, b: u32) {
            let (hi, lo) = multiply(a, b, false);
            prop_assert_eq!(((hi as u64) << 32) | lo as u64, a as u64 * b as u64);
        }

        #[test]
        fn prop_mult_sign_extends(a: u32, b: u32) {
            let (hi, lo) = multiply(a, b, true);
            let expected = (a as i32 as i64).wrapping_mul(b as i32 as i64) as u64;
            prop_assert_eq!(((hi as u64) << 32) | lo as u64, expected);
        }

        #[test]
        fn prop_sra_matches_signed_shift(value: u32, shamt in 0u32..32) {
            prop_assert_eq!(
                shift_right_arithmetic(value, shamt),
                ((value as i32) >> shamt) as u32
            );
        }
    }
}
