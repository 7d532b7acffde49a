//! The 256-entry opcode decode table.
//!
//! Generalizes the teacher's `nes/cpu/instruction.rs` (an `Instruction`
//! struct combining an addressing-mode template with a mnemonic core,
//! built into a `[Option<&Instruction>; 256]`) into data-only form: each
//! slot names a mnemonic, an addressing mode, a base cycle count, and
//! whether a page crossing adds one more cycle. `Cpu::step` is the single
//! place that interprets the table; see the 6502 opcode matrix this
//! mirrors at <https://llx.com/Neil/a2/opcodes.html>, cited in the same
//! file we're generalizing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    // Load/store
    Lda, Ldx, Ldy, Sta, Stx, Sty,
    // Transfers
    Tax, Tay, Txa, Tya, Tsx, Txs,
    // Stack
    Pha, Php, Pla, Plp,
    // Logic/arithmetic
    And, Eor, Ora, Bit, Adc, Sbc, Cmp, Cpx, Cpy,
    // Increments
    Inc, Inx, Iny, Dec, Dex, Dey,
    // Shifts
    Asl, Lsr, Rol, Ror,
    // Control flow
    Jmp, Jsr, Rts, Rti, Brk,
    Bcc, Bcs, Beq, Bmi, Bne, Bpl, Bvc, Bvs,
    // Flags
    Clc, Cld, Cli, Clv, Sec, Sed, Sei,
    // No-ops (including undocumented multi-byte forms)
    Nop, Dop, Top,
    // Undocumented read-modify-write combos
    Slo, Rla, Sre, Rra, Dcp, Isc,
    // Undocumented loads/stores
    Lax, Sax,
    // Undocumented immediate-operand oddities
    Anc, Alr, Arr, Axs, Xaa, Lxa, SbcDup,
    // Undocumented unstable high-byte stores
    Sha, Shx, Shy, Shs, Lae,
    // CPU lockup ("JAM"/"KIL"/"STP"): not implemented, fatal on decode
    Jam,
}

#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    pub cycles: u8,
    pub page_penalty: bool,
}

macro_rules! op {
    ($m:ident, $mode:ident, $c:expr) => {
        OpInfo { mnemonic: Mnemonic::$m, mode: AddrMode::$mode, cycles: $c, page_penalty: false }
    };
    ($m:ident, $mode:ident, $c:expr, pc) => {
        OpInfo { mnemonic: Mnemonic::$m, mode: AddrMode::$mode, cycles: $c, page_penalty: true }
    };
}

/// Full 256-slot decode table, in opcode order. `Jam` slots are included
/// as data (rather than `None`) so callers can still log a mnemonic
/// before halting; `Cpu::step` treats `Jam` as the fatal case.
pub static OPCODES: [OpInfo; 256] = [
    /* 00 */ op!(Brk, Implied, 7),       /* 01 */ op!(Ora, IndirectX, 6),
    /* 02 */ op!(Jam, Implied, 0),       /* 03 */ op!(Slo, IndirectX, 8),
    /* 04 */ op!(Dop, ZeroPage, 3),      /* 05 */ op!(Ora, ZeroPage, 3),
    /* 06 */ op!(Asl, ZeroPage, 5),      /* 07 */ op!(Slo, ZeroPage, 5),
    /* 08 */ op!(Php, Implied, 3),       /* 09 */ op!(Ora, Immediate, 2),
    /* 0A */ op!(Asl, Accumulator, 2),   /* 0B */ op!(Anc, Immediate, 2),
    /* 0C */ op!(Top, Absolute, 4),      /* 0D */ op!(Ora, Absolute, 4),
    /* 0E */ op!(Asl, Absolute, 6),      /* 0F */ op!(Slo, Absolute, 6),

    /* 10 */ op!(Bpl, Relative, 2),      /* 11 */ op!(Ora, IndirectY, 5, pc),
    /* 12 */ op!(Jam, Implied, 0),       /* 13 */ op!(Slo, IndirectY, 8),
    /* 14 */ op!(Dop, ZeroPageX, 4),     /* 15 */ op!(Ora, ZeroPageX, 4),
    /* 16 */ op!(Asl, ZeroPageX, 6),     /* 17 */ op!(Slo, ZeroPageX, 6),
    /* 18 */ op!(Clc, Implied, 2),       /* 19 */ op!(Ora, AbsoluteY, 4, pc),
    /* 1A */ op!(Nop, Implied, 2),       /* 1B */ op!(Slo, AbsoluteY, 7),
    /* 1C */ op!(Top, AbsoluteX, 4, pc), /* 1D */ op!(Ora, AbsoluteX, 4, pc),
    /* 1E */ op!(Asl, AbsoluteX, 7),     /* 1F */ op!(Slo, AbsoluteX, 7),

    /* 20 */ op!(Jsr, Absolute, 6),      /* 21 */ op!(And, IndirectX, 6),
    /* 22 */ op!(Jam, Implied, 0),       /* 23 */ op!(Rla, IndirectX, 8),
    /* 24 */ op!(Bit, ZeroPage, 3),      /* 25 */ op!(And, ZeroPage, 3),
    /* 26 */ op!(Rol, ZeroPage, 5),      /* 27 */ op!(Rla, ZeroPage, 5),
    /* 28 */ op!(Plp, Implied, 4),       /* 29 */ op!(And, Immediate, 2),
    /* 2A */ op!(Rol, Accumulator, 2),   /* 2B */ op!(Anc, Immediate, 2),
    /* 2C */ op!(Bit, Absolute, 4),      /* 2D */ op!(And, Absolute, 4),
    /* 2E */ op!(Rol, Absolute, 6),      /* 2F */ op!(Rla, Absolute, 6),

    /* 30 */ op!(Bmi, Relative, 2),      /* 31 */ op!(And, IndirectY, 5, pc),
    /* 32 */ op!(Jam, Implied, 0),       /* 33 */ op!(Rla, IndirectY, 8),
    /* 34 */ op!(Dop, ZeroPageX, 4),     /* 35 */ op!(And, ZeroPageX, 4),
    /* 36 */ op!(Rol, ZeroPageX, 6),     /* 37 */ op!(Rla, ZeroPageX, 6),
    /* 38 */ op!(Sec, Implied, 2),       /* 39 */ op!(And, AbsoluteY, 4, pc),
    /* 3A */ op!(Nop, Implied, 2),       /* 3B */ op!(Rla, AbsoluteY, 7),
    /* 3C */ op!(Top, AbsoluteX, 4, pc), /* 3D */ op!(And, AbsoluteX, 4, pc),
    /* 3E */ op!(Rol, AbsoluteX, 7),     /* 3F */ op!(Rla, AbsoluteX, 7),

    /* 40 */ op!(Rti, Implied, 6),       /* 41 */ op!(Eor, IndirectX, 6),
    /* 42 */ op!(Jam, Implied, 0),       /* 43 */ op!(Sre, IndirectX, 8),
    /* 44 */ op!(Dop, ZeroPage, 3),      /* 45 */ op!(Eor, ZeroPage, 3),
    /* 46 */ op!(Lsr, ZeroPage, 5),      /* 47 */ op!(Sre, ZeroPage, 5),
    /* 48 */ op!(Pha, Implied, 3),       /* 49 */ op!(Eor, Immediate, 2),
    /* 4A */ op!(Lsr, Accumulator, 2),   /* 4B */ op!(Alr, Immediate, 2),
    /* 4C */ op!(Jmp, Absolute, 3),      /* 4D */ op!(Eor, Absolute, 4),
    /* 4E */ op!(Lsr, Absolute, 6),      /* 4F */ op!(Sre, Absolute, 6),

    /* 50 */ op!(Bvc, Relative, 2),      /* 51 */ op!(Eor, IndirectY, 5, pc),
    /* 52 */ op!(Jam, Implied, 0),       /* 53 */ op!(Sre, IndirectY, 8),
    /* 54 */ op!(Dop, ZeroPageX, 4),     /* 55 */ op!(Eor, ZeroPageX, 4),
    /* 56 */ op!(Lsr, ZeroPageX, 6),     /* 57 */ op!(Sre, ZeroPageX, 6),
    /* 58 */ op!(Cli, Implied, 2),       /* 59 */ op!(Eor, AbsoluteY, 4, pc),
    /* 5A */ op!(Nop, Implied, 2),       /* 5B */ op!(Sre, AbsoluteY, 7),
    /* 5C */ op!(Top, AbsoluteX, 4, pc), /* 5D */ op!(Eor, AbsoluteX, 4, pc),
    /* 5E */ op!(Lsr, AbsoluteX, 7),     /* 5F */ op!(Sre, AbsoluteX, 7),

    /* 60 */ op!(Rts, Implied, 6),       /* 61 */ op!(Adc, IndirectX, 6),
    /* 62 */ op!(Jam, Implied, 0),       /* 63 */ op!(Rra, IndirectX, 8),
    /* 64 */ op!(Dop, ZeroPage, 3),      /* 65 */ op!(Adc, ZeroPage, 3),
    /* 66 */ op!(Ror, ZeroPage, 5),      /* 67 */ op!(Rra, ZeroPage, 5),
    /* 68 */ op!(Pla, Implied, 4),       /* 69 */ op!(Adc, Immediate, 2),
    /* 6A */ op!(Ror, Accumulator, 2),   /* 6B */ op!(Arr, Immediate, 2),
    /* 6C */ op!(Jmp, Indirect, 5),      /* 6D */ op!(Adc, Absolute, 4),
    /* 6E */ op!(Ror, Absolute, 6),      /* 6F */ op!(Rra, Absolute, 6),

    /* 70 */ op!(Bvs, Relative, 2),      /* 71 */ op!(Adc, IndirectY, 5, pc),
    /* 72 */ op!(Jam, Implied, 0),       /* 73 */ op!(Rra, IndirectY, 8),
    /* 74 */ op!(Dop, ZeroPageX, 4),     /* 75 */ op!(Adc, ZeroPageX, 4),
    /* 76 */ op!(Ror, ZeroPageX, 6),     /* 77 */ op!(Rra, ZeroPageX, 6),
    /* 78 */ op!(Sei, Implied, 2),       /* 79 */ op!(Adc, AbsoluteY, 4, pc),
    /* 7A */ op!(Nop, Implied, 2),       /* 7B */ op!(Rra, AbsoluteY, 7),
    /* 7C */ op!(Top, AbsoluteX, 4, pc), /* 7D */ op!(Adc, AbsoluteX, 4, pc),
    /* 7E */ op!(Ror, AbsoluteX, 7),     /* 7F */ op!(Rra, AbsoluteX, 7),

    /* 80 */ op!(Dop, Immediate, 2),     /* 81 */ op!(Sta, IndirectX, 6),
    /* 82 */ op!(Dop, Immediate, 2),     /* 83 */ op!(Sax, IndirectX, 6),
    /* 84 */ op!(Sty, ZeroPage, 3),      /* 85 */ op!(Sta, ZeroPage, 3),
    /* 86 */ op!(Stx, ZeroPage, 3),      /* 87 */ op!(Sax, ZeroPage, 3),
    /* 88 */ op!(Dey, Implied, 2),       /* 89 */ op!(Dop, Immediate, 2),
    /* 8A */ op!(Txa, Implied, 2),       /* 8B */ op!(Xaa, Immediate, 2),
    /* 8C */ op!(Sty, Absolute, 4),      /* 8D */ op!(Sta, Absolute, 4),
    /* 8E */ op!(Stx, Absolute, 4),      /* 8F */ op!(Sax, Absolute, 4),

    /* 90 */ op!(Bcc, Relative, 2),      /* 91 */ op!(Sta, IndirectY, 6),
    /* 92 */ op!(Jam, Implied, 0),       /* 93 */ op!(Sha, IndirectY, 6),
    /* 94 */ op!(Sty, ZeroPageX, 4),     /* 95 */ op!(Sta, ZeroPageX, 4),
    /* 96 */ op!(Stx, ZeroPageY, 4),     /* 97 */ op!(Sax, ZeroPageY, 4),
    /* 98 */ op!(Tya, Implied, 2),       /* 99 */ op!(Sta, AbsoluteY, 5),
    /* 9A */ op!(Txs, Implied, 2),       /* 9B */ op!(Shs, AbsoluteY, 5),
    /* 9C */ op!(Shy, AbsoluteX, 5),     /* 9D */ op!(Sta, AbsoluteX, 5),
    /* 9E */ op!(Shx, AbsoluteY, 5),     /* 9F */ op!(Sha, AbsoluteY, 5),

    /* A0 */ op!(Ldy, Immediate, 2),     /* A1 */ op!(Lda, IndirectX, 6),
    /* A2 */ op!(Ldx, Immediate, 2),     /* A3 */ op!(Lax, IndirectX, 6),
    /* A4 */ op!(Ldy, ZeroPage, 3),      /* A5 */ op!(Lda, ZeroPage, 3),
    /* A6 */ op!(Ldx, ZeroPage, 3),      /* A7 */ op!(Lax, ZeroPage, 3),
    /* A8 */ op!(Tay, Implied, 2),       /* A9 */ op!(Lda, Immediate, 2),
    /* AA */ op!(Tax, Implied, 2),       /* AB */ op!(Lxa, Immediate, 2),
    /* AC */ op!(Ldy, Absolute, 4),      /* AD */ op!(Lda, Absolute, 4),
    /* AE */ op!(Ldx, Absolute, 4),      /* AF */ op!(Lax, Absolute, 4),

    /* B0 */ op!(Bcs, Relative, 2),      /* B1 */ op!(Lda, IndirectY, 5, pc),
    /* B2 */ op!(Jam, Implied, 0),       /* B3 */ op!(Lax, IndirectY, 5, pc),
    /* B4 */ op!(Ldy, ZeroPageX, 4),     /* B5 */ op!(Lda, ZeroPageX, 4),
    /* B6 */ op!(Ldx, ZeroPageY, 4),     /* B7 */ op!(Lax, ZeroPageY, 4),
    /* B8 */ op!(Clv, Implied, 2),       /* B9 */ op!(Lda, AbsoluteY, 4, pc),
    /* BA */ op!(Tsx, Implied, 2),       /* BB */ op!(Lae, AbsoluteY, 4, pc),
    /* BC */ op!(Ldy, AbsoluteX, 4, pc), /* BD */ op!(Lda, AbsoluteX, 4, pc),
    /* BE */ op!(Ldx, AbsoluteY, 4, pc), /* BF */ op!(Lax, AbsoluteY, 4, pc),

    /* C0 */ op!(Cpy, Immediate, 2),     /* C1 */ op!(Cmp, IndirectX, 6),
    /* C2 */ op!(Dop, Immediate, 2),     /* C3 */ op!(Dcp, IndirectX, 8),
    /* C4 */ op!(Cpy, ZeroPage, 3),      /* C5 */ op!(Cmp, ZeroPage, 3),
    /* C6 */ op!(Dec, ZeroPage, 5),      /* C7 */ op!(Dcp, ZeroPage, 5),
    /* C8 */ op!(Iny, Implied, 2),       /* C9 */ op!(Cmp, Immediate, 2),
    /* CA */ op!(Dex, Implied, 2),       /* CB */ op!(Axs, Immediate, 2),
    /* CC */ op!(Cpy, Absolute, 4),      /* CD */ op!(Cmp, Absolute, 4),
    /* CE */ op!(Dec, Absolute, 6),      /* CF */ op!(Dcp, Absolute, 6),

    /* D0 */ op!(Bne, Relative, 2),      /* D1 */ op!(Cmp, IndirectY, 5, pc),
    /* D2 */ op!(Jam, Implied, 0),       /* D3 */ op!(Dcp, IndirectY, 8),
    /* D4 */ op!(Dop, ZeroPageX, 4),     /* D5 */ op!(Cmp, ZeroPageX, 4),
    /* D6 */ op!(Dec, ZeroPageX, 6),     /* D7 */ op!(Dcp, ZeroPageX, 6),
    /* D8 */ op!(Cld, Implied, 2),       /* D9 */ op!(Cmp, AbsoluteY, 4, pc),
    /* DA */ op!(Nop, Implied, 2),       /* DB */ op!(Dcp, AbsoluteY, 7),
    /* DC */ op!(Top, AbsoluteX, 4, pc), /* DD */ op!(Cmp, AbsoluteX, 4, pc),
    /* DE */ op!(Dec, AbsoluteX, 7),     /* DF */ op!(Dcp, AbsoluteX, 7),

    /* E0 */ op!(Cpx, Immediate, 2),     /* E1 */ op!(Sbc, IndirectX, 6),
    /* E2 */ op!(Dop, Immediate, 2),     /* E3 */ op!(Isc, IndirectX, 8),
    /* E4 */ op!(Cpx, ZeroPage, 3),      /* E5 */ op!(Sbc, ZeroPage, 3),
    /* E6 */ op!(Inc, ZeroPage, 5),      /* E7 */ op!(Isc, ZeroPage, 5),
    /* E8 */ op!(Inx, Implied, 2),       /* E9 */ op!(Sbc, Immediate, 2),
    /* EA */ op!(Nop, Implied, 2),       /* EB */ op!(SbcDup, Immediate, 2),
    /* EC */ op!(Cpx, Absolute, 4),      /* ED */ op!(Sbc, Absolute, 4),
    /* EE */ op!(Inc, Absolute, 6),      /* EF */ op!(Isc, Absolute, 6),

    /* F0 */ op!(Beq, Relative, 2),      /* F1 */ op!(Sbc, IndirectY, 5, pc),
    /* F2 */ op!(Jam, Implied, 0),       /* F3 */ op!(Isc, IndirectY, 8),
    /* F4 */ op!(Dop, ZeroPageX, 4),     /* F5 */ op!(Sbc, ZeroPageX, 4),
    /* F6 */ op!(Inc, ZeroPageX, 6),     /* F7 */ op!(Isc, ZeroPageX, 6),
    /* F8 */ op!(Sed, Implied, 2),       /* F9 */ op!(Sbc, AbsoluteY, 4, pc),
    /* FA */ op!(Nop, Implied, 2),       /* FB */ op!(Isc, AbsoluteY, 7),
    /* FC */ op!(Top, AbsoluteX, 4, pc), /* FD */ op!(Sbc, AbsoluteX, 4, pc),
    /* FE */ op!(Inc, AbsoluteX, 7),     /* FF */ op!(Isc, AbsoluteX, 7),
];

pub fn decode(opcode: u8) -> OpInfo {
    OPCODES[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_256_entries() {
        assert_eq!(OPCODES.len(), 256);
    }

    #[test]
    fn spot_check_known_opcodes() {
        assert_eq!(decode(0xA9).mnemonic, Mnemonic::Lda);
        assert_eq!(decode(0xA9).mode, AddrMode::Immediate);
        assert_eq!(decode(0x00).mnemonic, Mnemonic::Brk);
        assert_eq!(decode(0x4C).mode, AddrMode::Absolute);
        assert_eq!(decode(0x6C).mode, AddrMode::Indirect);
        assert_eq!(decode(0xEA).mnemonic, Mnemonic::Nop);
    }

    #[test]
    fn jam_opcodes_are_flagged() {
        for op in [0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2] {
            assert_eq!(decode(op).mnemonic, Mnemonic::Jam, "opcode {:#04X}", op);
        }
    }
}
