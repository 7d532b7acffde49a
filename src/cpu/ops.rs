//! Per-mnemonic instruction bodies.
//!
//! Same shape as the teacher's `nes/cpu/exec_core_g1.rs`: one function per
//! mnemonic, a banner comment over each showing which flags it touches,
//! and a `log::debug!` trace at entry. Undocumented opcodes (SLO, RLA,
//! SRE, RRA, DCP, ISC, LAX, SAX, ANC, ALR, ARR, AXS, XAA, LXA, SHA, SHX,
//! SHY, SHS, LAE) are grounded on the widely published 6502 illegal-
//! opcode behavior table rather than on any single pack file, since the
//! teacher only implements documented opcodes; the unstable high-byte
//! stores (SHA/SHX/SHY/SHS) use the commonly documented simplified
//! formula rather than chasing real hardware's bus-contention quirks.

use super::{Cpu, Flags};
use crate::cpu::opcodes::Mnemonic;

pub(crate) fn dispatch_read(cpu: &mut Cpu, mnemonic: Mnemonic, value: u8) {
    use Mnemonic::*;
    match mnemonic {
        Lda => lda(cpu, value),
        Ldx => ldx(cpu, value),
        Ldy => ldy(cpu, value),
        Lax => lax(cpu, value),
        Ora => ora(cpu, value),
        And => and(cpu, value),
        Eor => eor(cpu, value),
        Adc => adc(cpu, value),
        Sbc | SbcDup => sbc(cpu, value),
        Cmp => cmp(cpu, value),
        Cpx => cpx(cpu, value),
        Cpy => cpy(cpu, value),
        Bit => bit(cpu, value),
        Anc => anc(cpu, value),
        Alr => alr(cpu, value),
        Arr => arr(cpu, value),
        Axs => axs(cpu, value),
        Xaa => xaa(cpu, value),
        Lxa => lxa(cpu, value),
        Lae => lae(cpu, value),
        other => unreachable!("{:?} is not a read-class opcode", other),
    }
}

pub(crate) fn dispatch_store(cpu: &mut Cpu, mnemonic: Mnemonic, addr: u16) -> u8 {
    use Mnemonic::*;
    match mnemonic {
        Sta => sta(cpu),
        Stx => stx(cpu),
        Sty => sty(cpu),
        Sax => sax(cpu),
        Sha => sha(cpu, addr),
        Shx => shx(cpu, addr),
        Shy => shy(cpu, addr),
        Shs => shs(cpu, addr),
        other => unreachable!("{:?} is not a store-class opcode", other),
    }
}

pub(crate) fn dispatch_rmw(cpu: &mut Cpu, mnemonic: Mnemonic, value: u8) -> u8 {
    use Mnemonic::*;
    match mnemonic {
        Asl => asl(cpu, value),
        Lsr => lsr(cpu, value),
        Rol => rol(cpu, value),
        Ror => ror(cpu, value),
        Inc => inc(cpu, value),
        Dec => dec(cpu, value),
        Slo => slo(cpu, value),
        Rla => rla(cpu, value),
        Sre => sre(cpu, value),
        Rra => rra(cpu, value),
        Dcp => dcp(cpu, value),
        Isc => isc(cpu, value),
        other => unreachable!("{:?} is not a read-modify-write opcode", other),
    }
}

//////////////////////////////////////////////////////////////////
// Loads
//////////////////////////////////////////////////////////////////

//  N Z C I D V
//  + + - - - -
fn lda(cpu: &mut Cpu, value: u8) {
    log::debug!("[LDA] {:#04X}", value);
    cpu.regs.a = value;
    cpu.regs.set_zn(value);
}

//  N Z C I D V
//  + + - - - -
fn ldx(cpu: &mut Cpu, value: u8) {
    log::debug!("[LDX] {:#04X}", value);
    cpu.regs.x = value;
    cpu.regs.set_zn(value);
}

//  N Z C I D V
//  + + - - - -
fn ldy(cpu: &mut Cpu, value: u8) {
    log::debug!("[LDY] {:#04X}", value);
    cpu.regs.y = value;
    cpu.regs.set_zn(value);
}

/// Undocumented: loads A and X with the same value in one instruction.
//  N Z C I D V
//  + + - - - -
fn lax(cpu: &mut Cpu, value: u8) {
    log::debug!("[LAX] {:#04X}", value);
    cpu.regs.a = value;
    cpu.regs.x = value;
    cpu.regs.set_zn(value);
}

//////////////////////////////////////////////////////////////////
// Stores
//////////////////////////////////////////////////////////////////

//  N Z C I D V
//  - - - - - -
fn sta(cpu: &mut Cpu) -> u8 {
    log::debug!("[STA]");
    cpu.regs.a
}

fn stx(cpu: &mut Cpu) -> u8 {
    log::debug!("[STX]");
    cpu.regs.x
}

fn sty(cpu: &mut Cpu) -> u8 {
    log::debug!("[STY]");
    cpu.regs.y
}

/// Undocumented: stores A & X without touching flags.
fn sax(cpu: &mut Cpu) -> u8 {
    log::debug!("[SAX]");
    cpu.regs.a & cpu.regs.x
}

fn high_plus_one(addr: u16) -> u8 {
    ((addr >> 8) as u8).wrapping_add(1)
}

/// Undocumented, unstable on real hardware. Simplified stub: stores
/// `A & X & (high byte of the address + 1)`.
fn sha(cpu: &mut Cpu, addr: u16) -> u8 {
    log::debug!("[SHA]");
    cpu.regs.a & cpu.regs.x & high_plus_one(addr)
}

/// Undocumented, unstable. Simplified stub.
fn shx(cpu: &mut Cpu, addr: u16) -> u8 {
    log::debug!("[SHX]");
    cpu.regs.x & high_plus_one(addr)
}

/// Undocumented, unstable. Simplified stub.
fn shy(cpu: &mut Cpu, addr: u16) -> u8 {
    log::debug!("[SHY]");
    cpu.regs.y & high_plus_one(addr)
}

/// Undocumented ("TAS"), unstable. Simplified stub: `S = A & X`, then
/// stores `S & (high byte + 1)`.
fn shs(cpu: &mut Cpu, addr: u16) -> u8 {
    log::debug!("[SHS]");
    cpu.regs.s = cpu.regs.a & cpu.regs.x;
    cpu.regs.s & high_plus_one(addr)
}

//////////////////////////////////////////////////////////////////
// Logic
//////////////////////////////////////////////////////////////////

//  N Z C I D V
//  + + - - - -
fn ora(cpu: &mut Cpu, value: u8) {
    log::debug!("[ORA]");
    cpu.regs.a |= value;
    cpu.regs.set_zn(cpu.regs.a);
}

//  N Z C I D V
//  + + - - - -
fn and(cpu: &mut Cpu, value: u8) {
    log::debug!("[AND]");
    cpu.regs.a &= value;
    cpu.regs.set_zn(cpu.regs.a);
}

//  N Z C I D V
//  + + - - - -
fn eor(cpu: &mut Cpu, value: u8) {
    log::debug!("[EOR]");
    cpu.regs.a ^= value;
    cpu.regs.set_zn(cpu.regs.a);
}

//  N Z C I D V
//  + + - - - +
fn bit(cpu: &mut Cpu, value: u8) {
    log::debug!("[BIT] {:#04X}", value);
    cpu.regs.p.set(Flags::ZERO, cpu.regs.a & value == 0);
    cpu.regs.p.set(Flags::OVERFLOW, value & 0x40 != 0);
    cpu.regs.p.set(Flags::NEGATIVE, value & 0x80 != 0);
}

//////////////////////////////////////////////////////////////////
// Arithmetic
//////////////////////////////////////////////////////////////////

/// Shared add-with-carry core for ADC and (via one's complement) SBC.
fn add_with_carry(cpu: &mut Cpu, value: u8) {
    let carry_in = cpu.regs.p.contains(Flags::CARRY) as u16;
    let a = cpu.regs.a as u16;
    let sum = a + value as u16 + carry_in;
    let overflow = (!(a ^ value as u16) & (a ^ sum) & 0x80) != 0;
    cpu.regs.p.set(Flags::CARRY, sum > 0xFF);
    cpu.regs.p.set(Flags::OVERFLOW, overflow);
    cpu.regs.a = sum as u8;
    cpu.regs.set_zn(cpu.regs.a);
}

//  N Z C I D V
//  + + + - - +
fn adc(cpu: &mut Cpu, value: u8) {
    log::debug!("[ADC] {:#04X}", value);
    add_with_carry(cpu, value);
}

//  N Z C I D V
//  + + + - - +
fn sbc(cpu: &mut Cpu, value: u8) {
    log::debug!("[SBC] {:#04X}", value);
    add_with_carry(cpu, !value);
}

fn compare(cpu: &mut Cpu, reg: u8, value: u8) {
    let diff = reg.wrapping_sub(value);
    cpu.regs.p.set(Flags::CARRY, reg >= value);
    cpu.regs.p.set(Flags::ZERO, reg == value);
    cpu.regs.p.set(Flags::NEGATIVE, diff & 0x80 != 0);
}

//  N Z C I D V
//  + + + - - -
fn cmp(cpu: &mut Cpu, value: u8) {
    log::debug!("[CMP] {:#04X}", value);
    compare(cpu, cpu.regs.a, value);
}

fn cpx(cpu: &mut Cpu, value: u8) {
    log::debug!("[CPX] {:#04X}", value);
    compare(cpu, cpu.regs.x, value);
}

fn cpy(cpu: &mut Cpu, value: u8) {
    log::debug!("[CPY] {:#04X}", value);
    compare(cpu, cpu.regs.y, value);
}

//////////////////////////////////////////////////////////////////
// Increments / decrements (memory)
//////////////////////////////////////////////////////////////////

//  N Z C I D V
//  + + - - - -
fn inc(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[INC]");
    let out = value.wrapping_add(1);
    cpu.regs.set_zn(out);
    out
}

//  N Z C I D V
//  + + - - - -
fn dec(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[DEC]");
    let out = value.wrapping_sub(1);
    cpu.regs.set_zn(out);
    out
}

//////////////////////////////////////////////////////////////////
// Shifts / rotates
//////////////////////////////////////////////////////////////////

//  N Z C I D V
//  + + + - - -
fn asl(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[ASL]");
    cpu.regs.p.set(Flags::CARRY, value & 0x80 != 0);
    let out = value << 1;
    cpu.regs.set_zn(out);
    out
}

//  N Z C I D V
//  + + + - - -
fn lsr(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[LSR]");
    cpu.regs.p.set(Flags::CARRY, value & 0x01 != 0);
    let out = value >> 1;
    cpu.regs.set_zn(out);
    out
}

//  N Z C I D V
//  + + + - - -
fn rol(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[ROL]");
    let carry_in = cpu.regs.p.contains(Flags::CARRY) as u8;
    cpu.regs.p.set(Flags::CARRY, value & 0x80 != 0);
    let out = (value << 1) | carry_in;
    cpu.regs.set_zn(out);
    out
}

//  N Z C I D V
//  + + + - - -
fn ror(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[ROR]");
    let carry_in = cpu.regs.p.contains(Flags::CARRY) as u8;
    cpu.regs.p.set(Flags::CARRY, value & 0x01 != 0);
    let out = (value >> 1) | (carry_in << 7);
    cpu.regs.set_zn(out);
    out
}

//////////////////////////////////////////////////////////////////
// Undocumented read-modify-write combos
//////////////////////////////////////////////////////////////////

/// ASL the memory operand, then ORA the result into A.
fn slo(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[SLO]");
    let out = asl(cpu, value);
    cpu.regs.a |= out;
    cpu.regs.set_zn(cpu.regs.a);
    out
}

/// ROL the memory operand, then AND the result into A.
fn rla(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[RLA]");
    let out = rol(cpu, value);
    cpu.regs.a &= out;
    cpu.regs.set_zn(cpu.regs.a);
    out
}

/// LSR the memory operand, then EOR the result into A.
fn sre(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[SRE]");
    let out = lsr(cpu, value);
    cpu.regs.a ^= out;
    cpu.regs.set_zn(cpu.regs.a);
    out
}

/// ROR the memory operand, then ADC the result into A.
fn rra(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[RRA]");
    let out = ror(cpu, value);
    add_with_carry(cpu, out);
    out
}

/// DEC the memory operand, then CMP A against the result.
fn dcp(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[DCP]");
    let out = dec(cpu, value);
    compare(cpu, cpu.regs.a, out);
    out
}

/// INC the memory operand, then SBC the result from A.
fn isc(cpu: &mut Cpu, value: u8) -> u8 {
    log::debug!("[ISC]");
    let out = inc(cpu, value);
    add_with_carry(cpu, !out);
    out
}

//////////////////////////////////////////////////////////////////
// Undocumented immediate-operand oddities
//////////////////////////////////////////////////////////////////

/// ANC: AND then copy the result's sign bit into carry (used by some
/// copy-protection schemes as a cheap way to set/clear carry from A).
fn anc(cpu: &mut Cpu, value: u8) {
    log::debug!("[ANC]");
    cpu.regs.a &= value;
    cpu.regs.set_zn(cpu.regs.a);
    cpu.regs.p.set(Flags::CARRY, cpu.regs.a & 0x80 != 0);
}

/// ALR (ASR): AND then LSR A.
fn alr(cpu: &mut Cpu, value: u8) {
    log::debug!("[ALR]");
    cpu.regs.a &= value;
    cpu.regs.a = lsr(cpu, cpu.regs.a);
}

/// ARR: AND then ROR A, with carry/overflow taken from bits 6 and 5 of
/// the rotated result rather than the usual ROR carry-out.
fn arr(cpu: &mut Cpu, value: u8) {
    log::debug!("[ARR]");
    cpu.regs.a &= value;
    let carry_in = cpu.regs.p.contains(Flags::CARRY) as u8;
    cpu.regs.a = (cpu.regs.a >> 1) | (carry_in << 7);
    cpu.regs.set_zn(cpu.regs.a);
    cpu.regs.p.set(Flags::CARRY, cpu.regs.a & 0x40 != 0);
    let bit5 = (cpu.regs.a & 0x20) != 0;
    let bit6 = (cpu.regs.a & 0x40) != 0;
    cpu.regs.p.set(Flags::OVERFLOW, bit5 ^ bit6);
}

/// AXS (SBX): X = (A & X) - imm, as an unsigned subtract with no borrow in.
fn axs(cpu: &mut Cpu, value: u8) {
    log::debug!("[AXS]");
    let base = cpu.regs.a & cpu.regs.x;
    cpu.regs.p.set(Flags::CARRY, base >= value);
    cpu.regs.x = base.wrapping_sub(value);
    cpu.regs.set_zn(cpu.regs.x);
}

/// XAA (ANE): highly unstable on real hardware (depends on analog bus
/// capacitance). Simplified stub: `A = X & imm`.
fn xaa(cpu: &mut Cpu, value: u8) {
    log::debug!("[XAA]");
    cpu.regs.a = cpu.regs.x & value;
    cpu.regs.set_zn(cpu.regs.a);
}

/// LXA (LAX #imm / "ATX"): also unstable. Simplified stub: loads A and X
/// with the immediate operand directly.
fn lxa(cpu: &mut Cpu, value: u8) {
    log::debug!("[LXA]");
    cpu.regs.a = value;
    cpu.regs.x = value;
    cpu.regs.set_zn(value);
}

/// LAE (LAS): ANDs the stack pointer with the operand and loads the
/// result into A, X, and S all at once.
fn lae(cpu: &mut Cpu, value: u8) {
    log::debug!("[LAE]");
    let out = cpu.regs.s & value;
    cpu.regs.a = out;
    cpu.regs.x = out;
    cpu.regs.s = out;
    cpu.regs.set_zn(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Registers;

    fn cpu_with(a: u8, flags: Flags) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.regs = Registers { a, p: flags, ..Default::default() };
        cpu
    }

    #[test]
    fn adc_no_overflow() {
        let mut cpu = cpu_with(0x10, Flags::UNUSED);
        adc(&mut cpu, 0x20);
        assert_eq!(cpu.regs.a, 0x30);
        assert!(!cpu.regs.p.contains(Flags::OVERFLOW));
        assert!(!cpu.regs.p.contains(Flags::CARRY));
    }

    #[test]
    fn adc_signed_overflow() {
        let mut cpu = cpu_with(0x7F, Flags::UNUSED);
        adc(&mut cpu, 0x01);
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.p.contains(Flags::OVERFLOW));
        assert!(cpu.regs.p.contains(Flags::NEGATIVE));
    }

    #[test]
    fn sbc_borrow_clears_carry() {
        let mut cpu = cpu_with(0x00, Flags::UNUSED | Flags::CARRY);
        sbc(&mut cpu, 0x01);
        assert_eq!(cpu.regs.a, 0xFF);
        assert!(!cpu.regs.p.contains(Flags::CARRY));
    }

    #[test]
    fn cmp_equal_sets_zero_and_carry() {
        let mut cpu = cpu_with(0x42, Flags::UNUSED);
        cmp(&mut cpu, 0x42);
        assert!(cpu.regs.p.contains(Flags::ZERO));
        assert!(cpu.regs.p.contains(Flags::CARRY));
    }

    #[test]
    fn bit_checks_overflow_and_negative_from_memory_not_accumulator() {
        let mut cpu = cpu_with(0xFF, Flags::UNUSED);
        bit(&mut cpu, 0xC0);
        assert!(cpu.regs.p.contains(Flags::OVERFLOW));
        assert!(cpu.regs.p.contains(Flags::NEGATIVE));
        assert!(!cpu.regs.p.contains(Flags::ZERO));
    }

    #[test]
    fn slo_shifts_memory_and_ors_into_accumulator() {
        let mut cpu = cpu_with(0x01, Flags::UNUSED);
        let out = slo(&mut cpu, 0x81);
        assert_eq!(out, 0x02);
        assert_eq!(cpu.regs.a, 0x03);
        assert!(cpu.regs.p.contains(Flags::CARRY));
    }

    #[test]
    fn lax_loads_a_and_x_together() {
        let mut cpu = cpu_with(0, Flags::UNUSED);
        lax(&mut cpu, 0x77);
        assert_eq!(cpu.regs.a, 0x77);
        assert_eq!(cpu.regs.x, 0x77);
    }
}
