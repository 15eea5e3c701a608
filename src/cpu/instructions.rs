//! Opcode catalogue
//!
//! Every opcode is described by its operation, addressing mode, operand
//! registers, branch condition and base cost in M-cycles. The base cost is
//! what the instruction takes when a conditional branch is not taken;
//! execution adds the extra cycles of a taken branch.

use crate::common::Byte;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionType {
    None,
    Nop,
    Ld,
    Inc,
    Dec,
    Rlca,
    Add,
    Rrca,
    Stop,
    Rla,
    Jr,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Halt,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
    Pop,
    Jp,
    Push,
    Ret,
    Cb,
    Call,
    Reti,
    Ldh,
    Di,
    Ei,
    Rst,
    // 0xCB page
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Bit,
    Res,
    Set,
}

/// Where an instruction's operands come from and where its result goes.
///
/// `D8`/`D16` are immediates following the opcode, `A8`/`A16` are immediate
/// addresses (`A8` is an offset into 0xFF00), `Memory*` dereferences a
/// register pair, `Hli`/`Hld` post-increment/decrement HL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Register,
    RegisterRegister,
    MemoryRegister,
    RegisterMemory,
    RegisterD8,
    RegisterD16,
    RegisterA8,
    RegisterA16,
    A8Register,
    A16Register,
    MemoryRegisterD8,
    HliRegister,
    HldRegister,
    RegisterHli,
    RegisterHld,
    HlSpr,
    D8,
    D16,
    MemoryRegisterOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterType {
    None,
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    Af,
    Bc,
    De,
    Hl,
    Sp,
    Pc,
}

impl RegisterType {
    /// Pairs and SP/PC are 16 bits wide.
    pub fn is_16bit(self) -> bool {
        matches!(
            self,
            RegisterType::Af | RegisterType::Bc | RegisterType::De | RegisterType::Hl | RegisterType::Sp | RegisterType::Pc
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            RegisterType::None => "-",
            RegisterType::A => "A",
            RegisterType::F => "F",
            RegisterType::B => "B",
            RegisterType::C => "C",
            RegisterType::D => "D",
            RegisterType::E => "E",
            RegisterType::H => "H",
            RegisterType::L => "L",
            RegisterType::Af => "AF",
            RegisterType::Bc => "BC",
            RegisterType::De => "DE",
            RegisterType::Hl => "HL",
            RegisterType::Sp => "SP",
            RegisterType::Pc => "PC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionType {
    None,
    Nz,
    Z,
    Nc,
    C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub inst_type: InstructionType,
    pub mode: AddressingMode,
    pub reg1: RegisterType,
    pub reg2: RegisterType,
    pub cond: ConditionType,
    /// RST target or bit index for BIT/RES/SET
    pub param: Byte,
    /// Base cost in M-cycles (branch not taken)
    pub cycles: u8,
}

impl Instruction {
    pub const fn new() -> Self {
        Self {
            inst_type: InstructionType::None,
            mode: AddressingMode::Implied,
            reg1: RegisterType::None,
            reg2: RegisterType::None,
            cond: ConditionType::None,
            param: 0,
            cycles: 0,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.inst_type != InstructionType::None
    }
}

impl Default for Instruction {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! op {
    ($cy:expr, $t:ident) => {
        op!($cy, $t, Implied, None, None, None, 0)
    };
    ($cy:expr, $t:ident, $m:ident) => {
        op!($cy, $t, $m, None, None, None, 0)
    };
    ($cy:expr, $t:ident, $m:ident, $r1:ident) => {
        op!($cy, $t, $m, $r1, None, None, 0)
    };
    ($cy:expr, $t:ident, $m:ident, $r1:ident, $r2:ident) => {
        op!($cy, $t, $m, $r1, $r2, None, 0)
    };
    ($cy:expr, $t:ident, $m:ident, $r1:ident, $r2:ident, $c:ident) => {
        op!($cy, $t, $m, $r1, $r2, $c, 0)
    };
    ($cy:expr, $t:ident, $m:ident, $r1:ident, $r2:ident, $c:ident, $p:expr) => {
        Instruction {
            inst_type: InstructionType::$t,
            mode: AddressingMode::$m,
            reg1: RegisterType::$r1,
            reg2: RegisterType::$r2,
            cond: ConditionType::$c,
            param: $p,
            cycles: $cy,
        }
    };
}

/// Unprefixed opcodes. Undefined slots carry `InstructionType::None`.
pub static INSTRUCTIONS: [Instruction; 256] = [
    op!(1, Nop),                                            // 00 NOP
    op!(3, Ld, RegisterD16, Bc),                            // 01 LD BC,d16
    op!(2, Ld, MemoryRegister, Bc, A),                      // 02 LD (BC),A
    op!(2, Inc, Register, Bc),                              // 03 INC BC
    op!(1, Inc, Register, B),                               // 04 INC B
    op!(1, Dec, Register, B),                               // 05 DEC B
    op!(2, Ld, RegisterD8, B),                              // 06 LD B,d8
    op!(1, Rlca),                                           // 07 RLCA
    op!(5, Ld, A16Register, None, Sp),                      // 08 LD (a16),SP
    op!(2, Add, RegisterRegister, Hl, Bc),                  // 09 ADD HL,BC
    op!(2, Ld, RegisterMemory, A, Bc),                      // 0A LD A,(BC)
    op!(2, Dec, Register, Bc),                              // 0B DEC BC
    op!(1, Inc, Register, C),                               // 0C INC C
    op!(1, Dec, Register, C),                               // 0D DEC C
    op!(2, Ld, RegisterD8, C),                              // 0E LD C,d8
    op!(1, Rrca),                                           // 0F RRCA

    op!(1, Stop),                                           // 10 STOP
    op!(3, Ld, RegisterD16, De),                            // 11 LD DE,d16
    op!(2, Ld, MemoryRegister, De, A),                      // 12 LD (DE),A
    op!(2, Inc, Register, De),                              // 13 INC DE
    op!(1, Inc, Register, D),                               // 14 INC D
    op!(1, Dec, Register, D),                               // 15 DEC D
    op!(2, Ld, RegisterD8, D),                              // 16 LD D,d8
    op!(1, Rla),                                            // 17 RLA
    op!(3, Jr, D8),                                         // 18 JR r8
    op!(2, Add, RegisterRegister, Hl, De),                  // 19 ADD HL,DE
    op!(2, Ld, RegisterMemory, A, De),                      // 1A LD A,(DE)
    op!(2, Dec, Register, De),                              // 1B DEC DE
    op!(1, Inc, Register, E),                               // 1C INC E
    op!(1, Dec, Register, E),                               // 1D DEC E
    op!(2, Ld, RegisterD8, E),                              // 1E LD E,d8
    op!(1, Rra),                                            // 1F RRA

    op!(2, Jr, D8, None, None, Nz),                         // 20 JR NZ,r8
    op!(3, Ld, RegisterD16, Hl),                            // 21 LD HL,d16
    op!(2, Ld, HliRegister, Hl, A),                         // 22 LD (HL+),A
    op!(2, Inc, Register, Hl),                              // 23 INC HL
    op!(1, Inc, Register, H),                               // 24 INC H
    op!(1, Dec, Register, H),                               // 25 DEC H
    op!(2, Ld, RegisterD8, H),                              // 26 LD H,d8
    op!(1, Daa),                                            // 27 DAA
    op!(2, Jr, D8, None, None, Z),                          // 28 JR Z,r8
    op!(2, Add, RegisterRegister, Hl, Hl),                  // 29 ADD HL,HL
    op!(2, Ld, RegisterHli, A, Hl),                         // 2A LD A,(HL+)
    op!(2, Dec, Register, Hl),                              // 2B DEC HL
    op!(1, Inc, Register, L),                               // 2C INC L
    op!(1, Dec, Register, L),                               // 2D DEC L
    op!(2, Ld, RegisterD8, L),                              // 2E LD L,d8
    op!(1, Cpl),                                            // 2F CPL

    op!(2, Jr, D8, None, None, Nc),                         // 30 JR NC,r8
    op!(3, Ld, RegisterD16, Sp),                            // 31 LD SP,d16
    op!(2, Ld, HldRegister, Hl, A),                         // 32 LD (HL-),A
    op!(2, Inc, Register, Sp),                              // 33 INC SP
    op!(3, Inc, MemoryRegisterOnly, Hl),                    // 34 INC (HL)
    op!(3, Dec, MemoryRegisterOnly, Hl),                    // 35 DEC (HL)
    op!(3, Ld, MemoryRegisterD8, Hl),                       // 36 LD (HL),d8
    op!(1, Scf),                                            // 37 SCF
    op!(2, Jr, D8, None, None, C),                          // 38 JR C,r8
    op!(2, Add, RegisterRegister, Hl, Sp),                  // 39 ADD HL,SP
    op!(2, Ld, RegisterHld, A, Hl),                         // 3A LD A,(HL-)
    op!(2, Dec, Register, Sp),                              // 3B DEC SP
    op!(1, Inc, Register, A),                               // 3C INC A
    op!(1, Dec, Register, A),                               // 3D DEC A
    op!(2, Ld, RegisterD8, A),                              // 3E LD A,d8
    op!(1, Ccf),                                            // 3F CCF

    op!(1, Ld, RegisterRegister, B, B),                     // 40 LD B,B
    op!(1, Ld, RegisterRegister, B, C),                     // 41 LD B,C
    op!(1, Ld, RegisterRegister, B, D),                     // 42 LD B,D
    op!(1, Ld, RegisterRegister, B, E),                     // 43 LD B,E
    op!(1, Ld, RegisterRegister, B, H),                     // 44 LD B,H
    op!(1, Ld, RegisterRegister, B, L),                     // 45 LD B,L
    op!(2, Ld, RegisterMemory, B, Hl),                      // 46 LD B,(HL)
    op!(1, Ld, RegisterRegister, B, A),                     // 47 LD B,A
    op!(1, Ld, RegisterRegister, C, B),                     // 48 LD C,B
    op!(1, Ld, RegisterRegister, C, C),                     // 49 LD C,C
    op!(1, Ld, RegisterRegister, C, D),                     // 4A LD C,D
    op!(1, Ld, RegisterRegister, C, E),                     // 4B LD C,E
    op!(1, Ld, RegisterRegister, C, H),                     // 4C LD C,H
    op!(1, Ld, RegisterRegister, C, L),                     // 4D LD C,L
    op!(2, Ld, RegisterMemory, C, Hl),                      // 4E LD C,(HL)
    op!(1, Ld, RegisterRegister, C, A),                     // 4F LD C,A

    op!(1, Ld, RegisterRegister, D, B),                     // 50 LD D,B
    op!(1, Ld, RegisterRegister, D, C),                     // 51 LD D,C
    op!(1, Ld, RegisterRegister, D, D),                     // 52 LD D,D
    op!(1, Ld, RegisterRegister, D, E),                     // 53 LD D,E
    op!(1, Ld, RegisterRegister, D, H),                     // 54 LD D,H
    op!(1, Ld, RegisterRegister, D, L),                     // 55 LD D,L
    op!(2, Ld, RegisterMemory, D, Hl),                      // 56 LD D,(HL)
    op!(1, Ld, RegisterRegister, D, A),                     // 57 LD D,A
    op!(1, Ld, RegisterRegister, E, B),                     // 58 LD E,B
    op!(1, Ld, RegisterRegister, E, C),                     // 59 LD E,C
    op!(1, Ld, RegisterRegister, E, D),                     // 5A LD E,D
    op!(1, Ld, RegisterRegister, E, E),                     // 5B LD E,E
    op!(1, Ld, RegisterRegister, E, H),                     // 5C LD E,H
    op!(1, Ld, RegisterRegister, E, L),                     // 5D LD E,L
    op!(2, Ld, RegisterMemory, E, Hl),                      // 5E LD E,(HL)
    op!(1, Ld, RegisterRegister, E, A),                     // 5F LD E,A

    op!(1, Ld, RegisterRegister, H, B),                     // 60 LD H,B
    op!(1, Ld, RegisterRegister, H, C),                     // 61 LD H,C
    op!(1, Ld, RegisterRegister, H, D),                     // 62 LD H,D
    op!(1, Ld, RegisterRegister, H, E),                     // 63 LD H,E
    op!(1, Ld, RegisterRegister, H, H),                     // 64 LD H,H
    op!(1, Ld, RegisterRegister, H, L),                     // 65 LD H,L
    op!(2, Ld, RegisterMemory, H, Hl),                      // 66 LD H,(HL)
    op!(1, Ld, RegisterRegister, H, A),                     // 67 LD H,A
    op!(1, Ld, RegisterRegister, L, B),                     // 68 LD L,B
    op!(1, Ld, RegisterRegister, L, C),                     // 69 LD L,C
    op!(1, Ld, RegisterRegister, L, D),                     // 6A LD L,D
    op!(1, Ld, RegisterRegister, L, E),                     // 6B LD L,E
    op!(1, Ld, RegisterRegister, L, H),                     // 6C LD L,H
    op!(1, Ld, RegisterRegister, L, L),                     // 6D LD L,L
    op!(2, Ld, RegisterMemory, L, Hl),                      // 6E LD L,(HL)
    op!(1, Ld, RegisterRegister, L, A),                     // 6F LD L,A

    op!(2, Ld, MemoryRegister, Hl, B),                      // 70 LD (HL),B
    op!(2, Ld, MemoryRegister, Hl, C),                      // 71 LD (HL),C
    op!(2, Ld, MemoryRegister, Hl, D),                      // 72 LD (HL),D
    op!(2, Ld, MemoryRegister, Hl, E),                      // 73 LD (HL),E
    op!(2, Ld, MemoryRegister, Hl, H),                      // 74 LD (HL),H
    op!(2, Ld, MemoryRegister, Hl, L),                      // 75 LD (HL),L
    op!(1, Halt),                                           // 76 HALT
    op!(2, Ld, MemoryRegister, Hl, A),                      // 77 LD (HL),A
    op!(1, Ld, RegisterRegister, A, B),                     // 78 LD A,B
    op!(1, Ld, RegisterRegister, A, C),                     // 79 LD A,C
    op!(1, Ld, RegisterRegister, A, D),                     // 7A LD A,D
    op!(1, Ld, RegisterRegister, A, E),                     // 7B LD A,E
    op!(1, Ld, RegisterRegister, A, H),                     // 7C LD A,H
    op!(1, Ld, RegisterRegister, A, L),                     // 7D LD A,L
    op!(2, Ld, RegisterMemory, A, Hl),                      // 7E LD A,(HL)
    op!(1, Ld, RegisterRegister, A, A),                     // 7F LD A,A

    op!(1, Add, RegisterRegister, A, B),                    // 80 ADD A,B
    op!(1, Add, RegisterRegister, A, C),                    // 81 ADD A,C
    op!(1, Add, RegisterRegister, A, D),                    // 82 ADD A,D
    op!(1, Add, RegisterRegister, A, E),                    // 83 ADD A,E
    op!(1, Add, RegisterRegister, A, H),                    // 84 ADD A,H
    op!(1, Add, RegisterRegister, A, L),                    // 85 ADD A,L
    op!(2, Add, RegisterMemory, A, Hl),                     // 86 ADD A,(HL)
    op!(1, Add, RegisterRegister, A, A),                    // 87 ADD A,A
    op!(1, Adc, RegisterRegister, A, B),                    // 88 ADC A,B
    op!(1, Adc, RegisterRegister, A, C),                    // 89 ADC A,C
    op!(1, Adc, RegisterRegister, A, D),                    // 8A ADC A,D
    op!(1, Adc, RegisterRegister, A, E),                    // 8B ADC A,E
    op!(1, Adc, RegisterRegister, A, H),                    // 8C ADC A,H
    op!(1, Adc, RegisterRegister, A, L),                    // 8D ADC A,L
    op!(2, Adc, RegisterMemory, A, Hl),                     // 8E ADC A,(HL)
    op!(1, Adc, RegisterRegister, A, A),                    // 8F ADC A,A

    op!(1, Sub, RegisterRegister, A, B),                    // 90 SUB A,B
    op!(1, Sub, RegisterRegister, A, C),                    // 91 SUB A,C
    op!(1, Sub, RegisterRegister, A, D),                    // 92 SUB A,D
    op!(1, Sub, RegisterRegister, A, E),                    // 93 SUB A,E
    op!(1, Sub, RegisterRegister, A, H),                    // 94 SUB A,H
    op!(1, Sub, RegisterRegister, A, L),                    // 95 SUB A,L
    op!(2, Sub, RegisterMemory, A, Hl),                     // 96 SUB A,(HL)
    op!(1, Sub, RegisterRegister, A, A),                    // 97 SUB A,A
    op!(1, Sbc, RegisterRegister, A, B),                    // 98 SBC A,B
    op!(1, Sbc, RegisterRegister, A, C),                    // 99 SBC A,C
    op!(1, Sbc, RegisterRegister, A, D),                    // 9A SBC A,D
    op!(1, Sbc, RegisterRegister, A, E),                    // 9B SBC A,E
    op!(1, Sbc, RegisterRegister, A, H),                    // 9C SBC A,H
    op!(1, Sbc, RegisterRegister, A, L),                    // 9D SBC A,L
    op!(2, Sbc, RegisterMemory, A, Hl),                     // 9E SBC A,(HL)
    op!(1, Sbc, RegisterRegister, A, A),                    // 9F SBC A,A

    op!(1, And, RegisterRegister, A, B),                    // A0 AND A,B
    op!(1, And, RegisterRegister, A, C),                    // A1 AND A,C
    op!(1, And, RegisterRegister, A, D),                    // A2 AND A,D
    op!(1, And, RegisterRegister, A, E),                    // A3 AND A,E
    op!(1, And, RegisterRegister, A, H),                    // A4 AND A,H
    op!(1, And, RegisterRegister, A, L),                    // A5 AND A,L
    op!(2, And, RegisterMemory, A, Hl),                     // A6 AND A,(HL)
    op!(1, And, RegisterRegister, A, A),                    // A7 AND A,A
    op!(1, Xor, RegisterRegister, A, B),                    // A8 XOR A,B
    op!(1, Xor, RegisterRegister, A, C),                    // A9 XOR A,C
    op!(1, Xor, RegisterRegister, A, D),                    // AA XOR A,D
    op!(1, Xor, RegisterRegister, A, E),                    // AB XOR A,E
    op!(1, Xor, RegisterRegister, A, H),                    // AC XOR A,H
    op!(1, Xor, RegisterRegister, A, L),                    // AD XOR A,L
    op!(2, Xor, RegisterMemory, A, Hl),                     // AE XOR A,(HL)
    op!(1, Xor, RegisterRegister, A, A),                    // AF XOR A,A

    op!(1, Or, RegisterRegister, A, B),                     // B0 OR A,B
    op!(1, Or, RegisterRegister, A, C),                     // B1 OR A,C
    op!(1, Or, RegisterRegister, A, D),                     // B2 OR A,D
    op!(1, Or, RegisterRegister, A, E),                     // B3 OR A,E
    op!(1, Or, RegisterRegister, A, H),                     // B4 OR A,H
    op!(1, Or, RegisterRegister, A, L),                     // B5 OR A,L
    op!(2, Or, RegisterMemory, A, Hl),                      // B6 OR A,(HL)
    op!(1, Or, RegisterRegister, A, A),                     // B7 OR A,A
    op!(1, Cp, RegisterRegister, A, B),                     // B8 CP A,B
    op!(1, Cp, RegisterRegister, A, C),                     // B9 CP A,C
    op!(1, Cp, RegisterRegister, A, D),                     // BA CP A,D
    op!(1, Cp, RegisterRegister, A, E),                     // BB CP A,E
    op!(1, Cp, RegisterRegister, A, H),                     // BC CP A,H
    op!(1, Cp, RegisterRegister, A, L),                     // BD CP A,L
    op!(2, Cp, RegisterMemory, A, Hl),                      // BE CP A,(HL)
    op!(1, Cp, RegisterRegister, A, A),                     // BF CP A,A

    op!(2, Ret, Implied, None, None, Nz),                   // C0 RET NZ
    op!(3, Pop, Register, Bc),                              // C1 POP BC
    op!(3, Jp, D16, None, None, Nz),                        // C2 JP NZ,a16
    op!(4, Jp, D16),                                        // C3 JP a16
    op!(3, Call, D16, None, None, Nz),                      // C4 CALL NZ,a16
    op!(4, Push, Register, Bc),                             // C5 PUSH BC
    op!(2, Add, RegisterD8, A),                             // C6 ADD A,d8
    op!(4, Rst, Implied, None, None, None, 0x00),           // C7 RST 00H
    op!(2, Ret, Implied, None, None, Z),                    // C8 RET Z
    op!(4, Ret),                                            // C9 RET
    op!(3, Jp, D16, None, None, Z),                         // CA JP Z,a16
    op!(0, Cb, D8),                                         // CB PREFIX CB
    op!(3, Call, D16, None, None, Z),                       // CC CALL Z,a16
    op!(6, Call, D16),                                      // CD CALL a16
    op!(2, Adc, RegisterD8, A),                             // CE ADC A,d8
    op!(4, Rst, Implied, None, None, None, 0x08),           // CF RST 08H

    op!(2, Ret, Implied, None, None, Nc),                   // D0 RET NC
    op!(3, Pop, Register, De),                              // D1 POP DE
    op!(3, Jp, D16, None, None, Nc),                        // D2 JP NC,a16
    op!(0, None),                                           // D3 illegal
    op!(3, Call, D16, None, None, Nc),                      // D4 CALL NC,a16
    op!(4, Push, Register, De),                             // D5 PUSH DE
    op!(2, Sub, RegisterD8, A),                             // D6 SUB A,d8
    op!(4, Rst, Implied, None, None, None, 0x10),           // D7 RST 10H
    op!(2, Ret, Implied, None, None, C),                    // D8 RET C
    op!(4, Reti),                                           // D9 RETI
    op!(3, Jp, D16, None, None, C),                         // DA JP C,a16
    op!(0, None),                                           // DB illegal
    op!(3, Call, D16, None, None, C),                       // DC CALL C,a16
    op!(0, None),                                           // DD illegal
    op!(2, Sbc, RegisterD8, A),                             // DE SBC A,d8
    op!(4, Rst, Implied, None, None, None, 0x18),           // DF RST 18H

    op!(3, Ldh, A8Register, None, A),                       // E0 LDH (a8),A
    op!(3, Pop, Register, Hl),                              // E1 POP HL
    op!(2, Ld, MemoryRegister, C, A),                       // E2 LD (C),A
    op!(0, None),                                           // E3 illegal
    op!(0, None),                                           // E4 illegal
    op!(4, Push, Register, Hl),                             // E5 PUSH HL
    op!(2, And, RegisterD8, A),                             // E6 AND A,d8
    op!(4, Rst, Implied, None, None, None, 0x20),           // E7 RST 20H
    op!(4, Add, RegisterD8, Sp),                            // E8 ADD SP,r8
    op!(1, Jp, Register, Hl),                               // E9 JP HL
    op!(4, Ld, A16Register, None, A),                       // EA LD (a16),A
    op!(0, None),                                           // EB illegal
    op!(0, None),                                           // EC illegal
    op!(0, None),                                           // ED illegal
    op!(2, Xor, RegisterD8, A),                             // EE XOR A,d8
    op!(4, Rst, Implied, None, None, None, 0x28),           // EF RST 28H

    op!(3, Ldh, RegisterA8, A),                             // F0 LDH A,(a8)
    op!(3, Pop, Register, Af),                              // F1 POP AF
    op!(2, Ld, RegisterMemory, A, C),                       // F2 LD A,(C)
    op!(1, Di),                                             // F3 DI
    op!(0, None),                                           // F4 illegal
    op!(4, Push, Register, Af),                             // F5 PUSH AF
    op!(2, Or, RegisterD8, A),                              // F6 OR A,d8
    op!(4, Rst, Implied, None, None, None, 0x30),           // F7 RST 30H
    op!(3, Ld, HlSpr, Hl, Sp),                              // F8 LD HL,SP+r8
    op!(2, Ld, RegisterRegister, Sp, Hl),                   // F9 LD SP,HL
    op!(4, Ld, RegisterA16, A),                             // FA LD A,(a16)
    op!(1, Ei),                                             // FB EI
    op!(0, None),                                           // FC illegal
    op!(0, None),                                           // FD illegal
    op!(2, Cp, RegisterD8, A),                              // FE CP A,d8
    op!(4, Rst, Implied, None, None, None, 0x38),           // FF RST 38H
];

pub fn instruction_by_opcode(opcode: Byte) -> &'static Instruction {
    &INSTRUCTIONS[opcode as usize]
}

/// Operand order of the low three bits of every 0xCB opcode.
const CB_TARGETS: [RegisterType; 8] = [
    RegisterType::B,
    RegisterType::C,
    RegisterType::D,
    RegisterType::E,
    RegisterType::H,
    RegisterType::L,
    RegisterType::Hl,
    RegisterType::A,
];

const CB_SHIFTS: [InstructionType; 8] = [
    InstructionType::Rlc,
    InstructionType::Rrc,
    InstructionType::Rl,
    InstructionType::Rr,
    InstructionType::Sla,
    InstructionType::Sra,
    InstructionType::Swap,
    InstructionType::Srl,
];

/// The 0xCB page is fully regular: bits 7-6 pick the group, bits 5-3 the
/// shift kind or bit index, bits 2-0 the operand. Costs include the prefix.
const fn cb_entry(opcode: u8) -> Instruction {
    let target = CB_TARGETS[(opcode & 0x07) as usize];
    let selector = (opcode >> 3) & 0x07;
    let (inst_type, param) = match opcode >> 6 {
        0 => (CB_SHIFTS[selector as usize], 0),
        1 => (InstructionType::Bit, selector),
        2 => (InstructionType::Res, selector),
        _ => (InstructionType::Set, selector),
    };
    let indirect = matches!(target, RegisterType::Hl);
    let cycles = match (indirect, opcode >> 6) {
        (false, _) => 2,
        (true, 1) => 3,
        (true, _) => 4,
    };

    Instruction {
        inst_type,
        mode: if indirect { AddressingMode::MemoryRegisterOnly } else { AddressingMode::Register },
        reg1: target,
        reg2: RegisterType::None,
        cond: ConditionType::None,
        param,
        cycles,
    }
}

const fn build_cb_table() -> [Instruction; 256] {
    let mut table = [Instruction::new(); 256];
    let mut i = 0;
    while i < 256 {
        table[i] = cb_entry(i as u8);
        i += 1;
    }
    table
}

/// 0xCB-prefixed opcodes. Every slot is defined.
pub static CB_INSTRUCTIONS: [Instruction; 256] = build_cb_table();

pub fn cb_instruction_by_opcode(opcode: Byte) -> &'static Instruction {
    &CB_INSTRUCTIONS[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_opcodes() {
        let undefined: Vec<u8> = (0..=255u8).filter(|&op| !instruction_by_opcode(op).is_defined()).collect();
        assert_eq!(undefined, vec![0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD]);
    }

    #[test]
    fn test_defined_opcodes_have_cost() {
        for op in 0..=255u8 {
            let inst = instruction_by_opcode(op);
            if inst.is_defined() && inst.inst_type != InstructionType::Cb {
                assert!(inst.cycles > 0, "opcode {op:#04x} has no cost");
            }
        }
    }

    #[test]
    fn test_well_known_entries() {
        let call = instruction_by_opcode(0xCD);
        assert_eq!(call.inst_type, InstructionType::Call);
        assert_eq!(call.cycles, 6);

        let ld_hl_sp = instruction_by_opcode(0xF8);
        assert_eq!(ld_hl_sp.mode, AddressingMode::HlSpr);

        let rst = instruction_by_opcode(0xEF);
        assert_eq!((rst.inst_type, rst.param), (InstructionType::Rst, 0x28));
    }

    #[test]
    fn test_cb_page_layout() {
        let rlc_b = cb_instruction_by_opcode(0x00);
        assert_eq!((rlc_b.inst_type, rlc_b.reg1, rlc_b.cycles), (InstructionType::Rlc, RegisterType::B, 2));

        let swap_hl = cb_instruction_by_opcode(0x36);
        assert_eq!(swap_hl.inst_type, InstructionType::Swap);
        assert_eq!(swap_hl.mode, AddressingMode::MemoryRegisterOnly);
        assert_eq!(swap_hl.cycles, 4);

        let bit7_hl = cb_instruction_by_opcode(0x7E);
        assert_eq!((bit7_hl.inst_type, bit7_hl.param, bit7_hl.cycles), (InstructionType::Bit, 7, 3));

        let set3_a = cb_instruction_by_opcode(0xDF);
        assert_eq!((set3_a.inst_type, set3_a.param, set3_a.reg1), (InstructionType::Set, 3, RegisterType::A));
    }
}
