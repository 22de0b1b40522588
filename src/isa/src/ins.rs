pub const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(u8);

impl Reg {
    pub const ZERO: Reg = Reg(0);
    pub const RA: Reg = Reg(1);
    pub const SP: Reg = Reg(2);
    pub const GP: Reg = Reg(3);
    pub const A0: Reg = Reg(10);
    pub const A1: Reg = Reg(11);
    pub const A2: Reg = Reg(12);
    pub const A7: Reg = Reg(17);

    pub fn new(number: u8) -> Option<Reg> {
        (number < 32).then_some(Reg(number))
    }

    /// Accepts ABI names, `x0`-`x31`, and the `fp` alias for `s0`.
    pub fn from_name(name: &str) -> Option<Reg> {
        if let Some(number) = ABI_NAMES.iter().position(|&abi| abi == name) {
            return Some(Reg(number as u8));
        }
        match name {
            "fp" => Some(Reg(8)),
            _ => name.strip_prefix('x')?.parse().ok().and_then(Reg::new),
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        ABI_NAMES[usize::from(self.0)]
    }
}

impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub mod opcode {
    pub const LUI: u32 = 0b0110111;
    pub const AUIPC: u32 = 0b0010111;
    pub const JAL: u32 = 0b1101111;
    pub const JALR: u32 = 0b1100111;
    pub const BRANCH: u32 = 0b1100011;
    pub const LOAD: u32 = 0b0000011;
    pub const STORE: u32 = 0b0100011;
    pub const OP: u32 = 0b0110011;
    pub const OP_IMM: u32 = 0b0010011;
    pub const FENCE: u32 = 0b0001111;
    pub const SYSTEM: u32 = 0b1110011;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Eq,
    Ne,
    Lt,
    Ge,
    Ltu,
    Geu,
}

impl BranchKind {
    fn funct3(self) -> u32 {
        match self {
            BranchKind::Eq => 0b000,
            BranchKind::Ne => 0b001,
            BranchKind::Lt => 0b100,
            BranchKind::Ge => 0b101,
            BranchKind::Ltu => 0b110,
            BranchKind::Geu => 0b111,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadWidth {
    Byte,
    Half,
    Word,
    ByteUnsigned,
    HalfUnsigned,
}

impl LoadWidth {
    fn funct3(self) -> u32 {
        match self {
            LoadWidth::Byte => 0b000,
            LoadWidth::Half => 0b001,
            LoadWidth::Word => 0b010,
            LoadWidth::ByteUnsigned => 0b100,
            LoadWidth::HalfUnsigned => 0b101,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreWidth {
    Byte,
    Half,
    Word,
}

impl StoreWidth {
    fn funct3(self) -> u32 {
        match self {
            StoreWidth::Byte => 0b000,
            StoreWidth::Half => 0b001,
            StoreWidth::Word => 0b010,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
}

impl AluOp {
    fn funct3(self) -> u32 {
        match self {
            AluOp::Add | AluOp::Sub => 0b000,
            AluOp::Sll => 0b001,
            AluOp::Slt => 0b010,
            AluOp::Sltu => 0b011,
            AluOp::Xor => 0b100,
            AluOp::Srl | AluOp::Sra => 0b101,
            AluOp::Or => 0b110,
            AluOp::And => 0b111,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrOp {
    ReadWrite,
    ReadSet,
    ReadClear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `imm` carries the upper 20 bits pre-shifted into place.
    Lui { rd: Reg, imm: i32 },
    Auipc { rd: Reg, imm: i32 },
    Jal { rd: Reg, offset: i32 },
    Jalr { rd: Reg, rs1: Reg, offset: i32 },
    Branch {
        kind: BranchKind,
        rs1: Reg,
        rs2: Reg,
        offset: i32,
    },
    Load {
        width: LoadWidth,
        rd: Reg,
        rs1: Reg,
        offset: i32,
    },
    Store {
        width: StoreWidth,
        rs1: Reg,
        rs2: Reg,
        offset: i32,
    },
    OpImm { op: AluOp, rd: Reg, rs1: Reg, imm: i32 },
    Op { op: AluOp, rd: Reg, rs1: Reg, rs2: Reg },
    Fence,
    Ecall,
    Ebreak,
    Csr {
        op: CsrOp,
        immediate: bool,
        rd: Reg,
        rs1: Reg,
        csr: u32,
    },
}

fn bits(word: u32, hi: u32, lo: u32) -> u32 {
    (word >> lo) & ((1 << (hi - lo + 1)) - 1)
}

fn sext(value: u32, width: u32) -> i32 {
    ((value << (32 - width)) as i32) >> (32 - width)
}

fn imm_i(word: u32) -> i32 {
    sext(bits(word, 31, 20), 12)
}

fn imm_s(word: u32) -> i32 {
    sext(bits(word, 31, 25) << 5 | bits(word, 11, 7), 12)
}

fn imm_b(word: u32) -> i32 {
    sext(
        bits(word, 31, 31) << 12
            | bits(word, 7, 7) << 11
            | bits(word, 30, 25) << 5
            | bits(word, 11, 8) << 1,
        13,
    )
}

fn imm_u(word: u32) -> i32 {
    (word & 0xffff_f000) as i32
}

fn imm_j(word: u32) -> i32 {
    sext(
        bits(word, 31, 31) << 20
            | bits(word, 19, 12) << 12
            | bits(word, 20, 20) << 11
            | bits(word, 30, 21) << 1,
        21,
    )
}

fn r(reg: Reg) -> u32 {
    u32::from(reg.number())
}

fn enc_u(opcode: u32, rd: Reg, imm: i32) -> u32 {
    imm as u32 & 0xffff_f000 | r(rd) << 7 | opcode
}

fn enc_i(opcode: u32, funct3: u32, rd: Reg, rs1: Reg, imm: i32) -> u32 {
    (imm as u32 & 0xfff) << 20 | r(rs1) << 15 | funct3 << 12 | r(rd) << 7 | opcode
}

fn enc_s(funct3: u32, rs1: Reg, rs2: Reg, offset: i32) -> u32 {
    let imm = offset as u32;
    bits(imm, 11, 5) << 25
        | r(rs2) << 20
        | r(rs1) << 15
        | funct3 << 12
        | bits(imm, 4, 0) << 7
        | opcode::STORE
}

fn enc_b(funct3: u32, rs1: Reg, rs2: Reg, offset: i32) -> u32 {
    let imm = offset as u32;
    bits(imm, 12, 12) << 31
        | bits(imm, 10, 5) << 25
        | r(rs2) << 20
        | r(rs1) << 15
        | funct3 << 12
        | bits(imm, 4, 1) << 8
        | bits(imm, 11, 11) << 7
        | opcode::BRANCH
}

fn enc_j(opcode: u32, rd: Reg, offset: i32) -> u32 {
    let imm = offset as u32;
    bits(imm, 20, 20) << 31
        | bits(imm, 10, 1) << 21
        | bits(imm, 11, 11) << 20
        | bits(imm, 19, 12) << 12
        | r(rd) << 7
        | opcode
}

impl Instruction {
    pub fn encode(&self) -> u32 {
        match *self {
            Instruction::Lui { rd, imm } => enc_u(opcode::LUI, rd, imm),
            Instruction::Auipc { rd, imm } => enc_u(opcode::AUIPC, rd, imm),
            Instruction::Jal { rd, offset } => enc_j(opcode::JAL, rd, offset),
            Instruction::Jalr { rd, rs1, offset } => enc_i(opcode::JALR, 0b000, rd, rs1, offset),
            Instruction::Branch {
                kind,
                rs1,
                rs2,
                offset,
            } => enc_b(kind.funct3(), rs1, rs2, offset),
            Instruction::Load {
                width,
                rd,
                rs1,
                offset,
            } => enc_i(opcode::LOAD, width.funct3(), rd, rs1, offset),
            Instruction::Store {
                width,
                rs1,
                rs2,
                offset,
            } => enc_s(width.funct3(), rs1, rs2, offset),
            Instruction::OpImm { op, rd, rs1, imm } => {
                let imm = match op {
                    AluOp::Sll | AluOp::Srl => imm & 0x1f,
                    AluOp::Sra => 0b0100000 << 5 | imm & 0x1f,
                    _ => imm,
                };
                enc_i(opcode::OP_IMM, op.funct3(), rd, rs1, imm)
            }
            Instruction::Op { op, rd, rs1, rs2 } => {
                let funct7 = match op {
                    AluOp::Sub | AluOp::Sra => 0b0100000,
                    _ => 0,
                };
                funct7 << 25
                    | r(rs2) << 20
                    | r(rs1) << 15
                    | op.funct3() << 12
                    | r(rd) << 7
                    | opcode::OP
            }
            Instruction::Fence => opcode::FENCE,
            Instruction::Ecall => opcode::SYSTEM,
            Instruction::Ebreak => 1 << 20 | opcode::SYSTEM,
            Instruction::Csr {
                op,
                immediate,
                rd,
                rs1,
                csr,
            } => {
                let funct3 = match op {
                    CsrOp::ReadWrite => 0b001,
                    CsrOp::ReadSet => 0b010,
                    CsrOp::ReadClear => 0b011,
                } | if immediate { 0b100 } else { 0 };
                csr << 20 | r(rs1) << 15 | funct3 << 12 | r(rd) << 7 | opcode::SYSTEM
            }
        }
    }

    pub fn decode(word: u32) -> Option<Self> {
        let rd = Reg(bits(word, 11, 7) as u8);
        let rs1 = Reg(bits(word, 19, 15) as u8);
        let rs2 = Reg(bits(word, 24, 20) as u8);
        let funct3 = bits(word, 14, 12);
        let funct7 = bits(word, 31, 25);
        Some(match bits(word, 6, 0) {
            opcode::LUI => Instruction::Lui {
                rd,
                imm: imm_u(word),
            },
            opcode::AUIPC => Instruction::Auipc {
                rd,
                imm: imm_u(word),
            },
            opcode::JAL => Instruction::Jal {
                rd,
                offset: imm_j(word),
            },
            opcode::JALR if funct3 == 0b000 => Instruction::Jalr {
                rd,
                rs1,
                offset: imm_i(word),
            },
            opcode::BRANCH => Instruction::Branch {
                kind: match funct3 {
                    0b000 => BranchKind::Eq,
                    0b001 => BranchKind::Ne,
                    0b100 => BranchKind::Lt,
                    0b101 => BranchKind::Ge,
                    0b110 => BranchKind::Ltu,
                    0b111 => BranchKind::Geu,
                    _ => return None,
                },
                rs1,
                rs2,
                offset: imm_b(word),
            },
            opcode::LOAD => Instruction::Load {
                width: match funct3 {
                    0b000 => LoadWidth::Byte,
                    0b001 => LoadWidth::Half,
                    0b010 => LoadWidth::Word,
                    0b100 => LoadWidth::ByteUnsigned,
                    0b101 => LoadWidth::HalfUnsigned,
                    _ => return None,
                },
                rd,
                rs1,
                offset: imm_i(word),
            },
            opcode::STORE => Instruction::Store {
                width: match funct3 {
                    0b000 => StoreWidth::Byte,
                    0b001 => StoreWidth::Half,
                    0b010 => StoreWidth::Word,
                    _ => return None,
                },
                rs1,
                rs2,
                offset: imm_s(word),
            },
            opcode::OP_IMM => {
                let op = match funct3 {
                    0b000 => AluOp::Add,
                    0b001 if funct7 == 0 => AluOp::Sll,
                    0b010 => AluOp::Slt,
                    0b011 => AluOp::Sltu,
                    0b100 => AluOp::Xor,
                    0b101 if funct7 == 0 => AluOp::Srl,
                    0b101 if funct7 == 0b0100000 => AluOp::Sra,
                    0b110 => AluOp::Or,
                    0b111 => AluOp::And,
                    _ => return None,
                };
                let imm = match op {
                    AluOp::Sll | AluOp::Srl | AluOp::Sra => bits(word, 24, 20) as i32,
                    _ => imm_i(word),
                };
                Instruction::OpImm { op, rd, rs1, imm }
            }
            opcode::OP => Instruction::Op {
                op: match (funct3, funct7) {
                    (0b000, 0) => AluOp::Add,
                    (0b000, 0b0100000) => AluOp::Sub,
                    (0b001, 0) => AluOp::Sll,
                    (0b010, 0) => AluOp::Slt,
                    (0b011, 0) => AluOp::Sltu,
                    (0b100, 0) => AluOp::Xor,
                    (0b101, 0) => AluOp::Srl,
                    (0b101, 0b0100000) => AluOp::Sra,
                    (0b110, 0) => AluOp::Or,
                    (0b111, 0) => AluOp::And,
                    _ => return None,
                },
                rd,
                rs1,
                rs2,
            },
            opcode::FENCE => Instruction::Fence,
            opcode::SYSTEM => match funct3 {
                0b000 => match bits(word, 31, 20) {
                    0 => Instruction::Ecall,
                    1 => Instruction::Ebreak,
                    _ => return None,
                },
                _ => Instruction::Csr {
                    op: match funct3 & 0b011 {
                        0b01 => CsrOp::ReadWrite,
                        0b10 => CsrOp::ReadSet,
                        0b11 => CsrOp::ReadClear,
                        _ => return None,
                    },
                    immediate: funct3 & 0b100 != 0,
                    rd,
                    rs1,
                    csr: bits(word, 31, 20),
                },
            },
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_names() {
        assert_eq!(Reg::from_name("a0"), Some(Reg::A0));
        assert_eq!(Reg::from_name("x10"), Some(Reg::A0));
        assert_eq!(Reg::from_name("fp"), Reg::from_name("s0"));
        assert_eq!(Reg::from_name("x31").map(Reg::name), Some("t6"));
        assert_eq!(Reg::from_name("x32"), None);
        assert_eq!(Reg::from_name("pc"), None);
    }

    #[test]
    fn encodes_i_type() {
        // li a0, 30
        let li = Instruction::OpImm {
            op: AluOp::Add,
            rd: Reg::A0,
            rs1: Reg::ZERO,
            imm: 30,
        };
        assert_eq!(li.encode(), 0x01e0_0513);
        // lw a0, 12(sp)
        let lw = Instruction::Load {
            width: LoadWidth::Word,
            rd: Reg::A0,
            rs1: Reg::SP,
            offset: 12,
        };
        assert_eq!(lw.encode(), 0x00c1_2503);
    }

    #[test]
    fn encodes_r_type() {
        let add = Instruction::Op {
            op: AluOp::Add,
            rd: Reg::new(7).unwrap(),
            rs1: Reg::new(5).unwrap(),
            rs2: Reg::new(6).unwrap(),
        };
        assert_eq!(add.encode(), 0x0062_83b3);
        let sub = Instruction::Op {
            op: AluOp::Sub,
            rd: Reg::new(28).unwrap(),
            rs1: Reg::new(28).unwrap(),
            rs2: Reg::new(5).unwrap(),
        };
        assert_eq!(sub.encode(), 0x405e_0e33);
    }

    #[test]
    fn encodes_s_type() {
        let sw = Instruction::Store {
            width: StoreWidth::Word,
            rs1: Reg::SP,
            rs2: Reg::A0,
            offset: 12,
        };
        assert_eq!(sw.encode(), 0x00a1_2623);
    }

    #[test]
    fn shift_immediates_carry_funct7() {
        let srai = Instruction::OpImm {
            op: AluOp::Sra,
            rd: Reg::A0,
            rs1: Reg::A0,
            imm: 3,
        };
        assert_eq!(srai.encode(), 0x4035_5513);
        assert_eq!(Instruction::decode(0x4035_5513), Some(srai));
    }

    #[test]
    fn branch_and_jump_offsets() {
        // beq x0, x0, +8
        let beq = Instruction::Branch {
            kind: BranchKind::Eq,
            rs1: Reg::ZERO,
            rs2: Reg::ZERO,
            offset: 8,
        };
        assert_eq!(beq.encode(), 0x0000_0463);
        // jal x0, -8
        let jal = Instruction::Jal {
            rd: Reg::ZERO,
            offset: -8,
        };
        assert_eq!(jal.encode(), 0xff9f_f06f);
        assert_eq!(Instruction::decode(0xff9f_f06f), Some(jal));
        // a negative branch offset survives the bit scatter
        let bne = Instruction::Branch {
            kind: BranchKind::Ne,
            rs1: Reg::A0,
            rs2: Reg::A1,
            offset: -20,
        };
        assert_eq!(Instruction::decode(bne.encode()), Some(bne));
    }

    #[test]
    fn upper_immediates() {
        let lui = Instruction::Lui {
            rd: Reg::RA,
            imm: 0x8000_0000_u32 as i32,
        };
        assert_eq!(lui.encode(), 0x8000_00b7);
        assert_eq!(Instruction::decode(0x8000_00b7), Some(lui));
    }

    #[test]
    fn system_words() {
        assert_eq!(Instruction::Ecall.encode(), 0x0000_0073);
        assert_eq!(Instruction::decode(0x0000_0073), Some(Instruction::Ecall));
        assert_eq!(Instruction::decode(0x0010_0073), Some(Instruction::Ebreak));
    }

    #[test]
    fn rejects_junk_words() {
        assert_eq!(Instruction::decode(0x0000_0000), None);
        assert_eq!(Instruction::decode(0xffff_ffff), None);
        // BRANCH with the reserved funct3 0b010
        assert_eq!(Instruction::decode(0x0000_2063), None);
    }
}
