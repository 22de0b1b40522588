use {
    crate::{mem::Memory, trap::Trap},
    isa::{ins::ABI_NAMES, AluOp, BranchKind, CsrOp, Instruction, LoadWidth, Reg, StoreWidth},
    std::io::Write,
};

const SYS_WRITE: u32 = 64;
const SYS_EXIT: u32 = 93;

// riscv-tests halt convention
const CSR_HALT: u32 = 3072;

#[derive(Debug, Clone)]
pub struct Registers {
    x: [u32; 32],
}

impl Registers {
    fn new() -> Self {
        Self { x: [0; 32] }
    }

    pub fn get(&self, reg: Reg) -> u32 {
        self.x[usize::from(reg.number())]
    }

    /// Writes to x0 are dropped.
    pub fn set(&mut self, reg: Reg, value: u32) {
        if reg != Reg::ZERO {
            self.x[usize::from(reg.number())] = value;
        }
    }
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, value) in self.x.iter().enumerate() {
            if i % 5 == 0 && i != 0 {
                writeln!(f)?;
            }
            write!(f, "{:>4} : {value:08x} ", ABI_NAMES[i])?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Exited(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct Exit {
    pub code: u32,
    pub instructions: u64,
}

pub struct Cpu {
    pub regs: Registers,
    pub pc: u32,
    pub mem: Memory,
}

impl Cpu {
    pub fn new(mem: Memory, pc: u32) -> Self {
        Self {
            regs: Registers::new(),
            pc,
            mem,
        }
    }

    /// Fetch, decode, and execute until the guest exits.
    pub fn run(&mut self, stdout: &mut impl Write) -> Result<Exit, Trap> {
        let mut instructions = 0;
        loop {
            instructions += 1;
            if let Status::Exited(code) = self.step(stdout)? {
                return Ok(Exit { code, instructions });
            }
        }
    }

    pub fn step(&mut self, stdout: &mut impl Write) -> Result<Status, Trap> {
        let word = self.mem.read_u32(self.pc)?;
        let instruction = Instruction::decode(word).ok_or(Trap::IllegalInstruction {
            word,
            pc: self.pc,
        })?;
        let mut next_pc = self.pc.wrapping_add(4);
        match instruction {
            Instruction::Lui { rd, imm } => self.regs.set(rd, imm as u32),
            Instruction::Auipc { rd, imm } => {
                self.regs.set(rd, self.pc.wrapping_add(imm as u32));
            }
            Instruction::Jal { rd, offset } => {
                self.regs.set(rd, next_pc);
                next_pc = self.pc.wrapping_add(offset as u32);
            }
            Instruction::Jalr { rd, rs1, offset } => {
                let target = self.regs.get(rs1).wrapping_add(offset as u32) & !1;
                self.regs.set(rd, next_pc);
                next_pc = target;
            }
            Instruction::Branch {
                kind,
                rs1,
                rs2,
                offset,
            } => {
                let (a, b) = (self.regs.get(rs1), self.regs.get(rs2));
                let taken = match kind {
                    BranchKind::Eq => a == b,
                    BranchKind::Ne => a != b,
                    BranchKind::Lt => (a as i32) < (b as i32),
                    BranchKind::Ge => (a as i32) >= (b as i32),
                    BranchKind::Ltu => a < b,
                    BranchKind::Geu => a >= b,
                };
                if taken {
                    next_pc = self.pc.wrapping_add(offset as u32);
                }
            }
            Instruction::Load {
                width,
                rd,
                rs1,
                offset,
            } => {
                let addr = self.regs.get(rs1).wrapping_add(offset as u32);
                let value = match width {
                    LoadWidth::Byte => self.mem.read_u8(addr)? as i8 as u32,
                    LoadWidth::ByteUnsigned => self.mem.read_u8(addr)?.into(),
                    LoadWidth::Half => self.mem.read_u16(addr)? as i16 as u32,
                    LoadWidth::HalfUnsigned => self.mem.read_u16(addr)?.into(),
                    LoadWidth::Word => self.mem.read_u32(addr)?,
                };
                self.regs.set(rd, value);
            }
            Instruction::Store {
                width,
                rs1,
                rs2,
                offset,
            } => {
                let addr = self.regs.get(rs1).wrapping_add(offset as u32);
                let value = self.regs.get(rs2);
                match width {
                    StoreWidth::Byte => self.mem.write_u8(addr, value as u8)?,
                    StoreWidth::Half => self.mem.write_u16(addr, value as u16)?,
                    StoreWidth::Word => self.mem.write_u32(addr, value)?,
                }
            }
            Instruction::OpImm { op, rd, rs1, imm } => {
                let value = alu(op, self.regs.get(rs1), imm as u32);
                self.regs.set(rd, value);
            }
            Instruction::Op { op, rd, rs1, rs2 } => {
                let value = alu(op, self.regs.get(rs1), self.regs.get(rs2));
                self.regs.set(rd, value);
            }
            Instruction::Fence => {}
            Instruction::Ecall => match self.ecall(stdout)? {
                Status::Running => {}
                exited => return Ok(exited),
            },
            Instruction::Ebreak => return Err(Trap::Breakpoint { pc: self.pc }),
            Instruction::Csr { op, rd, rs1, csr, .. } => match op {
                CsrOp::ReadWrite => {
                    if csr == CSR_HALT {
                        return Ok(Status::Exited(0));
                    }
                }
                CsrOp::ReadSet => self.regs.set(rd, csr),
                CsrOp::ReadClear => {
                    let cleared = csr & !self.regs.get(rs1);
                    self.regs.set(rd, cleared);
                }
            },
        }
        self.pc = next_pc;
        Ok(Status::Running)
    }

    fn ecall(&mut self, stdout: &mut impl Write) -> Result<Status, Trap> {
        match self.regs.get(Reg::A7) {
            SYS_EXIT => Ok(Status::Exited(self.regs.get(Reg::A0))),
            SYS_WRITE => {
                let addr = self.regs.get(Reg::A1);
                let len = self.regs.get(Reg::A2);
                stdout.write_all(self.mem.slice(addr, len as usize)?)?;
                stdout.flush()?;
                self.regs.set(Reg::A0, len);
                Ok(Status::Running)
            }
            number => match self.regs.get(Reg::GP) {
                // riscv-tests report pass/fail through gp
                1 => Ok(Status::Exited(0)),
                case if case > 1 => Err(Trap::TestFailure { case }),
                _ => Err(Trap::UnsupportedEcall { number }),
            },
        }
    }
}

fn alu(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Sll => a << (b & 0x1f),
        AluOp::Slt => u32::from((a as i32) < (b as i32)),
        AluOp::Sltu => u32::from(a < b),
        AluOp::Xor => a ^ b,
        AluOp::Srl => a >> (b & 0x1f),
        AluOp::Sra => ((a as i32) >> (b & 0x1f)) as u32,
        AluOp::Or => a | b,
        AluOp::And => a & b,
    }
}
