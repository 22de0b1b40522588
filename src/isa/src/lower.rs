use {
    super::ins::{AluOp, BranchKind, Instruction, LoadWidth, Reg, StoreWidth},
    anyhow::{bail, ensure, Context, Result},
    asm::ast::{Ast, Item, Operand},
    std::collections::HashMap,
};

#[derive(Debug, Clone)]
pub struct Program {
    pub words: Vec<u32>,
}

impl Program {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_le_bytes()).collect()
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for word in &self.words {
            writeln!(f, "{word:08x}")?;
        }
        Ok(())
    }
}

pub(crate) fn lower(ast: &Ast) -> Result<Program> {
    let symbols = collect_symbols(ast);
    let mut words = Vec::new();
    for item in &ast.items {
        let Item::Instruction { mnemonic, operands } = item else {
            continue;
        };
        let pc = (words.len() * 4) as u32;
        let instruction = translate(mnemonic, operands, pc, &symbols)
            .with_context(|| format!("in `{mnemonic}` at address {pc:#x}"))?;
        words.push(instruction.encode());
    }
    Ok(Program { words })
}

// Every instruction, pseudo or not, lowers to exactly one word, so label
// addresses are known before translation.
fn collect_symbols<'src>(ast: &Ast<'src>) -> HashMap<&'src str, u32> {
    let mut symbols = HashMap::new();
    let mut pc = 0;
    for item in &ast.items {
        match item {
            Item::Label(name) => {
                symbols.insert(*name, pc);
            }
            Item::Instruction { .. } => pc += 4,
            Item::Directive { .. } => {}
        }
    }
    symbols
}

fn translate(
    mnemonic: &str,
    operands: &[Operand],
    pc: u32,
    symbols: &HashMap<&str, u32>,
) -> Result<Instruction> {
    let reg = |index| -> Result<Reg> {
        let Operand::Ident(name) = operand(operands, index)? else {
            bail!("expected a register as operand {index}");
        };
        Reg::from_name(name).with_context(|| format!("unknown register `{name}`"))
    };
    let int = |index| -> Result<i64> {
        let Operand::Int(int) = operand(operands, index)? else {
            bail!("expected an immediate as operand {index}");
        };
        Ok(int)
    };
    let imm12 = |index| -> Result<i32> {
        let int = int(index)?;
        ensure!(
            (-2048..=2047).contains(&int),
            "immediate {int} does not fit in 12 bits"
        );
        Ok(int as i32)
    };
    let imm20 = |index| -> Result<i32> {
        let int = int(index)?;
        ensure!(
            (0..0x10_0000).contains(&int),
            "upper immediate {int:#x} does not fit in 20 bits"
        );
        Ok((int << 12) as i32)
    };
    let shamt = |index| -> Result<i32> {
        let int = int(index)?;
        ensure!((0..32).contains(&int), "shift amount {int} out of range");
        Ok(int as i32)
    };
    // load/store address, `offset(base)` with the offset in the 12-bit range
    let mem = |index| -> Result<(i32, Reg)> {
        let Operand::Mem { offset, base } = operand(operands, index)? else {
            bail!("expected a memory operand like `8(sp)` as operand {index}");
        };
        ensure!(
            (-2048..=2047).contains(&offset),
            "memory offset {offset} does not fit in 12 bits"
        );
        let base = Reg::from_name(base).with_context(|| format!("unknown register `{base}`"))?;
        Ok((offset as i32, base))
    };
    // branch/jump target: a label or a literal byte offset
    let target = |index, range: i64| -> Result<i32> {
        let offset = match operand(operands, index)? {
            Operand::Ident(label) => {
                let address = symbols
                    .get(label)
                    .with_context(|| format!("undefined label `{label}`"))?;
                i64::from(*address) - i64::from(pc)
            }
            Operand::Int(offset) => offset,
            Operand::Mem { .. } => bail!("expected a jump target as operand {index}"),
        };
        ensure!(
            (-range..range).contains(&offset) && offset % 2 == 0,
            "jump offset {offset} out of range"
        );
        Ok(offset as i32)
    };
    let branch = |kind, rs1: Reg, rs2: Reg, index| -> Result<Instruction> {
        Ok(Instruction::Branch {
            kind,
            rs1,
            rs2,
            offset: target(index, 1 << 12)?,
        })
    };

    Ok(match mnemonic {
        "lui" => Instruction::Lui {
            rd: reg(0)?,
            imm: imm20(1)?,
        },
        "auipc" => Instruction::Auipc {
            rd: reg(0)?,
            imm: imm20(1)?,
        },
        "jal" => match operands.len() {
            1 => Instruction::Jal {
                rd: Reg::RA,
                offset: target(0, 1 << 20)?,
            },
            _ => Instruction::Jal {
                rd: reg(0)?,
                offset: target(1, 1 << 20)?,
            },
        },
        "j" => Instruction::Jal {
            rd: Reg::ZERO,
            offset: target(0, 1 << 20)?,
        },
        "jalr" => match operands.len() {
            1 => Instruction::Jalr {
                rd: Reg::RA,
                rs1: reg(0)?,
                offset: 0,
            },
            2 => {
                let (offset, rs1) = mem(1)?;
                Instruction::Jalr {
                    rd: reg(0)?,
                    rs1,
                    offset,
                }
            }
            _ => Instruction::Jalr {
                rd: reg(0)?,
                rs1: reg(1)?,
                offset: imm12(2)?,
            },
        },
        "jr" => Instruction::Jalr {
            rd: Reg::ZERO,
            rs1: reg(0)?,
            offset: 0,
        },
        "ret" => Instruction::Jalr {
            rd: Reg::ZERO,
            rs1: Reg::RA,
            offset: 0,
        },
        "beq" => branch(BranchKind::Eq, reg(0)?, reg(1)?, 2)?,
        "bne" => branch(BranchKind::Ne, reg(0)?, reg(1)?, 2)?,
        "blt" => branch(BranchKind::Lt, reg(0)?, reg(1)?, 2)?,
        "bge" => branch(BranchKind::Ge, reg(0)?, reg(1)?, 2)?,
        "bltu" => branch(BranchKind::Ltu, reg(0)?, reg(1)?, 2)?,
        "bgeu" => branch(BranchKind::Geu, reg(0)?, reg(1)?, 2)?,
        "beqz" => branch(BranchKind::Eq, reg(0)?, Reg::ZERO, 1)?,
        "bnez" => branch(BranchKind::Ne, reg(0)?, Reg::ZERO, 1)?,
        "lb" | "lh" | "lw" | "lbu" | "lhu" => {
            let width = match mnemonic {
                "lb" => LoadWidth::Byte,
                "lh" => LoadWidth::Half,
                "lw" => LoadWidth::Word,
                "lbu" => LoadWidth::ByteUnsigned,
                _ => LoadWidth::HalfUnsigned,
            };
            let (offset, rs1) = mem(1)?;
            Instruction::Load {
                width,
                rd: reg(0)?,
                rs1,
                offset,
            }
        }
        "sb" | "sh" | "sw" => {
            let width = match mnemonic {
                "sb" => StoreWidth::Byte,
                "sh" => StoreWidth::Half,
                _ => StoreWidth::Word,
            };
            let (offset, rs1) = mem(1)?;
            Instruction::Store {
                width,
                rs1,
                rs2: reg(0)?,
                offset,
            }
        }
        "addi" | "slti" | "sltiu" | "xori" | "ori" | "andi" => {
            let op = match mnemonic {
                "addi" => AluOp::Add,
                "slti" => AluOp::Slt,
                "sltiu" => AluOp::Sltu,
                "xori" => AluOp::Xor,
                "ori" => AluOp::Or,
                _ => AluOp::And,
            };
            Instruction::OpImm {
                op,
                rd: reg(0)?,
                rs1: reg(1)?,
                imm: imm12(2)?,
            }
        }
        "slli" | "srli" | "srai" => {
            let op = match mnemonic {
                "slli" => AluOp::Sll,
                "srli" => AluOp::Srl,
                _ => AluOp::Sra,
            };
            Instruction::OpImm {
                op,
                rd: reg(0)?,
                rs1: reg(1)?,
                imm: shamt(2)?,
            }
        }
        "add" | "sub" | "sll" | "slt" | "sltu" | "xor" | "srl" | "sra" | "or" | "and" => {
            let op = match mnemonic {
                "add" => AluOp::Add,
                "sub" => AluOp::Sub,
                "sll" => AluOp::Sll,
                "slt" => AluOp::Slt,
                "sltu" => AluOp::Sltu,
                "xor" => AluOp::Xor,
                "srl" => AluOp::Srl,
                "sra" => AluOp::Sra,
                "or" => AluOp::Or,
                _ => AluOp::And,
            };
            Instruction::Op {
                op,
                rd: reg(0)?,
                rs1: reg(1)?,
                rs2: reg(2)?,
            }
        }
        "li" => Instruction::OpImm {
            op: AluOp::Add,
            rd: reg(0)?,
            rs1: Reg::ZERO,
            imm: imm12(1).context("`li` takes a 12-bit value; use lui/addi for larger ones")?,
        },
        "mv" => Instruction::OpImm {
            op: AluOp::Add,
            rd: reg(0)?,
            rs1: reg(1)?,
            imm: 0,
        },
        "nop" => Instruction::OpImm {
            op: AluOp::Add,
            rd: Reg::ZERO,
            rs1: Reg::ZERO,
            imm: 0,
        },
        "ecall" => Instruction::Ecall,
        "ebreak" => Instruction::Ebreak,
        "fence" => Instruction::Fence,
        _ => bail!("unsupported mnemonic `{mnemonic}`"),
    })
}

fn operand<'src>(operands: &[Operand<'src>], index: usize) -> Result<Operand<'src>> {
    operands
        .get(index)
        .copied()
        .with_context(|| format!("missing operand {index}"))
}
