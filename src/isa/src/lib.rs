pub mod ins;
mod lower;

use asm::ast::Ast;

pub use {
    ins::{AluOp, BranchKind, CsrOp, Instruction, LoadWidth, Reg, StoreWidth},
    lower::Program,
};

impl TryFrom<&Ast<'_>> for Program {
    type Error = anyhow::Error;

    fn try_from(ast: &Ast<'_>) -> Result<Self, Self::Error> {
        lower::lower(ast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(src: &str) -> anyhow::Result<Program> {
        Program::try_from(&Ast::try_from(src)?)
    }

    #[test]
    fn lowers_the_original_listing() {
        // the instruction mix the original assembler was written against
        let program = assemble(
            "\
main:
    addi    sp, sp, -16
    li      a0, 30
    sw      a0, 12(sp)
    lw      a1, 12(sp)
    add     a2, a0, a1
    sub     a2, a2, a1
    jr      ra
",
        )
        .unwrap();
        assert_eq!(
            program.words,
            vec![
                0xff01_0113, // addi sp, sp, -16
                0x01e0_0513, // li a0, 30
                0x00a1_2623, // sw a0, 12(sp)
                0x00c1_2583, // lw a1, 12(sp)
                0x00b5_0633, // add a2, a0, a1
                0x40b6_0633, // sub a2, a2, a1
                0x0000_8067, // jr ra
            ],
        );
    }

    #[test]
    fn resolves_labels_both_directions() {
        let program = assemble(
            "\
top:
    bnez    a0, out
    j       top
out:
    ret
",
        )
        .unwrap();
        let decoded: Vec<_> = program
            .words
            .iter()
            .map(|&word| Instruction::decode(word).unwrap())
            .collect();
        assert_eq!(
            decoded[0],
            Instruction::Branch {
                kind: BranchKind::Ne,
                rs1: Reg::A0,
                rs2: Reg::ZERO,
                offset: 8,
            },
        );
        assert_eq!(
            decoded[1],
            Instruction::Jal {
                rd: Reg::ZERO,
                offset: -4,
            },
        );
    }

    #[test]
    fn directives_take_no_space() {
        let program = assemble(".globl main\nmain:\n    ret\n").unwrap();
        assert_eq!(program.words.len(), 1);
    }

    #[test]
    fn rejects_bad_programs() {
        assert!(assemble("frob a0, a1").is_err());
        assert!(assemble("addi a0, q7, 1").is_err());
        assert!(assemble("li a0, 4096").is_err());
        assert!(assemble("j nowhere").is_err());
    }

    #[test]
    fn hex_listing_matches_words() {
        let program = assemble("li a0, 30\necall\n").unwrap();
        assert_eq!(program.to_string(), "01e00513\n00000073\n");
        assert_eq!(
            program.to_bytes(),
            vec![0x13, 0x05, 0xe0, 0x01, 0x73, 0x00, 0x00, 0x00],
        );
    }
}
