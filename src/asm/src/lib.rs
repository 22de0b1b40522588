pub mod ast;
mod lexer;
mod parser;

impl<'src> TryFrom<&'src str> for ast::Ast<'src> {
    type Error = anyhow::Error;

    fn try_from(src: &'src str) -> Result<Self, Self::Error> {
        use chumsky::Parser;

        let tokens = match lexer::lexer().parse(src).into_result() {
            Ok(tokens) => tokens,
            Err(errs) => anyhow::bail!(errs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")),
        };

        let ast = match parser::ast_parser().parse(&tokens).into_result() {
            Ok(ast) => ast,
            Err(errs) => anyhow::bail!(errs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")),
        };

        Ok(ast)
    }
}

#[cfg(test)]
mod tests {
    use super::ast::{Ast, Item, Operand};

    #[test]
    fn labels_directives_and_instructions() {
        let src = "\
.globl main
main:
    li      a0, 30          # the number under test
    sw      a0, -4(sp)
loop:   ecall
";
        let ast = Ast::try_from(src).unwrap();
        assert_eq!(
            ast.items,
            vec![
                Item::Directive {
                    name: "globl",
                    args: vec![Operand::Ident("main")],
                },
                Item::Label("main"),
                Item::Instruction {
                    mnemonic: "li",
                    operands: vec![Operand::Ident("a0"), Operand::Int(30)],
                },
                Item::Instruction {
                    mnemonic: "sw",
                    operands: vec![
                        Operand::Ident("a0"),
                        Operand::Mem {
                            offset: -4,
                            base: "sp",
                        },
                    ],
                },
                Item::Label("loop"),
                Item::Instruction {
                    mnemonic: "ecall",
                    operands: vec![],
                },
            ],
        );
    }

    #[test]
    fn hex_and_bare_mem_operands() {
        let ast = Ast::try_from("lw t0, 0x10(a1)\njalr ra, (t2)").unwrap();
        assert_eq!(
            ast.items,
            vec![
                Item::Instruction {
                    mnemonic: "lw",
                    operands: vec![
                        Operand::Ident("t0"),
                        Operand::Mem {
                            offset: 0x10,
                            base: "a1",
                        },
                    ],
                },
                Item::Instruction {
                    mnemonic: "jalr",
                    operands: vec![
                        Operand::Ident("ra"),
                        Operand::Mem {
                            offset: 0,
                            base: "t2",
                        },
                    ],
                },
            ],
        );
    }

    #[test]
    fn comments_and_blank_lines_vanish() {
        let ast = Ast::try_from("# nothing here\n\n   \n\tnop # trailing\n").unwrap();
        assert_eq!(
            ast.items,
            vec![Item::Instruction {
                mnemonic: "nop",
                operands: vec![],
            }],
        );
    }

    #[test]
    fn negative_hex_literals() {
        let ast = Ast::try_from("lw t0, -0x10(a1)\nli t1, -0xff").unwrap();
        assert_eq!(
            ast.items,
            vec![
                Item::Instruction {
                    mnemonic: "lw",
                    operands: vec![
                        Operand::Ident("t0"),
                        Operand::Mem {
                            offset: -0x10,
                            base: "a1",
                        },
                    ],
                },
                Item::Instruction {
                    mnemonic: "li",
                    operands: vec![Operand::Ident("t1"), Operand::Int(-0xff)],
                },
            ],
        );
    }

    #[test]
    fn oversized_literals_are_errors() {
        assert!(Ast::try_from("addi a0, a0, 99999999999999999999").is_err());
        assert!(Ast::try_from("lw a0, 0xffffffffffffffffff(sp)").is_err());
        assert!(Ast::try_from("li a0, -99999999999999999999").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Ast::try_from("li a0, $5").is_err());
        assert!(Ast::try_from("add a0 a1 a2,").is_err());
    }
}
