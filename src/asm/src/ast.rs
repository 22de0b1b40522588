#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast<'src> {
    pub items: Vec<Item<'src>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<'src> {
    Label(&'src str),
    Directive {
        name: &'src str,
        args: Vec<Operand<'src>>,
    },
    Instruction {
        mnemonic: &'src str,
        operands: Vec<Operand<'src>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'src> {
    Ident(&'src str),
    Int(i64),
    Mem { offset: i64, base: &'src str },
}
