use {
    super::{ast::*, lexer::Token},
    chumsky::prelude::{Parser as ChumskyParser, *},
};

pub(super) trait Parser<'tokens, 'src: 'tokens, Output>:
    ChumskyParser<'tokens, &'tokens [Token<'src>], Output, extra::Err<Rich<'tokens, Token<'src>>>>
    + Clone
    + 'tokens
{
}
impl<
        'tokens,
        'src: 'tokens,
        Output,
        T: ChumskyParser<
                'tokens,
                &'tokens [Token<'src>],
                Output,
                extra::Err<Rich<'tokens, Token<'src>>>,
            > + Clone
            + 'tokens,
    > Parser<'tokens, 'src, Output> for T
{
}

fn ident_parser<'tokens, 'src: 'tokens>() -> impl Parser<'tokens, 'src, &'src str> {
    select! { Token::Ident(ident) => ident }
}

fn int_parser<'tokens, 'src: 'tokens>() -> impl Parser<'tokens, 'src, i64> {
    select! { Token::Int(int) => int }
}

fn operand_parser<'tokens, 'src: 'tokens>() -> impl Parser<'tokens, 'src, Operand<'src>> {
    let base = ident_parser().delimited_by(just(Token::OpenParen), just(Token::CloseParen));
    choice((
        int_parser()
            .then(base.clone().or_not())
            .map(|(int, base)| match base {
                Some(base) => Operand::Mem { offset: int, base },
                None => Operand::Int(int),
            }),
        base.map(|base| Operand::Mem { offset: 0, base }),
        ident_parser().map(Operand::Ident),
    ))
}

fn label_parser<'tokens, 'src: 'tokens>() -> impl Parser<'tokens, 'src, Item<'src>> {
    ident_parser()
        .then_ignore(just(Token::Colon))
        .map(Item::Label)
}

fn directive_parser<'tokens, 'src: 'tokens>() -> impl Parser<'tokens, 'src, Item<'src>> {
    // directive arguments are a free-form list; commas are optional
    select! { Token::Directive(name) => name }
        .then(
            operand_parser()
                .separated_by(just(Token::Comma).or_not())
                .collect(),
        )
        .map(|(name, args)| Item::Directive { name, args })
}

fn instruction_parser<'tokens, 'src: 'tokens>() -> impl Parser<'tokens, 'src, Item<'src>> {
    ident_parser()
        .then(
            operand_parser()
                .separated_by(just(Token::Comma))
                .collect(),
        )
        .map(|(mnemonic, operands)| Item::Instruction { mnemonic, operands })
}

fn line_parser<'tokens, 'src: 'tokens>() -> impl Parser<'tokens, 'src, Vec<Item<'src>>> {
    label_parser()
        .repeated()
        .collect::<Vec<_>>()
        .then(directive_parser().or(instruction_parser()).or_not())
        .map(|(mut items, statement)| {
            items.extend(statement);
            items
        })
}

pub(super) fn ast_parser<'tokens, 'src: 'tokens>() -> impl Parser<'tokens, 'src, Ast<'src>> {
    line_parser()
        .separated_by(just(Token::Newline))
        .collect::<Vec<_>>()
        .map(|lines| Ast {
            items: lines.into_iter().flatten().collect(),
        })
        .then_ignore(end())
}
