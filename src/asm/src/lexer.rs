use {
    chumsky::prelude::{Parser as ChumskyParser, *},
    derive_more::Display,
};

pub(super) trait Parser<'src, Output>:
    ChumskyParser<'src, &'src str, Output, extra::Err<Rich<'src, char>>> + Clone
{
}
impl<
        'src,
        Output,
        T: ChumskyParser<'src, &'src str, Output, extra::Err<Rich<'src, char>>> + Clone,
    > Parser<'src, Output> for T
{
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Token<'src> {
    // delimiters
    #[display("(")]
    OpenParen,
    #[display(")")]
    CloseParen,
    #[display(",")]
    Comma,
    #[display(":")]
    Colon,
    #[display("newline")]
    Newline,
    // literals
    Int(i64),
    // symbols
    #[display(".{_0}")]
    Directive(&'src str),
    Ident(&'src str),
}

fn delimiter_lexer<'src>() -> impl Parser<'src, Token<'src>> {
    choice([
        just('(').to(Token::OpenParen),
        just(')').to(Token::CloseParen),
        just(',').to(Token::Comma),
        just(':').to(Token::Colon),
        just('\n').to(Token::Newline),
    ])
}

fn int_literal_lexer<'src>() -> impl Parser<'src, Token<'src>> {
    let magnitude = choice((
        just("0x")
            .ignore_then(text::digits(16).to_slice())
            .try_map(|digits, span| {
                i64::from_str_radix(digits, 16).map_err(|err| Rich::custom(span, err))
            }),
        text::int(10).to_slice().try_map(|digits: &str, span| {
            digits.parse::<i64>().map_err(|err| Rich::custom(span, err))
        }),
    ));
    just('-')
        .or_not()
        .then(magnitude)
        .map(|(sign, magnitude)| match sign {
            Some(_) => -magnitude,
            None => magnitude,
        })
        .map(Token::Int)
}

fn directive_lexer<'src>() -> impl Parser<'src, Token<'src>> {
    just('.').ignore_then(text::ascii::ident()).map(Token::Directive)
}

fn ident_lexer<'src>() -> impl Parser<'src, Token<'src>> {
    text::ascii::ident().map(Token::Ident)
}

fn token_lexer<'src>() -> impl Parser<'src, Token<'src>> {
    choice((
        delimiter_lexer(),
        int_literal_lexer(),
        directive_lexer(),
        ident_lexer(),
    ))
}

fn comment_lexer<'src>() -> impl Parser<'src, ()> {
    just('#').then(none_of('\n').repeated()).ignored()
}

// newlines are significant, so only spaces and tabs are padding
fn space<'src>() -> impl Parser<'src, ()> {
    one_of(" \t\r").repeated().ignored()
}

pub(super) fn lexer<'src>() -> impl Parser<'src, Vec<Token<'src>>> {
    token_lexer()
        .padded_by(comment_lexer().padded_by(space()).repeated())
        .padded_by(space())
        .repeated()
        .collect()
        .then_ignore(end())
}
