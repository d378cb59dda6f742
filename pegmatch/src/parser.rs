use nom::{
    branch::alt,
    bytes::complete::{
        escaped_transform,
        tag,
        take_while1,
    },
    character::complete::{
        char,
        multispace0,
        none_of,
        one_of,
    },
    combinator::{
        all_consuming,
        cut,
        map,
        not,
        opt,
        peek,
        value,
    },
    error::{
        context,
        ErrorKind,
        ParseError,
        VerboseError,
    },
    multi::{
        many0,
        many1,
        separated_list1,
    },
    sequence::{
        delimited,
        pair,
        preceded,
        terminated,
        tuple,
    },
    IResult,
};

use crate::ast::{
    Alternative,
    Alternatives,
    CharRange,
    Grammar,
    Id,
    Literal,
    Qualified,
    Qualifier,
    Rule,
    Sequence,
    Term,
};

type Res<'a, U> = IResult<&'a str, U, VerboseError<&'a str>>;

/// consumes whitespace (spaces, tabs, newlines) before calling the parser `f`
fn wsc<'a, U>(f: impl FnMut(&'a str) -> Res<'a, U>) -> impl FnMut(&'a str) -> Res<'a, U> {
    preceded(multispace0, f)
}

pub(crate) fn parse_grammar_complete(input: &str) -> Res<Grammar> {
    all_consuming(terminated(parse_grammar, multispace0))(input)
}

fn parse_grammar(input: &str) -> Res<Grammar> {
    context("grammar", map(many0(parse_rule), Grammar))(input)
}

fn parse_rule<'a>(input: &'a str) -> Res<'a, Rule> {
    context(
        "rule",
        map(
            tuple((parse_id, wsc(char('=')), parse_alternatives)),
            |(name, _, body)| Rule { name, body },
        ),
    )(input)
}

fn parse_id<'a>(input: &'a str) -> Res<'a, Id> {
    context(
        "identifier",
        map(
            wsc(take_while1(|c: char| c.is_alphanumeric() || c == '_')),
            |id| Id(id),
        ),
    )(input)
}

fn parse_alternatives<'a>(input: &'a str) -> Res<'a, Alternatives> {
    context(
        "alternatives",
        map(
            separated_list1(wsc(char('|')), parse_alternative),
            Alternatives,
        ),
    )(input)
}

fn parse_alternative<'a>(input: &'a str) -> Res<'a, Alternative> {
    map(
        pair(parse_sequence, opt(parse_label)),
        |(sequence, label)| Alternative { sequence, label },
    )(input)
}

fn parse_label<'a>(input: &'a str) -> Res<'a, Id> {
    context(
        "case label",
        preceded(
            wsc(tag("--")),
            map(take_while1(|c: char| c.is_alphanumeric() || c == '_'), |id| {
                Id(id)
            }),
        ),
    )(input)
}

fn parse_sequence<'a>(input: &'a str) -> Res<'a, Sequence> {
    context("sequence", map(many1(parse_pred), Sequence))(input)
}

/// `~` binds looser than the repetition suffixes, so the negation wraps the
/// qualified term as a whole.
fn parse_pred<'a>(input: &'a str) -> Res<'a, Qualified> {
    alt((
        map(preceded(wsc(char('~')), parse_pred), |inner| Qualified {
            term: Term::Not(Box::new(inner)),
            qualifier: None,
        }),
        parse_qualified,
    ))(input)
}

fn parse_qualified<'a>(input: &'a str) -> Res<'a, Qualified> {
    map(
        pair(parse_term, opt(parse_qualifier)),
        |(term, qualifier)| Qualified { term, qualifier },
    )(input)
}

fn parse_qualifier<'a>(input: &'a str) -> Res<'a, Qualifier> {
    context(
        "qualifier",
        map(wsc(one_of("?*+")), |q| {
            match q {
                '?' => Qualifier::Optional,
                '*' => Qualifier::Many0,
                '+' => Qualifier::Many1,
                _ => unreachable!(),
            }
        }),
    )(input)
}

fn parse_term<'a>(input: &'a str) -> Res<'a, Term> {
    context(
        "term",
        alt((parse_literal_or_range, parse_group, parse_rule_ref)),
    )(input)
}

/// A quoted string is either a literal on its own or, followed by `..` and a
/// second one-character string, a character range.
fn parse_literal_or_range<'a>(input: &'a str) -> Res<'a, Term> {
    let (input, lower) = parse_quoted(input)?;
    let (input, upper) = opt(preceded(wsc(tag("..")), cut(parse_quoted)))(input)?;

    let term = match upper {
        None => Term::Literal(Literal(lower)),
        Some(upper) => {
            let (Some(start), Some(end)) = (single_char(&lower), single_char(&upper)) else {
                return Err(nom::Err::Failure(VerboseError::from_error_kind(
                    input,
                    ErrorKind::Verify,
                )));
            };
            Term::Range(CharRange { start, end })
        }
    };

    Ok((input, term))
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn parse_quoted<'a>(input: &'a str) -> Res<'a, String> {
    context(
        "literal",
        wsc(delimited(
            char('"'),
            escaped_transform(none_of("\"\r\n\\"), '\\', parse_escape),
            char('"'),
        )),
    )(input)
}

fn parse_escape(input: &str) -> Res<char> {
    context(
        "escape",
        alt((
            char('\\'),
            char('"'),
            char('\''),
            value('\n', char('n')),
            value('\t', char('t')),
        )),
    )(input)
}

fn parse_group<'a>(input: &'a str) -> Res<'a, Term> {
    context(
        "group",
        map(
            delimited(wsc(char('(')), cut(parse_alternatives), cut(wsc(char(')')))),
            |alternatives| Term::Group(Box::new(alternatives)),
        ),
    )(input)
}

/// A bare identifier is a rule reference, unless it is followed by `=` (which
/// starts the next rule definition) or is the wildcard keyword.
fn parse_rule_ref(input: &str) -> Res<'_, Term> {
    map(terminated(parse_id, peek(not(wsc(char('='))))), |id| {
        if id.0 == "any" {
            Term::Any
        } else {
            Term::Rule(id)
        }
    })(input)
}
