#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grammar<'source>(pub Vec<Rule<'source>>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule<'source> {
    pub name: Id<'source>,
    pub body: Alternatives<'source>,
}

#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::From,
    derive_more::AsRef,
)]
pub struct Id<'source>(pub(crate) &'source str);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alternatives<'source>(pub Vec<Alternative<'source>>);

/// One alternative of a rule body, with its optional `--label` case name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alternative<'source> {
    pub sequence: Sequence<'source>,
    pub label: Option<Id<'source>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence<'source>(pub Vec<Qualified<'source>>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Qualified<'source> {
    pub term: Term<'source>,
    pub qualifier: Option<Qualifier>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Qualifier {
    Optional,
    Many0,
    Many1,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term<'source> {
    Literal(Literal),
    Range(CharRange),
    Any,
    Rule(Id<'source>),
    Group(Box<Alternatives<'source>>),
    Not(Box<Qualified<'source>>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal(pub String);

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal(value)
    }
}

impl<'a> From<&'a str> for Literal {
    fn from(value: &'a str) -> Self {
        value.to_owned().into()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CharRange {
    pub start: char,
    pub end: char,
}
