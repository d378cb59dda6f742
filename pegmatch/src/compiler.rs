use std::collections::HashMap;

use itertools::Itertools;

use crate::{
    ast,
    builtin::Builtin,
    Error,
};

/// A compiled grammar: an immutable rule table plus its designated start rule
/// (the first rule defined in the source).
///
/// Compiling resolves every rule reference to an index into the table, so a
/// `Grammar` can be shared and matched against concurrently without any
/// name lookups at evaluation time.
#[derive(Clone, Debug)]
pub struct Grammar {
    pub(crate) start: usize,
    pub(crate) rules: Vec<CompiledRule>,
}

impl Grammar {
    /// Name of the rule matches start from by default.
    pub fn start_rule(&self) -> &str {
        &self.rules[self.start].name
    }

    pub(crate) fn rule(&self, index: usize) -> &CompiledRule {
        &self.rules[index]
    }

    pub(crate) fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct CompiledRule {
    pub(crate) name: String,
    pub(crate) alts: Vec<Alt>,
}

/// One top-level alternative of a rule. The label only ever surfaces in trace
/// output; it plays no part in matching.
#[derive(Clone, Debug)]
pub(crate) struct Alt {
    pub(crate) label: Option<String>,
    pub(crate) expr: Expr,
}

/// A compiled parsing expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Expr {
    Literal(String),
    Range { start: char, end: char },
    Any,
    Rule(usize),
    Builtin(Builtin),
    Sequence(Vec<Expr>),
    Choice(Vec<Expr>),
    Not(Box<Expr>),
    Repeat {
        inner: Box<Expr>,
        min: usize,
        unbounded: bool,
    },
}

pub(crate) fn compile(grammar: &ast::Grammar<'_>) -> Result<Grammar, Error> {
    if grammar.0.is_empty() {
        return Err(Error::Empty);
    }

    if let Some(duplicate) = grammar.0.iter().map(|rule| rule.name).duplicates().next() {
        return Err(Error::DuplicateRule(duplicate.to_string()));
    }

    let mut compiler = Compiler::default();
    for (index, rule) in grammar.0.iter().enumerate() {
        compiler.names.insert(rule.name, index);
    }

    let rules = grammar
        .0
        .iter()
        .map(|rule| {
            Ok(CompiledRule {
                name: rule.name.to_string(),
                alts: compiler.lower_alternatives(&rule.body)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let grammar = Grammar { start: 0, rules };
    tracing::debug!("compiled grammar: {:#?}", grammar);

    Ok(grammar)
}

#[derive(Default)]
struct Compiler<'source> {
    names: HashMap<ast::Id<'source>, usize>,
}

impl<'source> Compiler<'source> {
    fn lower_alternatives(
        &self,
        alternatives: &ast::Alternatives<'source>,
    ) -> Result<Vec<Alt>, Error> {
        alternatives
            .0
            .iter()
            .map(|alternative| {
                Ok(Alt {
                    label: alternative.label.map(|label| label.to_string()),
                    expr: self.lower_sequence(&alternative.sequence)?,
                })
            })
            .collect()
    }

    fn lower_sequence(&self, sequence: &ast::Sequence<'source>) -> Result<Expr, Error> {
        let mut items = sequence
            .0
            .iter()
            .map(|qualified| self.lower_qualified(qualified))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::Sequence(items)
        })
    }

    fn lower_qualified(&self, qualified: &ast::Qualified<'source>) -> Result<Expr, Error> {
        let inner = self.lower_term(&qualified.term)?;

        Ok(match qualified.qualifier {
            None => inner,
            Some(ast::Qualifier::Optional) => Expr::Repeat {
                inner: Box::new(inner),
                min: 0,
                unbounded: false,
            },
            Some(ast::Qualifier::Many0) => Expr::Repeat {
                inner: Box::new(inner),
                min: 0,
                unbounded: true,
            },
            Some(ast::Qualifier::Many1) => Expr::Repeat {
                inner: Box::new(inner),
                min: 1,
                unbounded: true,
            },
        })
    }

    fn lower_term(&self, term: &ast::Term<'source>) -> Result<Expr, Error> {
        Ok(match term {
            ast::Term::Literal(literal) => Expr::Literal(literal.0.clone()),
            ast::Term::Range(range) => Expr::Range {
                start: range.start,
                end: range.end,
            },
            ast::Term::Any => Expr::Any,
            // user-defined rules win over the built-in classes
            ast::Term::Rule(id) => match self.names.get(id) {
                Some(index) => Expr::Rule(*index),
                None => match Builtin::from_name(id.0) {
                    Some(builtin) => Expr::Builtin(builtin),
                    None => return Err(Error::UndefinedRule(id.to_string())),
                },
            },
            ast::Term::Group(alternatives) => self.lower_group(alternatives)?,
            ast::Term::Not(inner) => Expr::Not(Box::new(self.lower_qualified(inner)?)),
        })
    }

    /// Labels inside a group are parsed but carry no weight; only the
    /// alternative order matters here.
    fn lower_group(&self, alternatives: &ast::Alternatives<'source>) -> Result<Expr, Error> {
        let mut choices = alternatives
            .0
            .iter()
            .map(|alternative| self.lower_sequence(&alternative.sequence))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(if choices.len() == 1 {
            choices.remove(0)
        } else {
            Expr::Choice(choices)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_uses_the_first_rule_as_start() {
        let grammar = crate::compile("a = b\nb = \"x\"").unwrap();
        assert_eq!(grammar.start_rule(), "a");
    }

    #[test]
    fn it_compiles_references_to_indices() {
        let grammar = crate::compile("a = b\nb = \"x\"").unwrap();
        assert_eq!(grammar.rules[0].alts[0].expr, Expr::Rule(1));
        assert_eq!(grammar.rules[1].alts[0].expr, Expr::Literal("x".to_owned()));
    }

    #[test]
    fn it_rejects_duplicate_rules() {
        let result = crate::compile("a = \"x\"\na = \"y\"");
        assert!(matches!(result, Err(Error::DuplicateRule(name)) if name == "a"));
    }

    #[test]
    fn it_rejects_undefined_references() {
        let result = crate::compile("a = missing");
        assert!(matches!(result, Err(Error::UndefinedRule(name)) if name == "missing"));
    }

    #[test]
    fn it_rejects_an_empty_grammar() {
        assert!(matches!(crate::compile("  \n\t  "), Err(Error::Empty)));
    }

    #[test]
    fn it_resolves_builtin_classes() {
        let grammar = crate::compile("a = letter digit").unwrap();
        assert_eq!(
            grammar.rules[0].alts[0].expr,
            Expr::Sequence(vec![
                Expr::Builtin(Builtin::Letter),
                Expr::Builtin(Builtin::Digit),
            ])
        );
    }

    #[test]
    fn it_prefers_user_rules_over_builtins() {
        let grammar = crate::compile("a = digit\ndigit = \"0\"").unwrap();
        assert_eq!(grammar.rules[0].alts[0].expr, Expr::Rule(1));
    }

    #[test]
    fn it_desugars_repetition() {
        let grammar = crate::compile("a = \"x\"? \"y\"* \"z\"+").unwrap();
        assert_eq!(
            grammar.rules[0].alts[0].expr,
            Expr::Sequence(vec![
                Expr::Repeat {
                    inner: Box::new(Expr::Literal("x".to_owned())),
                    min: 0,
                    unbounded: false,
                },
                Expr::Repeat {
                    inner: Box::new(Expr::Literal("y".to_owned())),
                    min: 0,
                    unbounded: true,
                },
                Expr::Repeat {
                    inner: Box::new(Expr::Literal("z".to_owned())),
                    min: 1,
                    unbounded: true,
                },
            ])
        );
    }

    #[test]
    fn it_records_case_labels_in_order() {
        let grammar = crate::compile("a = \"x\" --ex | \"y\" | \"z\" --zed").unwrap();
        let labels = grammar.rules[0]
            .alts
            .iter()
            .map(|alt| alt.label.as_deref())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec![Some("ex"), None, Some("zed")]);
    }

    #[test]
    fn it_compiles_the_card_number_grammar() {
        let grammar = crate::compile(
            r#"
    cardNum = "4" (fifteenDigits | twelveDigits)
    fifteenDigits = d d d d d d d d d d d d d d d
    twelveDigits = d d d d d d d d d d d d
    d = digit
            "#,
        )
        .unwrap();

        assert_eq!(grammar.start_rule(), "cardNum");
        assert_eq!(grammar.rules.len(), 4);
        assert_eq!(grammar.rules[3].alts[0].expr, Expr::Builtin(Builtin::Digit));
    }
}
