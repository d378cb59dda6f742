//! Evaluates a compiled grammar against an input string.
//!
//! Matching is whole-string: a rule accepts an input only if its expression
//! matches at position 0 and ends exactly at the input's length. Positions are
//! byte offsets, always advanced by whole characters.

use std::collections::HashMap;

use crate::{
    compiler::{
        Expr,
        Grammar,
    },
    Error,
};

impl Grammar {
    /// True iff the start rule generates the whole of `input`.
    pub fn matches(&self, input: &str) -> bool {
        Matcher::new(self, input).run(self.start)
    }

    /// Like [`matches`](Grammar::matches), starting from the named rule
    /// instead. Fails only if no rule of that name is defined.
    pub fn matches_rule(&self, rule: &str, input: &str) -> Result<bool, Error> {
        let start = self
            .rule_index(rule)
            .ok_or_else(|| Error::UndefinedRule(rule.to_owned()))?;
        Ok(Matcher::new(self, input).run(start))
    }
}

/// Call-scoped evaluation state. Dropped when the match returns; nothing is
/// shared between calls, so one [`Grammar`] can serve concurrent matches.
struct Matcher<'grammar, 'input> {
    grammar: &'grammar Grammar,
    input: &'input str,
    /// packrat memo: (rule, position) -> outcome
    memo: HashMap<(usize, usize), Option<usize>>,
}

impl<'grammar, 'input> Matcher<'grammar, 'input> {
    fn new(grammar: &'grammar Grammar, input: &'input str) -> Self {
        Matcher {
            grammar,
            input,
            memo: HashMap::new(),
        }
    }

    fn run(&mut self, start: usize) -> bool {
        let matched = self.eval_rule(start, 0) == Some(self.input.len());
        tracing::trace!(
            "rule '{}' {} {:?}",
            self.grammar.rule(start).name,
            if matched { "accepts" } else { "rejects" },
            self.input
        );
        matched
    }

    /// Ordered choice over the rule's alternatives: the first one matching at
    /// `at` wins, regardless of how far later ones would reach.
    fn eval_rule(&mut self, rule: usize, at: usize) -> Option<usize> {
        if let Some(known) = self.memo.get(&(rule, at)) {
            return *known;
        }

        let def = self.grammar.rule(rule);
        let mut result = None;
        for alt in &def.alts {
            if let Some(end) = self.eval(&alt.expr, at) {
                if let Some(label) = &alt.label {
                    tracing::trace!("rule '{}' matched case '{}' at {}", def.name, label, at);
                }
                result = Some(end);
                break;
            }
        }

        self.memo.insert((rule, at), result);
        result
    }

    fn eval(&mut self, expr: &Expr, at: usize) -> Option<usize> {
        match expr {
            Expr::Literal(text) => self.input[at..]
                .starts_with(text.as_str())
                .then(|| at + text.len()),
            Expr::Range { start, end } => self
                .next_char(at)
                .filter(|c| (*start..=*end).contains(c))
                .map(|c| at + c.len_utf8()),
            Expr::Any => self.next_char(at).map(|c| at + c.len_utf8()),
            Expr::Builtin(class) => self
                .next_char(at)
                .filter(|c| class.matches(*c))
                .map(|c| at + c.len_utf8()),
            Expr::Rule(index) => self.eval_rule(*index, at),
            Expr::Sequence(items) => {
                let mut pos = at;
                for item in items {
                    pos = self.eval(item, pos)?;
                }
                Some(pos)
            }
            Expr::Choice(alternatives) => alternatives
                .iter()
                .find_map(|alternative| self.eval(alternative, at)),
            // zero-width: succeeds exactly when the inner expression fails
            Expr::Not(inner) => match self.eval(inner, at) {
                Some(_) => None,
                None => Some(at),
            },
            Expr::Repeat {
                inner,
                min,
                unbounded,
            } => {
                let mut end = at;
                let mut count = 0;
                while let Some(next) = self.eval(inner, end) {
                    count += 1;
                    // a zero-width iteration would repeat forever
                    let stalled = next == end;
                    end = next;
                    if stalled || !*unbounded {
                        break;
                    }
                }
                (count >= *min).then_some(end)
            }
        }
    }

    fn next_char(&self, at: usize) -> Option<char> {
        self.input[at..].chars().next()
    }
}
