use std::fmt::Display;

use crate::grammar::*;
use super::NormalForm;

/// The first production found that breaks a normal form.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub form: NormalForm,
    pub rule: Nonterminal,
    pub production: Production,
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Production `{} : {}` is not in {} normal form", self.rule, self.production, self.form)
    }
}

fn check(grammar: &Grammar, form: NormalForm, allowed: impl Fn(&Production) -> bool) -> Result<(), Violation> {
    for (rule, production) in grammar.productions() {
        let valid = if production.is_epsilon() {
            rule == grammar.start_symbol
        } else {
            allowed(production)
        };
        if !valid {
            return Err(Violation {
                form,
                rule,
                production: production.clone()
            });
        }
    }

    Ok(())
}

/// Every production is `a`, `BC`, or epsilon on the axiom.
pub fn check_chomsky(grammar: &Grammar) -> Result<(), Violation> {
    check(grammar, NormalForm::Chomsky, |production| match production.symbols() {
        [Symbol::Terminal(_)] => true,
        [Symbol::Nonterminal(_), Symbol::Nonterminal(_)] => true,
        _ => false
    })
}

/// Every production is a terminal followed by non-terminals only, or
/// epsilon on the axiom.
pub fn check_greibach(grammar: &Grammar) -> Result<(), Violation> {
    check(grammar, NormalForm::Greibach, |production| match production.symbols() {
        [Symbol::Terminal(_), rest @ ..] => rest.iter().all(|symbol| matches!(symbol, Symbol::Nonterminal(_))),
        _ => false
    })
}

#[cfg(test)]
pub fn is_chomsky(grammar: &Grammar) -> bool {
    check_chomsky(grammar).is_ok()
}

#[cfg(test)]
pub fn is_greibach(grammar: &Grammar) -> bool {
    check_greibach(grammar).is_ok()
}
