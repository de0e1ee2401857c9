//! Name scopes (functions and the top level) and the names they declare or use.

use std::collections::BTreeSet;

use crate::core::walk::{Visit, walk};
use crate::uast::{Span, TopLevel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope<'a> {
    pub name: &'a str,
    pub span: Span,
    pub declared: BTreeSet<&'a str>,
    pub referenced: BTreeSet<&'a str>,
}

impl Scope<'_> {
    pub fn mentions(&self, name: &str) -> bool {
        self.declared.contains(name) || self.referenced.contains(name)
    }
}

/// Collect every scope in `unit`. Names belong to the innermost scope they
/// appear in.
pub fn collect_scopes(unit: &TopLevel) -> Vec<Scope<'_>> {
    let mut finished = Vec::new();
    let mut stack: Vec<Scope<'_>> = Vec::new();

    walk(unit, &mut |event| match event {
        Visit::EnterScope { name, span } => stack.push(Scope {
            name,
            span,
            declared: BTreeSet::new(),
            referenced: BTreeSet::new(),
        }),
        Visit::ExitScope => {
            if let Some(scope) = stack.pop() {
                finished.push(scope);
            }
        }
        Visit::Declaration(id) => {
            if let Some(scope) = stack.last_mut() {
                scope.declared.insert(id.name.as_str());
            }
        }
        Visit::Reference(id) => {
            if let Some(scope) = stack.last_mut() {
                scope.referenced.insert(id.name.as_str());
            }
        }
    });

    finished
}

/// Innermost scope whose span contains `span`.
pub fn enclosing_scope<'s, 'a>(scopes: &'s [Scope<'a>], span: Span) -> Option<&'s Scope<'a>> {
    scopes
        .iter()
        .filter(|scope| scope.span.contains(&span))
        .min_by_key(|scope| scope.span.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::parse_unit_ok;

    #[test]
    fn separates_function_scopes() {
        let unit = parse_unit_ok(
            "class T { void A(int x) { int y = x; } void B() { Console.WriteLine(z); } }",
        );
        let scopes = collect_scopes(&unit);
        let a = scopes.iter().find(|scope| scope.name == "A").expect("A");
        let b = scopes.iter().find(|scope| scope.name == "B").expect("B");

        assert_eq!(a.declared, BTreeSet::from(["x", "y"]));
        assert_eq!(a.referenced, BTreeSet::from(["x"]));
        assert!(b.declared.is_empty());
        assert_eq!(b.referenced, BTreeSet::from(["Console", "z"]));
    }

    #[test]
    fn enclosing_scope_prefers_innermost() {
        let source = "class T { void A() { int y = 1; } }";
        let unit = parse_unit_ok(source);
        let scopes = collect_scopes(&unit);
        let offset = source.find("y = 1").expect("offset");
        let scope = enclosing_scope(&scopes, Span::new(offset, offset + 1)).expect("scope");
        assert_eq!(scope.name, "A");
    }
}
