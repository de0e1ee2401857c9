//! Rename every occurrence of a variable name.

use crate::core::Refactoring;
use crate::core::edit::TextEdit;
use crate::core::scope::collect_scopes;
use crate::core::walk::{Visit, walk};
use crate::uast::TopLevel;

/// Name-based rename across a compilation unit.
///
/// Touches parameters, declarators and every identifier use, including the
/// object of a member access (`Console` in `Console.WriteLine`). Member names,
/// type and method declaration names are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameVariable {
    pub old_name: String,
    pub new_name: String,
}

impl RenameVariable {
    pub fn new(old_name: &str, new_name: &str) -> Self {
        Self {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        }
    }

    /// Scopes where the rename would capture or shadow another variable.
    pub fn conflicts(&self, unit: &TopLevel) -> Vec<String> {
        collect_scopes(unit)
            .into_iter()
            .filter_map(|scope| {
                let old = self.old_name.as_str();
                let new = self.new_name.as_str();
                let captures = scope.mentions(old) && scope.declared.contains(new);
                let shadows = scope.declared.contains(old) && scope.referenced.contains(new);
                (captures || shadows).then(|| {
                    format!(
                        "{}: '{}' is already in use alongside '{}'",
                        scope.name, new, old
                    )
                })
            })
            .collect()
    }
}

impl Refactoring for RenameVariable {
    fn edits(&self, unit: &TopLevel) -> Vec<TextEdit> {
        let mut spans = Vec::new();
        walk(unit, &mut |event| match event {
            Visit::Declaration(id) | Visit::Reference(id) if id.name == self.old_name => {
                spans.push(id.span);
            }
            _ => {}
        });
        spans.sort_by_key(|span| (span.start, span.end));
        spans.dedup();

        spans
            .into_iter()
            .map(|span| TextEdit::replace(span.start, span.end, self.new_name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::edit::apply_edits;
    use crate::test_support::parse_unit_ok;

    fn rename(source: &str, old: &str, new: &str) -> String {
        let unit = parse_unit_ok(source);
        let edits = RenameVariable::new(old, new).edits(&unit);
        apply_edits(source, &edits).expect("apply")
    }

    #[test]
    fn renames_parameter_and_use() {
        let source = r#"public class MyClass {
    public int MyMethod(int a) {
        return a + 5;
    }
}"#;
        let expected = r#"public class MyClass {
    public int MyMethod(int b) {
        return b + 5;
    }
}"#;
        assert_eq!(rename(source, "a", "b"), expected);
    }

    #[test]
    fn renames_local_across_branches() {
        let source = r#"public class Test {
    public void Run() {
        int x = 10;
        if (x > 5) {
            x = 0;
        } else {
            x = 1;
        }
    }
}"#;
        let expected = r#"public class Test {
    public void Run() {
        int y = 10;
        if (y > 5) {
            y = 0;
        } else {
            y = 1;
        }
    }
}"#;
        assert_eq!(rename(source, "x", "y"), expected);
    }

    #[test]
    fn renames_invocation_argument() {
        let source = r#"public class Test {
    public void Run(int val) {
        Console.WriteLine(val);
    }
}"#;
        let expected = r#"public class Test {
    public void Run(int newValue) {
        Console.WriteLine(newValue);
    }
}"#;
        assert_eq!(rename(source, "val", "newValue"), expected);
    }

    #[test]
    fn renames_member_access_object_but_not_member() {
        let source = r#"public class Test {
    public void Run() {
        Console.WriteLine("Hello");
    }
}"#;
        let expected = r#"public class Test {
    public void Run() {
        MyConsole.WriteLine("Hello");
    }
}"#;
        assert_eq!(rename(source, "Console", "MyConsole"), expected);
        assert_eq!(rename(source, "WriteLine", "Print"), source);
    }

    #[test]
    fn leaves_comments_and_strings_alone() {
        let source = r#"class T {
    void Run(int count) {
        // count the things
        Log("count", count);
    }
}"#;
        let expected = r#"class T {
    void Run(int total) {
        // count the things
        Log("count", total);
    }
}"#;
        assert_eq!(rename(source, "count", "total"), expected);
    }

    #[test]
    fn reaches_identifiers_inside_opaque_statements() {
        let source = "class T { void Run(int[] items) { foreach (var item in items) { Use(item); } } }";
        let renamed = rename(source, "items", "values");
        assert_eq!(
            renamed,
            "class T { void Run(int[] values) { foreach (var item in values) { Use(item); } } }"
        );
    }

    #[test]
    fn leaves_argument_labels_alone() {
        let source = "class T { void Run(int count) { Use(count: count); } }";
        assert_eq!(
            rename(source, "count", "total"),
            "class T { void Run(int total) { Use(count: total); } }"
        );
    }

    #[test]
    fn leaves_conditional_member_names_alone() {
        let source = "class T { void Run(string s, int Length) { Use(s?.Length, Length); } }";
        assert_eq!(
            rename(source, "Length", "size"),
            "class T { void Run(string s, int size) { Use(s?.Length, size); } }"
        );
    }

    #[test]
    fn leaves_object_initializer_targets_alone() {
        let source = "class T { void Run(int Count) { var p = new P { Count = Count }; } }";
        assert_eq!(
            rename(source, "Count", "n"),
            "class T { void Run(int n) { var p = new P { Count = n }; } }"
        );
    }

    fn error_ranges(node: tree_sitter::Node<'_>, out: &mut Vec<(usize, usize)>) {
        if node.is_error() || node.is_missing() {
            out.push((node.start_byte(), node.end_byte()));
            return;
        }
        let mut cursor = node.walk();
        let children: Vec<tree_sitter::Node<'_>> = node.children(&mut cursor).collect();
        for child in children {
            error_ranges(child, out);
        }
    }

    #[test]
    fn leaves_syntax_error_regions_untouched() {
        let source = "class T {\n    void Run(int a) {\n        Use(a);\n    }\n    void Broken(int a) {\n        Use(a)) + a;\n    }\n}";
        let tree = crate::test_support::parse_csharp(source);
        let mut broken = Vec::new();
        error_ranges(tree.root_node(), &mut broken);
        assert!(!broken.is_empty(), "source should contain a syntax error");

        let edits = RenameVariable::new("a", "b").edits(&parse_unit_ok(source));
        assert!(!edits.is_empty());
        for edit in &edits {
            for &(start, end) in &broken {
                assert!(
                    edit.end <= start || edit.start >= end,
                    "edit {}..{} falls inside broken region {start}..{end}",
                    edit.start,
                    edit.end
                );
            }
        }
        let renamed = apply_edits(source, &edits).expect("apply");
        assert!(renamed.starts_with("class T {\n    void Run(int b) {\n        Use(b);\n    }\n"));
    }

    #[test]
    fn renames_field_declarations_and_uses() {
        let source = "class T { int a; int b; void M() { a = 1; b = 2; } }";
        assert_eq!(
            rename(source, "a", "c"),
            "class T { int c; int b; void M() { c = 1; b = 2; } }"
        );
    }

    #[test]
    fn reports_conflict_between_fields() {
        let unit = parse_unit_ok("class T { int a; int b; void M() { a = 1; b = 2; } }");
        let conflicts = RenameVariable::new("a", "b").conflicts(&unit);
        assert!(!conflicts.is_empty());
    }

    #[test]
    fn no_edits_when_name_absent() {
        let unit = parse_unit_ok("class T { void Run() { int x = 1; } }");
        assert!(RenameVariable::new("missing", "other").edits(&unit).is_empty());
    }

    #[test]
    fn reports_conflict_with_existing_local() {
        let unit = parse_unit_ok("class T { void Run(int a) { int b = 2; Use(a, b); } }");
        let conflicts = RenameVariable::new("a", "b").conflicts(&unit);
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].starts_with("Run:"));
    }

    #[test]
    fn names_in_unrelated_functions_do_not_conflict() {
        let unit = parse_unit_ok("class T { void A(int a) { Use(a); } void B(int b) { Use(b); } }");
        assert!(RenameVariable::new("a", "b").conflicts(&unit).is_empty());
    }
}
