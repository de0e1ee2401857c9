//! Extract a selected expression into a new local variable.

use crate::core::Refactoring;
use crate::core::edit::TextEdit;
use crate::core::walk::{Visit, walk_expression};
use crate::uast::{
    BinaryOperator, Block, Expression, FunctionBody, Span, Statement, TopLevel, UnaryOperator,
};

pub const DEFAULT_KEYWORD: &str = "var";

/// Introduce `{keyword} {name} = <selection>;` in front of the statement that
/// holds the selection, and replace the selection with `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractVariable {
    pub selection_start: usize,
    pub selection_end: usize,
    pub new_variable_name: String,
    pub source: String,
    pub keyword: String,
}

/// Where an extraction applies: the statement to insert before and the
/// expression to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSite {
    pub statement_start: usize,
    pub expression: Span,
}

impl ExtractVariable {
    pub fn new(
        selection_start: usize,
        selection_end: usize,
        new_variable_name: &str,
        source: &str,
    ) -> Self {
        Self {
            selection_start,
            selection_end,
            new_variable_name: new_variable_name.to_string(),
            source: source.to_string(),
            keyword: DEFAULT_KEYWORD.to_string(),
        }
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = keyword.to_string();
        self
    }

    /// The selection with surrounding whitespace removed, if it is non-empty
    /// and inside the source.
    pub fn selection(&self) -> Option<Span> {
        let text = self.source.get(self.selection_start..self.selection_end)?;
        let leading = text.len() - text.trim_start().len();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let start = self.selection_start + leading;
        Some(Span::new(start, start + trimmed.len()))
    }

    pub fn site(&self, unit: &TopLevel) -> Option<ExtractionSite> {
        find_in_top_level(unit, self.selection()?)
    }

    fn declaration_edit(&self, site: ExtractionSite) -> Option<TextEdit> {
        let expr_text = self
            .source
            .get(site.expression.start..site.expression.end)?;
        let line_start = self.source[..site.statement_start]
            .rfind('\n')
            .map_or(0, |idx| idx + 1);
        let prefix = &self.source[line_start..site.statement_start];
        let separator = if prefix.chars().all(char::is_whitespace) {
            format!("\n{prefix}")
        } else {
            " ".to_string()
        };
        Some(TextEdit::insert(
            site.statement_start,
            format!(
                "{} {} = {};{}",
                self.keyword, self.new_variable_name, expr_text, separator
            ),
        ))
    }
}

impl Refactoring for ExtractVariable {
    fn edits(&self, unit: &TopLevel) -> Vec<TextEdit> {
        let Some(site) = self.site(unit) else {
            return Vec::new();
        };
        let Some(declaration) = self.declaration_edit(site) else {
            return Vec::new();
        };
        vec![
            declaration,
            TextEdit::replace(
                site.expression.start,
                site.expression.end,
                self.new_variable_name.as_str(),
            ),
        ]
    }
}

fn find_in_top_level(node: &TopLevel, selection: Span) -> Option<ExtractionSite> {
    if !node.span().contains(&selection) {
        return None;
    }
    match node {
        TopLevel::Module(module) => module
            .body
            .iter()
            .find_map(|item| find_in_top_level(item, selection)),
        TopLevel::Class(class) => class
            .body
            .iter()
            .find_map(|item| find_in_top_level(item, selection)),
        TopLevel::Function(function) => match &function.body {
            Some(FunctionBody::Block(block)) => find_in_block(block, selection),
            // No statement to insert before.
            Some(FunctionBody::Expression(_)) | None => None,
        },
        TopLevel::Statement(stmt) => find_in_statement(stmt, selection),
        TopLevel::Unknown(_) => None,
    }
}

fn find_in_block(block: &Block, selection: Span) -> Option<ExtractionSite> {
    block
        .statements
        .iter()
        .find(|stmt| stmt.span().contains(&selection))
        .and_then(|stmt| find_in_statement(stmt, selection))
}

/// `stmt` sits directly in a block, so declarations may be inserted before it.
fn find_in_statement(stmt: &Statement, selection: Span) -> Option<ExtractionSite> {
    if let Some(expr) = own_expressions(stmt)
        .into_iter()
        .find_map(|(expr, candidate)| find_exact(expr, selection, candidate))
    {
        if depends_on_same_statement(stmt, expr) {
            return None;
        }
        return Some(ExtractionSite {
            statement_start: stmt.span().start,
            expression: selection,
        });
    }
    descend(stmt, selection)
}

/// Search braced blocks nested below `stmt`. Unbraced bodies are not
/// insertion points, but braced blocks inside them are.
fn descend(stmt: &Statement, selection: Span) -> Option<ExtractionSite> {
    child_statements(stmt)
        .into_iter()
        .filter(|child| child.span().contains(&selection))
        .find_map(|child| match child {
            Statement::Block(block) => find_in_block(block, selection),
            other => descend(other, selection),
        })
}

fn child_statements(stmt: &Statement) -> Vec<&Statement> {
    match stmt {
        Statement::If(stmt) => {
            let mut children = vec![stmt.consequence.as_ref()];
            children.extend(stmt.alternative.as_deref());
            children
        }
        Statement::While(stmt) => vec![stmt.body.as_ref()],
        Statement::For(stmt) => vec![stmt.body.as_ref()],
        Statement::Block(block) => block.statements.iter().collect(),
        Statement::Declaration(_)
        | Statement::Expression(_)
        | Statement::Return(_)
        | Statement::Unknown(_) => Vec::new(),
    }
}

/// Expressions evaluated once, before anything else in the statement runs,
/// each paired with whether the expression itself may be selected.
/// Loop conditions and updates re-run every iteration and are excluded. The
/// whole expression of an expression statement is not selectable: `r;` alone
/// is not a valid statement.
fn own_expressions(stmt: &Statement) -> Vec<(&Expression, bool)> {
    match stmt {
        Statement::Declaration(decl) => decl
            .declarators
            .iter()
            .filter_map(|var| var.value.as_ref())
            .map(|value| (value, true))
            .collect(),
        Statement::Expression(stmt) => vec![(&stmt.expression, false)],
        Statement::If(stmt) => vec![(&stmt.condition, true)],
        Statement::Return(stmt) => stmt.value.iter().map(|value| (value, true)).collect(),
        Statement::For(stmt) => stmt
            .initializer
            .as_deref()
            .map(own_expressions)
            .unwrap_or_default(),
        Statement::While(_) | Statement::Block(_) | Statement::Unknown(_) => Vec::new(),
    }
}

/// Find the expression whose span is exactly `selection`. Assignment targets,
/// `++`/`--` operands and invoked method groups are never candidates. The
/// right operand of `&&`/`||` runs conditionally and is not searched.
fn find_exact(expr: &Expression, selection: Span, candidate: bool) -> Option<&Expression> {
    let span = expr.span();
    if !span.contains(&selection) {
        return None;
    }
    if candidate && span == selection {
        return Some(expr);
    }
    match expr {
        Expression::Binary(binary)
            if matches!(binary.operator, BinaryOperator::And | BinaryOperator::Or) =>
        {
            find_exact(&binary.left, selection, true)
        }
        Expression::Assignment(assign) => find_exact(&assign.left, selection, false)
            .or_else(|| find_exact(&assign.right, selection, true)),
        Expression::Unary(unary) => {
            let mutates = matches!(
                unary.operator,
                UnaryOperator::Increment | UnaryOperator::Decrement
            );
            find_exact(&unary.operand, selection, !mutates)
        }
        Expression::Invocation(call) => find_exact(&call.function, selection, false).or_else(|| {
            call.arguments
                .iter()
                .find_map(|arg| find_exact(arg, selection, true))
        }),
        Expression::MemberAccess(access) => find_exact(&access.object, selection, true),
        _ => expr
            .children()
            .into_iter()
            .find_map(|child| find_exact(child, selection, true)),
    }
}

/// True if `expr` reads a name declared earlier in the same declaration
/// statement (`int a = 1, b = a + 1;`) or `for` initializer, which would not
/// be in scope yet.
fn depends_on_same_statement(stmt: &Statement, expr: &Expression) -> bool {
    let decl = match stmt {
        Statement::Declaration(decl) => decl,
        Statement::For(stmt) => match stmt.initializer.as_deref() {
            Some(Statement::Declaration(decl)) => decl,
            _ => return false,
        },
        _ => return false,
    };
    let span = expr.span();
    let earlier: Vec<&str> = decl
        .declarators
        .iter()
        .filter(|var| var.span.end <= span.start)
        .map(|var| var.name.name.as_str())
        .collect();
    if earlier.is_empty() {
        return false;
    }
    let mut found = false;
    walk_expression(expr, &mut |event| {
        if let Visit::Reference(id) = event
            && earlier.contains(&id.name.as_str())
        {
            found = true;
        }
    });
    found
}
