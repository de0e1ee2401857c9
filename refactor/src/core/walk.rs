//! Depth-first traversal reporting every variable name in a UAST.

use crate::uast::{
    Block, Expression, FunctionBody, FunctionDef, Ident, Opaque, Span, Statement, TopLevel,
};

/// Events emitted by [`walk`], in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit<'a> {
    /// Start of a name scope: a function, or the top level of a compilation unit.
    EnterScope { name: &'a str, span: Span },
    ExitScope,
    /// A parameter, declarator or field name.
    Declaration(&'a Ident),
    /// Any other use of a name, including identifiers inside opaque nodes.
    Reference(&'a Ident),
}

pub const TOP_LEVEL_SCOPE: &str = "<top-level>";

pub fn walk<'a>(node: &'a TopLevel, visit: &mut impl FnMut(Visit<'a>)) {
    match node {
        TopLevel::Module(module) if module.name.is_none() => {
            visit(Visit::EnterScope {
                name: TOP_LEVEL_SCOPE,
                span: module.span,
            });
            for item in &module.body {
                walk(item, visit);
            }
            visit(Visit::ExitScope);
        }
        TopLevel::Module(module) => {
            for item in &module.body {
                walk(item, visit);
            }
        }
        TopLevel::Class(class) => {
            for item in &class.body {
                walk(item, visit);
            }
        }
        TopLevel::Function(function) => walk_function(function, visit),
        TopLevel::Statement(stmt) => walk_statement(stmt, visit),
        TopLevel::Unknown(opaque) => walk_opaque(opaque, visit),
    }
}

fn walk_function<'a>(function: &'a FunctionDef, visit: &mut impl FnMut(Visit<'a>)) {
    visit(Visit::EnterScope {
        name: &function.name,
        span: function.span,
    });
    for param in &function.parameters {
        visit(Visit::Declaration(&param.name));
    }
    match &function.body {
        Some(FunctionBody::Block(block)) => walk_block(block, visit),
        Some(FunctionBody::Expression(expr)) => walk_expression(expr, visit),
        None => {}
    }
    visit(Visit::ExitScope);
}

fn walk_block<'a>(block: &'a Block, visit: &mut impl FnMut(Visit<'a>)) {
    for stmt in &block.statements {
        walk_statement(stmt, visit);
    }
}

pub fn walk_statement<'a>(stmt: &'a Statement, visit: &mut impl FnMut(Visit<'a>)) {
    match stmt {
        Statement::Declaration(decl) => {
            for var in &decl.declarators {
                visit(Visit::Declaration(&var.name));
                if let Some(value) = &var.value {
                    walk_expression(value, visit);
                }
            }
        }
        Statement::Expression(stmt) => walk_expression(&stmt.expression, visit),
        Statement::If(stmt) => {
            walk_expression(&stmt.condition, visit);
            walk_statement(&stmt.consequence, visit);
            if let Some(alternative) = &stmt.alternative {
                walk_statement(alternative, visit);
            }
        }
        Statement::While(stmt) => {
            walk_expression(&stmt.condition, visit);
            walk_statement(&stmt.body, visit);
        }
        Statement::For(stmt) => {
            if let Some(initializer) = &stmt.initializer {
                walk_statement(initializer, visit);
            }
            if let Some(condition) = &stmt.condition {
                walk_expression(condition, visit);
            }
            for update in &stmt.update {
                walk_expression(update, visit);
            }
            walk_statement(&stmt.body, visit);
        }
        Statement::Return(stmt) => {
            if let Some(value) = &stmt.value {
                walk_expression(value, visit);
            }
        }
        Statement::Block(block) => walk_block(block, visit),
        Statement::Unknown(opaque) => walk_opaque(opaque, visit),
    }
}

pub fn walk_expression<'a>(expr: &'a Expression, visit: &mut impl FnMut(Visit<'a>)) {
    match expr {
        Expression::Identifier(id) => visit(Visit::Reference(id)),
        Expression::Raw(opaque) => walk_opaque(opaque, visit),
        _ => {
            for child in expr.children() {
                walk_expression(child, visit);
            }
        }
    }
}

fn walk_opaque<'a>(opaque: &'a Opaque, visit: &mut impl FnMut(Visit<'a>)) {
    for id in &opaque.declarations {
        visit(Visit::Declaration(id));
    }
    for id in &opaque.identifiers {
        visit(Visit::Reference(id));
    }
}
