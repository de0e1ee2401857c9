//! Lowering from the tree-sitter C# concrete syntax tree to the UAST.
//!
//! Unsupported node kinds become [`Opaque`] nodes rather than errors: the
//! refactorings work on byte spans, so anything not modelled here is carried
//! through untouched.

use tree_sitter::Node;

use crate::uast::{
    AssignmentExpr, AssignmentOperator, BinaryExpr, BinaryOperator, Block, ClassDef, DeclStmt,
    Expression, ExpressionStmt, ForStmt, FunctionBody, FunctionDef, Ident, IfStmt,
    InvocationExpr, Literal, MemberAccessExpr, ModuleDef, Opaque, Param, ParenthesizedExpr,
    ReturnStmt, Span, Statement, TopLevel, UnaryExpr, UnaryOperator, VarDecl, WhileStmt,
};

const TYPE_DECLARATIONS: [&str; 4] = [
    "class_declaration",
    "struct_declaration",
    "record_declaration",
    "interface_declaration",
];

/// Lower a whole `compilation_unit` into an unnamed module.
pub fn lower_compilation_unit(node: Node<'_>, source: &str) -> TopLevel {
    TopLevel::Module(ModuleDef {
        name: None,
        body: lower_members(node, source),
        span: span_of(node),
    })
}

pub fn lower_top_level(node: Node<'_>, source: &str) -> TopLevel {
    match node.kind() {
        kind if TYPE_DECLARATIONS.contains(&kind) => lower_type_declaration(node, source),
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            let name = node
                .child_by_field_name("name")
                .map(|name| text(name, source).to_string());
            let body = match node.child_by_field_name("body") {
                Some(body) => lower_members(body, source),
                None => lower_members_except(node, source, node.child_by_field_name("name")),
            };
            TopLevel::Module(ModuleDef {
                name,
                body,
                span: span_of(node),
            })
        }
        "method_declaration" | "constructor_declaration" | "local_function_statement" => {
            lower_function(node, source)
        }
        "global_statement" => match node.named_child(0) {
            Some(child) => TopLevel::Statement(lower_statement(child, source)),
            None => TopLevel::Unknown(opaque(node, source)),
        },
        _ => TopLevel::Unknown(opaque(node, source)),
    }
}

fn lower_members(node: Node<'_>, source: &str) -> Vec<TopLevel> {
    lower_members_except(node, source, None)
}

fn lower_members_except(node: Node<'_>, source: &str, skip: Option<Node<'_>>) -> Vec<TopLevel> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| Some(*child) != skip)
        .map(|child| lower_top_level(child, source))
        .collect()
}

fn lower_type_declaration(node: Node<'_>, source: &str) -> TopLevel {
    let Some(name) = node.child_by_field_name("name") else {
        return TopLevel::Unknown(opaque(node, source));
    };
    let body = node
        .child_by_field_name("body")
        .map(|body| lower_members(body, source))
        .unwrap_or_default();
    TopLevel::Class(ClassDef {
        name: text(name, source).to_string(),
        keyword: type_keyword(node),
        modifiers: extract_modifiers(node, source),
        body,
        span: span_of(node),
    })
}

/// Keyword tokens ahead of the type name: `class`, `struct`, `interface`,
/// `record` or `record struct`.
fn type_keyword(node: Node<'_>) -> String {
    let mut cursor = node.walk();
    let keywords: Vec<&str> = node
        .children(&mut cursor)
        .filter(|child| !child.is_named())
        .map(|child| child.kind())
        .filter(|kind| matches!(*kind, "class" | "struct" | "record" | "interface"))
        .collect();
    if keywords.is_empty() {
        node.kind().trim_end_matches("_declaration").to_string()
    } else {
        keywords.join(" ")
    }
}

fn lower_function(node: Node<'_>, source: &str) -> TopLevel {
    let Some(name) = node.child_by_field_name("name") else {
        return TopLevel::Unknown(opaque(node, source));
    };
    let return_type = node
        .child_by_field_name("type")
        .or_else(|| node.child_by_field_name("returns"))
        .map(|ty| text(ty, source).to_string());

    let body = node
        .child_by_field_name("body")
        .and_then(|body| match body.kind() {
            "block" => Some(FunctionBody::Block(lower_block(body, source))),
            "arrow_expression_clause" => body
                .named_child(0)
                .map(|expr| FunctionBody::Expression(lower_expression(expr, source))),
            _ => None,
        });

    TopLevel::Function(FunctionDef {
        name: text(name, source).to_string(),
        modifiers: extract_modifiers(node, source),
        return_type,
        parameters: extract_parameters(node, source),
        body,
        span: span_of(node),
    })
}

fn extract_modifiers(node: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == "modifier")
        .map(|child| text(child, source).to_string())
        .collect()
}

fn extract_parameters(node: Node<'_>, source: &str) -> Vec<Param> {
    let Some(list) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|child| child.kind() == "parameter")
        .filter_map(|param| {
            let name = param.child_by_field_name("name")?;
            Some(Param {
                name: ident(name, source),
                var_type: param
                    .child_by_field_name("type")
                    .map(|ty| text(ty, source).to_string()),
                span: span_of(param),
            })
        })
        .collect()
}

pub fn lower_block(node: Node<'_>, source: &str) -> Block {
    let mut cursor = node.walk();
    let statements = node
        .named_children(&mut cursor)
        .map(|child| lower_statement(child, source))
        .collect();
    Block {
        statements,
        span: span_of(node),
    }
}

pub fn lower_statement(node: Node<'_>, source: &str) -> Statement {
    let lowered = match node.kind() {
        "global_statement" => node
            .named_child(0)
            .map(|child| lower_statement(child, source)),
        "block" => Some(Statement::Block(lower_block(node, source))),
        "local_declaration_statement" => lower_local_declaration(node, source),
        "expression_statement" => node.named_child(0).map(|expr| {
            Statement::Expression(ExpressionStmt {
                expression: lower_expression(expr, source),
                span: span_of(node),
            })
        }),
        "if_statement" => lower_if(node, source),
        "while_statement" => lower_while(node, source),
        "for_statement" => lower_for(node, source),
        "return_statement" => Some(Statement::Return(ReturnStmt {
            value: node
                .named_child(0)
                .map(|value| lower_expression(value, source)),
            span: span_of(node),
        })),
        _ => None,
    };
    lowered.unwrap_or_else(|| Statement::Unknown(opaque(node, source)))
}

fn lower_local_declaration(node: Node<'_>, source: &str) -> Option<Statement> {
    let mut cursor = node.walk();
    let declaration = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "variable_declaration")?;
    let mut decl = lower_variable_declaration(declaration, source)?;
    decl.modifiers = extract_modifiers(node, source);
    decl.span = span_of(node);
    Some(Statement::Declaration(decl))
}

/// Lower a `variable_declaration` (`type a = 1, b`). The span covers only the
/// declaration itself; statement-level callers widen it.
fn lower_variable_declaration(node: Node<'_>, source: &str) -> Option<DeclStmt> {
    let var_type = node
        .child_by_field_name("type")
        .map(|ty| text(ty, source).to_string());

    let mut cursor = node.walk();
    let declarators: Vec<VarDecl> = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "variable_declarator")
        .map(|declarator| lower_declarator(declarator, source))
        .collect::<Option<_>>()?;
    if declarators.is_empty() {
        return None;
    }

    Some(DeclStmt {
        modifiers: Vec::new(),
        var_type,
        declarators,
        span: span_of(node),
    })
}

fn lower_declarator(node: Node<'_>, source: &str) -> Option<VarDecl> {
    let name = node.child_by_field_name("name").or_else(|| {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .find(|child| child.kind() == "identifier")
    })?;

    let mut cursor = node.walk();
    let value = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "equals_value_clause")
        .and_then(|clause| clause.named_child(0))
        .map(|value| lower_expression(value, source));

    Some(VarDecl {
        name: ident(name, source),
        value,
        span: span_of(node),
    })
}

fn lower_if(node: Node<'_>, source: &str) -> Option<Statement> {
    let condition = node.child_by_field_name("condition")?;
    let consequence = node.child_by_field_name("consequence")?;
    let alternative = node
        .child_by_field_name("alternative")
        .map(|alt| Box::new(lower_statement(alt, source)));
    Some(Statement::If(IfStmt {
        condition: lower_expression(condition, source),
        consequence: Box::new(lower_statement(consequence, source)),
        alternative,
        span: span_of(node),
    }))
}

fn lower_while(node: Node<'_>, source: &str) -> Option<Statement> {
    let condition = node
        .child_by_field_name("condition")
        .or_else(|| node.named_child(0))?;
    let body = node
        .child_by_field_name("body")
        .or_else(|| node.named_child(1))?;
    Some(Statement::While(WhileStmt {
        condition: lower_expression(condition, source),
        body: Box::new(lower_statement(body, source)),
        span: span_of(node),
    }))
}

/// `for (init; cond; update) body`, decoded positionally from the `;` and `)`
/// tokens so it does not depend on grammar field names.
fn lower_for(node: Node<'_>, source: &str) -> Option<Statement> {
    let mut sections: [Vec<Node<'_>>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut section = 0;
    let mut in_header = false;
    let mut body = None;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "(" if !in_header && body.is_none() => in_header = true,
            ";" if in_header => section = (section + 1).min(2),
            ")" if in_header => in_header = false,
            "comment" => {}
            _ if in_header && child.is_named() => sections[section].push(child),
            _ if !in_header && child.is_named() && section == 2 => body = Some(child),
            _ => {}
        }
    }
    let [initializer, condition, update] = sections;

    let initializer = match initializer.as_slice() {
        [] => None,
        [single] if single.kind() == "variable_declaration" => {
            Some(Statement::Declaration(lower_variable_declaration(*single, source)?))
        }
        [single] => Some(Statement::Expression(ExpressionStmt {
            expression: lower_expression(*single, source),
            span: span_of(*single),
        })),
        _ => return None,
    };
    let condition = match condition.as_slice() {
        [] => None,
        [single] => Some(lower_expression(*single, source)),
        _ => return None,
    };

    Some(Statement::For(ForStmt {
        initializer: initializer.map(Box::new),
        condition,
        update: update
            .iter()
            .map(|expr| lower_expression(*expr, source))
            .collect(),
        body: Box::new(lower_statement(body?, source)),
        span: span_of(node),
    }))
}

pub fn lower_expression(node: Node<'_>, source: &str) -> Expression {
    lower_expression_opt(node, source).unwrap_or_else(|| Expression::Raw(opaque(node, source)))
}

fn lower_expression_opt(node: Node<'_>, source: &str) -> Option<Expression> {
    let span = span_of(node);
    let expr = match node.kind() {
        "identifier" => Expression::Identifier(ident(node, source)),
        "integer_literal" | "real_literal" | "string_literal" | "boolean_literal"
        | "null_literal" => Expression::Literal(lower_literal(node, source)?, span),
        "binary_expression" => {
            let left = node.child_by_field_name("left")?;
            let right = node.child_by_field_name("right")?;
            let operator = node
                .child_by_field_name("operator")
                .map(|op| text(op, source))
                .or_else(|| token_between(node, left, right, source))?;
            Expression::Binary(BinaryExpr {
                left: Box::new(lower_expression(left, source)),
                operator: BinaryOperator::from_token(operator)?,
                right: Box::new(lower_expression(right, source)),
                span,
            })
        }
        "assignment_expression" => {
            let left = node.child_by_field_name("left")?;
            let right = node.child_by_field_name("right")?;
            let operator = node
                .child_by_field_name("operator")
                .map(|op| text(op, source))
                .or_else(|| token_between(node, left, right, source))?;
            Expression::Assignment(AssignmentExpr {
                left: Box::new(lower_expression(left, source)),
                operator: AssignmentOperator::from_token(operator)?,
                right: Box::new(lower_expression(right, source)),
                span,
            })
        }
        "prefix_unary_expression" | "postfix_unary_expression" => {
            let prefix = node.kind() == "prefix_unary_expression";
            let operand = node.named_child(0)?;
            let operator = if prefix {
                node.child(0)?
            } else {
                node.child(node.child_count().checked_sub(1)?)?
            };
            if operator == operand {
                return None;
            }
            Expression::Unary(UnaryExpr {
                operator: UnaryOperator::from_token(text(operator, source))?,
                operand: Box::new(lower_expression(operand, source)),
                prefix,
                span,
            })
        }
        "invocation_expression" => {
            let function = node.child_by_field_name("function")?;
            let arguments = match node.child_by_field_name("arguments") {
                Some(list) => lower_arguments(list, source),
                None => Vec::new(),
            };
            Expression::Invocation(InvocationExpr {
                function: Box::new(lower_expression(function, source)),
                arguments,
                span,
            })
        }
        "member_access_expression" => {
            let object = node.child_by_field_name("expression")?;
            let member = node.child_by_field_name("name")?;
            Expression::MemberAccess(MemberAccessExpr {
                object: Box::new(lower_expression(object, source)),
                member: ident(member, source),
                span,
            })
        }
        "parenthesized_expression" => Expression::Parenthesized(ParenthesizedExpr {
            inner: Box::new(lower_expression(node.named_child(0)?, source)),
            span,
        }),
        _ => return None,
    };
    Some(expr)
}

/// Plain positional arguments lower to their expression; named, `ref` and
/// `out` arguments stay opaque so their prefix survives code generation.
fn lower_arguments(list: Node<'_>, source: &str) -> Vec<Expression> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|arg| arg.kind() == "argument")
        .map(|arg| match (arg.child_count(), arg.named_child(0)) {
            (1, Some(expr)) => lower_expression(expr, source),
            _ => Expression::Raw(opaque(arg, source)),
        })
        .collect()
}

fn lower_literal(node: Node<'_>, source: &str) -> Option<Literal> {
    let raw = text(node, source);
    let literal = match node.kind() {
        "integer_literal" => Literal::Integer(raw.replace('_', "").parse().ok()?),
        "real_literal" => {
            let cleaned = raw.replace('_', "");
            if cleaned.ends_with(|ch: char| ch.is_ascii_alphabetic()) {
                return None;
            }
            Literal::Float(cleaned.parse().ok()?)
        }
        "string_literal" => {
            let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
            Literal::String(inner.to_string())
        }
        "boolean_literal" => match raw {
            "true" => Literal::Boolean(true),
            "false" => Literal::Boolean(false),
            _ => return None,
        },
        "null_literal" => Literal::Null,
        _ => return None,
    };
    Some(literal)
}

/// Text of the first token lying between `left` and `right`.
fn token_between<'s>(
    node: Node<'_>,
    left: Node<'_>,
    right: Node<'_>,
    source: &'s str,
) -> Option<&'s str> {
    let mut cursor = node.walk();
    let token = node
        .children(&mut cursor)
        .find(|child| child.start_byte() >= left.end_byte() && child.end_byte() <= right.start_byte())?;
    Some(text(token, source).trim())
}

fn opaque(node: Node<'_>, source: &str) -> Opaque {
    let mut identifiers = Vec::new();
    collect_identifiers(node, source, &mut identifiers);
    let declarations = field_names(node, source);
    identifiers.retain(|id| !declarations.contains(id));
    Opaque {
        source: text(node, source).to_string(),
        span: span_of(node),
        declarations,
        identifiers,
    }
}

/// Declarator names of a field declaration (`int a = 1, b;` declares `a`
/// and `b`). Empty for any other node.
fn field_names(node: Node<'_>, source: &str) -> Vec<Ident> {
    if !matches!(node.kind(), "field_declaration" | "event_field_declaration") {
        return Vec::new();
    }
    let mut cursor = node.walk();
    let Some(declaration) = node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "variable_declaration")
    else {
        return Vec::new();
    };
    let mut cursor = declaration.walk();
    declaration
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "variable_declarator")
        .filter_map(|declarator| lower_declarator(declarator, source))
        .map(|var| var.name)
        .collect()
}

/// Collect `identifier` tokens below `node` that may name a variable.
///
/// Skipped: member names (`x.Length`, `x?.Length`), argument labels
/// (`count:`), object initializer targets (`Count =` in `new P { Count = 1 }`)
/// and anything inside a syntax error.
fn collect_identifiers(node: Node<'_>, source: &str, out: &mut Vec<Ident>) {
    if node.is_error() || node.is_missing() {
        return;
    }
    if node.kind() == "identifier" {
        if !is_non_variable_name(node) {
            out.push(ident(node, source));
        }
        return;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    for child in children {
        collect_identifiers(child, source, out);
    }
}

fn is_non_variable_name(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "member_access_expression" => parent.child_by_field_name("name") == Some(node),
        "member_binding_expression" | "name_colon" => true,
        "assignment_expression" => {
            parent.child_by_field_name("left") == Some(node)
                && parent
                    .parent()
                    .is_some_and(|grand| grand.kind() == "initializer_expression")
        }
        _ => false,
    }
}

fn ident(node: Node<'_>, source: &str) -> Ident {
    Ident {
        name: text(node, source).to_string(),
        span: span_of(node),
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

fn span_of(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}
