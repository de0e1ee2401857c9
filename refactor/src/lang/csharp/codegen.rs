//! UAST → C# source text.
//!
//! Output is normalised (K&R braces, one indent unit per level). Opaque nodes
//! are emitted verbatim.

use crate::uast::{
    Block, ClassDef, DeclStmt, Expression, FunctionBody, FunctionDef, Literal, ModuleDef,
    Statement, TopLevel,
};

pub struct CSharpCodeGenerator {
    indent_level: usize,
    indent_string: String,
}

impl CSharpCodeGenerator {
    pub fn new(indent_string: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent_string.to_string(),
        }
    }

    fn indent(&self) -> String {
        self.indent_string.repeat(self.indent_level)
    }

    pub fn generate(&mut self, node: &TopLevel) -> String {
        match node {
            TopLevel::Module(module) => self.generate_module(module),
            TopLevel::Class(class) => self.generate_class(class),
            TopLevel::Function(function) => self.generate_function(function),
            TopLevel::Statement(stmt) => self.generate_statement(stmt),
            TopLevel::Unknown(opaque) => opaque.source.clone(),
        }
    }

    fn generate_module(&mut self, module: &ModuleDef) -> String {
        let Some(name) = &module.name else {
            return module
                .body
                .iter()
                .map(|item| self.generate(item))
                .collect::<Vec<_>>()
                .join("\n");
        };

        let mut output = format!("namespace {name} {{\n");
        self.push_members(&mut output, &module.body);
        output.push_str(&self.indent());
        output.push('}');
        output
    }

    fn generate_class(&mut self, class: &ClassDef) -> String {
        let mut output = modifiers_prefix(&class.modifiers);
        output.push_str(&class.keyword);
        output.push(' ');
        output.push_str(&class.name);
        output.push_str(" {\n");
        self.push_members(&mut output, &class.body);
        output.push_str(&self.indent());
        output.push('}');
        output
    }

    fn push_members(&mut self, output: &mut String, members: &[TopLevel]) {
        self.indent_level += 1;
        for member in members {
            output.push_str(&self.indent());
            output.push_str(&self.generate(member));
            output.push('\n');
        }
        self.indent_level -= 1;
    }

    fn generate_function(&mut self, function: &FunctionDef) -> String {
        let mut output = modifiers_prefix(&function.modifiers);
        if let Some(return_type) = &function.return_type {
            output.push_str(return_type);
            output.push(' ');
        }
        output.push_str(&function.name);
        output.push('(');
        let params: Vec<String> = function
            .parameters
            .iter()
            .map(|param| match &param.var_type {
                Some(ty) => format!("{ty} {}", param.name.name),
                None => param.name.name.clone(),
            })
            .collect();
        output.push_str(&params.join(", "));
        output.push(')');

        match &function.body {
            Some(FunctionBody::Block(block)) => {
                output.push(' ');
                output.push_str(&self.generate_block(block));
            }
            Some(FunctionBody::Expression(expr)) => {
                output.push_str(" => ");
                output.push_str(&generate_expression(expr));
                output.push(';');
            }
            None => output.push(';'),
        }
        output
    }

    fn generate_block(&mut self, block: &Block) -> String {
        let mut output = String::from("{\n");
        self.indent_level += 1;
        for stmt in &block.statements {
            output.push_str(&self.indent());
            output.push_str(&self.generate_statement(stmt));
            output.push('\n');
        }
        self.indent_level -= 1;
        output.push_str(&self.indent());
        output.push('}');
        output
    }

    fn generate_statement(&mut self, stmt: &Statement) -> String {
        match stmt {
            Statement::Declaration(decl) => {
                let mut output = modifiers_prefix(&decl.modifiers);
                output.push_str(&declaration(decl));
                output.push(';');
                output
            }
            Statement::Expression(stmt) => format!("{};", generate_expression(&stmt.expression)),
            Statement::If(stmt) => {
                let mut output = format!("if ({}) ", generate_expression(&stmt.condition));
                output.push_str(&self.generate_statement(&stmt.consequence));
                if let Some(alternative) = &stmt.alternative {
                    output.push_str(" else ");
                    output.push_str(&self.generate_statement(alternative));
                }
                output
            }
            Statement::While(stmt) => format!(
                "while ({}) {}",
                generate_expression(&stmt.condition),
                self.generate_statement(&stmt.body)
            ),
            Statement::For(stmt) => {
                let initializer = match stmt.initializer.as_deref() {
                    Some(Statement::Declaration(decl)) => declaration(decl),
                    Some(Statement::Expression(init)) => generate_expression(&init.expression),
                    Some(other) => self.generate_statement(other),
                    None => String::new(),
                };
                let condition = stmt
                    .condition
                    .as_ref()
                    .map(generate_expression)
                    .unwrap_or_default();
                let update: Vec<String> = stmt.update.iter().map(generate_expression).collect();
                format!(
                    "for ({initializer}; {condition}; {}) {}",
                    update.join(", "),
                    self.generate_statement(&stmt.body)
                )
            }
            Statement::Return(stmt) => match &stmt.value {
                Some(value) => format!("return {};", generate_expression(value)),
                None => "return;".to_string(),
            },
            Statement::Block(block) => self.generate_block(block),
            Statement::Unknown(opaque) => opaque.source.clone(),
        }
    }
}

fn modifiers_prefix(modifiers: &[String]) -> String {
    if modifiers.is_empty() {
        return String::new();
    }
    format!("{} ", modifiers.join(" "))
}

/// `type a = 1, b` without the trailing semicolon.
fn declaration(decl: &DeclStmt) -> String {
    let declarators: Vec<String> = decl
        .declarators
        .iter()
        .map(|var| match &var.value {
            Some(value) => format!("{} = {}", var.name.name, generate_expression(value)),
            None => var.name.name.clone(),
        })
        .collect();
    format!(
        "{} {}",
        decl.var_type.as_deref().unwrap_or("var"),
        declarators.join(", ")
    )
}

pub fn generate_expression(expr: &Expression) -> String {
    match expr {
        Expression::Identifier(ident) => ident.name.clone(),
        Expression::Literal(literal, _) => match literal {
            Literal::Integer(value) => value.to_string(),
            // Debug keeps the decimal point (`1000.0`, not `1000`).
            Literal::Float(value) => format!("{value:?}"),
            Literal::String(value) => format!("\"{value}\""),
            Literal::Boolean(value) => value.to_string(),
            Literal::Null => "null".to_string(),
        },
        Expression::Binary(binary) => format!(
            "{} {} {}",
            generate_expression(&binary.left),
            binary.operator.as_str(),
            generate_expression(&binary.right)
        ),
        Expression::Unary(unary) => {
            let operand = generate_expression(&unary.operand);
            if unary.prefix {
                format!("{}{operand}", unary.operator.as_str())
            } else {
                format!("{operand}{}", unary.operator.as_str())
            }
        }
        Expression::Assignment(assign) => format!(
            "{} {} {}",
            generate_expression(&assign.left),
            assign.operator.as_str(),
            generate_expression(&assign.right)
        ),
        Expression::Invocation(call) => {
            let arguments: Vec<String> = call.arguments.iter().map(generate_expression).collect();
            format!(
                "{}({})",
                generate_expression(&call.function),
                arguments.join(", ")
            )
        }
        Expression::MemberAccess(access) => format!(
            "{}.{}",
            generate_expression(&access.object),
            access.member.name
        ),
        Expression::Parenthesized(paren) => format!("({})", generate_expression(&paren.inner)),
        Expression::Raw(opaque) => opaque.source.clone(),
    }
}
