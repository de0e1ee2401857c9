//! Language-neutral syntax tree produced by the language lowerings.
//!
//! Every node records the byte span it was lowered from so refactorings can
//! emit edits against the original text instead of regenerating it.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `other` lies entirely within `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A name together with the exact location it was written at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// A node the lowering does not model. Keeps its text verbatim and the
/// identifiers found inside it so name-based refactorings still reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opaque {
    pub source: String,
    pub span: Span,
    /// Names the node declares (field declarators).
    pub declarations: Vec<Ident>,
    pub identifiers: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopLevel {
    Module(ModuleDef),
    Class(ClassDef),
    Function(FunctionDef),
    Statement(Statement),
    Unknown(Opaque),
}

impl TopLevel {
    pub fn span(&self) -> Span {
        match self {
            TopLevel::Module(module) => module.span,
            TopLevel::Class(class) => class.span,
            TopLevel::Function(function) => function.span,
            TopLevel::Statement(stmt) => stmt.span(),
            TopLevel::Unknown(opaque) => opaque.span,
        }
    }
}

/// A compilation unit (`name = None`) or a namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDef {
    pub name: Option<String>,
    pub body: Vec<TopLevel>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    /// Declaration keyword as written (`class`, `struct`, `record struct`, ...).
    pub keyword: String,
    pub modifiers: Vec<String>,
    pub body: Vec<TopLevel>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub modifiers: Vec<String>,
    pub return_type: Option<String>,
    pub parameters: Vec<Param>,
    pub body: Option<FunctionBody>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: Ident,
    pub var_type: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionBody {
    Block(Block),
    /// Expression-bodied member (`=> expr;`).
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Declaration(DeclStmt),
    Expression(ExpressionStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Block(Block),
    Unknown(Opaque),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Declaration(decl) => decl.span,
            Statement::Expression(stmt) => stmt.span,
            Statement::If(stmt) => stmt.span,
            Statement::While(stmt) => stmt.span,
            Statement::For(stmt) => stmt.span,
            Statement::Return(stmt) => stmt.span,
            Statement::Block(block) => block.span,
            Statement::Unknown(opaque) => opaque.span,
        }
    }
}

/// `[modifiers] type a = 1, b;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclStmt {
    pub modifiers: Vec<String>,
    pub var_type: Option<String>,
    pub declarators: Vec<VarDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: Ident,
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStmt {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Expression,
    pub consequence: Box<Statement>,
    pub alternative: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub initializer: Option<Box<Statement>>,
    pub condition: Option<Expression>,
    pub update: Vec<Expression>,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Identifier(Ident),
    Literal(Literal, Span),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Assignment(AssignmentExpr),
    Invocation(InvocationExpr),
    MemberAccess(MemberAccessExpr),
    Parenthesized(ParenthesizedExpr),
    Raw(Opaque),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(ident) => ident.span,
            Expression::Literal(_, span) => *span,
            Expression::Binary(expr) => expr.span,
            Expression::Unary(expr) => expr.span,
            Expression::Assignment(expr) => expr.span,
            Expression::Invocation(expr) => expr.span,
            Expression::MemberAccess(expr) => expr.span,
            Expression::Parenthesized(expr) => expr.span,
            Expression::Raw(opaque) => opaque.span,
        }
    }

    /// Direct sub-expressions in source order.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Binary(expr) => vec![&expr.left, &expr.right],
            Expression::Unary(expr) => vec![&expr.operand],
            Expression::Assignment(expr) => vec![&expr.left, &expr.right],
            Expression::Invocation(expr) => {
                let mut children = vec![expr.function.as_ref()];
                children.extend(expr.arguments.iter());
                children
            }
            Expression::MemberAccess(expr) => vec![&expr.object],
            Expression::Parenthesized(expr) => vec![&expr.inner],
            Expression::Identifier(_) | Expression::Literal(..) | Expression::Raw(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    /// String contents without the surrounding quotes, escapes untouched.
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanEqual,
    LessThanEqual,
    And,
    Or,
}

impl BinaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Rem,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            ">" => BinaryOperator::GreaterThan,
            "<" => BinaryOperator::LessThan,
            ">=" => BinaryOperator::GreaterThanEqual,
            "<=" => BinaryOperator::LessThanEqual,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::LessThanEqual => "<=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
    Increment,
    Decrement,
}

impl UnaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "-" => UnaryOperator::Negate,
            "+" => UnaryOperator::Plus,
            "!" => UnaryOperator::Not,
            "++" => UnaryOperator::Increment,
            "--" => UnaryOperator::Decrement,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "!",
            UnaryOperator::Increment => "++",
            UnaryOperator::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignmentOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "=" => AssignmentOperator::Assign,
            "+=" => AssignmentOperator::AddAssign,
            "-=" => AssignmentOperator::SubAssign,
            "*=" => AssignmentOperator::MulAssign,
            "/=" => AssignmentOperator::DivAssign,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubAssign => "-=",
            AssignmentOperator::MulAssign => "*=",
            AssignmentOperator::DivAssign => "/=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    /// `++x` vs `x++`.
    pub prefix: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentExpr {
    pub left: Box<Expression>,
    pub operator: AssignmentOperator,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationExpr {
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

/// `object.member`. The member is a name, not a variable reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccessExpr {
    pub object: Box<Expression>,
    pub member: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenthesizedExpr {
    pub inner: Box<Expression>,
    pub span: Span,
}
