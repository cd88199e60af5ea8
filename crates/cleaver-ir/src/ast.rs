use std::collections::BTreeMap;
use std::fmt;

/// Byte span of a declaration in the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Program-level positional and info metadata, preserved verbatim by every
/// transformation that rebuilds a program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgramMeta {
    /// Name of the source unit the program was parsed from.
    pub source_name: String,
    /// Span of the whole program in that source.
    pub span: Span,
    /// Free-form info attached by earlier pipeline stages.
    pub info: Option<String>,
}

/// A type of the intermediate language.
///
/// Domain instantiations carry an ordered assignment of the domain's type
/// variables, so two instantiations of the same domain at different argument
/// types are distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    Int,
    Bool,
    Perm,
    Ref,
    Seq(Box<Type>),
    Set(Box<Type>),
    Domain {
        name: String,
        type_args: BTreeMap<String, Type>,
    },
    TypeVar(String),
}

impl Type {
    /// Convenience constructor for a domain instantiation.
    pub fn domain(name: impl Into<String>, type_args: BTreeMap<String, Type>) -> Self {
        Type::Domain {
            name: name.into(),
            type_args,
        }
    }
}

/// A typed local variable, at declaration or use site.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    pub name: String,
    pub typ: Type,
}

impl LocalVar {
    pub fn new(name: impl Into<String>, typ: Type) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Implies,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Exp {
    IntLit(i64),
    BoolLit(bool),
    NullLit,
    Local(LocalVar),
    Unary {
        op: UnOp,
        exp: Box<Exp>,
    },
    Binary {
        op: BinOp,
        left: Box<Exp>,
        right: Box<Exp>,
    },
    Cond {
        cond: Box<Exp>,
        then_exp: Box<Exp>,
        else_exp: Box<Exp>,
    },
    Old(Box<Exp>),
    /// Application of a top-level (heap-dependent) function.
    FuncApp {
        function: String,
        args: Vec<Exp>,
        typ: Type,
    },
    /// Application of a domain function.
    DomainFuncApp {
        function: String,
        args: Vec<Exp>,
        typ: Type,
    },
    FieldAccess {
        receiver: Box<Exp>,
        field: String,
        typ: Type,
    },
    /// Bare predicate instance, e.g. as the body of an `acc`.
    PredicateAccess {
        predicate: String,
        args: Vec<Exp>,
    },
    /// Accessibility predicate `acc(loc)` or `acc(loc, perm)`.
    Acc {
        loc: Box<Exp>,
        perm: Option<Box<Exp>>,
    },
    /// `unfolding P(args) in body`: requires the predicate's full body.
    Unfolding {
        predicate: String,
        args: Vec<Exp>,
        body: Box<Exp>,
    },
    Forall {
        vars: Vec<LocalVar>,
        triggers: Vec<Vec<Exp>>,
        body: Box<Exp>,
    },
    Exists {
        vars: Vec<LocalVar>,
        body: Box<Exp>,
    },
    LetIn {
        var: LocalVar,
        exp: Box<Exp>,
        body: Box<Exp>,
    },
}

/// Statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block {
        decls: Vec<LocalVar>,
        stmts: Vec<Stmt>,
    },
    Assign {
        target: LocalVar,
        rhs: Exp,
    },
    FieldAssign {
        receiver: Exp,
        field: String,
        rhs: Exp,
    },
    /// Method call `targets := method(args)`.
    Call {
        method: String,
        args: Vec<Exp>,
        targets: Vec<LocalVar>,
    },
    Fold {
        predicate: String,
        args: Vec<Exp>,
    },
    Unfold {
        predicate: String,
        args: Vec<Exp>,
    },
    Inhale(Exp),
    Exhale(Exp),
    Assert(Exp),
    Assume(Exp),
    If {
        cond: Exp,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Exp,
        invariants: Vec<Exp>,
        body: Box<Stmt>,
    },
}

impl Stmt {
    /// An empty block, the unit of statement composition.
    pub fn skip() -> Stmt {
        Stmt::Block {
            decls: Vec::new(),
            stmts: Vec::new(),
        }
    }
}

/// A method: imperative body plus pre/postcondition contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub formal_args: Vec<LocalVar>,
    pub formal_returns: Vec<LocalVar>,
    pub pres: Vec<Exp>,
    pub posts: Vec<Exp>,
    /// `None` for abstract methods (contract only).
    pub body: Option<Stmt>,
}

/// A heap-dependent function.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub formal_args: Vec<LocalVar>,
    pub typ: Type,
    pub pres: Vec<Exp>,
    pub posts: Vec<Exp>,
    /// `None` for abstract functions.
    pub body: Option<Exp>,
}

/// A predicate: named, possibly abstract, assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub name: String,
    pub formal_args: Vec<LocalVar>,
    /// `None` for abstract predicates (signature only).
    pub body: Option<Exp>,
}

/// A heap field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub typ: Type,
}

/// A function declared inside a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainFunc {
    pub name: String,
    pub formal_args: Vec<LocalVar>,
    pub typ: Type,
}

/// A named axiom inside a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainAxiom {
    pub name: String,
    pub exp: Exp,
}

/// A mathematical domain: type constructor with functions and axioms.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub name: String,
    pub type_vars: Vec<String>,
    pub functions: Vec<DomainFunc>,
    pub axioms: Vec<DomainAxiom>,
}

/// A member contributed by a front-end extension.
///
/// Extensions are opaque to the chopper: their dependency structure is
/// unknown, so programs containing them are rejected up front.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionMember {
    pub name: String,
}

/// A whole program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub domains: Vec<Domain>,
    pub fields: Vec<Field>,
    pub functions: Vec<Function>,
    pub predicates: Vec<Predicate>,
    pub methods: Vec<Method>,
    pub extensions: Vec<ExtensionMember>,
    pub meta: ProgramMeta,
}

/// A borrowed view of one top-level member, for uniform iteration.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Domain(&'a Domain),
    Field(&'a Field),
    Function(&'a Function),
    Predicate(&'a Predicate),
    Method(&'a Method),
    Extension(&'a ExtensionMember),
}

impl<'a> Member<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Member::Domain(d) => &d.name,
            Member::Field(f) => &f.name,
            Member::Function(f) => &f.name,
            Member::Predicate(p) => &p.name,
            Member::Method(m) => &m.name,
            Member::Extension(e) => &e.name,
        }
    }
}

impl Program {
    pub fn new(meta: ProgramMeta) -> Self {
        Self {
            domains: Vec::new(),
            fields: Vec::new(),
            functions: Vec::new(),
            predicates: Vec::new(),
            methods: Vec::new(),
            extensions: Vec::new(),
            meta,
        }
    }

    pub fn add_domain(&mut self, domain: Domain) {
        self.domains.push(domain);
    }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn add_predicate(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    /// All members in declaration-class order: domains, fields, functions,
    /// predicates, methods, extensions. This order is stable and is what
    /// every downstream consumer keys determinism on.
    pub fn members(&self) -> impl Iterator<Item = Member<'_>> {
        self.domains
            .iter()
            .map(Member::Domain)
            .chain(self.fields.iter().map(Member::Field))
            .chain(self.functions.iter().map(Member::Function))
            .chain(self.predicates.iter().map(Member::Predicate))
            .chain(self.methods.iter().map(Member::Method))
            .chain(self.extensions.iter().map(Member::Extension))
    }

    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn find_predicate(&self, name: &str) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.name == name)
    }

    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// The domain declaring the given domain function, if any. Domain
    /// function names are globally unique, so the first hit is the only one.
    pub fn find_domain_of_function(&self, function: &str) -> Option<&Domain> {
        self.domains
            .iter()
            .find(|d| d.functions.iter().any(|f| f.name == function))
    }

    pub fn find_domain_of_axiom(&self, domain: &str, axiom: &str) -> Option<&DomainAxiom> {
        self.find_domain(domain)
            .and_then(|d| d.axioms.iter().find(|a| a.name == axiom))
    }
}

// ---------------------------------------------------------------------------
// Concrete-syntax rendering
// ---------------------------------------------------------------------------

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Bool => write!(f, "Bool"),
            Type::Perm => write!(f, "Perm"),
            Type::Ref => write!(f, "Ref"),
            Type::Seq(t) => write!(f, "Seq[{t}]"),
            Type::Set(t) => write!(f, "Set[{t}]"),
            Type::Domain { name, type_args } => {
                write!(f, "{name}")?;
                if !type_args.is_empty() {
                    write!(f, "[")?;
                    for (i, t) in type_args.values().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{t}")?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            Type::TypeVar(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Not => write!(f, "!"),
            UnOp::Neg => write!(f, "-"),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Implies => "==>",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Exp]) -> fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

fn write_vars(f: &mut fmt::Formatter<'_>, vars: &[LocalVar]) -> fmt::Result {
    for (i, v) in vars.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", v.name, v.typ)?;
    }
    Ok(())
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exp::IntLit(n) => write!(f, "{n}"),
            Exp::BoolLit(b) => write!(f, "{b}"),
            Exp::NullLit => write!(f, "null"),
            Exp::Local(v) => write!(f, "{}", v.name),
            Exp::Unary { op, exp } => write!(f, "{op}({exp})"),
            Exp::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Exp::Cond {
                cond,
                then_exp,
                else_exp,
            } => write!(f, "({cond} ? {then_exp} : {else_exp})"),
            Exp::Old(e) => write!(f, "old({e})"),
            Exp::FuncApp { function, args, .. } | Exp::DomainFuncApp { function, args, .. } => {
                write!(f, "{function}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Exp::FieldAccess {
                receiver, field, ..
            } => write!(f, "{receiver}.{field}"),
            Exp::PredicateAccess { predicate, args } => {
                write!(f, "{predicate}(")?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Exp::Acc { loc, perm } => match perm {
                Some(p) => write!(f, "acc({loc}, {p})"),
                None => write!(f, "acc({loc})"),
            },
            Exp::Unfolding {
                predicate,
                args,
                body,
            } => {
                write!(f, "(unfolding {predicate}(")?;
                write_args(f, args)?;
                write!(f, ") in {body})")
            }
            Exp::Forall {
                vars,
                triggers,
                body,
            } => {
                write!(f, "(forall ")?;
                write_vars(f, vars)?;
                write!(f, " ::")?;
                for trigger in triggers {
                    write!(f, " {{")?;
                    write_args(f, trigger)?;
                    write!(f, "}}")?;
                }
                write!(f, " {body})")
            }
            Exp::Exists { vars, body } => {
                write!(f, "(exists ")?;
                write_vars(f, vars)?;
                write!(f, " :: {body})")
            }
            Exp::LetIn { var, exp, body } => {
                write!(f, "(let {} == ({exp}) in {body})", var.name)
            }
        }
    }
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, indent: usize) -> fmt::Result {
    let pad = "  ".repeat(indent);
    match stmt {
        Stmt::Block { decls, stmts } => {
            for d in decls {
                writeln!(f, "{pad}var {}: {}", d.name, d.typ)?;
            }
            for s in stmts {
                write_stmt(f, s, indent)?;
            }
            Ok(())
        }
        Stmt::Assign { target, rhs } => writeln!(f, "{pad}{} := {rhs}", target.name),
        Stmt::FieldAssign {
            receiver,
            field,
            rhs,
        } => writeln!(f, "{pad}{receiver}.{field} := {rhs}"),
        Stmt::Call {
            method,
            args,
            targets,
        } => {
            write!(f, "{pad}")?;
            for (i, t) in targets.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", t.name)?;
            }
            if !targets.is_empty() {
                write!(f, " := ")?;
            }
            write!(f, "{method}(")?;
            write_args(f, args)?;
            writeln!(f, ")")
        }
        Stmt::Fold { predicate, args } => {
            write!(f, "{pad}fold {predicate}(")?;
            write_args(f, args)?;
            writeln!(f, ")")
        }
        Stmt::Unfold { predicate, args } => {
            write!(f, "{pad}unfold {predicate}(")?;
            write_args(f, args)?;
            writeln!(f, ")")
        }
        Stmt::Inhale(e) => writeln!(f, "{pad}inhale {e}"),
        Stmt::Exhale(e) => writeln!(f, "{pad}exhale {e}"),
        Stmt::Assert(e) => writeln!(f, "{pad}assert {e}"),
        Stmt::Assume(e) => writeln!(f, "{pad}assume {e}"),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            writeln!(f, "{pad}if ({cond}) {{")?;
            write_stmt(f, then_branch, indent + 1)?;
            match else_branch {
                Some(e) => {
                    writeln!(f, "{pad}}} else {{")?;
                    write_stmt(f, e, indent + 1)?;
                    writeln!(f, "{pad}}}")
                }
                None => writeln!(f, "{pad}}}"),
            }
        }
        Stmt::While {
            cond,
            invariants,
            body,
        } => {
            writeln!(f, "{pad}while ({cond})")?;
            for inv in invariants {
                writeln!(f, "{pad}  invariant {inv}")?;
            }
            writeln!(f, "{pad}{{")?;
            write_stmt(f, body, indent + 1)?;
            writeln!(f, "{pad}}}")
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.domains {
            write!(f, "domain {}", d.name)?;
            if !d.type_vars.is_empty() {
                write!(f, "[{}]", d.type_vars.join(", "))?;
            }
            writeln!(f, " {{")?;
            for func in &d.functions {
                write!(f, "  function {}(", func.name)?;
                write_vars(f, &func.formal_args)?;
                writeln!(f, "): {}", func.typ)?;
            }
            for ax in &d.axioms {
                writeln!(f, "  axiom {} {{ {} }}", ax.name, ax.exp)?;
            }
            writeln!(f, "}}")?;
        }
        for field in &self.fields {
            writeln!(f, "field {}: {}", field.name, field.typ)?;
        }
        for func in &self.functions {
            write!(f, "function {}(", func.name)?;
            write_vars(f, &func.formal_args)?;
            writeln!(f, "): {}", func.typ)?;
            for pre in &func.pres {
                writeln!(f, "  requires {pre}")?;
            }
            for post in &func.posts {
                writeln!(f, "  ensures {post}")?;
            }
            match &func.body {
                Some(b) => writeln!(f, "{{ {b} }}")?,
                None => {}
            }
        }
        for pred in &self.predicates {
            write!(f, "predicate {}(", pred.name)?;
            write_vars(f, &pred.formal_args)?;
            match &pred.body {
                Some(b) => writeln!(f, ") {{ {b} }}")?,
                None => writeln!(f, ")")?,
            }
        }
        for m in &self.methods {
            write!(f, "method {}(", m.name)?;
            write_vars(f, &m.formal_args)?;
            write!(f, ")")?;
            if !m.formal_returns.is_empty() {
                write!(f, " returns (")?;
                write_vars(f, &m.formal_returns)?;
                write!(f, ")")?;
            }
            writeln!(f)?;
            for pre in &m.pres {
                writeln!(f, "  requires {pre}")?;
            }
            for post in &m.posts {
                writeln!(f, "  ensures {post}")?;
            }
            match &m.body {
                Some(b) => {
                    writeln!(f, "{{")?;
                    write_stmt(f, b, 1)?;
                    writeln!(f, "}}")?;
                }
                None => {}
            }
        }
        Ok(())
    }
}
