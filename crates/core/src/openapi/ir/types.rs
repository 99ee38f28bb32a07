//! TypeScript IR types for code generation.
//!
//! This module defines the TypeScript type system representation:
//! - TsType: Types (primitives, arrays, unions, objects, etc.)
//! - TsExpr / TsStmt: Expressions and statements used in method bodies
//! - TsClass / TsMethod: The generated client class
//! - TsModule: One emitted source file

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Primitive types: string, number, boolean, null, any
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Intersection type: A & B & C
    Intersection(Vec<TsType>),
    /// Object type: { foo: string; bar?: number }
    Object(Vec<TsProp>),
    /// Record type: Record<K, V>
    Record {
        key: Box<TsType>,
        value: Box<TsType>,
    },
    /// Literal type: "foo", 42, true
    Literal(TsLiteral),
    /// Named type reference
    Ref(String),
    /// Generic application: Promise<T>
    Generic { name: String, args: Vec<TsType> },
}

impl TsType {
    pub fn any() -> Self {
        TsType::Primitive(TsPrimitive::Any)
    }

    /// `Record<string, any>`, the generic object type.
    pub fn any_record() -> Self {
        TsType::Record {
            key: Box::new(TsType::Primitive(TsPrimitive::String)),
            value: Box::new(TsType::any()),
        }
    }

    pub fn promise(inner: TsType) -> Self {
        TsType::Generic {
            name: "Promise".into(),
            args: vec![inner],
        }
    }

    /// Check if this type is an array type (including nullable arrays)
    pub fn is_array(&self) -> bool {
        match self {
            TsType::Array(_) => true,
            TsType::Union(types) => types
                .iter()
                .any(|t| !matches!(t, TsType::Primitive(TsPrimitive::Null)) && t.is_array()),
            _ => false,
        }
    }

    /// Check if this type is numeric (including nullable numbers)
    pub fn is_number(&self) -> bool {
        match self {
            TsType::Primitive(TsPrimitive::Number) => true,
            TsType::Union(types) => types.iter().any(TsType::is_number),
            _ => false,
        }
    }

    /// Collect every named type this type mentions, in order of appearance.
    pub fn collect_refs(&self, out: &mut Vec<String>) {
        match self {
            TsType::Ref(name) => {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
            TsType::Array(inner) => inner.collect_refs(out),
            TsType::Union(types) | TsType::Intersection(types) => {
                for t in types {
                    t.collect_refs(out);
                }
            }
            TsType::Object(props) => {
                for p in props {
                    p.ty.collect_refs(out);
                }
            }
            TsType::Record { key, value } => {
                key.collect_refs(out);
                value.collect_refs(out);
            }
            TsType::Generic { args, .. } => {
                for t in args {
                    t.collect_refs(out);
                }
            }
            TsType::Primitive(_) | TsType::Literal(_) => {}
        }
    }
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Any,
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    Null,
}

/// TypeScript expression
#[derive(Debug, Clone)]
pub enum TsExpr {
    /// Identifier: foo
    Ident(String),
    /// Literal value: "bar", 42
    Literal(TsLiteral),
    /// Function call: foo(a, b)
    Call {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// Object literal: { a: 1, b: 2 }
    Object(Vec<(String, TsExpr)>),
    /// Member access: foo.bar
    Member { object: Box<TsExpr>, prop: String },
    /// Template literal: `${foo}/bar`
    Template(Vec<TemplatePart>),
    /// Await expression: await fetch()
    Await(Box<TsExpr>),
    /// Binary expression: a != null
    BinOp {
        left: Box<TsExpr>,
        op: BinOp,
        right: Box<TsExpr>,
    },
    /// Prefix negation: !res.ok
    Not(Box<TsExpr>),
    /// new Error(...)
    New {
        callee: Box<TsExpr>,
        args: Vec<TsExpr>,
    },
    /// Raw code that doesn't fit the AST
    Raw(String),
}

impl TsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    pub fn member(object: TsExpr, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(object),
            prop: prop.into(),
        }
    }

    pub fn call(callee: TsExpr, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// `target.method(args)`
    pub fn method_call(target: TsExpr, method: &str, args: Vec<TsExpr>) -> Self {
        Self::call(Self::member(target, method), args)
    }

    pub fn await_(expr: TsExpr) -> Self {
        TsExpr::Await(Box::new(expr))
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy)]
pub enum BinOp {
    Assign,
    NotEqual,
    AddAssign,
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct TsParam {
    pub name: String,
    pub ty: Option<TsType>,
    pub optional: bool,
    /// Default value, emitted as `name: T = value`
    pub default: Option<TsExpr>,
}

impl TsParam {
    pub fn required(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: false,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }
}

/// Template literal part
#[derive(Debug, Clone)]
pub enum TemplatePart {
    /// Static string part, already escaped for a template literal
    Static(String),
    /// Dynamic expression part: ${expr}
    Dynamic(TsExpr),
}

// =============================================================================
// Module-Level IR (for printer)
// =============================================================================

/// Import statement
#[derive(Debug, Clone)]
pub struct TsImport {
    pub items: Vec<String>,
    pub from: String,
    pub type_only: bool,
}

/// Re-export statement
#[derive(Debug, Clone)]
pub enum TsReExport {
    /// export { A, B } from "./a.js";
    Named { items: Vec<String>, from: String },
    /// export * from "./a.js";
    All { from: String },
}

/// Type definition kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// interface Foo { ... }
    Interface { properties: Vec<TsProp> },
    /// type Foo = ...
    TypeAlias { ty: TsType },
}

/// Type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    pub name: String,
    pub kind: TypeDefKind,
}

/// Statement in a function body
#[derive(Debug, Clone)]
pub enum TsStmt {
    /// const/let declaration
    VarDecl {
        kind: VarKind,
        name: String,
        ty: Option<TsType>,
        init: TsExpr,
    },
    /// Expression statement
    Expr(TsExpr),
    /// Return statement
    Return(Option<TsExpr>),
    /// If statement
    If {
        cond: TsExpr,
        then_body: Vec<TsStmt>,
        else_body: Option<Vec<TsStmt>>,
    },
    /// Single-line guarded statement: if (cond) stmt;
    IfInline { cond: TsExpr, then: Box<TsStmt> },
    /// Throw statement
    Throw(TsExpr),
    /// Raw code block (for complex patterns that don't fit the AST)
    Raw(String),
}

/// Variable declaration kind
#[derive(Debug, Clone, Copy)]
pub enum VarKind {
    Const,
    Let,
}

/// Class field: `private baseUrl: string;`
#[derive(Debug, Clone)]
pub struct TsField {
    pub name: String,
    pub ty: TsType,
    pub is_private: bool,
}

/// Class method (or constructor when `name` is `constructor`)
#[derive(Debug, Clone)]
pub struct TsMethod {
    pub name: String,
    pub params: Vec<TsParam>,
    pub return_type: Option<TsType>,
    pub body: Vec<TsStmt>,
    pub is_async: bool,
    /// Optional one-line JSDoc summary
    pub doc: Option<String>,
}

/// Class definition
#[derive(Debug, Clone)]
pub struct TsClass {
    pub name: String,
    pub is_export: bool,
    pub fields: Vec<TsField>,
    pub constructor: Option<TsMethod>,
    pub methods: Vec<TsMethod>,
}

/// One `test(...)` block in a test module
#[derive(Debug, Clone)]
pub struct TsTest {
    pub name: String,
    pub is_async: bool,
    pub body: Vec<TsStmt>,
}

/// Complete TypeScript module
#[derive(Debug, Clone, Default)]
pub struct TsModule {
    /// Leading comment lines (without `//`)
    pub comments: Vec<String>,
    pub imports: Vec<TsImport>,
    pub re_exports: Vec<TsReExport>,
    pub types: Vec<TsTypeDef>,
    /// Top-level statements emitted before classes
    pub statements: Vec<TsStmt>,
    pub classes: Vec<TsClass>,
    pub tests: Vec<TsTest>,
}
