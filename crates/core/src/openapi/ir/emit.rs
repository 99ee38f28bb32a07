//! TypeScript code emission via the Emit trait.
//!
//! Each AST type implements `Emit`; modules are assembled from sections
//! separated by a single blank line so output is byte-stable.

use super::types::{
    BinOp, TemplatePart, TsClass, TsExpr, TsField, TsImport, TsLiteral, TsMethod, TsModule,
    TsParam, TsPrimitive, TsProp, TsReExport, TsStmt, TsTest, TsType, TsTypeDef, TypeDefKind,
    VarKind,
};
use super::utils::{escape_js_string, quote_if_needed};

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

fn join_emitted<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

// =============================================================================
// Primitive Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Any => "any",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                // Wrap complex types in parentheses
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => join_emitted(types, " | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit();
                    if matches!(t, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", join_emitted(props, "; "))
                }
            }
            TsType::Record { key, value } => {
                format!("Record<{}, {}>", key.emit(), value.emit())
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
            TsType::Generic { name, args } => format!("{name}<{}>", join_emitted(args, ", ")),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{key}{opt}: {}", self.ty.emit())
    }
}

// =============================================================================
// Type Definitions
// =============================================================================

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        match &self.kind {
            TypeDefKind::Interface { properties } => {
                let mut output = format!("export interface {} {{\n", self.name);
                for prop in properties {
                    output.push_str(&format!("  {};\n", prop.emit()));
                }
                output.push_str("}\n");
                output
            }
            TypeDefKind::TypeAlias { ty } => {
                format!("export type {} = {};\n", self.name, ty.emit())
            }
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for BinOp {
    fn emit(&self) -> String {
        match self {
            BinOp::Assign => "=",
            BinOp::NotEqual => "!=",
            BinOp::AddAssign => "+=",
        }
        .to_string()
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => {
                format!("{}({})", callee.emit(), join_emitted(args, ", "))
            }
            TsExpr::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props
                        .iter()
                        .map(|(k, v)| format!("{}: {}", quote_if_needed(k), v.emit()))
                        .collect();
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            TsExpr::Member { object, prop } => format!("{}.{prop}", object.emit()),
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|p| match p {
                        TemplatePart::Static(s) => s.clone(),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit()),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::Await(expr) => format!("await {}", expr.emit()),
            TsExpr::BinOp { left, op, right } => {
                format!("{} {} {}", left.emit(), op.emit(), right.emit())
            }
            TsExpr::Not(expr) => format!("!{}", expr.emit()),
            TsExpr::New { callee, args } => {
                format!("new {}({})", callee.emit(), join_emitted(args, ", "))
            }
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        let mut out = match &self.ty {
            Some(ty) => format!("{}{opt}: {}", self.name, ty.emit()),
            None => format!("{}{opt}", self.name),
        };
        if let Some(default) = &self.default {
            out.push_str(" = ");
            out.push_str(&default.emit());
        }
        out
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for VarKind {
    fn emit(&self) -> String {
        match self {
            VarKind::Const => "const".to_string(),
            VarKind::Let => "let".to_string(),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl TsStmt {
    /// Emit with specified indentation level (2 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::VarDecl {
                kind,
                name,
                ty,
                init,
            } => {
                let ty_str = ty
                    .as_ref()
                    .map(|t| format!(": {}", t.emit()))
                    .unwrap_or_default();
                format!("{prefix}{} {name}{ty_str} = {};\n", kind.emit(), init.emit())
            }
            TsStmt::Expr(expr) => format!("{prefix}{};\n", expr.emit()),
            TsStmt::Return(expr) => match expr {
                Some(e) => format!("{prefix}return {};\n", e.emit()),
                None => format!("{prefix}return;\n"),
            },
            TsStmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let mut output = format!("{prefix}if ({}) {{\n", cond.emit());
                for stmt in then_body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                if let Some(else_stmts) = else_body {
                    output.push_str(&format!("{prefix}}} else {{\n"));
                    for stmt in else_stmts {
                        output.push_str(&stmt.emit_indented(indent + 1));
                    }
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            TsStmt::IfInline { cond, then } => {
                format!("{prefix}if ({}) {}", cond.emit(), then.emit_indented(0))
            }
            TsStmt::Throw(expr) => format!("{prefix}throw {};\n", expr.emit()),
            TsStmt::Raw(code) => code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("{prefix}{line}\n")
                    }
                })
                .collect(),
        }
    }
}

// =============================================================================
// Classes
// =============================================================================

impl Emit for TsField {
    fn emit(&self) -> String {
        let visibility = if self.is_private { "private " } else { "" };
        format!("{visibility}{}: {};", self.name, self.ty.emit())
    }
}

impl TsMethod {
    fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        let mut output = String::new();

        if let Some(doc) = &self.doc {
            output.push_str(&format!("{prefix}/** {} */\n", doc.replace("*/", "*\\/")));
        }

        let async_str = if self.is_async { "async " } else { "" };
        let return_type_str = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        output.push_str(&format!(
            "{prefix}{async_str}{}({}){return_type_str} {{\n",
            self.name,
            join_emitted(&self.params, ", ")
        ));
        for stmt in &self.body {
            output.push_str(&stmt.emit_indented(indent + 1));
        }
        output.push_str(&format!("{prefix}}}\n"));
        output
    }
}

impl Emit for TsClass {
    fn emit(&self) -> String {
        let export = if self.is_export { "export " } else { "" };
        let mut members = Vec::new();

        if !self.fields.is_empty() {
            members.push(
                self.fields
                    .iter()
                    .map(|f| format!("  {}\n", f.emit()))
                    .collect::<String>(),
            );
        }
        if let Some(constructor) = &self.constructor {
            members.push(constructor.emit_indented(1));
        }
        for method in &self.methods {
            members.push(method.emit_indented(1));
        }

        format!("{export}class {} {{\n{}}}\n", self.name, members.join("\n"))
    }
}

// =============================================================================
// Tests
// =============================================================================

impl Emit for TsTest {
    fn emit(&self) -> String {
        let async_str = if self.is_async { "async " } else { "" };
        let mut output = format!(
            "test(\"{}\", {async_str}() => {{\n",
            escape_js_string(&self.name)
        );
        for stmt in &self.body {
            output.push_str(&stmt.emit_indented(1));
        }
        output.push_str("});\n");
        output
    }
}

// =============================================================================
// Imports
// =============================================================================

impl Emit for TsImport {
    fn emit(&self) -> String {
        let type_keyword = if self.type_only { "type " } else { "" };
        format!(
            "import {type_keyword}{{ {} }} from \"{}\";\n",
            self.items.join(", "),
            self.from
        )
    }
}

impl Emit for TsReExport {
    fn emit(&self) -> String {
        match self {
            TsReExport::Named { items, from } => {
                format!("export {{ {} }} from \"{from}\";\n", items.join(", "))
            }
            TsReExport::All { from } => format!("export * from \"{from}\";\n"),
        }
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        if !self.comments.is_empty() {
            sections.push(self.comments.iter().map(|c| format!("// {c}\n")).collect());
        }
        if !self.imports.is_empty() {
            sections.push(self.imports.iter().map(Emit::emit).collect());
        }
        if !self.re_exports.is_empty() {
            sections.push(self.re_exports.iter().map(Emit::emit).collect());
        }
        sections.extend(self.types.iter().map(Emit::emit));
        if !self.statements.is_empty() {
            sections.push(self.statements.iter().map(|s| s.emit_indented(0)).collect());
        }
        sections.extend(self.classes.iter().map(Emit::emit));
        sections.extend(self.tests.iter().map(Emit::emit));

        sections.join("\n")
    }
}
