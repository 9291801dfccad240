//! Semantic analysis pass.
//!
//! Runs over raw declarations in source order and produces the flat entity
//! list. The pass owns every cross-declaration rule:
//!
//! 1. Namespace scoping (depth at most one) and qualified-name assignment
//! 2. Duplicate detection across constants, enums, and structs
//! 3. Constant recording and type checking (compile-time only; constants
//!    never reach the schema list)
//! 4. Enum value assignment ("previous + 1", starting at 0) and the
//!    enum-to-`uint32` field rewrite, including named default values
//! 5. Qualification of unqualified struct references by the current
//!    namespace (textual; existence is checked later by the hasher, so
//!    forward references work)
//! 6. Default value typing
//!
//! Analysis fails fast: the first violation aborts the pass.

use std::collections::{HashMap, HashSet};

use cbuf_ast::decl::{ConstDecl, Declaration, EnumDecl, NamespaceDecl, RawField, RawType, StructDecl};
use cbuf_ast::schema::{qualify, FieldDef, FieldKind, Literal, Primitive, TypeDef};
use cbuf_ast::Span;
use indexmap::IndexMap;

use crate::error::{CompileError, ErrorKind};
use crate::names::candidate_names;

/// Member name → value, in declaration order.
type EnumMembers = IndexMap<String, i64>;

/// Analyze raw declarations into the entity list.
///
/// Hashes are left at zero; the hasher fills them in afterwards.
pub fn analyze(decls: &[Declaration]) -> Result<Vec<TypeDef>, CompileError> {
    let mut analyzer = Analyzer::default();
    analyzer.walk(decls)?;

    if analyzer.out.iter().all(|def| def.is_enum) {
        return Err(CompileError::spanless(
            ErrorKind::NoStructs,
            "schema defines no struct types",
        ));
    }

    Ok(analyzer.out)
}

#[derive(Default)]
struct Analyzer {
    /// Current namespace stack; depth is at most one.
    namespaces: Vec<String>,
    /// Qualified names of everything defined so far.
    defined: HashSet<String>,
    /// Qualified enum name → members, for reference rewriting.
    enums: HashMap<String, EnumMembers>,
    out: Vec<TypeDef>,
}

impl Analyzer {
    fn walk(&mut self, decls: &[Declaration]) -> Result<(), CompileError> {
        for decl in decls {
            match decl {
                Declaration::Namespace(ns) => self.walk_namespace(ns)?,
                Declaration::Const(c) => self.define_const(c)?,
                Declaration::Enum(e) => self.define_enum(e)?,
                Declaration::Struct(s) => self.define_struct(s)?,
            }
        }
        Ok(())
    }

    fn walk_namespace(&mut self, ns: &NamespaceDecl) -> Result<(), CompileError> {
        if !self.namespaces.is_empty() {
            return Err(CompileError::new(
                ErrorKind::NestedNamespace,
                ns.span.clone(),
                format!("namespace '{}' is nested inside '{}'", ns.name, self.namespaces.join("::")),
            ));
        }
        self.namespaces.push(ns.name.clone());
        let result = self.walk(&ns.body);
        self.namespaces.pop();
        result
    }

    /// Record a qualified entity name, rejecting duplicates.
    fn define(&mut self, qualified: &str, span: &Span) -> Result<(), CompileError> {
        if !self.defined.insert(qualified.to_owned()) {
            return Err(CompileError::new(
                ErrorKind::DuplicateEntity,
                span.clone(),
                format!("duplicate definition of '{}'", qualified),
            ));
        }
        Ok(())
    }

    fn define_const(&mut self, c: &ConstDecl) -> Result<(), CompileError> {
        let qualified = qualify(&self.namespaces, &c.name);
        self.define(&qualified, &c.span)?;
        check_scalar(c.ty, &c.value, &qualified, &c.span)
        // Constants are compile-time only: recorded for duplicate
        // detection, absent from the schema list.
    }

    fn define_enum(&mut self, e: &EnumDecl) -> Result<(), CompileError> {
        let qualified = qualify(&self.namespaces, &e.name);
        self.define(&qualified, &e.span)?;

        let mut members = EnumMembers::new();
        let mut next = 0i64;
        for member in &e.members {
            let value = member.value.unwrap_or(next);
            next = value + 1;
            if members.insert(member.name.clone(), value).is_some() {
                return Err(CompileError::new(
                    ErrorKind::DuplicateEntity,
                    member.span.clone(),
                    format!("duplicate enum member '{}::{}'", qualified, member.name),
                ));
            }
        }

        let fields = members
            .iter()
            .map(|(name, value)| FieldDef {
                name: name.clone(),
                kind: FieldKind::Primitive(Primitive::UInt32),
                array: None,
                upper_bound: None,
                default: None,
                constant: Some(*value),
            })
            .collect();

        self.out.push(TypeDef {
            name: e.name.clone(),
            qualified_name: qualified.clone(),
            namespaces: self.namespaces.clone(),
            fields,
            hash: 0,
            is_enum: true,
            is_enum_class: e.is_class,
            is_naked: false,
        });
        self.enums.insert(qualified, members);
        Ok(())
    }

    fn define_struct(&mut self, s: &StructDecl) -> Result<(), CompileError> {
        let qualified = qualify(&self.namespaces, &s.name);
        self.define(&qualified, &s.span)?;

        let mut fields = Vec::with_capacity(s.fields.len());
        for raw in &s.fields {
            fields.push(self.analyze_field(raw)?);
        }

        self.out.push(TypeDef {
            name: s.name.clone(),
            qualified_name: qualified,
            namespaces: self.namespaces.clone(),
            fields,
            hash: 0,
            is_enum: false,
            is_enum_class: false,
            is_naked: s.is_naked,
        });
        Ok(())
    }

    fn analyze_field(&self, raw: &RawField) -> Result<FieldDef, CompileError> {
        let mut default = raw.default.clone();

        let kind = match &raw.ty {
            RawType::Primitive(p) => FieldKind::Primitive(*p),
            RawType::Named(name) => {
                if let Some(members) = self.lookup_enum(name) {
                    // Enum reference: the wire type is uint32, and a named
                    // default resolves through the enum's members.
                    default = match default {
                        Some(lit) => Some(rewrite_enum_default(lit, members, name, &raw.span)?),
                        None => None,
                    };
                    FieldKind::Primitive(Primitive::UInt32)
                } else if name.contains("::") {
                    FieldKind::Complex(name.clone())
                } else {
                    // Unqualified struct reference: qualify against the
                    // current namespace so later lookups are unambiguous.
                    // Existence is checked at hash time, which lets a
                    // struct reference a type defined further down.
                    FieldKind::Complex(qualify(&self.namespaces, name))
                }
            }
        };

        if let FieldKind::Complex(type_name) = &kind {
            if default.is_some() {
                return Err(CompileError::new(
                    ErrorKind::ComplexDefaultForbidden,
                    raw.span.clone(),
                    format!("field '{}' of struct type '{}' cannot have a default value", raw.name, type_name),
                ));
            }
        }

        if let (FieldKind::Primitive(p), Some(lit)) = (&kind, &default) {
            check_default(*p, raw.array.is_some(), lit, &raw.name, &raw.span)?;
        }

        Ok(FieldDef {
            name: raw.name.clone(),
            kind,
            array: raw.array,
            upper_bound: raw.upper_bound,
            default,
            constant: None,
        })
    }

    /// Resolve `name` against the enums defined so far via the namespace walk.
    fn lookup_enum(&self, name: &str) -> Option<&EnumMembers> {
        candidate_names(&self.namespaces, name)
            .iter()
            .find_map(|key| self.enums.get(key))
    }
}

/// Replace named enum members in a default value by their integers.
fn rewrite_enum_default(
    lit: Literal,
    members: &EnumMembers,
    enum_name: &str,
    span: &Span,
) -> Result<Literal, CompileError> {
    let resolve = |name: &str| -> Result<Literal, CompileError> {
        members.get(name).map(|v| Literal::Int(*v)).ok_or_else(|| {
            CompileError::new(
                ErrorKind::UnknownEnumValue,
                span.clone(),
                format!("'{}' is not a member of enum '{}'", name, enum_name),
            )
        })
    };

    match lit {
        Literal::Ident(name) => resolve(&name),
        Literal::Seq(items) => {
            let items = items
                .into_iter()
                .map(|item| match item {
                    Literal::Ident(name) => resolve(&name),
                    other => Ok(other),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Literal::Seq(items))
        }
        other => Ok(other),
    }
}

/// Type-check a default value against the field's shape and tag.
fn check_default(
    prim: Primitive,
    is_array: bool,
    lit: &Literal,
    field: &str,
    span: &Span,
) -> Result<(), CompileError> {
    if is_array {
        let Literal::Seq(items) = lit else {
            return Err(CompileError::new(
                ErrorKind::InvalidDefaultValue,
                span.clone(),
                format!("default for array field '{}' must be a sequence", field),
            ));
        };
        for item in items {
            check_scalar(prim, item, field, span)?;
        }
        return Ok(());
    }

    if matches!(lit, Literal::Seq(_)) {
        return Err(CompileError::new(
            ErrorKind::InvalidDefaultValue,
            span.clone(),
            format!("default for scalar field '{}' cannot be a sequence", field),
        ));
    }
    check_scalar(prim, lit, field, span)
}

/// Type-check one scalar literal against a primitive tag.
///
/// Integer and float literals are both "numbers" and feed every numeric
/// tag; coercion happens at encode time.
fn check_scalar(
    prim: Primitive,
    lit: &Literal,
    what: &str,
    span: &Span,
) -> Result<(), CompileError> {
    let ok = match prim {
        Primitive::Bool => matches!(lit, Literal::Bool(_)),
        Primitive::String => matches!(lit, Literal::Str(_)),
        _ => matches!(lit, Literal::Int(_) | Literal::Float(_)),
    };
    if ok {
        return Ok(());
    }

    if let Literal::Ident(name) = lit {
        // Bare identifiers only mean something as enum member references.
        return Err(CompileError::new(
            ErrorKind::UnknownEnumValue,
            span.clone(),
            format!("'{}' in '{}' does not resolve to an enum member", name, what),
        ));
    }

    Err(CompileError::new(
        ErrorKind::InvalidDefaultValue,
        span.clone(),
        format!("value for '{}' does not match type {}", what, prim),
    ))
}
