//! # Type References
//!
//! `TypeRef` is the handle the language frontend hands out for a type
//! expression. Manifests carry type expressions as strings; this module
//! parses them into a tree.

use crate::error::{AppError, AppResult};
use std::fmt;

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A named type with optional generic arguments (`java.util.List<Foo>`).
    Named {
        /// Qualified (or simple, when the frontend only knows that) name.
        name: String,
        /// Generic arguments in declaration order.
        args: Vec<TypeRef>,
    },
    /// An array of the component type (`Foo[]`).
    Array(Box<TypeRef>),
    /// A generic type variable (`T`) declared by the enclosing type.
    Var(String),
}

impl TypeRef {
    /// A named type without generic arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A named type with generic arguments.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    /// Parses a type expression with no type variables in scope.
    pub fn parse(expr: &str) -> AppResult<Self> {
        Self::parse_with_params(expr, &[])
    }

    /// Parses a type expression where the given names are type variables.
    pub fn parse_with_params(expr: &str, params: &[String]) -> AppResult<Self> {
        let mut parser = Parser {
            src: expr.as_bytes(),
            pos: 0,
            params,
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != parser.src.len() {
            return Err(AppError::General(format!(
                "Unexpected trailing input in type expression '{}' at {}",
                expr, parser.pos
            )));
        }
        Ok(ty)
    }

    /// The qualified name of a named type, `None` for arrays and variables.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Generic arguments of a named type.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// The last segment of the qualified name (`com.acme.User` -> `User`).
    pub fn simple_name(&self) -> String {
        match self {
            TypeRef::Named { name, .. } => simple_name(name).to_string(),
            TypeRef::Array(inner) => format!("{}[]", inner.simple_name()),
            TypeRef::Var(v) => v.clone(),
        }
    }

    /// Replaces every type variable that has a binding.
    pub fn substitute(&self, bindings: &[(String, TypeRef)]) -> TypeRef {
        match self {
            TypeRef::Var(v) => bindings
                .iter()
                .find(|(name, _)| name == v)
                .map(|(_, ty)| ty.clone())
                .unwrap_or_else(|| self.clone()),
            TypeRef::Array(inner) => TypeRef::Array(Box::new(inner.substitute(bindings))),
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
        }
    }

    /// Whether any type variable remains in the expression.
    pub fn has_vars(&self) -> bool {
        match self {
            TypeRef::Var(_) => true,
            TypeRef::Array(inner) => inner.has_vars(),
            TypeRef::Named { args, .. } => args.iter().any(TypeRef::has_vars),
        }
    }
}

/// Returns the segment after the last `.` (and after `$` for nested types).
pub fn simple_name(qualified: &str) -> &str {
    let tail = qualified.rsplit('.').next().unwrap_or(qualified);
    tail.rsplit('$').next().unwrap_or(tail)
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } if args.is_empty() => write!(f, "{}", name),
            TypeRef::Named { name, args } => {
                write!(f, "{}<", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeRef::Array(inner) => write!(f, "{}[]", inner),
            TypeRef::Var(v) => write!(f, "{}", v),
        }
    }
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    params: &'a [String],
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn ident(&mut self) -> AppResult<String> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.src.len() {
            let c = self.src[self.pos];
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || c == b'$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(AppError::General(format!(
                "Expected type name at offset {}",
                start
            )));
        }
        Ok(String::from_utf8_lossy(&self.src[start..self.pos]).into_owned())
    }

    fn parse_type(&mut self) -> AppResult<TypeRef> {
        let mut ty = if self.peek() == Some(b'?') {
            // Wildcards resolve to their bound, unbounded ones to Object.
            self.pos += 1;
            self.skip_ws();
            let rest = &self.src[self.pos..];
            if rest.starts_with(b"extends") || rest.starts_with(b"super") {
                let kw = if rest.starts_with(b"extends") { 7 } else { 5 };
                self.pos += kw;
                self.parse_type()?
            } else {
                TypeRef::named("java.lang.Object")
            }
        } else {
            let name = self.ident()?;
            let mut args = Vec::new();
            if self.peek() == Some(b'<') {
                self.pos += 1;
                loop {
                    args.push(self.parse_type()?);
                    match self.peek() {
                        Some(b',') => self.pos += 1,
                        Some(b'>') => {
                            self.pos += 1;
                            break;
                        }
                        _ => {
                            return Err(AppError::General(format!(
                                "Unterminated generic argument list at offset {}",
                                self.pos
                            )))
                        }
                    }
                }
            }
            if args.is_empty() && self.params.iter().any(|p| p == &name) {
                TypeRef::Var(name)
            } else {
                TypeRef::Named { name, args }
            }
        };

        loop {
            if self.peek() == Some(b'[') {
                self.pos += 1;
                if self.peek() != Some(b']') {
                    return Err(AppError::General("Expected ']' in array type".into()));
                }
                self.pos += 1;
                ty = TypeRef::Array(Box::new(ty));
            } else if self.src[self.pos..].starts_with(b"...") {
                self.pos += 3;
                ty = TypeRef::Array(Box::new(ty));
            } else {
                break;
            }
        }
        Ok(ty)
    }
}
