//! Tagged-variant AST emitted by the structural parser.
//!
//! Malformed input degrades to a partial tree: whatever could not be parsed
//! becomes a [`ParseGap`] node instead of poisoning the rest of the file.

use crate::core::{ClassKind, Visibility};

#[derive(Debug, Default)]
pub struct Ast {
    pub items: Vec<Item>,
}

impl Ast {
    pub fn gaps(&self) -> impl Iterator<Item = &ParseGap> {
        self.items.iter().filter_map(|item| match item {
            Item::Error(gap) => Some(gap),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub enum Item {
    Namespace {
        name: String,
        line: usize,
    },
    Use {
        target: String,
        alias: Option<String>,
        line: usize,
    },
    Class(ClassDecl),
    Function(FunctionDecl),
    Constant {
        name: String,
        value: Option<String>,
        line: usize,
    },
    /// Explicit error-recovery node.
    Error(ParseGap),
}

#[derive(Debug)]
pub struct ParseGap {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct ClassDecl {
    pub name: String,
    pub kind: ClassKind,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub trait_uses: Vec<String>,
    pub constants: Vec<ConstantDecl>,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<FunctionDecl>,
    pub line: usize,
    pub doc: Option<String>,
}

#[derive(Debug)]
pub struct ConstantDecl {
    pub name: String,
    pub value: Option<String>,
    pub line: usize,
}

#[derive(Debug)]
pub struct PropertyDecl {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub line: usize,
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub name: String,
    /// Parameter names only, type hints and defaults stripped.
    pub parameters: Vec<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub line: usize,
    pub doc: Option<String>,
}
