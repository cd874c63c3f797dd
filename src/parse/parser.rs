//! Recursive-descent structural pass over the token stream.
//!
//! Nesting depth is tracked explicitly on brace tokens, never by pattern
//! matching on text, so class and method body boundaries survive arbitrary
//! nesting. Anything unparseable becomes an [`Item::Error`] recovery node and
//! the pass continues with the rest of the file. Method bodies are consumed
//! while parsing their class, so the standalone-function arm never sees a
//! method.

use crate::core::{ClassKind, Visibility};
use crate::parse::ast::{Ast, ClassDecl, ConstantDecl, FunctionDecl, Item, ParseGap, PropertyDecl};
use crate::parse::lexer::{TokenKind, TokenStream};

const VALUE_PREVIEW_CHARS: usize = 120;

pub fn parse(ts: &TokenStream) -> Ast {
    let mut parser = Parser {
        ts,
        pos: 0,
        items: Vec::new(),
    };
    parser.parse_top_level();
    Ast {
        items: parser.items,
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Modifiers {
    visibility: Visibility,
    is_static: bool,
    is_abstract: bool,
}

struct Parser<'a> {
    ts: &'a TokenStream<'a>,
    pos: usize,
    items: Vec<Item>,
}

impl<'a> Parser<'a> {
    fn kind(&self, idx: usize) -> Option<TokenKind> {
        self.ts.tokens.get(idx).map(|t| t.kind)
    }

    fn text(&self, idx: usize) -> &'a str {
        self.ts
            .tokens
            .get(idx)
            .map(|t| self.ts.text(t))
            .unwrap_or("")
    }

    fn line(&self, idx: usize) -> usize {
        self.ts.tokens.get(idx).map(|t| t.line).unwrap_or(1)
    }

    fn gap(&mut self, line: usize, reason: impl Into<String>) {
        self.items.push(Item::Error(ParseGap {
            line,
            reason: reason.into(),
        }));
    }

    fn parse_top_level(&mut self) {
        let len = self.ts.tokens.len();
        while self.pos < len {
            let before = self.pos;
            if self.kind(self.pos) == Some(TokenKind::Identifier) {
                match self.text(self.pos) {
                    "namespace" => self.parse_namespace(),
                    "use" => self.parse_use(),
                    "class" | "interface" | "trait" | "enum" => self.parse_class_like(),
                    "abstract" | "final" if self.class_keyword_ahead() => {
                        while self.kind(self.pos) == Some(TokenKind::Identifier)
                            && matches!(self.text(self.pos), "abstract" | "final" | "readonly")
                        {
                            self.pos += 1;
                        }
                        self.parse_class_like();
                    }
                    "function" => self.parse_top_function(),
                    "const" => {
                        let mut constants = Vec::new();
                        self.parse_const_list(len, &mut constants);
                        for c in constants {
                            self.items.push(Item::Constant {
                                name: c.name,
                                value: c.value,
                                line: c.line,
                            });
                        }
                    }
                    "define" => self.parse_define(),
                    _ => self.pos += 1,
                }
            } else {
                self.pos += 1;
            }
            if self.pos == before {
                self.pos += 1;
            }
        }
    }

    fn class_keyword_ahead(&self) -> bool {
        let mut idx = self.pos;
        while self.kind(idx) == Some(TokenKind::Identifier) {
            match self.text(idx) {
                "abstract" | "final" | "readonly" => idx += 1,
                "class" | "interface" | "trait" | "enum" => return true,
                _ => return false,
            }
        }
        false
    }

    fn parse_namespace(&mut self) {
        let line = self.line(self.pos);
        self.pos += 1;
        let mut name = String::new();
        while let Some(kind) = self.kind(self.pos) {
            match kind {
                TokenKind::Identifier => name.push_str(self.text(self.pos)),
                TokenKind::Backslash => name.push('\\'),
                TokenKind::Semicolon | TokenKind::OpenBrace => {
                    self.pos += 1;
                    break;
                }
                _ => break,
            }
            self.pos += 1;
        }
        if !name.is_empty() {
            self.items.push(Item::Namespace { name, line });
        }
    }

    fn parse_use(&mut self) {
        let line = self.line(self.pos);
        self.pos += 1;
        // `use function` / `use const` qualifier.
        if self.kind(self.pos) == Some(TokenKind::Identifier)
            && matches!(self.text(self.pos), "function" | "const")
            && matches!(
                self.kind(self.pos + 1),
                Some(TokenKind::Identifier) | Some(TokenKind::Backslash)
            )
        {
            self.pos += 1;
        }

        let mut group_prefix: Option<String> = None;
        let mut path = String::new();
        let mut alias: Option<String> = None;
        let mut in_alias = false;

        fn flush(
            items: &mut Vec<Item>,
            group_prefix: &Option<String>,
            path: &mut String,
            alias: &mut Option<String>,
            line: usize,
        ) {
            if !path.is_empty() {
                let target = match group_prefix {
                    Some(prefix) => format!("{prefix}{path}"),
                    None => path.clone(),
                };
                items.push(Item::Use {
                    target,
                    alias: alias.take(),
                    line,
                });
            }
            path.clear();
        }

        loop {
            match self.kind(self.pos) {
                Some(TokenKind::Identifier) => {
                    let word = self.text(self.pos);
                    if word == "as" {
                        in_alias = true;
                    } else if in_alias {
                        alias = Some(word.to_string());
                        in_alias = false;
                    } else {
                        path.push_str(word);
                    }
                }
                Some(TokenKind::Backslash) => path.push('\\'),
                Some(TokenKind::Comma) => {
                    flush(&mut self.items, &group_prefix, &mut path, &mut alias, line);
                    in_alias = false;
                }
                Some(TokenKind::OpenBrace) => {
                    group_prefix = Some(std::mem::take(&mut path));
                }
                Some(TokenKind::CloseBrace) => {
                    flush(&mut self.items, &group_prefix, &mut path, &mut alias, line);
                    in_alias = false;
                    group_prefix = None;
                }
                Some(TokenKind::Semicolon) | None => {
                    flush(&mut self.items, &group_prefix, &mut path, &mut alias, line);
                    if self.kind(self.pos).is_some() {
                        self.pos += 1;
                    }
                    return;
                }
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn parse_class_like(&mut self) {
        let kw_pos = self.pos;
        let keyword = self.text(kw_pos).to_string();
        let kind = match keyword.as_str() {
            "interface" => ClassKind::Interface,
            "trait" => ClassKind::Trait,
            _ => ClassKind::Class,
        };
        let line = self.line(kw_pos);
        let doc = self.doc_before(kw_pos);
        self.pos += 1;

        let name = match self.kind(self.pos) {
            Some(TokenKind::Identifier) => {
                let name = self.text(self.pos).to_string();
                self.pos += 1;
                name
            }
            _ => {
                self.gap(line, format!("{keyword} declaration without a name"));
                return;
            }
        };

        let mut extends = None;
        let mut implements = Vec::new();
        loop {
            match self.kind(self.pos) {
                Some(TokenKind::Identifier) if self.text(self.pos) == "extends" => {
                    self.pos += 1;
                    let mut names = self.parse_name_list();
                    if !names.is_empty() {
                        extends = Some(names.remove(0));
                        // Interfaces may extend several bases; keep the rest.
                        implements.extend(names);
                    }
                }
                Some(TokenKind::Identifier) if self.text(self.pos) == "implements" => {
                    self.pos += 1;
                    implements.extend(self.parse_name_list());
                }
                Some(TokenKind::OpenBrace) => break,
                Some(TokenKind::Semicolon) | None => {
                    self.gap(line, format!("unterminated header of {keyword} {name}"));
                    return;
                }
                Some(_) => self.pos += 1,
            }
        }

        let open = self.pos;
        self.pos += 1;
        let close = self.matching_brace(open, self.ts.tokens.len());
        let body_end = close.unwrap_or(self.ts.tokens.len());

        let mut decl = ClassDecl {
            name: name.clone(),
            kind,
            extends,
            implements,
            trait_uses: Vec::new(),
            constants: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            line,
            doc,
        };
        self.parse_members(body_end, &mut decl);
        if close.is_none() {
            self.gap(line, format!("unterminated body of {keyword} {name}"));
        }
        self.pos = close.map(|c| c + 1).unwrap_or(self.ts.tokens.len());
        self.items.push(Item::Class(decl));
    }

    /// Comma-separated qualified names; stops before `{`, `implements`, etc.
    fn parse_name_list(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = String::new();
        while let Some(kind) = self.kind(self.pos) {
            match kind {
                TokenKind::Identifier => {
                    let word = self.text(self.pos);
                    if word == "implements" || word == "extends" {
                        break;
                    }
                    current.push_str(word);
                }
                TokenKind::Backslash => current.push('\\'),
                TokenKind::Comma => {
                    if !current.is_empty() {
                        names.push(std::mem::take(&mut current));
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }
        if !current.is_empty() {
            names.push(current);
        }
        names
    }

    fn parse_members(&mut self, end: usize, decl: &mut ClassDecl) {
        while self.pos < end {
            let member_start = self.pos;
            let mut mods = Modifiers::default();
            while self.kind(self.pos) == Some(TokenKind::Identifier) && self.pos < end {
                match self.text(self.pos) {
                    "public" => mods.visibility = Visibility::Public,
                    "protected" => mods.visibility = Visibility::Protected,
                    "private" => mods.visibility = Visibility::Private,
                    "static" => mods.is_static = true,
                    "abstract" => mods.is_abstract = true,
                    "final" | "readonly" | "var" => {}
                    _ => break,
                }
                self.pos += 1;
            }

            match self.kind(self.pos) {
                Some(TokenKind::Identifier) if self.text(self.pos) == "use" => {
                    self.parse_trait_use(end, decl);
                }
                Some(TokenKind::Identifier) if self.text(self.pos) == "const" => {
                    self.parse_const_list(end, &mut decl.constants);
                }
                Some(TokenKind::Identifier) if self.text(self.pos) == "function" => {
                    let doc = self.doc_before(member_start);
                    if let Some(method) = self.parse_function(end, mods, doc) {
                        decl.methods.push(method);
                    }
                }
                Some(TokenKind::Variable) => {
                    self.parse_properties(end, mods, decl);
                }
                Some(TokenKind::Identifier) | Some(TokenKind::Question) | Some(TokenKind::Backslash)
                    if self.property_ahead(end) =>
                {
                    // Typed property: skip the type tokens, then parse names.
                    while self.pos < end && self.kind(self.pos) != Some(TokenKind::Variable) {
                        self.pos += 1;
                    }
                    self.parse_properties(end, mods, decl);
                }
                _ => {}
            }
            if self.pos == member_start {
                self.pos += 1;
            }
        }
        self.pos = end;
    }

    /// True when the tokens between here and the next statement boundary look
    /// like `Type $name`, i.e. a typed property declaration.
    fn property_ahead(&self, end: usize) -> bool {
        let mut idx = self.pos;
        let mut budget = 8;
        while idx < end && budget > 0 {
            match self.kind(idx) {
                Some(TokenKind::Variable) => return true,
                Some(TokenKind::Identifier)
                | Some(TokenKind::Question)
                | Some(TokenKind::Backslash)
                | Some(TokenKind::Other) => {
                    idx += 1;
                    budget -= 1;
                }
                _ => return false,
            }
        }
        false
    }

    fn parse_trait_use(&mut self, end: usize, decl: &mut ClassDecl) {
        self.pos += 1;
        let names = self.parse_name_list();
        decl.trait_uses.extend(names);
        match self.kind(self.pos) {
            Some(TokenKind::Semicolon) => self.pos += 1,
            // Trait adaptation block: skip it wholesale.
            Some(TokenKind::OpenBrace) => {
                let open = self.pos;
                self.pos = self
                    .matching_brace(open, end)
                    .map(|c| c + 1)
                    .unwrap_or(end);
            }
            _ => {}
        }
    }

    fn parse_const_list(&mut self, end: usize, out: &mut Vec<ConstantDecl>) {
        let line = self.line(self.pos);
        self.pos += 1; // const
        loop {
            // Skip an optional type hint: the constant name is the last
            // identifier before `=`, `,`, or `;`.
            let mut name: Option<String> = None;
            while self.pos < end {
                match self.kind(self.pos) {
                    Some(TokenKind::Identifier) => {
                        name = Some(self.text(self.pos).to_string());
                        self.pos += 1;
                        match self.kind(self.pos) {
                            Some(TokenKind::Equals)
                            | Some(TokenKind::Comma)
                            | Some(TokenKind::Semicolon) => break,
                            _ => continue,
                        }
                    }
                    Some(TokenKind::Question) | Some(TokenKind::Backslash) => self.pos += 1,
                    _ => break,
                }
            }
            let Some(name) = name else {
                break;
            };

            let mut value = None;
            if self.kind(self.pos) == Some(TokenKind::Equals) {
                self.pos += 1;
                value = self.consume_value(end);
            }
            out.push(ConstantDecl {
                name,
                value,
                line,
            });

            match self.kind(self.pos) {
                Some(TokenKind::Comma) if self.pos < end => self.pos += 1,
                Some(TokenKind::Semicolon) => {
                    self.pos += 1;
                    break;
                }
                _ => break,
            }
        }
    }

    /// Consume an initializer expression up to the next `,` or `;` at depth
    /// zero, returning the trimmed source slice.
    fn consume_value(&mut self, end: usize) -> Option<String> {
        let first = self.pos;
        let mut depth = 0i32;
        while self.pos < end {
            match self.kind(self.pos) {
                Some(TokenKind::OpenParen)
                | Some(TokenKind::OpenBracket)
                | Some(TokenKind::OpenBrace) => depth += 1,
                Some(TokenKind::CloseParen)
                | Some(TokenKind::CloseBracket)
                | Some(TokenKind::CloseBrace) => depth -= 1,
                Some(TokenKind::Comma) | Some(TokenKind::Semicolon) if depth <= 0 => break,
                None => break,
                _ => {}
            }
            self.pos += 1;
        }
        if self.pos == first {
            return None;
        }
        let start = self.ts.tokens[first].start;
        let stop = self.ts.tokens[self.pos - 1].end;
        let raw = self.ts.src[start..stop].trim();
        if raw.is_empty() {
            None
        } else {
            Some(raw.chars().take(VALUE_PREVIEW_CHARS).collect())
        }
    }

    fn parse_properties(&mut self, end: usize, mods: Modifiers, decl: &mut ClassDecl) {
        while self.pos < end {
            match self.kind(self.pos) {
                Some(TokenKind::Variable) => {
                    let name = self.text(self.pos).trim_start_matches('$').to_string();
                    let line = self.line(self.pos);
                    self.pos += 1;
                    if self.kind(self.pos) == Some(TokenKind::Equals) {
                        self.pos += 1;
                        let _ = self.consume_value(end);
                    }
                    decl.properties.push(PropertyDecl {
                        name,
                        visibility: mods.visibility,
                        is_static: mods.is_static,
                        line,
                    });
                    match self.kind(self.pos) {
                        Some(TokenKind::Comma) => self.pos += 1,
                        Some(TokenKind::Semicolon) => {
                            self.pos += 1;
                            return;
                        }
                        _ => return,
                    }
                }
                _ => return,
            }
        }
    }

    fn parse_top_function(&mut self) {
        let mods = Modifiers::default();
        let doc = self.doc_before(self.pos);
        if let Some(func) = self.parse_function(self.ts.tokens.len(), mods, doc) {
            self.items.push(Item::Function(func));
        }
    }

    /// Parse a named function/method, skipping its body by brace depth.
    /// Anonymous functions are consumed without emitting a declaration.
    fn parse_function(
        &mut self,
        end: usize,
        mods: Modifiers,
        doc: Option<String>,
    ) -> Option<FunctionDecl> {
        let line = self.line(self.pos);
        self.pos += 1; // function
        if self.kind(self.pos) == Some(TokenKind::Ampersand) {
            self.pos += 1;
        }
        let name = match self.kind(self.pos) {
            Some(TokenKind::Identifier) => {
                let name = self.text(self.pos).to_string();
                self.pos += 1;
                name
            }
            _ => {
                self.skip_signature_and_body(end, None);
                return None;
            }
        };

        let mut parameters = Vec::new();
        if self.kind(self.pos) == Some(TokenKind::OpenParen) {
            let open = self.pos;
            match self.matching_paren(open, end) {
                Some(close) => {
                    parameters = self.extract_params(open, close);
                    self.pos = close + 1;
                }
                None => {
                    // Abort this symbol only; rescan right after the broken
                    // paren so the rest of the file still parses.
                    self.gap(line, format!("unterminated parameter list of {name}"));
                    self.pos = open + 1;
                    return None;
                }
            }
        }
        self.skip_signature_and_body(end, Some((&name, line)));

        Some(FunctionDecl {
            name,
            parameters,
            visibility: mods.visibility,
            is_static: mods.is_static,
            is_abstract: mods.is_abstract,
            line,
            doc,
        })
    }

    /// Skip return type tokens, then either a `;` (abstract) or a balanced
    /// body. For anonymous functions this also swallows the parameter list
    /// and `use (...)` clause.
    fn skip_signature_and_body(&mut self, end: usize, named: Option<(&str, usize)>) {
        while self.pos < end {
            match self.kind(self.pos) {
                Some(TokenKind::OpenParen) => {
                    let open = self.pos;
                    self.pos = self
                        .matching_paren(open, end)
                        .map(|c| c + 1)
                        .unwrap_or(end);
                }
                Some(TokenKind::OpenBrace) => {
                    let open = self.pos;
                    match self.matching_brace(open, end) {
                        Some(close) => self.pos = close + 1,
                        None => {
                            if let Some((name, line)) = named {
                                self.gap(line, format!("unterminated body of function {name}"));
                            }
                            self.pos = end;
                        }
                    }
                    return;
                }
                Some(TokenKind::Semicolon) => {
                    self.pos += 1;
                    return;
                }
                Some(_) => self.pos += 1,
                None => return,
            }
        }
    }

    fn extract_params(&self, open: usize, close: usize) -> Vec<String> {
        let mut params = Vec::new();
        let mut depth = 0i32;
        let mut taken = false;
        for idx in (open + 1)..close {
            match self.ts.tokens[idx].kind {
                TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseBrace => {
                    depth -= 1
                }
                TokenKind::Comma if depth == 0 => taken = false,
                TokenKind::Variable if depth == 0 && !taken => {
                    let name = self.text(idx).trim_start_matches('$').to_string();
                    if !name.is_empty() {
                        params.push(name);
                    }
                    taken = true;
                }
                _ => {}
            }
        }
        params
    }

    fn parse_define(&mut self) {
        let line = self.line(self.pos);
        if self.kind(self.pos + 1) != Some(TokenKind::OpenParen)
            || self.kind(self.pos + 2) != Some(TokenKind::StringLit)
        {
            self.pos += 1;
            return;
        }
        let name = strip_quotes(self.text(self.pos + 2)).to_string();
        let open = self.pos + 1;
        let close = self.matching_paren(open, self.ts.tokens.len());
        let mut value = None;
        if let Some(close) = close {
            // Second argument: everything after the first depth-zero comma.
            let mut depth = 0i32;
            for idx in (open + 1)..close {
                match self.ts.tokens[idx].kind {
                    TokenKind::OpenParen | TokenKind::OpenBracket => depth += 1,
                    TokenKind::CloseParen | TokenKind::CloseBracket => depth -= 1,
                    TokenKind::Comma if depth == 0 => {
                        if idx + 1 < close {
                            let start = self.ts.tokens[idx + 1].start;
                            let stop = self.ts.tokens[close - 1].end;
                            let raw = self.ts.src[start..stop].trim();
                            if !raw.is_empty() {
                                value = Some(raw.chars().take(VALUE_PREVIEW_CHARS).collect());
                            }
                        }
                        break;
                    }
                    _ => {}
                }
            }
        }
        if !name.is_empty() {
            self.items.push(Item::Constant { name, value, line });
        }
        self.pos = close.map(|c| c + 1).unwrap_or(self.ts.tokens.len());
    }

    /// Nearest preceding block comment, looking back across modifier words.
    fn doc_before(&self, idx: usize) -> Option<String> {
        let mut j = idx;
        while j > 0 {
            j -= 1;
            let token = &self.ts.tokens[j];
            match token.kind {
                TokenKind::Identifier
                    if matches!(
                        self.ts.text(token),
                        "public"
                            | "protected"
                            | "private"
                            | "static"
                            | "abstract"
                            | "final"
                            | "readonly"
                    ) =>
                {
                    continue
                }
                TokenKind::DocComment | TokenKind::BlockComment => {
                    return clean_comment(self.ts.text(token))
                }
                _ => return None,
            }
        }
        None
    }

    fn matching_brace(&self, open: usize, end: usize) -> Option<usize> {
        let mut depth = 1u32;
        for idx in (open + 1)..end.min(self.ts.tokens.len()) {
            match self.ts.tokens[idx].kind {
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn matching_paren(&self, open: usize, end: usize) -> Option<usize> {
        let mut depth = 1u32;
        for idx in (open + 1)..end.min(self.ts.tokens.len()) {
            match self.ts.tokens[idx].kind {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '\'' || c == '"')
}

/// Strip comment delimiters and leading asterisks, keeping the prose.
fn clean_comment(raw: &str) -> Option<String> {
    let inner = raw
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/");
    let cleaned: Vec<&str> = inner
        .lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .filter(|l| !l.is_empty())
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("\n"))
    }
}
