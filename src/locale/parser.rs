/*!
 * TypeScript parsing of locale modules.
 *
 * Both the record extractor and the table reader work on the swc AST. Node
 * spans are converted back to byte offsets into the original text so the
 * splicer can rebuild the file around them.
 */

use std::ops::Range;

use swc_common::{BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{Decl, Expr, Lit, Module, ModuleDecl, ModuleItem, ObjectLit, Pat, PropName, Stmt, Str, VarDecl};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

use crate::errors::LocaleError;

/// Delimiter style of a string literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    Double,
    Single,
    /// Template literal, may span lines
    Backtick,
}

impl QuoteStyle {
    pub fn delimiter(self) -> char {
        match self {
            Self::Double => '"',
            Self::Single => '\'',
            Self::Backtick => '`',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(Self::Double),
            '\'' => Some(Self::Single),
            '`' => Some(Self::Backtick),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuoteStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Double => "double-quoted",
            Self::Single => "single-quoted",
            Self::Backtick => "template",
        };
        write!(f, "{}", name)
    }
}

/// A parsed locale module together with its source text
pub struct ParsedLocale<'a> {
    pub module: Module,
    source: &'a str,
    source_map: SourceMap,
    start: BytePos,
}

/// Parse `source` as a TypeScript module
pub fn parse_locale(source: &str) -> Result<ParsedLocale<'_>, LocaleError> {
    let source_map = SourceMap::default();
    let source_file = source_map.new_source_file(FileName::Anon.into(), source.to_string());
    let start = source_file.start_pos;

    let syntax = Syntax::Typescript(TsSyntax::default());
    let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
    let module = parser
        .parse_module()
        .map_err(|e| syntax_error(&source_map, e.span().lo, e.kind().msg()))?;

    // Recovered errors still mean the file is malformed
    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(syntax_error(&source_map, e.span().lo, e.kind().msg()));
    }

    Ok(ParsedLocale {
        module,
        source,
        source_map,
        start,
    })
}

fn syntax_error(source_map: &SourceMap, pos: BytePos, message: impl Into<String>) -> LocaleError {
    let loc = source_map.lookup_char_pos(pos);
    LocaleError::Syntax {
        line: loc.line,
        column: loc.col.0 + 1,
        message: message.into(),
    }
}

impl<'a> ParsedLocale<'a> {
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Byte offset of `pos` in the source text
    pub fn offset(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.start.0) as usize
    }

    /// Source text covered by `span`
    pub fn slice(&self, span: Span) -> &'a str {
        &self.source[self.offset(span.lo)..self.offset(span.hi)]
    }

    /// Byte range between the delimiters of a string or template literal
    pub fn inner_range(&self, span: Span) -> Range<usize> {
        self.offset(span.lo) + 1..self.offset(span.hi) - 1
    }

    /// 1-based line and column of `pos`
    pub fn line_col(&self, pos: BytePos) -> (usize, usize) {
        let loc = self.source_map.lookup_char_pos(pos);
        (loc.line, loc.col.0 + 1)
    }

    pub fn error_at(&self, pos: BytePos, message: impl Into<String>) -> LocaleError {
        syntax_error(&self.source_map, pos, message)
    }

    /// Error positioned at line 1, column 1
    pub fn error_at_start(&self, message: impl Into<String>) -> LocaleError {
        self.error_at(self.start, message)
    }

    /// Decoded value of a string literal
    pub fn string_value(&self, literal: &Str) -> String {
        match literal.value.as_str() {
            Some(value) => value.to_string(),
            // Lone surrogates have no UTF-8 form; keep the escapes as written
            None => self.source[self.inner_range(literal.span)].to_string(),
        }
    }

    /// Flat key text; `None` for keys that are not a name, string or number
    pub fn key_text(&self, key: &PropName) -> Option<String> {
        match key {
            PropName::Ident(ident) => Some(ident.sym.to_string()),
            PropName::Str(literal) => Some(self.string_value(literal)),
            PropName::Num(number) => Some(self.slice(number.span).to_string()),
            PropName::Computed(computed) => match &*computed.expr {
                Expr::Lit(Lit::Str(literal)) => Some(self.string_value(literal)),
                Expr::Lit(Lit::Num(_)) | Expr::Ident(_) | Expr::Member(_) => {
                    Some(self.slice(computed.expr.span()).to_string())
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// First `const <name> = { ... }` or `export default { ... }` object
    pub fn root_object(&self) -> Option<(Option<String>, &ObjectLit)> {
        self.module.body.iter().find_map(|item| match item {
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => var_object(var),
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
                Decl::Var(var) => var_object(var),
                _ => None,
            },
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                object_of(&export.expr).map(|object| (None, object))
            }
            _ => None,
        })
    }
}

fn var_object(var: &VarDecl) -> Option<(Option<String>, &ObjectLit)> {
    var.decls.iter().find_map(|decl| {
        let Pat::Ident(binding) = &decl.name else {
            return None;
        };
        let object = object_of(decl.init.as_deref()?)?;
        Some((Some(binding.id.sym.to_string()), object))
    })
}

/// Look through `( ... )`, `as T`, `satisfies T` and `as const`
pub fn object_of(expr: &Expr) -> Option<&ObjectLit> {
    match expr {
        Expr::Object(object) => Some(object),
        Expr::Paren(inner) => object_of(&inner.expr),
        Expr::TsAs(inner) => object_of(&inner.expr),
        Expr::TsSatisfies(inner) => object_of(&inner.expr),
        Expr::TsConstAssertion(inner) => object_of(&inner.expr),
        _ => None,
    }
}
