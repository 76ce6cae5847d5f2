//! Append-only sink for one generated Go unit.
//!
//! [`GoFile`] wraps a [`CodeWriter`] and records every package a qualified
//! identifier was produced for, so the import block lists exactly what the
//! body uses.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use temporal_schema::MessageRef;

use super::vocabulary::{Pkg, Vocabulary};
use crate::code_writer::{CodeWriter, IndentGuard};

/// Rendered declarations plus the imports they need, keyed by import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoUnit {
    pub body: String,
    pub imports: BTreeMap<String, String>,
}

/// Two import paths wanted the same identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConflict {
    pub alias: String,
    pub first: String,
    pub second: String,
}

impl fmt::Display for ImportConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "import alias {:?} is used for both {:?} and {:?}",
            self.alias, self.first, self.second
        )
    }
}

impl std::error::Error for ImportConflict {}

/// Records `path` under `alias`, reporting a conflict if the alias is taken.
pub fn add_import(
    imports: &mut BTreeMap<String, String>,
    path: &str,
    alias: &str,
) -> Result<(), ImportConflict> {
    if let Some((other, _)) = imports
        .iter()
        .find(|(other, existing)| existing.as_str() == alias && other.as_str() != path)
    {
        return Err(ImportConflict {
            alias: alias.to_string(),
            first: other.clone(),
            second: path.to_string(),
        });
    }
    imports.insert(path.to_string(), alias.to_string());
    Ok(())
}

pub struct GoFile<'a> {
    w: CodeWriter<String>,
    vocabulary: &'a Vocabulary,
    imports: RefCell<BTreeMap<String, String>>,
    conflict: RefCell<Option<ImportConflict>>,
}

impl<'a> GoFile<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        GoFile {
            w: CodeWriter::go(String::new()),
            vocabulary,
            imports: RefCell::new(BTreeMap::new()),
            conflict: RefCell::new(None),
        }
    }

    fn import(&self, path: &str, alias: &str) {
        let mut imports = self.imports.borrow_mut();
        if let Err(conflict) = add_import(&mut imports, path, alias) {
            self.conflict.borrow_mut().get_or_insert(conflict);
        }
    }

    /// `alias.ident` for a vocabulary package, importing it.
    pub fn qual(&self, pkg: Pkg, ident: &str) -> String {
        let import = self.vocabulary.import(pkg);
        self.import(&import.path, &import.alias);
        format!("{}.{ident}", import.alias)
    }

    /// The Go type name of a message, qualified when it lives in another package.
    pub fn message(&self, message: &MessageRef) -> String {
        match &message.go_package {
            Some(package) => {
                self.import(&package.import_path, &package.name);
                format!("{}.{}", package.name, message.go_name)
            }
            None => message.go_name.clone(),
        }
    }

    /// Finishes the unit, failing if two packages claimed the same alias.
    pub fn finish(self) -> Result<GoUnit, ImportConflict> {
        if let Some(conflict) = self.conflict.into_inner() {
            return Err(conflict);
        }
        Ok(GoUnit {
            body: self.w.into_inner(),
            imports: self.imports.into_inner(),
        })
    }

    pub fn write(&mut self, text: &str) -> fmt::Result {
        self.w.write(text)
    }

    pub fn writeln(&mut self, text: &str) -> fmt::Result {
        self.w.writeln(text)
    }

    pub fn blank_line(&mut self) -> fmt::Result {
        self.w.blank_line()
    }

    pub fn indent(&mut self) -> IndentGuard {
        self.w.indent()
    }

    pub fn comment(&mut self, text: &str) -> fmt::Result {
        self.w.comment(text)
    }

    /// Write `header {`, the body one level deeper, then `}`. An empty
    /// header opens a bare scope.
    pub fn block<F>(&mut self, header: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.delimited(header, '{', '}', body)
    }

    /// Write `header (`, the body one level deeper, then `)`.
    pub fn group<F>(&mut self, header: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.delimited(header, '(', ')', body)
    }

    fn delimited<F>(&mut self, header: &str, open: char, close: char, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        if header.is_empty() {
            self.w.writeln(&open.to_string())?;
        } else {
            self.w.writeln(&format!("{header} {open}"))?;
        }
        {
            let _indent = self.w.indent();
            body(self)?;
        }
        self.w.writeln(&close.to_string())
    }

    /// Write a composite literal: `head{`, the fields one level deeper, then
    /// `close` (e.g. `}`, `},` or `})`).
    pub fn composite<F>(&mut self, head: &str, close: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.w.writeln(&format!("{head}{{"))?;
        {
            let _indent = self.w.indent();
            body(self)?;
        }
        self.w.writeln(close)
    }

    /// Use the `cw_write!` macro instead of calling this directly.
    #[doc(hidden)]
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.w.write_fmt(args)
    }

    /// Use the `cw_writeln!` macro instead of calling this directly.
    #[doc(hidden)]
    pub fn writeln_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        self.w.writeln_fmt(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cw_writeln;
    use temporal_schema::GoPackage;

    #[test]
    fn only_used_packages_are_imported() {
        let vocabulary = Vocabulary::default();
        let mut f = GoFile::new(&vocabulary);
        let ctx = f.qual(Pkg::Workflow, "Context");
        cw_writeln!(f, "func f(ctx {ctx}) {{}}").unwrap();

        let unit = f.finish().unwrap();
        assert_eq!(unit.body, "func f(ctx workflow.Context) {}\n");
        assert_eq!(
            unit.imports.into_iter().collect::<Vec<_>>(),
            [(
                "go.temporal.io/sdk/workflow".to_string(),
                "workflow".to_string()
            )]
        );
    }

    #[test]
    fn foreign_messages_are_qualified() {
        let vocabulary = Vocabulary::default();
        let f = GoFile::new(&vocabulary);
        let local = MessageRef::local("example.v1.Local");
        let foreign = MessageRef::local("common.v1.Money")
            .in_package(GoPackage::from_go_package_option("github.com/acme/common/v1;commonv1"));

        assert_eq!(f.message(&local), "Local");
        assert_eq!(f.message(&foreign), "commonv1.Money");
        let unit = f.finish().unwrap();
        assert_eq!(
            unit.imports.get("github.com/acme/common/v1").map(String::as_str),
            Some("commonv1")
        );
    }

    #[test]
    fn alias_clash_is_reported() {
        let vocabulary = Vocabulary::default();
        let f = GoFile::new(&vocabulary);
        let clash = MessageRef::local("acme.client.Config")
            .in_package(GoPackage::from_go_package_option("github.com/acme/client"));
        f.qual(Pkg::Client, "Client");
        f.message(&clash);

        let conflict = f.finish().unwrap_err();
        assert_eq!(conflict.alias, "client");
        assert_eq!(conflict.second, "github.com/acme/client");
    }
}
