use std::collections::HashSet;

use swc_core::ecma::ast::{
    ArrowExpr, BlockStmt, ClassDecl, Constructor, FnDecl, Function, ObjectPatProp, Pat, VarDecl,
    VarDeclKind,
};
use swc_core::ecma::visit::{Visit, VisitWith};

/// Lexical shadow tracker.
///
/// The rewriter must never touch an identifier whose binding is a local
/// declaration rather than the aggregate import, and it must not skip one
/// that does refer to the import either: the aggregate import is removed at
/// file exit, so a skipped live usage would dangle. The visitor therefore
/// pushes a frame around every function-like construct, block and loop head,
/// records the names bound there as they are declared, and pre-declares the
/// names classic hoisting lifts to function scope (`var` declarators and
/// function declarations) on function entry. A name found in any live frame
/// is shadowed and exempt from rewriting.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<HashSet<String>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![HashSet::new()],
        }
    }

    /// Drops every frame and starts over with a single module-level frame.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.frames.push(HashSet::new());
    }

    pub fn push(&mut self) {
        self.frames.push(HashSet::new());
    }

    pub fn pop(&mut self) {
        // The module-level frame always stays.
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn declare(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string());
        }
    }

    /// Records every name bound by a declaration pattern.
    pub fn declare_pat(&mut self, pat: &Pat) {
        pat_names(pat, &mut |name| self.declare(name));
    }

    /// Pre-declares the names hoisted to function scope out of `body`:
    /// `var` declarators and function declarations, through nested blocks
    /// but not into nested functions. Keeps a usage that textually precedes
    /// its `var` from being mistaken for a use of the import.
    pub fn hoist_function_scope(&mut self, body: &BlockStmt) {
        let mut names = HashSet::new();
        let mut collector = HoistedBindings { out: &mut names };
        body.visit_with(&mut collector);
        if let Some(frame) = self.frames.last_mut() {
            frame.extend(names);
        }
    }

    pub fn is_shadowed(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains(name))
    }
}

fn pat_names(pat: &Pat, sink: &mut impl FnMut(&str)) {
    match pat {
        Pat::Ident(binding) => sink(binding.id.sym.as_ref()),
        Pat::Array(array) => {
            for element in array.elems.iter().flatten() {
                pat_names(element, sink);
            }
        }
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => pat_names(&kv.value, sink),
                    ObjectPatProp::Assign(assign) => sink(assign.key.id.sym.as_ref()),
                    ObjectPatProp::Rest(rest) => pat_names(&rest.arg, sink),
                }
            }
        }
        Pat::Assign(assign) => pat_names(&assign.left, sink),
        Pat::Rest(rest) => pat_names(&rest.arg, sink),
        Pat::Invalid(_) | Pat::Expr(_) => {}
    }
}

/// Collects function-scoped binding names within one function body: `var`
/// declarators and function declaration names, descending through blocks,
/// loops and switch cases but stopping at nested function boundaries.
struct HoistedBindings<'a> {
    out: &'a mut HashSet<String>,
}

impl Visit for HoistedBindings<'_> {
    fn visit_var_decl(&mut self, decl: &VarDecl) {
        if decl.kind == VarDeclKind::Var {
            for declarator in &decl.decls {
                pat_names(&declarator.name, &mut |name| {
                    self.out.insert(name.to_string());
                });
            }
        }
        // Initializers cannot contain further statements outside nested
        // functions, which are a different scope.
    }

    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        self.out.insert(decl.ident.sym.to_string());
    }

    // `class` and `let`/`const` are block-scoped, not hoisted; they are
    // tracked dynamically as their declarations are visited.
    fn visit_class_decl(&mut self, _decl: &ClassDecl) {}

    // Nested function scopes keep their bindings to themselves.
    fn visit_function(&mut self, _function: &Function) {}
    fn visit_arrow_expr(&mut self, _arrow: &ArrowExpr) {}
    fn visit_constructor(&mut self, _ctor: &Constructor) {}
}

#[cfg(test)]
mod tests {
    use super::ScopeStack;

    #[test]
    fn declared_names_shadow_until_frame_pops() {
        let mut scopes = ScopeStack::new();
        assert!(!scopes.is_shadowed("Button"));

        scopes.push();
        scopes.declare("Button");
        assert!(scopes.is_shadowed("Button"));
        assert!(!scopes.is_shadowed("Alert"));

        scopes.pop();
        assert!(!scopes.is_shadowed("Button"));
    }

    #[test]
    fn module_frame_survives_pop() {
        let mut scopes = ScopeStack::new();
        scopes.declare("top");
        scopes.pop();
        scopes.pop();
        assert!(scopes.is_shadowed("top"));
    }

    #[test]
    fn reset_clears_all_frames() {
        let mut scopes = ScopeStack::new();
        scopes.declare("top");
        scopes.push();
        scopes.declare("inner");
        scopes.reset();
        assert!(!scopes.is_shadowed("top"));
        assert!(!scopes.is_shadowed("inner"));
    }
}
