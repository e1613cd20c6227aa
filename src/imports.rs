use std::collections::{HashMap, HashSet};

use swc_core::common::{SyntaxContext, DUMMY_SP};
use swc_core::ecma::ast::{
    BindingIdent, ClassDecl, FnDecl, Ident, ImportDecl, ImportDefaultSpecifier, ImportPhase,
    ImportSpecifier, Module, ModuleDecl, ModuleItem, Str,
};
use swc_core::ecma::utils::prepend_stmts;
use swc_core::ecma::visit::{Visit, VisitWith};

// -----------------------------------------------------------------------------
// Name derivation
// -----------------------------------------------------------------------------

/// Derives the component's sub-module name: every ASCII uppercase letter is
/// lower-cased and, except at the very start, preceded by a dash.
/// `DatePicker` becomes `date-picker`, `message` stays `message`.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (index, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index != 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Import injection
// -----------------------------------------------------------------------------

enum PendingImport {
    Default { path: String, local: Ident },
    SideEffect { path: String },
}

/// Queues per-component imports during a file's traversal and materializes
/// them at the top of the module afterwards.
///
/// Two contracts callers rely on:
/// - `default_import` deduplicates by module path: repeated requests for the
///   same path return the one local already minted, so a name used at many
///   sites still produces a single import declaration;
/// - `side_effect_import` inserts a given path at most once per file.
#[derive(Default)]
pub struct ImportInjector {
    used_names: HashSet<String>,
    defaults_by_path: HashMap<String, Ident>,
    side_effect_paths: HashSet<String>,
    pending: Vec<PendingImport>,
}

impl ImportInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-file reinitialization. Seeds the used-name set with every binding
    /// name already present in the module so minted locals never collide.
    pub fn reset_for_module(&mut self, module: &Module) {
        self.used_names.clear();
        self.defaults_by_path.clear();
        self.side_effect_paths.clear();
        self.pending.clear();

        let mut collector = BindingNameCollector {
            out: &mut self.used_names,
        };
        module.visit_with(&mut collector);
    }

    /// Returns a reference to the default export of `module_path`, queueing a
    /// fresh default-import declaration if one is not already pending.
    pub fn default_import(&mut self, module_path: &str, name_hint: &str) -> Ident {
        if let Some(existing) = self.defaults_by_path.get(module_path) {
            return existing.clone();
        }
        let local = self.mint_local(name_hint);
        self.defaults_by_path
            .insert(module_path.to_string(), local.clone());
        self.pending.push(PendingImport::Default {
            path: module_path.to_string(),
            local: local.clone(),
        });
        local
    }

    /// Queues an import of `module_path` purely for its evaluation side
    /// effects. Requesting the same path again is a no-op.
    pub fn side_effect_import(&mut self, module_path: &str) {
        if self.side_effect_paths.insert(module_path.to_string()) {
            self.pending.push(PendingImport::SideEffect {
                path: module_path.to_string(),
            });
        }
    }

    /// Inserts every queued declaration, in synthesis order, at the top of
    /// the module (after any directive prologue).
    pub fn flush_into(&mut self, module: &mut Module) {
        if self.pending.is_empty() {
            return;
        }
        let decls: Vec<ModuleItem> = self
            .pending
            .drain(..)
            .map(|pending| match pending {
                PendingImport::Default { path, local } => import_decl(
                    path,
                    vec![ImportSpecifier::Default(ImportDefaultSpecifier {
                        span: DUMMY_SP,
                        local,
                    })],
                ),
                PendingImport::SideEffect { path } => import_decl(path, vec![]),
            })
            .collect();
        prepend_stmts(&mut module.body, decls.into_iter());
    }

    fn mint_local(&mut self, hint: &str) -> Ident {
        let base = format!("_{hint}");
        let mut name = base.clone();
        let mut suffix = 1u32;
        while self.used_names.contains(&name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        self.used_names.insert(name.clone());
        Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())
    }
}

fn import_decl(path: String, specifiers: Vec<ImportSpecifier>) -> ModuleItem {
    ModuleItem::ModuleDecl(ModuleDecl::Import(ImportDecl {
        span: DUMMY_SP,
        specifiers,
        src: Box::new(Str {
            span: DUMMY_SP,
            value: path.into(),
            raw: None,
        }),
        type_only: false,
        with: None,
        phase: ImportPhase::Evaluation,
    }))
}

// -----------------------------------------------------------------------------
// Binding name collection
// -----------------------------------------------------------------------------

struct BindingNameCollector<'a> {
    out: &'a mut HashSet<String>,
}

impl Visit for BindingNameCollector<'_> {
    fn visit_binding_ident(&mut self, ident: &BindingIdent) {
        self.out.insert(ident.id.sym.to_string());
        ident.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        self.out.insert(decl.ident.sym.to_string());
        decl.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        self.out.insert(decl.ident.sym.to_string());
        decl.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, import: &ImportDecl) {
        for spec in &import.specifiers {
            let local = match spec {
                ImportSpecifier::Named(named) => &named.local,
                ImportSpecifier::Default(def) => &def.local,
                ImportSpecifier::Namespace(ns) => &ns.local,
            };
            self.out.insert(local.sym.to_string());
        }
        import.visit_children_with(self);
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_lowers_and_dashes() {
        assert_eq!(to_kebab_case("Button"), "button");
        assert_eq!(to_kebab_case("DatePicker"), "date-picker");
        assert_eq!(to_kebab_case("DatePickerPanel"), "date-picker-panel");
        assert_eq!(to_kebab_case("message"), "message");
    }

    #[test]
    fn kebab_case_never_emits_leading_dash() {
        assert!(!to_kebab_case("Alert").starts_with('-'));
        assert_eq!(to_kebab_case("A"), "a");
        assert_eq!(to_kebab_case(""), "");
    }

    #[test]
    fn default_import_dedupes_by_path() {
        let mut injector = ImportInjector::new();
        let first = injector.default_import("lib/es/button", "Button");
        let second = injector.default_import("lib/es/button", "Button");
        assert_eq!(first.sym, second.sym);
        assert_eq!(injector.pending.len(), 1);
    }

    #[test]
    fn distinct_paths_with_same_hint_get_distinct_locals() {
        let mut injector = ImportInjector::new();
        let first = injector.default_import("lib/es/button", "Button");
        let second = injector.default_import("lib/lib/button", "Button");
        assert_eq!(first.sym.as_ref(), "_Button");
        assert_eq!(second.sym.as_ref(), "_Button1");
    }

    #[test]
    fn side_effect_import_is_idempotent() {
        let mut injector = ImportInjector::new();
        injector.side_effect_import("lib/es/button/style/index.js");
        injector.side_effect_import("lib/es/button/style/index.js");
        assert_eq!(injector.pending.len(), 1);
    }
}
