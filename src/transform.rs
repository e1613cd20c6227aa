use std::collections::{HashMap, HashSet};

use swc_core::common::BytePos;
use swc_core::ecma::ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, CallExpr, CatchClause, ClassDecl, ClassExpr,
    Constructor, Expr, FnDecl, FnExpr, ForInStmt, ForOfStmt, ForStmt, Function, Id, Ident,
    IdentName, ImportSpecifier, KeyValueProp, MemberExpr, Module, ModuleDecl, ModuleItem,
    ParamOrTsParamProp, Program, Prop, PropName, SwitchStmt, VarDeclarator,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::config::{PluginConfig, StyleMode};
use crate::imports::{to_kebab_case, ImportInjector};
use crate::scope::ScopeStack;

/// Rewrites aggregate component-library imports into per-component imports.
///
/// One pass over one file's tree: aggregate imports from the configured
/// library are collected up front, every recognized usage of a collected name
/// is redirected to a freshly synthesized per-component import, and the
/// aggregate import statements are removed once the whole file has been
/// visited. All per-file state resets on module entry, so a single value can
/// process many files in sequence.
pub struct OnDemandImportTransform {
    config: PluginConfig,
    /// Local binding of an aggregate import -> identity (span start) of the
    /// import statement that introduced it.
    tracked: HashMap<Id, BytePos>,
    /// Aggregate import statements scheduled for removal at file exit.
    consumed: HashSet<BytePos>,
    scopes: ScopeStack,
    injector: ImportInjector,
}

impl OnDemandImportTransform {
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            tracked: HashMap::new(),
            consumed: HashSet::new(),
            scopes: ScopeStack::new(),
            injector: ImportInjector::new(),
        }
    }

    // ---------- file lifecycle ----------

    fn enter_file(&mut self, module: &Module) {
        self.tracked.clear();
        self.consumed.clear();
        self.scopes.reset();
        self.injector.reset_for_module(module);
        self.collect_aggregate_imports(module);
    }

    /// Import Collector: records every local name bound by an aggregate
    /// import of the configured library. No tree mutation here. Scanning the
    /// statement list up front makes a usage that precedes its import in
    /// document order behave the same as one that follows it.
    fn collect_aggregate_imports(&mut self, module: &Module) {
        for item in &module.body {
            let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
                continue;
            };
            if import.src.value.as_ref() != self.config.library_name {
                continue;
            }
            // `import 'lib'` binds nothing and is someone else's side effect.
            if import.specifiers.is_empty() {
                continue;
            }
            self.consumed.insert(import.span.lo);
            for spec in &import.specifiers {
                let local = match spec {
                    ImportSpecifier::Named(named) => &named.local,
                    ImportSpecifier::Default(def) => &def.local,
                    ImportSpecifier::Namespace(ns) => &ns.local,
                };
                self.tracked.insert(local.to_id(), import.span.lo);
            }
        }
    }

    /// Cleanup: removes every recorded aggregate import still present.
    /// `retain` skips statements that are already gone, so running this twice
    /// is a no-op, never an error. Injected imports carry dummy spans and are
    /// never candidates.
    fn remove_consumed_imports(&self, module: &mut Module) {
        if self.consumed.is_empty() {
            return;
        }
        module.body.retain(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                import.span.is_dummy() || !self.consumed.contains(&import.span.lo)
            }
            _ => true,
        });
    }

    // ---------- rewriting ----------

    /// A usage site qualifies only if the name is not shadowed by a local
    /// binding and its id is one the collector recorded. The same guard
    /// applies to all four usage shapes.
    fn is_tracked_use(&self, ident: &Ident) -> bool {
        !self.scopes.is_shadowed(ident.sym.as_ref()) && self.tracked.contains_key(&ident.to_id())
    }

    /// Import Synthesizer: derives the component path from the original name,
    /// obtains a default-import binding for it, requests the style side
    /// effect the configuration asks for, and returns the reference to
    /// substitute at the usage site. Called once per usage site; the injector
    /// collapses repeated paths into a single declaration.
    fn synthesize(&mut self, original_name: &str) -> Ident {
        let component_path = format!(
            "{}/{}/{}",
            self.config.library_name,
            self.config.library_directory,
            to_kebab_case(original_name)
        );
        let local = self.injector.default_import(&component_path, original_name);
        match self.config.style {
            StyleMode::Full => self
                .injector
                .side_effect_import(&format!("{component_path}/style/index.js")),
            StyleMode::Css => self
                .injector
                .side_effect_import(&format!("{component_path}/style/css.js")),
            StyleMode::None => {}
        }
        local
    }

    /// Replaces `expr` with a synthesized reference when it is a tracked
    /// identifier use. Returns whether a rewrite happened.
    fn rewrite_ident_use(&mut self, expr: &mut Expr) -> bool {
        let Expr::Ident(ident) = &*expr else {
            return false;
        };
        if !self.is_tracked_use(ident) {
            return false;
        }
        let name = ident.sym.to_string();
        *expr = Expr::Ident(self.synthesize(&name));
        true
    }
}

impl VisitMut for OnDemandImportTransform {
    /// Scripts cannot contain import declarations, so there is nothing to
    /// collect or rewrite in one; it passes through untouched. State from a
    /// previously processed module is dropped so it cannot leak into the
    /// script's identifiers.
    fn visit_mut_program(&mut self, program: &mut Program) {
        match program {
            Program::Module(module) => module.visit_mut_with(self),
            Program::Script(_) => {
                self.tracked.clear();
                self.consumed.clear();
                self.scopes.reset();
            }
        }
    }

    fn visit_mut_module(&mut self, module: &mut Module) {
        self.enter_file(module);
        module.visit_mut_children_with(self);
        self.remove_consumed_imports(module);
        self.injector.flush_into(module);
    }

    // ----- the four usage shapes -----

    /// Call argument: `console.log(Button)`.
    fn visit_mut_call_expr(&mut self, call: &mut CallExpr) {
        for arg in &mut call.args {
            if arg.spread.is_none() {
                self.rewrite_ident_use(&mut arg.expr);
            }
        }
        call.visit_mut_children_with(self);
    }

    /// Member base: `message.info('hi')`.
    fn visit_mut_member_expr(&mut self, member: &mut MemberExpr) {
        self.rewrite_ident_use(&mut member.obj);
        member.visit_mut_children_with(self);
    }

    /// Object-literal property value: `{ a: Button }`, including the
    /// shorthand form `{ Button }`, which expands to `{ Button: _Button }`.
    fn visit_mut_prop(&mut self, prop: &mut Prop) {
        match prop {
            Prop::KeyValue(kv) => {
                self.rewrite_ident_use(&mut kv.value);
            }
            Prop::Shorthand(ident) => {
                if self.is_tracked_use(ident) {
                    let name = ident.sym.clone();
                    let span = ident.span;
                    let local = self.synthesize(name.as_ref());
                    *prop = Prop::KeyValue(KeyValueProp {
                        key: PropName::Ident(IdentName::new(name, span)),
                        value: Box::new(Expr::Ident(local)),
                    });
                }
            }
            _ => {}
        }
        prop.visit_mut_children_with(self);
    }

    /// Variable initializer: `let a = Alert`. The declared name itself starts
    /// shadowing before the initializer is examined, so `let Alert = Alert`
    /// stays untouched.
    fn visit_mut_var_declarator(&mut self, declarator: &mut VarDeclarator) {
        self.scopes.declare_pat(&declarator.name);
        if let Some(init) = &mut declarator.init {
            self.rewrite_ident_use(init);
        }
        declarator.visit_mut_children_with(self);
    }

    // ----- shadow-scope bookkeeping -----

    fn visit_mut_function(&mut self, function: &mut Function) {
        self.scopes.push();
        for param in &function.params {
            self.scopes.declare_pat(&param.pat);
        }
        if let Some(body) = &function.body {
            self.scopes.hoist_function_scope(body);
        }
        function.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        self.scopes.push();
        for pat in &arrow.params {
            self.scopes.declare_pat(pat);
        }
        if let BlockStmtOrExpr::BlockStmt(body) = &*arrow.body {
            self.scopes.hoist_function_scope(body);
        }
        arrow.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_constructor(&mut self, ctor: &mut Constructor) {
        self.scopes.push();
        for param in &ctor.params {
            if let ParamOrTsParamProp::Param(param) = param {
                self.scopes.declare_pat(&param.pat);
            }
        }
        if let Some(body) = &ctor.body {
            self.scopes.hoist_function_scope(body);
        }
        ctor.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_block_stmt(&mut self, block: &mut BlockStmt) {
        self.scopes.push();
        block.visit_mut_children_with(self);
        self.scopes.pop();
    }

    // Loop heads can declare block-scoped names of their own.
    fn visit_mut_for_stmt(&mut self, stmt: &mut ForStmt) {
        self.scopes.push();
        stmt.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_for_in_stmt(&mut self, stmt: &mut ForInStmt) {
        self.scopes.push();
        stmt.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_for_of_stmt(&mut self, stmt: &mut ForOfStmt) {
        self.scopes.push();
        stmt.visit_mut_children_with(self);
        self.scopes.pop();
    }

    // All cases of a switch share one block scope.
    fn visit_mut_switch_stmt(&mut self, stmt: &mut SwitchStmt) {
        self.scopes.push();
        stmt.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_catch_clause(&mut self, clause: &mut CatchClause) {
        self.scopes.push();
        if let Some(param) = &clause.param {
            self.scopes.declare_pat(param);
        }
        clause.visit_mut_children_with(self);
        self.scopes.pop();
    }

    // A named function or class expression's own name is visible inside the
    // expression but not outside it.
    fn visit_mut_fn_expr(&mut self, expr: &mut FnExpr) {
        self.scopes.push();
        if let Some(ident) = &expr.ident {
            self.scopes.declare(ident.sym.as_ref());
        }
        expr.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_class_expr(&mut self, expr: &mut ClassExpr) {
        self.scopes.push();
        if let Some(ident) = &expr.ident {
            self.scopes.declare(ident.sym.as_ref());
        }
        expr.visit_mut_children_with(self);
        self.scopes.pop();
    }

    fn visit_mut_fn_decl(&mut self, decl: &mut FnDecl) {
        self.scopes.declare(decl.ident.sym.as_ref());
        decl.visit_mut_children_with(self);
    }

    fn visit_mut_class_decl(&mut self, decl: &mut ClassDecl) {
        self.scopes.declare(decl.ident.sym.as_ref());
        decl.visit_mut_children_with(self);
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
