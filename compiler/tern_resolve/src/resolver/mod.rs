//! The scope and kind resolver.
//!
//! One lexical walk over the program with a stack of scope tables. Index 0 is
//! the global scope, seeded with the builtins. Every scope pushed here has a
//! runtime frame counterpart in the interpreter, so the distance between two
//! scopes at resolution time is exactly the number of parent hops at run time:
//!
//! | construct            | scopes                                  |
//! |----------------------|-----------------------------------------|
//! | block, branch body   | one                                     |
//! | loop body            | one (a fresh frame per iteration)       |
//! | try body, catch body | one each; the catch binding lives in it |
//! | function literal     | one, holding the parameters             |
//! | class body           | `super` (if inherited), then `this`     |
//!
//! Names found only in the global scope, or nowhere, are left unresolved and
//! looked up by name at run time.

mod expr;
mod stmt;


use rustc_hash::FxHashMap;
use tern_ir::{
    ClassId, ExprArena, ExprId, ExprKind, FunctionId, Name, ParsedType, Program, Span, StmtKind,
    StringInterner, BUILTIN_SIGNATURES,
};

use crate::{Callee, FnKind, Kind, Resolution, ResolveError, ResolveErrorKind, ResolveErrors};

/// Resolve `program` with the default entry point `main`.
pub fn resolve(program: &Program) -> Result<Resolution, ResolveErrors> {
    Resolver::new(program).resolve()
}

#[derive(Debug)]
struct Binding {
    initialized: bool,
    kind: Kind,
}

type Scope = FxHashMap<Name, Binding>;

/// What the resolver knows about one class definition.
#[derive(Debug, Default)]
struct ClassInfo {
    superclass: Option<ClassId>,
    fields: FxHashMap<Name, Kind>,
    methods: FxHashMap<Name, FnKind>,
}

/// The class whose body is being resolved.
#[derive(Clone, Copy, Debug)]
struct ClassContext {
    name: Name,
    inherits: bool,
}

/// Walks one program and produces its [`Resolution`].
pub struct Resolver<'a> {
    program: &'a Program,
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    entry_point: Name,
    scopes: Vec<Scope>,
    /// Kinds of top-level functions and classes, visible before their
    /// declaration is reached. Never affects initialization checks.
    hoisted: FxHashMap<Name, Kind>,
    classes: FxHashMap<ClassId, ClassInfo>,
    function_depth: usize,
    class_stack: Vec<ClassContext>,
    resolution: Resolution,
    errors: Vec<ResolveError>,
}

impl<'a> Resolver<'a> {
    pub fn new(program: &'a Program) -> Self {
        Resolver {
            program,
            arena: &program.arena,
            interner: &program.interner,
            entry_point: Name::MAIN,
            scopes: vec![Scope::default()],
            hoisted: FxHashMap::default(),
            classes: FxHashMap::default(),
            function_depth: 0,
            class_stack: Vec::new(),
            resolution: Resolution::with_capacity(program.arena.expr_count()),
            errors: Vec::new(),
        }
    }

    /// Require a different top-level function as the entry point.
    #[must_use]
    pub fn with_entry_point(mut self, name: Name) -> Self {
        self.entry_point = name;
        self
    }

    #[tracing::instrument(level = "debug", skip_all, fields(items = self.program.items.len()))]
    pub fn resolve(mut self) -> Result<Resolution, ResolveErrors> {
        self.seed_builtins();
        self.hoist();
        self.check_entry_point();

        let program = self.program;
        for &item in &*program.items {
            self.resolve_stmt(item);
        }

        tracing::debug!(
            locals = self.resolution.local_count(),
            errors = self.errors.len(),
            "resolution complete"
        );

        match ResolveErrors::new(self.errors) {
            Some(errors) => Err(errors),
            None => Ok(self.resolution),
        }
    }

    fn seed_builtins(&mut self) {
        let global = &mut self.scopes[0];
        for sig in BUILTIN_SIGNATURES {
            let kind = Kind::function(
                Callee::Builtin(sig.name),
                sig.params.iter().copied().map(Kind::from_parsed).collect(),
                Kind::from_parsed(sig.ret),
            );
            global.insert(
                self.interner.intern(sig.name),
                Binding {
                    initialized: true,
                    kind,
                },
            );
        }
    }

    /// Record kinds for top-level functions and classes so that forward
    /// references from function bodies are typed.
    fn hoist(&mut self) {
        let (program, arena) = (self.program, self.arena);
        // Classes first: function signatures may name them.
        for &item in &*program.items {
            if let StmtKind::Class(class) = arena.stmt(item).kind {
                self.hoisted.insert(arena.class(class).name, Kind::Class(class));
            }
        }
        for &item in &*program.items {
            match arena.stmt(item).kind {
                StmtKind::Let { name, init } => {
                    if let ExprKind::Function(f) = arena.expr(init).kind {
                        let kind = self.function_kind(f);
                        self.hoisted.insert(name, kind);
                    }
                }
                StmtKind::Class(class) => {
                    let superclass_expr = arena.class(class).superclass.map(|s| &arena.expr(s).kind);
                    let superclass = match superclass_expr {
                        Some(ExprKind::Ident(name)) => match self.hoisted.get(name) {
                            Some(Kind::Class(id)) if *id != class => Some(*id),
                            _ => None,
                        },
                        _ => None,
                    };
                    self.register_class(class, superclass);
                }
                _ => {}
            }
        }
    }

    fn check_entry_point(&mut self) {
        let entry = self.program.items.iter().find_map(|&item| {
            let stmt = self.arena.stmt(item);
            match stmt.kind {
                StmtKind::Let { name, init } if name == self.entry_point => {
                    match self.arena.expr(init).kind {
                        ExprKind::Function(f) => Some(f),
                        _ => None,
                    }
                }
                _ => None,
            }
        });

        let name = self.interner.lookup(self.entry_point).to_owned();
        match entry {
            None => self.error(ResolveErrorKind::MissingEntryPoint { name }, Span::DUMMY),
            Some(f) => {
                let def = self.arena.function(f);
                if def.arity() > 0 {
                    let arity = def.arity();
                    self.error(
                        ResolveErrorKind::EntryPointTakesParams { name, arity },
                        def.span,
                    );
                }
            }
        }
    }

    // Scopes

    fn with_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push(Scope::default());
        tracing::trace!(depth = self.scopes.len(), "enter scope");
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn innermost(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Add an uninitialized binding to the innermost scope.
    fn declare(&mut self, name: Name, span: Span) {
        if self.innermost().contains_key(&name) {
            let name = self.interner.lookup(name).to_owned();
            self.error(ResolveErrorKind::Redeclaration { name }, span);
            return;
        }
        self.innermost().insert(
            name,
            Binding {
                initialized: false,
                kind: Kind::Dynamic,
            },
        );
    }

    /// Give a declared binding its kind without marking it initialized.
    fn set_pending_kind(&mut self, name: Name, kind: Kind) {
        if let Some(binding) = self.innermost().get_mut(&name) {
            binding.kind = kind;
        }
    }

    fn define(&mut self, name: Name, kind: Kind) {
        self.innermost()
            .insert(name, Binding { initialized: true, kind });
    }

    /// Declare and define in one step.
    fn bind(&mut self, name: Name, kind: Kind, span: Span) {
        self.declare(name, span);
        self.define(name, kind);
    }

    /// Find `name` for a read, recording the hop count on `expr` when the
    /// binding lives in a non-global scope.
    fn lookup(&mut self, expr: ExprId, name: Name, span: Span) -> Kind {
        let innermost = self.scopes.len() - 1;
        let found = self
            .scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| scope.get(&name).map(|b| (depth, b)));

        match found {
            Some((depth, binding)) if !binding.initialized && depth == innermost => {
                let name = self.interner.lookup(name).to_owned();
                self.error(ResolveErrorKind::SelfReference { name }, span);
                Kind::Dynamic
            }
            Some((depth, binding)) => {
                let kind = binding.kind.clone();
                if depth > 0 {
                    self.resolution.record_hops(expr, innermost - depth);
                }
                kind
            }
            None => self.hoisted.get(&name).cloned().unwrap_or(Kind::Dynamic),
        }
    }

    /// Find `name` for a write. Records the hop count like [`Self::lookup`]
    /// and degrades the binding to `Dynamic` when `value` has another kind.
    fn lookup_for_assign(&mut self, expr: ExprId, name: Name, value: &Kind) -> Kind {
        let innermost = self.scopes.len() - 1;
        let Some((depth, binding)) = self
            .scopes
            .iter_mut()
            .enumerate()
            .rev()
            .find_map(|(depth, scope)| scope.get_mut(&name).map(|b| (depth, b)))
        else {
            return Kind::Dynamic;
        };

        if binding.kind != *value {
            binding.kind = Kind::Dynamic;
        }
        let kind = binding.kind.clone();
        if depth > 0 {
            self.resolution.record_hops(expr, innermost - depth);
        }
        kind
    }

    // Classes

    fn register_class(&mut self, class: ClassId, superclass: Option<ClassId>) {
        let def = self.arena.class(class);
        let methods = def
            .methods
            .iter()
            .map(|&m| {
                let method = self.arena.function(m);
                (method.name, self.function_signature(m))
            })
            .collect();
        let info = self.classes.entry(class).or_default();
        info.superclass = superclass;
        info.methods = methods;
    }

    /// `class` followed by its ancestors, stopping at unknown classes and
    /// at the first repeated class.
    fn class_chain(&self, class: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(id) = current {
            if chain.contains(&id) || !self.classes.contains_key(&id) {
                break;
            }
            chain.push(id);
            current = self.classes.get(&id).and_then(|info| info.superclass);
        }
        chain
    }

    /// Whether following superclasses from `class` reaches a class twice.
    fn has_cyclic_chain(&self, class: ClassId) -> bool {
        let chain = self.class_chain(class);
        chain
            .last()
            .and_then(|last| self.classes.get(last))
            .and_then(|info| info.superclass)
            .is_some_and(|next| chain.contains(&next))
    }

    fn method_kind(&self, class: ClassId, method: Name) -> Option<&FnKind> {
        self.class_chain(class)
            .into_iter()
            .find_map(|c| self.classes.get(&c).and_then(|info| info.methods.get(&method)))
    }

    /// Kind of `instance.member`: fields first, then methods.
    fn member_kind(&self, class: ClassId, member: Name) -> Kind {
        let chain = self.class_chain(class);
        if let Some(kind) = chain
            .iter()
            .find_map(|c| self.classes.get(c).and_then(|info| info.fields.get(&member)))
        {
            return kind.clone();
        }
        chain
            .iter()
            .find_map(|c| self.classes.get(c).and_then(|info| info.methods.get(&member)))
            .map_or(Kind::Dynamic, |fk| Kind::Fn(Box::new(fk.clone())))
    }

    /// Record that `class` instances carry `field` of kind `value`.
    fn note_field(&mut self, class: ClassId, field: Name, value: &Kind) -> Kind {
        let info = self.classes.entry(class).or_default();
        let kind = info.fields.entry(field).or_insert_with(|| value.clone());
        if *kind != *value {
            *kind = Kind::Dynamic;
        }
        kind.clone()
    }

    // Functions

    fn function_signature(&self, f: FunctionId) -> FnKind {
        let def = self.arena.function(f);
        FnKind {
            callee: Callee::Function(f),
            params: def.params.iter().map(|p| self.annotation_kind(p.ty)).collect(),
            ret: self.annotation_kind(def.ret),
        }
    }

    /// Kind of a declared annotation. A class name is looked up like any
    /// other name: innermost scope first, then the hoisted top-level classes.
    fn annotation_kind(&self, ty: ParsedType) -> Kind {
        let ParsedType::Named(name) = ty else {
            return Kind::from_parsed(ty);
        };
        let bound = self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .map(|binding| &binding.kind);
        match bound.or_else(|| self.hoisted.get(&name)) {
            Some(Kind::Class(class)) => Kind::Instance(*class),
            _ => Kind::Dynamic,
        }
    }

    fn function_kind(&self, f: FunctionId) -> Kind {
        Kind::Fn(Box::new(self.function_signature(f)))
    }

    fn error(&mut self, kind: ResolveErrorKind, span: Span) {
        tracing::debug!(%kind, %span, "resolve error");
        self.errors.push(ResolveError::new(kind, span));
    }
}
