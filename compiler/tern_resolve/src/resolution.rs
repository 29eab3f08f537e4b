//! Side tables produced by the resolver.

use rustc_hash::FxHashMap;
use tern_ir::ExprId;

use crate::{CallSig, Kind, OpSig};

/// Annotations keyed by expression id.
///
/// Written once per node during resolution and read-only afterwards. The
/// interpreter consults `hops` for every identifier, `this` and `super`,
/// `ops` for every operator and `calls` for every call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolution {
    locals: FxHashMap<ExprId, usize>,
    kinds: Vec<Option<Kind>>,
    ops: FxHashMap<ExprId, OpSig>,
    calls: FxHashMap<ExprId, CallSig>,
}

static DYNAMIC: Kind = Kind::Dynamic;

impl Resolution {
    pub(crate) fn with_capacity(exprs: usize) -> Self {
        Resolution {
            kinds: vec![None; exprs],
            ..Resolution::default()
        }
    }

    pub(crate) fn record_hops(&mut self, expr: ExprId, hops: usize) {
        let previous = self.locals.insert(expr, hops);
        debug_assert!(previous.is_none(), "hops for {expr:?} recorded twice");
    }

    pub(crate) fn record_kind(&mut self, expr: ExprId, kind: Kind) {
        let index = expr.index();
        if index >= self.kinds.len() {
            self.kinds.resize(index + 1, None);
        }
        debug_assert!(self.kinds[index].is_none(), "kind for {expr:?} recorded twice");
        self.kinds[index] = Some(kind);
    }

    pub(crate) fn record_op(&mut self, expr: ExprId, sig: OpSig) {
        let previous = self.ops.insert(expr, sig);
        debug_assert!(previous.is_none(), "operator signature for {expr:?} recorded twice");
    }

    pub(crate) fn record_call(&mut self, expr: ExprId, sig: CallSig) {
        let previous = self.calls.insert(expr, sig);
        debug_assert!(previous.is_none(), "call signature for {expr:?} recorded twice");
    }

    /// Frames between the use and the declaring frame. `None` means the name
    /// is looked up dynamically in the global frame.
    #[inline]
    pub fn hops(&self, expr: ExprId) -> Option<usize> {
        self.locals.get(&expr).copied()
    }

    /// Static kind of an expression; unvisited nodes read as `Dynamic`.
    #[inline]
    pub fn kind(&self, expr: ExprId) -> &Kind {
        self.kinds
            .get(expr.index())
            .and_then(Option::as_ref)
            .unwrap_or(&DYNAMIC)
    }

    #[inline]
    pub fn op(&self, expr: ExprId) -> Option<&OpSig> {
        self.ops.get(&expr)
    }

    #[inline]
    pub fn call(&self, expr: ExprId) -> Option<&CallSig> {
        self.calls.get(&expr)
    }

    /// Number of identifier uses resolved to a local frame.
    pub fn local_count(&self) -> usize {
        self.locals.len()
    }
}
