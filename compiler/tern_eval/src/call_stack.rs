//! Live call stack: depth limit and backtraces.

use tern_ir::Span;

use crate::errors::{stack_overflow, BacktraceFrame, EvalBacktrace, EvalError};

/// Default limit on nested calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// A single active call.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Function, method or class name.
    pub name: &'static str,
    /// Span of the call expression (not the definition).
    pub call_span: Option<Span>,
}

/// Stack of active calls.
///
/// Every user call pushes a frame and pops it on the way out, whatever the
/// outcome. The depth check lives in [`CallStack::push`].
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        CallStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a call frame. On overflow the frame is not pushed.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if self.frames.len() >= self.max_depth {
            return Err(stack_overflow(self.max_depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Snapshot, most recent call first.
    pub fn capture(&self) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|f| BacktraceFrame {
                name: f.name.to_string(),
                span: f.call_span,
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a backtrace to `err` unless it already has one or no call is
    /// active.
    pub fn attach_backtrace(&self, err: EvalError) -> EvalError {
        if self.frames.is_empty() || err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture())
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALL_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{division_by_zero, EvalErrorKind};

    fn frame(name: &'static str) -> CallFrame {
        CallFrame {
            name,
            call_span: None,
        }
    }

    #[test]
    fn push_respects_the_limit() {
        let mut stack = CallStack::new(2);
        assert!(stack.push(frame("a")).is_ok());
        assert!(stack.push(frame("b")).is_ok());
        let err = stack.push(frame("c")).err();
        assert_eq!(
            err.map(|e| e.kind),
            Some(EvalErrorKind::StackOverflow { limit: 2 })
        );
        assert_eq!(stack.depth(), 2);
        stack.pop();
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn capture_is_most_recent_first() {
        let mut stack = CallStack::default();
        assert!(stack.push(frame("main")).is_ok());
        assert!(stack
            .push(CallFrame {
                name: "inner",
                call_span: Some(Span::new(3, 8)),
            })
            .is_ok());

        let names: Vec<_> = stack
            .capture()
            .frames()
            .iter()
            .map(|f| f.name.clone())
            .collect();
        assert_eq!(names, ["inner", "main"]);
    }

    #[test]
    fn attach_keeps_the_first_backtrace() {
        let mut stack = CallStack::default();
        let bare = stack.attach_backtrace(division_by_zero());
        assert!(bare.backtrace.is_none());

        assert!(stack.push(frame("f")).is_ok());
        let err = stack.attach_backtrace(division_by_zero());
        assert!(stack.push(frame("g")).is_ok());
        let err = stack.attach_backtrace(err);
        assert_eq!(err.backtrace.map(|b| b.frames().len()), Some(1));
    }
}
