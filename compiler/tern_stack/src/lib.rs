//! Host stack growth for the resolver and the interpreter.
//!
//! Both passes recurse once per nested expression, and the interpreter also
//! recurses once per interpreted call. Every recursive entry point goes
//! through [`ensure_sufficient_stack`], which moves onto a freshly allocated
//! segment when the current one runs low. The interpreter's call-depth limit
//! bounds how far this can go.
//!
//! On `wasm32` the closure is called directly.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a new stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Tree {
        Leaf(i64),
        Node(Box<Tree>),
    }

    fn build(depth: usize) -> Tree {
        let mut tree = Tree::Leaf(1);
        for _ in 0..depth {
            tree = Tree::Node(Box::new(tree));
        }
        tree
    }

    fn sum(tree: &Tree) -> Result<i64, String> {
        ensure_sufficient_stack(|| match tree {
            Tree::Leaf(n) => Ok(*n),
            Tree::Node(inner) => Ok(sum(inner)? + 1),
        })
    }

    fn teardown(tree: Tree) {
        // Iterative drop so the test itself cannot overflow on cleanup.
        let mut current = tree;
        while let Tree::Node(inner) = current {
            current = *inner;
        }
    }

    #[test]
    fn passes_result_through() {
        let r: Result<u8, &str> = ensure_sufficient_stack(|| Err("boom"));
        assert_eq!(r, Err("boom"));
    }

    #[test]
    fn shallow_walk() {
        let tree = build(10);
        assert_eq!(sum(&tree), Ok(11));
        teardown(tree);
    }

    #[test]
    fn deep_walk_does_not_overflow() {
        let tree = build(200_000);
        assert_eq!(sum(&tree), Ok(200_001));
        teardown(tree);
    }
}
