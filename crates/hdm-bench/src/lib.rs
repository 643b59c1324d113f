//! Benchmark profiles for the hdm object graph engine.
//!
//! - [`reference_profile`]: 32 modules × width 8 (a few thousand objects)
//! - [`stress_profile`]: 256 modules × width 16 for large-graph timing
//! - [`build`]: populate a fresh session from a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use hdm_serializer::Handle;
use hdm_test_utils::{wide_design, GraphSpec, Session};

/// Mid-sized design used by every micro-benchmark.
pub fn reference_profile() -> GraphSpec {
    GraphSpec::wide(32, 8)
}

/// Large design for stress timing.
pub fn stress_profile() -> GraphSpec {
    GraphSpec::wide(256, 16)
}

/// A fresh session holding `spec`, plus its root handle.
pub fn build(spec: &GraphSpec) -> (Session, Handle) {
    let mut ser = Session::new();
    let root = wide_design(&mut ser, spec);
    (ser, root)
}

/// A fresh session holding `spec` and `garbage` unrooted copies of it.
pub fn build_with_garbage(spec: &GraphSpec, garbage: usize) -> Session {
    let mut ser = Session::new();
    for _ in 0..garbage {
        let root = wide_design(&mut ser, spec);
        ser.release(&root);
    }
    wide_design(&mut ser, spec);
    ser
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_is_rooted_and_nonempty() {
        let (ser, root) = build(&reference_profile());
        assert!(ser.contains(root.target()));
        assert!(ser.live_count() > 1_000);
    }

    #[test]
    fn garbage_is_unrooted() {
        let spec = GraphSpec::wide(2, 2);
        let ser = build_with_garbage(&spec, 3);
        assert_eq!(ser.root_handles().len(), 1);
    }
}
