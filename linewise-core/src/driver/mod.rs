//! Per-line iteration drivers
//!
//! Drivers pull lines from a line source, hand each one to a consumer
//! together with whether it is the last line, and stop early when the
//! consumer asks to.

pub mod blocking;
pub mod cooperative;

pub use blocking::{each_line_sync, each_line_sync_from_reader};
pub use cooperative::{
    each_line, each_line_from_reader, each_line_with_continuation,
    each_line_with_continuation_from_reader, Continuation, EachLine,
};

/// Consumer decision after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Deliver the next line
    #[default]
    Continue,
    /// Stop the traversal and close the source
    Stop,
}

impl Flow {
    /// True for [`Flow::Stop`]
    pub fn is_stop(self) -> bool {
        self == Flow::Stop
    }
}

/// Consumers that return nothing always continue
impl From<()> for Flow {
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

/// Only `false` stops
impl From<bool> for Flow {
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Flow::Continue
        } else {
            Flow::Stop
        }
    }
}

impl<B> From<std::ops::ControlFlow<B>> for Flow {
    fn from(flow: std::ops::ControlFlow<B>) -> Self {
        match flow {
            std::ops::ControlFlow::Continue(()) => Flow::Continue,
            std::ops::ControlFlow::Break(_) => Flow::Stop,
        }
    }
}

/// Summary of a finished traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Traversal {
    /// Lines handed to the consumer
    pub lines: u64,
    /// The consumer stopped the traversal
    pub stopped_early: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::ControlFlow;

    #[test]
    fn test_flow_conversions() {
        assert_eq!(Flow::from(()), Flow::Continue);
        assert_eq!(Flow::from(true), Flow::Continue);
        assert_eq!(Flow::from(false), Flow::Stop);
        assert_eq!(Flow::from(ControlFlow::<()>::Continue(())), Flow::Continue);
        assert!(Flow::from(ControlFlow::Break("done")).is_stop());
    }
}
