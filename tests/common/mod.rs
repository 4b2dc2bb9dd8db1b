#![allow(dead_code)]

use std::sync::Arc;

use cmdgate::{Dispatcher, InlineDispatcher};

pub use cmdgate_test_utils::builders;
pub use cmdgate_test_utils::operations;
pub use cmdgate_test_utils::recorder::EventRecorder;
pub use cmdgate_test_utils::{init_tracing, with_timeout};

/// Dispatcher that delivers notifications synchronously on the publisher.
pub fn inline() -> Arc<dyn Dispatcher> {
    Arc::new(InlineDispatcher)
}
