use std::sync::Arc;

use proptest::prelude::*;

use cmdgate::{CancellationGate, CancellationToken, InlineDispatcher, Notifier};

#[derive(Debug, Clone, Copy)]
enum GateOp {
    Start,
    Finish,
    Cancel,
}

fn gate_op() -> impl Strategy<Value = GateOp> {
    prop_oneof![Just(GateOp::Start), Just(GateOp::Finish), Just(GateOp::Cancel)]
}

/// Reference model: the executing flag plus whether the current token was
/// cancelled.
#[derive(Debug, Default)]
struct Model {
    executing: bool,
    cancelled: bool,
}

proptest! {
    #[test]
    fn gate_matches_reference_model(ops in proptest::collection::vec(gate_op(), 1..64)) {
        let gate = CancellationGate::new(Notifier::new(Arc::new(InlineDispatcher)));
        let mut model = Model::default();
        let mut current: Option<CancellationToken> = None;

        for op in ops {
            match op {
                GateOp::Start => {
                    let token = gate.notify_starting();
                    prop_assert_eq!(token.is_some(), !model.executing);
                    if let Some(token) = token {
                        // Every run starts with a live token.
                        prop_assert!(!token.is_cancelled());
                        model.executing = true;
                        model.cancelled = false;
                        current = Some(token);
                    }
                }
                GateOp::Finish => {
                    gate.notify_finished();
                    model.executing = false;
                }
                GateOp::Cancel => {
                    let expected = model.executing && !model.cancelled;
                    prop_assert_eq!(gate.request_cancellation(), expected);
                    if expected {
                        model.cancelled = true;
                    }
                }
            }

            prop_assert_eq!(gate.is_executing(), model.executing);
            prop_assert_eq!(gate.is_cancellation_requested(), model.cancelled);
            prop_assert_eq!(
                gate.can_request_cancellation(),
                model.executing && !model.cancelled
            );
            if let Some(ref token) = current {
                // Finishing never resets the token of the run that used it.
                prop_assert_eq!(token.is_cancelled(), model.cancelled);
            }
        }
    }
}
