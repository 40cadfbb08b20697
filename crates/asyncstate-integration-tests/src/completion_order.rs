//! Property-based tests for overlapping calls
//!
//! Calls are started in order and completed in an arbitrary permutation. The
//! invariants must hold for every permutation.

use asyncstate::{AsyncController, OperationState, Settlement};
use proptest::prelude::*;
use tokio::sync::oneshot;

type Gate = oneshot::Receiver<Result<usize, String>>;

fn gated_controller() -> AsyncController<Gate, usize> {
    AsyncController::new(|gate: Gate| async move {
        gate.await
            .unwrap_or_else(|_| Err("gate dropped".to_string()))
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

// ===== Strategy Generators =====

fn arb_completion_order() -> impl Strategy<Value = Vec<usize>> {
    (1usize..8).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
}

fn outcome(call: usize, fails: bool) -> Result<usize, String> {
    if fails {
        Err(format!("call {call} failed"))
    } else {
        Ok(call)
    }
}

proptest! {
    /// Property: only the most recently started call writes state
    /// Invariant: every earlier call settles as superseded, whatever the order
    #[test]
    fn prop_latest_started_call_wins(
        order in arb_completion_order(),
        failures in prop::collection::vec(any::<bool>(), 8),
    ) {
        runtime().block_on(async {
            let controller = gated_controller();
            let latest = order.len() - 1;

            let mut gates = Vec::new();
            let mut pending = Vec::new();
            for _ in 0..order.len() {
                let (tx, rx) = oneshot::channel();
                gates.push(Some(tx));
                pending.push(Some(controller.settle(rx)));
            }

            let mut latest_settled = false;
            for &call in &order {
                let tx = gates[call].take().expect("each call completes once");
                tx.send(outcome(call, failures[call])).expect("receiver alive");
                let settlement = pending[call].take().expect("each call awaited once").await;

                if call == latest {
                    prop_assert!(settlement.was_applied());
                    latest_settled = true;
                } else {
                    prop_assert!(matches!(settlement, Settlement::Superseded(_)));
                }

                let state = controller.state();
                if latest_settled {
                    prop_assert!(!state.loading);
                    if failures[latest] {
                        prop_assert_eq!(state.data, None);
                        prop_assert_eq!(
                            state.error_message(),
                            Some(format!("call {latest} failed"))
                        );
                    } else {
                        prop_assert_eq!(state.data, Some(latest));
                        prop_assert!(state.error.is_none());
                    }
                } else {
                    prop_assert!(state.loading);
                    prop_assert_eq!(state.data, None);
                    prop_assert!(state.error.is_none());
                }
            }
            Ok(())
        })?;
    }

    /// Property: nothing changes once the scope ends
    /// Invariant: state after teardown equals state at teardown
    #[test]
    fn prop_teardown_freezes_state(
        order in arb_completion_order(),
        teardown_after in 0usize..8,
    ) {
        runtime().block_on(async {
            let controller = gated_controller();

            let mut gates = Vec::new();
            let mut pending = Vec::new();
            for _ in 0..order.len() {
                let (tx, rx) = oneshot::channel();
                gates.push(Some(tx));
                pending.push(Some(controller.settle(rx)));
            }

            let mut frozen: Option<OperationState<usize>> = None;
            for (completed, &call) in order.iter().enumerate() {
                if completed == teardown_after {
                    controller.unmount();
                    frozen = Some(controller.state());
                }

                let tx = gates[call].take().expect("each call completes once");
                tx.send(Ok(call)).expect("receiver alive");
                let settlement = pending[call].take().expect("each call awaited once").await;

                if frozen.is_some() {
                    prop_assert!(!settlement.was_applied());
                }
            }

            if let Some(frozen) = frozen {
                prop_assert_eq!(controller.state(), frozen);
            }
            Ok(())
        })?;
    }
}
