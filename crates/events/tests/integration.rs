//! Integration tests for the event channel and emitter trait

use vintner_events::{channel, AppEvent, BuildEvent, EventEmitter, GeneralEvent};

#[tokio::test]
async fn emit_through_sender() {
    let (tx, mut rx) = channel();
    tx.emit_debug("hello");
    tx.emit(AppEvent::Build(BuildEvent::PlanComputed { steps: 7 }));

    match rx.recv().await {
        Some(AppEvent::General(GeneralEvent::Debug { message })) => assert_eq!(message, "hello"),
        other => panic!("unexpected event: {other:?}"),
    }
    match rx.recv().await {
        Some(AppEvent::Build(BuildEvent::PlanComputed { steps })) => assert_eq!(steps, 7),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn dropped_receiver_does_not_panic() {
    let (tx, rx) = channel();
    drop(rx);
    // send errors are swallowed
    tx.emit_warning("receiver is gone");
}

#[test]
fn optional_sender_emits_nothing() {
    let none: Option<vintner_events::EventSender> = None;
    none.emit_error("silently dropped");
}
