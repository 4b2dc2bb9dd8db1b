mod common;
use crate::common::operations::{fail_with, succeed_after};
use crate::common::{init_tracing, with_timeout, EventRecorder};

use std::sync::Arc;
use std::time::Duration;

use cmdgate::dispatch;
use cmdgate::observer::TaskObserver;
use cmdgate::{
    AsyncCommand, CommandEvent, Dispatcher, LoopDispatcher, Notifier, OperationError,
    TaskProperty, TaskStatus,
};

#[tokio::test]
async fn task_events_wait_for_the_dispatch_loop() {
    init_tracing();
    let (dispatcher, mut dispatch_loop) = LoopDispatcher::channel();
    let command: AsyncCommand<(), u8> = AsyncCommand::new(
        Arc::new(dispatcher),
        succeed_after::<(), u8>(Duration::from_millis(1), 7),
    );
    let recorder = EventRecorder::new();
    recorder.attach(command.task_events());

    command.execute_async(()).await;
    assert_eq!(command.execution().unwrap().status(), TaskStatus::RanToCompletion);
    assert!(recorder.events().is_empty());

    dispatch_loop.run_pending();

    let events = recorder.events();
    // Started batch (5 lifecycle fields), then the terminal batch.
    assert_eq!(events.len(), 5 + 7);
    assert_eq!(events[0], TaskProperty::Status);
    assert_eq!(events[5], TaskProperty::Status);
    assert_eq!(
        &events[events.len() - 2..],
        &[TaskProperty::IsSuccessfullyCompleted, TaskProperty::Result]
    );
}

#[tokio::test]
async fn faulted_batch_lists_status_before_error_fields() {
    let (dispatcher, mut dispatch_loop) = LoopDispatcher::channel();
    let command: AsyncCommand<()> =
        AsyncCommand::new(Arc::new(dispatcher), fail_with::<(), ()>("nope"));
    let recorder = EventRecorder::new();
    recorder.attach(command.task_events());

    command.execute_async(()).await;
    dispatch_loop.run_pending();

    let events = recorder.events();
    let terminal = &events[5..];
    assert_eq!(terminal[0], TaskProperty::Status);
    assert_eq!(
        &terminal[terminal.len() - 3..],
        &[TaskProperty::IsFaulted, TaskProperty::Error, TaskProperty::ErrorMessage]
    );
    assert!(!events.contains(&TaskProperty::Result));
}

#[tokio::test]
async fn task_subscriptions_survive_across_runs() {
    let (dispatcher, mut dispatch_loop) = LoopDispatcher::channel();
    let command: AsyncCommand<()> = AsyncCommand::new(
        Arc::new(dispatcher),
        succeed_after::<(), ()>(Duration::from_millis(1), ()),
    );
    let recorder = EventRecorder::new();
    recorder.attach(command.task_events());

    command.execute_async(()).await;
    command.execute_async(()).await;
    dispatch_loop.run_pending();

    assert_eq!(recorder.count(&TaskProperty::IsSuccessfullyCompleted), 2);
}

#[tokio::test]
async fn already_finished_future_still_publishes_terminal_batch() {
    let (dispatcher, mut dispatch_loop) = LoopDispatcher::channel();
    let notifier: Notifier<TaskProperty> = Notifier::new(Arc::new(dispatcher));

    let (observer, observation) =
        TaskObserver::observe(notifier.clone(), std::future::ready(Ok::<_, OperationError>(1u8)));
    observation.await;
    assert_eq!(observer.status(), TaskStatus::RanToCompletion);

    // Subscribing after the fact still sees both batches: delivery is deferred.
    let recorder = EventRecorder::new();
    recorder.attach(&notifier);
    dispatch_loop.run_pending();

    assert_eq!(recorder.count(&TaskProperty::Status), 2);
    assert_eq!(recorder.count(&TaskProperty::Result), 1);
}

#[tokio::test]
async fn spawned_loop_delivers_command_events_in_order() {
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(LoopDispatcher::spawn());
    let command: AsyncCommand<()> = AsyncCommand::new(
        Arc::clone(&dispatcher),
        succeed_after::<(), ()>(Duration::from_millis(1), ()),
    );
    let recorder = EventRecorder::new();
    recorder.attach(command.events());

    with_timeout(command.execute_async(())).await;
    with_timeout(dispatch::flush(dispatcher.as_ref())).await;

    assert_eq!(
        recorder.events(),
        vec![
            CommandEvent::CancelCanExecuteChanged,
            CommandEvent::ExecutionChanged,
            CommandEvent::CanExecuteChanged,
            CommandEvent::CancelCanExecuteChanged,
            CommandEvent::CanExecuteChanged,
        ]
    );
}

#[tokio::test]
async fn unsubscribed_handler_is_not_called() {
    let (dispatcher, mut dispatch_loop) = LoopDispatcher::channel();
    let command: AsyncCommand<()> = AsyncCommand::new(
        Arc::new(dispatcher),
        succeed_after::<(), ()>(Duration::from_millis(1), ()),
    );
    let kept = EventRecorder::new();
    let dropped = EventRecorder::new();
    kept.attach(command.events());
    let id = dropped.attach(command.events());
    assert!(command.events().unsubscribe(id));

    command.raise_can_execute_changed();
    dispatch_loop.run_pending();

    assert_eq!(kept.events(), vec![CommandEvent::CanExecuteChanged]);
    assert!(dropped.events().is_empty());
}
