//! Built-in pass-through processor semantics.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;

use docflow::contract::{Document, DocumentProcessor, ProcessOptions, Subscriber};
use docflow::processor::VerbatimProcessor;

#[tokio::test]
async fn parse_reports_no_diagnostics_and_keeps_the_document() {
    let processor = VerbatimProcessor::new();
    let result = processor.parse(Document::new("a.md", "body")).await;
    assert!(result.errors.is_empty());
    assert_eq!(result.document.text, "body");
}

#[tokio::test]
async fn waiting_process_finishes_every_subscriber_before_returning() {
    let processor = VerbatimProcessor::new();
    let log: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    for id in 0..2 {
        let log = log.clone();
        let subscriber: Subscriber = Arc::new(move |_event| {
            let log = log.clone();
            async move {
                // Yield first so an engine that forgot to wait would observe
                // an empty log after process() returns.
                tokio::time::sleep(Duration::from_millis(5)).await;
                log.lock().expect("log lock").push(id);
            }
            .boxed()
        });
        processor.subscribe(subscriber);
    }

    let result = processor.parse(Document::new("a.md", "body")).await;
    processor
        .process(result, ProcessOptions { wait_for_listeners: true })
        .await
        .expect("process should succeed");

    assert_eq!(*log.lock().expect("log lock"), vec![0, 1], "subscribers run in subscription order");
}

#[tokio::test]
async fn detached_process_still_delivers_the_event() {
    let processor = VerbatimProcessor::new();
    let (sender, receiver) = tokio::sync::oneshot::channel::<String>();
    let sender = Arc::new(Mutex::new(Some(sender)));

    let subscriber: Subscriber = Arc::new(move |event| {
        let sender = sender.clone();
        async move {
            if let Some(sender) = sender.lock().expect("sender lock").take() {
                let _ = sender.send(event.document.text.clone());
            }
        }
        .boxed()
    });
    processor.subscribe(subscriber);

    let result = processor.parse(Document::new("a.md", "payload")).await;
    processor
        .process(result, ProcessOptions { wait_for_listeners: false })
        .await
        .expect("process should succeed");

    let delivered = tokio::time::timeout(Duration::from_secs(1), receiver)
        .await
        .expect("subscriber should run eventually")
        .expect("channel should receive");
    assert_eq!(delivered, "payload");
}

#[tokio::test]
async fn processed_event_carries_the_parse_result_and_the_document() {
    let processor = VerbatimProcessor::new();
    let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));

    let log = seen.clone();
    let subscriber: Subscriber = Arc::new(move |event| {
        let log = log.clone();
        async move {
            log.lock().expect("seen lock").push((
                event.parse_result.document.text.clone(),
                event.document.text.clone(),
            ));
        }
        .boxed()
    });
    processor.subscribe(subscriber);

    let result = processor.parse(Document::new("a.md", "unchanged")).await;
    processor
        .process(result, ProcessOptions { wait_for_listeners: true })
        .await
        .expect("process should succeed");

    assert_eq!(
        *seen.lock().expect("seen lock"),
        vec![("unchanged".to_string(), "unchanged".to_string())],
        "the pass-through processor emits the document verbatim"
    );
}
