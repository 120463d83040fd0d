//! Built-in document processor.
//!
//! The engine treats the processor as an external collaborator behind
//! [`DocumentProcessor`]; this is the minimal implementation the CLI runs
//! with. It applies no markup grammar and no transformations: every document
//! parses cleanly and is republished to subscribers unchanged.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::contract::{
    Document, DocumentProcessor, ParseResult, ProcessOptions, ProcessedEvent, Subscriber,
};
use crate::error::BoxedError;

/// Pass-through processor: parse never reports diagnostics, process emits the
/// document verbatim.
#[derive(Default)]
pub struct VerbatimProcessor {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl VerbatimProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> Vec<Subscriber> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DocumentProcessor for VerbatimProcessor {
    fn subscribe(&self, subscriber: Subscriber) {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(subscriber);
    }

    async fn parse(&self, document: Document) -> ParseResult {
        ParseResult { document, errors: Vec::new() }
    }

    async fn process(&self, result: ParseResult, options: ProcessOptions) -> Result<(), BoxedError> {
        let event = ProcessedEvent { document: result.document.clone(), parse_result: result };
        for subscriber in self.subscribers() {
            let notification = subscriber(event.clone());
            if options.wait_for_listeners {
                notification.await;
            } else {
                tokio::spawn(notification);
            }
        }
        Ok(())
    }
}
