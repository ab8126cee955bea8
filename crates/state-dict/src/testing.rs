//! Test helpers: capture the tracing events emitted by a closure

use std::sync::{Arc, Mutex};

use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Records `"<LEVEL> <target>"` for every event it sees
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for EventRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        self.events
            .lock()
            .unwrap()
            .push(format!("{} {}", meta.level(), meta.target()));
    }
}

/// Run `f` with a recording subscriber installed on this thread
pub fn capture_events<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let recorder = EventRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    let events = recorder.events.lock().unwrap().clone();
    (out, events)
}
