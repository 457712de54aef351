#![forbid(unsafe_code)]

//! Span and event shape of a split panel layout pass.
//!
//! Run:
//!   cargo test -p sprig --test layout_tracing

use std::sync::{Arc, Mutex};

use sprig::prelude::*;
use sprig::{LayoutError, constrain};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    parent_name: Option<String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    parent_span_name: Option<String>,
}

#[derive(Default, Clone)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|pid| ctx.span(pid))
            .map(|span_ref| span_ref.name().to_string());
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            parent_name,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
            parent_span_name,
        });
    }
}

fn with_capture(f: impl FnOnce()) -> Capture {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

#[test]
fn resolve_span_nests_under_panel_layout() {
    let capture = with_capture(|| {
        let mut panel = SplitPanel::new(Orientation::Vertical, 0.5).unwrap();
        panel.set_first_item(Some(View::new())).unwrap();
        panel.set_last_item(Some(View::new())).unwrap();
        panel.layout(Rect::from_size(300.0, 100.0)).unwrap();
    });

    let spans = capture.spans.lock().unwrap().clone();
    let layout = spans
        .iter()
        .find(|s| s.name == "split_panel.layout")
        .expect("layout span");
    assert_eq!(layout.parent_name, None);
    let resolve = spans
        .iter()
        .find(|s| s.name == "layout.resolve")
        .expect("resolve span");
    assert_eq!(resolve.parent_name.as_deref(), Some("split_panel.layout"));

    let events = capture.events.lock().unwrap().clone();
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::DEBUG && e.message == "split panel layout rebuilt")
    );
    assert!(events.iter().all(|e| e.level != tracing::Level::WARN));
}

#[test]
fn failed_resolve_warns_inside_its_span() {
    let a = View::new().id().box_id();
    let b = View::new().id().box_id();
    let layout = constrain([a, b], |c, [a, b]| {
        c.set(a.left(), b.right());
        c.set(b.right(), a.left());
    });

    let mut result = None;
    let capture = with_capture(|| {
        result = Some(layout.resolve(Rect::from_size(10.0, 10.0), &sprig::Params::default()));
    });

    assert!(matches!(result, Some(Err(LayoutError::Cycle { .. }))));
    let events = capture.events.lock().unwrap().clone();
    let warning = events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("warn event");
    assert_eq!(warning.message, "layout resolution failed");
    assert_eq!(warning.parent_span_name.as_deref(), Some("layout.resolve"));
}

#[test]
fn facade_error_wraps_layout_failure() {
    fn run() -> sprig::Result<()> {
        let a = View::new().id().box_id();
        let layout = constrain([a], |c, [a]| c.set(a.top(), c.parent().top()));
        layout.resolve(Rect::from_size(1.0, 1.0), &sprig::Params::default())?;
        Ok(())
    }
    assert!(matches!(run(), Err(Error::Layout(LayoutError::Unresolved { .. }))));
}
