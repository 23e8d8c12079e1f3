//! The `trace-inference` textual tracer (spec §6 "Trace format"): an
//! indented tree with the headers `fresh:`, `stale:`, `steps:`, and
//! per-step action lines. Built as a `tracing_subscriber::Layer` that
//! buffers the structured fields `marrow-solve`'s constraint system already
//! emits (`action`, `goal`, `fresh`, `stale`, `fork`, `of`) rather than
//! having the solver format text directly — the solver stays a library
//! that knows nothing about this presentation.

use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

#[derive(Default, Debug, Clone)]
struct StepRecord {
    action: String,
    goal: Option<i64>,
    fresh: Option<i64>,
    stale: Option<i64>,
    fork: Option<i64>,
    of: Option<i64>,
    extra: Vec<(String, String)>,
}

impl Visit for StepRecord {
    fn record_i64(&mut self, field: &Field, value: i64) {
        match field.name() {
            "goal" => self.goal = Some(value),
            "fresh" => self.fresh = Some(value),
            "stale" => self.stale = Some(value),
            "fork" => self.fork = Some(value),
            "of" => self.of = Some(value),
            _ => self.extra.push((field.name().to_string(), value.to_string())),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_i64(field, value as i64);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "action" {
            self.action = format!("{value:?}").trim_matches('"').to_string();
        } else {
            self.extra.push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "action" {
            self.action = value.to_string();
        } else {
            self.extra.push((field.name().to_string(), value.to_string()));
        }
    }
}

/// Accumulates `action`-tagged `tracing::debug!` events from the solver and
/// renders them into the verbatim indented format spec §6 describes.
#[derive(Default)]
pub struct TraceLayer {
    steps: Mutex<Vec<StepRecord>>,
    fresh_at_start: Mutex<Option<i64>>,
    stale_at_start: Mutex<Option<i64>>,
}

impl TraceLayer {
    pub fn new() -> Self {
        TraceLayer::default()
    }

    /// Renders the buffered steps into the `fresh:`/`stale:`/`steps:` tree.
    /// Indentation deepens by one level per `fork`/`assume` pair and returns
    /// to the enclosing level on the matching `pick`.
    pub fn render(&self) -> String {
        let fresh = self.fresh_at_start.lock().unwrap().unwrap_or(0);
        let stale = self.stale_at_start.lock().unwrap().unwrap_or(0);
        let mut out = String::new();
        out.push_str(&format!("fresh: {fresh}\n"));
        out.push_str(&format!("stale: {stale}\n"));
        out.push_str("steps:\n");
        let mut depth: i32 = 1;
        for step in self.steps.lock().unwrap().iter() {
            if step.action == "pick" {
                depth = (depth - 1).max(1);
            }
            let indent = "  ".repeat(depth as usize);
            out.push_str(&indent);
            out.push_str(&step.action);
            if let Some(goal) = step.goal {
                out.push_str(&format!(" goal={goal}"));
            }
            if let Some(fork) = step.fork {
                out.push_str(&format!(" fork={fork}"));
                if let Some(of) = step.of {
                    out.push_str(&format!("/{of}"));
                }
            }
            for (k, v) in &step.extra {
                out.push_str(&format!(" {k}={v}"));
            }
            out.push('\n');
            if step.action == "fork" {
                depth += 1;
            }
        }
        out
    }
}

impl<S: Subscriber> Layer<S> for TraceLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut record = StepRecord::default();
        event.record(&mut record);
        if record.action.is_empty() {
            return;
        }
        if record.action == "schedule" {
            let mut fresh = self.fresh_at_start.lock().unwrap();
            if fresh.is_none() {
                *fresh = record.fresh;
                *self.stale_at_start.lock().unwrap() = record.stale;
            }
        }
        self.steps.lock().unwrap().push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing::subscriber::with_default;
    use tracing_subscriber::layer::SubscriberExt;

    fn push(layer: &TraceLayer, action: &str, goal: Option<i64>, fork: Option<i64>, of: Option<i64>) {
        let record = StepRecord { action: action.to_string(), goal, fork, of, ..Default::default() };
        layer.steps.lock().unwrap().push(record);
    }

    #[test]
    fn render_emits_header_then_indented_steps_that_widen_on_fork_and_narrow_on_pick() {
        let layer = TraceLayer::new();
        *layer.fresh_at_start.lock().unwrap() = Some(2);
        *layer.stale_at_start.lock().unwrap() = Some(0);
        push(&layer, "solve", Some(0), None, None);
        push(&layer, "fork", Some(0), Some(0), Some(2));
        push(&layer, "assume", Some(0), Some(0), None);
        push(&layer, "pick", Some(0), None, None);

        let rendered = layer.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "fresh: 2");
        assert_eq!(lines[1], "stale: 0");
        assert_eq!(lines[2], "steps:");
        assert!(lines[3].starts_with("  solve"));
        assert!(lines[4].starts_with("  fork"));
        assert!(lines[5].starts_with("    assume"));
        assert!(lines[6].starts_with("  pick"));
    }

    #[test]
    fn on_event_captures_action_tagged_tracing_events() {
        let layer = Arc::new(TraceLayer::new());
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        with_default(subscriber, || {
            tracing::debug!(fresh = 1i64, stale = 0i64, action = "schedule");
            tracing::debug!(goal = 3i64, action = "success");
            tracing::debug!("irrelevant event with no action field");
        });
        let steps = layer.steps.lock().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].action, "success");
        assert_eq!(steps[1].goal, Some(3));
        assert_eq!(*layer.fresh_at_start.lock().unwrap(), Some(1));
    }
}
