// Copyright 2026 the Horizon Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Every event is an instant event. Backends map to thread ids so native and
//! fallback activity land on separate tracks.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use horizon_core::backend::BackendKind;
use horizon_core::limiter::LimitAction;
use horizon_core::time::HostTime;

use crate::pretty::{backend_name, millis, origin_name, phase_name, reason_name};
use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Timestamps are host-time microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|recorded| to_json(&recorded)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_json(recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::BackendSelected(e) => instant(
            "BackendSelected",
            "Detector",
            e.at,
            e.backend,
            json!({ "backend": backend_name(e.backend) }),
        ),
        RecordedEvent::Evaluation(e) => instant(
            "Evaluation",
            "Geometry",
            e.at,
            BackendKind::Fallback,
            json!({
                "origin": origin_name(e.origin),
                "visible": e.visible,
            }),
        ),
        RecordedEvent::Transition(e) => instant(
            phase_name(e.phase),
            "Transition",
            e.at,
            e.backend,
            json!({ "phase": phase_name(e.phase) }),
        ),
        RecordedEvent::RateLimited(e) => {
            let args = match e.action {
                LimitAction::Arm(due) => json!({
                    "action": "arm",
                    "due_ms": millis(due),
                }),
                LimitAction::Coalesced => json!({ "action": "coalesced" }),
                LimitAction::Run => json!({ "action": "run" }),
            };
            instant(
                "RateLimited",
                "Limiter",
                e.at,
                BackendKind::Fallback,
                args,
            )
        }
        RecordedEvent::Teardown(e) => instant(
            "Teardown",
            "Detector",
            e.at,
            e.backend,
            json!({ "reason": reason_name(e.reason) }),
        ),
    }
}

fn instant(
    name: &str,
    category: &str,
    at: HostTime,
    backend: BackendKind,
    args: Value,
) -> Value {
    let tid = match backend {
        BackendKind::Native => 1,
        BackendKind::Fallback => 2,
    };
    json!({
        "ph": "i",
        "name": name,
        "cat": category,
        "ts": at.ticks(),
        "pid": 0,
        "tid": tid,
        "s": "t",
        "args": args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use horizon_core::state::Phase;
    use horizon_core::trace::{
        BackendSelectedEvent, RateLimitedEvent, TraceSink, TransitionEvent,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_backend_selected(&BackendSelectedEvent {
            backend: BackendKind::Native,
            at: HostTime(1_000),
        });
        rec.on_transition(&TransitionEvent {
            backend: BackendKind::Native,
            phase: Phase::Visible,
            at: HostTime(2_500),
        });
        rec.on_rate_limited(&RateLimitedEvent {
            at: HostTime(3_000),
            action: LimitAction::Arm(HostTime(19_000)),
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "BackendSelected");
        assert_eq!(parsed[0]["args"]["backend"], "native");

        assert_eq!(parsed[1]["name"], "visible");
        assert_eq!(parsed[1]["ts"], 2_500);
        assert_eq!(parsed[1]["tid"], 1);

        assert_eq!(parsed[2]["args"]["action"], "arm");
        assert_eq!(parsed[2]["args"]["due_ms"], 19.0);
        assert_eq!(parsed[2]["tid"], 2);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
