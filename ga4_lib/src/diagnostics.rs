//! Where debug-mode messages go.

/// Receives debug-mode diagnostic lines. Best effort: failures are swallowed.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Default sink: standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, message: &str) {
        eprintln!("{}", message);
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closure_sink_receives_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        let sink = move |m: &str| captured.lock().unwrap().push(m.to_string());
        sink.emit("[DEBUG] hello");
        assert_eq!(seen.lock().unwrap().as_slice(), ["[DEBUG] hello"]);
    }
}
