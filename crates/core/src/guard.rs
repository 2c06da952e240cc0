//! Termination guard for flows that must persist state on the way out.
//!
//! Wraps a flow future so Ctrl-C, SIGTERM and panics all funnel into
//! one [`Termination`] value. The caller runs its finalizer (snapshot,
//! browser close) exactly once after the select resolves, on every
//! path.

use std::future::Future;

use futures::FutureExt;
use tracing::warn;

/// Why the guarded flow stopped.
#[derive(Debug)]
pub enum Termination<T> {
    /// The flow ran to the end; carries its result.
    Completed(T),
    /// Ctrl-C.
    Interrupted,
    /// SIGTERM (unix only).
    Terminated,
    /// The flow panicked; carries the panic message.
    Faulted(String),
}

impl<T> Termination<T> {
    pub fn is_signal(&self) -> bool {
        matches!(self, Self::Interrupted | Self::Terminated)
    }
}

/// Drives `flow` until it finishes or a termination signal arrives.
/// A panic inside the flow is caught and reported as [`Termination::Faulted`]
/// instead of unwinding past the caller's finalizer.
pub async fn run_until_terminated<T, F>(flow: F) -> Termination<T>
where
    F: Future<Output = T>,
{
    let flow = std::panic::AssertUnwindSafe(flow).catch_unwind();
    tokio::pin!(flow);

    #[cfg(unix)]
    return {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(err) => {
                    warn!(target = "xpost.guard", error = %err, "SIGTERM handler unavailable");
                    return wait_interrupt_only(flow).await;
                }
            };
        tokio::select! {
            result = &mut flow => finish(result),
            _ = tokio::signal::ctrl_c() => {
                warn!(target = "xpost.guard", "interrupt received");
                Termination::Interrupted
            }
            _ = sigterm.recv() => {
                warn!(target = "xpost.guard", "termination signal received");
                Termination::Terminated
            }
        }
    };

    #[cfg(not(unix))]
    wait_interrupt_only(flow).await
}

async fn wait_interrupt_only<T, F>(mut flow: std::pin::Pin<&mut F>) -> Termination<T>
where
    F: Future<Output = std::thread::Result<T>>,
{
    tokio::select! {
        result = &mut flow => finish(result),
        _ = tokio::signal::ctrl_c() => {
            warn!(target = "xpost.guard", "interrupt received");
            Termination::Interrupted
        }
    }
}

fn finish<T>(result: std::thread::Result<T>) -> Termination<T> {
    match result {
        Ok(value) => Termination::Completed(value),
        Err(panic) => Termination::Faulted(panic_message(panic)),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_flow_carries_its_result() {
        let termination = run_until_terminated(async { 41 + 1 }).await;
        match termination {
            Termination::Completed(v) => assert_eq!(v, 42),
            other => panic!("unexpected termination: {other:?}"),
        }
    }

    #[tokio::test]
    async fn panicking_flow_reports_faulted_with_message() {
        let termination: Termination<()> =
            run_until_terminated(async { panic!("boom in flow") }).await;
        match termination {
            Termination::Faulted(msg) => assert!(msg.contains("boom in flow")),
            other => panic!("unexpected termination: {other:?}"),
        }
    }

    #[tokio::test]
    async fn code_after_the_guard_still_runs_on_panic() {
        let termination: Termination<()> = run_until_terminated(async { panic!("x") }).await;
        // The finalizer slot: this line must be reachable on the fault path.
        assert!(!termination.is_signal());
    }

    #[test]
    fn signal_terminations_are_flagged() {
        assert!(Termination::<()>::Interrupted.is_signal());
        assert!(Termination::<()>::Terminated.is_signal());
        assert!(!Termination::Completed(()).is_signal());
        assert!(!Termination::<()>::Faulted("m".to_string()).is_signal());
    }
}
