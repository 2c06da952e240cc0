//! Input and click execution with explicit best-effort policy.
//!
//! Steps are either best-effort or fatal. Best-effort steps (scroll,
//! focus click, select-all, the readiness waits) log their failure and
//! continue; the mandatory step after them fails loudly if the
//! precondition truly mattered. The text insertion and the final click
//! delivery are fatal and propagate.

use std::future::Future;
use std::time::{Duration, Instant};

use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, InsertTextParams,
};
use tracing::debug;

use crate::element::LocatedElement;
use crate::error::{Result, WorkflowError};

const FOCUS_CLICK_TIMEOUT: Duration = Duration::from_secs(2);
const VISIBLE_WAIT: Duration = Duration::from_secs(5);
const ENABLE_WAIT: Duration = Duration::from_secs(10);
const WAIT_POLL: Duration = Duration::from_millis(250);
const PRE_CLICK_SETTLE: Duration = Duration::from_millis(200);
const CLICK_TIMEOUT: Duration = Duration::from_secs(3);

/// Replaces the element's content with `text`.
///
/// Select-all plus a single atomic `Input.insertText` rather than
/// per-key synthesis: keystroke simulation triggers composition/IME
/// handlers the compose surface reacts badly to, and the atomic insert
/// makes repeated calls overwrite instead of append.
pub async fn fill_text(page: &Page, handle: &LocatedElement, text: &str) -> Result<()> {
    if let Err(err) = handle.scroll_into_view().await {
        debug!(target = "xpost.interact", error = %err, "scroll into view failed, continuing");
    }

    match tokio::time::timeout(FOCUS_CLICK_TIMEOUT, handle.click()).await {
        Ok(Ok(())) => {}
        _ => {
            debug!(target = "xpost.interact", selector = handle.selector(), "focus click failed, forcing");
            if let Err(err) = handle.force_click().await {
                debug!(target = "xpost.interact", error = %err, "force click failed, continuing");
            }
        }
    }

    if let Err(err) = select_all(page).await {
        debug!(target = "xpost.interact", error = %err, "select-all chord failed, continuing");
    }

    insert_text(page, text)
        .await
        .map_err(|err| WorkflowError::Interaction {
            selector: handle.selector().to_string(),
            reason: format!("text insertion failed: {err}"),
        })
}

/// Clicks an action control once it looks ready.
///
/// The visibility and enablement waits tolerate their own timeouts:
/// some controls stay `aria-disabled` in markup while perfectly
/// interactable. A failed or timed-out click delivery is fatal.
pub async fn click_action(handle: &LocatedElement) -> Result<()> {
    if !wait_until(VISIBLE_WAIT, WAIT_POLL, || handle.is_visible()).await {
        debug!(target = "xpost.interact", selector = handle.selector(), "visibility wait timed out, proceeding");
    }
    if !wait_until(ENABLE_WAIT, WAIT_POLL, || handle.is_enabled()).await {
        debug!(target = "xpost.interact", selector = handle.selector(), "enablement wait timed out, proceeding");
    }

    tokio::time::sleep(PRE_CLICK_SETTLE).await;

    match tokio::time::timeout(CLICK_TIMEOUT, handle.click()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(WorkflowError::Interaction {
            selector: handle.selector().to_string(),
            reason: format!("click failed: {err}"),
        }),
        Err(_) => Err(WorkflowError::Interaction {
            selector: handle.selector().to_string(),
            reason: format!("click not delivered within {}ms", CLICK_TIMEOUT.as_millis()),
        }),
    }
}

/// Platform select-all chord: Meta+A on macOS, Ctrl+A elsewhere.
async fn select_all(page: &Page) -> Result<()> {
    let (key_down, key_up) = select_all_chord().map_err(WorkflowError::Js)?;
    page.execute(key_down).await?;
    page.execute(key_up).await?;
    Ok(())
}

/// Chrome only executes the editing accelerator when the event carries
/// the full key identity (`code` plus virtual key codes), not just the
/// `key` string; a bare keyDown is delivered to the page but selects
/// nothing.
fn select_all_chord(
) -> std::result::Result<(DispatchKeyEventParams, DispatchKeyEventParams), String> {
    let modifiers = if cfg!(target_os = "macos") { 4 } else { 2 };

    let key_down = DispatchKeyEventParams::builder()
        .r#type(DispatchKeyEventType::RawKeyDown)
        .key("a")
        .code("KeyA")
        .windows_virtual_key_code(65)
        .native_virtual_key_code(65)
        .modifiers(modifiers)
        .build()?;
    let key_up = DispatchKeyEventParams::builder()
        .r#type(DispatchKeyEventType::KeyUp)
        .key("a")
        .code("KeyA")
        .windows_virtual_key_code(65)
        .native_virtual_key_code(65)
        .modifiers(modifiers)
        .build()?;
    Ok((key_down, key_up))
}

/// One atomic content replacement into the focused element.
async fn insert_text(page: &Page, text: &str) -> Result<()> {
    page.execute(
        InsertTextParams::builder()
            .text(text)
            .build()
            .map_err(WorkflowError::Js)?,
    )
    .await?;
    Ok(())
}

/// Polls `cond` until it reports true or `timeout` elapses. Transient
/// evaluation errors count as "not yet".
async fn wait_until<F, Fut>(timeout: Duration, poll: Duration, cond: F) -> bool
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if cond().await.unwrap_or(false) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn select_all_chord_carries_full_key_identity() {
        let (down, up) = select_all_chord().unwrap();
        assert!(matches!(down.r#type, DispatchKeyEventType::RawKeyDown));
        assert_eq!(down.key.as_deref(), Some("a"));
        assert_eq!(down.code.as_deref(), Some("KeyA"));
        assert_eq!(down.windows_virtual_key_code, Some(65));
        assert_eq!(down.native_virtual_key_code, Some(65));
        assert!(matches!(up.r#type, DispatchKeyEventType::KeyUp));
        assert_eq!(up.code.as_deref(), Some("KeyA"));
    }

    #[test]
    fn select_all_chord_uses_platform_modifier() {
        let expected = if cfg!(target_os = "macos") { 4 } else { 2 };
        let (down, up) = select_all_chord().unwrap();
        assert_eq!(down.modifiers, Some(expected));
        assert_eq!(up.modifiers, Some(expected));
    }

    #[tokio::test]
    async fn wait_until_succeeds_eventually() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let ok = wait_until(Duration::from_secs(2), Duration::from_millis(5), move || {
            let c = c.clone();
            async move { Ok(c.fetch_add(1, Ordering::SeqCst) >= 3) }
        })
        .await;
        assert!(ok);
        assert!(counter.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn wait_until_times_out_on_never_true() {
        let ok = wait_until(
            Duration::from_millis(40),
            Duration::from_millis(10),
            || async { Ok(false) },
        )
        .await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn wait_until_treats_errors_as_not_yet() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let ok = wait_until(Duration::from_secs(2), Duration::from_millis(5), move || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(WorkflowError::Js("transient".to_string()))
                } else {
                    Ok(true)
                }
            }
        })
        .await;
        assert!(ok);
    }
}
