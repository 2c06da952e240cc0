//! In-page evaluation snippets for the location engine and the
//! scripted element handle.
//!
//! Every snippet returns `JSON.stringify(...)` so the Rust side always
//! deserializes from a plain string, and selectors are embedded via
//! JSON encoding, which handles quoting and escaping safely.
//!
//! The traversal order is load-bearing: main document first, then
//! recursive shadow subtrees, then same-origin frames (each frame's
//! own document before its shadow subtrees and nested frames).

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{Result, WorkflowError};

/// Shared resolver: finds the first node matching `sel` across the
/// main document, shadow subtrees and same-origin frames. Declares
/// `resolve()` and `isVisible(el)` for the snippet body that follows.
fn resolver_prelude(selector: &str) -> String {
    let sel = encode(selector);
    format!(
        r#"const sel = {sel};
  const isVisible = (el) => {{
    const r = el.getBoundingClientRect();
    if (r.width === 0 || r.height === 0) return false;
    const s = window.getComputedStyle(el);
    return s.display !== 'none' && s.visibility !== 'hidden' && s.opacity !== '0';
  }};
  const inShadow = (root) => {{
    for (const host of root.querySelectorAll('*')) {{
      if (!host.shadowRoot) continue;
      const hit = host.shadowRoot.querySelector(sel) || inShadow(host.shadowRoot);
      if (hit) return hit;
    }}
    return null;
  }};
  const inFrames = (doc) => {{
    for (const frame of doc.querySelectorAll('iframe, frame')) {{
      let inner = null;
      try {{ inner = frame.contentDocument; }} catch (_) {{ continue; }}
      if (!inner) continue;
      const hit = inner.querySelector(sel) || inShadow(inner) || inFrames(inner);
      if (hit) return hit;
    }}
    return null;
  }};
  const resolve = () => document.querySelector(sel) || inShadow(document) || inFrames(document);"#
    )
}

/// Existence/visibility probe for one candidate selector. Reports
/// where the node lives (`document`, `shadow`, `frame` or `none`) plus
/// the attribute markers and rendered-box visibility used both for
/// handle selection and for the failure diagnostics.
pub fn probe_candidate(selector: &str) -> String {
    let prelude = resolver_prelude(selector);
    format!(
        r#"(() => {{
  {prelude}
  const describe = (el, where) => {{
    const r = el.getBoundingClientRect();
    return {{
      where,
      tag: el.tagName.toLowerCase(),
      testid: el.getAttribute('data-testid'),
      role: el.getAttribute('role'),
      editable: el.getAttribute('contenteditable'),
      disabled: el.hasAttribute('disabled') || el.getAttribute('aria-disabled') === 'true',
      width: Math.round(r.width),
      height: Math.round(r.height),
      visible: isVisible(el),
    }};
  }};
  let el = document.querySelector(sel);
  if (el) return JSON.stringify(describe(el, 'document'));
  el = inShadow(document);
  if (el) return JSON.stringify(describe(el, 'shadow'));
  el = inFrames(document);
  if (el) return JSON.stringify(describe(el, 'frame'));
  return JSON.stringify({{ where: 'none' }});
}})()"#
    )
}

/// Scripted click for nodes the native query API cannot reach.
pub fn scripted_click(selector: &str) -> String {
    let prelude = resolver_prelude(selector);
    format!(
        r#"(() => {{
  {prelude}
  const el = resolve();
  if (!el) return JSON.stringify({{ ok: false, error: 'no such element' }});
  el.scrollIntoView({{ block: 'center', inline: 'center' }});
  el.click();
  return JSON.stringify({{ ok: true }});
}})()"#
    )
}

pub fn scripted_scroll_into_view(selector: &str) -> String {
    let prelude = resolver_prelude(selector);
    format!(
        r#"(() => {{
  {prelude}
  const el = resolve();
  if (!el) return JSON.stringify({{ ok: false, error: 'no such element' }});
  el.scrollIntoView({{ block: 'center', inline: 'center' }});
  return JSON.stringify({{ ok: true }});
}})()"#
    )
}

pub fn scripted_is_visible(selector: &str) -> String {
    let prelude = resolver_prelude(selector);
    format!(
        r#"(() => {{
  {prelude}
  const el = resolve();
  return JSON.stringify(el !== null && isVisible(el));
}})()"#
    )
}

/// Disabled/aria-disabled markers cleared? A missing element reports
/// `false` so enablement polls keep waiting rather than proceed blind.
pub fn scripted_is_enabled(selector: &str) -> String {
    let prelude = resolver_prelude(selector);
    format!(
        r#"(() => {{
  {prelude}
  const el = resolve();
  if (!el) return JSON.stringify(false);
  return JSON.stringify(!el.hasAttribute('disabled') && el.getAttribute('aria-disabled') !== 'true');
}})()"#
    )
}

/// Enumerates everything on the page that structurally resembles an
/// eligible input or action control, recursively through shadow
/// subtrees and same-origin frames. Used only for the post-deadline
/// diagnostic dump.
pub fn enumerate_lookalikes() -> &'static str {
    r#"(() => {
  const out = [];
  const isVisible = (el) => {
    const r = el.getBoundingClientRect();
    if (r.width === 0 || r.height === 0) return false;
    const s = window.getComputedStyle(el);
    return s.display !== 'none' && s.visibility !== 'hidden' && s.opacity !== '0';
  };
  const record = (el, where) => {
    const r = el.getBoundingClientRect();
    out.push({
      where,
      tag: el.tagName.toLowerCase(),
      testid: el.getAttribute('data-testid'),
      role: el.getAttribute('role'),
      editable: el.getAttribute('contenteditable'),
      visible: isVisible(el),
      width: Math.round(r.width),
      height: Math.round(r.height),
    });
  };
  const scan = (root, where) => {
    const eligible = 'input:not([type="hidden"]), textarea, [contenteditable], [role="textbox"], button, [role="button"]';
    for (const el of root.querySelectorAll(eligible)) record(el, where);
    for (const host of root.querySelectorAll('*')) {
      if (host.shadowRoot) scan(host.shadowRoot, where + '>shadow');
    }
    for (const frame of root.querySelectorAll('iframe, frame')) {
      try { if (frame.contentDocument) scan(frame.contentDocument, where + '>frame'); } catch (_) {}
    }
  };
  scan(document, 'main');
  return JSON.stringify(out.slice(0, 80));
})()"#
}

pub fn current_href() -> &'static str {
    "JSON.stringify(window.location.href)"
}

/// Serializes the current origin's localStorage for the snapshot.
/// Opaque origins (about:blank) throw on access; they report no
/// entries and are filtered out by the caller.
pub fn read_local_storage() -> &'static str {
    r#"(() => {
  const entries = {};
  try {
    for (let i = 0; i < localStorage.length; i++) {
      const key = localStorage.key(i);
      entries[key] = localStorage.getItem(key);
    }
  } catch (_) {}
  return JSON.stringify({ origin: location.origin, entries });
})()"#
}

/// Evaluates a snippet that returns `JSON.stringify(...)` and parses
/// the payload.
pub async fn eval_json<T: DeserializeOwned>(page: &Page, expr: &str) -> Result<T> {
    trace!(target = "xpost.js", len = expr.len(), "evaluate");
    let raw: String = page
        .evaluate(expr)
        .await?
        .into_value()
        .map_err(|e| WorkflowError::Js(e.to_string()))?;
    Ok(serde_json::from_str(&raw)?)
}

fn encode(selector: &str) -> String {
    // JSON encoding doubles as JS string-literal escaping.
    serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string())
}
