//! Bounded multi-strategy element location.
//!
//! The target site renders its compose surface from uncontrolled,
//! frequently changing markup, sometimes behind shadow roots or inside
//! frames. `locate` polls a prioritized candidate list under an
//! explicit [`SearchBudget`] and, when the budget runs out, dumps a
//! diagnostic report detailed enough to explain the failure without a
//! repro session.

use std::time::{Duration, Instant};

use chromiumoxide::Page;
use serde::Deserialize;
use tracing::{debug, error};

use crate::element::LocatedElement;
use crate::error::{Result, WorkflowError};
use crate::js;

/// An element the workflow needs, as an ordered list of candidate
/// selectors. Order encodes priority: callers rely on the first
/// present-and-visible candidate winning.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub name: &'static str,
    /// Stable code surfaced in the result envelope when the budget is
    /// exhausted.
    pub failure_code: &'static str,
    pub candidates: &'static [&'static str],
}

/// Absolute deadline plus polling interval for a retrying search.
/// The search never blocks past `deadline` by more than one interval.
#[derive(Debug, Clone, Copy)]
pub struct SearchBudget {
    deadline: Instant,
    poll: Duration,
}

impl SearchBudget {
    pub fn starting_now(timeout: Duration, poll: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            poll,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    /// Cooperative pause between poll iterations.
    pub async fn rest(&self) {
        tokio::time::sleep(self.poll).await;
    }
}

/// Report from the in-page probe for one candidate selector.
#[derive(Debug, Deserialize)]
pub struct ProbeHit {
    #[serde(rename = "where")]
    pub location: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub testid: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub editable: Option<String>,
    #[serde(default)]
    pub disabled: Option<bool>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub visible: Option<bool>,
}

impl ProbeHit {
    pub fn found(&self) -> bool {
        self.location != "none"
    }

    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct Lookalike {
    #[serde(rename = "where")]
    location: String,
    tag: String,
    #[serde(default)]
    testid: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    editable: Option<String>,
    visible: bool,
    width: i64,
    height: i64,
}

/// Searches the page for `target` until a visible candidate is found
/// or the budget expires.
///
/// Per iteration, in candidate priority order: shadow-aware probe of
/// the main document and shadow subtrees; a visible main-document hit
/// is confirmed through the native query API and returned as a direct
/// handle, a shadow-only hit becomes a scripted handle. Frames are
/// probed only after every candidate missed the main document and
/// shadow subtrees. Direct handles are always preferred over scripted
/// ones when both resolve.
pub async fn locate(page: &Page, target: &Target, budget: &SearchBudget) -> Result<LocatedElement> {
    loop {
        if let Some(handle) = probe_pass(page, target).await {
            debug!(
                target = "xpost.locate",
                name = target.name,
                selector = handle.selector(),
                direct = handle.is_direct(),
                "element located"
            );
            return Ok(handle);
        }
        if budget.expired() {
            break;
        }
        budget.rest().await;
    }

    let report = diagnostic_report(page, target).await;
    error!(
        target = "xpost.locate",
        name = target.name,
        code = target.failure_code,
        "location budget exhausted\n{report}"
    );
    Err(WorkflowError::ElementNotFound {
        code: target.failure_code,
    })
}

/// Selected candidate plus how its handle must be built.
#[derive(Debug, PartialEq, Eq)]
enum Pick<'a> {
    /// Visible in the main document; try the native query first.
    Document(&'a str),
    /// Only reachable through in-page evaluation (shadow or frame).
    Scripted(&'a str),
}

/// One full search iteration over all candidates. A failed probe is a
/// miss for this iteration, not an error: evaluation routinely fails
/// mid-navigation and the budget decides when to stop trying.
async fn probe_pass(page: &Page, target: &Target) -> Option<LocatedElement> {
    let mut probes = Vec::with_capacity(target.candidates.len());
    for sel in target.candidates {
        match js::eval_json::<ProbeHit>(page, &js::probe_candidate(sel)).await {
            Ok(hit) => probes.push((*sel, Some(hit))),
            Err(err) => {
                debug!(
                    target = "xpost.locate",
                    selector = *sel,
                    error = %err,
                    "probe failed, counting as miss"
                );
                probes.push((*sel, None));
            }
        }
    }

    match pick_candidate(probes)? {
        Pick::Document(sel) => {
            // Native handle preferred: richest interaction API.
            if let Ok(element) = page.find_element(sel).await {
                Some(LocatedElement::direct(page.clone(), element, sel))
            } else {
                // The node re-rendered between probe and query; the
                // scripted path re-resolves on every interaction.
                Some(LocatedElement::scripted(page.clone(), sel))
            }
        }
        Pick::Scripted(sel) => Some(LocatedElement::scripted(page.clone(), sel)),
    }
}

/// Pure selection over one iteration's probe results, in candidate
/// priority order. Document and shadow hits win on first sight; frame
/// hits are deferred until every candidate has missed the main
/// document and shadow subtrees, then the highest-priority frame hit
/// is taken. `None` probe entries are failed probes and count as
/// misses.
fn pick_candidate<'a, I>(probes: I) -> Option<Pick<'a>>
where
    I: IntoIterator<Item = (&'a str, Option<ProbeHit>)>,
{
    let mut frame_hit: Option<&'a str> = None;

    for (sel, hit) in probes {
        let Some(hit) = hit else { continue };
        if !hit.is_visible() {
            continue;
        }
        match hit.location.as_str() {
            "document" => return Some(Pick::Document(sel)),
            "shadow" => return Some(Pick::Scripted(sel)),
            "frame" => {
                frame_hit.get_or_insert(sel);
            }
            _ => {}
        }
    }

    frame_hit.map(Pick::Scripted)
}

/// Final probe of every candidate plus an enumeration of everything on
/// the page that resembles an eligible control.
async fn diagnostic_report(page: &Page, target: &Target) -> String {
    let mut report = format!("no visible match for {} among:\n", target.name);

    for sel in target.candidates {
        match js::eval_json::<ProbeHit>(page, &js::probe_candidate(sel)).await {
            Ok(hit) if hit.found() => {
                report.push_str(&format!(
                    "  {sel}: where={} tag={} testid={} role={} editable={} disabled={} size={}x{} visible={}\n",
                    hit.location,
                    hit.tag.as_deref().unwrap_or("?"),
                    hit.testid.as_deref().unwrap_or("-"),
                    hit.role.as_deref().unwrap_or("-"),
                    hit.editable.as_deref().unwrap_or("-"),
                    hit.disabled.unwrap_or(false),
                    hit.width.unwrap_or(0),
                    hit.height.unwrap_or(0),
                    hit.is_visible(),
                ));
            }
            Ok(_) => report.push_str(&format!("  {sel}: not present\n")),
            Err(err) => report.push_str(&format!("  {sel}: probe failed: {err}\n")),
        }
    }

    match js::eval_json::<Vec<Lookalike>>(page, js::enumerate_lookalikes()).await {
        Ok(lookalikes) => {
            report.push_str(&format!("{} eligible-looking elements:\n", lookalikes.len()));
            for el in lookalikes {
                report.push_str(&format!(
                    "  [{}] {} testid={} role={} editable={} visible={} size={}x{}\n",
                    el.location,
                    el.tag,
                    el.testid.as_deref().unwrap_or("-"),
                    el.role.as_deref().unwrap_or("-"),
                    el.editable.as_deref().unwrap_or("-"),
                    el.visible,
                    el.width,
                    el.height,
                ));
            }
        }
        Err(err) => report.push_str(&format!("lookalike enumeration failed: {err}\n")),
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn budget_expires_after_timeout() {
        let budget =
            SearchBudget::starting_now(Duration::from_millis(30), Duration::from_millis(10));
        assert!(!budget.expired());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(budget.expired());
    }

    #[tokio::test]
    async fn rest_sleeps_one_interval_only() {
        let budget = SearchBudget::starting_now(Duration::from_secs(5), Duration::from_millis(20));
        let start = Instant::now();
        budget.rest().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(20));
        assert!(elapsed < Duration::from_millis(200));
    }

    fn hit(location: &str, visible: bool) -> ProbeHit {
        ProbeHit {
            location: location.to_string(),
            tag: None,
            testid: None,
            role: None,
            editable: None,
            disabled: None,
            width: None,
            height: None,
            visible: Some(visible),
        }
    }

    #[test]
    fn earlier_visible_document_hit_wins() {
        let pick = pick_candidate(vec![
            ("a", Some(hit("document", true))),
            ("b", Some(hit("document", true))),
        ]);
        assert_eq!(pick, Some(Pick::Document("a")));
    }

    #[test]
    fn frame_hit_defers_to_later_document_hit() {
        let pick = pick_candidate(vec![
            ("a", Some(hit("frame", true))),
            ("b", Some(hit("document", true))),
        ]);
        assert_eq!(pick, Some(Pick::Document("b")));
    }

    #[test]
    fn frame_hit_defers_to_later_shadow_hit() {
        let pick = pick_candidate(vec![
            ("a", Some(hit("frame", true))),
            ("b", Some(hit("shadow", true))),
        ]);
        assert_eq!(pick, Some(Pick::Scripted("b")));
    }

    #[test]
    fn frame_only_takes_highest_priority_frame_candidate() {
        let pick = pick_candidate(vec![
            ("a", Some(hit("none", false))),
            ("b", Some(hit("frame", true))),
            ("c", Some(hit("frame", true))),
        ]);
        assert_eq!(pick, Some(Pick::Scripted("b")));
    }

    #[test]
    fn invisible_hits_are_skipped() {
        let pick = pick_candidate(vec![
            ("a", Some(hit("document", false))),
            ("b", Some(hit("shadow", true))),
        ]);
        assert_eq!(pick, Some(Pick::Scripted("b")));
    }

    #[test]
    fn failed_probes_count_as_misses() {
        let pick = pick_candidate(vec![
            ("a", None),
            ("b", Some(hit("document", true))),
        ]);
        assert_eq!(pick, Some(Pick::Document("b")));
    }

    #[test]
    fn all_probes_failing_selects_nothing() {
        // The caller keeps polling until the budget expires instead of
        // aborting the search on evaluation failures.
        let pick = pick_candidate(vec![("a", None), ("b", None)]);
        assert_eq!(pick, None);
    }

    #[test]
    fn probe_hit_none_is_not_found() {
        let hit: ProbeHit = serde_json::from_str(r#"{"where":"none"}"#).unwrap();
        assert!(!hit.found());
        assert!(!hit.is_visible());
    }

    #[test]
    fn probe_hit_parses_full_report() {
        let raw = r#"{"where":"shadow","tag":"div","testid":"tweetTextarea_0","role":"textbox",
                      "editable":"true","disabled":false,"width":398,"height":120,"visible":true}"#;
        let hit: ProbeHit = serde_json::from_str(raw).unwrap();
        assert!(hit.found());
        assert!(hit.is_visible());
        assert_eq!(hit.location, "shadow");
        assert_eq!(hit.testid.as_deref(), Some("tweetTextarea_0"));
    }
}
