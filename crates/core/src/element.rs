//! Located element handles.
//!
//! Two resolution paths share one interaction surface: a *direct*
//! handle wraps a node the native CDP query API can reach; a
//! *scripted* handle re-resolves its selector through in-page
//! evaluation on every use, which is the only way to reach nodes
//! inside shadow subtrees or frames. Call sites never branch on the
//! variant.

use chromiumoxide::{Element, Page};
use serde::Deserialize;

use crate::error::{Result, WorkflowError};
use crate::js;

#[derive(Deserialize)]
struct ScriptOutcome {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub enum LocatedElement {
    Direct {
        page: Page,
        element: Element,
        selector: String,
    },
    Scripted {
        page: Page,
        selector: String,
    },
}

impl LocatedElement {
    pub(crate) fn direct(page: Page, element: Element, selector: &str) -> Self {
        Self::Direct {
            page,
            element,
            selector: selector.to_string(),
        }
    }

    pub(crate) fn scripted(page: Page, selector: &str) -> Self {
        Self::Scripted {
            page,
            selector: selector.to_string(),
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Self::Direct { selector, .. } | Self::Scripted { selector, .. } => selector,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct { .. })
    }

    fn page(&self) -> &Page {
        match self {
            Self::Direct { page, .. } | Self::Scripted { page, .. } => page,
        }
    }

    /// Rendered-box visibility, not mere DOM presence.
    pub async fn is_visible(&self) -> Result<bool> {
        js::eval_json(self.page(), &js::scripted_is_visible(self.selector())).await
    }

    /// Disabled/aria-disabled markers cleared.
    pub async fn is_enabled(&self) -> Result<bool> {
        js::eval_json(self.page(), &js::scripted_is_enabled(self.selector())).await
    }

    pub async fn scroll_into_view(&self) -> Result<()> {
        match self {
            Self::Direct { element, .. } => {
                element.scroll_into_view().await?;
                Ok(())
            }
            Self::Scripted { page, selector } => {
                self.run_script(page, &js::scripted_scroll_into_view(selector))
                    .await
            }
        }
    }

    pub async fn click(&self) -> Result<()> {
        match self {
            Self::Direct { element, .. } => {
                element.click().await?;
                Ok(())
            }
            Self::Scripted { page, selector } => {
                self.run_script(page, &js::scripted_click(selector)).await
            }
        }
    }

    /// Synthetic in-page click, bypassing hit testing. Fallback for
    /// targets that refuse a native click (overlays, zero-size hit
    /// areas).
    pub async fn force_click(&self) -> Result<()> {
        self.run_script(self.page(), &js::scripted_click(self.selector()))
            .await
    }

    async fn run_script(&self, page: &Page, expr: &str) -> Result<()> {
        let outcome: ScriptOutcome = js::eval_json(page, expr).await?;
        if outcome.ok {
            Ok(())
        } else {
            Err(WorkflowError::Interaction {
                selector: self.selector().to_string(),
                reason: outcome.error.unwrap_or_else(|| "script reported failure".to_string()),
            })
        }
    }
}
