//! Browser session lifecycle.
//!
//! A [`Session`] owns the launched Chrome process, the CDP event pump
//! and the single page the workflow drives. The profile directory
//! passed at launch makes the session durable: cookies and storage
//! survive across runs, so a manual login only has to happen once.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::storage::GetCookiesParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{Result, WorkflowError};
use crate::js;
use crate::snapshot::{OriginStorage, SessionSnapshot, StoredCookie};

/// Cookies written by in-page script need a beat to reach the network
/// stack before capture sees them.
pub const COOKIE_SETTLE: Duration = Duration::from_millis(1200);

pub struct Session {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl Session {
    /// Launches Chrome against the durable profile and applies the
    /// mobile emulation overrides to the initial page.
    pub async fn launch(config: &SessionConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(&config.profile_dir)
            .viewport(None)
            .arg("--disable-blink-features=AutomationControlled");
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(WorkflowError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| WorkflowError::Launch(e.to_string()))?;

        // Event pump; when it ends, Chrome has disconnected.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!(target = "xpost.session", ?event, "handler event");
                }
            }
            debug!(target = "xpost.session", "browser event stream closed");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| WorkflowError::Launch(e.to_string()))?;

        let session = Self {
            browser,
            handler_task,
            page,
        };
        session.apply_emulation(config).await?;

        info!(
            target = "xpost.session",
            profile = %config.profile_dir.display(),
            headless = config.headless,
            "browser session launched"
        );
        Ok(session)
    }

    /// Mobile emulation: user agent, accept-language, viewport metrics
    /// and touch events. Applied before first navigation so the site
    /// never sees the desktop surface.
    async fn apply_emulation(&self, config: &SessionConfig) -> Result<()> {
        let ua = SetUserAgentOverrideParams {
            user_agent: config.user_agent.clone(),
            accept_language: Some(config.accept_language.clone()),
            platform: Some("iPhone".to_string()),
            user_agent_metadata: None,
        };
        self.page.execute(ua).await?;

        let (width, height) = config.viewport;
        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(width as i64)
            .height(height as i64)
            .device_scale_factor(config.device_scale_factor)
            .mobile(true)
            .build()
            .map_err(WorkflowError::Js)?;
        self.page.execute(metrics).await?;

        let touch = SetTouchEmulationEnabledParams::builder()
            .enabled(true)
            .build()
            .map_err(WorkflowError::Js)?;
        self.page.execute(touch).await?;
        Ok(())
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!(target = "xpost.session", url, "navigating");
        self.page
            .goto(url)
            .await
            .map_err(|e| WorkflowError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Current page URL, falling back to in-page `location.href` when
    /// the CDP target info lags a redirect.
    pub async fn current_url(&self) -> Result<String> {
        if let Ok(Some(url)) = self.page.url().await {
            if !url.is_empty() {
                return Ok(url);
            }
        }
        js::eval_json(&self.page, js::current_href()).await
    }

    /// All cookies in the browser context, unfiltered. The page-level
    /// cookie query scopes to the current document's URLs and would
    /// miss cookies set on sibling domains during login.
    pub async fn all_cookies(&self) -> Result<Vec<StoredCookie>> {
        let resp = self.page.execute(GetCookiesParams::default()).await?;
        Ok(resp
            .result
            .cookies
            .into_iter()
            .map(|c| StoredCookie {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                secure: c.secure,
                http_only: c.http_only,
                session: c.session,
                same_site: c.same_site.map(|s| format!("{s:?}")),
            })
            .collect())
    }

    /// Serializes cookies plus the current origin's localStorage.
    /// Opaque origins ("null") contribute nothing and are dropped.
    pub async fn capture_snapshot(&self) -> Result<SessionSnapshot> {
        let cookies = self.all_cookies().await?;
        let mut origins = Vec::new();
        match js::eval_json::<OriginStorage>(&self.page, js::read_local_storage()).await {
            Ok(storage) if storage.origin != "null" && !storage.entries.is_empty() => {
                origins.push(storage);
            }
            Ok(_) => {}
            Err(err) => {
                warn!(target = "xpost.session", error = %err, "localStorage capture failed");
            }
        }
        Ok(SessionSnapshot::new(cookies, origins))
    }

    /// Closes the browser and stops the event pump. Safe to call once;
    /// consumes the session so a second close cannot happen.
    pub async fn close(self) {
        let mut browser = self.browser;
        if let Err(err) = browser.close().await {
            warn!(target = "xpost.session", error = %err, "browser close failed");
        }
        let _ = browser.wait().await;
        self.handler_task.abort();
        info!(target = "xpost.session", "browser session closed");
    }
}
