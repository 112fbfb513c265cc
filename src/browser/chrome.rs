//! Browser session adapter over chromiumoxide.
//!
//! The probe core only ever talks to this thin layer: navigation, typed
//! JavaScript evaluation, page text/title reads, and full-page screenshots.
//! One driver owns one browser and one page for the duration of a run.

use crate::error::{ProbeError, Result};
use crate::visibility::ViewportSize;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How to launch Chrome for a probe run.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window. Probes run headless by default.
    pub headless: bool,
    /// Pass `--no-sandbox` (required in most CI containers).
    pub no_sandbox: bool,
    /// Explicit Chrome executable; otherwise chromiumoxide autodetects.
    pub chrome_path: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: false,
            chrome_path: None,
        }
    }
}

pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    temp_dir: Option<PathBuf>,
}

impl ChromeDriver {
    /// Launch Chrome and open a single blank page owned by this driver.
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        // Unique profile directory so concurrent runs never share state
        let unique_id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let temp_dir = std::env::temp_dir().join(format!("cta-probe-{}", unique_id));
        std::fs::create_dir_all(&temp_dir).map_err(|e| {
            ProbeError::LaunchFailed(format!("Failed to create profile directory: {}", e))
        })?;

        let mut config = if options.headless {
            BrowserConfig::builder()
        } else {
            BrowserConfig::builder().with_head()
        };
        config = config.user_data_dir(&temp_dir);
        if options.no_sandbox {
            config = config.arg("--no-sandbox");
        }
        if let Some(path) = &options.chrome_path {
            config = config.chrome_executable(path);
        }

        let (browser, mut handler) = Browser::launch(
            config
                .build()
                .map_err(|e| ProbeError::LaunchFailed(e.to_string()))?,
        )
        .await
        .map_err(|e| {
            ProbeError::LaunchFailed(format!(
                "{}. Chrome not found? Install it or pass --chrome-path; \
                 sandbox issues on Linux? Try --no-sandbox",
                e
            ))
        })?;

        // Drain browser events for the lifetime of the session
        tokio::spawn(async move { while (handler.next().await).is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::LaunchFailed(format!("Failed to open page: {}", e)))?;

        Ok(Self {
            browser,
            page,
            temp_dir: Some(temp_dir),
        })
    }

    /// Navigate and wait for the load lifecycle, bounded by `timeout_ms`.
    ///
    /// A timeout or a network-level failure surfaces as
    /// [`ProbeError::Navigation`]; the page is otherwise left settled on the
    /// target URL.
    pub async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<()> {
        log::info!("Navigating to {}", url);

        let nav = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        match nav {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ProbeError::Navigation(format!(
                "Failed to load {}: {}",
                url, e
            ))),
            Err(_) => Err(ProbeError::Navigation(format!(
                "Timed out after {}ms loading {}",
                timeout_ms, url
            ))),
        }
    }

    /// Bounded pause, used for load/scroll settling.
    pub async fn wait(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Current page title (empty string when the page has none).
    pub async fn title(&self) -> Result<String> {
        let title = self.page.get_title().await?;
        Ok(title.unwrap_or_default())
    }

    /// Visible text of the page body.
    pub async fn page_text(&self) -> Result<String> {
        let text = self
            .page
            .find_element("body")
            .await
            .map_err(|e| ProbeError::Other(format!("body not found: {}", e)))?
            .inner_text()
            .await
            .map_err(|e| ProbeError::Other(format!("body text read failed: {}", e)))?;
        Ok(text.unwrap_or_default())
    }

    /// Size of the visible drawing area, measured inside the page.
    pub async fn viewport_size(&self) -> Result<ViewportSize> {
        self.execute_script_typed("({ width: window.innerWidth, height: window.innerHeight })")
            .await
    }

    /// Execute JavaScript in the page, with `null` for void results.
    pub async fn execute_script(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ProbeError::Evaluation(e.to_string()))?;
        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    /// Execute JavaScript and deserialize the result.
    pub async fn execute_script_typed<T: serde::de::DeserializeOwned>(
        &self,
        script: &str,
    ) -> Result<T> {
        let value = self.execute_script(script).await?;
        serde_json::from_value(value)
            .map_err(|e| ProbeError::Evaluation(format!("Failed to deserialize result: {}", e)))
    }

    /// Capture a full-page PNG screenshot to `path`.
    pub async fn screenshot_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ProbeError::Screenshot(format!("Failed to create screenshot directory: {}", e))
            })?;
        }
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(|e| ProbeError::Screenshot(e.to_string()))?;
        log::debug!("Screenshot written to {}", path.display());
        Ok(())
    }

    /// Close the browser session.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        if let Some(temp_dir) = &self.temp_dir {
            if temp_dir.exists() {
                let _ = std::fs::remove_dir_all(temp_dir);
            }
        }
    }
}
