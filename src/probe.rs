//! One probe run, start to finish.
//!
//! The browser session is scoped to the run: acquired at the top of [`run`],
//! closed on every exit path. Any error escaping the protocol is converted
//! into a FAIL verdict here; `run` itself never fails and never panics.

use crate::browser::chrome::{ChromeDriver, LaunchOptions};
use crate::error::Result;
use crate::locator::{self, default_candidates, Resolution, ResolvedCta};
use crate::verdict::{self, Outcome, Verdict};
use crate::visibility::{CheckPoint, ContainmentPolicy, CtaSnapshot, Phase};
use std::path::PathBuf;

const INITIAL_SHOT: &str = "cta_initial.png";
const SCROLLED_SHOT: &str = "cta_scrolled.png";

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Page under test.
    pub url: String,
    /// Directory receiving the two full-page screenshots.
    pub screenshot_dir: PathBuf,
    /// Upper bound for the navigation itself.
    pub nav_timeout_ms: u64,
    /// Pause after load for animations to finish.
    pub load_settle_ms: u64,
    /// Pause after the scroll request before re-measuring.
    pub scroll_settle_ms: u64,
    pub containment: ContainmentPolicy,
    pub launch: LaunchOptions,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
            screenshot_dir: std::env::temp_dir().join("cta-probe"),
            nav_timeout_ms: 30_000,
            load_settle_ms: 2_000,
            scroll_settle_ms: 500,
            containment: ContainmentPolicy::default(),
            launch: LaunchOptions::default(),
        }
    }
}

/// Execute one full probe run and reduce it to a verdict.
pub async fn run(config: &ProbeConfig) -> Verdict {
    let mut lines = vec![
        format!("cta-probe run at {}", chrono::Utc::now().to_rfc3339()),
        format!("target: {}", config.url),
    ];

    let driver = match ChromeDriver::launch(&config.launch).await {
        Ok(driver) => driver,
        Err(e) => {
            log::error!("Browser launch failed: {}", e);
            return Verdict::aborted(lines, &e.to_string());
        }
    };

    let verdict = match check_cta(&driver, config, &mut lines).await {
        Ok(outcome) => Verdict::new(outcome, lines),
        Err(e) => {
            log::error!("Probe run failed: {}", e);
            Verdict::aborted(lines, &e.to_string())
        }
    };

    if let Err(e) = driver.close().await {
        log::warn!("Browser close failed: {}", e);
    }
    verdict
}

/// The protocol proper: navigate, resolve, check, scroll, recheck.
async fn check_cta(
    driver: &ChromeDriver,
    config: &ProbeConfig,
    lines: &mut Vec<String>,
) -> Result<Outcome> {
    driver.navigate(&config.url, config.nav_timeout_ms).await?;
    driver.wait(config.load_settle_ms).await;

    let title = driver.title().await.unwrap_or_default();
    lines.push(format!("page loaded: title \"{}\"", title));

    let initial_shot = config.screenshot_dir.join(INITIAL_SHOT);
    driver.screenshot_to_file(&initial_shot).await?;
    lines.push(format!("initial screenshot: {}", initial_shot.display()));

    let viewport = match driver.viewport_size().await {
        Ok(vp) => {
            lines.push(format!("viewport: {:.0}x{:.0}", vp.width, vp.height));
            Some(vp)
        }
        Err(e) => {
            log::warn!("Viewport size unavailable: {}", e);
            None
        }
    };

    let final_shot = config.screenshot_dir.join(SCROLLED_SHOT);

    let cta = match locator::resolve(driver, &default_candidates()).await? {
        Resolution::Found(cta) => cta,
        Resolution::NotFound => {
            lines.push("CTA not found by any locator strategy".to_string());
            lines.push(format!("page title: \"{}\"", title));
            match driver.page_text().await {
                Ok(text) => {
                    for (keyword, present) in locator::keywords_present(&text) {
                        lines.push(format!(
                            "keyword \"{}\" present in page text: {}",
                            keyword, present
                        ));
                    }
                }
                Err(e) => {
                    log::warn!("Page text read failed: {}", e);
                    lines.push("page text unavailable for keyword check".to_string());
                }
            }
            driver.screenshot_to_file(&final_shot).await?;
            lines.push(format!("final screenshot: {}", final_shot.display()));
            return Ok(Outcome::Fail);
        }
    };

    lines.push(format!("CTA found via {}: \"{}\"", cta.strategy, cta.text));

    let baseline_snap = read_snapshot(driver, &cta).await;
    let baseline = CheckPoint::from_snapshot(
        Phase::Initial,
        baseline_snap.as_ref(),
        viewport.as_ref(),
        config.containment,
    );
    push_check_point(lines, &baseline);

    lines.push("scrolling CTA into view".to_string());
    if let Err(e) = cta.scroll_into_view(driver).await {
        // Scroll is an action on the page, not a measurement; a failure
        // here still leaves the recheck meaningful.
        log::warn!("Scroll request failed: {}", e);
    }
    driver.wait(config.scroll_settle_ms).await;

    let final_snap = read_snapshot(driver, &cta).await;
    let after_scroll = CheckPoint::from_snapshot(
        Phase::AfterScroll,
        final_snap.as_ref(),
        viewport.as_ref(),
        config.containment,
    );
    push_check_point(lines, &after_scroll);

    if let Some(snap) = final_snap.as_ref() {
        if let Some(text) = &snap.text {
            lines.push(format!("button text: \"{}\"", text));
        }
        if let Some(enabled) = snap.enabled {
            lines.push(format!("button enabled: {}", enabled));
        }
        if let Some(classes) = &snap.class_attr {
            lines.push(format!("button classes: {}", truncate(classes, 100)));
        }
    }

    driver.screenshot_to_file(&final_shot).await?;
    lines.push(format!("final screenshot: {}", final_shot.display()));

    Ok(verdict::decide(true, &after_scroll))
}

/// Best-effort element read; stale or failed reads become an unknown state.
async fn read_snapshot(driver: &ChromeDriver, cta: &ResolvedCta) -> Option<CtaSnapshot> {
    match cta.snapshot(driver).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            log::warn!("Element read failed, marking state unknown: {}", e);
            None
        }
    }
}

fn push_check_point(lines: &mut Vec<String>, cp: &CheckPoint) {
    match cp.visible {
        Some(visible) => lines.push(format!("visible ({}): {}", cp.phase, visible)),
        None => lines.push(format!("visible ({}): unknown", cp.phase)),
    }
    if let Some(bbox) = &cp.bounding_box {
        lines.push(format!(
            "position ({}): x={:.0}, y={:.0}, size {:.0}x{:.0}",
            cp.phase, bbox.x, bbox.y, bbox.width, bbox.height
        ));
    }
    if let Some(in_viewport) = cp.in_viewport {
        lines.push(format!("in viewport ({}): {}", cp.phase, in_viewport));
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
