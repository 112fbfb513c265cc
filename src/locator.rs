//! Locator resolution engine.
//!
//! CTA wording and markup drift across page revisions, so a single selector
//! is brittle. Resolution walks an ordered candidate list from the most
//! precise strategy to the loosest, and finally falls back to a text scan
//! over every button-like element. The first hit wins; which strategy found
//! the element is recorded so a markup regression reads differently from a
//! visibility regression in the transcript.

use crate::browser::chrome::ChromeDriver;
use crate::error::{ProbeError, Result};
use crate::visibility::CtaSnapshot;
use serde::Deserialize;
use std::fmt;

/// Keywords the fallback scan and the not-found diagnostic look for.
pub const CTA_KEYWORDS: [&str; 2] = ["Dashboard", "Started"];

const BUTTON_LIKE_SELECTOR: &str =
    "button, a, [role='button'], input[type='submit'], input[type='button']";

/// How a candidate matches elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Trimmed element text equals the needle.
    ExactText,
    /// Button-role element whose text contains the needle.
    RoleText,
    /// Any link or button whose text contains the needle.
    TextSearch,
    /// Fallback: visible button-like element containing a known keyword.
    TextScan,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::ExactText => write!(f, "exact text match"),
            Strategy::RoleText => write!(f, "role + text match"),
            Strategy::TextSearch => write!(f, "text search"),
            Strategy::TextScan => write!(f, "button text scan"),
        }
    }
}

/// One locator expression. Order in the candidate list encodes priority.
#[derive(Debug, Clone)]
pub struct LocatorCandidate {
    pub strategy: Strategy,
    pub selector: &'static str,
    pub needle: &'static str,
    pub exact: bool,
}

/// The priority-ordered candidate list for the landing-page CTA.
pub fn default_candidates() -> Vec<LocatorCandidate> {
    vec![
        LocatorCandidate {
            strategy: Strategy::ExactText,
            selector: "button",
            needle: "Open Dashboard",
            exact: true,
        },
        LocatorCandidate {
            strategy: Strategy::RoleText,
            selector: "button, a[role='button'], [role='button'], input[type='submit']",
            needle: "Get Started",
            exact: false,
        },
        LocatorCandidate {
            strategy: Strategy::TextSearch,
            selector: "button, a",
            needle: "Open Dashboard",
            exact: false,
        },
    ]
}

/// A located CTA, addressed by a structural CSS path computed in the page.
///
/// The path can stop resolving if the page mutates after resolution; reads
/// through it then report the element as stale.
#[derive(Debug, Clone)]
pub struct ResolvedCta {
    pub strategy: Strategy,
    pub css_path: String,
    pub text: String,
}

/// Outcome of resolution. `NotFound` is an expected result, not an error:
/// the caller still owes the user a report and screenshots.
#[derive(Debug, Clone)]
pub enum Resolution {
    Found(ResolvedCta),
    NotFound,
}

/// One element returned by the in-page scan.
#[derive(Debug, Clone, Deserialize)]
struct ElementMatch {
    path: String,
    text: String,
    visible: bool,
}

// Shared JS helpers injected into every scan. cssPath builds a structural
// nth-of-type path usable with querySelector later in the run.
const JS_HELPERS: &str = r#"
    const cssPath = (el) => {
        const parts = [];
        while (el && el.nodeType === Node.ELEMENT_NODE && el.tagName !== 'HTML') {
            let idx = 1;
            let sib = el;
            while ((sib = sib.previousElementSibling)) {
                if (sib.tagName === el.tagName) idx++;
            }
            parts.unshift(el.tagName.toLowerCase() + ':nth-of-type(' + idx + ')');
            el = el.parentElement;
        }
        return parts.length ? 'html > ' + parts.join(' > ') : 'html';
    };
    const isVisible = (el) => {
        const r = el.getBoundingClientRect();
        if (r.width <= 0 || r.height <= 0) return false;
        const s = window.getComputedStyle(el);
        return s.display !== 'none' && s.visibility !== 'hidden' && parseFloat(s.opacity) > 0;
    };
"#;

fn scan_script(selector: &str, needle: &str, exact: bool) -> String {
    format!(
        r#"(() => {{
{helpers}
    const needle = {needle};
    const exact = {exact};
    const matches = [];
    for (const el of document.querySelectorAll({selector})) {{
        const text = (el.innerText || el.textContent || '').trim();
        const hit = exact ? text === needle : text.includes(needle);
        if (hit) {{
            matches.push({{ path: cssPath(el), text: text, visible: isVisible(el) }});
        }}
    }}
    return matches;
}})()"#,
        helpers = JS_HELPERS,
        needle = js_string(needle),
        exact = exact,
        selector = js_string(selector),
    )
}

fn snapshot_script(css_path: &str) -> String {
    format!(
        r#"(() => {{
    const el = document.querySelector({path});
    if (!el) return null;
    const out = {{ visible: null, rect: null, enabled: null, text: null, class_attr: null }};
    try {{
        const r = el.getBoundingClientRect();
        out.rect = {{ x: r.x, y: r.y, width: r.width, height: r.height }};
        const s = window.getComputedStyle(el);
        out.visible = r.width > 0 && r.height > 0 && s.display !== 'none'
            && s.visibility !== 'hidden' && parseFloat(s.opacity) > 0;
    }} catch (e) {{}}
    try {{ out.enabled = !el.disabled; }} catch (e) {{}}
    try {{ out.text = (el.innerText || '').trim(); }} catch (e) {{}}
    try {{ out.class_attr = el.getAttribute('class'); }} catch (e) {{}}
    return out;
}})()"#,
        path = js_string(css_path),
    )
}

fn scroll_script(css_path: &str) -> String {
    format!(
        r#"(() => {{
    const el = document.querySelector({path});
    if (!el) return false;
    el.scrollIntoView({{ block: 'center', inline: 'nearest' }});
    return true;
}})()"#,
        path = js_string(css_path),
    )
}

/// JSON-escape a Rust string into a JS string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Pick the first visible element, in DOM order, whose text contains any
/// known keyword.
fn pick_fallback(matches: &[ElementMatch]) -> Option<&ElementMatch> {
    matches
        .iter()
        .find(|m| m.visible && CTA_KEYWORDS.iter().any(|k| m.text.contains(k)))
}

/// Resolve the CTA against the loaded page.
///
/// Per-candidate evaluation errors are absorbed and logged; resolution only
/// fails as a whole when the page itself is unreachable.
pub async fn resolve(
    driver: &ChromeDriver,
    candidates: &[LocatorCandidate],
) -> Result<Resolution> {
    for candidate in candidates {
        let script = scan_script(candidate.selector, candidate.needle, candidate.exact);
        let matches: Vec<ElementMatch> = match driver.execute_script_typed(&script).await {
            Ok(m) => m,
            Err(e) => {
                log::debug!(
                    "Candidate '{}' query failed, trying next: {}",
                    candidate.strategy,
                    e
                );
                continue;
            }
        };
        if let Some(m) = matches.first() {
            log::info!(
                "Found CTA using strategy '{}' ({} match(es))",
                candidate.strategy,
                matches.len()
            );
            return Ok(Resolution::Found(ResolvedCta {
                strategy: candidate.strategy,
                css_path: m.path.clone(),
                text: m.text.clone(),
            }));
        }
        log::debug!("Candidate '{}' matched nothing", candidate.strategy);
    }

    // Loosest net: scan every button-like element for a keyword
    let script = scan_script(BUTTON_LIKE_SELECTOR, "", false);
    let matches: Vec<ElementMatch> = match driver.execute_script_typed(&script).await {
        Ok(m) => m,
        Err(e) => {
            log::debug!("Fallback scan failed: {}", e);
            Vec::new()
        }
    };
    if let Some(m) = pick_fallback(&matches) {
        log::info!("Found CTA via button text scan: '{}'", m.text);
        return Ok(Resolution::Found(ResolvedCta {
            strategy: Strategy::TextScan,
            css_path: m.path.clone(),
            text: m.text.clone(),
        }));
    }

    log::warn!("CTA not found by any locator strategy");
    Ok(Resolution::NotFound)
}

impl ResolvedCta {
    /// Best-effort property read. A detached element surfaces as
    /// [`ProbeError::StaleElement`]; callers absorb it into unknown fields.
    pub async fn snapshot(&self, driver: &ChromeDriver) -> Result<CtaSnapshot> {
        let snapshot: Option<CtaSnapshot> = driver
            .execute_script_typed(&snapshot_script(&self.css_path))
            .await?;
        snapshot.ok_or_else(|| ProbeError::StaleElement(self.css_path.clone()))
    }

    /// Ask the page to bring the element into view.
    pub async fn scroll_into_view(&self, driver: &ChromeDriver) -> Result<()> {
        let found: bool = driver
            .execute_script_typed(&scroll_script(&self.css_path))
            .await?;
        if found {
            Ok(())
        } else {
            Err(ProbeError::StaleElement(self.css_path.clone()))
        }
    }
}

/// Which known keywords appear anywhere in the page text. Distinguishes
/// "button renamed" from "page didn't render" when resolution misses.
pub fn keywords_present(page_text: &str) -> Vec<(&'static str, bool)> {
    CTA_KEYWORDS
        .iter()
        .map(|k| (*k, page_text.contains(k)))
        .collect()
}
