//! End-to-end probe runs against local fixture pages.
//!
//! These tests launch a real headless Chrome (with --no-sandbox for CI) and
//! drive the full protocol: navigate, resolve, check, scroll, recheck.


use cta_probe::{probe, ContainmentPolicy, LaunchOptions, ProbeConfig};
use cta_server::CtaServer;
use std::path::Path;

fn test_config(url: String, name: &str) -> ProbeConfig {
    ProbeConfig {
        url,
        screenshot_dir: std::env::temp_dir().join(format!("cta-probe-test-{}", name)),
        // Static fixture pages need no animation settling
        load_settle_ms: 200,
        scroll_settle_ms: 200,
        launch: LaunchOptions {
            headless: true,
            no_sandbox: true,
            chrome_path: None,
        },
        ..ProbeConfig::default()
    }
}

fn transcript(lines: &[String]) -> String {
    lines.join("\n")
}

fn assert_two_screenshots(dir: &Path) {
    for name in ["cta_initial.png", "cta_scrolled.png"] {
        let path = dir.join(name);
        assert!(path.exists(), "missing screenshot {}", path.display());
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 1000, "screenshot {} suspiciously small", name);
    }
}

#[tokio::test]
async fn visible_cta_passes_via_exact_text_match() -> anyhow::Result<()> {
    let server = CtaServer::start().await;
    server.wait_ready().await?;

    let config = test_config(server.url(), "landing");
    let verdict = probe::run(&config).await;
    let text = transcript(&verdict.lines);
    println!("{}", text);

    assert!(verdict.passed(), "expected PASS, transcript:\n{}", text);
    assert_eq!(verdict.exit_code(), 0);
    assert!(text.contains("exact text match"));
    assert!(text.contains("visible (after scroll): true"));
    // The fixture places the button ~50px from the top
    assert!(text.contains("y=50"), "unexpected position, transcript:\n{}", text);
    assert_two_screenshots(&config.screenshot_dir);
    Ok(())
}

#[tokio::test]
async fn missing_cta_fails_with_keyword_diagnostic() -> anyhow::Result<()> {
    let server = CtaServer::start().await;
    server.wait_ready().await?;

    let config = test_config(format!("{}/no-cta", server.url()), "no-cta");
    let verdict = probe::run(&config).await;
    let text = transcript(&verdict.lines);
    println!("{}", text);

    assert!(!verdict.passed());
    assert_eq!(verdict.exit_code(), 1);
    assert!(text.contains("CTA not found by any locator strategy"));
    assert!(text.contains("page title: \"Maintenance\""));
    assert!(text.contains("keyword \"Dashboard\" present in page text: false"));
    assert!(text.contains("keyword \"Started\" present in page text: false"));
    // Both screenshots are still produced on the not-found path
    assert_two_screenshots(&config.screenshot_dir);
    Ok(())
}

#[tokio::test]
async fn below_fold_cta_passes_after_scroll() -> anyhow::Result<()> {
    let server = CtaServer::start().await;
    server.wait_ready().await?;

    let config = test_config(format!("{}/below-fold", server.url()), "below-fold");
    let verdict = probe::run(&config).await;
    let text = transcript(&verdict.lines);
    println!("{}", text);

    assert!(verdict.passed(), "expected PASS, transcript:\n{}", text);
    // The button starts 2000px down, outside the initial viewport, and ends
    // up inside it once scrolled into view.
    assert!(text.contains("in viewport (initial): false"));
    assert!(text.contains("in viewport (after scroll): true"));
    Ok(())
}

#[tokio::test]
async fn renamed_cta_is_found_by_text_scan() -> anyhow::Result<()> {
    let server = CtaServer::start().await;
    server.wait_ready().await?;

    let config = test_config(format!("{}/renamed", server.url()), "renamed");
    let verdict = probe::run(&config).await;
    let text = transcript(&verdict.lines);
    println!("{}", text);

    assert!(verdict.passed(), "expected PASS, transcript:\n{}", text);
    assert!(text.contains("button text scan"));
    assert!(text.contains("Launch Dashboard"));
    Ok(())
}

#[tokio::test]
async fn hidden_cta_fails_visibility_check() -> anyhow::Result<()> {
    let server = CtaServer::start().await;
    server.wait_ready().await?;

    let config = test_config(format!("{}/hidden", server.url()), "hidden");
    let verdict = probe::run(&config).await;
    let text = transcript(&verdict.lines);
    println!("{}", text);

    // The button exists in the DOM, so resolution succeeds, but it never
    // becomes visible.
    assert!(!verdict.passed());
    assert!(text.contains("visible (after scroll): false"));
    assert_two_screenshots(&config.screenshot_dir);
    Ok(())
}

#[tokio::test]
async fn unreachable_page_fails_without_hanging() -> anyhow::Result<()> {
    // Nothing listens on this port; navigation must fail within its bound
    // and surface as a FAIL verdict, never a crash.
    let mut config = test_config("http://127.0.0.1:9/".to_string(), "unreachable");
    config.nav_timeout_ms = 5_000;

    let verdict = probe::run(&config).await;
    let text = transcript(&verdict.lines);
    println!("{}", text);

    assert!(!verdict.passed());
    assert_eq!(verdict.exit_code(), 1);
    assert!(text.contains("ERROR:"));
    Ok(())
}

#[tokio::test]
async fn strict_policy_is_harder_to_satisfy() -> anyhow::Result<()> {
    let server = CtaServer::start().await;
    server.wait_ready().await?;

    let mut config = test_config(server.url(), "strict");
    config.containment = ContainmentPolicy::StrictAllEdges;
    let verdict = probe::run(&config).await;
    let text = transcript(&verdict.lines);
    println!("{}", text);

    // A top-of-page CTA sits fully inside the viewport either way
    assert!(verdict.passed(), "expected PASS, transcript:\n{}", text);
    assert!(text.contains("in viewport (after scroll): true"));
    Ok(())
}
