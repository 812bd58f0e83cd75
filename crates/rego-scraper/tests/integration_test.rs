use rego_browser::BrowserEngine;
use rego_core::{AppConfig, Plate};
use rego_scraper::{LookupEngine, ScrapeError};
use std::sync::Arc;

#[tokio::test]
#[ignore = "Requires Chrome browser and access to the live lookup page"]
async fn test_live_lookup_flow() {
    let config = AppConfig::default();
    let dir = tempfile::TempDir::new().expect("create temp dir");

    let mut lookup = config.lookup.clone();
    lookup.screenshot_path = Some(dir.path().join("screenshot.png"));

    let engine = LookupEngine::new(
        Arc::new(BrowserEngine::with_config(config.browser.clone())),
        lookup,
        config.layout.clone(),
    );

    let plate = Plate::parse(Some("ZZZ999")).expect("valid plate");
    match engine.lookup(&plate).await {
        Ok(record) => {
            assert!(!record.vehicle.model.is_empty());
            println!("Lookup returned: {record:?}");
        }
        Err(ScrapeError::InvalidRegistration) => println!("Plate not registered"),
        Err(e) => panic!("lookup failed: {e}"),
    }

    assert!(dir.path().join("screenshot.png").exists());
}
