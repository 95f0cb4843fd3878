use std::path::Path;

use anyhow::Result;
use mintsmith::asset_store::{AssetStoreVariant, MockAssetStore};
use mintsmith::cache::CacheStore;
use mintsmith::config::RunConfig;
use mintsmith::layout;
use mintsmith::ledger::{LedgerVariant, MockLedger};
use mintsmith::pipeline::Pipeline;
use mintsmith::wallet::Wallet;

// ===== Test Helper Functions =====

fn test_config(dir: &Path) -> RunConfig {
    RunConfig {
        keypair_path: dir.join("id.json"),
        cache_path: dir.join("cache.json"),
        assets_dir: dir.join("assets"),
        ..Default::default()
    }
}

fn write_item(assets: &Path, index: usize, name: &str) {
    std::fs::write(assets.join(format!("{index}.png")), b"img").unwrap();
    std::fs::write(
        assets.join(format!("{index}.json")),
        serde_json::to_vec(&serde_json::json!({
            "name": name,
            "symbol": "MSM",
            "image": format!("{index}.png"),
        }))
        .unwrap(),
    )
    .unwrap();
}

fn test_pipeline(dir: &Path, item_count: usize) -> Pipeline {
    let config = test_config(dir);
    std::fs::create_dir_all(&config.assets_dir).unwrap();
    for i in 0..item_count {
        write_item(&config.assets_dir, i, &format!("Item #{i}"));
    }
    let cache = CacheStore::load(&config.cache_path).unwrap();
    Pipeline::new(
        config,
        Wallet::generate(),
        LedgerVariant::Mock(MockLedger::new()),
        AssetStoreVariant::Mock(MockAssetStore::new()),
        cache,
    )
}

fn mock_ledger(pipeline: &Pipeline) -> &MockLedger {
    match pipeline.ledger.as_ref() {
        LedgerVariant::Mock(mock) => mock,
        _ => unreachable!(),
    }
}

/// Pipeline whose cache claims index 3 is registered with the given
/// name/link, over a synthetic account buffer holding `ledger_name` /
/// `ledger_uri` at the computed offset for index 3.
async fn synthetic_pipeline(
    dir: &Path,
    cache_name: &str,
    cache_link: &str,
    ledger_name: &str,
    ledger_uri: &str,
) -> Result<Pipeline> {
    let config = test_config(dir);
    std::fs::create_dir_all(&config.assets_dir)?;
    let cache = CacheStore::load(&config.cache_path)?;
    let pipeline = Pipeline::new(
        config,
        Wallet::generate(),
        LedgerVariant::Mock(MockLedger::new()),
        AssetStoreVariant::Mock(MockAssetStore::new()),
        cache,
    );

    let address = "synthetic-account".to_string();
    let mut data = vec![0u8; layout::account_size(8)];
    layout::encode_record(&mut data, 3, ledger_name, ledger_uri)?;
    mock_ledger(&pipeline).set_account_bytes(&address, data);

    {
        let mut cache = pipeline.cache.lock().await;
        cache.doc.program.registration_id = Some(address.chars().take(6).collect());
        cache.doc.program.account_address = Some(address);
        cache.set_uploaded("3", cache_link.to_string(), cache_name.to_string());
        cache.mark_registered("3");
        cache.save()?;
    }
    Ok(pipeline)
}

async fn on_ledger(pipeline: &Pipeline, index: &str) -> bool {
    pipeline
        .cache
        .lock()
        .await
        .record(index)
        .map(|r| r.on_ledger)
        .unwrap_or(false)
}

// ===== Tests =====

#[tokio::test]
async fn matching_record_leaves_flag_unchanged() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = synthetic_pipeline(
        dir.path(),
        "Item #3",
        "https://x/aaa",
        "Item #3",
        "https://x/aaa",
    )
    .await?;

    let summary = pipeline.run_verify().await?;
    assert_eq!(summary.checked, 1);
    assert_eq!(summary.mismatched, 0);
    assert!(on_ledger(&pipeline, "3").await);
    Ok(())
}

#[tokio::test]
async fn mismatched_uri_clears_the_flag() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = synthetic_pipeline(
        dir.path(),
        "Item #3",
        "https://x/aaa",
        "Item #3",
        "https://x/bbb",
    )
    .await?;

    let summary = pipeline.run_verify().await?;
    assert_eq!(summary.mismatched, 1);
    assert!(!on_ledger(&pipeline, "3").await);
    Ok(())
}

#[tokio::test]
async fn containment_is_not_accepted_as_a_match() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // The cached link is a strict prefix of the ledger uri; a substring
    // comparison would wave this through.
    let pipeline = synthetic_pipeline(
        dir.path(),
        "Item #3",
        "https://x/aaa",
        "Item #3",
        "https://x/aaabbb",
    )
    .await?;

    let summary = pipeline.run_verify().await?;
    assert_eq!(summary.mismatched, 1);
    assert!(!on_ledger(&pipeline, "3").await);
    Ok(())
}

#[tokio::test]
async fn record_beyond_account_bounds_counts_as_mismatch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = synthetic_pipeline(
        dir.path(),
        "Item #3",
        "https://x/aaa",
        "Item #3",
        "https://x/aaa",
    )
    .await?;
    {
        let mut cache = pipeline.cache.lock().await;
        // Index 40 lies past the synthetic account's record array.
        cache.set_uploaded("40", "https://x/zzz".into(), "Item #40".into());
        cache.mark_registered("40");
        cache.save()?;
    }

    let summary = pipeline.run_verify().await?;
    assert_eq!(summary.checked, 2);
    assert_eq!(summary.mismatched, 1);
    assert!(on_ledger(&pipeline, "3").await);
    assert!(!on_ledger(&pipeline, "40").await);
    Ok(())
}

#[tokio::test]
async fn verify_without_registration_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = test_pipeline(dir.path(), 0);
    assert!(pipeline.run_verify().await.is_err());
    Ok(())
}

#[tokio::test]
async fn cleared_items_are_reregistered_by_the_next_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = test_pipeline(dir.path(), 12);

    // Full pipeline: upload, register, verify clean.
    pipeline.run_upload().await?;
    pipeline.run_register().await?;
    let clean = pipeline.run_verify().await?;
    assert_eq!(clean.checked, 12);
    assert_eq!(clean.mismatched, 0);

    // Tamper with one record on the ledger.
    let account = pipeline.registered_account().await.unwrap();
    let mut data = mock_ledger(&pipeline).account_bytes(&account).unwrap();
    layout::encode_record(&mut data, 5, "Item #5", "https://evil/5")?;
    mock_ledger(&pipeline).set_account_bytes(&account, data);

    let summary = pipeline.run_verify().await?;
    assert_eq!(summary.mismatched, 1);
    assert!(!on_ledger(&pipeline, "5").await);

    // The registrar resubmits exactly the micro-batch holding index 5.
    let before = mock_ledger(&pipeline).append_calls().len();
    let second = pipeline.run_register().await?;
    assert_eq!(second.batches_submitted, 1);
    assert_eq!(mock_ledger(&pipeline).append_calls().len(), before + 1);
    assert!(on_ledger(&pipeline, "5").await);

    let final_pass = pipeline.run_verify().await?;
    assert_eq!(final_pass.mismatched, 0);
    Ok(())
}
