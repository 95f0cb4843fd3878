use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use mintsmith::asset_store::{AssetStoreVariant, MockAssetStore};
use mintsmith::cache::CacheStore;
use mintsmith::config::RunConfig;
use mintsmith::layout;
use mintsmith::ledger::{LedgerVariant, MockLedger, SubmitError};
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

fn mock_ledger(pipeline: &Pipeline) -> &MockLedger {
    match pipeline.ledger.as_ref() {
        LedgerVariant::Mock(mock) => mock,
        _ => unreachable!(),
    }
}

/// Pipeline with `item_count` uploaded-but-unregistered cache entries and a
/// registered account sized for them. Only the first item's files exist on
/// disk; the registration step reads that descriptor.
async fn seeded_pipeline(dir: &Path, item_count: usize) -> Result<Pipeline> {
    let config = test_config(dir);
    std::fs::create_dir_all(&config.assets_dir)?;
    std::fs::write(config.assets_dir.join("0.png"), b"img")?;
    std::fs::write(
        config.assets_dir.join("0.json"),
        serde_json::to_vec(&serde_json::json!({
            "name": "Item #0",
            "symbol": "MSM",
            "image": "0.png",
        }))?,
    )?;

    let cache = CacheStore::load(&config.cache_path)?;
    let pipeline = Pipeline::new(
        config,
        Wallet::generate(),
        LedgerVariant::Mock(MockLedger::new()),
        AssetStoreVariant::Mock(MockAssetStore::new()),
        cache,
    );

    {
        let mut cache = pipeline.cache.lock().await;
        for i in 0..item_count {
            cache.set_uploaded(
                &i.to_string(),
                format!("https://mock.storage/{i}"),
                format!("Item #{i}"),
            );
        }
        cache.save()?;
    }
    pipeline.run_create_account().await?;
    Ok(pipeline)
}

async fn registered_account(pipeline: &Pipeline) -> String {
    pipeline
        .cache
        .lock()
        .await
        .doc
        .program
        .account_address
        .clone()
        .expect("registered")
}

// ===== Tests =====

#[tokio::test]
async fn full_registration_marks_every_item() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = seeded_pipeline(dir.path(), 25).await?;

    let summary = pipeline.run_register().await?;
    assert_eq!(summary.batches_submitted, 3);
    assert_eq!(summary.items_marked, 25);
    assert_eq!(summary.batches_failed, 0);

    assert_eq!(
        mock_ledger(&pipeline).append_calls(),
        vec![(0, 10), (10, 10), (20, 5)]
    );

    let cache = pipeline.cache.lock().await;
    for i in 0..25 {
        let record = cache.record(&i.to_string()).unwrap();
        assert!(record.on_ledger);
        // Confirmed items always carry a content address.
        assert!(record.link.as_deref().map(|l| !l.is_empty()).unwrap_or(false));
    }
    Ok(())
}

#[tokio::test]
async fn registered_records_decode_back_from_account_bytes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = seeded_pipeline(dir.path(), 12).await?;
    pipeline.run_register().await?;

    let account = registered_account(&pipeline).await;
    let data = mock_ledger(&pipeline).account_bytes(&account).unwrap();

    assert_eq!(layout::record_count(&data), 12);
    let fields = layout::decode_record(&data, 7)?;
    assert_eq!(fields.name, "Item #7");
    assert_eq!(fields.uri, "https://mock.storage/7");
    Ok(())
}

#[tokio::test]
async fn batch_boundaries_at_2001_items() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = seeded_pipeline(dir.path(), 2001).await?;

    let summary = pipeline.run_register().await?;
    assert_eq!(summary.batches_submitted, 201);
    assert_eq!(summary.items_marked, 2001);

    let calls = mock_ledger(&pipeline).append_calls();
    assert_eq!(calls.len(), 201);

    // Macro-groups run concurrently, so only the set of start indices is
    // deterministic.
    let starts: HashSet<u32> = calls.iter().map(|(start, _)| *start).collect();
    let expected: HashSet<u32> = (0..201).map(|i| i * 10).collect();
    assert_eq!(starts, expected);
    assert_eq!(calls.iter().find(|(s, _)| *s == 2000).unwrap().1, 1);
    Ok(())
}

#[tokio::test]
async fn second_pass_skips_confirmed_batches() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = seeded_pipeline(dir.path(), 20).await?;

    pipeline.run_register().await?;
    let second = pipeline.run_register().await?;

    assert_eq!(second.batches_submitted, 0);
    assert_eq!(second.batches_skipped, 2);
    assert_eq!(mock_ledger(&pipeline).append_calls().len(), 2);
    Ok(())
}

#[tokio::test]
async fn failed_micro_batch_is_left_unmarked_and_retried_next_run() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = seeded_pipeline(dir.path(), 20).await?;
    mock_ledger(&pipeline).fail_next(SubmitError::Rejected("record too long".into()));

    let summary = pipeline.run_register().await?;
    assert_eq!(summary.batches_failed, 1);
    assert_eq!(summary.batches_submitted, 1);

    {
        let cache = pipeline.cache.lock().await;
        assert!(!cache.record("0").unwrap().on_ledger);
        assert!(cache.record("10").unwrap().on_ledger);
    }

    // The unmarked batch is picked up on the next run.
    let second = pipeline.run_register().await?;
    assert_eq!(second.batches_submitted, 1);
    assert_eq!(second.batches_skipped, 1);
    assert!(pipeline.cache.lock().await.record("0").unwrap().on_ledger);
    Ok(())
}

#[tokio::test]
async fn expired_block_reference_is_retried_within_the_batch() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = seeded_pipeline(dir.path(), 10).await?;
    mock_ledger(&pipeline).fail_next(SubmitError::BlockRefExpired);

    let summary = pipeline.run_register().await?;
    assert_eq!(summary.batches_failed, 0);
    assert_eq!(summary.batches_submitted, 1);
    assert!(pipeline.cache.lock().await.record("9").unwrap().on_ledger);
    Ok(())
}

#[tokio::test]
async fn micro_batch_with_unuploaded_item_is_deferred() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = seeded_pipeline(dir.path(), 10).await?;
    {
        let mut cache = pipeline.cache.lock().await;
        // Index 10 is known but was never uploaded.
        cache.doc.items.insert("10".into(), Default::default());
        cache.save()?;
    }

    let summary = pipeline.run_register().await?;
    assert_eq!(summary.batches_submitted, 1);
    assert_eq!(summary.batches_deferred, 1);
    assert!(!pipeline.cache.lock().await.record("10").unwrap().on_ledger);
    Ok(())
}

#[tokio::test]
async fn missing_registration_reports_and_continues() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.assets_dir)?;
    let cache = CacheStore::load(&config.cache_path)?;
    let pipeline = Pipeline::new(
        config,
        Wallet::generate(),
        LedgerVariant::Mock(MockLedger::new()),
        AssetStoreVariant::Mock(MockAssetStore::new()),
        cache,
    );
    {
        let mut cache = pipeline.cache.lock().await;
        cache.set_uploaded("0", "https://mock.storage/0".into(), "Item #0".into());
        cache.save()?;
    }

    let summary = pipeline.run_register().await?;
    assert_eq!(summary.batches_submitted, 0);
    assert!(mock_ledger(&pipeline).append_calls().is_empty());
    Ok(())
}
