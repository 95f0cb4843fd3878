//! Unit tests for pipeline business logic.

use std::path::Path;

use anyhow::Result;

use super::register::{macro_groups, micro_batches, MACRO_GROUP_SIZE, MICRO_BATCH_SIZE};
use crate::asset_store::{AssetStoreVariant, MockAssetStore};
use crate::cache::CacheStore;
use crate::config::RunConfig;
use crate::ledger::{LedgerVariant, MockLedger};
use crate::pipeline::Pipeline;
use crate::wallet::Wallet;

// ==================== TEST HELPERS ====================

fn test_config(dir: &Path) -> RunConfig {
    RunConfig {
        keypair_path: dir.join("id.json"),
        cache_path: dir.join("cache.json"),
        assets_dir: dir.join("assets"),
        ..Default::default()
    }
}

fn write_item(assets: &Path, index: usize, name: &str) {
    std::fs::write(assets.join(format!("{index}.png")), vec![0u8; 16]).unwrap();
    std::fs::write(
        assets.join(format!("{index}.json")),
        serde_json::to_vec(&serde_json::json!({
            "name": name,
            "symbol": "MSM",
            "image": format!("{index}.png"),
            "seller_fee_basis_points": 250,
        }))
        .unwrap(),
    )
    .unwrap();
}

fn mock_pipeline(dir: &Path) -> Pipeline {
    let config = test_config(dir);
    std::fs::create_dir_all(&config.assets_dir).unwrap();
    let cache = CacheStore::load(&config.cache_path).unwrap();
    Pipeline::new(
        config,
        Wallet::generate(),
        LedgerVariant::Mock(MockLedger::new()),
        AssetStoreVariant::Mock(MockAssetStore::new()),
        cache,
    )
}

fn indices(n: usize) -> Vec<String> {
    (0..n).map(|i| i.to_string()).collect()
}

// ==================== TESTS: batch planning ====================

#[test]
fn test_macro_group_boundaries_at_2001_items() {
    let groups = macro_groups(&indices(2001));
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].len(), MACRO_GROUP_SIZE);
    assert_eq!(groups[1].len(), MACRO_GROUP_SIZE);
    assert_eq!(groups[2].len(), 1);

    let micros = micro_batches(&groups[0]);
    assert_eq!(micros.len(), 100);
    assert!(micros.iter().all(|m| m.len() == MICRO_BATCH_SIZE));
}

#[test]
fn test_micro_batch_remainder() {
    let micros = micro_batches(&indices(25));
    assert_eq!(micros.len(), 3);
    assert_eq!(micros[2].len(), 5);
}

#[test]
fn test_empty_index_set_yields_no_groups() {
    assert!(macro_groups(&[]).is_empty());
}

// ==================== TESTS: one-time registration ====================

#[tokio::test]
async fn test_registration_sets_both_identifiers_once() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = mock_pipeline(dir.path());
    write_item(&pipeline.config.assets_dir, 0, "Item #0");
    write_item(&pipeline.config.assets_dir, 1, "Item #1");

    pipeline.run_create_account().await?;

    let (id, address) = {
        let cache = pipeline.cache.lock().await;
        (
            cache.doc.program.registration_id.clone(),
            cache.doc.program.account_address.clone(),
        )
    };
    let address = address.expect("account address set");
    let id = id.expect("registration id set");
    assert!(address.starts_with(&id));

    let LedgerVariant::Mock(mock) = pipeline.ledger.as_ref() else {
        unreachable!()
    };
    assert!(mock.is_initialized(&address));

    // A second call detects the cached identifiers and does nothing.
    pipeline.run_create_account().await?;
    let cache = pipeline.cache.lock().await;
    assert_eq!(cache.doc.program.account_address.as_deref(), Some(address.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_registration_with_no_items_is_an_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = mock_pipeline(dir.path());
    assert!(pipeline.run_create_account().await.is_err());
    Ok(())
}

// ==================== TESTS: admin operations ====================

#[tokio::test]
async fn test_update_start_date_requires_registration() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = mock_pipeline(dir.path());
    assert!(pipeline.update_start_date(1_700_000_000).await.is_err());

    write_item(&pipeline.config.assets_dir, 0, "Item #0");
    pipeline.run_create_account().await?;
    pipeline.update_start_date(1_700_000_000).await?;

    let LedgerVariant::Mock(mock) = pipeline.ledger.as_ref() else {
        unreachable!()
    };
    assert_eq!(mock.start_dates(), vec![1_700_000_000]);
    Ok(())
}

#[tokio::test]
async fn test_mint_one_claims_for_the_payer() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = mock_pipeline(dir.path());
    write_item(&pipeline.config.assets_dir, 0, "Item #0");
    pipeline.run_create_account().await?;

    pipeline.mint_one().await?;

    let LedgerVariant::Mock(mock) = pipeline.ledger.as_ref() else {
        unreachable!()
    };
    assert_eq!(mock.claims(), vec![pipeline.wallet.address().to_string()]);
    Ok(())
}
