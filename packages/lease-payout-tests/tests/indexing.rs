use lease_payout::prelude::*;
use lease_payout_database::{queries, types::Lease};
use lease_payout_tests::{
    defaults,
    fixtures::{cancel_tx, indexer_config, lease_tx, transfer_tx, MockNode, TestLedger},
};

fn scripted_node() -> MockNode {
    let node = MockNode::with_chain(250, defaults::GENERATOR);
    node.push_tx(10, lease_tx("lease1", defaults::LEASER_A, defaults::GENERATOR, 1000));
    node.push_tx(20, cancel_tx("cancel1", "lease1"));
    node.push_tx(130, lease_tx("lease2", defaults::LEASER_B, defaults::GENERATOR, 2000));
    node.push_tx(175, transfer_tx("transfer1", 300000));
    node
}

fn expected_leases() -> Vec<Lease> {
    vec![
        Lease {
            id: "lease1".to_string(),
            sender: defaults::LEASER_A.to_string(),
            recipient: defaults::GENERATOR.to_string(),
            start_height: 10,
            end_height: Some(20),
            amount: 1000,
        },
        Lease {
            id: "lease2".to_string(),
            sender: defaults::LEASER_B.to_string(),
            recipient: defaults::GENERATOR.to_string(),
            start_height: 130,
            end_height: None,
            amount: 2000,
        },
    ]
}

#[tokio::test]
async fn test_index_mirrors_chain_in_batches() {
    let ledger = TestLedger::new().await;
    let indexer = LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        ledger.pool.clone(),
        scripted_node(),
    );

    let summary = indexer.run().await.unwrap();
    assert_eq!(
        summary,
        IndexSummary {
            resumed_from: 0,
            remote_height: 250,
            batches: 3,
            blocks: 251,
            leases_opened: 2,
            leases_closed: 1,
            skipped: 0,
        }
    );

    let blocks = ledger.blocks().await;
    assert_eq!(blocks.len(), 251);
    assert!(blocks
        .iter()
        .enumerate()
        .all(|(i, b)| b.height == i as i64 && b.generator == defaults::GENERATOR));
    assert_eq!(blocks[10].fees, 100000);
    assert_eq!(blocks[10].tx_count, 1);
    assert_eq!(blocks[175].fees, 300000);
    assert_eq!(blocks[176].fees, 0);

    assert_eq!(ledger.leases().await, expected_leases());
    assert_eq!(ledger.first_gap().await, Some(251));
}

#[tokio::test]
async fn test_index_is_a_noop_when_up_to_date() {
    let ledger = TestLedger::new().await;
    let indexer = LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        ledger.pool.clone(),
        scripted_node(),
    );

    indexer.run().await.unwrap();
    let blocks = ledger.blocks().await;

    let summary = indexer.run().await.unwrap();
    assert_eq!(summary.resumed_from, 251);
    assert_eq!(summary.batches, 0);
    assert_eq!(summary.blocks, 0);

    assert_eq!(ledger.blocks().await, blocks);
    assert_eq!(ledger.leases().await, expected_leases());
}

#[tokio::test]
async fn test_index_picks_up_new_blocks() {
    let ledger = TestLedger::new().await;
    let indexer = LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        ledger.pool.clone(),
        scripted_node(),
    );
    indexer.run().await.unwrap();

    indexer.node().extend_chain(300, defaults::OTHER_GENERATOR);
    indexer.node().push_tx(280, cancel_tx("cancel2", "lease2"));

    let summary = indexer.run().await.unwrap();
    assert_eq!(summary.resumed_from, 251);
    assert_eq!(summary.blocks, 50);
    assert_eq!(summary.leases_closed, 1);

    let leases = ledger.leases().await;
    assert_eq!(leases[1].end_height, Some(280));
    assert_eq!(ledger.blocks().await[300].generator, defaults::OTHER_GENERATOR);
}

#[tokio::test]
async fn test_interrupted_run_resumes_to_the_same_ledger() {
    let reference = TestLedger::new().await;
    LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        reference.pool.clone(),
        scripted_node(),
    )
    .run()
    .await
    .unwrap();

    let ledger = TestLedger::new().await;
    let node = scripted_node();
    node.unreachable_from(Some(150));
    let indexer = LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        ledger.pool.clone(),
        node,
    );

    let err = indexer.run().await.unwrap_err();
    assert!(matches!(
        err,
        PayoutError::NodeResponseError { status: 503, .. }
    ));
    assert_eq!(ledger.first_gap().await, Some(100));
    assert_eq!(ledger.blocks().await.len(), 100);

    indexer.node().unreachable_from(None);
    let summary = indexer.run().await.unwrap();
    assert_eq!(summary.resumed_from, 100);
    assert_eq!(summary.batches, 2);

    assert_eq!(ledger.blocks().await, reference.blocks().await);
    assert_eq!(ledger.leases().await, reference.leases().await);
}

#[tokio::test]
async fn test_reapplied_blocks_replace_stored_rows() {
    let reference = TestLedger::new().await;
    LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        reference.pool.clone(),
        scripted_node(),
    )
    .run()
    .await
    .unwrap();

    // Rows the indexer already wrote once, with stale values.
    let ledger = TestLedger::new().await;
    let mut stale = reference.blocks().await[0].clone();
    ledger.put_block(&stale).await;
    stale = reference.blocks().await[175].clone();
    stale.fees = 999;
    ledger.put_block(&stale).await;
    {
        let mut conn = ledger.pool.acquire().await.unwrap();
        let mut lease = expected_leases().remove(0);
        lease.end_height = None;
        queries::upsert_lease_create(&mut conn, &lease).await.unwrap();
    }
    assert_eq!(ledger.first_gap().await, Some(1));

    let summary = LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        ledger.pool.clone(),
        scripted_node(),
    )
    .run()
    .await
    .unwrap();
    assert_eq!(summary.resumed_from, 1);

    assert_eq!(ledger.blocks().await, reference.blocks().await);
    assert_eq!(ledger.leases().await, reference.leases().await);
}

#[tokio::test]
async fn test_failed_batch_is_rolled_back() {
    let ledger = TestLedger::new().await;
    let node = scripted_node();
    node.push_tx(150, lease_tx("lease3", defaults::LEASER_A, "alias:W:unknown", 500));
    let indexer = LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        ledger.pool.clone(),
        node,
    );

    let err = indexer.run().await.unwrap_err();
    assert!(matches!(
        err,
        PayoutError::NodeResponseError { status: 404, .. }
    ));

    // Nothing of blocks 100 to 199 is kept, lease2 included.
    assert_eq!(ledger.first_gap().await, Some(100));
    assert_eq!(ledger.blocks().await.len(), 100);
    let leases = ledger.leases().await;
    assert_eq!(leases.len(), 1);
    assert_eq!(leases[0].id, "lease1");
}

#[tokio::test]
async fn test_integrity_errors_are_skipped() {
    let ledger = TestLedger::new().await;
    let node = MockNode::with_chain(50, defaults::GENERATOR);
    node.push_tx(5, cancel_tx("cancel1", "missing"));
    node.push_tx(6, lease_tx("zero", defaults::LEASER_A, defaults::GENERATOR, 0));
    node.push_tx(
        7,
        NodeTransaction {
            sender: None,
            ..lease_tx("anonymous", defaults::LEASER_A, defaults::GENERATOR, 100)
        },
    );
    node.push_tx(8, lease_tx("lease1", defaults::LEASER_A, defaults::GENERATOR, 100));

    let indexer = LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        ledger.pool.clone(),
        node,
    );
    let summary = indexer.run().await.unwrap();

    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.leases_opened, 1);
    assert_eq!(summary.leases_closed, 0);
    assert_eq!(ledger.blocks().await.len(), 51);

    let leases = ledger.leases().await;
    assert_eq!(leases.len(), 1);
    assert_eq!(leases[0].id, "lease1");
}

#[tokio::test]
async fn test_alias_recipients_are_resolved_once() {
    let ledger = TestLedger::new().await;
    let node = MockNode::with_chain(250, defaults::GENERATOR);
    node.add_alias("node", defaults::GENERATOR);
    node.push_tx(10, lease_tx("lease1", defaults::LEASER_A, defaults::NODE_ALIAS, 1000));
    node.push_tx(150, lease_tx("lease2", defaults::LEASER_B, defaults::NODE_ALIAS, 2000));

    let indexer = LedgerIndexer::new(
        indexer_config(defaults::INDEXER_BATCH_SIZE),
        ledger.pool.clone(),
        node,
    );
    indexer.run().await.unwrap();

    assert_eq!(indexer.node().alias_lookups(), 1);
    assert!(ledger
        .leases()
        .await
        .iter()
        .all(|lease| lease.recipient == defaults::GENERATOR));
}

#[tokio::test]
async fn test_zero_batch_size_is_rejected() {
    let ledger = TestLedger::new().await;
    let indexer = LedgerIndexer::new(indexer_config(0), ledger.pool.clone(), scripted_node());

    assert!(matches!(
        indexer.run().await,
        Err(PayoutError::ConfigurationError(_))
    ));
    assert!(ledger.blocks().await.is_empty());
}
