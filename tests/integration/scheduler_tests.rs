use super::*;
use std::time::Duration;
use stock_watcher::models::StockStatus;
use stock_watcher::scheduler::CheckStage;

#[tokio::test]
async fn test_back_in_stock_is_notified() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.set_credentials(TEST_TOKEN, TEST_CHAT).await?;

    let id = env.add_watch("gpu", "RTX 4090").await?;
    env.set_last(id, "OUT_OF_STOCK", None).await?;
    env.serve_page("gpu", "<h1>RTX 4090</h1><p>12 Available</p>").await;
    env.expect_messages(1).await;

    let report = env.scheduler(false)?.run_cycle().await?;
    assert_eq!(report.checked, 1);
    assert_eq!(report.changed, 1);
    assert_eq!(report.notified, 1);

    let watch = env.watch(id).await?;
    assert_eq!(watch.previous_status(), Some(StockStatus::InStock));
    assert_eq!(watch.last_available, Some(12));
    assert!(watch.last_checked.is_some());
    assert_eq!(watch.last_notified, watch.last_checked);

    let texts = env.sent_texts().await;
    assert_eq!(texts, vec![format!("[IN_STOCK] RTX 4090 (12)\n{}", env.page_url("gpu"))]);

    Ok(())
}

#[tokio::test]
async fn test_always_notify_without_change() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.set_credentials(TEST_TOKEN, TEST_CHAT).await?;

    let id = env.add_watch("widget", "Widget").await?;
    env.set_last(id, "OUT_OF_STOCK", None).await?;
    env.serve_page("widget", "Widget - Sold out").await;
    env.expect_messages(1).await;

    let report = env.scheduler(true)?.run_cycle().await?;
    assert_eq!(report.changed, 0);
    assert_eq!(report.notified, 1);

    let watch = env.watch(id).await?;
    assert_eq!(watch.previous_status(), Some(StockStatus::OutOfStock));
    assert!(watch.last_notified.is_some());

    Ok(())
}

#[tokio::test]
async fn test_blank_credentials_do_not_send() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let id = env.add_watch("widget", "Widget").await?;
    env.serve_page("widget", "Widget 3 Available").await;
    env.expect_messages(0).await;

    let report = env.scheduler(true)?.run_cycle().await?;
    assert!(report.is_clean());
    assert_eq!(report.notified, 0);

    let watch = env.watch(id).await?;
    assert_eq!(watch.last_available, Some(3));
    assert_eq!(watch.last_notified, None);

    Ok(())
}

#[tokio::test]
async fn test_fetch_timeout_isolated_to_one_watch() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.set_credentials(TEST_TOKEN, TEST_CHAT).await?;

    let slow = env.add_watch("slow", "Alpha").await?;
    env.set_last(slow, "IN_STOCK", Some(4)).await?;
    let fast = env.add_watch("fast", "Beta").await?;
    env.set_last(fast, "OUT_OF_STOCK", None).await?;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&env.shop)
        .await;
    env.serve_page("fast", "Beta: 2 Available").await;
    env.expect_messages(1).await;

    let before = env.watch(slow).await?;
    let report = env.scheduler(false)?.run_cycle().await?;

    assert_eq!(report.checked, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].watch_id, slow);
    assert_eq!(report.failures[0].stage, CheckStage::Fetch);

    assert_eq!(env.watch(slow).await?, before);

    let beta = env.watch(fast).await?;
    assert_eq!(beta.previous_status(), Some(StockStatus::InStock));
    assert_eq!(beta.last_available, Some(2));
    assert!(beta.last_notified.is_some());

    Ok(())
}

#[tokio::test]
async fn test_error_status_page_is_isolated() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let missing = env.add_watch("gone", "Alpha").await?;
    let ok = env.add_watch("here", "Beta").await?;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&env.shop)
        .await;
    env.serve_page("here", "Beta out of stock").await;

    let report = env.scheduler(false)?.run_cycle().await?;
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("404"));

    assert_eq!(env.watch(missing).await?.last_checked, None);
    assert_eq!(
        env.watch(ok).await?.previous_status(),
        Some(StockStatus::OutOfStock)
    );

    Ok(())
}

#[tokio::test]
async fn test_telegram_failure_keeps_state_and_continues() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.set_credentials(TEST_TOKEN, TEST_CHAT).await?;

    let first = env.add_watch("a", "Alpha").await?;
    let second = env.add_watch("b", "Beta").await?;
    env.serve_page("a", "Alpha 1 Available").await;
    env.serve_page("b", "Beta 2 Available").await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&env.telegram)
        .await;

    let report = env.scheduler(false)?.run_cycle().await?;
    assert_eq!(report.checked, 2);
    assert_eq!(report.notified, 0);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(|f| f.stage == CheckStage::Notify));

    for id in [first, second] {
        let watch = env.watch(id).await?;
        assert_eq!(watch.previous_status(), Some(StockStatus::InStock));
        assert_eq!(watch.last_notified, None);
    }

    Ok(())
}

#[tokio::test]
async fn test_disabled_watches_are_skipped() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let id = env.add_watch("off", "Widget").await?;
    sqlx::query("UPDATE watches SET enabled = 0 WHERE id = ?1")
        .bind(id)
        .execute(env.store.pool())
        .await?;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&env.shop)
        .await;

    let report = env.scheduler(false)?.run_cycle().await?;
    assert_eq!(report.checked, 0);
    assert_eq!(env.watch(id).await?.last_checked, None);

    Ok(())
}

#[tokio::test]
async fn test_run_forever_keeps_cycling() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let id = env.add_watch("widget", "Widget").await?;
    env.serve_page("widget", "Widget sold out").await;

    let scheduler = env.scheduler(false)?;
    let finished = tokio::time::timeout(Duration::from_millis(1500), scheduler.run_forever()).await;
    assert!(finished.is_err(), "run_forever should never return");

    let requests = env.shop.received_requests().await.unwrap_or_default();
    assert!(requests.len() >= 2);
    assert_eq!(
        env.watch(id).await?.previous_status(),
        Some(StockStatus::OutOfStock)
    );

    Ok(())
}
