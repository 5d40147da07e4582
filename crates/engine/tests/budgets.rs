use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    BillReminderInput, BudgetInput, BudgetPeriod, BudgetStatus, CategoryInput, CategoryKind,
    DbNotificationSink, Engine, EngineError, NewWallet, NotificationId, NotificationKind,
    NotificationSink, PeriodAlignment, ResultEngine, TransactionInput, UrgencyTier, WalletKind,
};
use migration::MigratorTrait;
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Delegates to the database sink unless told to fail.
struct FlakySink {
    inner: DbNotificationSink,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

#[async_trait]
impl NotificationSink for FlakySink {
    async fn create_notification(
        &self,
        user_id: &str,
        kind: NotificationKind,
        message: &str,
    ) -> ResultEngine<NotificationId> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::Notification("push gateway down".to_string()));
        }
        self.inner.create_notification(user_id, kind, message).await
    }
}

async fn connect() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn setup(engine: &Engine) -> Uuid {
    engine.create_user("alice", "password").await.unwrap();
    engine
        .new_wallet(
            "alice",
            NewWallet::new("Main", WalletKind::Checking, day(2026, 1, 1)),
        )
        .await
        .unwrap()
        .id
}

async fn engine_with_db() -> (Engine, Uuid) {
    let db = connect().await;
    let engine = Engine::builder().database(db).build().await.unwrap();
    let wallet_id = setup(&engine).await;
    (engine, wallet_id)
}

async fn engine_with_sink() -> (Engine, Uuid, Arc<FlakySink>) {
    let db = connect().await;
    let sink = Arc::new(FlakySink {
        inner: DbNotificationSink::new(db.clone()),
        failing: AtomicBool::new(false),
        attempts: AtomicUsize::new(0),
    });
    let engine = Engine::builder()
        .database(db)
        .notification_sink(sink.clone())
        .build()
        .await
        .unwrap();
    let wallet_id = setup(&engine).await;
    (engine, wallet_id, sink)
}

async fn spend(engine: &Engine, wallet_id: Uuid, amount: i64, on: NaiveDate) {
    engine
        .create_transaction("alice", TransactionInput::expense(wallet_id, amount, on))
        .await
        .unwrap();
}

async fn notification_kinds(engine: &Engine) -> Vec<NotificationKind> {
    let mut kinds: Vec<_> = engine
        .list_notifications("alice", false)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.kind)
        .collect();
    kinds.reverse();
    kinds
}

#[tokio::test]
async fn monthly_budget_reaches_its_alert_threshold() {
    let (engine, wallet_id) = engine_with_db().await;
    engine
        .create_transaction(
            "alice",
            TransactionInput::income(wallet_id, 1000_00, day(2026, 1, 2)),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 200_00, day(2026, 1, 10)).await;
    assert_eq!(engine.wallet("alice", wallet_id).await.unwrap().balance, 800_00);

    let budget = engine
        .create_budget(
            "alice",
            BudgetInput::new("Monthly", 250_00, BudgetPeriod::Month, day(2026, 1, 1))
                .alert_threshold(80),
        )
        .await
        .unwrap();

    let listed = engine.list_budgets("alice", day(2026, 1, 15)).await.unwrap();
    assert_eq!(listed.len(), 1);
    let snapshot = &listed[0].snapshot;
    assert_eq!(listed[0].budget.id, budget.id);
    assert_eq!(snapshot.spent, 200_00);
    assert_eq!(snapshot.percentage, 80);
    assert_eq!(snapshot.remaining, 50_00);
    assert_eq!(snapshot.status, BudgetStatus::Warning);
    assert_eq!(snapshot.days_remaining, Some(17));
    assert_eq!(
        snapshot.alert_message.as_deref(),
        Some("Budget 'Monthly' has reached 80% (200.00 of 250.00)")
    );

    assert_eq!(
        notification_kinds(&engine).await,
        vec![NotificationKind::BudgetAlert]
    );

    engine.list_budgets("alice", day(2026, 1, 16)).await.unwrap();
    assert_eq!(notification_kinds(&engine).await.len(), 1);
}

#[tokio::test]
async fn each_tier_is_notified_once_and_in_order() {
    let (engine, wallet_id) = engine_with_db().await;
    engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 100_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();

    spend(&engine, wallet_id, 55_00, day(2026, 1, 3)).await;
    engine.list_budgets("alice", day(2026, 1, 3)).await.unwrap();
    spend(&engine, wallet_id, 30_00, day(2026, 1, 4)).await;
    engine.list_budgets("alice", day(2026, 1, 4)).await.unwrap();
    engine.list_budgets("alice", day(2026, 1, 4)).await.unwrap();
    spend(&engine, wallet_id, 30_00, day(2026, 1, 5)).await;
    let listed = engine.list_budgets("alice", day(2026, 1, 5)).await.unwrap();
    engine.list_budgets("alice", day(2026, 1, 6)).await.unwrap();

    assert_eq!(listed[0].snapshot.status, BudgetStatus::Exceeded);
    assert_eq!(listed[0].snapshot.remaining, 0);
    assert_eq!(listed[0].snapshot.percentage, 115);
    assert_eq!(
        notification_kinds(&engine).await,
        vec![
            NotificationKind::BudgetHalf,
            NotificationKind::BudgetAlert,
            NotificationKind::BudgetExceeded,
        ]
    );
}

#[tokio::test]
async fn refunds_do_not_lower_the_tier_within_a_period() {
    let (engine, wallet_id) = engine_with_db().await;
    engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 100_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();
    let tx = engine
        .create_transaction(
            "alice",
            TransactionInput::expense(wallet_id, 90_00, day(2026, 1, 3)),
        )
        .await
        .unwrap();
    engine.list_budgets("alice", day(2026, 1, 3)).await.unwrap();

    engine.delete_transaction("alice", tx.id).await.unwrap();
    spend(&engine, wallet_id, 60_00, day(2026, 1, 4)).await;
    let listed = engine.list_budgets("alice", day(2026, 1, 4)).await.unwrap();
    assert_eq!(listed[0].snapshot.status, BudgetStatus::Half);

    assert_eq!(
        notification_kinds(&engine).await,
        vec![NotificationKind::BudgetAlert]
    );
}

#[tokio::test]
async fn a_new_period_starts_from_scratch() {
    let (engine, wallet_id) = engine_with_db().await;
    engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 100_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 60_00, day(2026, 1, 20)).await;
    engine.list_budgets("alice", day(2026, 1, 20)).await.unwrap();

    let february = engine.list_budgets("alice", day(2026, 2, 1)).await.unwrap();
    assert_eq!(february[0].snapshot.spent, 0);
    assert_eq!(february[0].snapshot.status, BudgetStatus::Good);
    assert_eq!(february[0].snapshot.alert_message, None);

    spend(&engine, wallet_id, 50_00, day(2026, 2, 2)).await;
    engine.list_budgets("alice", day(2026, 2, 2)).await.unwrap();
    assert_eq!(
        notification_kinds(&engine).await,
        vec![NotificationKind::BudgetHalf, NotificationKind::BudgetHalf]
    );
}

#[tokio::test]
async fn failed_delivery_is_retried_on_next_read() {
    let (engine, wallet_id, sink) = engine_with_sink().await;
    let budget = engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 100_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 85_00, day(2026, 1, 3)).await;

    sink.failing.store(true, Ordering::SeqCst);
    let listed = engine.list_budgets("alice", day(2026, 1, 3)).await.unwrap();
    assert_eq!(listed[0].snapshot.status, BudgetStatus::Warning);
    assert!(notification_kinds(&engine).await.is_empty());

    let snapshot = engine
        .budget_snapshot("alice", budget.id, day(2026, 1, 3))
        .await
        .unwrap();
    let err = engine
        .evaluate_alert("alice", &budget, &snapshot)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Notification(_)));
    assert!(err.is_retryable());

    sink.failing.store(false, Ordering::SeqCst);
    let sent = engine
        .evaluate_alert("alice", &budget, &snapshot)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sent.kind, NotificationKind::BudgetAlert);
    assert_eq!(sent.user_id, "alice");
    assert_eq!(
        engine
            .evaluate_alert("alice", &budget, &snapshot)
            .await
            .unwrap(),
        None
    );
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reads_notify_once() {
    let (engine, wallet_id) = engine_with_db().await;
    let engine = Arc::new(engine);
    engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 100_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 100_00, day(2026, 1, 3)).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.list_budgets("alice", day(2026, 1, 3)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        notification_kinds(&engine).await,
        vec![NotificationKind::BudgetExceeded]
    );
}

#[tokio::test]
async fn snapshot_alone_sends_nothing() {
    let (engine, wallet_id) = engine_with_db().await;
    let budget = engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 100_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 100_00, day(2026, 1, 3)).await;

    let snapshot = engine
        .budget_snapshot("alice", budget.id, day(2026, 1, 3))
        .await
        .unwrap();
    assert_eq!(snapshot.status, BudgetStatus::Exceeded);
    assert!(notification_kinds(&engine).await.is_empty());
}

#[tokio::test]
async fn category_budget_counts_only_its_category() {
    let (engine, wallet_id) = engine_with_db().await;
    let food = engine
        .create_category(
            "alice",
            CategoryInput {
                name: "Food".to_string(),
                kind: CategoryKind::Expense,
            },
        )
        .await
        .unwrap();
    let budget = engine
        .create_budget(
            "alice",
            BudgetInput::new("Food", 100_00, BudgetPeriod::Month, day(2026, 1, 1))
                .category(food.id),
        )
        .await
        .unwrap();

    engine
        .create_transaction(
            "alice",
            TransactionInput::expense(wallet_id, 30_00, day(2026, 1, 3)).category(food.id),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 500_00, day(2026, 1, 3)).await;
    engine
        .create_transaction(
            "alice",
            TransactionInput::income(wallet_id, 40_00, day(2026, 1, 3)).category(food.id),
        )
        .await
        .unwrap();

    let snapshot = engine
        .budget_snapshot("alice", budget.id, day(2026, 1, 3))
        .await
        .unwrap();
    assert_eq!(snapshot.spent, 30_00);
    assert_eq!(snapshot.status, BudgetStatus::Good);
}

#[tokio::test]
async fn yearly_budget_spans_the_calendar_year() {
    let (engine, wallet_id) = engine_with_db().await;
    let budget = engine
        .create_budget(
            "alice",
            BudgetInput::new("Travel", 1000_00, BudgetPeriod::Year, day(2026, 3, 1)),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 100_00, day(2025, 12, 31)).await;
    spend(&engine, wallet_id, 200_00, day(2026, 1, 1)).await;
    spend(&engine, wallet_id, 300_00, day(2026, 12, 31)).await;

    let snapshot = engine
        .budget_snapshot("alice", budget.id, day(2026, 6, 1))
        .await
        .unwrap();
    assert_eq!(snapshot.window.start, day(2026, 1, 1));
    assert_eq!(snapshot.window.end, day(2027, 1, 1));
    assert_eq!(snapshot.spent, 500_00);
    assert_eq!(snapshot.status, BudgetStatus::Half);
}

#[tokio::test]
async fn anchored_budget_follows_its_start_day() {
    let db = connect().await;
    let engine = Engine::builder()
        .database(db)
        .alignment(PeriodAlignment::Anchored)
        .build()
        .await
        .unwrap();
    let wallet_id = setup(&engine).await;
    let budget = engine
        .create_budget(
            "alice",
            BudgetInput::new("Rent cycle", 100_00, BudgetPeriod::Month, day(2026, 1, 15)),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 10_00, day(2026, 2, 14)).await;
    spend(&engine, wallet_id, 20_00, day(2026, 2, 15)).await;

    let snapshot = engine
        .budget_snapshot("alice", budget.id, day(2026, 2, 10))
        .await
        .unwrap();
    assert_eq!(snapshot.window.start, day(2026, 1, 15));
    assert_eq!(snapshot.window.end, day(2026, 2, 15));
    assert_eq!(snapshot.spent, 10_00);
    assert_eq!(snapshot.days_remaining, Some(5));
}

#[tokio::test]
async fn editing_a_budget_forgets_sent_alerts() {
    let (engine, wallet_id) = engine_with_db().await;
    let budget = engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 100_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();
    spend(&engine, wallet_id, 60_00, day(2026, 1, 3)).await;
    engine.list_budgets("alice", day(2026, 1, 3)).await.unwrap();

    engine
        .update_budget(
            "alice",
            budget.id,
            BudgetInput::new("Leisure", 100_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();
    engine.list_budgets("alice", day(2026, 1, 3)).await.unwrap();
    assert_eq!(notification_kinds(&engine).await.len(), 1);

    engine
        .update_budget(
            "alice",
            budget.id,
            BudgetInput::new("Leisure", 110_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap();
    engine.list_budgets("alice", day(2026, 1, 3)).await.unwrap();
    assert_eq!(
        notification_kinds(&engine).await,
        vec![NotificationKind::BudgetHalf, NotificationKind::BudgetHalf]
    );
}

#[tokio::test]
async fn invalid_budgets_are_rejected() {
    let (engine, _wallet_id) = engine_with_db().await;

    let err = engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 0, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_budget(
            "alice",
            BudgetInput::new("Fun", 10_00, BudgetPeriod::Month, day(2026, 1, 1))
                .alert_threshold(-5),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidThreshold(_)));

    let err = engine
        .create_budget(
            "alice",
            BudgetInput::new("   ", 10_00, BudgetPeriod::Month, day(2026, 1, 1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let err = engine
        .budget_snapshot("alice", Uuid::new_v4(), day(2026, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn bill_reminders_are_classified_by_due_date() {
    let (engine, _wallet_id) = engine_with_db().await;
    for (name, due_on, paid) in [
        ("Phone", day(2026, 1, 9), false),
        ("Rent", day(2026, 1, 13), false),
        ("Gym", day(2026, 1, 30), false),
        ("Water", day(2026, 1, 2), true),
    ] {
        engine
            .create_bill_reminder(
                "alice",
                BillReminderInput {
                    name: name.to_string(),
                    amount_minor: 10_00,
                    due_on,
                    paid,
                },
            )
            .await
            .unwrap();
    }

    let views = engine
        .list_bill_reminders("alice", day(2026, 1, 10), false)
        .await
        .unwrap();
    let tiers: Vec<_> = views
        .iter()
        .map(|v| (v.reminder.name.as_str(), v.urgency.tier, v.urgency.days_until))
        .collect();
    assert_eq!(
        tiers,
        vec![
            ("Phone", UrgencyTier::Overdue, -1),
            ("Rent", UrgencyTier::Urgent, 3),
            ("Gym", UrgencyTier::Upcoming, 20),
        ]
    );

    let all = engine
        .list_bill_reminders("alice", day(2026, 1, 10), true)
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
}
