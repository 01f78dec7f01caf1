use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    BookSession, CompleteSession, Engine, EngineError, MoneyCents, PaymentMethod, RecordPayment,
    SessionListFilter, SessionStatus,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["ama".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Creates a center with one service and returns (center, service, suv id).
async fn seed_center(engine: &Engine) -> (String, Uuid, Uuid) {
    let center_id = engine.new_center("Main", "ama", None, None).await.unwrap();
    let service_id = engine
        .new_service_type(&center_id, "ama", "basic wash", MoneyCents::new(2000), None)
        .await
        .unwrap();
    let catalog = engine.catalog(&center_id, "ama").await.unwrap();
    let suv_id = catalog
        .vehicle_types
        .iter()
        .find_map(|v| (v.name == "suv").then_some(v.id))
        .expect("default suv vehicle type missing");
    (center_id, service_id, suv_id)
}

fn booking(center_id: &str, service_id: Uuid, vehicle_type_id: Uuid, phone: &str) -> BookSession {
    let now = Utc::now();
    BookSession::new(
        center_id,
        service_id,
        vehicle_type_id,
        phone,
        "GR 1234-20",
        now + Duration::hours(2),
        now,
    )
    .customer_name("Kofi Mensah")
}

#[tokio::test]
async fn booking_prices_session_and_creates_customer() {
    let (engine, _db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;

    let (session_id, quote) = engine
        .book_session("ama", booking(&center_id, service_id, suv_id, "+233 20 123 4567"))
        .await
        .unwrap();

    // 2000 * 1.3 (suv), no discount for a first-time customer.
    assert_eq!(quote.sub_total.cents(), 2600);
    assert_eq!(quote.final_price.cents(), 2600);
    assert!(!quote.loyalty_discount_applied);
    assert_eq!(quote.customer_wash_count, 0);

    let session = engine
        .session(&center_id, session_id, "ama")
        .await
        .unwrap();
    assert_eq!(session.status(), SessionStatus::Unpaid);
    assert_eq!(session.price.cents(), 2600);
    assert_eq!(session.plate, "GR1234-20");

    let customer = engine.customer("+233201234567").await.unwrap();
    assert_eq!(customer.name.as_deref(), Some("Kofi Mensah"));
    assert_eq!(customer.vehicle_plates, vec!["GR1234-20".to_string()]);

    // A second booking with the same plate does not duplicate it.
    engine
        .book_session("ama", booking(&center_id, service_id, suv_id, "+233201234567"))
        .await
        .unwrap();
    let customer = engine.customer("+233201234567").await.unwrap();
    assert_eq!(customer.vehicle_plates.len(), 1);
}

#[tokio::test]
async fn full_lifecycle_moves_loyalty_counters() {
    let (engine, _db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;
    let now = Utc::now();

    let (session_id, _) = engine
        .book_session("ama", booking(&center_id, service_id, suv_id, "0200000001"))
        .await
        .unwrap();

    engine
        .record_payment(
            &center_id,
            session_id,
            "ama",
            RecordPayment::new(MoneyCents::new(2600), PaymentMethod::Cash, "ama", now),
        )
        .await
        .unwrap();

    engine
        .start_session(&center_id, session_id, "ama", now)
        .await
        .unwrap();

    let (session, customer) = engine
        .complete_session(
            &center_id,
            session_id,
            "ama",
            CompleteSession::new(now + Duration::minutes(45))
                .duration_minutes(45)
                .rating(5),
        )
        .await
        .unwrap();

    assert!(session.is_completed);
    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.duration_minutes, Some(45));
    let start = session.actual_start.unwrap();
    let end = session.actual_end.unwrap();
    assert_eq!((end - start).num_minutes(), 45);

    assert_eq!(customer.total_completed_bookings, 1);
    assert_eq!(customer.total_amount_spent.cents(), 2600);
    assert!(customer.last_visit.is_some());

    // The counters were persisted, not just mirrored on the snapshot.
    let reloaded = engine.customer("0200000001").await.unwrap();
    assert_eq!(reloaded.total_completed_bookings, 1);
    assert_eq!(reloaded.average_spending_per_visit().cents(), 2600);

    // The payment record is valid and can be verified.
    let payment = engine
        .verify_payment(&center_id, session_id, "ama")
        .await
        .unwrap();
    assert!(payment.is_verified);
}

#[tokio::test]
async fn complete_requires_started_session() {
    let (engine, _db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;

    let (session_id, _) = engine
        .book_session("ama", booking(&center_id, service_id, suv_id, "0200000002"))
        .await
        .unwrap();

    let result = engine
        .complete_session(
            &center_id,
            session_id,
            "ama",
            CompleteSession::new(Utc::now()).duration_minutes(30),
        )
        .await;
    assert!(matches!(result, Err(EngineError::InvalidTransition(_))));
}

#[tokio::test]
async fn cancellation_is_terminal_and_dominates() {
    let (engine, _db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;
    let now = Utc::now();

    let (session_id, _) = engine
        .book_session("ama", booking(&center_id, service_id, suv_id, "0200000003"))
        .await
        .unwrap();

    engine
        .record_payment(
            &center_id,
            session_id,
            "ama",
            RecordPayment::new(MoneyCents::new(2600), PaymentMethod::Cash, "ama", now),
        )
        .await
        .unwrap();

    // Cancelled two hours ahead of the scheduled start.
    let (session, lost_minutes) = engine
        .cancel_session(&center_id, session_id, "ama", "customer no-show", now)
        .await
        .unwrap();
    assert_eq!(session.status(), SessionStatus::Cancelled);
    assert!(session.is_paid);
    assert!(lost_minutes.unwrap() < 0);

    let again = engine
        .cancel_session(&center_id, session_id, "ama", "twice", now)
        .await;
    assert!(matches!(again, Err(EngineError::InvalidTransition(_))));

    let reloaded = engine
        .session(&center_id, session_id, "ama")
        .await
        .unwrap();
    assert_eq!(
        reloaded.cancellation_reason.as_deref(),
        Some("customer no-show")
    );

    // No further lifecycle moves on a cancelled session.
    let result = engine
        .start_session(&center_id, session_id, "ama", now)
        .await;
    assert!(matches!(result, Err(EngineError::InvalidTransition(_))));
}

#[tokio::test]
async fn electronic_payment_requires_reference() {
    let (engine, _db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;
    let now = Utc::now();

    let (session_id, _) = engine
        .book_session("ama", booking(&center_id, service_id, suv_id, "0200000004"))
        .await
        .unwrap();

    let rejected = engine
        .record_payment(
            &center_id,
            session_id,
            "ama",
            RecordPayment::new(MoneyCents::new(2600), PaymentMethod::MobileMoney, "ama", now),
        )
        .await;
    assert!(matches!(rejected, Err(EngineError::PaymentInvalid(_))));

    // The rejected payment left the session untouched.
    let session = engine
        .session(&center_id, session_id, "ama")
        .await
        .unwrap();
    assert!(!session.is_paid);
    assert_eq!(session.status(), SessionStatus::Unpaid);

    engine
        .record_payment(
            &center_id,
            session_id,
            "ama",
            RecordPayment::new(MoneyCents::new(2600), PaymentMethod::MobileMoney, "ama", now)
                .transaction_ref("MM-98765"),
        )
        .await
        .unwrap();
    let session = engine
        .session(&center_id, session_id, "ama")
        .await
        .unwrap();
    assert!(session.is_paid);
    assert_eq!(session.status(), SessionStatus::PaidPending);
}

#[tokio::test]
async fn loyalty_discount_unlocks_after_five_washes() {
    let (engine, _db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;
    let phone = "0244000005";

    // A new customer requesting the discount does not get it.
    let (_, quote) = engine
        .book_session(
            "ama",
            booking(&center_id, service_id, suv_id, phone).with_loyalty_discount(),
        )
        .await
        .unwrap();
    assert!(!quote.loyalty_discount_applied);
    assert_eq!(quote.final_price.cents(), 2600);

    // Complete five paid washes to cross the tier-1 boundary.
    for _ in 0..5 {
        let now = Utc::now();
        let (session_id, _) = engine
            .book_session("ama", booking(&center_id, service_id, suv_id, phone))
            .await
            .unwrap();
        engine
            .record_payment(
                &center_id,
                session_id,
                "ama",
                RecordPayment::new(MoneyCents::new(2600), PaymentMethod::Cash, "ama", now),
            )
            .await
            .unwrap();
        engine
            .start_session(&center_id, session_id, "ama", now)
            .await
            .unwrap();
        engine
            .complete_session(
                &center_id,
                session_id,
                "ama",
                CompleteSession::new(now).duration_minutes(30),
            )
            .await
            .unwrap();
    }

    let customer = engine.customer(phone).await.unwrap();
    assert_eq!(customer.total_completed_bookings, 5);
    assert_eq!(customer.loyalty_tier(), 1);
    assert!(customer.is_discount_eligible());

    // Now the requested discount applies: 10% of 2600.
    let (session_id, quote) = engine
        .book_session(
            "ama",
            booking(&center_id, service_id, suv_id, phone).with_loyalty_discount(),
        )
        .await
        .unwrap();
    assert!(quote.loyalty_discount_applied);
    assert_eq!(quote.loyalty_discount.cents(), 260);
    assert_eq!(quote.final_price.cents(), 2340);
    assert_eq!(quote.customer_wash_count, 5);

    // Removing the discount restores the sub-total.
    let now = Utc::now();
    let (session, result) = engine
        .set_loyalty_discount(&center_id, session_id, "ama", false, now)
        .await
        .unwrap();
    assert_eq!(session.price.cents(), 2600);
    assert!(!result.loyalty_discount_applied);

    // A center-level percentage change is picked up on the next re-price.
    engine
        .set_center_discount_percent(&center_id, "ama", 20)
        .await
        .unwrap();
    let (session, _) = engine
        .set_loyalty_discount(&center_id, session_id, "ama", true, now)
        .await
        .unwrap();
    assert_eq!(session.loyalty_discount.cents(), 520);
    assert_eq!(session.price.cents(), 2080);

    // Once paid, the price is locked.
    engine
        .record_payment(
            &center_id,
            session_id,
            "ama",
            RecordPayment::new(MoneyCents::new(2600), PaymentMethod::Cash, "ama", now),
        )
        .await
        .unwrap();
    let locked = engine
        .set_loyalty_discount(&center_id, session_id, "ama", true, now)
        .await;
    assert!(matches!(locked, Err(EngineError::InvalidTransition(_))));
}

#[tokio::test]
async fn catalog_cache_serves_stale_until_invalidated_or_expired() {
    let (engine, db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;
    let t0 = Utc::now();

    // Prime the cache.
    let mut cmd = booking(&center_id, service_id, suv_id, "0200000006");
    cmd.now = t0;
    let (_, quote) = engine.book_session("ama", cmd).await.unwrap();
    assert_eq!(quote.sub_total.cents(), 2600);

    // Change the price behind the engine's back.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE service_types SET base_price_minor = 3000 WHERE id = ?",
        vec![service_id.to_string().into()],
    ))
    .await
    .unwrap();

    // Within the TTL the cached price still wins.
    let mut cmd = booking(&center_id, service_id, suv_id, "0200000006");
    cmd.now = t0 + Duration::seconds(30);
    let (_, quote) = engine.book_session("ama", cmd).await.unwrap();
    assert_eq!(quote.sub_total.cents(), 2600);

    // Past the TTL the new price is observed.
    let mut cmd = booking(&center_id, service_id, suv_id, "0200000006");
    cmd.now = t0 + Duration::seconds(120);
    let (_, quote) = engine.book_session("ama", cmd).await.unwrap();
    assert_eq!(quote.sub_total.cents(), 3900);

    // An engine-side price update invalidates immediately.
    engine
        .update_service_price(&center_id, "ama", service_id, MoneyCents::new(1000))
        .await
        .unwrap();
    let mut cmd = booking(&center_id, service_id, suv_id, "0200000006");
    cmd.now = t0 + Duration::seconds(121);
    let (_, quote) = engine.book_session("ama", cmd).await.unwrap();
    assert_eq!(quote.sub_total.cents(), 1300);
}

#[tokio::test]
async fn listing_paginates_and_hides_cancelled_by_default() {
    let (engine, _db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;
    let base = Utc::now();

    let mut ids = Vec::new();
    for i in 0..5 {
        let mut cmd = booking(&center_id, service_id, suv_id, "0200000007");
        cmd.scheduled_start = base + Duration::hours(i);
        let (session_id, _) = engine.book_session("ama", cmd).await.unwrap();
        ids.push(session_id);
    }
    engine
        .cancel_session(&center_id, ids[4], "ama", "overbooked", base)
        .await
        .unwrap();

    let filter = SessionListFilter::default();
    let (page1, cursor) = engine
        .list_sessions(&center_id, "ama", 2, None, &filter)
        .await
        .unwrap();
    assert_eq!(page1.len(), 2);
    let cursor = cursor.expect("expected a second page");
    // Newest first, cancelled session excluded.
    assert_eq!(page1[0].id, ids[3]);
    assert_eq!(page1[1].id, ids[2]);

    let (page2, cursor2) = engine
        .list_sessions(&center_id, "ama", 2, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(page2.len(), 2);
    assert_eq!(page2[0].id, ids[1]);
    assert_eq!(page2[1].id, ids[0]);
    assert!(cursor2.is_none());

    let all_filter = SessionListFilter {
        include_cancelled: true,
        ..Default::default()
    };
    let (all, _) = engine
        .list_sessions(&center_id, "ama", 10, None, &all_filter)
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn foreign_center_is_forbidden() {
    let (engine, db) = engine_with_db().await;
    let (center_id, _, _) = seed_center(&engine).await;

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["esi".into(), "password".into()],
    ))
    .await
    .unwrap();

    let result = engine.catalog(&center_id, "esi").await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn customers_are_deactivated_not_deleted() {
    let (engine, _db) = engine_with_db().await;
    let (center_id, service_id, suv_id) = seed_center(&engine).await;

    engine
        .book_session("ama", booking(&center_id, service_id, suv_id, "0200000008"))
        .await
        .unwrap();

    engine.deactivate_customer("0200000008").await.unwrap();
    let customer = engine.customer("0200000008").await.unwrap();
    assert!(!customer.is_active);
}
