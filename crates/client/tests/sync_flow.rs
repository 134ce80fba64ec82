//! End-to-end behavior of the sync layer against scripted backends.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use tokio::task::yield_now;

use phutung_client::api::PlacedOrder;
use phutung_client::notify::{self, NoticeLevel, NoticeReceiver, NoticeSender};
use phutung_client::sync::{
    spawn_query_pump, CartBackend, CartStore, Checkout, CheckoutOutcome, CollectionSource,
    CollectionStore, OrderBackend, QueryDebouncer,
};
use phutung_client::{ApiError, Session};
use phutung_core::{
    CartLine, CartLineId, FetchState, OrderDraft, OrderId, PaymentMethod, Product, ProductId,
    ProductQuery, ProductSummary, Role, ShippingDetails, UserId, UserRecord,
};

type Result<T> = std::result::Result<T, ApiError>;

// === Fixtures ===

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn user() -> UserRecord {
    UserRecord {
        id: UserId::new(7),
        firstname: "An".to_string(),
        lastname: "Trần".to_string(),
        email: "an.tran@example.com".to_string(),
        phone: Some("0901234567".to_string()),
        role: Role::Customer,
        image: None,
    }
}

fn session() -> Session {
    Session::logged_in(user(), SecretString::from("test-token".to_string()))
}

fn shipping() -> ShippingDetails {
    ShippingDetails {
        full_name: "Trần An".to_string(),
        phone: "0901234567".to_string(),
        address: "12 Lý Thường Kiệt, Q.10, TP.HCM".to_string(),
    }
}

fn line(id: i32, quantity: u32, unit_price: i64) -> CartLine {
    CartLine {
        id: CartLineId::new(id),
        product_id: ProductId::new(id * 10),
        product: ProductSummary {
            id: ProductId::new(id * 10),
            name: format!("part {id}"),
            image: None,
        },
        quantity,
        unit_price: Decimal::from(unit_price),
        created_at: Utc
            .with_ymd_and_hms(2025, 3, 1, 8, 0, id as u32)
            .single()
            .expect("valid timestamp"),
    }
}

/// 2 x 100 000 + 1 x 50 000 = 250 000 VND.
fn server_cart() -> Vec<CartLine> {
    vec![line(1, 2, 100_000), line(2, 1, 50_000)]
}

async fn settle_background<F: Fn() -> bool>(done: F) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

fn drain(rx: &mut NoticeReceiver) -> Vec<NoticeLevel> {
    let mut levels = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        levels.push(notice.level);
    }
    levels
}

// === Superseding fetches ===

/// "first" takes 400ms to answer, anything else 20ms.
struct DelayedSource;

#[async_trait]
impl CollectionSource<String, u32> for DelayedSource {
    async fn fetch(&self, query: &String) -> Result<Vec<u32>> {
        let (delay, rows) = match query.as_str() {
            "first" => (Duration::from_millis(400), vec![1]),
            _ => (Duration::from_millis(20), vec![2]),
        };
        tokio::time::sleep(delay).await;
        Ok(rows)
    }
}

#[tokio::test(start_paused = true)]
async fn slow_response_for_old_query_is_dropped() {
    init_tracing();
    let store = Arc::new(CollectionStore::new(
        Arc::new(DelayedSource),
        "test",
        NoticeSender::sink(),
    ));

    let slow = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.load("first".to_string()).await })
    };
    yield_now().await;
    assert!(store.state().is_loading());

    store.load("second".to_string()).await;
    slow.await.expect("slow task");

    // The older response landed last but must not win.
    assert_eq!(store.rows(), vec![2]);
    assert_eq!(store.state(), FetchState::Ready { rows: vec![2] });
    assert_eq!(store.last_query(), Some("second".to_string()));
}

// === Debounced query pump ===

struct RecordingSource {
    calls: Mutex<Vec<ProductQuery>>,
}

#[async_trait]
impl CollectionSource<ProductQuery, Product> for RecordingSource {
    async fn fetch(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        self.calls.lock().expect("lock").push(query.clone());
        Ok(Vec::new())
    }
}

#[tokio::test(start_paused = true)]
async fn keystroke_burst_reaches_network_once() {
    let source = Arc::new(RecordingSource {
        calls: Mutex::new(Vec::new()),
    });
    let store = Arc::new(CollectionStore::new(
        Arc::clone(&source) as Arc<dyn CollectionSource<ProductQuery, Product>>,
        "products",
        NoticeSender::sink(),
    ));
    let debouncer = QueryDebouncer::new(ProductQuery::default(), Duration::from_millis(500));
    let _pump = spawn_query_pump(Arc::clone(&store), debouncer.committed());

    // Initial load of the default query.
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(source.calls.lock().expect("lock").len(), 1);

    for partial in ["l", "lố", "lốp", "lốp x", "lốp xe"] {
        debouncer.set_keyword(partial);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    let calls = source.calls.lock().expect("lock").clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].keyword, "lốp xe");
}

#[tokio::test(start_paused = true)]
async fn category_toggle_commits_without_pending_keyword() {
    let source = Arc::new(RecordingSource {
        calls: Mutex::new(Vec::new()),
    });
    let store = Arc::new(CollectionStore::new(
        Arc::clone(&source) as Arc<dyn CollectionSource<ProductQuery, Product>>,
        "products",
        NoticeSender::sink(),
    ));
    let debouncer = QueryDebouncer::new(ProductQuery::default(), Duration::from_millis(500));
    let _pump = spawn_query_pump(Arc::clone(&store), debouncer.committed());
    tokio::time::sleep(Duration::from_millis(10)).await;

    debouncer.set_keyword("nh");
    debouncer.set_categories(BTreeSet::from(["Nhớt".to_string()]));
    tokio::time::sleep(Duration::from_millis(10)).await;

    // The category fetch must not carry the half-typed keyword.
    {
        let calls = source.calls.lock().expect("lock").clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].categories_param(), "Nhớt");
        assert_eq!(calls[1].keyword, "");
    }

    tokio::time::sleep(Duration::from_millis(600)).await;
    let calls = source.calls.lock().expect("lock").clone();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2].keyword, "nh");
    assert_eq!(calls[2].categories_param(), "Nhớt");
}

// === Optimistic cart writes ===

struct ScriptedCart {
    server_lines: Mutex<Vec<CartLine>>,
    fail_update: AtomicBool,
    fetch_calls: AtomicUsize,
    update_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl ScriptedCart {
    fn new(lines: Vec<CartLine>) -> Arc<Self> {
        Arc::new(Self {
            server_lines: Mutex::new(lines),
            fail_update: AtomicBool::new(false),
            fetch_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CartBackend for ScriptedCart {
    async fn fetch_lines(&self, _user: UserId) -> Result<Vec<CartLine>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.server_lines.lock().expect("lock").clone())
    }

    async fn add_line(&self, _user: UserId, _product: ProductId, _quantity: u32) -> Result<()> {
        Ok(())
    }

    async fn set_line_quantity(&self, line: CartLineId, quantity: u32) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(ApiError::Api("sản phẩm đã hết hàng".to_string()));
        }
        let mut lines = self.server_lines.lock().expect("lock");
        if let Some(l) = lines.iter_mut().find(|l| l.id == line) {
            l.quantity = quantity;
        }
        Ok(())
    }

    async fn remove_line(&self, line: CartLineId) -> Result<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.server_lines.lock().expect("lock").retain(|l| l.id != line);
        Ok(())
    }

    async fn clear(&self, _user: UserId) -> Result<()> {
        self.server_lines.lock().expect("lock").clear();
        Ok(())
    }

    async fn count(&self, _user: UserId) -> Result<u32> {
        Ok(self
            .server_lines
            .lock()
            .expect("lock")
            .iter()
            .map(|l| l.quantity)
            .sum())
    }
}

#[tokio::test(start_paused = true)]
async fn quantity_change_echoes_before_network_settles() {
    let backend = ScriptedCart::new(server_cart());
    let (notices, _rx) = notify::channel();
    let cart = CartStore::new(Arc::clone(&backend) as Arc<dyn CartBackend>, session(), notices, 99);

    cart.refresh().await;
    assert_eq!(cart.total(), Decimal::from(250_000));
    assert_eq!(*cart.badge().borrow(), 3);

    cart.set_quantity(CartLineId::new(1), 5).expect("valid quantity");

    // Local state reflects the patch synchronously.
    assert_eq!(cart.total(), Decimal::from(550_000));
    assert_eq!(*cart.badge().borrow(), 6);

    settle_background(|| backend.update_calls.load(Ordering::SeqCst) == 1).await;
    assert_eq!(cart.total(), Decimal::from(550_000));
    // No reload happened on success.
    assert_eq!(backend.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_quantity_change_reloads_server_state() {
    init_tracing();
    let backend = ScriptedCart::new(server_cart());
    let (notices, mut rx) = notify::channel();
    let cart = CartStore::new(Arc::clone(&backend) as Arc<dyn CartBackend>, session(), notices, 99);

    cart.refresh().await;
    backend.fail_update.store(true, Ordering::SeqCst);

    cart.set_quantity(CartLineId::new(1), 5).expect("valid quantity");
    assert_eq!(cart.total(), Decimal::from(550_000));

    // The write fails; the store resynchronizes from the server instead
    // of patching the old value back.
    settle_background(|| cart.total() == Decimal::from(250_000)).await;
    assert_eq!(cart.total(), Decimal::from(250_000));
    assert_eq!(*cart.badge().borrow(), 3);
    assert_eq!(backend.fetch_calls.load(Ordering::SeqCst), 2);
    assert!(drain(&mut rx).contains(&NoticeLevel::Error));
}

#[tokio::test(start_paused = true)]
async fn quantity_validation_never_touches_state() {
    let backend = ScriptedCart::new(server_cart());
    let cart = CartStore::new(
        Arc::clone(&backend) as Arc<dyn CartBackend>,
        session(),
        NoticeSender::sink(),
        99,
    );
    cart.refresh().await;

    let err = cart.set_quantity(CartLineId::new(1), 0).expect_err("zero");
    assert!(matches!(err, ApiError::QuantityOutOfRange { .. }));
    let err = cart.set_quantity(CartLineId::new(1), 100).expect_err("over max");
    assert!(matches!(err, ApiError::QuantityOutOfRange { max: 99, .. }));

    assert_eq!(cart.total(), Decimal::from(250_000));
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(backend.update_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn removing_a_missing_line_is_a_no_op() {
    let backend = ScriptedCart::new(server_cart());
    let cart = CartStore::new(
        Arc::clone(&backend) as Arc<dyn CartBackend>,
        session(),
        NoticeSender::sink(),
        99,
    );
    cart.refresh().await;

    cart.remove_line(CartLineId::new(2)).expect("first removal");
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(*cart.badge().borrow(), 2);

    // Second click on an already-removed row: no error, no request.
    cart.remove_line(CartLineId::new(2)).expect("second removal");
    settle_background(|| backend.remove_calls.load(Ordering::SeqCst) == 1).await;
    assert_eq!(backend.remove_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn anonymous_cart_writes_are_rejected() {
    let backend = ScriptedCart::new(server_cart());
    let cart = CartStore::new(
        Arc::clone(&backend) as Arc<dyn CartBackend>,
        Session::anonymous(),
        NoticeSender::sink(),
        99,
    );

    cart.refresh().await;
    assert_eq!(cart.lines().len(), 0);
    assert!(matches!(
        cart.set_quantity(CartLineId::new(1), 2),
        Err(ApiError::Unauthenticated)
    ));
}

// === Checkout ===

struct ScriptedOrders {
    drafts: Mutex<Vec<OrderDraft>>,
    approve_url: Option<&'static str>,
}

#[async_trait]
impl OrderBackend for ScriptedOrders {
    async fn place(&self, draft: &OrderDraft) -> Result<PlacedOrder> {
        self.drafts.lock().expect("lock").push(draft.clone());
        Ok(PlacedOrder {
            order_id: Some(OrderId::new(31)),
            approve_url: self
                .approve_url
                .map(|url| url::Url::parse(url).expect("test url")),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn cod_checkout_clears_the_cart() {
    let cart_backend = ScriptedCart::new(server_cart());
    let orders = Arc::new(ScriptedOrders {
        drafts: Mutex::new(Vec::new()),
        approve_url: None,
    });
    let (notices, mut rx) = notify::channel();
    let session = session();
    let cart = CartStore::new(
        Arc::clone(&cart_backend) as Arc<dyn CartBackend>,
        session.clone(),
        notices.clone(),
        99,
    );
    cart.refresh().await;

    let checkout = Checkout::new(Arc::clone(&orders) as Arc<dyn OrderBackend>, session, notices);
    let outcome = checkout
        .place(&cart, &shipping(), PaymentMethod::Cod, Some("giao giờ hành chính".to_string()))
        .await
        .expect("checkout");

    assert!(matches!(
        outcome,
        CheckoutOutcome::Completed { order_id: Some(id) } if id == OrderId::new(31)
    ));
    assert!(cart.lines().is_empty());
    assert_eq!(*cart.badge().borrow(), 0);
    assert!(drain(&mut rx).contains(&NoticeLevel::Success));

    let drafts = orders.drafts.lock().expect("lock");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].total_price, Decimal::from(250_000));
    assert_eq!(drafts[0].items.len(), 2);
    assert_eq!(drafts[0].note, "giao giờ hành chính");
}

#[tokio::test(start_paused = true)]
async fn paypal_checkout_leaves_the_cart_intact() {
    let cart_backend = ScriptedCart::new(server_cart());
    let orders = Arc::new(ScriptedOrders {
        drafts: Mutex::new(Vec::new()),
        approve_url: Some("https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T"),
    });
    let session = session();
    let cart = CartStore::new(
        Arc::clone(&cart_backend) as Arc<dyn CartBackend>,
        session.clone(),
        NoticeSender::sink(),
        99,
    );
    cart.refresh().await;

    let checkout = Checkout::new(
        Arc::clone(&orders) as Arc<dyn OrderBackend>,
        session,
        NoticeSender::sink(),
    );
    let outcome = checkout
        .place(&cart, &shipping(), PaymentMethod::Paypal, None)
        .await
        .expect("checkout");

    match outcome {
        CheckoutOutcome::RedirectToApproval { url } => {
            assert_eq!(url.host_str(), Some("www.sandbox.paypal.com"));
        }
        other => panic!("expected redirect, got {other:?}"),
    }
    // Nothing final yet: the cart survives until the payment is approved.
    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.total(), Decimal::from(250_000));
}

#[tokio::test(start_paused = true)]
async fn empty_cart_checkout_is_rejected() {
    let cart_backend = ScriptedCart::new(Vec::new());
    let orders = Arc::new(ScriptedOrders {
        drafts: Mutex::new(Vec::new()),
        approve_url: None,
    });
    let session = session();
    let cart = CartStore::new(
        Arc::clone(&cart_backend) as Arc<dyn CartBackend>,
        session.clone(),
        NoticeSender::sink(),
        99,
    );
    cart.refresh().await;

    let checkout = Checkout::new(
        Arc::clone(&orders) as Arc<dyn OrderBackend>,
        session,
        NoticeSender::sink(),
    );
    let err = checkout
        .place(&cart, &shipping(), PaymentMethod::Cod, None)
        .await
        .expect_err("empty cart");
    assert!(matches!(err, ApiError::EmptyCart));
    assert!(orders.drafts.lock().expect("lock").is_empty());
}
