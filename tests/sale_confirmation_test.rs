mod common;

use common::TestApp;
use pos_api::{
    entities::{product, product::ProductType, sale, sale_item},
    errors::ServiceError,
    services::cart::Cart,
};
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, PaginatorTrait};
use uuid::Uuid;

fn cart_with(entries: &[(Uuid, u32)]) -> Cart {
    let mut cart = Cart::default();
    for (product_id, qty) in entries {
        for _ in 0..*qty {
            cart.add(*product_id);
        }
    }
    cart
}

async fn stock_of(app: &TestApp, product_id: Uuid) -> Option<i32> {
    product::Entity::find_by_id(product_id)
        .one(&*app.state.db)
        .await
        .expect("failed to fetch product")
        .expect("product row disappeared")
        .stock
}

#[tokio::test]
async fn confirm_sale_decrements_stock_and_persists_receipt() {
    let app = TestApp::new().await;
    let espresso = app
        .seed_product("Espresso", dec!(2.50), ProductType::Stock, Some(5))
        .await;

    let user_id = Uuid::new_v4();
    let cart = cart_with(&[(espresso.id, 5)]);

    let receipt = app
        .state
        .services
        .sales
        .confirm_sale(user_id, &cart)
        .await
        .expect("confirmation should succeed");

    assert_eq!(receipt.sale.user_id, user_id);
    assert_eq!(receipt.items.len(), 1);
    assert_eq!(receipt.items[0].quantity, 5);
    assert_eq!(receipt.items[0].unit_price, dec!(2.50));
    assert_eq!(receipt.items[0].line_total, dec!(12.50));
    assert_eq!(stock_of(&app, espresso.id).await, Some(0));
}

#[tokio::test]
async fn confirm_sale_rejects_oversell_and_changes_nothing() {
    let app = TestApp::new().await;
    let mug = app
        .seed_product("Mug", dec!(8.00), ProductType::Stock, Some(2))
        .await;

    let cart = cart_with(&[(mug.id, 3)]);
    let err = app
        .state
        .services
        .sales
        .confirm_sale(Uuid::new_v4(), &cart)
        .await
        .expect_err("oversell must fail");

    match err {
        ServiceError::InsufficientStock {
            product_id,
            requested,
            available,
        } => {
            assert_eq!(product_id, mug.id);
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("expected InsufficientStock, got {:?}", other),
    }

    assert_eq!(stock_of(&app, mug.id).await, Some(2));
    let sales = sale::Entity::find().count(&*app.state.db).await.unwrap();
    let items = sale_item::Entity::find()
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(sales, 0);
    assert_eq!(items, 0);
}

#[tokio::test]
async fn manual_products_bypass_stock_tracking() {
    let app = TestApp::new().await;
    let service_fee = app
        .seed_product("Service fee", dec!(10.00), ProductType::Manual, None)
        .await;

    let cart = cart_with(&[(service_fee.id, 4)]);
    let receipt = app
        .state
        .services
        .sales
        .confirm_sale(Uuid::new_v4(), &cart)
        .await
        .expect("manual products never run out");

    assert_eq!(receipt.items[0].quantity, 4);
    assert_eq!(stock_of(&app, service_fee.id).await, None);
}

#[tokio::test]
async fn one_short_line_rolls_back_the_whole_sale() {
    let app = TestApp::new().await;
    let plentiful = app
        .seed_product("Beans", dec!(6.00), ProductType::Stock, Some(50))
        .await;
    let scarce = app
        .seed_product("Grinder", dec!(45.00), ProductType::Stock, Some(1))
        .await;

    let cart = cart_with(&[(plentiful.id, 2), (scarce.id, 2)]);
    let err = app
        .state
        .services
        .sales
        .confirm_sale(Uuid::new_v4(), &cart)
        .await
        .expect_err("short line must fail the whole cart");
    assert!(matches!(err, ServiceError::InsufficientStock { .. }));

    // The plentiful line must not lose stock even if it was decremented
    // before the short line was hit.
    assert_eq!(stock_of(&app, plentiful.id).await, Some(50));
    assert_eq!(stock_of(&app, scarce.id).await, Some(1));
    let sales = sale::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(sales, 0);
}

#[tokio::test]
async fn receipt_keeps_price_snapshot_after_catalog_change() {
    let app = TestApp::new().await;
    let latte = app
        .seed_product("Latte", dec!(3.20), ProductType::Stock, Some(10))
        .await;

    let cart = cart_with(&[(latte.id, 2)]);
    let receipt = app
        .state
        .services
        .sales
        .confirm_sale(Uuid::new_v4(), &cart)
        .await
        .unwrap();

    let mut update: product::ActiveModel = product::Entity::find_by_id(latte.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap()
        .into();
    update.price = Set(dec!(9.99));
    update.update(&*app.state.db).await.unwrap();

    let reloaded = app
        .state
        .services
        .sales
        .get_receipt(receipt.sale.id)
        .await
        .unwrap();
    assert_eq!(reloaded.items[0].unit_price, dec!(3.20));
    assert_eq!(reloaded.items[0].line_total, dec!(6.40));
}

#[tokio::test]
async fn persisted_totals_use_half_even_rounding() {
    let app = TestApp::new().await;
    let product = app
        .seed_product("Filter kit", dec!(23.50), ProductType::Stock, Some(3))
        .await;

    let cart = cart_with(&[(product.id, 1)]);
    let receipt = app
        .state
        .services
        .sales
        .confirm_sale(Uuid::new_v4(), &cart)
        .await
        .unwrap();

    // 23.50 * 0.19 = 4.465 rounds half-even to 4.46.
    assert_eq!(receipt.sale.subtotal, dec!(23.50));
    assert_eq!(receipt.sale.tax, dec!(4.46));
    assert_eq!(receipt.sale.total, dec!(27.96));
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let app = TestApp::new().await;

    let err = app
        .state
        .services
        .sales
        .confirm_sale(Uuid::new_v4(), &Cart::default())
        .await
        .expect_err("empty cart must be rejected");

    assert!(matches!(err, ServiceError::InvalidOperation(_)));
}

#[tokio::test]
async fn unknown_product_in_cart_fails_confirmation() {
    let app = TestApp::new().await;
    let ghost = Uuid::new_v4();

    let cart = cart_with(&[(ghost, 1)]);
    let err = app
        .state
        .services
        .sales
        .confirm_sale(Uuid::new_v4(), &cart)
        .await
        .expect_err("unknown product must fail");

    match err {
        ServiceError::ProductNotFound(id) => assert_eq!(id, ghost),
        other => panic!("expected ProductNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn unknown_sale_id_is_not_found() {
    let app = TestApp::new().await;

    let err = app
        .state
        .services
        .sales
        .get_receipt(Uuid::new_v4())
        .await
        .expect_err("unknown sale must be a NotFound");

    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn racing_confirmations_never_oversell() {
    let app = TestApp::new().await;
    let product = app
        .seed_product("Limited run", dec!(30.00), ProductType::Stock, Some(3))
        .await;

    let cart_a = cart_with(&[(product.id, 2)]);
    let cart_b = cart_with(&[(product.id, 2)]);
    let sales_service = app.state.services.sales.clone();

    let (a, b) = tokio::join!(
        sales_service.confirm_sale(Uuid::new_v4(), &cart_a),
        sales_service.confirm_sale(Uuid::new_v4(), &cart_b),
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one confirmation may win");

    let loser = if a.is_err() { a } else { b };
    assert!(matches!(
        loser.unwrap_err(),
        ServiceError::InsufficientStock { .. }
    ));

    assert_eq!(stock_of(&app, product.id).await, Some(1));
    let sales = sale::Entity::find().count(&*app.state.db).await.unwrap();
    assert_eq!(sales, 1);
}
