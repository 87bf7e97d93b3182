//! Orders: checkout, restaurant-driven status changes and settlement
//!
//! Every write here is guarded at row level. Stock is decremented only while
//! it covers the quantity, a status change is a compare-and-set on the status
//! that was read, and settlement only touches rows with no payment method.

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    AccountKind, CustomerOrder, Order, OrderDetail, OrderItem, RestaurantOrder,
};
use shared::order::{
    CreateOrderRequest, DeliveryFeePolicy, OrderStatus, OrderTotals, PaymentMethod, StatusPolicy,
    Transition,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::restaurants;
use crate::auth::Identity;
use crate::error::ServiceResult;

const ORDER_COLUMNS: &str = "id, customer_id, restaurant_id, created_at, status, \
     requested_payment_method, payment_method, paid_at, subtotal, fee, total";

const ORDER_COLUMNS_O: &str = "o.id, o.customer_id, o.restaurant_id, o.created_at, o.status, \
     o.requested_payment_method, o.payment_method, o.paid_at, o.subtotal, o.fee, o.total";

#[derive(sqlx::FromRow)]
struct RestaurantOrderRow {
    #[sqlx(flatten)]
    order: Order,
    customer_name: String,
}

#[derive(sqlx::FromRow)]
struct CustomerOrderRow {
    #[sqlx(flatten)]
    order: Order,
    restaurant_name: String,
    reviewed: bool,
}

fn order_not_found() -> AppError {
    AppError::new(ErrorCode::OrderNotFound)
}

/// Eager checks on an order-creation request, before anything is written
pub fn validate_request(req: &CreateOrderRequest) -> Result<(), AppError> {
    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if let Some(line) = req.items.iter().find(|l| l.quantity < 1) {
        return Err(AppError::with_message(
            ErrorCode::OrderItemInvalidQuantity,
            format!("Quantity for dish {} must be at least 1", line.dish_id),
        ));
    }
    Ok(())
}

/// Take `quantity` units of a dish out of stock; returns its name and price
///
/// The decrement runs first so the transaction holds the write lock from its
/// first statement.
async fn take_stock(
    conn: &mut SqliteConnection,
    restaurant_id: i64,
    dish_id: i64,
    quantity: i64,
) -> ServiceResult<(String, i64)> {
    let taken: Option<(String, i64)> = sqlx::query_as(
        "UPDATE dishes SET stock = stock - ?1 \
         WHERE id = ?2 AND restaurant_id = ?3 AND stock >= ?1 \
         RETURNING name, price",
    )
    .bind(quantity)
    .bind(dish_id)
    .bind(restaurant_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(taken) = taken {
        return Ok(taken);
    }

    let owner: Option<i64> = sqlx::query_scalar("SELECT restaurant_id FROM dishes WHERE id = ?")
        .bind(dish_id)
        .fetch_optional(&mut *conn)
        .await?;
    let err = match owner {
        Some(owner) if owner == restaurant_id => AppError::with_message(
            ErrorCode::DishOutOfStock,
            format!("Not enough stock for dish {dish_id}"),
        ),
        _ => AppError::with_message(
            ErrorCode::DishNotInRestaurant,
            format!("Dish {dish_id} does not belong to restaurant {restaurant_id}"),
        ),
    };
    Err(err.into())
}

/// Turn a checkout request into a stored order
///
/// Unit prices are copied from the dishes at this moment. Any failing line
/// rolls back the order and every stock decrement made before it.
pub async fn create(
    pool: &SqlitePool,
    req: &CreateOrderRequest,
    fee_policy: &DeliveryFeePolicy,
) -> ServiceResult<OrderDetail> {
    validate_request(req)?;
    if !restaurants::exists(pool, req.restaurant_id).await? {
        return Err(AppError::new(ErrorCode::RestaurantNotFound).into());
    }

    let order_id = snowflake_id();
    let now = now_millis();

    let mut tx = pool.begin().await?;

    let mut items = Vec::with_capacity(req.items.len());
    let mut subtotal: i64 = 0;
    for line in &req.items {
        let (dish_name, unit_price) =
            take_stock(&mut tx, req.restaurant_id, line.dish_id, line.quantity).await?;
        subtotal = unit_price
            .checked_mul(line.quantity)
            .and_then(|amount| subtotal.checked_add(amount))
            .ok_or_else(|| AppError::new(ErrorCode::ValueOutOfRange))?;
        items.push(OrderItem {
            order_id,
            dish_id: line.dish_id,
            dish_name,
            quantity: line.quantity,
            note: line.note.clone().filter(|n| !n.trim().is_empty()),
            unit_price,
        });
    }

    let totals = OrderTotals::compute(subtotal, fee_policy)
        .ok_or_else(|| AppError::new(ErrorCode::ValueOutOfRange))?;
    let order = Order {
        id: order_id,
        customer_id: req.customer_id,
        restaurant_id: req.restaurant_id,
        created_at: now,
        status: OrderStatus::AwaitingAcceptance,
        requested_payment_method: req.payment_method,
        payment_method: None,
        paid_at: None,
        subtotal: totals.subtotal,
        fee: totals.fee,
        total: totals.total,
    };

    sqlx::query(
        "INSERT INTO orders (id, customer_id, restaurant_id, created_at, status, requested_payment_method, subtotal, fee, total) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(order.id)
    .bind(order.customer_id)
    .bind(order.restaurant_id)
    .bind(order.created_at)
    .bind(order.status)
    .bind(order.requested_payment_method)
    .bind(order.subtotal)
    .bind(order.fee)
    .bind(order.total)
    .execute(&mut *tx)
    .await?;

    for item in &items {
        sqlx::query(
            "INSERT INTO order_items (order_id, dish_id, quantity, note, unit_price) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(item.order_id)
        .bind(item.dish_id)
        .bind(item.quantity)
        .bind(item.note.as_deref())
        .bind(item.unit_price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        order_id,
        restaurant_id = order.restaurant_id,
        customer_id = order.customer_id,
        total = order.total,
        "Order created"
    );
    Ok(OrderDetail { order, items })
}

pub async fn find_by_id(pool: &SqlitePool, order_id: i64) -> ServiceResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"
    ))
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

/// Lines of one order, in insertion order
pub async fn items_for(pool: &SqlitePool, order_id: i64) -> ServiceResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT oi.order_id, oi.dish_id, d.name AS dish_name, oi.quantity, oi.note, oi.unit_price \
         FROM order_items oi JOIN dishes d ON d.id = oi.dish_id \
         WHERE oi.order_id = ? ORDER BY oi.rowid",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Lines of every order whose `owner_column` equals `owner_id`, grouped by order
async fn items_by_order(
    pool: &SqlitePool,
    owner_column: &str,
    owner_id: i64,
) -> ServiceResult<HashMap<i64, Vec<OrderItem>>> {
    let items = sqlx::query_as::<_, OrderItem>(&format!(
        "SELECT oi.order_id, oi.dish_id, d.name AS dish_name, oi.quantity, oi.note, oi.unit_price \
         FROM order_items oi \
         JOIN dishes d ON d.id = oi.dish_id \
         JOIN orders o ON o.id = oi.order_id \
         WHERE o.{owner_column} = ? ORDER BY oi.rowid"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }
    Ok(grouped)
}

/// Restaurant's orders with customer name and lines, newest first
pub async fn list_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> ServiceResult<Vec<RestaurantOrder>> {
    let rows = sqlx::query_as::<_, RestaurantOrderRow>(&format!(
        "SELECT {ORDER_COLUMNS_O}, c.name AS customer_name \
         FROM orders o JOIN customers c ON c.id = o.customer_id \
         WHERE o.restaurant_id = ? ORDER BY o.created_at DESC, o.id DESC"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;

    let mut items = items_by_order(pool, "restaurant_id", restaurant_id).await?;
    Ok(rows
        .into_iter()
        .map(|row| RestaurantOrder {
            items: items.remove(&row.order.id).unwrap_or_default(),
            order: row.order,
            customer_name: row.customer_name,
        })
        .collect())
}

/// Customer's orders with restaurant name, lines and whether a review exists
pub async fn list_for_customer(
    pool: &SqlitePool,
    customer_id: i64,
) -> ServiceResult<Vec<CustomerOrder>> {
    let rows = sqlx::query_as::<_, CustomerOrderRow>(&format!(
        "SELECT {ORDER_COLUMNS_O}, r.name AS restaurant_name, \
         EXISTS (SELECT 1 FROM reviews rv WHERE rv.order_id = o.id) AS reviewed \
         FROM orders o JOIN restaurants r ON r.id = o.restaurant_id \
         WHERE o.customer_id = ? ORDER BY o.created_at DESC, o.id DESC"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    let mut items = items_by_order(pool, "customer_id", customer_id).await?;
    Ok(rows
        .into_iter()
        .map(|row| CustomerOrder {
            items: items.remove(&row.order.id).unwrap_or_default(),
            order: row.order,
            restaurant_name: row.restaurant_name,
            reviewed: row.reviewed,
        })
        .collect())
}

/// Write `new` only if the order still has status `expected`
///
/// `None` means no row matched: the order is gone, belongs to another
/// restaurant, or its status moved since it was read.
pub async fn compare_and_set_status(
    pool: &SqlitePool,
    restaurant_id: i64,
    order_id: i64,
    expected: OrderStatus,
    new: OrderStatus,
) -> ServiceResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET status = ?1 \
         WHERE id = ?2 AND restaurant_id = ?3 AND status = ?4 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(new)
    .bind(order_id)
    .bind(restaurant_id)
    .bind(expected)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

/// Restaurant-driven status change under `policy`
pub async fn update_status(
    pool: &SqlitePool,
    policy: StatusPolicy,
    restaurant_id: i64,
    order_id: i64,
    new: OrderStatus,
) -> ServiceResult<Order> {
    let order = find_by_id(pool, order_id)
        .await?
        .filter(|o| o.restaurant_id == restaurant_id)
        .ok_or_else(order_not_found)?;

    if policy.check(order.status, new)? == Transition::Unchanged {
        return Ok(order);
    }

    let updated = compare_and_set_status(pool, restaurant_id, order_id, order.status, new)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderConcurrentUpdate))?;

    tracing::info!(
        order_id,
        restaurant_id,
        from = %order.status,
        to = %updated.status,
        "Order status updated"
    );
    Ok(updated)
}

fn visible_to(order: &Order, identity: &Identity) -> bool {
    match identity.kind {
        AccountKind::Customer => order.customer_id == identity.profile_id,
        AccountKind::Restaurant => order.restaurant_id == identity.profile_id,
    }
}

/// Settling twice with one method is a no-op; a second method is a conflict
fn already_settled(order: Order, method: PaymentMethod) -> ServiceResult<Order> {
    match order.payment_method {
        Some(paid) if paid == method => Ok(order),
        _ => Err(AppError::with_message(
            ErrorCode::OrderAlreadyPaid,
            format!("Order {} has already been paid", order.id),
        )
        .into()),
    }
}

/// Record the payment method and complete the order
///
/// Only the order's customer or restaurant may settle it; anyone else gets
/// not-found.
pub async fn settle_payment(
    pool: &SqlitePool,
    order_id: i64,
    method: PaymentMethod,
    identity: &Identity,
) -> ServiceResult<Order> {
    let order = find_by_id(pool, order_id)
        .await?
        .filter(|o| visible_to(o, identity))
        .ok_or_else(order_not_found)?;

    if order.payment_method.is_some() {
        return already_settled(order, method);
    }

    let settled = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET payment_method = ?1, paid_at = ?2, status = ?3 \
         WHERE id = ?4 AND payment_method IS NULL \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(method)
    .bind(now_millis())
    .bind(OrderStatus::Complete)
    .bind(order_id)
    .fetch_optional(pool)
    .await?;

    match settled {
        Some(order) => {
            tracing::info!(order_id, method = %method, "Order settled");
            Ok(order)
        }
        // Another request settled it first
        None => {
            let current = find_by_id(pool, order_id).await?.ok_or_else(order_not_found)?;
            already_settled(current, method)
        }
    }
}
