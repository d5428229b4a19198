//! HTTP handlers for orders, payment verification and the live order stream

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use uuid::Uuid;

use shared::models::{
    Action, Module, Order, OrderQuery, PaymentDecisionInput, UpdateOrderStatusInput,
    UpdatePaymentStatusInput,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::OrderService;
use crate::AppState;

fn service(state: &AppState) -> OrderService {
    OrderService::new(&state.stores, &state.config.payments)
}

pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    current_user.0.require(Module::Orders, Action::View)?;
    Ok(Json(service(&state).list_orders(&query).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    current_user.0.require(Module::Orders, Action::View)?;
    Ok(Json(service(&state).get_order(order_id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderStatusInput>,
) -> AppResult<Json<Order>> {
    current_user.0.require(Module::Orders, Action::Edit)?;
    Ok(Json(service(&state).update_status(order_id, input.status).await?))
}

pub async fn update_payment_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdatePaymentStatusInput>,
) -> AppResult<Json<Order>> {
    current_user.0.require(Module::Orders, Action::Edit)?;
    Ok(Json(
        service(&state)
            .update_payment_status(order_id, input.payment_status)
            .await?,
    ))
}

/// Orders waiting in the manual payment verification view
pub async fn list_payment_verifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    current_user.0.require(Module::Payments, Action::View)?;
    Ok(Json(service(&state).pending_verifications().await?))
}

pub async fn verify_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<PaymentDecisionInput>,
) -> AppResult<Json<Order>> {
    current_user.0.require(Module::Payments, Action::Edit)?;
    Ok(Json(service(&state).verify_payment(order_id, input.decision).await?))
}

fn snapshot_event(snapshot: AppResult<Vec<Order>>) -> Event {
    let event = match snapshot {
        Ok(orders) => Event::default().event("orders").json_data(&orders),
        Err(e) => {
            tracing::warn!("Order snapshot failed: {}", e);
            Ok(Event::default().event("error").data(e.to_string()))
        }
    };
    event.unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

/// Server-sent events: the full order list on connect and after every
/// change
pub async fn order_stream(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    current_user.0.require(Module::Orders, Action::View)?;

    let feed = service(&state).feed();
    tracing::debug!("Order stream opened by {}", current_user.0.email);

    let events = stream::unfold(feed, |mut feed| async move {
        let snapshot = feed.next_snapshot().await?;
        Some((Ok(snapshot_event(snapshot)), feed))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
