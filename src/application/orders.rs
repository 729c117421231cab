use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::page::{clamp_params, Page};
use crate::domain::ports::OrderApi;
use crate::errors::OrderError;

/// Decision returned to the caller so the UI can tell "request sent" apart
/// from "nothing to do" without inspecting the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// A status update was sent and the list reloaded.
    Applied(OrderStatus),
    /// The order is terminal (or the confirmation was declined); no
    /// request was issued.
    NotSent,
}

/// Admin order lifecycle: forward transitions and cancellation.
///
/// Status changes are administratively consequential, so nothing here is
/// optimistic: the visible list changes only through a successful reload
/// after the server accepts the transition.
pub struct OrderWorkflow<G> {
    gateway: Arc<G>,
    orders: Mutex<Page<Order>>,
}

fn lock(orders: &Mutex<Page<Order>>) -> std::sync::MutexGuard<'_, Page<Order>> {
    orders.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<G: OrderApi> OrderWorkflow<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        OrderWorkflow {
            gateway,
            orders: Mutex::new(Page::empty()),
        }
    }

    pub fn orders(&self) -> Page<Order> {
        lock(&self.orders).clone()
    }

    pub async fn load(&self, page: i64, limit: i64) -> Result<(), OrderError> {
        let (page, limit) = clamp_params(page, limit);
        let fetched = self.gateway.list_orders(page, limit).await?;
        *lock(&self.orders) = fetched;
        Ok(())
    }

    pub async fn order_detail(&self, order_id: Uuid) -> Result<Order, OrderError> {
        Ok(self.gateway.fetch_order(order_id).await?)
    }

    /// Move an order one step along pending → confirmed → shipped →
    /// delivered. Terminal orders issue no request at all.
    pub async fn advance(&self, order_id: Uuid) -> Result<TransitionOutcome, OrderError> {
        let status = self.status_of(order_id)?;
        let Some(next) = status.next() else {
            log::debug!("Order {order_id} is terminal ({status:?}); not advancing");
            return Ok(TransitionOutcome::NotSent);
        };

        self.gateway.update_order_status(order_id, next).await?;
        self.reload().await?;
        Ok(TransitionOutcome::Applied(next))
    }

    /// Cancel a non-terminal order. `confirmed` is the outcome of the
    /// explicit user confirmation dialog; without it no request is sent.
    pub async fn cancel(
        &self,
        order_id: Uuid,
        confirmed: bool,
    ) -> Result<TransitionOutcome, OrderError> {
        if !confirmed {
            return Ok(TransitionOutcome::NotSent);
        }
        let status = self.status_of(order_id)?;
        if status.is_terminal() {
            log::debug!("Order {order_id} is terminal ({status:?}); not cancelling");
            return Ok(TransitionOutcome::NotSent);
        }

        self.gateway
            .update_order_status(order_id, OrderStatus::Cancelled)
            .await?;
        self.reload().await?;
        Ok(TransitionOutcome::Applied(OrderStatus::Cancelled))
    }

    fn status_of(&self, order_id: Uuid) -> Result<OrderStatus, OrderError> {
        lock(&self.orders)
            .items
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.status)
            .ok_or(OrderError::NotFound(order_id))
    }

    /// Refetch the page currently on screen.
    async fn reload(&self) -> Result<(), OrderError> {
        let (page, limit) = {
            let current = lock(&self.orders);
            (current.page, current.limit)
        };
        self.load(page, limit).await
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::errors::ApiError;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-0042".to_string(),
            status,
            items: Vec::new(),
            total_amount: BigDecimal::from_str("59.90").expect("valid decimal"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            customer: None,
        }
    }

    struct FakeOrderApi {
        served: StdMutex<Vec<Order>>,
        status_updates: StdMutex<Vec<(Uuid, OrderStatus)>>,
        list_calls: StdMutex<u32>,
        fail_update_with: Option<String>,
    }

    impl FakeOrderApi {
        fn serving(orders: Vec<Order>) -> Self {
            FakeOrderApi {
                served: StdMutex::new(orders),
                status_updates: StdMutex::new(Vec::new()),
                list_calls: StdMutex::new(0),
                fail_update_with: None,
            }
        }

        fn updates(&self) -> Vec<(Uuid, OrderStatus)> {
            self.status_updates.lock().expect("lock").clone()
        }

        fn list_calls(&self) -> u32 {
            *self.list_calls.lock().expect("lock")
        }
    }

    #[async_trait]
    impl OrderApi for FakeOrderApi {
        async fn list_orders(&self, page: i64, limit: i64) -> Result<Page<Order>, ApiError> {
            *self.list_calls.lock().expect("lock") += 1;
            let items = self.served.lock().expect("lock").clone();
            let total = items.len() as i64;
            Ok(Page {
                items,
                total,
                page,
                limit,
            })
        }

        async fn fetch_order(&self, order_id: Uuid) -> Result<Order, ApiError> {
            self.served
                .lock()
                .expect("lock")
                .iter()
                .find(|o| o.id == order_id)
                .cloned()
                .ok_or_else(|| ApiError::Server("Order not found".to_string()))
        }

        async fn update_order_status(
            &self,
            order_id: Uuid,
            status: OrderStatus,
        ) -> Result<(), ApiError> {
            if let Some(msg) = &self.fail_update_with {
                return Err(ApiError::Server(msg.clone()));
            }
            self.status_updates
                .lock()
                .expect("lock")
                .push((order_id, status));
            if let Some(order) = self
                .served
                .lock()
                .expect("lock")
                .iter_mut()
                .find(|o| o.id == order_id)
            {
                order.status = status;
            }
            Ok(())
        }
    }

    async fn loaded_workflow(api: FakeOrderApi) -> (Arc<FakeOrderApi>, OrderWorkflow<FakeOrderApi>) {
        let api = Arc::new(api);
        let workflow = OrderWorkflow::new(Arc::clone(&api));
        workflow.load(1, 20).await.expect("initial load");
        (api, workflow)
    }

    #[tokio::test]
    async fn advance_on_shipped_requests_delivered() {
        let shipped = order(OrderStatus::Shipped);
        let id = shipped.id;
        let (api, workflow) = loaded_workflow(FakeOrderApi::serving(vec![shipped])).await;

        let outcome = workflow.advance(id).await.expect("advance");

        assert_eq!(outcome, TransitionOutcome::Applied(OrderStatus::Delivered));
        assert_eq!(api.updates(), vec![(id, OrderStatus::Delivered)]);
        // Initial load plus the post-transition reload.
        assert_eq!(api.list_calls(), 2);
        assert_eq!(workflow.orders().items[0].status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn advance_on_terminal_issues_no_request() {
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            let terminal = order(status);
            let id = terminal.id;
            let (api, workflow) = loaded_workflow(FakeOrderApi::serving(vec![terminal])).await;

            let outcome = workflow.advance(id).await.expect("advance");

            assert_eq!(outcome, TransitionOutcome::NotSent);
            assert!(api.updates().is_empty());
            assert_eq!(api.list_calls(), 1);
        }
    }

    #[tokio::test]
    async fn confirmed_cancel_sends_cancelled_then_reloads() {
        let pending = order(OrderStatus::Pending);
        let id = pending.id;
        let (api, workflow) = loaded_workflow(FakeOrderApi::serving(vec![pending])).await;

        let outcome = workflow.cancel(id, true).await.expect("cancel");

        assert_eq!(outcome, TransitionOutcome::Applied(OrderStatus::Cancelled));
        assert_eq!(api.updates(), vec![(id, OrderStatus::Cancelled)]);
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn declined_confirmation_sends_nothing() {
        let pending = order(OrderStatus::Pending);
        let id = pending.id;
        let (api, workflow) = loaded_workflow(FakeOrderApi::serving(vec![pending])).await;

        let outcome = workflow.cancel(id, false).await.expect("cancel");

        assert_eq!(outcome, TransitionOutcome::NotSent);
        assert!(api.updates().is_empty());
    }

    #[tokio::test]
    async fn failed_transition_leaves_list_unchanged() {
        let pending = order(OrderStatus::Pending);
        let id = pending.id;
        let mut api = FakeOrderApi::serving(vec![pending]);
        api.fail_update_with = Some("Order already processed".to_string());
        let (api, workflow) = loaded_workflow(api).await;

        let err = workflow.advance(id).await.expect_err("should fail");

        assert_eq!(err.to_string(), "Order already processed");
        assert_eq!(workflow.orders().items[0].status, OrderStatus::Pending);
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn unknown_order_is_reported_as_not_found() {
        let (_api, workflow) = loaded_workflow(FakeOrderApi::serving(vec![])).await;

        let missing = Uuid::new_v4();
        let err = workflow.advance(missing).await.expect_err("should fail");
        assert!(matches!(err, OrderError::NotFound(id) if id == missing));
    }
}
