use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use crate::domain::cart::{line_state, Cart, LineState};
use crate::domain::ports::CartApi;
use crate::errors::CartError;

/// Client-side cart state plus the bookkeeping that keeps optimistic
/// patches and authoritative reloads from stepping on each other.
#[derive(Debug)]
struct CartState {
    cart: Cart,
    lines: HashMap<Uuid, LineState>,
    /// Bumped once per applied optimistic mutation.
    version: u64,
    /// Version stamp of the last reload that was actually applied.
    reconciled: u64,
}

impl CartState {
    fn new() -> Self {
        CartState {
            cart: Cart::empty(),
            lines: HashMap::new(),
            version: 0,
            reconciled: 0,
        }
    }
}

fn lock(state: &Mutex<CartState>) -> std::sync::MutexGuard<'_, CartState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cart mutations with optimistic local patching and delayed authoritative
/// reconciliation.
///
/// Every successful mutation patches the affected line immediately so the
/// UI stays responsive, then schedules a full refetch after
/// `reconcile_delay` to correct the aggregate totals (tax, shipping,
/// points) the client cannot compute. Each mutation carries a monotonic
/// version stamp; a reload is applied only when its stamp still matches
/// the current version and supersedes the last applied reload, so a stale
/// response can never clobber newer optimistic state.
pub struct CartWorkflow<G> {
    gateway: Arc<G>,
    state: Arc<Mutex<CartState>>,
    reconcile_delay: Duration,
}

impl<G: CartApi> CartWorkflow<G> {
    pub fn new(gateway: Arc<G>, reconcile_delay: Duration) -> Self {
        CartWorkflow {
            gateway,
            state: Arc::new(Mutex::new(CartState::new())),
            reconcile_delay,
        }
    }

    /// Snapshot of the cart as currently displayed.
    pub fn cart(&self) -> Cart {
        lock(&self.state).cart.clone()
    }

    pub fn line_state(&self, item_id: Uuid) -> LineState {
        line_state(&lock(&self.state).lines, item_id)
    }

    /// Authoritative fetch, e.g. on screen focus. Applies unconditionally
    /// and marks every outstanding reload stamp as settled.
    pub async fn refresh(&self) -> Result<(), CartError> {
        let cart = self.gateway.fetch_cart().await?;
        let mut st = lock(&self.state);
        st.cart = cart;
        st.reconciled = st.version;
        Ok(())
    }

    /// Update one line's quantity. A quantity below 1 is a removal. The
    /// local line is patched (`quantity`, `line_total`) only after the
    /// server confirms, then a reconciling reload is scheduled; on failure
    /// the cart is untouched and the line is tagged `Failed`.
    pub async fn set_quantity(&self, item_id: Uuid, quantity: i32) -> Result<(), CartError> {
        if quantity < 1 {
            return self.remove(item_id).await;
        }
        self.begin_line(item_id)?;

        match self.gateway.update_cart_item(item_id, quantity).await {
            Ok(()) => {
                let stamp = {
                    let mut st = lock(&self.state);
                    st.cart.patch_quantity(item_id, quantity);
                    st.lines.insert(item_id, LineState::Idle);
                    st.version += 1;
                    st.version
                };
                log::debug!("Cart line {item_id} set to {quantity}, reload stamped {stamp}");
                self.schedule_reconcile(stamp);
                Ok(())
            }
            Err(e) => {
                lock(&self.state).lines.insert(item_id, LineState::Failed);
                Err(e.into())
            }
        }
    }

    /// Remove one line, with the same in-flight/optimistic/reload pattern.
    pub async fn remove(&self, item_id: Uuid) -> Result<(), CartError> {
        self.begin_line(item_id)?;

        match self.gateway.remove_cart_item(item_id).await {
            Ok(()) => {
                let stamp = {
                    let mut st = lock(&self.state);
                    st.cart.remove_line(item_id);
                    st.lines.remove(&item_id);
                    st.version += 1;
                    st.version
                };
                log::debug!("Cart line {item_id} removed, reload stamped {stamp}");
                self.schedule_reconcile(stamp);
                Ok(())
            }
            Err(e) => {
                lock(&self.state).lines.insert(item_id, LineState::Failed);
                Err(e.into())
            }
        }
    }

    /// Empty the cart. The resulting aggregate is fully known, so no
    /// reload is scheduled.
    pub async fn clear(&self) -> Result<(), CartError> {
        self.gateway.clear_cart().await?;
        let mut st = lock(&self.state);
        st.cart = Cart::empty();
        st.lines.clear();
        st.version += 1;
        st.reconciled = st.version;
        Ok(())
    }

    /// Tag the line `Pending`, rejecting duplicates on the same line.
    fn begin_line(&self, item_id: Uuid) -> Result<(), CartError> {
        let mut st = lock(&self.state);
        if st.cart.line(item_id).is_none() {
            return Err(CartError::UnknownLine(item_id));
        }
        if line_state(&st.lines, item_id) == LineState::Pending {
            return Err(CartError::LineBusy(item_id));
        }
        st.lines.insert(item_id, LineState::Pending);
        Ok(())
    }

    fn schedule_reconcile(&self, stamp: u64) {
        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);
        let delay = self.reconcile_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match gateway.fetch_cart().await {
                Ok(cart) => {
                    apply_reconciled(&state, stamp, cart);
                }
                // The optimistic line patch stays; the next mutation or
                // refresh will reconcile.
                Err(e) => log::warn!("Cart reload (stamp {stamp}) failed: {e}"),
            }
        });
    }
}

/// Apply a reload response if and only if it is still current: its stamp
/// must equal the present version (no mutation happened since scheduling)
/// and be newer than the last applied reload.
fn apply_reconciled(state: &Mutex<CartState>, stamp: u64, cart: Cart) -> bool {
    let mut st = lock(state);
    if stamp == st.version && stamp > st.reconciled {
        st.cart = cart;
        st.reconciled = stamp;
        true
    } else {
        log::debug!(
            "Discarding stale cart reload: stamp {stamp}, version {}, reconciled {}",
            st.version,
            st.reconciled
        );
        false
    }
}
