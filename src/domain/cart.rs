use std::collections::HashMap;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product data embedded in a cart line, enough to render the line and to
/// bound the quantity picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub product: ProductRef,
    pub unit_price: BigDecimal,
    /// Always >= 1; a quantity below 1 is expressed as removal instead.
    pub quantity: i32,
    /// `unit_price * quantity`. Server-computed on fetch, locally re-derived
    /// after an optimistic quantity patch.
    pub line_total: BigDecimal,
    pub points_used: Option<i64>,
}

/// The cart aggregate as last reported by the server.
///
/// Aggregate totals (tax, shipping, points interactions) are authoritative
/// server values; optimistic patches only touch the affected line and rely
/// on a follow-up reload to correct the aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    pub shipping_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub total_items: i64,
    pub total_points_used: i64,
}

impl Cart {
    /// The aggregate after a successful clear: fully known, no reload needed.
    pub fn empty() -> Self {
        Cart {
            items: Vec::new(),
            subtotal: BigDecimal::from(0),
            tax_amount: BigDecimal::from(0),
            shipping_amount: BigDecimal::from(0),
            total_amount: BigDecimal::from(0),
            total_items: 0,
            total_points_used: 0,
        }
    }

    pub fn line(&self, item_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Optimistically patch one line after a confirmed quantity update.
    /// Recomputes only `quantity` and `line_total`; aggregate totals are
    /// left for the reconciling reload. Returns false if the line is gone.
    pub fn patch_quantity(&mut self, item_id: Uuid, quantity: i32) -> bool {
        match self.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => {
                item.quantity = quantity;
                item.line_total = &item.unit_price * BigDecimal::from(quantity);
                true
            }
            None => false,
        }
    }

    /// Drop one line after a confirmed removal. Aggregates stay stale until
    /// the reload. Returns false if the line was already gone.
    pub fn remove_line(&mut self, item_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != before
    }
}

/// Per-line mutation state. Replaces a bare "in-flight id set" so a line
/// whose last mutation failed stays distinguishable from an idle one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    #[default]
    Idle,
    /// A mutation request is outstanding; duplicate submissions are rejected.
    Pending,
    /// The last mutation was rejected; the line keeps its pre-mutation data.
    Failed,
}

/// Lookup with `Idle` as the absent default.
pub fn line_state(states: &HashMap<Uuid, LineState>, item_id: Uuid) -> LineState {
    states.get(&item_id).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn item(price: &str, quantity: i32) -> CartItem {
        let unit_price = BigDecimal::from_str(price).expect("valid decimal");
        CartItem {
            id: Uuid::new_v4(),
            product: ProductRef {
                id: Uuid::new_v4(),
                name: "Salmon kibble 2kg".to_string(),
                price: unit_price.clone(),
                stock: 10,
                image_url: None,
            },
            line_total: &unit_price * BigDecimal::from(quantity),
            unit_price,
            quantity,
            points_used: None,
        }
    }

    fn cart_with(items: Vec<CartItem>) -> Cart {
        let total_items = items.iter().map(|i| i64::from(i.quantity)).sum();
        Cart {
            subtotal: items.iter().map(|i| i.line_total.clone()).sum(),
            total_amount: items.iter().map(|i| i.line_total.clone()).sum(),
            items,
            tax_amount: BigDecimal::from(0),
            shipping_amount: BigDecimal::from(0),
            total_items,
            total_points_used: 0,
        }
    }

    #[test]
    fn patch_quantity_recomputes_line_total_only() {
        let mut cart = cart_with(vec![item("10.00", 2)]);
        let id = cart.items[0].id;
        let old_subtotal = cart.subtotal.clone();

        assert!(cart.patch_quantity(id, 3));

        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(
            cart.items[0].line_total,
            BigDecimal::from_str("30.00").expect("valid decimal")
        );
        // Aggregates are corrected by the reload, not here.
        assert_eq!(cart.subtotal, old_subtotal);
    }

    #[test]
    fn patch_quantity_on_unknown_line_is_a_noop() {
        let mut cart = cart_with(vec![item("10.00", 2)]);
        assert!(!cart.patch_quantity(Uuid::new_v4(), 5));
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn remove_line_drops_exactly_one_line() {
        let mut cart = cart_with(vec![item("10.00", 2), item("4.50", 1)]);
        let id = cart.items[0].id;

        assert!(cart.remove_line(id));
        assert_eq!(cart.items.len(), 1);
        assert!(cart.line(id).is_none());
        assert!(!cart.remove_line(id));
    }

    #[test]
    fn empty_cart_has_zeroed_aggregates() {
        let cart = Cart::empty();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total_amount, BigDecimal::from(0));
        assert_eq!(cart.total_items, 0);
    }

    #[test]
    fn absent_line_state_defaults_to_idle() {
        let states = HashMap::new();
        assert_eq!(line_state(&states, Uuid::new_v4()), LineState::Idle);
    }
}
