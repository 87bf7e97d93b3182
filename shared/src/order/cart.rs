//! Cart aggregate
//!
//! A cart holds dishes from exactly one restaurant. The binding is part of
//! the variant, so an empty cart has no restaurant and a non-empty one
//! always has one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::payment::PaymentMethod;
use crate::error::{AppError, ErrorCode};
use crate::models::Dish;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart is bound to restaurant {bound}, dish belongs to restaurant {requested}")]
    RestaurantConflict { bound: i64, requested: i64 },

    #[error("cart is empty")]
    Empty,

    #[error("no payment method chosen")]
    PaymentMethodMissing,

    #[error("dish {0} is not in the cart")]
    ItemNotInCart(i64),
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        let code = match err {
            CartError::RestaurantConflict { .. } => ErrorCode::CartRestaurantConflict,
            CartError::Empty => ErrorCode::OrderEmpty,
            CartError::PaymentMethodMissing => ErrorCode::PaymentMethodRequired,
            CartError::ItemNotInCart(_) => ErrorCode::NotFound,
        };
        AppError::with_message(code, err.to_string())
    }
}

/// One cart line; the unit price is the price seen when the dish was added
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub dish_id: i64,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
    #[serde(default)]
    pub note: String,
}

impl CartItem {
    pub fn line_total(&self) -> i64 {
        self.unit_price * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Cart {
    #[default]
    Empty,
    ForRestaurant {
        restaurant_id: i64,
        items: Vec<CartItem>,
    },
}

/// One line of an order-creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub dish_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Order-creation request produced by [`Cart::checkout`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub restaurant_id: i64,
    pub customer_id: i64,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::Empty
    }

    pub fn restaurant_id(&self) -> Option<i64> {
        match self {
            Cart::Empty => None,
            Cart::ForRestaurant { restaurant_id, .. } => Some(*restaurant_id),
        }
    }

    pub fn items(&self) -> &[CartItem] {
        match self {
            Cart::Empty => &[],
            Cart::ForRestaurant { items, .. } => items,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cart::Empty)
    }

    /// Add one unit of `dish`
    ///
    /// A dish from another restaurant leaves the cart untouched; the caller
    /// has to [`clear`](Cart::clear) first to switch restaurants.
    pub fn add_item(&mut self, dish: &Dish) -> Result<(), CartError> {
        match self {
            Cart::Empty => {
                *self = Cart::ForRestaurant {
                    restaurant_id: dish.restaurant_id,
                    items: vec![CartItem {
                        dish_id: dish.id,
                        name: dish.name.clone(),
                        unit_price: dish.price,
                        quantity: 1,
                        note: String::new(),
                    }],
                };
                Ok(())
            }
            Cart::ForRestaurant {
                restaurant_id,
                items,
            } => {
                if *restaurant_id != dish.restaurant_id {
                    return Err(CartError::RestaurantConflict {
                        bound: *restaurant_id,
                        requested: dish.restaurant_id,
                    });
                }
                match items.iter_mut().find(|i| i.dish_id == dish.id) {
                    Some(existing) => existing.quantity += 1,
                    None => items.push(CartItem {
                        dish_id: dish.id,
                        name: dish.name.clone(),
                        unit_price: dish.price,
                        quantity: 1,
                        note: String::new(),
                    }),
                }
                Ok(())
            }
        }
    }

    /// Set the quantity of a line; zero or less removes it
    pub fn set_quantity(&mut self, dish_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(dish_id);
            return;
        }
        if let Cart::ForRestaurant { items, .. } = self {
            if let Some(item) = items.iter_mut().find(|i| i.dish_id == dish_id) {
                item.quantity = quantity;
            }
        }
    }

    pub fn set_note(&mut self, dish_id: i64, note: impl Into<String>) -> Result<(), CartError> {
        let item = match self {
            Cart::ForRestaurant { items, .. } => items.iter_mut().find(|i| i.dish_id == dish_id),
            Cart::Empty => None,
        };
        match item {
            Some(item) => {
                item.note = note.into();
                Ok(())
            }
            None => Err(CartError::ItemNotInCart(dish_id)),
        }
    }

    /// Remove a line; removing the last one unbinds the cart
    pub fn remove_item(&mut self, dish_id: i64) {
        if let Cart::ForRestaurant { items, .. } = self {
            items.retain(|i| i.dish_id != dish_id);
            if items.is_empty() {
                *self = Cart::Empty;
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Cart::Empty;
    }

    /// Sum of unit price times quantity, in minor units
    pub fn total(&self) -> i64 {
        self.items().iter().map(CartItem::line_total).sum()
    }

    /// Build the order-creation request; the cart itself is left as is so
    /// the caller can clear it once the order is accepted.
    pub fn checkout(
        &self,
        customer_id: i64,
        payment_method: Option<PaymentMethod>,
    ) -> Result<CreateOrderRequest, CartError> {
        let Cart::ForRestaurant {
            restaurant_id,
            items,
        } = self
        else {
            return Err(CartError::Empty);
        };
        let payment_method = payment_method.ok_or(CartError::PaymentMethodMissing)?;

        Ok(CreateOrderRequest {
            restaurant_id: *restaurant_id,
            customer_id,
            payment_method,
            items: items
                .iter()
                .map(|i| OrderLine {
                    dish_id: i.dish_id,
                    quantity: i.quantity,
                    note: (!i.note.is_empty()).then(|| i.note.clone()),
                })
                .collect(),
        })
    }
}
