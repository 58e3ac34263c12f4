//! Domain models for the commerce library.

pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod wishlist;

pub use cart::{Cart, CartItem, CartTotals};
pub use coupon::{Coupon, NewCoupon, UpdateCoupon};
pub use order::{NewOrder, NewOrderItem, Order, OrderHistoryEntry, OrderItem};
pub use product::{
    NewProduct, Product, ProductFilter, ProductImage, ProductSummary, Review, UpdateProduct,
};
pub use wishlist::{Wishlist, WishlistItem};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use golden_fig_core::UserId;

/// The owner of a cart, wishlist, or order.
///
/// Anonymous shoppers are identified by a per-session token held in the
/// server-side session; registered shoppers by their user id. A cart or
/// wishlist belongs to exactly one of the two while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    /// A registered, logged-in shopper.
    User(UserId),
    /// An anonymous session, keyed by a session-scoped token.
    Guest(Uuid),
}

impl Owner {
    /// The user id, when the owner is a registered shopper.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Guest(_) => None,
        }
    }

    /// The session token, when the owner is anonymous.
    #[must_use]
    pub const fn session_token(&self) -> Option<Uuid> {
        match self {
            Self::User(_) => None,
            Self::Guest(token) => Some(*token),
        }
    }
}
