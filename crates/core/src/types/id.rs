//! Integer id newtypes, one per store table.
//!
//! Handlers and repositories pass these instead of bare `i32`s, so a cart
//! item id cannot silently stand in for a product id. On the wire and in
//! query binds they are plain integers.

macro_rules! store_id {
    ($($(#[$doc:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw row id.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw id, for query binds.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    )+};
}

store_id! {
    /// Shopper or admin account.
    UserId,
    /// Catalog product.
    ProductId,
    /// Catalog category.
    CategoryId,
    /// One line in a shopper's cart.
    CartItemId,
    /// Placed order.
    OrderId,
    /// One line item within an order.
    OrderItemId,
    /// Entry in a shopper's address book.
    AddressId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_and_unwraps_the_raw_id() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(ProductId::from(42), id);
    }

    #[test]
    fn test_displays_as_bare_integer() {
        assert_eq!(OrderId::new(7).to_string(), "7");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id: UserId = serde_json::from_str("5").unwrap();
        assert_eq!(id, UserId::new(5));
        assert_eq!(serde_json::to_string(&id).unwrap(), "5");
    }

    #[test]
    fn test_distinct_tables_are_distinct_types() {
        // Compile-time property; the assertion is just an anchor.
        fn takes_product(id: ProductId) -> i32 {
            id.as_i32()
        }
        assert_eq!(takes_product(ProductId::new(3)), 3);
    }
}
