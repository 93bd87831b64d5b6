//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Registered marketplace users.
    users (id) {
        id -> Uuid,
        /// Unique login name (max 30 characters).
        username -> Varchar,
        /// Unique contact address (max 254 characters).
        email_address -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Varchar,
        /// Spendable balance; `CHECK (budget >= 0)`.
        budget -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Items listed on, or bought from, the market.
    items (id) {
        id -> Uuid,
        name -> Varchar,
        price -> Int4,
        /// Unique 12-character SKU.
        barcode -> Varchar,
        description -> Varchar,
        /// Owning user; `NULL` while the item is for sale.
        owner_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(items -> users (owner_id));
diesel::allow_tables_to_appear_in_same_query!(items, users);
