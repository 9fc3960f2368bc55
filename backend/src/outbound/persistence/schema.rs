//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Customer, guest and staff accounts.
    accounts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name; guests use their phone number.
        username -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Varchar,
        /// Unique when present.
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        /// One of `guest`, `customer`, `admin`, `super_admin`.
        role -> Varchar,
        is_guest -> Bool,
        is_verified -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Customer orders.
    bookings (id) {
        id -> Uuid,
        /// Owning account.
        account_id -> Uuid,
        /// Unique `ORD-<millis>-<suffix>` reference.
        order_number -> Varchar,
        customer_name -> Varchar,
        customer_phone -> Varchar,
        customer_email -> Nullable<Varchar>,
        pickup_address -> Text,
        delivery_address -> Nullable<Text>,
        service_type -> Varchar,
        is_express -> Bool,
        preferred_pickup_date -> Nullable<Varchar>,
        preferred_pickup_time -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        /// `[{garmentType, quantity, pricePerItem}]`.
        items -> Jsonb,
        total_items -> Int4,
        estimated_price -> Nullable<Numeric>,
        final_price -> Nullable<Numeric>,
        status -> Varchar,
        payment_status -> Varchar,
        terms_accepted -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable invoices; several may exist per booking.
    invoices (id) {
        id -> Uuid,
        booking_id -> Uuid,
        /// `[{description, quantity, unitPrice}]`.
        items -> Jsonb,
        subtotal -> Numeric,
        tax -> Numeric,
        tax_rate -> Numeric,
        total -> Numeric,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Shop locations.
    branches (id) {
        id -> Uuid,
        name -> Varchar,
        address -> Text,
        phone -> Nullable<Varchar>,
        is_active -> Bool,
    }
}

diesel::joinable!(bookings -> accounts (account_id));
diesel::joinable!(invoices -> bookings (booking_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, bookings, invoices, branches);
