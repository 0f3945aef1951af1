//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate this file with
//! `diesel print-schema` or update it by hand.

diesel::table! {
    /// Portal accounts with their password hash.
    users (id) {
        id -> Uuid,
        /// Lower-cased sign-in address, unique (`users_email_key`).
        email -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        /// One of `admin`, `employee`, `broker`, `customer`.
        role -> Varchar,
        portal_type -> Nullable<Varchar>,
        company_id -> Nullable<Uuid>,
        broker_id -> Nullable<Uuid>,
        phone -> Nullable<Varchar>,
        disabled -> Bool,
        /// PHC-formatted argon2 hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    companies (id) {
        id -> Uuid,
        name -> Varchar,
        street -> Nullable<Varchar>,
        postal_code -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        contact_email -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    brokers (id) {
        id -> Uuid,
        company_name -> Varchar,
        contact_name -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        /// Account created when the broker contact registered.
        user_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    brands (id) {
        id -> Uuid,
        name -> Varchar,
        logo_key -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    vehicles (id) {
        id -> Uuid,
        brand_id -> Uuid,
        model -> Varchar,
        variant -> Nullable<Varchar>,
        fuel_type -> Varchar,
        power_kw -> Nullable<Int4>,
        list_price_cents -> Int8,
        categories -> Array<Text>,
        /// Serialised `PriceMatrix` (camelCase JSON).
        price_matrix -> Jsonb,
        image_keys -> Array<Text>,
        description -> Nullable<Text>,
        available -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Uuid,
        vehicle_id -> Uuid,
        ordered_by -> Uuid,
        company_id -> Nullable<Uuid>,
        broker_id -> Nullable<Uuid>,
        duration_months -> Int4,
        annual_mileage_km -> Int4,
        monthly_rate_cents -> Int8,
        status -> Varchar,
        /// Array of `{status, at}` objects, oldest first.
        status_history -> Jsonb,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    tickets (id) {
        id -> Uuid,
        created_by -> Uuid,
        subject -> Varchar,
        description -> Text,
        status -> Varchar,
        priority -> Varchar,
        attachment_keys -> Array<Text>,
        /// Array of `{authorId, body, at}` objects.
        messages -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    faqs (id) {
        id -> Uuid,
        question -> Text,
        answer_html -> Text,
        category -> Nullable<Varchar>,
        position -> Int4,
        image_key -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    news_posts (id) {
        id -> Uuid,
        title -> Text,
        body_html -> Text,
        image_key -> Nullable<Text>,
        published -> Bool,
        published_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    employee_invites (id) {
        id -> Uuid,
        email -> Varchar,
        company_id -> Uuid,
        portal_type -> Varchar,
        invited_by -> Uuid,
        created_at -> Timestamptz,
        accepted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    customer_invites (id) {
        id -> Uuid,
        email -> Varchar,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        broker_id -> Uuid,
        invited_by -> Uuid,
        created_at -> Timestamptz,
        accepted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Invitation and password-reset links, keyed by the token's SHA-256.
    verifications (token_hash) {
        token_hash -> Varchar,
        email -> Varchar,
        kind -> Varchar,
        reference_id -> Uuid,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
        consumed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Single-row settings table (`id = 1`).
    portal_settings (id) {
        id -> Int4,
        support_email -> Nullable<Varchar>,
        invitation_ttl_hours -> Int4,
        password_reset_ttl_minutes -> Int4,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    users,
    companies,
    brokers,
    brands,
    vehicles,
    orders,
    tickets,
    faqs,
    news_posts,
    employee_invites,
    customer_invites,
    verifications,
    portal_settings,
);
