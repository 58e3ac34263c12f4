//! Catalog seeding for local development.
//!
//! Inserts a couple of categories, products with stock and images, and a
//! welcome coupon. Idempotent: existing slugs and codes are skipped.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

/// Errors seeding the catalog.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

struct SeedProduct {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    price: Decimal,
    category: &'static str,
    stock: i32,
    image: &'static str,
}

fn sample_products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Ceramic Pour-Over Set",
            slug: "ceramic-pour-over-set",
            description: "Hand-glazed ceramic dripper with matching carafe.",
            price: Decimal::new(6400, 2),
            category: "kitchen",
            stock: 24,
            image: "https://cdn.goldenfig.shop/products/pour-over.jpg",
        },
        SeedProduct {
            name: "Walnut Serving Board",
            slug: "walnut-serving-board",
            description: "End-grain walnut board, food-safe oil finish.",
            price: Decimal::new(8900, 2),
            category: "kitchen",
            stock: 12,
            image: "https://cdn.goldenfig.shop/products/serving-board.jpg",
        },
        SeedProduct {
            name: "Linen Throw Blanket",
            slug: "linen-throw-blanket",
            description: "Stonewashed linen, 130x170cm.",
            price: Decimal::new(11800, 2),
            category: "home",
            stock: 30,
            image: "https://cdn.goldenfig.shop/products/throw-blanket.jpg",
        },
        SeedProduct {
            name: "Beeswax Taper Candles",
            slug: "beeswax-taper-candles",
            description: "Pair of hand-dipped tapers, 25cm.",
            price: Decimal::new(1600, 2),
            category: "home",
            stock: 80,
            image: "https://cdn.goldenfig.shop/products/tapers.jpg",
        },
    ]
}

/// Seed the catalog.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    let pool = PgPool::connect(&database_url).await?;

    for category in ["kitchen", "home"] {
        sqlx::query(
            r"
            INSERT INTO shop.categories (name, slug)
            VALUES (INITCAP($1), $1)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(category)
        .execute(&pool)
        .await?;
    }

    for product in sample_products() {
        let inserted: Option<(i32,)> = sqlx::query_as(
            r"
            INSERT INTO shop.products (name, slug, description, price, category_id)
            VALUES ($1, $2, $3, $4, (SELECT id FROM shop.categories WHERE slug = $5))
            ON CONFLICT (slug) DO NOTHING
            RETURNING id
            ",
        )
        .bind(product.name)
        .bind(product.slug)
        .bind(product.description)
        .bind(product.price)
        .bind(product.category)
        .fetch_optional(&pool)
        .await?;

        let Some((product_id,)) = inserted else {
            tracing::info!(slug = product.slug, "product already seeded, skipping");
            continue;
        };

        sqlx::query(
            r"
            INSERT INTO shop.inventory (product_id, quantity_on_hand)
            VALUES ($1, $2)
            ON CONFLICT (product_id) DO NOTHING
            ",
        )
        .bind(product_id)
        .bind(product.stock)
        .execute(&pool)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.product_images (product_id, url, alt_text, position)
            VALUES ($1, $2, $3, 0)
            ",
        )
        .bind(product_id)
        .bind(product.image)
        .bind(product.name)
        .execute(&pool)
        .await?;

        tracing::info!(slug = product.slug, "seeded product");
    }

    sqlx::query(
        r"
        INSERT INTO shop.coupons (code, kind, value, min_order_amount, usage_limit)
        VALUES ('WELCOME10', 'percentage', 10, 25.00, 500)
        ON CONFLICT (code) DO NOTHING
        ",
    )
    .execute(&pool)
    .await?;

    tracing::info!("Seed complete");
    Ok(())
}
