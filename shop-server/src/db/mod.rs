//! Database operations
//!
//! Flat modules of async query functions, one per aggregate. Every query is
//! tenant-scoped: the shop id appears in the predicate of each statement
//! that touches shop-owned rows. Multi-statement operations take place on a
//! transaction owned by the entry function.

pub mod orders;
pub mod products;
pub mod shops;
pub mod tags;
pub mod users;

/// Postgres unique constraint violation (SQLSTATE 23505).
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

/// Clamp pagination to sane values, defaulting to page 1 / 20 per page.
pub fn page_bounds(page: Option<u32>, page_size: Option<u32>) -> (i64, i64) {
    let page = i64::from(page.unwrap_or(1).max(1));
    let page_size = i64::from(page_size.unwrap_or(20).clamp(1, 100));
    let offset = (page - 1) * page_size;
    (page_size, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_defaults() {
        assert_eq!(page_bounds(None, None), (20, 0));
        assert_eq!(page_bounds(Some(1), Some(50)), (50, 0));
        assert_eq!(page_bounds(Some(3), Some(10)), (10, 20));
    }

    #[test]
    fn page_bounds_clamps() {
        assert_eq!(page_bounds(Some(0), Some(0)), (1, 0));
        assert_eq!(page_bounds(Some(2), Some(1000)), (100, 100));
    }
}
