//! Shared query-building helpers for the relational backends.
//!
//! The two backends differ only in identifier encoding and fragment-match
//! semantics, so everything else about their SQL lives here: the column
//! list, the documented result ordering, LIKE-pattern escaping, and the
//! filter assembly for `search`. Divergent behavior is passed in as an
//! explicit LIKE operator rather than duplicated per backend.

use sqlx::{Database, QueryBuilder};

use crate::storage::types::BookFilter;

/// Columns selected for every book query, in [`Book`](crate::storage::Book)
/// field order.
pub(crate) const BOOK_COLUMNS: &str = "id, title, author, year, created_on";

/// Result ordering for `list` and `search`.
///
/// Creation order (newest first) with the id as tiebreaker, so pagination is
/// deterministic even when rows share a timestamp.
pub(crate) const BOOK_ORDER: &str = " ORDER BY created_on DESC, id";

/// Escape LIKE metacharacters in a user-supplied fragment.
///
/// Backslash is the default escape character in both Postgres and MySQL.
pub(crate) fn escape_like(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Build the `%fragment%` substring pattern for a LIKE-family operator.
pub(crate) fn contains_pattern(fragment: &str) -> String {
    format!("%{}%", escape_like(fragment))
}

/// Append the AND-combined search filters to a query.
///
/// `like_op` carries the backend's fragment-match operator (`ILIKE` for
/// Postgres, `LIKE BINARY` for MySQL); the year filter is an exact match in
/// both.
pub(crate) fn push_search_filters<'args, DB>(
    qb: &mut QueryBuilder<'args, DB>,
    like_op: &str,
    filter: &BookFilter,
) where
    DB: Database,
    String: sqlx::Encode<'args, DB> + sqlx::Type<DB>,
    i32: sqlx::Encode<'args, DB> + sqlx::Type<DB>,
{
    let mut sep = " WHERE ";
    if let Some(title) = &filter.title {
        qb.push(sep).push("title ").push(like_op).push(" ");
        qb.push_bind(contains_pattern(title));
        sep = " AND ";
    }
    if let Some(author) = &filter.author {
        qb.push(sep).push("author ").push(like_op).push(" ");
        qb.push_bind(contains_pattern(author));
        sep = " AND ";
    }
    if let Some(year) = filter.year {
        qb.push(sep).push("year = ");
        qb.push_bind(year);
    }
}

/// Append the shared ordering plus a bound LIMIT/OFFSET pair.
pub(crate) fn push_page<'args, DB>(qb: &mut QueryBuilder<'args, DB>, offset: u64, limit: u64)
where
    DB: Database,
    i64: sqlx::Encode<'args, DB> + sqlx::Type<DB>,
{
    qb.push(BOOK_ORDER).push(" LIMIT ");
    qb.push_bind(page_bound(limit));
    qb.push(" OFFSET ");
    qb.push_bind(page_bound(offset));
}

/// Convert a pagination value to the i64 the drivers bind, saturating at
/// `i64::MAX` so oversized values never wrap to a negative LIMIT/OFFSET.
fn page_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("dune"), "dune");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("Orwell"), "%Orwell%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
    }

    #[test]
    fn test_push_search_filters_postgres_sql() {
        let filter = BookFilter {
            title: Some("dune".to_string()),
            author: None,
            year: Some(1965),
        };
        let mut qb = QueryBuilder::<sqlx::Postgres>::new(format!(
            "SELECT {} FROM book",
            BOOK_COLUMNS
        ));
        push_search_filters(&mut qb, "ILIKE", &filter);

        let sql = qb.sql();
        assert!(sql.contains("WHERE title ILIKE $1"));
        assert!(sql.contains("AND year = $2"));
        assert!(!sql.contains("author"));
    }

    #[test]
    fn test_push_search_filters_mysql_sql() {
        let filter = BookFilter {
            title: None,
            author: Some("orwell".to_string()),
            year: None,
        };
        let mut qb =
            QueryBuilder::<sqlx::MySql>::new(format!("SELECT {} FROM book", BOOK_COLUMNS));
        push_search_filters(&mut qb, "LIKE BINARY", &filter);

        assert!(qb.sql().contains("WHERE author LIKE BINARY ?"));
    }

    #[test]
    fn test_push_search_filters_empty() {
        let mut qb = QueryBuilder::<sqlx::Postgres>::new("SELECT 1 FROM book");
        push_search_filters(&mut qb, "ILIKE", &BookFilter::default());
        assert_eq!(qb.sql(), "SELECT 1 FROM book");
    }

    #[test]
    fn test_push_page_sql() {
        let mut qb = QueryBuilder::<sqlx::Postgres>::new("SELECT 1 FROM book");
        push_page(&mut qb, 5, 3);
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY created_on DESC, id"));
        assert!(sql.contains("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_page_bound_saturates() {
        assert_eq!(page_bound(0), 0);
        assert_eq!(page_bound(1000), 1000);
        assert_eq!(page_bound(i64::MAX as u64), i64::MAX);
        assert_eq!(page_bound(u64::MAX), i64::MAX);
    }
}
