//! Page/limit resolution for catalog listings.

/// Effective pagination for a song listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number.
    pub page: i64,
    /// Rows per page, already clamped to the configured maximum.
    pub per_page: i64,
}

impl PageParams {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

/// Resolve the `page` and `limit` query parameters.
///
/// Both parameters arrive as raw strings because `limit` accepts the
/// sentinel values `all` and `0`, which request everything in a single
/// page capped at `max_limit`. Unparseable values fall back to page 1
/// and the default page size of 20.
pub fn resolve_page_params(
    page: Option<&str>,
    limit: Option<&str>,
    max_limit: i64,
) -> PageParams {
    let wants_all = matches!(limit.map(str::trim), Some("all") | Some("0"));
    if wants_all {
        return PageParams {
            page: 1,
            per_page: max_limit,
        };
    }
    let page = parse_int_or(page, 1).max(1);
    let per_page = parse_int_or(limit, 20).clamp(1, max_limit);
    PageParams { page, per_page }
}

/// Total page count for a result set, never less than 1.
pub fn total_pages(total: i64, per_page: i64) -> i64 {
    ((total + per_page - 1) / per_page).max(1)
}

fn parse_int_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = resolve_page_params(None, None, 2000);
        assert_eq!(params, PageParams { page: 1, per_page: 20 });
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_explicit_page_and_limit() {
        let params = resolve_page_params(Some("3"), Some("50"), 2000);
        assert_eq!(params, PageParams { page: 3, per_page: 50 });
        assert_eq!(params.offset(), 100);
    }

    #[test]
    fn test_limit_all_is_single_capped_page() {
        let params = resolve_page_params(Some("7"), Some("all"), 2000);
        assert_eq!(params, PageParams { page: 1, per_page: 2000 });
    }

    #[test]
    fn test_limit_zero_behaves_like_all() {
        let params = resolve_page_params(None, Some("0"), 500);
        assert_eq!(params, PageParams { page: 1, per_page: 500 });
    }

    #[test]
    fn test_limit_clamped_to_maximum() {
        let params = resolve_page_params(None, Some("999999"), 2000);
        assert_eq!(params.per_page, 2000);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let params = resolve_page_params(Some("abc"), Some("-5"), 2000);
        assert_eq!(params.page, 1);
        // Negative limits clamp up to a single row rather than erroring.
        assert_eq!(params.per_page, 1);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(4001, 2000), 3);
    }
}
