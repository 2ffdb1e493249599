pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(limit: i64, offset: Option<i64>) -> Self {
        Self { limit, offset: offset.unwrap_or(0) }
    }

    /// Builds a pagination window from a 1-based page number.
    pub fn page(page: i64, size: i64) -> Self {
        let size = size.clamp(1, 100);
        Self::new(size, Some((page.max(1) - 1) * size))
    }
}
