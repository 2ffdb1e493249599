use serde::Deserialize;

use crate::core::models::common::Pagination as Window;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl Pagination {
    /// No window when the caller asks for no page.
    pub fn window(&self) -> Option<Window> {
        self.page.map(|page| Window::page(page, self.size.unwrap_or(20)))
    }
}
