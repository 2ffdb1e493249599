use serde::Serialize;

use crate::core::tokener::Role;

#[derive(Debug, Serialize)]
pub struct List<T> {
    list: Vec<T>,
    total: i64,
}

impl<T> List<T> {
    pub fn new(list: Vec<T>, total: i64) -> Self {
        List { list, total }
    }
}

#[derive(Debug, Serialize)]
pub struct Session<T> {
    pub token: String,
    pub role: Role,
    pub profile: T,
}

#[derive(Debug, Serialize)]
pub struct Empty {}
