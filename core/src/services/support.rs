use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::types::SupportQuery;

#[derive(Debug, Clone)]
pub struct SupportService {
    client: ApiClient,
}

impl SupportService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All support queries, newest first. The server lists them oldest
    /// first.
    pub fn get_all_support_queries(&self) -> Result<Vec<SupportQuery>, ApiError> {
        let mut queries: Vec<SupportQuery> = self
            .client
            .public_fetch("/communicationsupports/get", RequestOptions::get())?
            .into_data()?;
        queries.reverse();
        Ok(queries)
    }
}
