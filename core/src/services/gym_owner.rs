use validator::Validate;

use crate::client::{ApiClient, RequestOptions};
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{GymOwner, GymOwnerUpdate, NewGymOwner};

/// Admin-only CRUD over gym-owner records.
#[derive(Debug, Clone)]
pub struct GymOwnerService {
    client: ApiClient,
}

impl GymOwnerService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn get_all_gym_owners(&self) -> Result<Vec<GymOwner>, ApiError> {
        self.client.api_fetch("/gym-owner/all", RequestOptions::get())?.into_data()
    }

    pub fn get_gym_owner_by_id(&self, id: u64) -> Result<GymOwner, ApiError> {
        self.client
            .api_fetch(&format!("/gym-owner/{id}"), RequestOptions::get())?
            .into_data()
    }

    /// Create a gym owner, uploading any attached images.
    pub fn register_gym_owner(&self, input: &NewGymOwner) -> Result<GymOwner, ApiError> {
        input.validate()?;
        let options = RequestOptions::multipart(HttpMethod::Post, input.to_form());
        self.client.api_fetch("/gym-owner/register", options)?.into_data()
    }

    pub fn update_gym_owner_by_id(&self, id: u64, update: &GymOwnerUpdate) -> Result<GymOwner, ApiError> {
        update.validate()?;
        let options = RequestOptions::multipart(HttpMethod::Put, update.to_form());
        self.client
            .api_fetch(&format!("/gym-owner/update/{id}"), options)?
            .into_data()
    }

    /// Only the success flag is checked; the server may omit `data`.
    pub fn delete_gym_owner(&self, id: u64) -> Result<Envelope, ApiError> {
        self.client
            .api_fetch(&format!("/gym-owner/delete/{id}"), RequestOptions::delete())
    }
}
