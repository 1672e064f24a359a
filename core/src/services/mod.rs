//! Typed wrappers over `ApiClient`, one per resource family.
//!
//! Services own client-side validation and the per-endpoint choice of
//! whether `data` is required; status and envelope interpretation stays in
//! `ApiClient`.

mod auth;
mod gym_owner;
mod health;
mod support;

pub use auth::AuthService;
pub use gym_owner::GymOwnerService;
pub use health::HealthInfoService;
pub use support::SupportService;
