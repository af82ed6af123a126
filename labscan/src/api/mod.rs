mod frontend;
pub mod handlers;
pub mod openapi;
pub mod response;
mod routes;
mod state;

pub use response::{ErrorResponse, LabTestsResponse};
pub use routes::create_router;
pub use state::AppState;
