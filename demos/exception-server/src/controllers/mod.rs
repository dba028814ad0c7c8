pub mod api;
pub mod servlet;

pub use api::MemberController;
pub use servlet::ServletController;
