pub mod response;

pub use response::ErrorResult;
