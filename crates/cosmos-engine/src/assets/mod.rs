pub mod manifest;
pub mod profiles;
pub mod registry;
