pub mod config;
pub mod error;
pub mod error_handler;
pub mod friend;
pub mod friend_requests;
pub mod geo;
pub mod nearby;
pub mod overlay;
pub mod region;
pub mod remote_api;
pub mod routes;
pub mod scene;
pub mod selection;
pub mod session;
pub mod state;
