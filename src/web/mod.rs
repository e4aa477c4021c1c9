pub mod admin;
pub mod app_ui;
pub mod auth;
pub mod categorias;
pub mod empresas;
pub mod error;
pub mod exames;
pub mod models;
pub mod rate_limit;
pub mod router;
pub mod seed;
pub mod state;
pub mod storage;
pub mod templates;
pub mod uploads;

pub use state::AppState;
