pub mod chart_service;
pub mod debounce;
pub mod home_store;
pub mod show_store;
