pub mod fetch_service;
pub mod portfolio_repository;
pub mod summary_service;
