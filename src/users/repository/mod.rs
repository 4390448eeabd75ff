pub mod mongo_user_repository;
pub mod mysql_user_repository;
pub mod postgres_user_repository;
pub mod user_repository;
