pub mod crontab;
pub mod error;
pub mod health;
