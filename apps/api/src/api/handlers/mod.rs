pub mod health;
pub mod roadmap;
