pub mod health;
pub mod sets;
