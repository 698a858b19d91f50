// src/handlers/mod.rs

pub mod announcement;
pub mod department;
pub mod examination;
pub mod health;
