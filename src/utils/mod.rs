// src/utils/mod.rs

pub mod csv;
pub mod hash;
pub mod html;
pub mod jwt;
