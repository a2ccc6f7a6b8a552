#![allow(dead_code)]

pub mod properties;
pub mod utils;
