//! Values published by the controllers for the presentation layer.

pub mod catalog;
pub mod detail;
