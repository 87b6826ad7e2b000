//! Domain types and pure message transformations

pub mod communication;
