pub mod ai;
pub mod entity;
pub mod occupancy;
pub mod position;
pub mod rules;
pub mod tile;
pub mod undo;

#[cfg(test)]
pub mod fixture;
