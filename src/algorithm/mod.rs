pub mod heuristic;
pub mod router;
pub mod traversal;
pub mod visitor;
