pub mod heuristic_model;
