pub mod advisor;
pub mod loans;
