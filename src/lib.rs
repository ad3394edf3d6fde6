pub mod cnf;
pub mod error;
pub mod oracle;
pub mod rng;
pub mod search;
pub mod sweep;
