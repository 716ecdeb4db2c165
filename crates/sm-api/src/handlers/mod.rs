pub mod candidates;
pub mod employer;
pub mod health;
pub mod matches;
pub mod pagination;
pub mod postings;
pub mod statistics;
