pub mod overview;
pub mod topsql;
