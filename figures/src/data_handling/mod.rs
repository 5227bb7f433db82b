pub mod paired_table;
pub mod rank_table;
pub mod synthetic;
