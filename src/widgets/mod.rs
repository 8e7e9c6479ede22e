pub mod controls;
pub mod search_input;
pub mod stats_table;
