pub mod job_cards;
pub mod loader;
pub mod top_sheet;
