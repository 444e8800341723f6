pub mod selection;
pub mod shortcuts;
