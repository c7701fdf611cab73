pub mod intake;
pub mod resume;
