pub mod test_fixtures;
pub mod test_local;
