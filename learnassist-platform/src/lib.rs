pub mod speech;
pub mod test;
