pub mod kill;
pub mod launch;
