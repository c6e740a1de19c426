pub mod import_django;
pub mod initdb;
pub mod profiles;
pub mod roles;

pub use import_django::import_django;
pub use initdb::init_database;
