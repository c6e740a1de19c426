//! SeaORM entity modules for the user-management data model: a `role` lookup
//! table and the `profile` user record that may reference one role.

pub mod profile;
pub mod role;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::profile::Entity as Profile;
    pub use super::role::Entity as Role;
}
