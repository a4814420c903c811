pub mod hook;
pub mod inspect;
pub mod reconcile;
