pub mod access;
pub mod borrow;
pub mod dce;
pub mod exclusivity;
pub mod object_state;
