pub mod account;
pub mod enums;
pub mod medical_form;
pub mod prescription;
pub mod record;

pub use account::*;
pub use enums::*;
pub use medical_form::*;
pub use prescription::*;
pub use record::*;
