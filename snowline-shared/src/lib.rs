pub mod contact;
pub mod pii;

pub use contact::CustomerContact;
pub use pii::Masked;
