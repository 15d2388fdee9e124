pub mod amber;
pub mod protocol;
