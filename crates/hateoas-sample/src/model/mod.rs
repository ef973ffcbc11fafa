//! Concrete resource types served by the sample application.

pub mod note;
pub mod person;

pub use note::Note;
pub use person::Person;
