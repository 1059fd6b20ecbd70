// Presentation layer - How pack state is shown to operators
pub mod console;
