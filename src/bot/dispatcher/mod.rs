pub mod dispatcher;
pub mod help;
