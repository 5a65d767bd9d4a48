pub mod choice;
