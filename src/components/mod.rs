pub mod dialog;
pub mod editor;
pub mod help;
pub mod input;
pub mod search;
pub mod status_bar;
pub mod tree;
