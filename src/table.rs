pub mod table;
pub mod operations;
pub mod diff;
pub mod tableview;
pub mod columnwidths;
