pub mod csv;
pub mod datasource;
pub mod diagnostics;
pub mod merge;
pub mod place_holder;
pub mod template;
