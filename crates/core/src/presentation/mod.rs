pub mod ui_state;
pub mod view_model;
