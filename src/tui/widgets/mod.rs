pub mod auth_form;
pub mod color;
pub mod editor;
pub mod form;
pub mod help;
pub mod nav_bar;
pub mod placeholder;
pub mod session_list;
pub mod status_bar;
pub mod tracker_view;
