pub mod dashboard;
pub mod keyboard_diagram;
pub mod stats_sidebar;
pub mod typing_area;
