pub mod console;
pub mod layers;
pub mod map_view;
pub mod sidebar;
