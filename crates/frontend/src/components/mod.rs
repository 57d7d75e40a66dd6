pub mod map_controls;
pub mod map_view;
pub mod marker_card;
pub mod search_header;
pub mod side_menu;
