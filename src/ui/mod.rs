pub mod layer_control;
pub mod map_view;
pub mod media_form;
