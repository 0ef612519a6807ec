use egui::Ui;

use crate::map::BaseLayer;
use crate::map::LayerVisibility;

/// Base layer radio buttons followed by the overlay checkboxes.
pub fn show_layer_control(ui: &mut Ui, layers: &mut LayerVisibility) {
    ui.vertical(|ui| {
        for layer in BaseLayer::ALL {
            ui.radio_value(&mut layers.base, layer, layer.label());
        }
        ui.separator();
        ui.checkbox(&mut layers.tracks, LayerVisibility::TRACKS_LABEL);
        ui.checkbox(&mut layers.media, LayerVisibility::MEDIA_LABEL);
    });
}
