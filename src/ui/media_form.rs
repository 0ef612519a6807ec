use egui::Color32;
use egui::Context;
use egui::RichText;

use crate::icons;
use crate::media_form::FormState;
use crate::media_form::MediaForm;

const MEDIA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "mp4", "m4v", "mov", "webm", "mkv"];

/// What the user asked the form to do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Submit,
    Cancel,
}

pub fn show_media_form(ctx: &Context, form: &mut MediaForm) -> Option<FormAction> {
    if !form.is_visible() {
        return None;
    }

    let mut action = None;
    let submitting = form.state() == FormState::Submitting;

    egui::Window::new(format!("{} Ajouter un média", icons::IMAGE)).collapsible(false).resizable(false).anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0]).show(ctx, |ui| {
        ui.label(RichText::new(form.context_text()).small());
        ui.separator();

        ui.horizontal(|ui| {
            if ui.add_enabled(!submitting, egui::Button::new(format!("{} Fichier…", icons::FOLDER_OPEN))).clicked() {
                if let Some(path) = rfd::FileDialog::new().add_filter("Médias", MEDIA_EXTENSIONS).pick_file() {
                    form.file = Some(path);
                }
            }
            match form.file.as_ref().and_then(|p| p.file_name()) {
                Some(name) => ui.label(name.to_string_lossy()),
                None => ui.weak("Aucun fichier choisi"),
            };
        });

        ui.add_enabled(!submitting, egui::TextEdit::singleline(&mut form.title).hint_text("Titre"));
        ui.add_enabled(!submitting, egui::TextEdit::multiline(&mut form.description).hint_text("Description").desired_rows(3));

        ui.horizontal(|ui| {
            if ui.add_enabled(!submitting, egui::Button::new("Envoyer")).clicked() {
                action = Some(FormAction::Submit);
            }
            if ui.button("Annuler").clicked() {
                action = Some(FormAction::Cancel);
            }
            if submitting {
                ui.spinner();
            }
        });

        if !form.status().is_empty() {
            ui.label(RichText::new(form.status()).color(Color32::LIGHT_BLUE));
        }
    });

    action
}
