use std::io;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("A network error occurred: {0}")]
    Network(#[from] reqwest::Error),

    #[error("The server answered with status {status}")]
    Server { status: StatusCode },

    #[error("No file was selected for upload")]
    MissingFile,

    #[error("The media form is not open")]
    FormNotOpen,

    #[error("JSON deserialization error: {0}")]
    MalformedData(#[from] serde_json::Error),

    #[error("An I/O error occurred: {0}")]
    Io(#[from] io::Error),

    #[error("Could not parse GPX document: {0}")]
    Gpx(#[from] roxmltree::Error),

    #[error("Track {0:?} contains no points")]
    EmptyTrack(String),

    #[error("Invalid configuration file: {0}")]
    Config(#[from] toml::de::Error),
}

impl ViewerError {
    /// Status line shown in the media form when an upload fails.
    pub fn upload_status(&self) -> &'static str {
        match self {
            ViewerError::Server { .. } => "Erreur lors de l'envoi du média.",
            ViewerError::MissingFile => "Merci de choisir un fichier.",
            _ => "Erreur réseau.",
        }
    }
}
