// error.rs - Error types shared by the compression pipeline and the gallery

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Lecture impossible de {} : {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image illisible : {0}")]
    Decode(#[source] image::ImageError),

    #[error("Échec de l'encodage JPEG : {0}")]
    Encode(#[source] image::ImageError),

    #[error("L'encodeur JPEG n'a produit aucune donnée")]
    EmptyOutput,

    #[error("Écriture impossible de {} : {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Échec de la tâche de compression : {0}")]
    Task(String),

    #[error("Une compression est déjà en cours")]
    Busy,
}

pub type Result<T> = std::result::Result<T, Error>;
