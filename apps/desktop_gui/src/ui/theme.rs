use egui::Color32;
use shared::domain::Estado;

#[derive(Debug, Clone, Copy)]
pub struct StagePalette {
    pub accent: Color32,
    pub card_fill: Color32,
}

pub fn stage_palette(estado: Estado) -> StagePalette {
    match estado {
        Estado::Recibida => StagePalette {
            accent: Color32::from_rgb(59, 130, 246),
            card_fill: Color32::from_rgb(30, 41, 59),
        },
        Estado::Progreso => StagePalette {
            accent: Color32::from_rgb(245, 158, 11),
            card_fill: Color32::from_rgb(45, 38, 28),
        },
        Estado::Finalizada => StagePalette {
            accent: Color32::from_rgb(16, 185, 129),
            card_fill: Color32::from_rgb(22, 44, 38),
        },
    }
}

pub const BANNER_FILL: Color32 = Color32::from_rgb(127, 29, 29);
pub const MUTED_TEXT: Color32 = Color32::from_rgb(148, 163, 184);
