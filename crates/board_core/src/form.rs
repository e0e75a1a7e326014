//! Creation/edit modal state.

use shared::domain::{Estado, RepairFields, RepairId, RepairRecord};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("campos obligatorios vacíos: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Create(RepairFields),
    Update(RepairId, RepairFields),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub open: bool,
    pub editing: Option<RepairId>,
    pub values: RepairFields,
}

impl FormState {
    pub fn open_blank(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    pub fn open_edit(&mut self, record: &RepairRecord) {
        self.open = true;
        self.editing = Some(record.id);
        self.values = record.fields();
    }

    /// Hides the modal and keeps whatever was typed.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Editar Equipo"
        } else {
            "Agregar Nuevo Equipo"
        }
    }

    pub fn initial_estado(&self) -> Estado {
        self.values.estado
    }

    /// Trimmed form values, or the required fields that are still blank.
    pub fn submit(&self) -> Result<FormSubmission, MissingFields> {
        let fields = RepairFields {
            modelo: self.values.modelo.trim().to_string(),
            duenio: self.values.duenio.trim().to_string(),
            sintoma: self.values.sintoma.trim().to_string(),
            observacion: self.values.observacion.trim().to_string(),
            tratamiento: self.values.tratamiento.trim().to_string(),
            estado: self.values.estado,
        };
        let missing = fields.missing_required();
        if !missing.is_empty() {
            return Err(MissingFields(missing));
        }
        Ok(match self.editing {
            Some(id) => FormSubmission::Update(id, fields),
            None => FormSubmission::Create(fields),
        })
    }
}
