use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(RepairId);

/// Lifecycle stage of a repair job. Variants are declared in board order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Estado {
    #[default]
    Recibida,
    Progreso,
    Finalizada,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }

    /// Accepts only the unit steps `-1` and `+1`.
    pub fn from_step(step: i32) -> Option<Self> {
        match step {
            -1 => Some(Direction::Backward),
            1 => Some(Direction::Forward),
            _ => None,
        }
    }
}

impl Estado {
    pub const ORDER: [Estado; 3] = [Estado::Recibida, Estado::Progreso, Estado::Finalizada];

    pub fn index(self) -> usize {
        match self {
            Estado::Recibida => 0,
            Estado::Progreso => 1,
            Estado::Finalizada => 2,
        }
    }

    /// Stage one step away in `direction`, or `None` past either end of the board.
    pub fn shifted(self, direction: Direction) -> Option<Self> {
        let target = self.index() as isize + direction.step();
        if target < 0 {
            return None;
        }
        Self::ORDER.get(target as usize).copied()
    }

    pub fn can_move(self, direction: Direction) -> bool {
        self.shifted(direction).is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Estado::Recibida => "recibida",
            Estado::Progreso => "progreso",
            Estado::Finalizada => "finalizada",
        }
    }

    /// Column heading shown on the board.
    pub fn title(self) -> &'static str {
        match self {
            Estado::Recibida => "Recibida",
            Estado::Progreso => "En Progreso",
            Estado::Finalizada => "Finalizada",
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown estado '{0}'")]
pub struct UnknownEstado(pub String);

impl FromStr for Estado {
    type Err = UnknownEstado;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Estado::ORDER
            .into_iter()
            .find(|estado| estado.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownEstado(s.to_string()))
    }
}

/// Editable content of a repair job; everything but the gateway-owned `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairFields {
    pub modelo: String,
    #[serde(alias = "dueño")]
    pub duenio: String,
    pub sintoma: String,
    #[serde(default)]
    pub observacion: String,
    #[serde(default)]
    pub tratamiento: String,
    #[serde(default)]
    pub estado: Estado,
}

impl RepairFields {
    pub fn new(
        modelo: impl Into<String>,
        duenio: impl Into<String>,
        sintoma: impl Into<String>,
    ) -> Self {
        Self {
            modelo: modelo.into(),
            duenio: duenio.into(),
            sintoma: sintoma.into(),
            ..Self::default()
        }
    }

    pub fn with_observacion(mut self, observacion: impl Into<String>) -> Self {
        self.observacion = observacion.into();
        self
    }

    pub fn with_tratamiento(mut self, tratamiento: impl Into<String>) -> Self {
        self.tratamiento = tratamiento.into();
        self
    }

    pub fn with_estado(mut self, estado: Estado) -> Self {
        self.estado = estado;
        self
    }

    /// Names of required fields that are blank after trimming.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("modelo", &self.modelo),
            ("duenio", &self.duenio),
            ("sintoma", &self.sintoma),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairRecord {
    pub id: RepairId,
    pub modelo: String,
    pub duenio: String,
    pub sintoma: String,
    pub observacion: String,
    pub tratamiento: String,
    pub estado: Estado,
    pub created_at: DateTime<Utc>,
}

impl RepairRecord {
    pub fn from_fields(id: RepairId, fields: RepairFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            modelo: fields.modelo,
            duenio: fields.duenio,
            sintoma: fields.sintoma,
            observacion: fields.observacion,
            tratamiento: fields.tratamiento,
            estado: fields.estado,
            created_at,
        }
    }

    pub fn fields(&self) -> RepairFields {
        RepairFields {
            modelo: self.modelo.clone(),
            duenio: self.duenio.clone(),
            sintoma: self.sintoma.clone(),
            observacion: self.observacion.clone(),
            tratamiento: self.tratamiento.clone(),
            estado: self.estado,
        }
    }

    pub fn apply_fields(&mut self, fields: RepairFields) {
        self.modelo = fields.modelo;
        self.duenio = fields.duenio;
        self.sintoma = fields.sintoma;
        self.observacion = fields.observacion;
        self.tratamiento = fields.tratamiento;
        self.estado = fields.estado;
    }
}
