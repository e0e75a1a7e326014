//! Sample repair jobs used to seed empty boards.

use crate::domain::{Estado, RepairFields};

pub fn sample_repairs() -> Vec<RepairFields> {
    vec![
        RepairFields::new("HP Pavilion", "Juan Pérez", "PC muy lenta, no enciende bien")
            .with_observacion("Mucho polvo acumulado")
            .with_tratamiento("Limpieza profunda, cambio pasta térmica"),
        RepairFields::new("Dell Inspiron 15", "María García", "No arranca Windows")
            .with_observacion("Disco duro con sectores dañados")
            .with_tratamiento("Instalación Windows 10, Office 2021")
            .with_estado(Estado::Progreso),
        RepairFields::new("Lenovo ThinkPad T480", "Carlos López", "Pantalla azul frecuente")
            .with_observacion("RAM defectuosa")
            .with_tratamiento("Reemplazo módulo RAM 8GB")
            .with_estado(Estado::Finalizada),
    ]
}
