use serde::Serialize;

pub mod boards;
pub mod columns;
pub mod frontend;
pub mod health;
pub mod params;
pub mod tasks;

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

impl Deleted {
    pub(crate) fn ok() -> Self {
        Self { success: true }
    }
}
