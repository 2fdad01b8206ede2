/// Patient identity taken from the spreadsheet header cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PatientInfo {
    /// Patient name (cell A1)
    pub name: String,

    /// Patient ID (cell A2)
    pub id: String,
}

impl PatientInfo {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}
