use crate::api::ConversionSummary;
use std::fmt;

/// Text report formatter for a conversion
pub struct TextReport<'a> {
    summary: &'a ConversionSummary,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(summary: &'a ConversionSummary) -> Self {
        Self { summary }
    }
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;

        writeln!(f, "RT Dose Conversion")?;
        writeln!(f, "==================")?;
        writeln!(f)?;
        writeln!(f, "Patient Name:   {}", s.patient.name)?;
        writeln!(f, "Patient ID:     {}", s.patient.id)?;
        writeln!(f, "Samples:        {}", s.samples)?;
        writeln!(f, "Frames:         {}", s.frames)?;
        writeln!(f, "Rows:           {}", s.rows)?;
        writeln!(f, "Columns:        {}", s.columns)?;
        writeln!(f, "Pixel Spacing:  {}", s.pixel_spacing)?;
        writeln!(f, "Y Planes:       {}", join(&s.plane_positions))?;
        writeln!(f, "Frame Offsets:  {}", join(&s.frame_offsets))?;
        writeln!(f, "Image Position: {}", join(&s.image_position))?;
        writeln!(f, "Scaling:        {:e}", s.dose_grid_scaling)?;
        writeln!(f, "Max Dose:       {}", s.max_dose)?;
        writeln!(f, "Zeroed Voxels:  {}", s.zeroed_voxels)?;
        writeln!(f, "Clamped Voxels: {}", s.clamped_voxels)?;
        writeln!(f, "SOP Instance:   {}", s.uids.sop_instance)?;
        match &s.output {
            Some(path) => writeln!(f, "Output:         {}", path.display())?,
            None => writeln!(f, "Output:         (dry run, not written)")?,
        }

        Ok(())
    }
}
