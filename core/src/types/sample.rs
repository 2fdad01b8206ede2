/// One row of the dose export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoseSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub dose: f64,
}

impl DoseSample {
    pub fn new(x: f64, y: f64, z: f64, dose: f64) -> Self {
        Self { x, y, z, dose }
    }
}

/// Minimum and maximum of each coordinate axis
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Extents {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

/// Ordered collection of dose samples
///
/// X and Z vary within a plane while Y identifies the plane. Rows keep the
/// order of the source export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTable {
    samples: Vec<DoseSample>,
}

impl SampleTable {
    pub fn new(samples: Vec<DoseSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DoseSample> {
        self.samples.iter()
    }

    pub fn push(&mut self, sample: DoseSample) {
        self.samples.push(sample);
    }

    /// Distinct Y values in the order they are first encountered
    pub fn y_planes(&self) -> Vec<f64> {
        let mut planes: Vec<f64> = Vec::new();
        for sample in &self.samples {
            if !planes.contains(&sample.y) {
                planes.push(sample.y);
            }
        }
        planes
    }

    /// Samples lying in the plane at `y`
    pub fn plane(&self, y: f64) -> impl Iterator<Item = &DoseSample> {
        self.samples.iter().filter(move |s| s.y == y)
    }

    /// Axis bounds of the whole table, `None` when the table is empty
    pub fn extents(&self) -> Option<Extents> {
        let first = self.samples.first()?;
        let init = Extents {
            x: (first.x, first.x),
            y: (first.y, first.y),
            z: (first.z, first.z),
        };

        Some(self.samples.iter().fold(init, |acc, s| Extents {
            x: (acc.x.0.min(s.x), acc.x.1.max(s.x)),
            y: (acc.y.0.min(s.y), acc.y.1.max(s.y)),
            z: (acc.z.0.min(s.z), acc.z.1.max(s.z)),
        }))
    }
}

impl FromIterator<DoseSample> for SampleTable {
    fn from_iter<I: IntoIterator<Item = DoseSample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SampleTable {
        SampleTable::new(vec![
            DoseSample::new(1.0, 5.0, 0.0, 0.1),
            DoseSample::new(2.0, 5.0, -1.0, 0.2),
            DoseSample::new(1.0, 0.0, 0.0, 0.3),
            DoseSample::new(-3.0, 0.0, 4.0, 0.4),
        ])
    }

    #[test]
    fn test_y_planes_keep_encounter_order() {
        assert_eq!(table().y_planes(), vec![5.0, 0.0]);
    }

    #[test]
    fn test_y_planes_merge_signed_zero() {
        let t = SampleTable::new(vec![
            DoseSample::new(0.0, 0.0, 0.0, 1.0),
            DoseSample::new(0.0, -0.0, 0.0, 1.0),
        ]);
        assert_eq!(t.y_planes().len(), 1);
    }

    #[test]
    fn test_extents() {
        let ext = table().extents().unwrap();
        assert_eq!(ext.x, (-3.0, 2.0));
        assert_eq!(ext.y, (0.0, 5.0));
        assert_eq!(ext.z, (-1.0, 4.0));
    }

    #[test]
    fn test_extents_empty() {
        assert!(SampleTable::default().extents().is_none());
    }

    #[test]
    fn test_plane_filter() {
        let t = table();
        assert_eq!(t.plane(0.0).count(), 2);
        assert_eq!(t.plane(7.0).count(), 0);
    }
}
