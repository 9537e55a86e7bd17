//! Model information summary shown in the info window and saved as text

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::convert::ConvertedModel;
use crate::scene::Scene;

/// Display unit for model dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    Unit,
    Millimeter,
    Centimeter,
    Meter,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Unit, Unit::Millimeter, Unit::Centimeter, Unit::Meter];

    pub fn label(&self) -> &'static str {
        match self {
            Unit::Unit => "unit",
            Unit::Millimeter => "mm",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
        }
    }

    /// Scale applied to model-space lengths
    pub fn factor(&self) -> f64 {
        match self {
            Unit::Unit => 1.0,
            Unit::Millimeter => 1000.0,
            Unit::Centimeter => 100.0,
            Unit::Meter => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReport {
    pub file_name: String,
    pub source_path: PathBuf,
    pub mesh_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
    pub poly_count: usize,
    pub vertex_count: usize,
    pub bounds: Aabb,
}

impl ModelReport {
    pub fn new(scene: &Scene, model: &ConvertedModel, source_path: &Path) -> Self {
        Self {
            file_name: source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source_path: source_path.to_path_buf(),
            mesh_count: scene.mesh_count(),
            material_count: scene.material_count(),
            texture_count: model.texture_nodes.len(),
            poly_count: model.poly_count,
            vertex_count: model.vertex_count,
            bounds: model.group.bounds,
        }
    }

    /// `X: 1.00 unit` style lines for the three axes
    pub fn dimension_lines(&self, unit: Unit) -> [String; 3] {
        let size = self.bounds.size();
        let f = unit.factor();
        const AXES: [&str; 3] = ["X", "Y", "Z"];
        std::array::from_fn(|k| {
            format!("{}: {:.2} {}", AXES[k], size[k] as f64 * f, unit.label())
        })
    }

    /// Bounding-box volume in cubed display units
    pub fn volume(&self, unit: Unit) -> f64 {
        self.bounds.volume() as f64 * unit.factor().powi(3)
    }

    pub fn volume_text(&self, unit: Unit) -> String {
        format!("Vol: {:.2}", self.volume(unit))
    }

    /// Plain-text report stamped with `generated`
    pub fn to_text(&self, unit: Unit, generated: DateTime<Local>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Model Report");
        let _ = writeln!(out, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out);
        let _ = writeln!(out, "File: {}", self.file_name);
        let _ = writeln!(out, "Path: {}", self.source_path.display());
        let _ = writeln!(out, "Meshes: {}", self.mesh_count);
        let _ = writeln!(out, "Materials: {}", self.material_count);
        let _ = writeln!(out, "Textures: {}", self.texture_count);
        let _ = writeln!(out, "Polys: {}", self.poly_count);
        let _ = writeln!(out, "Verts: {}", self.vertex_count);
        let _ = writeln!(out);
        for line in self.dimension_lines(unit) {
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out, "{}", self.volume_text(unit));
        out
    }

    pub fn save(&self, path: &Path, unit: Unit) -> std::io::Result<()> {
        std::fs::write(path, self.to_text(unit, Local::now()))?;
        tracing::info!(path = %path.display(), "Saved model report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{convert_scene, tests::cube_scene};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn cube_report() -> ModelReport {
        let scene = cube_scene();
        let model = convert_scene(&scene, Path::new("/models/cube.obj"));
        ModelReport::new(&scene, &model, Path::new("/models/cube.obj"))
    }

    #[test]
    fn test_dimensions_per_unit() {
        let report = cube_report();
        assert_eq!(report.dimension_lines(Unit::Unit)[0], "X: 1.00 unit");
        assert_eq!(report.dimension_lines(Unit::Centimeter)[2], "Z: 100.00 cm");
        assert_eq!(report.volume_text(Unit::Unit), "Vol: 1.00");
        assert_eq!(report.volume(Unit::Millimeter), 1.0e9);
    }

    #[test]
    fn test_report_text() {
        let report = cube_report();
        let stamp = Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let text = report.to_text(Unit::Meter, stamp);

        assert!(text.contains("Generated: 2024-05-01 12:30:00"));
        assert!(text.contains("File: cube.obj"));
        assert!(text.contains("Polys: 12"));
        assert!(text.contains("Y: 1.00 m"));
    }

    #[test]
    fn test_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.txt");
        cube_report().save(&path, Unit::Unit).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Verts: 8"));
    }
}
