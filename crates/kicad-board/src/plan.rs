use crate::board::Board;
use crate::edge::{polyline_to_lines, set_edge_cut_points, Point, DEFAULT_EDGE_WIDTH};
use crate::error::BoardError;
use crate::footprint::{add_footprint, FootprintLibrary, FootprintOptions};
use crate::net::NetAllocator;
use crate::stamp::StampGenerator;
use serde::Deserialize;
use std::path::Path;

/// A scripted board build, usually read from JSON.
///
/// ```json
/// {
///   "thickness": 1.2,
///   "nets": ["GND", "VCC"],
///   "footprints": [
///     {"library_name": "Switches", "footprint_name": "MX", "position": [0, 0], "reference": "S1"}
///   ],
///   "outline": [[0, 0], [100, 0], [100, 60], [0, 60]]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardPlan {
    #[serde(default)]
    pub thickness: Option<f64>,
    #[serde(default)]
    pub nets: Vec<String>,
    #[serde(default)]
    pub footprints: Vec<FootprintOptions>,
    #[serde(default)]
    pub outline: Vec<Point>,
    #[serde(default)]
    pub edge_width: Option<f64>,
}

impl BoardPlan {
    pub fn from_json(text: &str) -> Result<Self, BoardError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, BoardError> {
        if !path.is_file() {
            return Err(BoardError::AssetNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Apply thickness, nets, footprints and outline to `seed`, in that
    /// order. Any failure aborts the whole build.
    pub fn apply(
        &self,
        seed: &Board,
        library: &FootprintLibrary,
        stamps: &mut dyn StampGenerator,
    ) -> Result<Board, BoardError> {
        let mut board = match self.thickness {
            Some(thickness) => seed.set_thickness(thickness),
            None => seed.clone(),
        };

        let mut allocator = NetAllocator::for_board(&board);
        for name in &self.nets {
            let (next, _) = allocator.allocate(&board, name);
            board = next;
        }

        for options in &self.footprints {
            board = add_footprint(&board, library, options, stamps)?;
        }

        if !self.outline.is_empty() {
            let width = self.edge_width.unwrap_or(DEFAULT_EDGE_WIDTH);
            board = set_edge_cut_points(&board, &polyline_to_lines(&self.outline), width, stamps);
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::get_edge_cut_points;
    use crate::net::{nets, Net};
    use crate::stamp::SequentialStamps;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_plan() {
        let dir = tempfile::TempDir::new().unwrap();
        let library = FootprintLibrary::new(dir.path());
        std::fs::create_dir_all(library.library_dir("Lib")).unwrap();
        std::fs::write(
            library.template_path("Lib", "TP"),
            "(footprint \"TP\" (pad \"1\" smd circle (at 0 0) (size 1 1) (layers \"F.Cu\")))",
        )
        .unwrap();

        let plan = BoardPlan::from_json(
            r#"{
                "thickness": 1.2,
                "nets": ["GND", "VCC"],
                "footprints": [
                    {"library_name": "Lib", "footprint_name": "TP", "position": [1, 2], "rotation": 90}
                ],
                "outline": [[0, 0], [10, 0], [10, 10]]
            }"#,
        )
        .unwrap();

        let seed = Board::seed().unwrap();
        let mut stamps = SequentialStamps::new();
        let board = plan.apply(&seed, &library, &mut stamps).unwrap();

        assert_relative_eq!(board.thickness().unwrap(), 1.2);
        assert_eq!(
            nets(&board),
            vec![Net::new(0, ""), Net::new(1, "GND"), Net::new(2, "VCC")]
        );
        assert_eq!(board.footprints().len(), 1);
        assert_eq!(
            get_edge_cut_points(&board),
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]
        );
        // footprint + pad + three edges
        assert_eq!(stamps.issued(), 5);
        assert_eq!(seed, Board::seed().unwrap());
    }

    #[test]
    fn test_empty_plan_is_identity() {
        let seed = Board::seed().unwrap();
        let library = FootprintLibrary::new("unused");
        let mut stamps = SequentialStamps::new();
        let board = BoardPlan::default().apply(&seed, &library, &mut stamps).unwrap();
        assert_eq!(board, seed);
    }

    #[test]
    fn test_invalid_footprint_aborts() {
        let plan = BoardPlan::from_json(r#"{"footprints": [{"library_name": "Lib"}]}"#).unwrap();
        let library = FootprintLibrary::new("unused");
        let mut stamps = SequentialStamps::new();
        let err = plan
            .apply(&Board::seed().unwrap(), &library, &mut stamps)
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidOptions(ref f) if f == "position"));
    }
}
