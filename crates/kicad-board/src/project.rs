//! Loading boards and writing KiCad projects.
//!
//! Saving is not transactional: a failure part way through can leave
//! copied libraries without the board or project file.
use crate::board::Board;
use crate::error::BoardError;
use crate::footprint::{library_prefix, FootprintLibrary};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_TEMPLATE: &str = include_str!("../fixtures/initial.kicad_pro");

/// Parse a `.kicad_pcb` file.
pub fn load(path: &Path) -> Result<Board, BoardError> {
    if !path.is_file() {
        return Err(BoardError::AssetNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    let board = Board::parse(&text)?;
    log::debug!("loaded {}", path.display());
    Ok(board)
}

/// Distinct `<library>` prefixes of the footprints on `board`, first-seen
/// order.
pub fn library_names(board: &Board) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for footprint in board.footprints() {
        if let Some(library) = library_prefix(footprint) {
            if !names.iter().any(|n| n == library) {
                names.push(library.to_string());
            }
        }
    }
    names
}

/// The embedded project template with `meta.filename` set for `project_name`.
pub fn project_metadata(project_name: &str) -> Result<Value, BoardError> {
    let mut project: Value = serde_json::from_str(PROJECT_TEMPLATE)?;
    let meta = project
        .get_mut("meta")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| BoardError::MalformedTree("project template has no meta".to_string()))?;
    meta.insert(
        "filename".to_string(),
        Value::String(format!("{project_name}.kicad_pro")),
    );
    Ok(project)
}

/// Paths written by `save`.
#[derive(Debug, Clone)]
pub struct SavedProject {
    pub board: PathBuf,
    pub project: PathBuf,
    pub libraries: Vec<PathBuf>,
}

/// Write `board` as a project named `project_name` under `project_dir`,
/// copying every referenced footprint library next to it.
pub fn save(
    board: &Board,
    project_dir: &Path,
    project_name: &str,
    library: &FootprintLibrary,
) -> Result<SavedProject, BoardError> {
    fs::create_dir_all(project_dir)?;

    let mut libraries = Vec::new();
    for name in library_names(board) {
        let src = library.library_dir(&name);
        if !src.is_dir() {
            return Err(BoardError::AssetNotFound { path: src });
        }
        let dst = project_dir.join(format!("{name}.pretty"));
        if dst.exists() {
            if fs::canonicalize(&dst)? == fs::canonicalize(&src)? {
                log::debug!("footprint library {} already in place", dst.display());
                libraries.push(dst);
                continue;
            }
            fs::remove_dir_all(&dst)?;
        }
        copy_dir_all(&src, &dst)?;
        log::info!("copied footprint library {}", dst.display());
        libraries.push(dst);
    }

    let board_path = project_dir.join(format!("{project_name}.kicad_pcb"));
    fs::write(&board_path, board.to_string())?;
    log::info!("wrote {}", board_path.display());

    let project_path = project_dir.join(format!("{project_name}.kicad_pro"));
    let project = project_metadata(project_name)?;
    fs::write(&project_path, serde_json::to_string_pretty(&project)?)?;
    log::info!("wrote {}", project_path.display());

    Ok(SavedProject {
        board: board_path,
        project: project_path,
        libraries,
    })
}

fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), BoardError> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let dst_path = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dst_path)?;
        } else {
            fs::copy(entry.path(), &dst_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::{add_footprint, FootprintOptions};
    use crate::stamp::SequentialStamps;
    use tempfile::TempDir;

    const TEMPLATE: &str = r#"(footprint "SW" (layer "F.Cu")
        (fp_text reference "REF**" (at 0 -3) (layer "F.SilkS"))
        (pad "1" thru_hole circle (at -2.5 0) (size 2 2) (drill 1.2) (layers "*.Cu" "*.Mask")))"#;

    fn library(dir: &Path) -> FootprintLibrary {
        let library = FootprintLibrary::new(dir.join("libs"));
        for (lib, name) in [("Switches", "SW"), ("Diodes", "SW")] {
            fs::create_dir_all(library.library_dir(lib)).unwrap();
            fs::write(library.template_path(lib, name), TEMPLATE).unwrap();
        }
        library
    }

    fn populated(library: &FootprintLibrary) -> Board {
        let mut stamps = SequentialStamps::new();
        let mut board = Board::seed().unwrap();
        for (lib, x) in [("Switches", 0.0), ("Diodes", 10.0), ("Switches", 20.0)] {
            let options = FootprintOptions::new(lib, "SW", [x, 0.0]);
            board = add_footprint(&board, library, &options, &mut stamps).unwrap();
        }
        board
    }

    #[test]
    fn test_library_names_distinct_in_order() {
        let dir = TempDir::new().unwrap();
        let board = populated(&library(dir.path()));
        assert_eq!(library_names(&board), vec!["Switches", "Diodes"]);
    }

    #[test]
    fn test_save_writes_project() {
        let dir = TempDir::new().unwrap();
        let library = library(dir.path());
        let board = populated(&library);
        let out = dir.path().join("out").join("keyboard");

        let saved = save(&board, &out, "keyboard", &library).unwrap();

        assert!(out.join("Switches.pretty/SW.kicad_mod").is_file());
        assert!(out.join("Diodes.pretty/SW.kicad_mod").is_file());
        assert_eq!(saved.libraries.len(), 2);
        assert_eq!(load(&saved.board).unwrap(), board);

        let project: Value =
            serde_json::from_str(&fs::read_to_string(&saved.project).unwrap()).unwrap();
        assert_eq!(project["meta"]["filename"], "keyboard.kicad_pro");
    }

    #[test]
    fn test_save_overwrites_library_copy() {
        let dir = TempDir::new().unwrap();
        let library = library(dir.path());
        let board = populated(&library);
        let out = dir.path().join("proj");
        let stale = out.join("Switches.pretty/stale.kicad_mod");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "(footprint \"old\")").unwrap();

        save(&board, &out, "proj", &library).unwrap();
        assert!(!stale.exists());
        assert!(out.join("Switches.pretty/SW.kicad_mod").is_file());
    }

    #[test]
    fn test_save_into_library_root_keeps_templates() {
        let dir = TempDir::new().unwrap();
        let library = library(dir.path());
        let board = populated(&library);
        let template = library.template_path("Switches", "SW");

        let saved = save(&board, library.root(), "in_place", &library).unwrap();

        assert!(template.is_file());
        assert_eq!(fs::read_to_string(&template).unwrap(), TEMPLATE);
        assert_eq!(saved.libraries.len(), 2);
        assert!(library.root().join("in_place.kicad_pcb").is_file());
    }

    #[test]
    fn test_save_missing_library() {
        let dir = TempDir::new().unwrap();
        let library = library(dir.path());
        let board = populated(&library);
        let empty = FootprintLibrary::new(dir.path().join("nowhere"));
        let err = save(&board, &dir.path().join("proj"), "proj", &empty).unwrap_err();
        assert!(matches!(err, BoardError::AssetNotFound { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("missing.kicad_pcb")).unwrap_err();
        assert!(matches!(err, BoardError::AssetNotFound { .. }));
    }

    #[test]
    fn test_seed_project_without_footprints() {
        let dir = TempDir::new().unwrap();
        let library = FootprintLibrary::new(dir.path());
        let saved = save(&Board::seed().unwrap(), dir.path(), "blank", &library).unwrap();
        assert!(saved.libraries.is_empty());
        assert!(saved.board.ends_with("blank.kicad_pcb"));
    }
}
