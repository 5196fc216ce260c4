//! Dataset service: CSV loading and prompt-sized digest derivation.
//!
//! Loads every CSV file under a designated directory once at startup and
//! derives a bounded textual digest (headers, a few sample rows, and a
//! remaining-row count per table) for prompt inclusion. Load failures are
//! logged and degrade to "no dataset available"; they never take the
//! process down.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info};

/// Column names that mark a line as a table header.
const EXPECTED_COLUMNS: [&str; 11] = [
    "Name", "Type", "HP", "Attack", "Defense", "Special", "Speed", "Move", "Power", "PP",
    "Accuracy",
];

/// Sample rows rendered verbatim per detected table.
const SAMPLE_ROWS: usize = 3;

/// Read-only introspection of the dataset state.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub loaded: bool,
    pub raw_bytes: usize,
}

/// Holds the raw dataset and its derived digest, both immutable after load.
pub struct DatasetService {
    raw: Option<String>,
    digest: Option<String>,
}

impl DatasetService {
    /// Scan `dir` for CSV files and build the digest.
    ///
    /// A missing directory is created and left empty (not an error). Any
    /// I/O failure is logged and treated as "no dataset available".
    pub fn load(dir: &Path) -> Self {
        let raw = match read_csv_dir(dir) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Error loading CSV data: {}", e);
                None
            }
        };
        let digest = raw.as_deref().and_then(build_digest);
        Self { raw, digest }
    }

    /// Whether any raw data was loaded.
    pub fn has_data(&self) -> bool {
        self.raw.is_some()
    }

    /// The derived digest, or `None` when no data was loaded or no table
    /// header was detected. Callers treat both cases identically.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Service statistics for health reporting.
    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            loaded: self.has_data(),
            raw_bytes: self.raw.as_ref().map_or(0, String::len),
        }
    }

    /// Build a service around already-loaded raw text. Test seam.
    #[cfg(test)]
    pub(crate) fn from_raw(raw: &str) -> Self {
        let digest = build_digest(raw);
        Self {
            raw: Some(raw.to_string()),
            digest,
        }
    }
}

fn read_csv_dir(dir: &Path) -> std::io::Result<Option<String>> {
    if !dir.exists() {
        info!("CSV data directory not found, creating {}", dir.display());
        std::fs::create_dir_all(dir)?;
        return Ok(None);
    }

    let mut files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    // Deterministic encounter order regardless of filesystem ordering
    files.sort();

    if files.is_empty() {
        info!("No CSV files found in {}", dir.display());
        return Ok(None);
    }

    info!("Found {} CSV files", files.len());

    let mut combined = String::new();
    for path in &files {
        let contents = std::fs::read_to_string(path)?;
        info!(
            "Loaded CSV data from {} ({} characters)",
            path.display(),
            contents.len()
        );
        combined.push_str(&contents);
        combined.push('\n');
    }

    info!("Total loaded data: {} characters", combined.len());
    Ok(Some(combined))
}

/// Derive the bounded digest from raw CSV text.
///
/// Each detected header line opens a section: the column list, up to
/// [`SAMPLE_ROWS`] data rows, and a count of the rows remaining before the
/// next header. Lines outside any section and `===` markers are skipped.
fn build_digest(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw.trim().lines().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() || line.starts_with("===") {
            i += 1;
            continue;
        }

        let headers = split_fields(line);
        if !is_header_row(&headers) {
            i += 1;
            continue;
        }

        out.push_str("Pokemon Data:\n");
        out.push_str(&format!("Columns: {}\n\n", headers.join(", ")));
        i += 1;

        let mut samples = 0;
        while i < lines.len() && samples < SAMPLE_ROWS {
            let data = lines[i].trim();
            if data.is_empty() || data.starts_with("===") {
                i += 1;
                continue;
            }
            if is_header_row(&split_fields(data)) {
                break;
            }
            samples += 1;
            out.push_str(&format!("Row {}: {}\n", samples, split_fields(data).join(" | ")));
            i += 1;
        }

        let mut remaining = 0;
        while i < lines.len() {
            let data = lines[i].trim();
            if data.is_empty() || data.starts_with("===") {
                i += 1;
                continue;
            }
            if is_header_row(&split_fields(data)) {
                break;
            }
            remaining += 1;
            i += 1;
        }
        if remaining > 0 {
            out.push_str(&format!("... and {} more rows\n", remaining));
        }
        out.push('\n');
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn is_header_row(fields: &[String]) -> bool {
    fields
        .iter()
        .any(|f| EXPECTED_COLUMNS.contains(&f.as_str()))
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|f| f.trim().replace('"', ""))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const STATS_CSV: &str = "\
Name,Type,HP,Attack,Defense,Special,Speed
Bulbasaur,Grass,45,49,49,65,45
Charmander,Fire,39,52,43,50,65
Squirtle,Water,44,48,65,50,43
Pikachu,Electric,35,55,40,50,90
Mewtwo,Psychic,106,110,90,154,130
";

    // ---- Loading ----

    #[test]
    fn test_load_missing_directory_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let csv_dir = dir.path().join("csv");
        let service = DatasetService::load(&csv_dir);
        assert!(csv_dir.exists());
        assert!(!service.has_data());
        assert!(service.digest().is_none());
    }

    #[test]
    fn test_load_empty_directory_has_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let service = DatasetService::load(dir.path());
        assert!(!service.has_data());
    }

    #[test]
    fn test_load_ignores_non_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "Name,Type\nPikachu,Electric").unwrap();
        let service = DatasetService::load(dir.path());
        assert!(!service.has_data());
    }

    #[test]
    fn test_load_single_csv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stats.csv"), STATS_CSV).unwrap();
        let service = DatasetService::load(dir.path());
        assert!(service.has_data());
        assert!(service.digest().is_some());
    }

    #[test]
    fn test_load_concatenates_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "Name,HP\nMew,100\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "Move,Power\nTackle,35\n").unwrap();
        let service = DatasetService::load(dir.path());
        let digest = service.digest().unwrap();
        // a.csv (moves) comes before b.csv (stats)
        let moves_at = digest.find("Move, Power").unwrap();
        let stats_at = digest.find("Name, HP").unwrap();
        assert!(moves_at < stats_at);
    }

    // ---- Digest derivation ----

    #[test]
    fn test_digest_section_structure() {
        let service = DatasetService::from_raw(STATS_CSV);
        let digest = service.digest().unwrap();
        assert!(digest.contains("Pokemon Data:"));
        assert!(digest.contains("Columns: Name, Type, HP, Attack, Defense, Special, Speed"));
        assert!(digest.contains("Row 1: Bulbasaur | Grass | 45 | 49 | 49 | 65 | 45"));
        assert!(digest.contains("Row 3: Squirtle | Water | 44 | 48 | 65 | 50 | 43"));
        assert!(digest.contains("... and 2 more rows"));
    }

    #[test]
    fn test_digest_caps_sample_rows_at_three() {
        let service = DatasetService::from_raw(STATS_CSV);
        let digest = service.digest().unwrap();
        assert!(!digest.contains("Row 4"));
        assert!(!digest.contains("Pikachu"));
    }

    #[test]
    fn test_digest_no_remaining_rows_line_when_exact() {
        let raw = "Name,HP\nMew,100\nMewtwo,106\n";
        let service = DatasetService::from_raw(raw);
        let digest = service.digest().unwrap();
        assert!(digest.contains("Row 2: Mewtwo | 106"));
        assert!(!digest.contains("more rows"));
    }

    #[test]
    fn test_digest_strips_quotes() {
        let raw = "\"Name\",\"Type\"\n\"Pikachu\",\"Electric\"\n";
        let service = DatasetService::from_raw(raw);
        let digest = service.digest().unwrap();
        assert!(digest.contains("Columns: Name, Type"));
        assert!(digest.contains("Row 1: Pikachu | Electric"));
    }

    #[test]
    fn test_digest_skips_marker_lines() {
        let raw = "=== stats table ===\nName,HP\nMew,100\n=== end ===\n";
        let service = DatasetService::from_raw(raw);
        let digest = service.digest().unwrap();
        assert!(!digest.contains("==="));
        assert!(digest.contains("Row 1: Mew | 100"));
    }

    #[test]
    fn test_digest_multiple_sections() {
        let raw = "\
Name,Type,HP
Pikachu,Electric,35
Raichu,Electric,60
Eevee,Normal,55
Snorlax,Normal,160
Move,Power,PP
Thunderbolt,95,15
Tackle,35,35
";
        let service = DatasetService::from_raw(raw);
        let digest = service.digest().unwrap();
        // First section counts only its own remainder, not the move table
        assert!(digest.contains("... and 1 more rows"));
        assert!(digest.contains("Columns: Move, Power, PP"));
        assert!(digest.contains("Row 1: Thunderbolt | 95 | 15"));
        assert_eq!(digest.matches("Pokemon Data:").count(), 2);
    }

    #[test]
    fn test_digest_without_header_is_none() {
        let service = DatasetService::from_raw("pikachu,electric,35\nmew,psychic,100\n");
        assert!(service.digest().is_none());
        assert!(service.has_data());
    }

    #[test]
    fn test_digest_empty_input_is_none() {
        let service = DatasetService::from_raw("");
        assert!(service.digest().is_none());
    }

    // ---- Introspection ----

    #[test]
    fn test_stats_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let service = DatasetService::load(dir.path());
        let stats = service.stats();
        assert!(!stats.loaded);
        assert_eq!(stats.raw_bytes, 0);
    }

    #[test]
    fn test_stats_loaded_reports_size() {
        let service = DatasetService::from_raw(STATS_CSV);
        let stats = service.stats();
        assert!(stats.loaded);
        assert_eq!(stats.raw_bytes, STATS_CSV.len());
    }

    // ---- Header detection ----

    #[test]
    fn test_header_detection_requires_known_column() {
        assert!(is_header_row(&split_fields("Name,Type,HP")));
        assert!(is_header_row(&split_fields("Move,Power,PP,Accuracy")));
        assert!(!is_header_row(&split_fields("pikachu,electric,35")));
    }

    #[test]
    fn test_header_detection_is_case_sensitive() {
        // Matches the fixed vocabulary exactly, as the loader wrote it
        assert!(!is_header_row(&split_fields("name,type,hp")));
    }
}
