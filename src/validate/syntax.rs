//! Per-file rules over the raw definition file text.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::Validator;

impl Validator {
    /// File naming and whitespace conventions. An unreadable file is an
    /// Error; everything else is styling.
    pub(crate) fn validate_syntax(&mut self, path: &Path) {
        let filename = path.to_string_lossy().into_owned();

        if !filename.ends_with(".yaml") {
            self.add_info(&filename, "", "File should have .yaml ending".to_string());
        }

        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                self.add_error(&filename, "", format!("Error {err}"));
                return;
            }
        };

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    self.add_error(&filename, "", format!("Error {err}"));
                    return;
                }
            };
            if index == 0 && (line.len() < 3 || !line.starts_with("# ")) {
                self.add_info(
                    &filename,
                    "",
                    "The first line should be a comment".to_string(),
                );
            }
            if line != line.trim_end_matches([' ', '\t']) {
                self.add_info(
                    &filename,
                    "",
                    format!("Line {} ends with whitespace", index + 1),
                );
            }
        }
    }
}
