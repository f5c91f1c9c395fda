//! # Reference Extraction
//!
//! Scans a part-description file for sub-file reference lines and returns
//! the set of file names they point at.
//!
//! A reference line is any line whose first non-whitespace character is
//! `1`. Its last space- or tab-separated token is the referenced file:
//!
//! ```text
//! 1 16 0 0 0 1 0 0 0 1 0 0 0 1 s\3001s01.dat
//! ```
//!
//! Content is decoded lossily, so stray non-UTF-8 bytes (common in the
//! author and comment lines of older library files) never hide the
//! references on other lines.

use std::collections::BTreeSet;

use crate::name::LogicalFileName;

/// Line-type marker of a sub-file reference.
pub const REFERENCE_LINE_MARKER: char = '1';

/// Whether a line is a sub-file reference line.
pub fn is_reference_line(line: &str) -> bool {
    line.trim_start().starts_with(REFERENCE_LINE_MARKER)
}

/// Extract the set of file names referenced by `data`.
///
/// Duplicates collapse. Tokens that do not form a valid
/// [`LogicalFileName`] are skipped.
pub fn extract_references(data: &[u8]) -> BTreeSet<LogicalFileName> {
    let text = String::from_utf8_lossy(data);
    text.lines()
        .filter(|line| is_reference_line(line))
        .filter_map(last_token)
        .filter_map(|token| match LogicalFileName::new(token) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!(token, error = %e, "skipping unusable reference");
                None
            }
        })
        .collect()
}

fn last_token(line: &str) -> Option<&str> {
    line.split([' ', '\t']).rfind(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(data: &[u8]) -> Vec<String> {
        extract_references(data)
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn picks_last_token_of_reference_lines() {
        let data = b"0 Brick 1 x 2\r\n\
0 Name: 3004.dat\r\n\
1 16 0 0 0 1 0 0 0 1 0 0 0 1 stud.dat\r\n\
2 24 0 0 0 1 1 1\r\n\
3 16 0 0 0 1 0 0 0 1 0\r\n\
1 16 10 0 0 1 0 0 0 1 0 0 0 1 s\\3004s01.dat\r\n";
        assert_eq!(names(data), vec!["s/3004s01.dat", "stud.dat"]);
    }

    #[test]
    fn accepts_leading_whitespace_and_tabs() {
        let data = b"   1\t16\t0 0 0 1 0 0 0 1 0 0 0 1\t4-4disc.dat\n\t1 16 0 0 0 1 0 0 0 1 0 0 0 1 box.dat";
        assert_eq!(names(data), vec!["4-4disc.dat", "box.dat"]);
    }

    #[test]
    fn duplicates_collapse() {
        let data = b"1 16 0 0 0 1 0 0 0 1 0 0 0 1 stud.dat\n1 16 20 0 0 1 0 0 0 1 0 0 0 1 stud.dat\n";
        assert_eq!(names(data), vec!["stud.dat"]);
    }

    #[test]
    fn trailing_separator_does_not_yield_empty_name() {
        let data = b"1 16 0 0 0 1 0 0 0 1 0 0 0 1 stud.dat \t\n";
        assert_eq!(names(data), vec!["stud.dat"]);
    }

    #[test]
    fn non_reference_lines_are_ignored() {
        let data = b"0 // 1 is not a marker here\n2 24 1 1 1 2 2 2\n\n";
        assert!(extract_references(data).is_empty());
    }

    #[test]
    fn invalid_utf8_does_not_hide_other_lines() {
        let mut data = b"0 Author: Ren\xe9 Dupont\n".to_vec();
        data.extend_from_slice(b"1 16 0 0 0 1 0 0 0 1 0 0 0 1 stud.dat\n");
        assert_eq!(names(&data), vec!["stud.dat"]);
    }

    #[test]
    fn undecodable_content_yields_nothing() {
        assert!(extract_references(&[0xff, 0xfe, 0x00, 0x81]).is_empty());
    }

    #[test]
    fn traversal_references_are_skipped() {
        let data = b"1 16 0 0 0 1 0 0 0 1 0 0 0 1 ..\\..\\secret.dat\n1 16 0 0 0 1 0 0 0 1 0 0 0 1 ok.dat\n";
        assert_eq!(names(data), vec!["ok.dat"]);
    }

    proptest! {
        #[test]
        fn every_reference_line_contributes_its_last_token(
            files in proptest::collection::vec("[a-z0-9]{1,8}\\.dat", 0..12)
        ) {
            let mut data = String::from("0 header\n");
            for file in &files {
                data.push_str(&format!("1 16 0 0 0 1 0 0 0 1 0 0 0 1 {file}\r\n"));
                data.push_str("4 16 0 0 0 1 1 1 2 2 2 3 3 3\r\n");
            }
            let expected: BTreeSet<String> = files.iter().cloned().collect();
            let got: BTreeSet<String> = extract_references(data.as_bytes())
                .into_iter()
                .map(String::from)
                .collect();
            prop_assert_eq!(got, expected);
        }
    }
}
