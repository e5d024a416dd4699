//! `%key%` substitution in body texts

use yaml2docx_docx::Run;

/// What a placeholder is replaced by
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    Text(String),
    /// Cross-reference to a bookmark, showing `display` until fields update
    FieldRef { bookmark: String, display: String },
}

/// Split `template` into runs, replacing placeholder keys.
///
/// At each scan position the earliest occurring key wins, ties going to the
/// key listed first. Scanning resumes after the consumed key. Literal text
/// and text substitutions are merged into as few runs as possible.
pub fn substitute(template: &str, substitutions: &[(&str, Substitution)]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    loop {
        let rest = &template[pos..];
        let next = substitutions
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .filter_map(|(key, sub)| rest.find(key).map(|idx| (idx, *key, sub)))
            .min_by_key(|(idx, _, _)| *idx);

        let Some((idx, key, sub)) = next else {
            literal.push_str(rest);
            break;
        };

        literal.push_str(&rest[..idx]);
        match sub {
            Substitution::Text(text) => literal.push_str(text),
            Substitution::FieldRef { bookmark, display } => {
                if !literal.is_empty() {
                    runs.push(Run::text(std::mem::take(&mut literal)));
                }
                runs.push(Run::field_ref(bookmark.clone(), display.clone()));
            }
        }
        pos += idx + key.len();
    }

    if !literal.is_empty() {
        runs.push(Run::text(literal));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table_ref() -> Substitution {
        Substitution::FieldRef {
            bookmark: "Yaml2DocxTable3".to_string(),
            display: "Table 3".to_string(),
        }
    }

    #[test]
    fn test_text_and_field_ref() {
        let runs = substitute(
            "Operation %opid% is specified in %table%.",
            &[
                ("%opid%", Substitution::Text("GetShell".to_string())),
                ("%table%", table_ref()),
            ],
        );
        assert_eq!(
            runs,
            vec![
                Run::text("Operation GetShell is specified in "),
                Run::field_ref("Yaml2DocxTable3", "Table 3"),
                Run::text("."),
            ]
        );
    }

    #[test]
    fn test_no_placeholder_is_single_run() {
        let runs = substitute("plain text", &[("%opid%", Substitution::Text("x".into()))]);
        assert_eq!(runs, vec![Run::text("plain text")]);
    }

    #[test]
    fn test_repeated_and_unknown_keys() {
        let runs = substitute(
            "%a%-%b%-%a%",
            &[("%a%", Substitution::Text("1".into()))],
        );
        assert_eq!(runs, vec![Run::text("1-%b%-1")]);
    }

    #[test]
    fn test_tie_goes_to_first_listed_key() {
        let runs = substitute(
            "%ab%",
            &[
                ("%a", Substitution::Text("X".into())),
                ("%ab%", Substitution::Text("Y".into())),
            ],
        );
        assert_eq!(runs, vec![Run::text("Xb%")]);
    }

    #[test]
    fn test_field_ref_only() {
        let runs = substitute("%table%", &[("%table%", table_ref())]);
        assert_eq!(runs, vec![Run::field_ref("Yaml2DocxTable3", "Table 3")]);
    }
}
