//! Global text replacements applied while rendering

use regex::Regex;
use tracing::debug;

/// Rendered text a replacement rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceTarget {
    /// Origin column of schema tables
    ColumnFrom,
    /// Description texts
    Description,
    /// Type and schema name texts
    TypeSchema,
}

impl ReplaceTarget {
    /// Parse the `where` field; case, `-`, `_`, `/` and blanks are ignored
    pub fn parse(input: &str) -> Option<Self> {
        match normalize(input).as_str() {
            "columnfrom" | "columnorigin" => Some(ReplaceTarget::ColumnFrom),
            "description" => Some(ReplaceTarget::Description),
            "typeschema" => Some(ReplaceTarget::TypeSchema),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ReplaceHow {
    /// Whole text equals `from`; the first hit ends the scan
    FullMatch,
    /// Every occurrence of `from` is replaced
    PartialMatch,
    /// `from` is a regular expression, `.` also matches newlines
    Regex(Regex),
}

#[derive(Debug, Clone)]
pub struct Replacement {
    pub target: Option<ReplaceTarget>,
    pub how: ReplaceHow,
    pub from: String,
    pub to: String,
}

/// Ordered set of replacement rules written as `where|how|from|to`
#[derive(Debug, Clone, Default)]
pub struct GlobalReplacements {
    items: Vec<Replacement>,
}

fn normalize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | '/' | ' '))
        .collect()
}

/// Split at single `|`; a doubled `||` stands for a literal `|`
fn split_unescaped(line: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '|' {
            if chars.peek() == Some(&'|') {
                chars.next();
                if let Some(last) = parts.last_mut() {
                    last.push('|');
                }
            } else {
                parts.push(String::new());
            }
        } else if let Some(last) = parts.last_mut() {
            last.push(c);
        }
    }
    parts
}

impl GlobalReplacements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parse rule lines, appending the good ones.
    ///
    /// Returns the number of accepted lines minus the number of rejected
    /// ones. A line is rejected when it does not have exactly four fields or
    /// when its regular expression does not compile.
    pub fn parse_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> i32 {
        let mut count = 0;
        for line in lines {
            let line = line.as_ref();
            let parts = split_unescaped(line);
            if parts.len() != 4 {
                debug!("Rejecting replacement rule '{}': {} fields", line, parts.len());
                count -= 1;
                continue;
            }

            let how = match normalize(&parts[1]).as_str() {
                "partialmatch" => ReplaceHow::PartialMatch,
                "regex" => match Regex::new(&format!("(?s){}", parts[2])) {
                    Ok(re) => ReplaceHow::Regex(re),
                    Err(e) => {
                        debug!("Rejecting replacement rule '{}': {}", line, e);
                        count -= 1;
                        continue;
                    }
                },
                _ => ReplaceHow::FullMatch,
            };

            self.items.push(Replacement {
                target: ReplaceTarget::parse(&parts[0]),
                how,
                from: parts[2].clone(),
                to: parts[3].clone(),
            });
            count += 1;
        }
        count
    }

    /// Apply every rule registered for `target` to `input`
    pub fn apply(&self, target: ReplaceTarget, input: &str) -> String {
        let mut res = input.to_string();
        for item in self.items.iter().filter(|i| i.target == Some(target)) {
            match &item.how {
                ReplaceHow::FullMatch => {
                    if input == item.from {
                        res = item.to.clone();
                        break;
                    }
                }
                ReplaceHow::PartialMatch => {
                    if !item.from.is_empty() && res.contains(&item.from) {
                        res = res.replace(&item.from, &item.to);
                    }
                }
                ReplaceHow::Regex(re) => {
                    res = re.replace_all(&res, item.to.as_str()).into_owned();
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a|b|c|d", vec!["a", "b", "c", "d"])]
    #[case("a||x|b|c|d", vec!["a|x", "b", "c", "d"])]
    #[case("a|b", vec!["a", "b"])]
    #[case("", vec![""])]
    fn test_split_unescaped(#[case] line: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_unescaped(line), expected);
    }

    #[rstest]
    #[case("Column-From", Some(ReplaceTarget::ColumnFrom))]
    #[case("column_origin", Some(ReplaceTarget::ColumnFrom))]
    #[case("DESCRIPTION", Some(ReplaceTarget::Description))]
    #[case("type/schema", Some(ReplaceTarget::TypeSchema))]
    #[case("elsewhere", None)]
    fn test_parse_target(#[case] input: &str, #[case] expected: Option<ReplaceTarget>) {
        assert_eq!(ReplaceTarget::parse(input), expected);
    }

    #[test]
    fn test_parse_counts_failures() {
        let mut reps = GlobalReplacements::new();
        let count = reps.parse_lines(&[
            "description|partialmatch|foo|bar",
            "only|three|fields",
            "typeschema|regex|(unclosed|x",
            "columnfrom|fullmatch|A|B",
        ]);
        assert_eq!(count, 0);
        assert_eq!(reps.len(), 2);
    }

    #[test]
    fn test_apply_modes() {
        let mut reps = GlobalReplacements::new();
        reps.parse_lines(&[
            "typeschema|fullmatch|Reference|Ref",
            "description|partialmatch|AAS|Asset Administration Shell",
            "description|regex|\\s+$|",
        ]);

        assert_eq!(reps.apply(ReplaceTarget::TypeSchema, "Reference"), "Ref");
        assert_eq!(reps.apply(ReplaceTarget::TypeSchema, "References"), "References");
        assert_eq!(
            reps.apply(ReplaceTarget::Description, "The AAS id  \n"),
            "The Asset Administration Shell id"
        );
        assert_eq!(reps.apply(ReplaceTarget::ColumnFrom, "Reference"), "Reference");
    }

    #[test]
    fn test_escaped_pipe_in_rule() {
        let mut reps = GlobalReplacements::new();
        assert_eq!(reps.parse_lines(&["description|partialmatch|a||b|a or b"]), 1);
        assert_eq!(reps.apply(ReplaceTarget::Description, "x a|b y"), "x a or b y");
    }
}
