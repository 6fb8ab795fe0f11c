//! Repair of the malformed JSON occasionally served by RaiPlay.
//!
//! Some schedule payloads contain doubled or trailing commas, raw control
//! characters inside strings, or JavaScript leftovers (comments, single
//! quotes, bare keys, `NaN`). The repair pass fixes them in a single
//! string-aware scan; the content of string literals is never reinterpreted.

use std::iter::Peekable;
use std::str::CharIndices;

/// A kind of fix applied by [`repair_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonFix {
    /// Leading byte order mark removed.
    Bom,
    /// A `//` or `/* */` comment removed.
    Comment,
    /// A raw control character escaped inside a string or dropped outside one.
    ControlCharacter,
    /// `NaN`, `Infinity` or `undefined` replaced with `null`.
    NonFiniteLiteral,
    /// A single-quoted string rewritten with double quotes.
    SingleQuotes,
    /// A bare object key quoted.
    UnquotedKey,
    /// A comma following another comma removed.
    DuplicateComma,
    /// A comma directly after `[` or `{` removed.
    LeadingComma,
    /// A comma directly before `]` or `}` removed.
    TrailingComma,
}

/// Output of [`repair_json`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repaired {
    /// The repaired text.
    pub text: String,
    /// Fixes applied, in scan order.
    pub fixes: Vec<JsonFix>,
}

impl Repaired {
    /// `true` when the input needed no change.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.fixes.is_empty()
    }
}

/// Repairs common JSON defects outside and inside string literals.
#[must_use]
pub fn repair_json(input: &str) -> Repaired {
    let mut fixes = Vec::new();
    let body = input.strip_prefix('\u{feff}').map_or(input, |rest| {
        fixes.push(JsonFix::Bom);
        rest
    });

    let mut out = String::with_capacity(body.len());
    // Byte offset and value of the last non-whitespace char written outside a string.
    let mut last_sig: Option<(usize, char)> = None;
    // Delimiter of the string being copied.
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = body.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if let Some(delimiter) = quote {
            if escaped {
                escaped = false;
                if ch == '\'' {
                    // `\'` is not a JSON escape.
                    out.pop();
                    fixes.push(JsonFix::SingleQuotes);
                }
                out.push(ch);
            } else if ch == '\\' {
                escaped = true;
                out.push(ch);
            } else if ch == delimiter {
                quote = None;
                out.push('"');
            } else if ch == '"' {
                out.push_str("\\\"");
            } else if u32::from(ch) < 0x20 {
                push_escaped_control(&mut out, ch);
                fixes.push(JsonFix::ControlCharacter);
            } else {
                out.push(ch);
            }
            continue;
        }

        match ch {
            ',' => match last_sig {
                Some((_, ',')) => fixes.push(JsonFix::DuplicateComma),
                Some((_, '[' | '{')) => fixes.push(JsonFix::LeadingComma),
                _ => {
                    last_sig = Some((out.len(), ch));
                    out.push(ch);
                }
            },
            ']' | '}' => {
                if let Some((pos, ',')) = last_sig {
                    out.remove(pos);
                    fixes.push(JsonFix::TrailingComma);
                }
                last_sig = Some((out.len(), ch));
                out.push(ch);
            }
            '/' if matches!(chars.peek(), Some((_, '/' | '*'))) => {
                skip_comment(&mut chars);
                fixes.push(JsonFix::Comment);
            }
            '"' | '\'' => {
                if ch == '\'' {
                    fixes.push(JsonFix::SingleQuotes);
                }
                quote = Some(ch);
                last_sig = Some((out.len(), '"'));
                out.push('"');
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let word = take_word(c, &mut chars);
                let pos = out.len();
                match word.as_str() {
                    "NaN" | "Infinity" | "undefined" => {
                        if let Some((minus, '-')) = last_sig {
                            out.truncate(minus);
                        }
                        out.push_str("null");
                        fixes.push(JsonFix::NonFiniteLiteral);
                    }
                    _ if matches!(last_sig, Some((_, '{' | ','))) && next_is_colon(&chars) => {
                        out.push('"');
                        out.push_str(&word);
                        out.push('"');
                        fixes.push(JsonFix::UnquotedKey);
                    }
                    _ => out.push_str(&word),
                }
                last_sig = Some((pos, c));
            }
            '\t' | '\n' | '\r' | ' ' => out.push(ch),
            c if u32::from(c) < 0x20 => fixes.push(JsonFix::ControlCharacter),
            c if c.is_whitespace() => out.push(c),
            c => {
                last_sig = Some((out.len(), c));
                out.push(c);
            }
        }
    }

    if !fixes.is_empty() {
        tracing::debug!(fixes = fixes.len(), "repaired malformed JSON");
    }

    Repaired { text: out, fixes }
}

fn push_escaped_control(out: &mut String, ch: char) {
    match ch {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        c => out.push_str(&format!("\\u{:04x}", u32::from(c))),
    }
}

/// Consumes a comment whose leading `/` was already read.
fn skip_comment(chars: &mut Peekable<CharIndices<'_>>) {
    match chars.next() {
        Some((_, '/')) => {
            // The newline stays as whitespace.
            while chars.next_if(|&(_, c)| c != '\n').is_some() {}
        }
        Some((_, '*')) => {
            let mut star = false;
            for (_, c) in chars.by_ref() {
                if star && c == '/' {
                    break;
                }
                star = c == '*';
            }
        }
        _ => {}
    }
}

fn take_word(first: char, chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut word = String::from(first);
    while let Some((_, c)) = chars.next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_') {
        word.push(c);
    }
    word
}

fn next_is_colon(chars: &Peekable<CharIndices<'_>>) -> bool {
    chars
        .clone()
        .map(|(_, c)| c)
        .find(|c| !c.is_whitespace())
        == Some(':')
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_valid_json_unchanged() {
        // Arrange
        let input = r#"{"a": [1, 2, {"b": "x,,y"}]}"#;

        // Act
        let repaired = repair_json(input);

        // Assert
        assert!(repaired.is_unchanged());
        assert_eq!(repaired.text, input);
    }

    #[test]
    fn test_duplicate_commas_collapsed() {
        // Arrange
        let input = "[1,, 2,,,3]";

        // Act
        let repaired = repair_json(input);

        // Assert
        assert_eq!(repaired.text, "[1, 2,3]");
        assert_eq!(
            repaired.fixes,
            vec![
                JsonFix::DuplicateComma,
                JsonFix::DuplicateComma,
                JsonFix::DuplicateComma
            ]
        );
    }

    #[test]
    fn test_trailing_and_leading_commas() {
        // Arrange
        let input = "{\"a\": [, 1, 2,\n],\n}";

        // Act
        let repaired = repair_json(input);
        let value: serde_json::Value = serde_json::from_str(&repaired.text).unwrap();

        // Assert
        assert_eq!(value["a"], serde_json::json!([1, 2]));
        assert!(repaired.fixes.contains(&JsonFix::LeadingComma));
        assert!(repaired.fixes.contains(&JsonFix::TrailingComma));
    }

    #[test]
    fn test_strings_with_escaped_quotes_preserved() {
        // Arrange
        let input = r#"{"a": "say \"hi\",, ok",,}"#;

        // Act
        let repaired = repair_json(input);
        let value: serde_json::Value = serde_json::from_str(&repaired.text).unwrap();

        // Assert
        assert_eq!(value["a"], r#"say "hi",, ok"#);
    }

    #[test]
    fn test_bom_removed() {
        // Arrange
        let input = "\u{feff}{\"a\": 1}";

        // Act
        let repaired = repair_json(input);

        // Assert
        assert_eq!(repaired.text, "{\"a\": 1}");
        assert_eq!(repaired.fixes, vec![JsonFix::Bom]);
    }

    #[test]
    fn test_control_characters_escaped_in_strings() {
        // Arrange
        let input = "{\"name\": \"Tg1\nNotte\", \"note\": \"a\tb\u{1}\"}";

        // Act
        let repaired = repair_json(input);
        let value: serde_json::Value = serde_json::from_str(&repaired.text).unwrap();

        // Assert
        assert_eq!(value["name"], "Tg1\nNotte");
        assert_eq!(value["note"], "a\tb\u{1}");
        assert_eq!(
            repaired.fixes,
            vec![
                JsonFix::ControlCharacter,
                JsonFix::ControlCharacter,
                JsonFix::ControlCharacter
            ]
        );
    }

    #[test]
    fn test_control_characters_dropped_outside_strings() {
        // Arrange
        let input = "{\"a\":\u{0} 1}";

        // Act
        let repaired = repair_json(input);

        // Assert
        assert_eq!(repaired.text, "{\"a\": 1}");
        assert_eq!(repaired.fixes, vec![JsonFix::ControlCharacter]);
    }

    #[test]
    fn test_non_finite_literals_become_null() {
        // Arrange
        let input = r#"{"a": NaN, "b": -Infinity, "c": undefined, "d": "NaN undefined", "e": true}"#;

        // Act
        let repaired = repair_json(input);
        let value: serde_json::Value = serde_json::from_str(&repaired.text).unwrap();

        // Assert
        assert!(value["a"].is_null());
        assert!(value["b"].is_null());
        assert!(value["c"].is_null());
        assert_eq!(value["d"], "NaN undefined");
        assert_eq!(value["e"], true);
        assert_eq!(
            repaired
                .fixes
                .iter()
                .filter(|f| **f == JsonFix::NonFiniteLiteral)
                .count(),
            3
        );
    }

    #[test]
    fn test_comments_removed() {
        // Arrange
        let input = "{\n  // channel\n  \"a\": 1, /* inline */ \"b\": \"http://x\"\n}";

        // Act
        let repaired = repair_json(input);
        let value: serde_json::Value = serde_json::from_str(&repaired.text).unwrap();

        // Assert
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], "http://x");
        assert_eq!(repaired.fixes, vec![JsonFix::Comment, JsonFix::Comment]);
    }

    #[test]
    fn test_single_quotes_and_bare_keys() {
        // Arrange
        let input = r#"{name: 'L\'eredita "live"', hour: '18:45', ok: true}"#;

        // Act
        let repaired = repair_json(input);
        let value: serde_json::Value = serde_json::from_str(&repaired.text).unwrap();

        // Assert
        assert_eq!(value["name"], r#"L'eredita "live""#);
        assert_eq!(value["hour"], "18:45");
        assert_eq!(value["ok"], true);
        assert!(repaired.fixes.contains(&JsonFix::UnquotedKey));
        assert!(repaired.fixes.contains(&JsonFix::SingleQuotes));
    }

    #[test]
    fn test_broken_fixture_parses_after_repair() {
        // Arrange
        let input = include_str!("../../../../fixtures/raiplay/palinsesto_rai-2_broken.json");
        assert!(serde_json::from_str::<serde_json::Value>(input).is_err());

        // Act
        let repaired = repair_json(input);
        let value: serde_json::Value = serde_json::from_str(&repaired.text).unwrap();

        // Assert
        assert_eq!(value["events"].as_array().unwrap().len(), 2);
        assert_eq!(
            value["events"][1]["name"],
            "Stasera tutto e' possibile, ,, in diretta"
        );
    }
}
