use crate::domain::SourceFormat;

/// Classify a payload by its leading characters.
///
/// This is a heuristic, not a parser. Rules are checked top to bottom on the
/// trimmed content and the first match wins:
///
/// | rule                                        | format    |
/// |---------------------------------------------|-----------|
/// | empty                                       | `Unknown` |
/// | starts with `{` or `[`                      | `Json`    |
/// | starts with `<` and contains `>`            | `Xml`     |
/// | contains `,` and spans more than one line   | `Csv`     |
/// | anything else                               | `Text`    |
pub fn detect_format(content: &str) -> SourceFormat {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        SourceFormat::Unknown
    } else if trimmed.starts_with('{') || trimmed.starts_with('[') {
        SourceFormat::Json
    } else if trimmed.starts_with('<') && trimmed.contains('>') {
        SourceFormat::Xml
    } else if trimmed.contains(',') && trimmed.lines().count() > 1 {
        SourceFormat::Csv
    } else {
        SourceFormat::Text
    }
}
