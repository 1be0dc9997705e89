use crate::models::SkinAnalysis;

/// The parser walks the text line by line with a single section cursor.
/// Section headers move the cursor; list items accumulate only while the
/// cursor sits in their section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Concerns,
    Recommendations,
    Keywords,
}

/// Parse model-generated skin analysis text into typed fields.
///
/// The input is free-form model output, not schema-validated, so this is a
/// best-effort contract: unrecognized lines are ignored and missing sections
/// leave their fields empty. Headers are accepted in Chinese and English.
/// Never fails.
pub fn parse_analysis(raw_text: &str) -> SkinAnalysis {
    let mut result = SkinAnalysis {
        raw_text: raw_text.to_string(),
        ..Default::default()
    };

    let mut section = Section::None;

    for line in raw_text.lines() {
        let line = line.trim();

        if line.contains("肤质类型") || line.contains("Skin Type") {
            // Scalar field; the list cursor is left where it was.
            if line.contains(':') {
                if let Some(value) = line.split(':').last() {
                    result.skin_type = Some(value.trim().to_string());
                }
            }
        } else if line.contains("主要问题") || line.contains("Main Concerns") {
            section = Section::Concerns;
        } else if line.contains("护肤建议") || line.contains("Recommendations") {
            section = Section::Recommendations;
        } else if line.contains("产品关键词") || line.contains("Product Keywords") {
            section = Section::Keywords;
            if line.contains(':') {
                if let Some(value) = line.split(':').last() {
                    result.search_keywords = value
                        .split(',')
                        .map(|k| k.trim().to_string())
                        .filter(|k| !k.is_empty())
                        .collect();
                }
            }
        } else if line.starts_with('-') || line.starts_with('•') {
            let item = line.trim_start_matches(['-', '•']).trim();
            if section == Section::Concerns && !item.is_empty() {
                result.concerns.push(item.to_string());
            }
        } else if line.starts_with(|c: char| c.is_ascii_digit()) && line.contains('.') {
            let item = line.splitn(2, '.').last().unwrap_or("").trim();
            if section == Section::Recommendations && !item.is_empty() {
                result.recommendations.push(item.to_string());
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
**肤质类型**: 混合性

**主要问题**:
- T区出油
- 两颊干燥

**护肤建议**:
1. 使用温和洁面
2. 分区护理
3. 注意防晒

**产品关键词**: oil control, hydrating toner, sunscreen";

    #[test]
    fn parses_bilingual_sample() {
        let analysis = parse_analysis(SAMPLE);

        assert_eq!(analysis.skin_type.as_deref(), Some("混合性"));
        assert_eq!(analysis.concerns, vec!["T区出油", "两颊干燥"]);
        assert_eq!(analysis.recommendations.len(), 3);
        assert_eq!(analysis.recommendations[0], "使用温和洁面");
        assert_eq!(
            analysis.search_keywords,
            vec!["oil control", "hydrating toner", "sunscreen"]
        );
    }

    #[test]
    fn concerns_preserve_file_order() {
        let text = "**肤质类型**: 混合性\n主要问题\n- first\n- second";
        let analysis = parse_analysis(text);
        assert_eq!(analysis.skin_type.as_deref(), Some("混合性"));
        assert_eq!(analysis.concerns, vec!["first", "second"]);
    }

    #[test]
    fn english_headers_are_recognized() {
        let text = "Skin Type: oily\nMain Concerns:\n- acne\nRecommendations:\n1. cleanse twice daily";
        let analysis = parse_analysis(text);

        assert_eq!(analysis.skin_type.as_deref(), Some("oily"));
        assert_eq!(analysis.concerns, vec!["acne"]);
        assert_eq!(analysis.recommendations, vec!["cleanse twice daily"]);
    }

    #[test]
    fn bullets_outside_concerns_section_are_ignored() {
        let text = "- stray bullet\n护肤建议:\n- bullet in wrong section\n1. real advice";
        let analysis = parse_analysis(text);

        assert!(analysis.concerns.is_empty());
        assert_eq!(analysis.recommendations, vec!["real advice"]);
    }

    #[test]
    fn numbered_lines_outside_recommendations_are_ignored() {
        let text = "主要问题:\n1. not a concern\n- a concern";
        let analysis = parse_analysis(text);

        assert_eq!(analysis.concerns, vec!["a concern"]);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn malformed_input_yields_empty_record() {
        let analysis = parse_analysis("just some prose with no structure at all");

        assert!(analysis.skin_type.is_none());
        assert!(analysis.concerns.is_empty());
        assert!(analysis.recommendations.is_empty());
        assert!(analysis.search_keywords.is_empty());
        assert_eq!(analysis.raw_text, "just some prose with no structure at all");
    }

    #[test]
    fn parsing_is_idempotent() {
        let first = parse_analysis(SAMPLE);
        let second = parse_analysis(SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn skin_type_takes_text_after_last_colon() {
        let analysis = parse_analysis("备注: 肤质类型: 敏感性");
        assert_eq!(analysis.skin_type.as_deref(), Some("敏感性"));
    }

    #[test]
    fn keywords_header_without_colon_leaves_keywords_empty() {
        let analysis = parse_analysis("产品关键词\nmoisturizer, toner");
        assert!(analysis.search_keywords.is_empty());
    }
}
