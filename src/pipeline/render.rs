use super::AnalysisReport;

pub fn render_markdown(report: &AnalysisReport) -> String {
    let mut out = format!(
        "# 📄 {name}\n\n_{pages} page(s) · generated {at}_\n\n",
        name = report.document_name,
        pages = report.page_count,
        at = report.generated_at.format("%Y-%m-%d %H:%M:%S"),
    );

    out.push_str("## 📋 Scheme Summary (English)\n\n");
    out.push_str(report.summary.trim());
    out.push_str("\n\n---\n\n");

    out.push_str("## 🎯 Your Eligibility Status\n\n");
    out.push_str(report.eligibility.trim());
    out.push_str("\n\n---\n\n");

    for translation in &report.translations {
        out.push_str(&format!("## {}\n\n", translation.heading));
        out.push_str(translation.text.trim());
        out.push_str("\n\n");
    }

    out.push_str("✅ Analysis complete! Check the translations above for your language preference.\n");
    out
}

pub fn render_json(report: &AnalysisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RenderedTranslation;
    use chrono::Local;

    fn report() -> AnalysisReport {
        AnalysisReport {
            document_name: "pm-kisan.pdf".to_string(),
            page_count: 3,
            generated_at: Local::now(),
            summary: "**SCHEME NAME:** PM-KISAN\n".to_string(),
            eligibility: "**ELIGIBILITY STATUS:** ELIGIBLE".to_string(),
            translations: vec![
                RenderedTranslation {
                    language: "hi".to_string(),
                    heading: "🇮🇳 हिंदी अनुवाद".to_string(),
                    text: "योजना".to_string(),
                },
                RenderedTranslation {
                    language: "te".to_string(),
                    heading: "🇮🇳 తెలుగు అనువాదం".to_string(),
                    text: "పథకం".to_string(),
                },
            ],
        }
    }

    #[test]
    fn markdown_sections_appear_in_display_order() {
        let md = render_markdown(&report());

        let order = [
            "## 📋 Scheme Summary (English)",
            "**SCHEME NAME:** PM-KISAN",
            "## 🎯 Your Eligibility Status",
            "**ELIGIBILITY STATUS:** ELIGIBLE",
            "## 🇮🇳 हिंदी अनुवाद",
            "योजना",
            "## 🇮🇳 తెలుగు అనువాదం",
            "పథకం",
            "✅ Analysis complete!",
        ];
        let positions: Vec<usize> = order.iter().map(|s| md.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(md.contains("3 page(s)"));
    }

    #[test]
    fn json_keeps_all_output_surfaces() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&report()).unwrap()).unwrap();

        assert_eq!(json["document_name"], "pm-kisan.pdf");
        assert_eq!(json["translations"][1]["language"], "te");
        assert_eq!(json["eligibility"], "**ELIGIBILITY STATUS:** ELIGIBLE");
    }
}
