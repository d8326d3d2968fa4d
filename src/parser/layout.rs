use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

/// 行内两字之间超过字号的这个比例就补一个空格
const WORD_GAP_RATIO: f64 = 0.1;
/// 基线距离超过字号的这个比例视为新段落
const PARAGRAPH_GAP_RATIO: f64 = 1.5;

#[derive(Debug, Clone)]
struct Glyph {
    x: f64,
    y: f64,
    end: f64,
    size: f64,
    text: String,
}

struct Line {
    y: f64,
    size: f64,
    glyphs: Vec<Glyph>,
}

/// 收集单页每个字形的位置，输出按阅读顺序（自上而下、自左而右）排好的文本
#[derive(Default)]
pub struct LayoutText {
    glyphs: Vec<Glyph>,
}

impl LayoutText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_text(self) -> String {
        let lines = group_lines(self.glyphs);

        let mut out = String::new();
        let mut previous: Option<&Line> = None;
        for line in &lines {
            let text = render_line(line);
            if text.is_empty() {
                continue;
            }
            if let Some(prev) = previous {
                out.push('\n');
                if prev.y - line.y > prev.size.max(line.size) * PARAGRAPH_GAP_RATIO {
                    out.push('\n');
                }
            }
            out.push_str(&text);
            previous = Some(line);
        }
        out
    }
}

impl OutputDev for LayoutText {
    fn begin_page(&mut self, _page_num: u32, _media_box: &MediaBox, _art_box: Option<(f64, f64, f64, f64)>) -> Result<(), OutputError> {
        self.glyphs.clear();
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn output_character(&mut self, trm: &Transform, width: f64, _spacing: f64, font_size: f64, char: &str) -> Result<(), OutputError> {
        if char.is_empty() {
            return Ok(());
        }
        // 文本矩阵不含字号，按缩放面积折算成实际字高
        let scale = (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt();
        let size = (font_size * scale).max(1.0);
        let (x, y) = (trm.m31, trm.m32);

        self.glyphs.push(Glyph {
            x,
            y,
            end: x + width * size,
            size,
            text: char.to_string(),
        });
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// PDF 坐标 y 轴向上：先按 y 从大到小分行，行内再按 x 排序
fn group_lines(mut glyphs: Vec<Glyph>) -> Vec<Line> {
    glyphs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Line> = Vec::new();
    for glyph in glyphs {
        let same_line = lines
            .last()
            .is_some_and(|line| line.y - glyph.y <= line.size.max(glyph.size) * 0.5);

        if let (true, Some(line)) = (same_line, lines.last_mut()) {
            line.size = line.size.max(glyph.size);
            line.glyphs.push(glyph);
            continue;
        }
        lines.push(Line {
            y: glyph.y,
            size: glyph.size,
            glyphs: vec![glyph],
        });
    }

    for line in &mut lines {
        line.glyphs.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    lines
}

fn render_line(line: &Line) -> String {
    let mut text = String::new();
    let mut last_end: Option<f64> = None;

    for glyph in &line.glyphs {
        let is_space = glyph.text.trim().is_empty();
        if let Some(end) = last_end {
            let gap = glyph.x - end;
            if gap > glyph.size * WORD_GAP_RATIO && !is_space && !text.ends_with(' ') {
                text.push(' ');
            }
        }
        if is_space {
            if !text.is_empty() && !text.ends_with(' ') {
                text.push(' ');
            }
        } else {
            text.push_str(&glyph.text);
        }
        last_end = Some(glyph.end);
    }

    text.trim_end().to_string()
}
