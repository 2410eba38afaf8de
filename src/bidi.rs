//! Resolves bidirectional text into its visual display order.

use unicode_bidi::BidiInfo;
use unicode_bidi_mirroring::get_mirrored;

/// Computes the visual display order of text.
pub trait DisplayOrder: Send + Sync {
    /// Returns `text` rearranged into the order it would be displayed in.
    fn display_order(&self, text: &str) -> String;
}

/// The default [`DisplayOrder`], using the Unicode Bidirectional Algorithm.
///
/// The paragraph direction is taken from the first strong character. Characters displayed
/// right-to-left are mirrored where Unicode defines a mirror image, and explicit embedding and
/// override controls are removed from the result.
#[derive(Copy, Clone, Debug, Default)]
pub struct BidiDisplay;

fn is_explicit_control(c: char) -> bool {
    ('\u{202A}'..='\u{202E}').contains(&c)
}

fn is_paragraph_separator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{1C}'..='\u{1E}' | '\u{85}' | '\u{2029}')
}

fn mirror(c: char) -> char {
    get_mirrored(c).unwrap_or(c)
}

impl DisplayOrder for BidiDisplay {
    fn display_order(&self, text: &str) -> String {
        let info = BidiInfo::new(text, None);
        if !info.levels.iter().any(|level| level.is_rtl()) {
            return text.chars().filter(|&c| !is_explicit_control(c)).collect();
        }

        let mut out = String::with_capacity(text.len());
        for para in &info.paragraphs {
            // The paragraph separator stays at the end of its paragraph.
            let body = text[para.range.clone()].trim_end_matches(is_paragraph_separator);
            let line = para.range.start..para.range.start + body.len();

            if line.is_empty() {
                out.push_str(&text[para.range.clone()]);
                continue;
            }

            let (levels, runs) = info.visual_runs(para, line.clone());
            for run in runs {
                let segment = &text[run.clone()];
                if levels[run.start].is_rtl() {
                    out.extend(segment.chars().rev()
                        .filter(|&c| !is_explicit_control(c))
                        .map(mirror));
                } else {
                    out.extend(segment.chars().filter(|&c| !is_explicit_control(c)));
                }
            }
            out.push_str(&text[line.end..para.range.end]);
        }
        trace!("Reordered {} bidirectional paragraphs.", info.paragraphs.len());
        out
    }
}
