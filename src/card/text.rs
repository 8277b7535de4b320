//! Helvetica text measurement, wrapping and shrink-to-fit.

/// Advance widths of Helvetica for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Width used for characters outside the table.
const FALLBACK_WIDTH: u16 = 556;

/// Line height as a multiple of the font size (ascender + descender + gap).
pub const LINE_HEIGHT_RATIO: f32 = 1.156;

/// Distance from the top of a line to its baseline, as a multiple of the size.
pub const ASCENDER_RATIO: f32 = 0.718;

const MIN_FONT_SIZE: f32 = 5.0;
const SHRINK_STEP: f32 = 0.5;

fn char_width(c: char) -> u16 {
    match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` at `size` points.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap. Words wider than the box are broken by character.
pub fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate, size) <= width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, size) <= width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    current.push(c);
                    if text_width(&current, size) > width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    }
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Wrap `text` into a box, shrinking the font until it fits `height` when one
/// is given. Returns the final size and lines.
pub fn fit_text(text: &str, width: f32, height: Option<f32>, size: f32) -> (f32, Vec<String>) {
    let mut size = size;
    loop {
        let lines = wrap(text, width, size);
        let fits = match height {
            Some(h) => lines.len() as f32 * size * LINE_HEIGHT_RATIO <= h,
            None => true,
        };
        if fits || size - SHRINK_STEP < MIN_FONT_SIZE {
            return (size, lines);
        }
        size -= SHRINK_STEP;
    }
}
