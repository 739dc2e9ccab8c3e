use std::collections::HashMap;

use once_cell::sync::Lazy;

const FONT_HEIGHT: usize = 5;
const FONT_WIDTH: usize = 5;
const FILL_CHAR: char = '█';

type Glyph = [&'static str; FONT_HEIGHT];

static GLYPHS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    HashMap::from([
        ('A', [" 111 ", "1   1", "11111", "1   1", "1   1"]),
        ('B', ["1111 ", "1   1", "1111 ", "1   1", "1111 "]),
        ('C', [" 1111", "1    ", "1    ", "1    ", " 1111"]),
        ('D', ["1111 ", "1   1", "1   1", "1   1", "1111 "]),
        ('E', ["11111", "1    ", "111  ", "1    ", "11111"]),
        ('F', ["11111", "1    ", "111  ", "1    ", "1    "]),
        ('G', [" 1111", "1    ", "1  11", "1   1", " 111 "]),
        ('H', ["1   1", "1   1", "11111", "1   1", "1   1"]),
        ('I', ["11111", "  1  ", "  1  ", "  1  ", "11111"]),
        ('J', ["    1", "    1", "    1", "1   1", " 111 "]),
        ('K', ["1   1", "1  1 ", "111  ", "1  1 ", "1   1"]),
        ('L', ["1    ", "1    ", "1    ", "1    ", "11111"]),
        ('M', ["1   1", "11 11", "1 1 1", "1   1", "1   1"]),
        ('N', ["1   1", "11  1", "1 1 1", "1  11", "1   1"]),
        ('O', [" 111 ", "1   1", "1   1", "1   1", " 111 "]),
        ('P', ["1111 ", "1   1", "1111 ", "1    ", "1    "]),
        ('Q', [" 111 ", "1   1", "1   1", "1  11", " 1111"]),
        ('R', ["1111 ", "1   1", "1111 ", "1  1 ", "1   1"]),
        ('S', [" 1111", "1    ", " 111 ", "    1", "1111 "]),
        ('T', ["11111", "  1  ", "  1  ", "  1  ", "  1  "]),
        ('U', ["1   1", "1   1", "1   1", "1   1", " 111 "]),
        ('V', ["1   1", "1   1", "1   1", " 1 1 ", "  1  "]),
        ('W', ["1   1", "1   1", "1 1 1", "11 11", "1   1"]),
        ('X', ["1   1", " 1 1 ", "  1  ", " 1 1 ", "1   1"]),
        ('Y', ["1   1", " 1 1 ", "  1  ", "  1  ", "  1  "]),
        ('Z', ["11111", "   1 ", "  1  ", " 1   ", "11111"]),
        ('0', [" 111 ", "1  11", "1 1 1", "11  1", " 111 "]),
        ('1', ["  1  ", " 11  ", "  1  ", "  1  ", "11111"]),
        ('2', [" 111 ", "1   1", "  11 ", " 1   ", "11111"]),
        ('3', ["1111 ", "    1", " 111 ", "    1", "1111 "]),
        ('4', ["1  1 ", "1  1 ", "11111", "   1 ", "   1 "]),
        ('5', ["11111", "1    ", "1111 ", "    1", "1111 "]),
        ('6', [" 111 ", "1    ", "1111 ", "1   1", " 111 "]),
        ('7', ["11111", "    1", "   1 ", "  1  ", " 1   "]),
        ('8', [" 111 ", "1   1", " 111 ", "1   1", " 111 "]),
        ('9', [" 111 ", "1   1", " 1111", "    1", " 111 "]),
    ])
});

/// Renders `text` as block letters, one output string per font row.
///
/// Characters without a glyph render as blank space.
pub fn render(text: &str) -> Vec<String> {
    let mut rows = vec![String::new(); FONT_HEIGHT];
    for (idx, ch) in text.to_ascii_uppercase().chars().enumerate() {
        let glyph = GLYPHS.get(&ch);
        for (row_idx, row) in rows.iter_mut().enumerate() {
            if idx > 0 {
                row.push(' ');
            }
            match glyph {
                Some(glyph) => {
                    for cell in glyph[row_idx].chars() {
                        row.push(if cell == '1' { FILL_CHAR } else { ' ' });
                    }
                }
                None => {
                    for _ in 0..FONT_WIDTH {
                        row.push(' ');
                    }
                }
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_string_per_font_row() {
        let rows = render("BUSTUI");
        assert_eq!(rows.len(), FONT_HEIGHT);

        // Six glyphs, five columns each, single-space gaps.
        let expected_width = 6 * FONT_WIDTH + 5;
        for row in &rows {
            assert_eq!(row.chars().count(), expected_width);
        }
    }

    #[test]
    fn lowercase_maps_to_uppercase_glyphs() {
        assert_eq!(render("bus"), render("BUS"));
    }

    #[test]
    fn unknown_characters_render_blank() {
        let rows = render("?");
        assert!(rows.iter().all(|row| row.trim().is_empty()));
    }
}
